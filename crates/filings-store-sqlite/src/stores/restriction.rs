//! The articles-provisions restriction flag.

use filings_core::temporal::{EventId, TemporalSpan};
use rusqlite::{Connection, Params, params};

use super::{AS_OF, TemporalStore, span};
use crate::{
  Result,
  encode::{decode_ind, encode_ind},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestrictionRecord {
  pub span:       TemporalSpan,
  /// `true` when the pre-existing company provisions apply.
  pub restricted: bool,
}

pub struct RestrictionStore;

impl RestrictionStore {
  fn query(
    conn: &Connection,
    filter: &str,
    params: impl Params,
  ) -> Result<Vec<RestrictionRecord>> {
    let sql = format!(
      "SELECT start_event_id, end_event_id, restriction_ind
       FROM corp_restriction WHERE corp_num = ?1 AND {filter}
       ORDER BY corp_restriction_id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
      .query_map(params, |row| {
        Ok(RestrictionRecord {
          span:       span(row, "start_event_id", "end_event_id")?,
          restricted: decode_ind(row.get::<_, Option<String>>("restriction_ind")?.as_deref()),
        })
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
  }

  /// Restrictions started or ended by `event_id`.
  pub fn touching(
    conn: &Connection,
    corp_num: &str,
    event_id: EventId,
  ) -> Result<Vec<RestrictionRecord>> {
    Self::query(
      conn,
      "(start_event_id = ?2 OR end_event_id = ?2)",
      params![corp_num, event_id],
    )
  }
}

impl TemporalStore for RestrictionStore {
  type Key = ();
  type Payload = bool;
  type Record = RestrictionRecord;

  fn current(conn: &Connection, corp_num: &str) -> Result<Vec<RestrictionRecord>> {
    Self::query(conn, "end_event_id IS NULL", params![corp_num])
  }

  fn as_of(
    conn: &Connection,
    corp_num: &str,
    event_id: EventId,
  ) -> Result<Vec<RestrictionRecord>> {
    Self::query(conn, AS_OF, params![corp_num, event_id])
  }

  fn create(
    conn: &Connection,
    corp_num: &str,
    event_id: EventId,
    restricted: &bool,
  ) -> Result<RestrictionRecord> {
    conn.execute(
      "INSERT INTO corp_restriction (corp_num, start_event_id, restriction_ind)
       VALUES (?1, ?2, ?3)",
      params![corp_num, event_id, encode_ind(*restricted)],
    )?;
    Ok(RestrictionRecord { span: TemporalSpan::open(event_id), restricted: *restricted })
  }

  fn end(conn: &Connection, corp_num: &str, event_id: EventId, _: &()) -> Result<bool> {
    let n = conn.execute(
      "UPDATE corp_restriction SET end_event_id = ?2
       WHERE corp_num = ?1 AND end_event_id IS NULL",
      params![corp_num, event_id],
    )?;
    Ok(n > 0)
  }
}

//! Corporate names. At most one legal name (corporate or numbered) is
//! current at a time; translations are keyed by their text.

use filings_core::{
  entity::NameType,
  temporal::{EventId, TemporalSpan},
};
use rusqlite::{Connection, OptionalExtension as _, Params, params};

use super::{AS_OF, TemporalStore, span};
use crate::{Result, encode::decode_code};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameRecord {
  pub id:        i64,
  pub name_type: NameType,
  pub name:      String,
  pub span:      TemporalSpan,
}

/// Which name to end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameKey {
  Legal,
  Translation(String),
}

pub struct NameStore;

impl NameStore {
  fn query(conn: &Connection, filter: &str, params: impl Params) -> Result<Vec<NameRecord>> {
    let sql = format!(
      "SELECT corp_name_id, corp_name_typ_cd, corp_name, start_event_id, end_event_id
       FROM corp_name WHERE corp_num = ?1 AND {filter}
       ORDER BY corp_name_id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
      .query_map(params, |row| {
        Ok((
          row.get::<_, i64>("corp_name_id")?,
          row.get::<_, String>("corp_name_typ_cd")?,
          row.get::<_, String>("corp_name")?,
          span(row, "start_event_id", "end_event_id")?,
        ))
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?;

    rows
      .into_iter()
      .map(|(id, code, name, span)| {
        Ok(NameRecord { id, name_type: decode_code("name", &code)?, name, span })
      })
      .collect()
  }

  pub fn current_legal_name(conn: &Connection, corp_num: &str) -> Result<Option<String>> {
    Ok(
      conn
        .query_row(
          "SELECT corp_name FROM corp_name
           WHERE corp_num = ?1 AND corp_name_typ_cd IN ('CO', 'NB')
             AND end_event_id IS NULL",
          params![corp_num],
          |row| row.get(0),
        )
        .optional()?,
    )
  }

  pub fn current_translations(conn: &Connection, corp_num: &str) -> Result<Vec<String>> {
    Ok(
      Self::current(conn, corp_num)?
        .into_iter()
        .filter(|r| r.name_type == NameType::Translation)
        .map(|r| r.name)
        .collect(),
    )
  }

  /// Names started or ended by `event_id`.
  pub fn touching(conn: &Connection, corp_num: &str, event_id: EventId) -> Result<Vec<NameRecord>> {
    Self::query(
      conn,
      "(start_event_id = ?2 OR end_event_id = ?2)",
      params![corp_num, event_id],
    )
  }
}

impl TemporalStore for NameStore {
  type Key = NameKey;
  type Payload = (NameType, String);
  type Record = NameRecord;

  fn current(conn: &Connection, corp_num: &str) -> Result<Vec<NameRecord>> {
    Self::query(conn, "end_event_id IS NULL", params![corp_num])
  }

  fn as_of(conn: &Connection, corp_num: &str, event_id: EventId) -> Result<Vec<NameRecord>> {
    Self::query(conn, AS_OF, params![corp_num, event_id])
  }

  fn create(
    conn: &Connection,
    corp_num: &str,
    event_id: EventId,
    (name_type, name): &(NameType, String),
  ) -> Result<NameRecord> {
    conn.execute(
      "INSERT INTO corp_name (corp_num, corp_name_typ_cd, corp_name, start_event_id)
       VALUES (?1, ?2, ?3, ?4)",
      params![corp_num, name_type.code(), name, event_id],
    )?;
    Ok(NameRecord {
      id:        conn.last_insert_rowid(),
      name_type: *name_type,
      name:      name.clone(),
      span:      TemporalSpan::open(event_id),
    })
  }

  fn end(conn: &Connection, corp_num: &str, event_id: EventId, key: &NameKey) -> Result<bool> {
    let n = match key {
      NameKey::Legal => conn.execute(
        "UPDATE corp_name SET end_event_id = ?2
         WHERE corp_num = ?1 AND corp_name_typ_cd IN ('CO', 'NB')
           AND end_event_id IS NULL",
        params![corp_num, event_id],
      )?,
      NameKey::Translation(name) => conn.execute(
        "UPDATE corp_name SET end_event_id = ?2
         WHERE corp_num = ?1 AND corp_name_typ_cd = 'TR' AND corp_name = ?3
           AND end_event_id IS NULL",
        params![corp_num, event_id, name],
      )?,
    };
    Ok(n > 0)
  }
}

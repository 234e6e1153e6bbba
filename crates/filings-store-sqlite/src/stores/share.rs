//! Share structures and their resolution dates.
//!
//! A structure is one `share_struct` row owning its classes; series are kept
//! as JSON on the class row. The whole structure is versioned as a unit.

use chrono::NaiveDate;
use filings_core::{
  filing::{ShareClass, ShareSeries},
  temporal::{EventId, TemporalSpan},
};
use rusqlite::{Connection, Params, params};

use super::{AS_OF, TemporalStore, span};
use crate::{
  Result,
  encode::{decode_date, decode_ind, encode_date, encode_ind},
};

#[derive(Debug, Clone, PartialEq)]
pub struct ShareStructureRecord {
  pub id:            i64,
  pub span:          TemporalSpan,
  pub share_classes: Vec<ShareClass>,
}

pub struct ShareStore;

impl ShareStore {
  fn query(
    conn: &Connection,
    filter: &str,
    params: impl Params,
  ) -> Result<Vec<ShareStructureRecord>> {
    let sql = format!(
      "SELECT share_structure_id, start_event_id, end_event_id
       FROM share_struct WHERE corp_num = ?1 AND {filter}
       ORDER BY share_structure_id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let heads = stmt
      .query_map(params, |row| {
        Ok((
          row.get::<_, i64>("share_structure_id")?,
          span(row, "start_event_id", "end_event_id")?,
        ))
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?;

    heads
      .into_iter()
      .map(|(id, span)| {
        Ok(ShareStructureRecord { id, span, share_classes: Self::classes(conn, id)? })
      })
      .collect()
  }

  fn classes(conn: &Connection, structure_id: i64) -> Result<Vec<ShareClass>> {
    let mut stmt = conn.prepare(
      "SELECT class_nme, priority, max_share_ind, share_quantity, par_value_ind,
              par_value_amt, currency_typ_cd, spec_rights_ind, series_json
       FROM share_struct_cls WHERE share_structure_id = ?1
       ORDER BY seq_num",
    )?;
    let rows = stmt
      .query_map(params![structure_id], |row| {
        Ok((
          ShareClass {
            name: row.get(0)?,
            priority: row.get(1)?,
            has_maximum_shares: decode_ind(row.get::<_, Option<String>>(2)?.as_deref()),
            max_number_of_shares: row.get(3)?,
            has_par_value: decode_ind(row.get::<_, Option<String>>(4)?.as_deref()),
            par_value: row.get(5)?,
            currency: row.get(6)?,
            has_rights_or_restrictions: decode_ind(
              row.get::<_, Option<String>>(7)?.as_deref(),
            ),
            series: Vec::new(),
          },
          row.get::<_, String>(8)?,
        ))
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?;

    rows
      .into_iter()
      .map(|(mut class, series_json)| {
        class.series = serde_json::from_str::<Vec<ShareSeries>>(&series_json)?;
        Ok(class)
      })
      .collect()
  }

  pub fn add_resolution(
    conn: &Connection,
    corp_num: &str,
    event_id: EventId,
    date: NaiveDate,
  ) -> Result<()> {
    conn.execute(
      "INSERT INTO resolution (corp_num, start_event_id, resolution_dt)
       VALUES (?1, ?2, ?3)",
      params![corp_num, event_id, encode_date(date)],
    )?;
    Ok(())
  }

  /// Resolution dates recorded by `event_id`.
  pub fn resolutions_at(
    conn: &Connection,
    corp_num: &str,
    event_id: EventId,
  ) -> Result<Vec<NaiveDate>> {
    let mut stmt = conn.prepare(
      "SELECT resolution_dt FROM resolution
       WHERE corp_num = ?1 AND start_event_id = ?2
       ORDER BY resolution_dt",
    )?;
    let raws = stmt
      .query_map(params![corp_num, event_id], |row| row.get::<_, String>(0))?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    raws.iter().map(|s| decode_date(s)).collect()
  }
}

impl TemporalStore for ShareStore {
  type Key = ();
  type Payload = [ShareClass];
  type Record = ShareStructureRecord;

  fn current(conn: &Connection, corp_num: &str) -> Result<Vec<ShareStructureRecord>> {
    Self::query(conn, "end_event_id IS NULL", params![corp_num])
  }

  fn as_of(
    conn: &Connection,
    corp_num: &str,
    event_id: EventId,
  ) -> Result<Vec<ShareStructureRecord>> {
    Self::query(conn, AS_OF, params![corp_num, event_id])
  }

  fn create(
    conn: &Connection,
    corp_num: &str,
    event_id: EventId,
    classes: &[ShareClass],
  ) -> Result<ShareStructureRecord> {
    conn.execute(
      "INSERT INTO share_struct (corp_num, start_event_id) VALUES (?1, ?2)",
      params![corp_num, event_id],
    )?;
    let id = conn.last_insert_rowid();

    for (seq, class) in classes.iter().enumerate() {
      conn.execute(
        "INSERT INTO share_struct_cls (
           share_structure_id, seq_num, class_nme, priority, max_share_ind,
           share_quantity, par_value_ind, par_value_amt, currency_typ_cd,
           spec_rights_ind, series_json
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
          id,
          seq as i64 + 1,
          class.name,
          class.priority,
          encode_ind(class.has_maximum_shares),
          class.max_number_of_shares,
          encode_ind(class.has_par_value),
          class.par_value,
          class.currency,
          encode_ind(class.has_rights_or_restrictions),
          serde_json::to_string(&class.series)?,
        ],
      )?;
    }

    Ok(ShareStructureRecord {
      id,
      span: TemporalSpan::open(event_id),
      share_classes: classes.to_vec(),
    })
  }

  fn end(conn: &Connection, corp_num: &str, event_id: EventId, _: &()) -> Result<bool> {
    let n = conn.execute(
      "UPDATE share_struct SET end_event_id = ?2
       WHERE corp_num = ?1 AND end_event_id IS NULL",
      params![corp_num, event_id],
    )?;
    Ok(n > 0)
  }
}

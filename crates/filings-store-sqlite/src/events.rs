//! Event id allocation.
//!
//! Two allocators, chosen by the corp number: cooperatives draw from the
//! `noncorp_event_seq` sequence, everything else increments the `EV` row of
//! `system_id`. Both run inside the caller's transaction; the submit
//! transaction is `IMMEDIATE`, so the counter row is already write-locked.

use chrono::Utc;
use filings_core::{
  entity::uses_noncorp_sequence,
  temporal::{EventId, EventType},
};
use rusqlite::{Connection, params};

use crate::{Result, encode::encode_dt};

/// Allocate the next event id for `corp_num` and insert its event row.
pub fn allocate(
  conn: &Connection,
  corp_num: &str,
  event_type: EventType,
) -> Result<EventId> {
  let event_id: EventId = if uses_noncorp_sequence(corp_num) {
    conn.execute("INSERT INTO noncorp_event_seq DEFAULT VALUES", [])?;
    conn.last_insert_rowid()
  } else {
    conn.query_row(
      "UPDATE system_id SET id_num = id_num + 1
       WHERE id_typ_cd = 'EV'
       RETURNING id_num - 1",
      [],
      |row| row.get(0),
    )?
  };

  conn.execute(
    "INSERT INTO event (event_id, corp_num, event_typ_cd, event_timestmp)
     VALUES (?1, ?2, ?3, ?4)",
    params![event_id, corp_num, event_type.code(), encode_dt(Utc::now())],
  )?;

  tracing::debug!(event_id, corp_num, event_type = %event_type, "allocated event");
  Ok(event_id)
}

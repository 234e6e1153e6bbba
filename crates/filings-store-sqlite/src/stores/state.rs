//! Corporate state: active, amalgamated, dissolved, and so on.

use filings_core::{
  entity::CorpState,
  temporal::{EventId, TemporalSpan},
};
use rusqlite::{Connection, Params, params};

use super::{AS_OF, TemporalStore, span};
use crate::{Result, encode::decode_code};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateRecord {
  pub span:  TemporalSpan,
  pub state: CorpState,
}

pub struct StateStore;

impl StateStore {
  fn query(conn: &Connection, filter: &str, params: impl Params) -> Result<Vec<StateRecord>> {
    let sql = format!(
      "SELECT start_event_id, end_event_id, state_typ_cd
       FROM corp_state WHERE corp_num = ?1 AND {filter}
       ORDER BY corp_state_id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
      .query_map(params, |row| {
        Ok((span(row, "start_event_id", "end_event_id")?, row.get::<_, String>("state_typ_cd")?))
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    rows
      .into_iter()
      .map(|(span, code)| Ok(StateRecord { span, state: decode_code("state", &code)? }))
      .collect()
  }

  pub fn current_state(conn: &Connection, corp_num: &str) -> Result<Option<CorpState>> {
    Ok(Self::current(conn, corp_num)?.into_iter().next().map(|r| r.state))
  }

  /// End the current state, if any, and start `state`.
  pub fn transition(
    conn: &Connection,
    corp_num: &str,
    event_id: EventId,
    state: CorpState,
  ) -> Result<StateRecord> {
    let from = Self::current_state(conn, corp_num)?;
    Self::end(conn, corp_num, event_id, &())?;
    let record = Self::create(conn, corp_num, event_id, &state)?;
    tracing::debug!(corp_num, event_id, ?from, to = %state, "state transition");
    Ok(record)
  }
}

impl TemporalStore for StateStore {
  type Key = ();
  type Payload = CorpState;
  type Record = StateRecord;

  fn current(conn: &Connection, corp_num: &str) -> Result<Vec<StateRecord>> {
    Self::query(conn, "end_event_id IS NULL", params![corp_num])
  }

  fn as_of(conn: &Connection, corp_num: &str, event_id: EventId) -> Result<Vec<StateRecord>> {
    Self::query(conn, AS_OF, params![corp_num, event_id])
  }

  fn create(
    conn: &Connection,
    corp_num: &str,
    event_id: EventId,
    state: &CorpState,
  ) -> Result<StateRecord> {
    conn.execute(
      "INSERT INTO corp_state (corp_num, start_event_id, state_typ_cd)
       VALUES (?1, ?2, ?3)",
      params![corp_num, event_id, state.code()],
    )?;
    Ok(StateRecord { span: TemporalSpan::open(event_id), state: *state })
  }

  fn end(conn: &Connection, corp_num: &str, event_id: EventId, _: &()) -> Result<bool> {
    let n = conn.execute(
      "UPDATE corp_state SET end_event_id = ?2
       WHERE corp_num = ?1 AND end_event_id IS NULL",
      params![corp_num, event_id],
    )?;
    Ok(n > 0)
  }
}

//! Temporal entity stores.
//!
//! Each kind of versioned record (names, offices, parties, …) gets a unit
//! struct implementing [`TemporalStore`]. All functions take a borrowed
//! [`Connection`], so they run equally inside a write transaction (via
//! `Deref`) or against a plain connection in tests.
//!
//! `create` never ends anything. Callers keep the current-uniqueness
//! invariant by ending the current record for a key before creating its
//! replacement; the partial unique indexes in the schema reject any write
//! that forgets to.

use filings_core::temporal::{EventId, TemporalSpan};
use rusqlite::{Connection, Row};

use crate::Result;

pub mod address;
pub mod amalgamating;
pub mod corporation;
pub mod jurisdiction;
pub mod name;
pub mod office;
pub mod party;
pub mod restriction;
pub mod share;
pub mod state;

/// The uniform contract every temporal record kind implements.
pub trait TemporalStore {
  type Record;
  /// The semantic key identifying "the same" record across versions.
  type Key: ?Sized;
  type Payload: ?Sized;

  /// Records with no end event.
  fn current(conn: &Connection, corp_num: &str) -> Result<Vec<Self::Record>>;

  /// Records satisfying `start <= event_id < end`.
  fn as_of(
    conn: &Connection,
    corp_num: &str,
    event_id: EventId,
  ) -> Result<Vec<Self::Record>>;

  /// Insert a new current record starting at `event_id`.
  fn create(
    conn: &Connection,
    corp_num: &str,
    event_id: EventId,
    payload: &Self::Payload,
  ) -> Result<Self::Record>;

  /// End the current record for `key` at `event_id`. Returns `false` when
  /// there is none.
  fn end(
    conn: &Connection,
    corp_num: &str,
    event_id: EventId,
    key: &Self::Key,
  ) -> Result<bool>;
}

/// Boundary predicate shared by every `as_of` query; `?2` is the event id.
pub(crate) const AS_OF: &str =
  "start_event_id <= ?2 AND (end_event_id IS NULL OR end_event_id > ?2)";

/// Read the span from the named columns of a row.
pub(crate) fn span(row: &Row<'_>, start: &str, end: &str) -> rusqlite::Result<TemporalSpan> {
  Ok(TemporalSpan {
    start_event_id: row.get(start)?,
    end_event_id:   row.get(end)?,
  })
}

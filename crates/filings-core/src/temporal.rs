//! Events and the start/end span every temporal record carries.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// Ledger event identifier; monotonically allocated.
pub type EventId = i64;

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  IntoStaticStr,
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum EventType {
  /// A filing.
  File,
  /// Administrative dissolution.
  Sysda,
  /// Involuntary dissolution for overdue annual reports.
  Sysdf,
  /// Involuntary dissolution for an overdue transition.
  Sysdt,
}

impl EventType {
  pub fn code(self) -> &'static str { self.into() }
}

/// The interval of events over which a record is current. An open end
/// means the record is current now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalSpan {
  pub start_event_id: EventId,
  pub end_event_id:   Option<EventId>,
}

impl TemporalSpan {
  pub fn open(start_event_id: EventId) -> Self {
    Self { start_event_id, end_event_id: None }
  }

  /// `start <= event < end`.
  pub fn is_current_as_of(&self, event_id: EventId) -> bool {
    self.start_event_id <= event_id
      && self.end_event_id.is_none_or(|end| end > event_id)
  }

  pub fn started_at(&self, event_id: EventId) -> bool {
    self.start_event_id == event_id
  }

  pub fn ended_at(&self, event_id: EventId) -> bool {
    self.end_event_id == Some(event_id)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn as_of_boundaries() {
    let span = TemporalSpan { start_event_id: 10, end_event_id: Some(20) };
    assert!(!span.is_current_as_of(9));
    assert!(span.is_current_as_of(10));
    assert!(span.is_current_as_of(19));
    assert!(!span.is_current_as_of(20));
    assert!(TemporalSpan::open(10).is_current_as_of(1_000));
  }

  #[test]
  fn event_type_codes() {
    assert_eq!(EventType::Sysdf.code(), "SYSDF");
    assert_eq!("FILE".parse::<EventType>().unwrap(), EventType::File);
  }
}

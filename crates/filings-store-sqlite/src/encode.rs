//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings so that text
//! ordering is chronological. Dates are `%Y-%m-%d`. Codes are the legacy
//! strings produced by each enum's `code()`.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

pub fn decode_opt_date(s: Option<&str>) -> Result<Option<NaiveDate>> {
  s.map(decode_date).transpose()
}

/// Midnight UTC on `d`.
pub fn date_to_dt(d: NaiveDate) -> DateTime<Utc> {
  d.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc()
}

// ─── Codes ───────────────────────────────────────────────────────────────────

pub fn decode_code<T: FromStr>(what: &'static str, s: &str) -> Result<T> {
  s.parse().map_err(|_| Error::Decode { what, code: s.to_string() })
}

pub fn encode_ind(b: bool) -> &'static str { if b { "Y" } else { "N" } }

pub fn decode_ind(s: Option<&str>) -> bool { s == Some("Y") }

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn timestamps_sort_as_text() {
    let a = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
    let b = a + chrono::Duration::milliseconds(500);
    assert!(encode_dt(a) < encode_dt(b));
    assert_eq!(decode_dt(&encode_dt(b)).unwrap(), b);
  }

  #[test]
  fn unknown_code_is_a_decode_error() {
    let err = decode_code::<filings_core::codes::TypeCode>("filing", "XXXXX").unwrap_err();
    assert!(matches!(err, Error::Decode { what: "filing", .. }));
  }
}

//! Ledger notations written alongside a filing.

use chrono::{Datelike, NaiveDate};

use crate::filing::OfficeType;

pub const DIRECTOR_CHANGE: &str = "Director change.";

pub fn annual_report_line(ar_date: NaiveDate, agm_date: Option<NaiveDate>) -> String {
  match agm_date {
    Some(agm) => format!("ANNUAL REPORT - {}", agm.format("%Y-%m-%d")),
    None => format!("ANNUAL REPORT - NO AGM HELD IN {}", ar_date.year()),
  }
}

pub fn office_line(office_type: OfficeType) -> String {
  format!("Change to the {}.", office_type.description())
}

/// Accumulates notation lines for one filing.
#[derive(Debug, Clone, Default)]
pub struct Narrative {
  lines: Vec<String>,
}

impl Narrative {
  pub fn push(&mut self, line: impl Into<String>) {
    let line = line.into();
    if !line.is_empty() {
      self.lines.push(line);
    }
  }

  pub fn is_empty(&self) -> bool { self.lines.is_empty() }

  /// The lines joined with single spaces; `None` when nothing was pushed.
  pub fn render(&self) -> Option<String> {
    (!self.lines.is_empty()).then(|| self.lines.join(" "))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn annual_report_lines() {
    let ar = NaiveDate::from_ymd_opt(2020, 9, 17).unwrap();
    assert_eq!(annual_report_line(ar, None), "ANNUAL REPORT - NO AGM HELD IN 2020");
    let agm = NaiveDate::from_ymd_opt(2020, 6, 1).unwrap();
    assert_eq!(annual_report_line(ar, Some(agm)), "ANNUAL REPORT - 2020-06-01");
  }

  #[test]
  fn lines_join_with_single_spaces() {
    let mut n = Narrative::default();
    assert_eq!(n.render(), None);
    n.push(DIRECTOR_CHANGE);
    n.push("");
    n.push(office_line(OfficeType::RegisteredOffice));
    n.push(office_line(OfficeType::RecordsOffice));
    assert_eq!(
      n.render().as_deref(),
      Some("Director change. Change to the Registered Office. Change to the Records Office.")
    );
  }
}

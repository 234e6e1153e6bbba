//! The `FilingLedger` trait: the façade every caller drives.
//!
//! Implemented by storage backends (e.g. `filings-store-sqlite`). The CLI
//! and any outer API layer depend on this abstraction, not on a concrete
//! backend.

use std::future::Future;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  document::FilingDocument,
  entity::{Business, NewBusiness},
  filing::{Filing, FilingSelector},
  temporal::EventId,
};

/// Filings dated before this day predate electronic filing and are only
/// available on paper.
pub fn digitization_cutover() -> NaiveDate {
  NaiveDate::from_ymd_opt(2019, 3, 8).unwrap_or_default()
}

/// Why an entity is being involuntarily dissolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DissolutionMetadata {
  #[serde(rename = "overdueARs")]
  pub overdue_ars:        bool,
  #[serde(rename = "overdueTransition")]
  pub overdue_transition: bool,
}

/// Abstraction over a filing ledger backend.
///
/// Every write is one atomic transaction: either all of a filing's records
/// land, or none do. Records are never updated in place or deleted; a
/// change ends the current record and starts a new one under the same
/// event.
pub trait FilingLedger: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Entities ──────────────────────────────────────────────────────────

  /// Create the corporation summary a business's filings attach to.
  fn register_business(
    &self,
    business: NewBusiness,
  ) -> impl Future<Output = Result<Business, Self::Error>> + Send + '_;

  /// Retrieve a business with its current name and state. Returns `None`
  /// if not found.
  fn get_business(
    &self,
    identifier: String,
  ) -> impl Future<Output = Result<Option<Business>, Self::Error>> + Send + '_;

  // ── Filings ───────────────────────────────────────────────────────────

  /// Apply a filing and return the event it was recorded under.
  fn submit(
    &self,
    filing: Filing,
  ) -> impl Future<Output = Result<EventId, Self::Error>> + Send + '_;

  /// Rebuild the document of a stored filing as of its event.
  fn reconstruct(
    &self,
    selector: FilingSelector,
  ) -> impl Future<Output = Result<FilingDocument, Self::Error>> + Send + '_;

  /// Paper-only headers for every filing that predates electronic filing,
  /// or every filing of a non-cooperative.
  fn historic_filings(
    &self,
    identifier: String,
  ) -> impl Future<Output = Result<Vec<FilingDocument>, Self::Error>> + Send + '_;

  /// Headers for filings whose effective date is still in the future.
  fn future_effective_filings(
    &self,
    identifier: String,
  ) -> impl Future<Output = Result<Vec<FilingDocument>, Self::Error>> + Send + '_;

  // ── System events ─────────────────────────────────────────────────────

  fn add_administrative_dissolution(
    &self,
    identifier: String,
  ) -> impl Future<Output = Result<EventId, Self::Error>> + Send + '_;

  /// Record an involuntary dissolution. Returns `None` when the metadata
  /// names no reason.
  fn add_involuntary_dissolution(
    &self,
    identifier: String,
    metadata: DissolutionMetadata,
  ) -> impl Future<Output = Result<Option<EventId>, Self::Error>> + Send + '_;
}

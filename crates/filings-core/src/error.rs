//! Error types for `filings-core`.

use thiserror::Error;

use crate::codes::{FilingType, RegistryError, SubType};

#[derive(Debug, Error)]
pub enum Error {
  /// Unknown or unsupported filing type, code, or type/entity combination.
  #[error("invalid filing type: {0}")]
  InvalidFilingType(String),

  #[error("filing type {filing_type} does not support sub type {sub_type}")]
  UnsupportedFilingType {
    filing_type: FilingType,
    sub_type:    SubType,
  },

  #[error("business not found: {0}")]
  EntityNotFound(String),

  #[error("{filing_type} filing not found for {identifier}")]
  FilingNotFound {
    identifier:  String,
    filing_type: String,
  },

  #[error("offices not found for {0}")]
  OfficeNotFound(String),

  #[error("parties not found for {0}")]
  PartiesNotFound(String),

  #[error("unable to determine corp type for {0} filing")]
  UnableToDetermineCorpType(FilingType),

  /// An incoming name/address change names a director with no current
  /// match. A data error in the submission, not a system fault.
  #[error("director does not exist: {0}")]
  DirectorNotFound(String),

  #[error("{filing_type} filing is missing {component}")]
  MissingComponent {
    filing_type: FilingType,
    component:   &'static str,
  },

  #[error("code registry error: {0}")]
  Registry(#[from] RegistryError),

  #[error("schema error: {0}")]
  Schema(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  /// HTTP-equivalent status for an outer API layer.
  pub fn status_code(&self) -> u16 {
    match self {
      Self::InvalidFilingType(_)
      | Self::UnsupportedFilingType { .. }
      | Self::MissingComponent { .. } => 400,
      Self::EntityNotFound(_)
      | Self::FilingNotFound { .. }
      | Self::OfficeNotFound(_)
      | Self::PartiesNotFound(_)
      | Self::DirectorNotFound(_) => 404,
      Self::UnableToDetermineCorpType(_)
      | Self::Registry(_)
      | Self::Schema(_)
      | Self::Serialization(_) => 500,
    }
  }

  /// Whether the error names a record that is genuinely absent. These pass
  /// through to callers without extra context.
  pub fn is_not_found(&self) -> bool { self.status_code() == 404 }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

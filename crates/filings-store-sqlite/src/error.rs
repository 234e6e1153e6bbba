//! Error type for `filings-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] filings_core::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored code that no longer parses.
  #[error("unrecognised {what} code: {code:?}")]
  Decode { what: &'static str, code: String },

  /// Any failure other than a named not-found, with the filing it occurred
  /// in.
  #[error("{filing_type} filing for {identifier}: {source}")]
  Filing {
    identifier:  String,
    filing_type: String,
    #[source]
    source:      Box<Error>,
  },
}

impl Error {
  /// HTTP-equivalent status for an outer API layer.
  pub fn status_code(&self) -> u16 {
    match self {
      Self::Core(e) => e.status_code(),
      Self::Filing { source, .. } => source.status_code(),
      _ => 500,
    }
  }

  pub fn is_not_found(&self) -> bool { self.status_code() == 404 }

  /// Attach filing context. Named not-found errors pass through unchanged.
  pub fn with_filing_context(
    self,
    identifier: &str,
    filing_type: impl ToString,
  ) -> Self {
    if self.is_not_found() || matches!(self, Self::Filing { .. }) {
      return self;
    }
    tracing::error!(identifier, error = %self, "filing operation failed");
    Self::Filing {
      identifier:  identifier.to_string(),
      filing_type: filing_type.to_string(),
      source:      Box::new(self),
    }
  }

  /// Carry a crate error out of a [`tokio_rusqlite::Connection::call`]
  /// closure.
  pub(crate) fn into_call(self) -> tokio_rusqlite::Error {
    match self {
      Self::Sqlite(e) => tokio_rusqlite::Error::Rusqlite(e),
      other => tokio_rusqlite::Error::Other(Box::new(other)),
    }
  }

  /// Inverse of [`Error::into_call`].
  pub(crate) fn from_call(err: tokio_rusqlite::Error) -> Self {
    match err {
      tokio_rusqlite::Error::Rusqlite(e) => Self::Sqlite(e),
      tokio_rusqlite::Error::Other(boxed) => match boxed.downcast::<Error>() {
        Ok(e) => *e,
        Err(other) => Self::Database(tokio_rusqlite::Error::Other(other)),
      },
      other => Self::Database(other),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

//! Runtime configuration, layered from an optional TOML file and
//! `FILINGS_*` environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LedgerConfig {
  /// SQLite database file. `~` expands to the home directory.
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  /// Directory of per-filing-type JSON schemas. When unset, the compiled-in
  /// component sets are used.
  #[serde(default)]
  pub schema_dir: Option<PathBuf>,
}

fn default_store_path() -> PathBuf { PathBuf::from("filings.db") }

impl LedgerConfig {
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("FILINGS"))
      .build()
      .context("failed to read config file")?;

    let mut cfg: LedgerConfig = settings
      .try_deserialize()
      .context("failed to deserialise LedgerConfig")?;
    cfg.store_path = expand_tilde(&cfg.store_path);
    cfg.schema_dir = cfg.schema_dir.as_deref().map(expand_tilde);
    Ok(cfg)
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_file_falls_back_to_defaults() {
    let cfg = LedgerConfig::load(Path::new("/nonexistent/filings.toml")).unwrap();
    assert_eq!(cfg.store_path, PathBuf::from("filings.db"));
    assert_eq!(cfg.schema_dir, None);
  }

  #[test]
  fn tilde_is_expanded() {
    let Ok(home) = std::env::var("HOME") else {
      return;
    };
    assert_eq!(
      expand_tilde(Path::new("~/ledger/filings.db")),
      PathBuf::from(home).join("ledger/filings.db")
    );
    assert_eq!(expand_tilde(Path::new("/abs/x.db")), PathBuf::from("/abs/x.db"));
  }
}

//! `filings`: command-line driver for the corporate filing ledger.
//!
//! # Usage
//!
//! ```
//! filings register BC0870123 --legal-type BC
//! filings submit change_of_address.json
//! filings show --event 100000000
//! filings show --identifier BC0870123 --filing-type annualReport --year 2024
//! filings history BC0870123
//! ```
//!
//! Configuration comes from `filings.toml` (or `--config`) layered with
//! `FILINGS_*` environment variables.

mod config;

use std::{
  io::Read as _,
  path::{Path, PathBuf},
};

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use filings_core::{
  codes::{FilingType, SubType},
  components::SchemaDirComponents,
  entity::{EntityType, NewBusiness},
  filing::{Filing, FilingSelector},
  ledger::{DissolutionMetadata, FilingLedger},
};
use filings_store_sqlite::SqliteLedger;
use serde::Serialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::LedgerConfig;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(author, version, about = "Corporate filing ledger")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "filings.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Create the corporation summary a business's filings attach to.
  Register {
    identifier:    String,
    /// Legacy entity type code, e.g. `BC`, `BEN`, `CP`.
    #[arg(long)]
    legal_type:    String,
    /// RFC 3339 founding timestamp; defaults to now.
    #[arg(long)]
    founding_date: Option<DateTime<Utc>>,
  },
  /// Show a business with its current name and state.
  Business { identifier: String },
  /// Apply a filing read from a JSON file, or stdin when the path is `-`.
  Submit { file: PathBuf },
  /// Reconstruct a stored filing.
  Show {
    #[arg(long, conflicts_with_all = ["identifier", "filing_type"])]
    event:       Option<i64>,
    #[arg(long, requires = "filing_type")]
    identifier:  Option<String>,
    /// camelCase filing type, e.g. `changeOfAddress`.
    #[arg(long, requires = "identifier")]
    filing_type: Option<String>,
    #[arg(long)]
    sub_type:    Option<String>,
    /// Restrict to filings whose period ends in this year.
    #[arg(long)]
    year:        Option<i32>,
  },
  /// List paper-only historic filings.
  History { identifier: String },
  /// List filings whose effective date is still ahead.
  Future { identifier: String },
  /// Record an administrative dissolution.
  DissolveAdmin { identifier: String },
  /// Record an involuntary dissolution.
  DissolveInvoluntary {
    identifier:         String,
    #[arg(long)]
    overdue_ars:        bool,
    #[arg(long)]
    overdue_transition: bool,
  },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let cfg = LedgerConfig::load(&cli.config)?;

  let mut ledger = SqliteLedger::open(&cfg.store_path)
    .await
    .with_context(|| format!("failed to open ledger at {:?}", cfg.store_path))?;
  if let Some(dir) = &cfg.schema_dir {
    tracing::debug!(?dir, "reading component sets from schemas");
    ledger = ledger.with_components(SchemaDirComponents::new(dir));
  }

  run(&ledger, cli.command).await
}

async fn run(ledger: &SqliteLedger, command: Command) -> anyhow::Result<()> {
  match command {
    Command::Register { identifier, legal_type, founding_date } => {
      let entity_type: EntityType = legal_type
        .parse()
        .with_context(|| format!("unknown legal type {legal_type:?}"))?;
      let business = ledger
        .register_business(NewBusiness {
          identifier,
          entity_type,
          founding_date: founding_date.unwrap_or_else(Utc::now),
        })
        .await?;
      print_json(&business)
    }
    Command::Business { identifier } => {
      let business = ledger
        .get_business(identifier.clone())
        .await?
        .with_context(|| format!("no business {identifier}"))?;
      print_json(&business)
    }
    Command::Submit { file } => {
      let filing = read_filing(&file)?;
      let event_id = ledger.submit(filing).await?;
      print_json(&serde_json::json!({ "eventId": event_id }))
    }
    Command::Show { event, identifier, filing_type, sub_type, year } => {
      let selector = match (event, identifier, filing_type) {
        (Some(event_id), _, _) => FilingSelector::Event(event_id),
        (None, Some(identifier), Some(filing_type)) => FilingSelector::Latest {
          identifier,
          filing_type: parse_filing_type(&filing_type)?,
          sub_type: sub_type.as_deref().map(parse_sub_type).transpose()?,
          year,
        },
        _ => anyhow::bail!("give --event, or --identifier with --filing-type"),
      };
      print_json(&ledger.reconstruct(selector).await?)
    }
    Command::History { identifier } => print_json(&ledger.historic_filings(identifier).await?),
    Command::Future { identifier } => {
      print_json(&ledger.future_effective_filings(identifier).await?)
    }
    Command::DissolveAdmin { identifier } => {
      let event_id = ledger.add_administrative_dissolution(identifier).await?;
      print_json(&serde_json::json!({ "eventId": event_id }))
    }
    Command::DissolveInvoluntary { identifier, overdue_ars, overdue_transition } => {
      let event_id = ledger
        .add_involuntary_dissolution(identifier, DissolutionMetadata {
          overdue_ars,
          overdue_transition,
        })
        .await?;
      print_json(&serde_json::json!({ "eventId": event_id }))
    }
  }
}

fn read_filing(path: &Path) -> anyhow::Result<Filing> {
  let raw = if path == Path::new("-") {
    let mut buf = String::new();
    std::io::stdin().read_to_string(&mut buf).context("reading stdin")?;
    buf
  } else {
    std::fs::read_to_string(path)
      .with_context(|| format!("reading filing {}", path.display()))?
  };
  serde_json::from_str(&raw).context("parsing filing JSON")
}

fn parse_filing_type(s: &str) -> anyhow::Result<FilingType> {
  s.parse().with_context(|| format!("unknown filing type {s:?}"))
}

fn parse_sub_type(s: &str) -> anyhow::Result<SubType> {
  s.parse().with_context(|| format!("unknown filing sub type {s:?}"))
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}

#[cfg(test)]
mod tests {
  use clap::CommandFactory as _;

  use super::*;

  #[test]
  fn cli_definition_is_valid() { Cli::command().debug_assert(); }

  #[test]
  fn show_by_type_parses() {
    let cli = Cli::try_parse_from([
      "filings",
      "show",
      "--identifier",
      "BC0870123",
      "--filing-type",
      "annualReport",
      "--year",
      "2024",
    ])
    .unwrap();
    let Command::Show { identifier, filing_type, year, .. } = cli.command else {
      panic!("expected show");
    };
    assert_eq!(identifier.as_deref(), Some("BC0870123"));
    assert_eq!(parse_filing_type(&filing_type.unwrap()).unwrap(), FilingType::AnnualReport);
    assert_eq!(year, Some(2024));
  }

  #[test]
  fn unknown_filing_type_is_an_error() {
    assert!(parse_filing_type("notAFiling").is_err());
  }
}

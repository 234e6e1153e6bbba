//! Business entities: the thin summary record every filing attaches to.
//!
//! All history about an entity lives in its temporal records. The summary
//! only carries identity, type, and a few denormalised dates.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

// ─── Entity type ─────────────────────────────────────────────────────────────

/// The legal type of a business; the string form is the ledger code.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  IntoStaticStr,
)]
pub enum EntityType {
  #[serde(rename = "CP")]
  #[strum(serialize = "CP")]
  Coop,
  #[serde(rename = "BEN")]
  #[strum(serialize = "BEN")]
  BenefitCompany,
  #[serde(rename = "BC")]
  #[strum(serialize = "BC")]
  BcCompany,
  #[serde(rename = "ULC")]
  #[strum(serialize = "ULC")]
  UnlimitedLiability,
  #[serde(rename = "CC")]
  #[strum(serialize = "CC")]
  CommunityContribution,
  #[serde(rename = "CBEN")]
  #[strum(serialize = "CBEN")]
  BenefitContinueIn,
  #[serde(rename = "C")]
  #[strum(serialize = "C")]
  ContinueIn,
  #[serde(rename = "CUL")]
  #[strum(serialize = "CUL")]
  UnlimitedLiabilityContinueIn,
  #[serde(rename = "CCC")]
  #[strum(serialize = "CCC")]
  CommunityContributionContinueIn,
}

impl EntityType {
  pub fn code(self) -> &'static str { self.into() }

  pub fn is_continue_in(self) -> bool {
    matches!(
      self,
      Self::BenefitContinueIn
        | Self::ContinueIn
        | Self::UnlimitedLiabilityContinueIn
        | Self::CommunityContributionContinueIn
    )
  }

  /// The ledger user recorded against filings for this entity type.
  pub fn ledger_user(self) -> &'static str {
    match self {
      Self::Coop => "COOPER",
      _ => "BCOMPS",
    }
  }

  /// Suffix appended to the corp number to form a numbered company name.
  pub fn numbered_name_suffix(self) -> Option<&'static str> {
    match self {
      Self::Coop => None,
      Self::BcCompany
      | Self::BenefitCompany
      | Self::ContinueIn
      | Self::BenefitContinueIn => Some("B.C. LTD."),
      Self::UnlimitedLiability | Self::UnlimitedLiabilityContinueIn => {
        Some("B.C. UNLIMITED LIABILITY COMPANY")
      }
      Self::CommunityContribution | Self::CommunityContributionContinueIn => {
        Some("B.C. COMMUNITY CONTRIBUTION COMPANY LTD.")
      }
    }
  }

  /// `"<corp number> <suffix>"`. Continued-in corp numbers carry a one
  /// letter prefix that the name drops.
  pub fn numbered_name(self, corp_num: &str) -> Option<String> {
    let suffix = self.numbered_name_suffix()?;
    let prefix = if self.is_continue_in() {
      corp_num.get(1..).unwrap_or(corp_num)
    } else {
      corp_num
    };
    Some(format!("{prefix} {suffix}"))
  }
}

// ─── Names ───────────────────────────────────────────────────────────────────

/// Kind of a recorded corporate name.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, IntoStaticStr,
)]
pub enum NameType {
  /// A chosen legal name.
  #[strum(serialize = "CO")]
  Corporate,
  /// A legal name derived from the corp number.
  #[strum(serialize = "NB")]
  Numbered,
  #[strum(serialize = "TR")]
  Translation,
}

impl NameType {
  pub fn code(self) -> &'static str { self.into() }

  pub fn is_legal(self) -> bool { !matches!(self, Self::Translation) }
}

// ─── Corporate state ─────────────────────────────────────────────────────────

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
pub enum CorpState {
  #[serde(rename = "ACT")]
  #[strum(serialize = "ACT")]
  Active,
  #[serde(rename = "HAM")]
  #[strum(serialize = "HAM")]
  Amalgamated,
  #[serde(rename = "HCI")]
  #[strum(serialize = "HCI")]
  ContinuedIn,
  #[serde(rename = "HDV")]
  #[strum(serialize = "HDV")]
  VoluntaryDissolution,
  #[serde(rename = "HDA")]
  #[strum(serialize = "HDA")]
  AdministrativeDissolution,
  #[serde(rename = "HDF")]
  #[strum(serialize = "HDF")]
  InvoluntaryDissolutionNoAr,
  #[serde(rename = "HDT")]
  #[strum(serialize = "HDT")]
  InvoluntaryDissolutionNoTransition,
}

impl CorpState {
  pub fn code(self) -> &'static str { self.into() }
}

/// Frozen flag on the corporation summary.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
pub enum FrozenType {
  #[serde(rename = "C")]
  #[strum(serialize = "C")]
  Company,
}

// ─── Identifiers ─────────────────────────────────────────────────────────────

/// Normalise a public identifier to the ledger's corp number: `BC1234567`
/// is stored as `1234567`; cooperative and continued-in numbers are kept.
pub fn corp_num_from_identifier(identifier: &str) -> String {
  match identifier.strip_prefix("BC") {
    Some(rest) if !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()) => {
      rest.to_string()
    }
    _ => identifier.to_string(),
  }
}

/// Inverse of [`corp_num_from_identifier`].
pub fn identifier_from_corp_num(corp_num: &str) -> String {
  if !corp_num.is_empty() && corp_num.chars().all(|c| c.is_ascii_digit()) {
    format!("BC{corp_num}")
  } else {
    corp_num.to_string()
  }
}

/// Cooperative corp numbers draw event ids from a dedicated sequence; all
/// others share the locked counter row.
pub fn uses_noncorp_sequence(corp_num: &str) -> bool { corp_num.starts_with("CP") }

// ─── Business ────────────────────────────────────────────────────────────────

/// The corporation summary, with its current name and state resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Business {
  /// Ledger corp number (see [`corp_num_from_identifier`]).
  #[serde(skip)]
  pub corp_num:           String,
  pub identifier:         String,
  #[serde(rename = "legalType")]
  pub entity_type:        EntityType,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub legal_name:         Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub state:              Option<CorpState>,
  pub founding_date:      DateTime<Utc>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub last_ar_filed_date: Option<NaiveDate>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub last_agm_date:      Option<NaiveDate>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub frozen:             Option<FrozenType>,
}

/// Input to [`crate::ledger::FilingLedger::register_business`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBusiness {
  pub identifier:    String,
  #[serde(rename = "legalType")]
  pub entity_type:   EntityType,
  pub founding_date: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn bc_prefix_is_stripped_and_restored() {
    assert_eq!(corp_num_from_identifier("BC0870123"), "0870123");
    assert_eq!(identifier_from_corp_num("0870123"), "BC0870123");
    assert_eq!(corp_num_from_identifier("CP0001234"), "CP0001234");
    assert_eq!(identifier_from_corp_num("CP0001234"), "CP0001234");
    assert_eq!(corp_num_from_identifier("BCX"), "BCX");
  }

  #[test]
  fn numbered_names() {
    assert_eq!(
      EntityType::BcCompany.numbered_name("0870123").as_deref(),
      Some("0870123 B.C. LTD.")
    );
    assert_eq!(
      EntityType::UnlimitedLiabilityContinueIn.numbered_name("C0870123").as_deref(),
      Some("0870123 B.C. UNLIMITED LIABILITY COMPANY")
    );
    assert_eq!(EntityType::Coop.numbered_name("CP0001234"), None);
  }

  #[test]
  fn entity_type_codes_parse() {
    assert_eq!("CBEN".parse::<EntityType>().unwrap(), EntityType::BenefitContinueIn);
    assert_eq!(EntityType::Coop.code(), "CP");
    assert!("XX".parse::<EntityType>().is_err());
  }
}

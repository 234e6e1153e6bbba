//! Filing types: the submission aggregate and its body components.
//!
//! A filing is never persisted as one row. The writer fans its body out
//! into temporal records, and the reconstructor assembles a body back from
//! them.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{
  codes::{FilingType, SubType},
  entity::EntityType,
  temporal::EventId,
};

fn is_false(b: &bool) -> bool { !*b }

// ─── Addresses & offices ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Address {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub street_address:            Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub street_address_additional: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub address_city:              Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub address_region:            Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub postal_code:               Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub address_country:           Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub delivery_instructions:     Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OfficeAddresses {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub delivery_address: Option<Address>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub mailing_address:  Option<Address>,
}

/// Office kinds; the serde form is the document key, the strum form the
/// ledger code.
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
#[serde(rename_all = "camelCase")]
pub enum OfficeType {
  #[strum(serialize = "RG")]
  RegisteredOffice,
  #[strum(serialize = "RC")]
  RecordsOffice,
  #[strum(serialize = "LQ")]
  CustodialOffice,
}

impl OfficeType {
  pub fn code(self) -> &'static str { self.into() }

  /// "Registered Office", as it appears in ledger notations.
  pub fn description(self) -> &'static str {
    match self {
      Self::RegisteredOffice => "Registered Office",
      Self::RecordsOffice => "Records Office",
      Self::CustodialOffice => "Custodial Office",
    }
  }
}

// ─── Parties ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyType {
  #[default]
  Person,
  Organization,
}

/// A person or organization named in a filing. The `prev_*` names carry
/// the old value of a name change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Officer {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub first_name:          Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub middle_initial:      Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub last_name:           Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub org_name:            Option<String>,
  pub party_type:          PartyType,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub email:               Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub prev_first_name:     Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub prev_middle_initial: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub prev_last_name:      Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub prev_org_name:       Option<String>,
}

impl Officer {
  /// Space-joined name parts, or the organization name.
  pub fn display_name(&self) -> String {
    if let Some(org) = self.org_name.as_deref().filter(|s| !s.is_empty()) {
      return org.to_string();
    }
    [&self.first_name, &self.middle_initial, &self.last_name]
      .into_iter()
      .filter_map(|p| p.as_deref())
      .filter(|p| !p.is_empty())
      .collect::<Vec<_>>()
      .join(" ")
  }

  pub fn has_previous_name(&self) -> bool {
    self.prev_first_name.is_some()
      || self.prev_middle_initial.is_some()
      || self.prev_last_name.is_some()
      || self.prev_org_name.is_some()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DirectorAction {
  Appointed,
  Ceased,
  NameChanged,
  AddressChanged,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DirectorEntry {
  pub officer:          Officer,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub delivery_address: Option<Address>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub mailing_address:  Option<Address>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub appointment_date: Option<NaiveDate>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub cessation_date:   Option<NaiveDate>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub actions:          Vec<DirectorAction>,
}

impl DirectorEntry {
  pub fn has(&self, action: DirectorAction) -> bool {
    self.actions.contains(&action)
  }
}

/// Party roles; the serde form is the document name, the strum form the
/// ledger code.
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
  IntoStaticStr,
)]
pub enum RoleType {
  #[strum(serialize = "DIR")]
  Director,
  #[strum(serialize = "INC")]
  Incorporator,
  #[serde(rename = "Completing Party")]
  #[strum(serialize = "CPRTY")]
  CompletingParty,
  #[strum(serialize = "RCC")]
  Custodian,
  #[strum(serialize = "LIQ")]
  Liquidator,
  #[strum(serialize = "RCM")]
  Receiver,
  #[strum(serialize = "OFF")]
  Officer,
}

impl RoleType {
  pub fn code(self) -> &'static str { self.into() }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
  pub role_type:        RoleType,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub appointment_date: Option<NaiveDate>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub cessation_date:   Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartyEntry {
  pub officer:          Officer,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub delivery_address: Option<Address>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub mailing_address:  Option<Address>,
  pub roles:            Vec<Role>,
}

// ─── Shares ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShareSeries {
  pub name:                       String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub priority:                   Option<i64>,
  pub has_maximum_shares:         bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub max_number_of_shares:       Option<i64>,
  pub has_rights_or_restrictions: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShareClass {
  pub name:                       String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub priority:                   Option<i64>,
  pub has_maximum_shares:         bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub max_number_of_shares:       Option<i64>,
  pub has_par_value:              bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub par_value:                  Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub currency:                   Option<String>,
  pub has_rights_or_restrictions: bool,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub series:                     Vec<ShareSeries>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShareStructure {
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub resolution_dates: Vec<NaiveDate>,
  pub share_classes:    Vec<ShareClass>,
}

// ─── Names ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NameRequest {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub legal_name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub legal_type: Option<EntityType>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub nr_number:  Option<String>,
}

/// A translated name. `new`/`ceased` are only set on reconstructed
/// documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NameTranslation {
  pub name:   String,
  #[serde(skip_serializing_if = "is_false")]
  pub new:    bool,
  #[serde(skip_serializing_if = "is_false")]
  pub ceased: bool,
}

impl NameTranslation {
  pub fn named(name: impl Into<String>) -> Self {
    Self { name: name.into(), ..Default::default() }
  }
}

// ─── Other components ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BusinessRef {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub identifier: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub legal_type: Option<EntityType>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContactPoint {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub email: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CourtOrder {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub file_number:     Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub effect_of_order: Option<String>,
}

impl CourtOrder {
  pub const PLAN_OF_ARRANGEMENT: &'static str = "planOfArrangement";
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ForeignJurisdiction {
  pub country:            String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub region:             Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub identifier:         Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub legal_name:         Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub incorporation_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmalgamatingRole {
  Amalgamating,
  Holding,
  Primary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmalgamatingBusiness {
  pub identifier:           String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub legal_name:           Option<String>,
  pub role:                 AmalgamatingRole,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub foreign_jurisdiction: Option<ForeignJurisdiction>,
}

// ─── Body ────────────────────────────────────────────────────────────────────

/// The typed component record of a filing. Every field is one member of the
/// closed [`Component`](crate::components::Component) set, plus `eventId`
/// on reconstructed documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilingBody {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub event_id:                    Option<EventId>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub annual_report_date:          Option<NaiveDate>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub annual_general_meeting_date: Option<NaiveDate>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub offices:                     Option<BTreeMap<OfficeType, OfficeAddresses>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub custodial_office:            Option<OfficeAddresses>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub directors:                   Option<Vec<DirectorEntry>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub parties:                     Option<Vec<PartyEntry>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub share_structure:             Option<ShareStructure>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub name_request:                Option<NameRequest>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub name_translations:           Option<Vec<NameTranslation>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub legal_name:                  Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub business:                    Option<BusinessRef>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub provisions_removed:          Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub has_provisions:              Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub resolution:                  Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub meeting_date:                Option<NaiveDate>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub dissolution_type:            Option<SubType>,
  /// Amalgamation sub-type.
  #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
  pub amalgamation_type:           Option<SubType>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub dissolution_date:            Option<NaiveDate>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub contact_point:               Option<ContactPoint>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub legal_type:                  Option<EntityType>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub court_order:                 Option<CourtOrder>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub foreign_jurisdiction:        Option<ForeignJurisdiction>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub amalgamating_businesses:     Option<Vec<AmalgamatingBusiness>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub order_details:               Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub effect_of_order:             Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub file_number:                 Option<String>,
  /// The filing a correction corrects.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub corrected_event_id:          Option<EventId>,
}

// ─── Filing ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FilingSource {
  #[default]
  Lear,
  /// Bulk annual report backfill.
  Bar,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilingHeader {
  pub certified_by: String,
  pub source:       FilingSource,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub email:        Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub filing_year:  Option<i32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub date:         Option<NaiveDate>,
  #[serde(skip_serializing_if = "is_false")]
  pub paper_only:   bool,
  #[serde(skip_serializing_if = "is_false")]
  pub colin_only:   bool,
}

/// A filing submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filing {
  pub identifier:     String,
  pub filing_type:    FilingType,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub sub_type:       Option<SubType>,
  pub effective_date: DateTime<Utc>,
  #[serde(default)]
  pub header:         FilingHeader,
  #[serde(default)]
  pub body:           FilingBody,
}

impl Filing {
  /// The contact point email when present, else the header email.
  pub fn email(&self) -> &str {
    self
      .body
      .contact_point
      .as_ref()
      .and_then(|c| c.email.as_deref())
      .or(self.header.email.as_deref())
      .unwrap_or("")
  }

  pub fn filing_date(&self) -> NaiveDate {
    self
      .header
      .date
      .unwrap_or_else(|| self.effective_date.date_naive())
  }

  /// The explicit sub-type, else the one the body carries for its filing
  /// type.
  pub fn resolved_sub_type(&self) -> Option<SubType> {
    self.sub_type.or(match self.filing_type {
      FilingType::AmalgamationApplication => self.body.amalgamation_type,
      FilingType::Dissolution => self.body.dissolution_type,
      _ => None,
    })
  }

  pub fn is(&self, filing_type: FilingType, sub_type: SubType) -> bool {
    self.filing_type == filing_type && self.resolved_sub_type() == Some(sub_type)
  }

  /// The first body section this filing type requires but lacks.
  pub fn missing_section(&self) -> Option<&'static str> {
    let body = &self.body;
    match self.filing_type {
      FilingType::ChangeOfAddress | FilingType::IncorporationApplication
        if body.offices.is_none() =>
      {
        Some("offices")
      }
      FilingType::ChangeOfDirectors if body.directors.is_none() => Some("directors"),
      FilingType::AmalgamationApplication if self.resolved_sub_type().is_none() => Some("type"),
      FilingType::AmalgamationApplication if body.amalgamating_businesses.is_none() => {
        Some("amalgamatingBusinesses")
      }
      FilingType::ContinuationIn if body.foreign_jurisdiction.is_none() => {
        Some("foreignJurisdiction")
      }
      FilingType::SpecialResolution if body.resolution.is_none() => Some("resolution"),
      FilingType::Dissolution if self.resolved_sub_type().is_none() => Some("dissolutionType"),
      FilingType::Dissolution
        if self.is(FilingType::Dissolution, SubType::Voluntary)
          && body.custodial_office.is_none() =>
      {
        Some("custodialOffice")
      }
      FilingType::RegistrarsNotation | FilingType::RegistrarsOrder | FilingType::CourtOrder
        if body.order_details.is_none() =>
      {
        Some("orderDetails")
      }
      _ => None,
    }
  }
}

/// Which stored filing to reconstruct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilingSelector {
  Event(EventId),
  /// The most recent filing of a type, optionally for one period-end year.
  Latest {
    identifier:  String,
    filing_type: FilingType,
    sub_type:    Option<SubType>,
    year:        Option<i32>,
  },
}

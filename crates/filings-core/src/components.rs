//! Which body components a reconstructed filing document carries.
//!
//! Each filing type's document shape is described by a JSON schema owned by
//! another team. [`SchemaDirComponents`] reads those documents from disk;
//! [`BuiltinComponents`] is a compiled-in equivalent for tests and for
//! deployments without the schema bundle.

use std::{
  collections::BTreeSet,
  path::{Path, PathBuf},
};

use serde_json::Value;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{Error, Result, codes::FilingType};

/// The closed set of body components. The string form is the schema
/// property name.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Display,
  EnumString,
  EnumIter,
  IntoStaticStr,
)]
#[strum(serialize_all = "camelCase")]
pub enum Component {
  AnnualReportDate,
  AnnualGeneralMeetingDate,
  Offices,
  CustodialOffice,
  Directors,
  Parties,
  ShareStructure,
  NameRequest,
  NameTranslations,
  LegalName,
  Business,
  ProvisionsRemoved,
  HasProvisions,
  Resolution,
  DissolutionType,
  DissolutionDate,
  ContactPoint,
  LegalType,
  CourtOrder,
  ForeignJurisdiction,
  AmalgamatingBusinesses,
  OrderDetails,
}

/// Source of the component set for a filing type.
pub trait ComponentSource: Send + Sync {
  fn components_for(&self, filing_type: FilingType) -> Result<BTreeSet<Component>>;
}

// ─── Built-in ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinComponents;

impl ComponentSource for BuiltinComponents {
  fn components_for(&self, filing_type: FilingType) -> Result<BTreeSet<Component>> {
    use Component::*;
    let set: &[Component] = match filing_type {
      FilingType::AnnualReport => {
        &[AnnualReportDate, AnnualGeneralMeetingDate, Offices, Directors]
      }
      FilingType::ChangeOfAddress => &[LegalType, Offices],
      FilingType::ChangeOfDirectors => &[Directors],
      FilingType::IncorporationApplication => &[
        NameRequest,
        NameTranslations,
        Offices,
        Parties,
        ShareStructure,
        ContactPoint,
        CourtOrder,
      ],
      FilingType::ContinuationIn => &[
        NameRequest,
        NameTranslations,
        Offices,
        Parties,
        ShareStructure,
        ContactPoint,
        ForeignJurisdiction,
        Business,
        CourtOrder,
      ],
      FilingType::AmalgamationApplication => &[
        NameRequest,
        NameTranslations,
        Offices,
        Parties,
        ShareStructure,
        ContactPoint,
        AmalgamatingBusinesses,
        CourtOrder,
      ],
      FilingType::Alteration => &[
        Business,
        NameRequest,
        NameTranslations,
        ShareStructure,
        ProvisionsRemoved,
        ContactPoint,
        CourtOrder,
      ],
      FilingType::Correction => &[
        NameRequest,
        NameTranslations,
        Offices,
        Parties,
        ShareStructure,
        ContactPoint,
      ],
      FilingType::Transition => &[
        Offices,
        Parties,
        ShareStructure,
        NameTranslations,
        HasProvisions,
        ContactPoint,
      ],
      FilingType::SpecialResolution => &[Resolution],
      FilingType::Dissolution => {
        &[DissolutionType, DissolutionDate, CustodialOffice, Parties, CourtOrder]
      }
      FilingType::RegistrarsNotation
      | FilingType::RegistrarsOrder
      | FilingType::CourtOrder => &[OrderDetails, CourtOrder],
      FilingType::ChangeOfName => &[LegalName],
      _ => &[],
    };
    Ok(set.iter().copied().collect())
  }
}

// ─── Schema directory ────────────────────────────────────────────────────────

/// Reads `<dir>/<snake_case_filing_type>.json` schema documents. Property
/// names that are not components are ignored.
#[derive(Debug, Clone)]
pub struct SchemaDirComponents {
  dir: PathBuf,
}

impl SchemaDirComponents {
  pub fn new(dir: impl Into<PathBuf>) -> Self { Self { dir: dir.into() } }

  pub fn dir(&self) -> &Path { &self.dir }
}

impl ComponentSource for SchemaDirComponents {
  fn components_for(&self, filing_type: FilingType) -> Result<BTreeSet<Component>> {
    let path = self.dir.join(format!("{}.json", filing_type.snake_name()));
    let raw = std::fs::read_to_string(&path)
      .map_err(|e| Error::Schema(format!("{}: {e}", path.display())))?;
    let schema: Value = serde_json::from_str(&raw)?;
    Ok(components_from_schema(&schema, filing_type))
  }
}

/// Top-level schema properties, or the filing type's own nested properties
/// when the schema wraps the body under the filing type name.
pub fn components_from_schema(
  schema: &Value,
  filing_type: FilingType,
) -> BTreeSet<Component> {
  let top = &schema["properties"];
  let props = match top.get(filing_type.name()) {
    Some(nested) => &nested["properties"],
    None => top,
  };
  props
    .as_object()
    .map(|o| o.keys().filter_map(|k| k.parse().ok()).collect())
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn nested_schema_properties_are_used() {
    let schema = json!({
      "properties": {
        "changeOfDirectors": {
          "properties": { "directors": {}, "unknownThing": {} }
        }
      }
    });
    let set = components_from_schema(&schema, FilingType::ChangeOfDirectors);
    assert_eq!(set, BTreeSet::from([Component::Directors]));
  }

  #[test]
  fn flat_schema_properties_are_used() {
    let schema = json!({
      "properties": { "offices": {}, "legalType": {}, "annualReportDate": {} }
    });
    let set = components_from_schema(&schema, FilingType::AnnualReport);
    assert!(set.contains(&Component::Offices));
    assert!(set.contains(&Component::AnnualReportDate));
    assert_eq!(set.len(), 3);
  }

  #[test]
  fn schema_dir_reads_snake_case_file() {
    let dir = std::env::temp_dir().join(format!("filings-schema-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
      dir.join("special_resolution.json"),
      r#"{"properties":{"specialResolution":{"properties":{"resolution":{}}}}}"#,
    )
    .unwrap();

    let source = SchemaDirComponents::new(&dir);
    let set = source.components_for(FilingType::SpecialResolution).unwrap();
    assert_eq!(set, BTreeSet::from([Component::Resolution]));
    assert!(matches!(
      source.components_for(FilingType::Transition),
      Err(Error::Schema(_))
    ));
    std::fs::remove_dir_all(&dir).unwrap();
  }

  #[test]
  fn component_names_are_schema_properties() {
    assert_eq!(Component::AmalgamatingBusinesses.to_string(), "amalgamatingBusinesses");
    assert_eq!("nameTranslations".parse::<Component>().unwrap(), Component::NameTranslations);
  }
}

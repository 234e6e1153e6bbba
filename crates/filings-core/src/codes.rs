//! The legacy code registry.
//!
//! Every filing is stored under a five-letter transaction code. Which code a
//! filing gets depends on its filing type, the entity type of the business,
//! and, for a few filing types, a sub-type. The registry holds that table in
//! both directions and refuses to build if the reverse direction would be
//! ambiguous.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use thiserror::Error;

use crate::entity::EntityType;

// ─── Codes ───────────────────────────────────────────────────────────────────

/// A legacy filing transaction code.
#[allow(clippy::upper_case_acronyms)]
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
pub enum TypeCode {
  OTANN,
  ANNBC,
  OTCDR,
  NOCDR,
  OTADD,
  NOCAD,
  OTINC,
  BEINC,
  ICORP,
  ICORU,
  ICORC,
  CONTB,
  CONTI,
  CONTU,
  CONTC,
  CONVL,
  NOALA,
  NOALB,
  NOALC,
  NOALE,
  NOALR,
  NOALU,
  CRBIN,
  OTSPE,
  OTAMA,
  AMLRB,
  AMALR,
  AMLRU,
  AMLRC,
  AMLHB,
  AMALH,
  AMLHU,
  AMLHC,
  AMLVB,
  AMALV,
  AMLVU,
  AMLVC,
  OTDIS,
  OTCGM,
  OTVDS,
  ADVD2,
  OTNCN,
  OTRES,
  OTAMR,
  OTADR,
  OTVLQ,
  OTNRC,
  OTCON,
  TRANS,
  REGSN,
  REGSO,
  COURT,
}

impl TypeCode {
  pub fn as_str(self) -> &'static str { self.into() }

  /// Registrar and court order codes carry their order metadata at the top
  /// level of the body rather than under `courtOrder`.
  pub fn is_order(self) -> bool {
    matches!(self, Self::REGSN | Self::REGSO | Self::COURT)
  }

  /// The entity type a filing with this code leaves the business as, for
  /// codes that imply one.
  pub fn implied_entity_type(self) -> Option<EntityType> {
    match self {
      Self::ICORP | Self::NOALB => Some(EntityType::BcCompany),
      Self::ICORU | Self::NOALU => Some(EntityType::UnlimitedLiability),
      Self::ICORC | Self::NOALC => Some(EntityType::CommunityContribution),
      _ => None,
    }
  }

  /// Every code that implies an entity type.
  pub fn type_implying() -> [TypeCode; 6] {
    [
      Self::ICORP,
      Self::ICORU,
      Self::ICORC,
      Self::NOALB,
      Self::NOALC,
      Self::NOALU,
    ]
  }
}

// ─── Filing types ────────────────────────────────────────────────────────────

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
#[strum(serialize_all = "camelCase")]
pub enum FilingType {
  AnnualReport,
  ChangeOfDirectors,
  ChangeOfAddress,
  IncorporationApplication,
  ContinuationIn,
  Conversion,
  Alteration,
  Correction,
  SpecialResolution,
  AmalgamationApplication,
  Dissolved,
  #[serde(rename = "amendedAGM")]
  #[strum(serialize = "amendedAGM")]
  AmendedAgm,
  Dissolution,
  ChangeOfName,
  RestorationApplication,
  AmendedAnnualReport,
  AmendedChangeOfDirectors,
  VoluntaryLiquidation,
  AppointReceiver,
  ContinuedOut,
  Transition,
  RegistrarsNotation,
  RegistrarsOrder,
  CourtOrder,
}

impl FilingType {
  pub fn name(self) -> &'static str { self.into() }

  /// `changeOfAddress` → `change_of_address`; the stem of the schema file
  /// describing the filing's document.
  pub fn snake_name(self) -> String {
    let mut out = String::new();
    for c in self.name().chars() {
      if c.is_ascii_uppercase() {
        out.push('_');
        out.push(c.to_ascii_lowercase());
      } else {
        out.push(c);
      }
    }
    out
  }

  /// Filing types the ledger writer accepts.
  pub fn is_submittable(self) -> bool {
    matches!(
      self,
      Self::Alteration
        | Self::AmalgamationApplication
        | Self::AnnualReport
        | Self::ChangeOfAddress
        | Self::ChangeOfDirectors
        | Self::ContinuationIn
        | Self::Correction
        | Self::CourtOrder
        | Self::Dissolution
        | Self::IncorporationApplication
        | Self::RegistrarsNotation
        | Self::RegistrarsOrder
        | Self::SpecialResolution
        | Self::Transition
    )
  }

  /// Filings that bring a business into existence in the register.
  pub fn is_incorporation_like(self) -> bool {
    matches!(
      self,
      Self::AmalgamationApplication
        | Self::ContinuationIn
        | Self::IncorporationApplication
    )
  }

  /// Filings whose notation comes from `orderDetails`.
  pub fn is_order(self) -> bool {
    matches!(
      self,
      Self::RegistrarsNotation | Self::RegistrarsOrder | Self::CourtOrder
    )
  }
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SubType {
  Regular,
  Horizontal,
  Vertical,
  Voluntary,
  Administrative,
  Involuntary,
}

// ─── Header layouts ──────────────────────────────────────────────────────────

/// Which columns of the filing header a code populates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderLayout {
  /// Period end (AGM date, else AR date) and AGM date; paper ODS.
  CoopAnnualReport,
  /// No dated columns; paper ODS.
  CoopBasic,
  /// Period end from the AR date; filed ODS.
  AnnualReport,
  /// Change date from the filing date; filed ODS.
  DirectorChange,
  /// Arrangement indicator and court order number; filed ODS.
  Arrangement,
  /// No dated columns; special-resolution ODS.
  Resolution,
}

impl HeaderLayout {
  pub fn for_code(code: TypeCode) -> Option<Self> {
    use TypeCode::*;
    Some(match code {
      OTANN => Self::CoopAnnualReport,
      OTADD | OTCDR | OTINC => Self::CoopBasic,
      ANNBC => Self::AnnualReport,
      NOCDR => Self::DirectorChange,
      NOCAD | CRBIN | TRANS | BEINC | ICORP | ICORU | ICORC | AMLRB | AMALR
      | AMLRU | AMLRC | AMLHB | AMALH | AMLHU | AMLHC | AMLVB | AMALV
      | AMLVU | AMLVC | CONTB | CONTI | CONTU | CONTC | NOALA | NOALB
      | NOALC | NOALE | NOALR | NOALU | REGSN | REGSO | COURT => {
        Self::Arrangement
      }
      OTVDS | ADVD2 | OTSPE => Self::Resolution,
      _ => return None,
    })
  }

  pub fn ods_type(self) -> &'static str {
    match self {
      Self::CoopAnnualReport | Self::CoopBasic => "P",
      Self::AnnualReport | Self::DirectorChange | Self::Arrangement => "F",
      Self::Resolution => "S",
    }
  }
}

// ─── Registry ────────────────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
  #[error("filing type {0} is declared more than once")]
  DuplicateFilingType(FilingType),

  #[error("{filing_type} maps to {code}, which is not in its code list")]
  CodeNotListed {
    filing_type: FilingType,
    code:        TypeCode,
  },

  #[error("code {code} is claimed by both {first} and {second}")]
  CodeCollision {
    code:   TypeCode,
    first:  FilingType,
    second: FilingType,
  },
}

/// One filing type's row in the registry.
#[derive(Debug, Clone)]
pub struct RegistryEntry {
  pub filing_type: FilingType,
  pub codes:       Vec<TypeCode>,
  pub by_entity:   BTreeMap<EntityType, TypeCode>,
  /// Declared order matters: the first sub-type claiming a shared code is
  /// the one recovered from it.
  pub sub_types:   Vec<(SubType, BTreeMap<EntityType, TypeCode>)>,
}

impl RegistryEntry {
  pub fn new(filing_type: FilingType, codes: &[TypeCode]) -> Self {
    Self {
      filing_type,
      codes: codes.to_vec(),
      by_entity: BTreeMap::new(),
      sub_types: Vec::new(),
    }
  }

  pub fn with_codes(mut self, map: &[(EntityType, TypeCode)]) -> Self {
    self.by_entity.extend(map.iter().copied());
    self
  }

  pub fn with_sub_type(
    mut self,
    sub_type: SubType,
    map: &[(EntityType, TypeCode)],
  ) -> Self {
    self.sub_types.push((sub_type, map.iter().copied().collect()));
    self
  }

  fn mapped_codes(&self) -> impl Iterator<Item = TypeCode> + '_ {
    self
      .by_entity
      .values()
      .chain(self.sub_types.iter().flat_map(|(_, m)| m.values()))
      .copied()
  }
}

/// Bidirectional filing type ↔ legacy code table.
#[derive(Debug, Clone)]
pub struct CodeRegistry {
  entries: HashMap<FilingType, RegistryEntry>,
  reverse: HashMap<TypeCode, FilingType>,
}

impl CodeRegistry {
  /// Build a registry, rejecting any table whose reverse mapping would not
  /// be a function.
  pub fn new(
    entries: impl IntoIterator<Item = RegistryEntry>,
  ) -> Result<Self, RegistryError> {
    let mut by_type = HashMap::new();
    let mut reverse: HashMap<TypeCode, FilingType> = HashMap::new();

    for entry in entries {
      if by_type.contains_key(&entry.filing_type) {
        return Err(RegistryError::DuplicateFilingType(entry.filing_type));
      }
      if let Some(code) = entry.mapped_codes().find(|c| !entry.codes.contains(c)) {
        return Err(RegistryError::CodeNotListed {
          filing_type: entry.filing_type,
          code,
        });
      }
      for &code in &entry.codes {
        if let Some(&first) = reverse.get(&code) {
          return Err(RegistryError::CodeCollision {
            code,
            first,
            second: entry.filing_type,
          });
        }
        reverse.insert(code, entry.filing_type);
      }
      by_type.insert(entry.filing_type, entry);
    }

    Ok(Self { entries: by_type, reverse })
  }

  /// The built-in registry.
  pub fn standard() -> Result<Self, RegistryError> {
    use EntityType::*;
    use FilingType as F;
    use TypeCode::*;

    let companies = |code: TypeCode| {
      [
        (BenefitCompany, code),
        (BcCompany, code),
        (UnlimitedLiability, code),
        (CommunityContribution, code),
      ]
    };

    Self::new([
      RegistryEntry::new(F::AnnualReport, &[OTANN, ANNBC])
        .with_codes(&[(Coop, OTANN)])
        .with_codes(&companies(ANNBC)),
      RegistryEntry::new(F::ChangeOfDirectors, &[OTCDR, NOCDR])
        .with_codes(&[(Coop, OTCDR)])
        .with_codes(&companies(NOCDR)),
      RegistryEntry::new(F::ChangeOfAddress, &[OTADD, NOCAD])
        .with_codes(&[(Coop, OTADD)])
        .with_codes(&companies(NOCAD)),
      RegistryEntry::new(F::IncorporationApplication, &[
        OTINC, BEINC, ICORP, ICORU, ICORC,
      ])
      .with_codes(&[
        (Coop, OTINC),
        (BenefitCompany, BEINC),
        (BcCompany, ICORP),
        (UnlimitedLiability, ICORU),
        (CommunityContribution, ICORC),
      ]),
      RegistryEntry::new(F::ContinuationIn, &[CONTB, CONTI, CONTU, CONTC])
        .with_codes(&[
          (BenefitContinueIn, CONTB),
          (ContinueIn, CONTI),
          (UnlimitedLiabilityContinueIn, CONTU),
          (CommunityContributionContinueIn, CONTC),
        ]),
      RegistryEntry::new(F::Conversion, &[CONVL]).with_codes(&[
        (BcCompany, CONVL),
        (UnlimitedLiability, CONVL),
        (CommunityContribution, CONVL),
      ]),
      RegistryEntry::new(F::Alteration, &[
        NOALA, NOALR, NOALB, NOALC, NOALE, NOALU,
      ])
      .with_codes(&[
        (BenefitCompany, NOALR),
        (BcCompany, NOALA),
        (UnlimitedLiability, NOALA),
        (CommunityContribution, NOALA),
      ]),
      RegistryEntry::new(F::Correction, &[CRBIN])
        .with_codes(&[(BenefitCompany, CRBIN)]),
      RegistryEntry::new(F::SpecialResolution, &[OTSPE])
        .with_codes(&[(Coop, OTSPE)]),
      RegistryEntry::new(F::AmalgamationApplication, &[
        OTAMA, AMLRB, AMALR, AMLRU, AMLRC, AMLHB, AMALH, AMLHU, AMLHC, AMLVB,
        AMALV, AMLVU, AMLVC,
      ])
      .with_sub_type(SubType::Regular, &[
        (Coop, OTAMA),
        (BenefitCompany, AMLRB),
        (BcCompany, AMALR),
        (UnlimitedLiability, AMLRU),
        (CommunityContribution, AMLRC),
      ])
      .with_sub_type(SubType::Horizontal, &[
        (Coop, OTAMA),
        (BenefitCompany, AMLHB),
        (BcCompany, AMALH),
        (UnlimitedLiability, AMLHU),
        (CommunityContribution, AMLHC),
      ])
      .with_sub_type(SubType::Vertical, &[
        (Coop, OTAMA),
        (BenefitCompany, AMLVB),
        (BcCompany, AMALV),
        (UnlimitedLiability, AMLVU),
        (CommunityContribution, AMLVC),
      ]),
      RegistryEntry::new(F::Dissolved, &[OTDIS]).with_codes(&[(Coop, OTDIS)]),
      RegistryEntry::new(F::AmendedAgm, &[OTCGM]).with_codes(&[(Coop, OTCGM)]),
      RegistryEntry::new(F::Dissolution, &[OTVDS, ADVD2])
        .with_sub_type(SubType::Voluntary, &[
          (Coop, OTVDS),
          (BenefitCompany, ADVD2),
          (BcCompany, ADVD2),
          (UnlimitedLiability, ADVD2),
          (CommunityContribution, ADVD2),
        ])
        .with_sub_type(SubType::Administrative, &[])
        .with_sub_type(SubType::Involuntary, &[]),
      RegistryEntry::new(F::ChangeOfName, &[OTNCN]).with_codes(&[(Coop, OTNCN)]),
      RegistryEntry::new(F::RestorationApplication, &[OTRES])
        .with_codes(&[(Coop, OTRES)]),
      RegistryEntry::new(F::AmendedAnnualReport, &[OTAMR])
        .with_codes(&[(Coop, OTAMR)]),
      RegistryEntry::new(F::AmendedChangeOfDirectors, &[OTADR])
        .with_codes(&[(Coop, OTADR)]),
      RegistryEntry::new(F::VoluntaryLiquidation, &[OTVLQ])
        .with_codes(&[(Coop, OTVLQ)]),
      RegistryEntry::new(F::AppointReceiver, &[OTNRC])
        .with_codes(&[(Coop, OTNRC)]),
      RegistryEntry::new(F::ContinuedOut, &[OTCON]).with_codes(&[(Coop, OTCON)]),
      RegistryEntry::new(F::Transition, &[TRANS])
        .with_codes(&[(BcCompany, TRANS)]),
      RegistryEntry::new(F::RegistrarsNotation, &[REGSN])
        .with_codes(&[(BcCompany, REGSN)]),
      RegistryEntry::new(F::RegistrarsOrder, &[REGSO])
        .with_codes(&[(BcCompany, REGSO)]),
      RegistryEntry::new(F::CourtOrder, &[COURT])
        .with_codes(&[(BcCompany, COURT)]),
    ])
  }

  /// Forward lookup. With a sub-type, only the sub-type's map is consulted.
  pub fn code_for(
    &self,
    filing_type: FilingType,
    entity_type: EntityType,
    sub_type: Option<SubType>,
  ) -> Option<TypeCode> {
    let entry = self.entries.get(&filing_type)?;
    match sub_type {
      Some(sub_type) => entry
        .sub_types
        .iter()
        .find(|(s, _)| *s == sub_type)
        .and_then(|(_, map)| map.get(&entity_type))
        .copied(),
      None => entry.by_entity.get(&entity_type).copied(),
    }
  }

  pub fn filing_type_for_code(&self, code: TypeCode) -> Option<FilingType> {
    self.reverse.get(&code).copied()
  }

  /// The sub-type a stored code was filed under, first declared wins.
  pub fn sub_type_for_code(
    &self,
    filing_type: FilingType,
    code: TypeCode,
  ) -> Option<SubType> {
    self
      .entries
      .get(&filing_type)?
      .sub_types
      .iter()
      .find(|(_, map)| map.values().any(|c| *c == code))
      .map(|(sub_type, _)| *sub_type)
  }

  pub fn is_sub_type_supported(
    &self,
    filing_type: FilingType,
    sub_type: SubType,
  ) -> bool {
    self
      .entries
      .get(&filing_type)
      .is_some_and(|e| e.sub_types.iter().any(|(s, _)| *s == sub_type))
  }

  /// All codes declared for a filing type.
  pub fn codes_for(&self, filing_type: FilingType) -> &[TypeCode] {
    self
      .entries
      .get(&filing_type)
      .map(|e| e.codes.as_slice())
      .unwrap_or_default()
  }

  pub fn corp_type_implied_by_code(&self, code: TypeCode) -> Option<EntityType> {
    code.implied_entity_type()
  }
}

#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator;

  use super::*;

  fn registry() -> CodeRegistry { CodeRegistry::standard().unwrap() }

  #[test]
  fn forward_lookup_by_entity_type() {
    let r = registry();
    assert_eq!(
      r.code_for(FilingType::AnnualReport, EntityType::Coop, None),
      Some(TypeCode::OTANN)
    );
    assert_eq!(
      r.code_for(FilingType::AnnualReport, EntityType::BcCompany, None),
      Some(TypeCode::ANNBC)
    );
    assert_eq!(
      r.code_for(FilingType::IncorporationApplication, EntityType::UnlimitedLiability, None),
      Some(TypeCode::ICORU)
    );
    assert_eq!(r.code_for(FilingType::Transition, EntityType::Coop, None), None);
  }

  #[test]
  fn sub_typed_lookup_uses_sub_type_map_only() {
    let r = registry();
    assert_eq!(
      r.code_for(
        FilingType::AmalgamationApplication,
        EntityType::BcCompany,
        Some(SubType::Horizontal)
      ),
      Some(TypeCode::AMALH)
    );
    assert_eq!(
      r.code_for(FilingType::AmalgamationApplication, EntityType::BcCompany, None),
      None
    );
    assert_eq!(
      r.code_for(FilingType::Dissolution, EntityType::BcCompany, Some(SubType::Administrative)),
      None
    );
  }

  #[test]
  fn every_mapped_code_reverses_to_its_filing_type() {
    let r = registry();
    for filing_type in FilingType::iter() {
      for &code in r.codes_for(filing_type) {
        assert_eq!(r.filing_type_for_code(code), Some(filing_type), "{code}");
      }
    }
  }

  #[test]
  fn shared_sub_type_code_recovers_first_declared() {
    let r = registry();
    assert_eq!(
      r.sub_type_for_code(FilingType::AmalgamationApplication, TypeCode::OTAMA),
      Some(SubType::Regular)
    );
    assert_eq!(
      r.sub_type_for_code(FilingType::AmalgamationApplication, TypeCode::AMLVC),
      Some(SubType::Vertical)
    );
    assert_eq!(r.sub_type_for_code(FilingType::AnnualReport, TypeCode::OTANN), None);
  }

  #[test]
  fn sub_type_support() {
    let r = registry();
    assert!(r.is_sub_type_supported(FilingType::Dissolution, SubType::Involuntary));
    assert!(!r.is_sub_type_supported(FilingType::Dissolution, SubType::Horizontal));
    assert!(!r.is_sub_type_supported(FilingType::AnnualReport, SubType::Regular));
  }

  #[test]
  fn colliding_codes_fail_construction() {
    let err = CodeRegistry::new([
      RegistryEntry::new(FilingType::Dissolution, &[TypeCode::OTVDS]),
      RegistryEntry::new(FilingType::Dissolved, &[TypeCode::OTVDS]),
    ])
    .unwrap_err();
    assert_eq!(err, RegistryError::CodeCollision {
      code:   TypeCode::OTVDS,
      first:  FilingType::Dissolution,
      second: FilingType::Dissolved,
    });
  }

  #[test]
  fn unlisted_mapped_code_fails_construction() {
    let err = CodeRegistry::new([RegistryEntry::new(FilingType::AnnualReport, &[
      TypeCode::OTANN,
    ])
    .with_codes(&[(EntityType::BcCompany, TypeCode::ANNBC)])])
    .unwrap_err();
    assert!(matches!(err, RegistryError::CodeNotListed { .. }));
  }

  #[test]
  fn implied_entity_types() {
    let r = registry();
    assert_eq!(r.corp_type_implied_by_code(TypeCode::NOALU), Some(EntityType::UnlimitedLiability));
    assert_eq!(r.corp_type_implied_by_code(TypeCode::NOALA), None);
  }

  #[test]
  fn header_layouts() {
    assert_eq!(HeaderLayout::for_code(TypeCode::OTANN), Some(HeaderLayout::CoopAnnualReport));
    assert_eq!(HeaderLayout::for_code(TypeCode::AMLVC), Some(HeaderLayout::Arrangement));
    assert_eq!(HeaderLayout::for_code(TypeCode::ADVD2).map(HeaderLayout::ods_type), Some("S"));
    assert_eq!(HeaderLayout::for_code(TypeCode::OTDIS), None);
  }

  #[test]
  fn filing_type_names() {
    assert_eq!(FilingType::AmendedAgm.name(), "amendedAGM");
    assert_eq!("changeOfAddress".parse::<FilingType>().unwrap(), FilingType::ChangeOfAddress);
    assert_eq!(FilingType::IncorporationApplication.snake_name(), "incorporation_application");
    assert!("voluntaryDissolution".parse::<FilingType>().is_err());
  }
}

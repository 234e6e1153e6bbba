//! Reconstructed filing documents.
//!
//! Serialises as `{"filing": {"header": …, "business": …, "<filingType>": …}}`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::{
  codes::FilingType,
  entity::Business,
  filing::FilingBody,
  temporal::EventId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DocumentSource {
  Colin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentHeader {
  pub available_on_paper_only: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub in_colin_only:           Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub certified_by:            Option<String>,
  pub colin_ids:               Vec<EventId>,
  pub date:                    NaiveDate,
  pub effective_date:          DateTime<Utc>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub email:                   Option<String>,
  pub name:                    FilingType,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub source:                  Option<DocumentSource>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub historic:                Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilingDocument {
  pub header:   DocumentHeader,
  pub business: Business,
  pub body:     FilingBody,
}

impl FilingDocument {
  pub fn filing_type(&self) -> FilingType { self.header.name }

  pub fn event_id(&self) -> Option<EventId> {
    self.header.colin_ids.first().copied()
  }
}

struct Inner<'a>(&'a FilingDocument);

impl Serialize for Inner<'_> {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let doc = self.0;
    let mut map = serializer.serialize_map(Some(3))?;
    map.serialize_entry("header", &doc.header)?;
    map.serialize_entry("business", &doc.business)?;
    map.serialize_entry(doc.filing_type().name(), &doc.body)?;
    map.end()
  }
}

impl Serialize for FilingDocument {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(1))?;
    map.serialize_entry("filing", &Inner(self))?;
    map.end()
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;
  use crate::entity::EntityType;

  #[test]
  fn document_nests_body_under_filing_type() {
    let founded = Utc.with_ymd_and_hms(2019, 4, 2, 0, 0, 0).unwrap();
    let doc = FilingDocument {
      header:   DocumentHeader {
        available_on_paper_only: false,
        in_colin_only:           Some(false),
        certified_by:            Some("N/A".into()),
        colin_ids:               vec![100_000_001],
        date:                    founded.date_naive(),
        effective_date:          founded,
        email:                   None,
        name:                    FilingType::ChangeOfAddress,
        source:                  Some(DocumentSource::Colin),
        historic:                None,
      },
      business: Business {
        corp_num:           "0870123".into(),
        identifier:         "BC0870123".into(),
        entity_type:        EntityType::BcCompany,
        legal_name:         Some("0870123 B.C. LTD.".into()),
        state:              None,
        founding_date:      founded,
        last_ar_filed_date: None,
        last_agm_date:      None,
        frozen:             None,
      },
      body:     FilingBody {
        event_id: Some(100_000_001),
        legal_type: Some(EntityType::BcCompany),
        ..Default::default()
      },
    };

    let value = serde_json::to_value(&doc).unwrap();
    assert_eq!(value["filing"]["header"]["source"], "COLIN");
    assert_eq!(value["filing"]["header"]["colinIds"][0], 100_000_001);
    assert!(value["filing"]["header"].get("email").is_none());
    assert_eq!(value["filing"]["business"]["identifier"], "BC0870123");
    assert_eq!(value["filing"]["changeOfAddress"]["legalType"], "BC");
  }
}

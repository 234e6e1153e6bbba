//! Home jurisdiction of a continued-in business.
//!
//! Canadian jurisdictions are stored as a region code (`FD` for federal);
//! anything else as `OT` with a `"COUNTRY, REGION"` description.

use chrono::NaiveDate;
use filings_core::{
  filing::ForeignJurisdiction,
  temporal::{EventId, TemporalSpan},
};
use rusqlite::{Connection, Params, params};

use super::{AS_OF, TemporalStore, span};
use crate::{
  Result,
  encode::{decode_opt_date, encode_date},
};

// ─── Coding ──────────────────────────────────────────────────────────────────

/// `(can_jur_typ_cd, othr_juris_desc)` for a foreign jurisdiction.
pub fn encode_jurisdiction(country: &str, region: Option<&str>) -> (String, Option<String>) {
  let country = country.to_uppercase();
  let region = region.unwrap_or("").to_uppercase();
  if country == "CA" {
    if region == "FEDERAL" {
      ("FD".into(), None)
    } else {
      (region, None)
    }
  } else if region.is_empty() {
    ("OT".into(), Some(country))
  } else {
    ("OT".into(), Some(format!("{country}, {region}")))
  }
}

/// Inverse of [`encode_jurisdiction`]: `(country, region)`.
pub fn decode_jurisdiction(code: &str, other: Option<&str>) -> (String, Option<String>) {
  match code {
    "FD" => ("CA".into(), Some("FEDERAL".into())),
    "OT" => {
      let desc = other.unwrap_or("");
      match desc.split_once(", ") {
        Some((country, region)) => (country.into(), Some(region.into())),
        None => (desc.into(), None),
      }
    }
    region => ("CA".into(), (!region.is_empty()).then(|| region.to_string())),
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JurisdictionRecord {
  pub span:                 TemporalSpan,
  pub foreign_jurisdiction: ForeignJurisdiction,
  /// Extra-provincial registration number, when the business was registered
  /// here before continuing in.
  pub bc_xpro_num:          Option<String>,
}

/// Insert payload: the jurisdiction and any extra-provincial number.
#[derive(Debug, Clone)]
pub struct NewJurisdiction {
  pub foreign_jurisdiction: ForeignJurisdiction,
  pub bc_xpro_num:          Option<String>,
}

pub struct JurisdictionStore;

impl JurisdictionStore {
  fn query(
    conn: &Connection,
    filter: &str,
    params: impl Params,
  ) -> Result<Vec<JurisdictionRecord>> {
    let sql = format!(
      "SELECT start_event_id, end_event_id, can_jur_typ_cd, othr_juris_desc,
              home_recogn_dt, home_juris_num, home_company_nme, bc_xpro_num
       FROM jurisdiction WHERE corp_num = ?1 AND {filter}
       ORDER BY jurisdiction_id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
      .query_map(params, |row| {
        Ok((
          span(row, "start_event_id", "end_event_id")?,
          row.get::<_, String>("can_jur_typ_cd")?,
          row.get::<_, Option<String>>("othr_juris_desc")?,
          row.get::<_, Option<String>>("home_recogn_dt")?,
          row.get::<_, Option<String>>("home_juris_num")?,
          row.get::<_, Option<String>>("home_company_nme")?,
          row.get::<_, Option<String>>("bc_xpro_num")?,
        ))
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?;

    rows
      .into_iter()
      .map(|(span, code, other, recogn, identifier, legal_name, bc_xpro_num)| {
        let (country, region) = decode_jurisdiction(&code, other.as_deref());
        let incorporation_date: Option<NaiveDate> = decode_opt_date(recogn.as_deref())?;
        Ok(JurisdictionRecord {
          span,
          foreign_jurisdiction: ForeignJurisdiction {
            country,
            region,
            identifier,
            legal_name,
            incorporation_date,
          },
          bc_xpro_num,
        })
      })
      .collect()
  }

  pub fn started_at(
    conn: &Connection,
    corp_num: &str,
    event_id: EventId,
  ) -> Result<Option<JurisdictionRecord>> {
    Ok(
      Self::query(conn, "start_event_id = ?2", params![corp_num, event_id])?
        .into_iter()
        .next(),
    )
  }
}

impl TemporalStore for JurisdictionStore {
  type Key = ();
  type Payload = NewJurisdiction;
  type Record = JurisdictionRecord;

  fn current(conn: &Connection, corp_num: &str) -> Result<Vec<JurisdictionRecord>> {
    Self::query(conn, "end_event_id IS NULL", params![corp_num])
  }

  fn as_of(
    conn: &Connection,
    corp_num: &str,
    event_id: EventId,
  ) -> Result<Vec<JurisdictionRecord>> {
    Self::query(conn, AS_OF, params![corp_num, event_id])
  }

  fn create(
    conn: &Connection,
    corp_num: &str,
    event_id: EventId,
    new: &NewJurisdiction,
  ) -> Result<JurisdictionRecord> {
    let fj = &new.foreign_jurisdiction;
    let (code, other) = encode_jurisdiction(&fj.country, fj.region.as_deref());
    conn.execute(
      "INSERT INTO jurisdiction (
         corp_num, start_event_id, can_jur_typ_cd, othr_juris_desc,
         home_recogn_dt, home_juris_num, home_company_nme, bc_xpro_num
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
      params![
        corp_num,
        event_id,
        code,
        other,
        fj.incorporation_date.map(encode_date),
        fj.identifier,
        fj.legal_name,
        new.bc_xpro_num,
      ],
    )?;
    let (country, region) = decode_jurisdiction(&code, other.as_deref());
    Ok(JurisdictionRecord {
      span:                 TemporalSpan::open(event_id),
      foreign_jurisdiction: ForeignJurisdiction { country, region, ..fj.clone() },
      bc_xpro_num:          new.bc_xpro_num.clone(),
    })
  }

  fn end(conn: &Connection, corp_num: &str, event_id: EventId, _: &()) -> Result<bool> {
    let n = conn.execute(
      "UPDATE jurisdiction SET end_event_id = ?2
       WHERE corp_num = ?1 AND end_event_id IS NULL",
      params![corp_num, event_id],
    )?;
    Ok(n > 0)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn canadian_and_foreign_coding() {
    assert_eq!(encode_jurisdiction("ca", Some("federal")), ("FD".into(), None));
    assert_eq!(encode_jurisdiction("CA", Some("ab")), ("AB".into(), None));
    assert_eq!(
      encode_jurisdiction("us", Some("wa")),
      ("OT".into(), Some("US, WA".into()))
    );
    assert_eq!(encode_jurisdiction("GB", None), ("OT".into(), Some("GB".into())));
  }

  #[test]
  fn decoding_restores_country_and_region() {
    assert_eq!(
      decode_jurisdiction("OT", Some("US, WA")),
      ("US".into(), Some("WA".into()))
    );
    assert_eq!(decode_jurisdiction("AB", None), ("CA".into(), Some("AB".into())));
    assert_eq!(
      decode_jurisdiction("FD", None),
      ("CA".into(), Some("FEDERAL".into()))
    );
  }
}

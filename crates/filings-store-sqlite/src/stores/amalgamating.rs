//! Businesses involved in an amalgamation, recorded against the resulting
//! corporation and positioned by their index in the filing.

use filings_core::{
  entity::{corp_num_from_identifier, identifier_from_corp_num},
  filing::{AmalgamatingBusiness, AmalgamatingRole, ForeignJurisdiction},
  temporal::{EventId, TemporalSpan},
};
use rusqlite::{Connection, Params, params};

use super::{
  AS_OF, TemporalStore,
  jurisdiction::{decode_jurisdiction, encode_jurisdiction},
  span,
};
use crate::{
  Result,
  encode::{decode_ind, encode_ind},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvolvedRecord {
  pub index:    i64,
  pub span:     TemporalSpan,
  /// Ledger corp number of a domestic participant.
  pub corp_num: Option<String>,
  pub business: AmalgamatingBusiness,
}

/// Whether a participant is recorded by home jurisdiction rather than by
/// ledger corp number. Extra-provincial registrations in BC are domestic.
pub fn is_foreign(business: &AmalgamatingBusiness) -> bool {
  match &business.foreign_jurisdiction {
    None => false,
    Some(fj) => {
      !(business.identifier.starts_with('A')
        && fj.country == "CA"
        && fj.region.as_deref() == Some("BC"))
    }
  }
}

pub struct AmalgamatingStore;

impl AmalgamatingStore {
  fn query(conn: &Connection, filter: &str, params: impl Params) -> Result<Vec<InvolvedRecord>> {
    let sql = format!(
      "SELECT corp_involve_id, start_event_id, end_event_id, corp_num,
              adopted_corp_ind, can_jur_typ_cd, othr_juri_desc, home_juri_num,
              foreign_nme
       FROM corp_involved WHERE ted_corp_num = ?1 AND {filter}
       ORDER BY start_event_id, corp_involve_id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
      .query_map(params, |row| {
        let corp_num: Option<String> = row.get("corp_num")?;
        let adopted = decode_ind(row.get::<_, Option<String>>("adopted_corp_ind")?.as_deref());
        let jur_code: Option<String> = row.get("can_jur_typ_cd")?;
        let other: Option<String> = row.get("othr_juri_desc")?;
        let home_num: Option<String> = row.get("home_juri_num")?;
        let foreign_name: Option<String> = row.get("foreign_nme")?;

        let business = match &corp_num {
          Some(corp_num) => AmalgamatingBusiness {
            identifier:           identifier_from_corp_num(corp_num),
            legal_name:           None,
            // The primary/holding distinction is not recorded.
            role:                 if adopted {
              AmalgamatingRole::Holding
            } else {
              AmalgamatingRole::Amalgamating
            },
            foreign_jurisdiction: None,
          },
          None => {
            let (country, region) =
              decode_jurisdiction(jur_code.as_deref().unwrap_or("OT"), other.as_deref());
            AmalgamatingBusiness {
              identifier:           home_num.clone().unwrap_or_default(),
              legal_name:           foreign_name,
              role:                 AmalgamatingRole::Amalgamating,
              foreign_jurisdiction: Some(ForeignJurisdiction {
                country,
                region,
                identifier: home_num,
                ..Default::default()
              }),
            }
          }
        };

        Ok(InvolvedRecord {
          index: row.get("corp_involve_id")?,
          span: span(row, "start_event_id", "end_event_id")?,
          corp_num,
          business,
        })
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
  }

  /// Participants recorded by the amalgamation at `event_id`.
  pub fn started_at(
    conn: &Connection,
    ted_corp_num: &str,
    event_id: EventId,
  ) -> Result<Vec<InvolvedRecord>> {
    Self::query(conn, "start_event_id = ?2", params![ted_corp_num, event_id])
  }
}

impl TemporalStore for AmalgamatingStore {
  /// Position within the amalgamation.
  type Key = i64;
  type Payload = (i64, AmalgamatingBusiness);
  type Record = InvolvedRecord;

  fn current(conn: &Connection, ted_corp_num: &str) -> Result<Vec<InvolvedRecord>> {
    Self::query(conn, "end_event_id IS NULL", params![ted_corp_num])
  }

  fn as_of(
    conn: &Connection,
    ted_corp_num: &str,
    event_id: EventId,
  ) -> Result<Vec<InvolvedRecord>> {
    Self::query(conn, AS_OF, params![ted_corp_num, event_id])
  }

  fn create(
    conn: &Connection,
    ted_corp_num: &str,
    event_id: EventId,
    (index, business): &(i64, AmalgamatingBusiness),
  ) -> Result<InvolvedRecord> {
    let (corp_num, adopted, jur_code, other, home_num, foreign_name) =
      match (is_foreign(business), &business.foreign_jurisdiction) {
        (true, Some(fj)) => {
          let (code, other) = encode_jurisdiction(&fj.country, fj.region.as_deref());
          (
            None,
            false,
            Some(code),
            other,
            Some(business.identifier.clone()),
            business.legal_name.clone(),
          )
        }
        _ => {
          let adopted = matches!(
            business.role,
            AmalgamatingRole::Holding | AmalgamatingRole::Primary
          );
          (
            Some(corp_num_from_identifier(&business.identifier)),
            adopted,
            None,
            None,
            None,
            None,
          )
        }
      };

    conn.execute(
      "INSERT INTO corp_involved (
         ted_corp_num, start_event_id, corp_involve_id, corp_num, adopted_corp_ind,
         can_jur_typ_cd, othr_juri_desc, home_juri_num, foreign_nme
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
      params![
        ted_corp_num,
        event_id,
        index,
        corp_num,
        encode_ind(adopted),
        jur_code,
        other,
        home_num,
        foreign_name,
      ],
    )?;

    Ok(InvolvedRecord {
      index: *index,
      span: TemporalSpan::open(event_id),
      corp_num,
      business: business.clone(),
    })
  }

  fn end(conn: &Connection, ted_corp_num: &str, event_id: EventId, index: &i64) -> Result<bool> {
    let n = conn.execute(
      "UPDATE corp_involved SET end_event_id = ?3
       WHERE ted_corp_num = ?1 AND corp_involve_id = ?2 AND end_event_id IS NULL",
      params![ted_corp_num, index, event_id],
    )?;
    Ok(n > 0)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn business(identifier: &str, country: &str, region: &str) -> AmalgamatingBusiness {
    AmalgamatingBusiness {
      identifier:           identifier.into(),
      legal_name:           None,
      role:                 AmalgamatingRole::Amalgamating,
      foreign_jurisdiction: Some(ForeignJurisdiction {
        country: country.into(),
        region: Some(region.into()),
        ..Default::default()
      }),
    }
  }

  #[test]
  fn extra_provincial_bc_registrations_are_domestic() {
    assert!(!is_foreign(&business("A0012345", "CA", "BC")));
    assert!(is_foreign(&business("A0012345", "CA", "AB")));
    assert!(is_foreign(&business("123456", "US", "WA")));
  }
}

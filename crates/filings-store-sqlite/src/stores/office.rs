//! Offices, keyed by office type.

use std::collections::BTreeMap;

use filings_core::{
  filing::{OfficeAddresses, OfficeType},
  temporal::{EventId, TemporalSpan},
};
use rusqlite::{Connection, Params, params};

use super::{AS_OF, TemporalStore, address, span};
use crate::{Result, encode::decode_code};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfficeRecord {
  pub office_type: OfficeType,
  pub span:        TemporalSpan,
  pub addresses:   OfficeAddresses,
}

struct RawOffice {
  office_typ_cd: String,
  span:          TemporalSpan,
  delivery:      Option<i64>,
  mailing:       Option<i64>,
}

pub struct OfficeStore;

impl OfficeStore {
  fn query(conn: &Connection, filter: &str, params: impl Params) -> Result<Vec<OfficeRecord>> {
    let sql = format!(
      "SELECT office_typ_cd, start_event_id, end_event_id,
              delivery_addr_id, mailing_addr_id
       FROM office WHERE corp_num = ?1 AND {filter}
       ORDER BY office_typ_cd"
    );
    let mut stmt = conn.prepare(&sql)?;
    let raws = stmt
      .query_map(params, |row| {
        Ok(RawOffice {
          office_typ_cd: row.get("office_typ_cd")?,
          span:          span(row, "start_event_id", "end_event_id")?,
          delivery:      row.get("delivery_addr_id")?,
          mailing:       row.get("mailing_addr_id")?,
        })
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?;

    raws
      .into_iter()
      .map(|raw| {
        Ok(OfficeRecord {
          office_type: decode_code("office", &raw.office_typ_cd)?,
          span:        raw.span,
          addresses:   OfficeAddresses {
            delivery_address: address::load(conn, raw.delivery)?,
            mailing_address:  address::load(conn, raw.mailing)?,
          },
        })
      })
      .collect()
  }

  /// End the current office of this type, if any, and start a new one.
  pub fn replace(
    conn: &Connection,
    corp_num: &str,
    event_id: EventId,
    office_type: OfficeType,
    addresses: &OfficeAddresses,
  ) -> Result<OfficeRecord> {
    Self::end(conn, corp_num, event_id, &office_type)?;
    Self::create(conn, corp_num, event_id, &(office_type, addresses.clone()))
  }

  /// [`OfficeStore::replace`] for each office type independently. Office
  /// types not named are left alone.
  pub fn replace_all(
    conn: &Connection,
    corp_num: &str,
    event_id: EventId,
    offices: &BTreeMap<OfficeType, OfficeAddresses>,
  ) -> Result<Vec<OfficeRecord>> {
    offices
      .iter()
      .map(|(office_type, addresses)| {
        Self::replace(conn, corp_num, event_id, *office_type, addresses)
      })
      .collect()
  }

  pub fn to_map(records: Vec<OfficeRecord>) -> BTreeMap<OfficeType, OfficeAddresses> {
    records.into_iter().map(|r| (r.office_type, r.addresses)).collect()
  }
}

impl TemporalStore for OfficeStore {
  type Key = OfficeType;
  type Payload = (OfficeType, OfficeAddresses);
  type Record = OfficeRecord;

  fn current(conn: &Connection, corp_num: &str) -> Result<Vec<OfficeRecord>> {
    Self::query(conn, "end_event_id IS NULL", params![corp_num])
  }

  fn as_of(
    conn: &Connection,
    corp_num: &str,
    event_id: EventId,
  ) -> Result<Vec<OfficeRecord>> {
    Self::query(conn, AS_OF, params![corp_num, event_id])
  }

  fn create(
    conn: &Connection,
    corp_num: &str,
    event_id: EventId,
    (office_type, addresses): &(OfficeType, OfficeAddresses),
  ) -> Result<OfficeRecord> {
    let delivery = address::insert_opt(conn, addresses.delivery_address.as_ref())?;
    let mailing = address::insert_opt(conn, addresses.mailing_address.as_ref())?;
    conn.execute(
      "INSERT INTO office (
         corp_num, office_typ_cd, start_event_id, delivery_addr_id, mailing_addr_id
       ) VALUES (?1, ?2, ?3, ?4, ?5)",
      params![corp_num, office_type.code(), event_id, delivery, mailing],
    )?;
    Ok(OfficeRecord {
      office_type: *office_type,
      span:        TemporalSpan::open(event_id),
      addresses:   addresses.clone(),
    })
  }

  fn end(
    conn: &Connection,
    corp_num: &str,
    event_id: EventId,
    office_type: &OfficeType,
  ) -> Result<bool> {
    let n = conn.execute(
      "UPDATE office SET end_event_id = ?3
       WHERE corp_num = ?1 AND office_typ_cd = ?2 AND end_event_id IS NULL",
      params![corp_num, office_type.code(), event_id],
    )?;
    Ok(n > 0)
  }
}

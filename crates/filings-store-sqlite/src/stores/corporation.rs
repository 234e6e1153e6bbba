//! The corporation summary row. Not temporal: its current name and state
//! are read from the name and state stores.

use chrono::NaiveDate;
use filings_core::{
  entity::{Business, CorpState, EntityType, FrozenType, NewBusiness, identifier_from_corp_num},
  temporal::EventId,
};
use rusqlite::{Connection, OptionalExtension as _, params};

use super::{name::NameStore, state::StateStore};
use crate::{
  Result,
  encode::{decode_code, decode_dt, decode_opt_date, encode_date, encode_dt},
};

struct RawCorporation {
  corp_typ_cd:        String,
  recognition_dts:    String,
  last_ar_filed_dt:   Option<String>,
  last_agm_date:      Option<String>,
  corp_frozen_typ_cd: Option<String>,
}

pub fn exists(conn: &Connection, corp_num: &str) -> Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM corporation WHERE corp_num = ?1",
        params![corp_num],
        |_| Ok(()),
      )
      .optional()?
      .is_some(),
  )
}

pub fn get(conn: &Connection, corp_num: &str) -> Result<Option<Business>> {
  let raw = conn
    .query_row(
      "SELECT corp_typ_cd, recognition_dts, last_ar_filed_dt, last_agm_date,
              corp_frozen_typ_cd
       FROM corporation WHERE corp_num = ?1",
      params![corp_num],
      |row| {
        Ok(RawCorporation {
          corp_typ_cd:        row.get(0)?,
          recognition_dts:    row.get(1)?,
          last_ar_filed_dt:   row.get(2)?,
          last_agm_date:      row.get(3)?,
          corp_frozen_typ_cd: row.get(4)?,
        })
      },
    )
    .optional()?;
  let Some(raw) = raw else {
    return Ok(None);
  };

  Ok(Some(Business {
    corp_num:           corp_num.to_string(),
    identifier:         identifier_from_corp_num(corp_num),
    entity_type:        decode_code("entity type", &raw.corp_typ_cd)?,
    legal_name:         NameStore::current_legal_name(conn, corp_num)?,
    state:              StateStore::current_state(conn, corp_num)?,
    founding_date:      decode_dt(&raw.recognition_dts)?,
    last_ar_filed_date: decode_opt_date(raw.last_ar_filed_dt.as_deref())?,
    last_agm_date:      decode_opt_date(raw.last_agm_date.as_deref())?,
    frozen:             raw
      .corp_frozen_typ_cd
      .as_deref()
      .map(|c| decode_code::<FrozenType>("frozen type", c))
      .transpose()?,
  }))
}

pub fn insert(conn: &Connection, corp_num: &str, new: &NewBusiness) -> Result<()> {
  conn.execute(
    "INSERT INTO corporation (corp_num, corp_typ_cd, recognition_dts)
     VALUES (?1, ?2, ?3)",
    params![corp_num, new.entity_type.code(), encode_dt(new.founding_date)],
  )?;
  Ok(())
}

pub fn update_type(conn: &Connection, corp_num: &str, entity_type: EntityType) -> Result<()> {
  conn.execute(
    "UPDATE corporation SET corp_typ_cd = ?2 WHERE corp_num = ?1",
    params![corp_num, entity_type.code()],
  )?;
  Ok(())
}

/// Denormalised dates written after every filing. Annual reports also pass
/// the filed and AGM dates; a `None` AGM date keeps the previous one.
pub fn update_summary(
  conn: &Connection,
  corp_num: &str,
  last_ledger: NaiveDate,
  annual_report: Option<(NaiveDate, Option<NaiveDate>)>,
) -> Result<()> {
  match annual_report {
    None => conn.execute(
      "UPDATE corporation SET last_ledger_dt = ?2 WHERE corp_num = ?1",
      params![corp_num, encode_date(last_ledger)],
    )?,
    Some((filed, agm)) => conn.execute(
      "UPDATE corporation SET
         last_ledger_dt = ?2,
         last_ar_filed_dt = ?3,
         last_agm_date = COALESCE(?4, last_agm_date)
       WHERE corp_num = ?1",
      params![corp_num, encode_date(last_ledger), encode_date(filed), agm.map(encode_date)],
    )?,
  };
  Ok(())
}

pub fn freeze(conn: &Connection, corp_num: &str, frozen: FrozenType) -> Result<()> {
  conn.execute(
    "UPDATE corporation SET corp_frozen_typ_cd = ?2 WHERE corp_num = ?1",
    params![corp_num, frozen.to_string()],
  )?;
  Ok(())
}

/// Move a corporation to `state`. The corporation must exist.
pub fn transition_state(
  conn: &Connection,
  corp_num: &str,
  event_id: EventId,
  state: CorpState,
) -> Result<()> {
  if !exists(conn, corp_num)? {
    return Err(filings_core::Error::EntityNotFound(identifier_from_corp_num(corp_num)).into());
  }
  StateStore::transition(conn, corp_num, event_id, state)?;
  Ok(())
}


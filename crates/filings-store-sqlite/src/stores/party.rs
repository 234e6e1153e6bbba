//! Parties in a role: directors, incorporators, custodians, and so on.
//!
//! Parties have no natural key. A row is identified by its id; directors
//! are located by name through [`filings_core::diff::compare`].

use chrono::NaiveDate;
use filings_core::{
  diff::{CurrentDirector, PartyId, compare},
  filing::{Address, Officer, PartyType, RoleType},
  temporal::{EventId, TemporalSpan},
};
use rusqlite::{Connection, Params, params};

use super::{AS_OF, TemporalStore, address, span};
use crate::{
  Result,
  encode::{decode_code, decode_opt_date, encode_date},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartyRecord {
  pub party_id:         PartyId,
  pub role:             RoleType,
  pub span:             TemporalSpan,
  pub prev_party_id:    Option<PartyId>,
  pub officer:          Officer,
  pub delivery_address: Option<Address>,
  pub mailing_address:  Option<Address>,
  pub appointment_date: Option<NaiveDate>,
  pub cessation_date:   Option<NaiveDate>,
}

impl PartyRecord {
  pub fn as_current_director(&self) -> CurrentDirector {
    CurrentDirector { party_id: self.party_id, officer: self.officer.clone() }
  }
}

/// Insert payload for one party row.
#[derive(Debug, Clone)]
pub struct NewParty {
  pub role:             RoleType,
  pub officer:          Officer,
  pub delivery_address: Option<Address>,
  pub mailing_address:  Option<Address>,
  pub appointment_date: Option<NaiveDate>,
  pub cessation_date:   Option<NaiveDate>,
  pub prev_party_id:    Option<PartyId>,
}

struct RawParty {
  party_id:       PartyId,
  role:           String,
  span:           TemporalSpan,
  prev_party_id:  Option<PartyId>,
  appointment_dt: Option<String>,
  cessation_dt:   Option<String>,
  first:          Option<String>,
  middle:         Option<String>,
  last:           Option<String>,
  business:       Option<String>,
  kind:           String,
  email:          Option<String>,
  delivery:       Option<i64>,
  mailing:        Option<i64>,
}

const COLUMNS: &str = "corp_party_id, party_typ_cd, start_event_id, end_event_id,
  prev_party_id, appointment_dt, cessation_dt, first_nme, middle_nme, last_nme,
  business_nme, party_kind, email_address, delivery_addr_id, mailing_addr_id";

pub struct PartyStore;

impl PartyStore {
  fn query(conn: &Connection, filter: &str, params: impl Params) -> Result<Vec<PartyRecord>> {
    let sql = format!(
      "SELECT {COLUMNS} FROM corp_party WHERE corp_num = ?1 AND {filter}
       ORDER BY corp_party_id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let raws = stmt
      .query_map(params, |row| {
        Ok(RawParty {
          party_id:       row.get("corp_party_id")?,
          role:           row.get("party_typ_cd")?,
          span:           span(row, "start_event_id", "end_event_id")?,
          prev_party_id:  row.get("prev_party_id")?,
          appointment_dt: row.get("appointment_dt")?,
          cessation_dt:   row.get("cessation_dt")?,
          first:          row.get("first_nme")?,
          middle:         row.get("middle_nme")?,
          last:           row.get("last_nme")?,
          business:       row.get("business_nme")?,
          kind:           row.get("party_kind")?,
          email:          row.get("email_address")?,
          delivery:       row.get("delivery_addr_id")?,
          mailing:        row.get("mailing_addr_id")?,
        })
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?;

    raws.into_iter().map(|raw| Self::decode(conn, raw)).collect()
  }

  fn decode(conn: &Connection, raw: RawParty) -> Result<PartyRecord> {
    let party_type = if raw.kind == "organization" {
      PartyType::Organization
    } else {
      PartyType::Person
    };
    Ok(PartyRecord {
      party_id:         raw.party_id,
      role:             decode_code("party role", &raw.role)?,
      span:             raw.span,
      prev_party_id:    raw.prev_party_id,
      officer:          Officer {
        first_name: raw.first,
        middle_initial: raw.middle,
        last_name: raw.last,
        org_name: raw.business,
        party_type,
        email: raw.email,
        ..Default::default()
      },
      delivery_address: address::load(conn, raw.delivery)?,
      mailing_address:  address::load(conn, raw.mailing)?,
      appointment_date: decode_opt_date(raw.appointment_dt.as_deref())?,
      cessation_date:   decode_opt_date(raw.cessation_dt.as_deref())?,
    })
  }

  pub fn current_in_role(
    conn: &Connection,
    corp_num: &str,
    role: RoleType,
  ) -> Result<Vec<PartyRecord>> {
    Self::query(
      conn,
      "party_typ_cd = ?2 AND end_event_id IS NULL",
      params![corp_num, role.code()],
    )
  }

  pub fn as_of_in_role(
    conn: &Connection,
    corp_num: &str,
    event_id: EventId,
    role: RoleType,
  ) -> Result<Vec<PartyRecord>> {
    let filter = format!("party_typ_cd = ?3 AND {AS_OF}");
    Self::query(conn, &filter, params![corp_num, event_id, role.code()])
  }

  /// Parties in `role` current at `event_id` or ended by it. This is the
  /// slice a director change is reconstructed from.
  pub fn around_event(
    conn: &Connection,
    corp_num: &str,
    event_id: EventId,
    role: RoleType,
  ) -> Result<Vec<PartyRecord>> {
    Self::query(
      conn,
      "party_typ_cd = ?3 AND start_event_id <= ?2
         AND (end_event_id IS NULL OR end_event_id >= ?2)",
      params![corp_num, event_id, role.code()],
    )
  }

  /// Parties in any role that started at `event_id`.
  pub fn started_at(
    conn: &Connection,
    corp_num: &str,
    event_id: EventId,
  ) -> Result<Vec<PartyRecord>> {
    Self::query(conn, "start_event_id = ?2", params![corp_num, event_id])
  }

  /// End every current party in `role` whose name matches `officer`, stamping
  /// the cessation date. Returns the number ended.
  pub fn end_by_name(
    conn: &Connection,
    corp_num: &str,
    event_id: EventId,
    role: RoleType,
    officer: &Officer,
    cessation_date: Option<NaiveDate>,
  ) -> Result<usize> {
    let matching: Vec<PartyId> = Self::current_in_role(conn, corp_num, role)?
      .into_iter()
      .filter(|p| compare(&p.officer, officer))
      .map(|p| p.party_id)
      .collect();
    for &party_id in &matching {
      Self::end_by_id(conn, corp_num, event_id, party_id, cessation_date)?;
    }
    Ok(matching.len())
  }

  /// End one current row, stamping the cessation date when given.
  pub fn end_by_id(
    conn: &Connection,
    corp_num: &str,
    event_id: EventId,
    party_id: PartyId,
    cessation_date: Option<NaiveDate>,
  ) -> Result<bool> {
    if !Self::end(conn, corp_num, event_id, &party_id)? {
      return Ok(false);
    }
    if let Some(date) = cessation_date {
      conn.execute(
        "UPDATE corp_party SET cessation_dt = ?2 WHERE corp_party_id = ?1",
        params![party_id, encode_date(date)],
      )?;
    }
    Ok(true)
  }

  /// End every current party in `role`.
  pub fn end_all_in_role(
    conn: &Connection,
    corp_num: &str,
    event_id: EventId,
    role: RoleType,
  ) -> Result<usize> {
    Ok(conn.execute(
      "UPDATE corp_party SET end_event_id = ?3
       WHERE corp_num = ?1 AND party_typ_cd = ?2 AND end_event_id IS NULL",
      params![corp_num, role.code(), event_id],
    )?)
  }
}

impl TemporalStore for PartyStore {
  type Key = PartyId;
  type Payload = NewParty;
  type Record = PartyRecord;

  /// Current parties in every role.
  fn current(conn: &Connection, corp_num: &str) -> Result<Vec<PartyRecord>> {
    Self::query(conn, "end_event_id IS NULL", params![corp_num])
  }

  fn as_of(conn: &Connection, corp_num: &str, event_id: EventId) -> Result<Vec<PartyRecord>> {
    Self::query(conn, AS_OF, params![corp_num, event_id])
  }

  fn create(
    conn: &Connection,
    corp_num: &str,
    event_id: EventId,
    party: &NewParty,
  ) -> Result<PartyRecord> {
    let role = party.role;
    let delivery = address::insert_opt(conn, party.delivery_address.as_ref())?;
    let mailing = address::insert_opt(conn, party.mailing_address.as_ref())?;
    let kind = match party.officer.party_type {
      PartyType::Organization => "organization",
      PartyType::Person => "person",
    };
    conn.execute(
      "INSERT INTO corp_party (
         corp_num, party_typ_cd, start_event_id, prev_party_id,
         appointment_dt, cessation_dt, first_nme, middle_nme, last_nme,
         business_nme, party_kind, email_address, delivery_addr_id, mailing_addr_id
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
      params![
        corp_num,
        role.code(),
        event_id,
        party.prev_party_id,
        party.appointment_date.map(encode_date),
        party.cessation_date.map(encode_date),
        party.officer.first_name,
        party.officer.middle_initial,
        party.officer.last_name,
        party.officer.org_name,
        kind,
        party.officer.email,
        delivery,
        mailing,
      ],
    )?;

    let mut officer = party.officer.clone();
    officer.prev_first_name = None;
    officer.prev_middle_initial = None;
    officer.prev_last_name = None;
    Ok(PartyRecord {
      party_id: conn.last_insert_rowid(),
      role,
      span: TemporalSpan::open(event_id),
      prev_party_id: party.prev_party_id,
      officer,
      delivery_address: party.delivery_address.clone(),
      mailing_address: party.mailing_address.clone(),
      appointment_date: party.appointment_date,
      cessation_date: party.cessation_date,
    })
  }

  fn end(conn: &Connection, corp_num: &str, event_id: EventId, party_id: &PartyId) -> Result<bool> {
    let n = conn.execute(
      "UPDATE corp_party SET end_event_id = ?3
       WHERE corp_num = ?1 AND corp_party_id = ?2 AND end_event_id IS NULL",
      params![corp_num, party_id, event_id],
    )?;
    Ok(n > 0)
  }
}

//! The ledger writer: applies one filing as a single `IMMEDIATE`
//! transaction.
//!
//! Every step runs against the same transaction. Any error returns before
//! `commit`, and dropping the uncommitted transaction rolls back every
//! record written so far, the event row included.

use chrono::{Datelike as _, NaiveDate, Utc};
use filings_core::{
  Error as CoreError,
  codes::{CodeRegistry, FilingType, HeaderLayout, SubType, TypeCode},
  diff::{PartyOp, diff_translations, plan_directors},
  entity::{Business, CorpState, EntityType, FrozenType, NameType, corp_num_from_identifier},
  filing::{
    CourtOrder, DirectorEntry, Filing, FilingSource, OfficeType, PartyEntry, RoleType,
  },
  narrative::{self, Narrative},
  temporal::{EventId, EventType},
};
use rusqlite::{Connection, TransactionBehavior, params};

use crate::{
  Result,
  encode::{encode_date, encode_dt, encode_ind},
  events,
  stores::{
    TemporalStore,
    amalgamating::AmalgamatingStore,
    corporation,
    jurisdiction::{JurisdictionStore, NewJurisdiction},
    name::{NameKey, NameStore},
    office::OfficeStore,
    party::{NewParty, PartyStore},
    restriction::RestrictionStore,
    share::ShareStore,
    state::StateStore,
  },
};

/// Apply `filing` and return the event it was recorded under.
pub fn submit(
  conn: &mut Connection,
  registry: &CodeRegistry,
  filing: &Filing,
) -> Result<EventId> {
  let filing_type = filing.filing_type;
  if !filing_type.is_submittable() {
    return Err(CoreError::InvalidFilingType(filing_type.name().into()).into());
  }
  let sub_type = filing.resolved_sub_type();
  if let Some(sub_type) = sub_type {
    if !registry.is_sub_type_supported(filing_type, sub_type) {
      tracing::error!(%filing_type, %sub_type, "unsupported filing sub type");
      return Err(CoreError::UnsupportedFilingType { filing_type, sub_type }.into());
    }
  }
  if let Some(component) = filing.missing_section() {
    return Err(CoreError::MissingComponent { filing_type, component }.into());
  }

  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

  let corp_num = corp_num_from_identifier(&filing.identifier);
  let business = corporation::get(&tx, &corp_num)?
    .ok_or_else(|| CoreError::EntityNotFound(filing.identifier.clone()))?;

  let code = registry
    .code_for(filing_type, business.entity_type, sub_type)
    .ok_or_else(|| {
      CoreError::InvalidFilingType(format!(
        "{filing_type} for entity type {}",
        business.entity_type
      ))
    })?;
  let layout = HeaderLayout::for_code(code).ok_or_else(|| {
    tracing::error!(%code, "no header layout for filing code");
    CoreError::InvalidFilingType(code.to_string())
  })?;

  let event_id = events::allocate(&tx, &corp_num, EventType::File)?;
  let mut writer = FilingWriter {
    conn: &tx,
    filing,
    business,
    corp_num,
    event_id,
    narrative: Narrative::default(),
  };

  writer.insert_filing_user()?;
  writer.insert_header(code, layout)?;

  match filing_type {
    FilingType::AmalgamationApplication => writer.process_amalgamating_businesses()?,
    FilingType::ContinuationIn => writer.process_continuation_in()?,
    _ => {}
  }

  if filing_type == FilingType::Correction {
    writer.process_correction()?;
  } else {
    writer.process_filing()?;
  }

  tx.commit()?;
  tracing::info!(
    identifier = %filing.identifier,
    %filing_type,
    %code,
    event_id,
    "filing recorded"
  );
  Ok(event_id)
}

// ─── Writer ──────────────────────────────────────────────────────────────────

struct FilingWriter<'a> {
  conn:      &'a Connection,
  filing:    &'a Filing,
  business:  Business,
  corp_num:  String,
  event_id:  EventId,
  narrative: Narrative,
}

impl FilingWriter<'_> {
  fn missing(&self, component: &'static str) -> crate::Error {
    CoreError::MissingComponent { filing_type: self.filing.filing_type, component }.into()
  }

  fn user_id(&self) -> &'static str { self.business.entity_type.ledger_user() }

  // ── Header ──────────────────────────────────────────────────────────────

  fn insert_filing_user(&self) -> Result<()> {
    self.conn.execute(
      "INSERT INTO filing_user (event_id, user_id, last_nme, email_addr)
       VALUES (?1, ?2, ?3, ?4)",
      params![
        self.event_id,
        self.user_id(),
        self.filing.header.certified_by,
        self.filing.email(),
      ],
    )?;
    Ok(())
  }

  fn insert_header(&self, code: TypeCode, layout: HeaderLayout) -> Result<()> {
    let body = &self.filing.body;
    let mut period_end: Option<NaiveDate> = None;
    let mut agm_date: Option<NaiveDate> = None;
    let mut change_dt: Option<NaiveDate> = None;
    let mut arrangement = false;
    let mut court_order_num: Option<String> = None;

    match layout {
      HeaderLayout::CoopAnnualReport => {
        period_end = body.annual_general_meeting_date.or(body.annual_report_date);
        agm_date = body.annual_general_meeting_date;
      }
      HeaderLayout::AnnualReport => period_end = body.annual_report_date,
      HeaderLayout::DirectorChange => change_dt = Some(self.filing.filing_date()),
      HeaderLayout::Arrangement => {
        if code.is_order() {
          arrangement =
            body.effect_of_order.as_deref() == Some(CourtOrder::PLAN_OF_ARRANGEMENT);
          court_order_num = body.file_number.clone();
        } else if let Some(order) = &body.court_order {
          arrangement = order.effect_of_order.as_deref().is_some_and(|e| !e.is_empty());
          court_order_num = order.file_number.clone();
        }
      }
      HeaderLayout::CoopBasic | HeaderLayout::Resolution => {}
    }

    self.conn.execute(
      "INSERT INTO filing (
         event_id, filing_typ_cd, effective_dt, period_end_dt, agm_date,
         change_dt, arrangement_ind, court_order_num, ods_typ_cd, corrected_event_id
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
      params![
        self.event_id,
        code.as_str(),
        encode_dt(self.filing.effective_date),
        period_end.map(encode_date),
        agm_date.map(encode_date),
        change_dt.map(encode_date),
        encode_ind(arrangement),
        court_order_num,
        layout.ods_type(),
        body.corrected_event_id,
      ],
    )?;
    Ok(())
  }

  fn insert_ledger_text(&self, notation: Option<&str>) -> Result<()> {
    self.conn.execute(
      "INSERT INTO ledger_text (event_id, ledger_text_dts, notation, user_id)
       VALUES (?1, ?2, ?3, ?4)",
      params![
        self.event_id,
        encode_dt(self.filing.effective_date),
        notation,
        self.user_id(),
      ],
    )?;
    Ok(())
  }

  // ── Pre-processing ──────────────────────────────────────────────────────

  fn process_amalgamating_businesses(&self) -> Result<()> {
    let businesses = self.filing.body.amalgamating_businesses.as_deref().unwrap_or_default();
    for (index, business) in businesses.iter().enumerate() {
      let record = AmalgamatingStore::create(
        self.conn,
        &self.corp_num,
        self.event_id,
        &(index as i64, business.clone()),
      )?;
      if let Some(corp_num) = &record.corp_num {
        corporation::transition_state(self.conn, corp_num, self.event_id, CorpState::Amalgamated)?;
      }
    }
    Ok(())
  }

  fn process_continuation_in(&self) -> Result<()> {
    let body = &self.filing.body;
    let foreign_jurisdiction = body
      .foreign_jurisdiction
      .clone()
      .ok_or_else(|| self.missing("foreignJurisdiction"))?;
    let bc_xpro_num = body.business.as_ref().and_then(|b| b.identifier.clone());

    if let Some(xpro) = &bc_xpro_num {
      let xpro_corp = corp_num_from_identifier(xpro);
      if corporation::exists(self.conn, &xpro_corp)? {
        StateStore::transition(self.conn, &xpro_corp, self.event_id, CorpState::ContinuedIn)?;
      } else {
        tracing::debug!(%xpro, "extra-provincial registration not in the ledger");
      }
    }

    JurisdictionStore::create(self.conn, &self.corp_num, self.event_id, &NewJurisdiction {
      foreign_jurisdiction,
      bc_xpro_num,
    })?;
    Ok(())
  }

  // ── Correction ──────────────────────────────────────────────────────────

  fn process_correction(&mut self) -> Result<()> {
    let filing = self.filing;
    let body = &filing.body;

    if let Some(name_request) = &body.name_request {
      let target = self.legal_name_for(name_request.legal_name.as_deref())?;
      let current = NameStore::current_legal_name(self.conn, &self.corp_num)?;
      if current.as_deref() != Some(target.1.as_str()) {
        self.replace_legal_name(target)?;
      }
    }

    self.apply_translations()?;
    self.process_offices()?;

    if let Some(parties) = &body.parties {
      PartyStore::end_all_in_role(self.conn, &self.corp_num, self.event_id, RoleType::Director)?;
      for party in parties {
        self.create_party_roles(party)?;
      }
    }

    if let Some(share_structure) = &body.share_structure {
      ShareStore::end(self.conn, &self.corp_num, self.event_id, &())?;
      ShareStore::create(self.conn, &self.corp_num, self.event_id, &share_structure.share_classes)?;
    }
    Ok(())
  }

  // ── Default path ────────────────────────────────────────────────────────

  fn process_filing(&mut self) -> Result<()> {
    let filing = self.filing;
    let filing_type = filing.filing_type;
    let body = &filing.body;

    self.process_annual_report()?;
    self.process_directors()?;
    self.process_offices()?;
    self.process_parties()?;
    self.process_share_structure()?;
    self.process_name_request()?;
    self.apply_translations()?;

    if let Some(legal_type) = body.business.as_ref().and_then(|b| b.legal_type) {
      corporation::update_type(self.conn, &self.corp_num, legal_type)?;
    }

    self.process_restrictions()?;

    if let Some(text) = self.narrative.render() {
      self.insert_ledger_text(Some(&text))?;
    }
    if filing_type.is_order() {
      self.insert_ledger_text(body.order_details.as_deref())?;
    }
    if filing.is(FilingType::Dissolution, SubType::Voluntary) {
      StateStore::transition(
        self.conn,
        &self.corp_num,
        self.event_id,
        CorpState::VoluntaryDissolution,
      )?;
    }
    if filing_type == FilingType::SpecialResolution {
      self.insert_ledger_text(body.resolution.as_deref())?;
    }

    self.update_summary()?;
    self.freeze_if_required()
  }

  fn process_annual_report(&mut self) -> Result<()> {
    if self.filing.filing_type != FilingType::AnnualReport
      || self.filing.header.source == FilingSource::Bar
    {
      return Ok(());
    }
    let ar_date = self
      .filing
      .body
      .annual_report_date
      .ok_or_else(|| self.missing("annualReportDate"))?;

    if self.business.state != Some(CorpState::Active)
      && ar_date.year() >= Utc::now().year() - 1
    {
      StateStore::transition(self.conn, &self.corp_num, self.event_id, CorpState::Active)?;
    }

    self.narrative.push(narrative::annual_report_line(
      ar_date,
      self.filing.body.annual_general_meeting_date,
    ));
    Ok(())
  }

  fn process_directors(&mut self) -> Result<()> {
    if self.filing.filing_type == FilingType::AnnualReport {
      return Ok(());
    }
    let Some(directors) = self.filing.body.directors.as_deref().filter(|d| !d.is_empty())
    else {
      return Ok(());
    };

    let current: Vec<_> =
      PartyStore::current_in_role(self.conn, &self.corp_num, RoleType::Director)?
        .iter()
        .map(|p| p.as_current_director())
        .collect();

    for op in plan_directors(&current, directors)? {
      match op {
        PartyOp::Create(entry) => {
          PartyStore::create(self.conn, &self.corp_num, self.event_id, &director(&entry, None))?;
        }
        PartyOp::EndByName(entry) => {
          let ended = PartyStore::end_by_name(
            self.conn,
            &self.corp_num,
            self.event_id,
            RoleType::Director,
            &entry.officer,
            entry.cessation_date,
          )?;
          if ended == 0 {
            tracing::warn!(
              director = %entry.officer.display_name(),
              "ceased director has no current record"
            );
          }
        }
        PartyOp::End(party_id) => {
          PartyStore::end_by_id(self.conn, &self.corp_num, self.event_id, party_id, None)?;
        }
        PartyOp::CreateReplacement { entry, prev_party_id, ceased } => {
          let record = PartyStore::create(
            self.conn,
            &self.corp_num,
            self.event_id,
            &director(&entry, Some(prev_party_id)),
          )?;
          if ceased {
            PartyStore::end_by_id(
              self.conn,
              &self.corp_num,
              self.event_id,
              record.party_id,
              entry.cessation_date,
            )?;
          }
        }
      }
    }

    self.narrative.push(narrative::DIRECTOR_CHANGE);
    Ok(())
  }

  fn process_offices(&mut self) -> Result<()> {
    let filing = self.filing;
    if filing.filing_type == FilingType::AnnualReport {
      return Ok(());
    }

    if filing.is(FilingType::Dissolution, SubType::Voluntary) {
      let office = filing
        .body
        .custodial_office
        .as_ref()
        .ok_or_else(|| self.missing("custodialOffice"))?;
      OfficeStore::replace(
        self.conn,
        &self.corp_num,
        self.event_id,
        OfficeType::CustodialOffice,
        office,
      )?;
      self.narrative.push(narrative::office_line(OfficeType::CustodialOffice));
      return Ok(());
    }

    let Some(offices) = &filing.body.offices else {
      return Ok(());
    };
    OfficeStore::replace_all(self.conn, &self.corp_num, self.event_id, offices)?;
    if !filing.filing_type.is_incorporation_like() {
      for office_type in offices.keys() {
        self.narrative.push(narrative::office_line(*office_type));
      }
    }
    Ok(())
  }

  fn process_parties(&self) -> Result<()> {
    let Some(parties) = &self.filing.body.parties else {
      return Ok(());
    };

    if self.filing.filing_type == FilingType::Transition {
      let mut roles: Vec<RoleType> =
        parties.iter().flat_map(|p| p.roles.iter().map(|r| r.role_type)).collect();
      roles.sort();
      roles.dedup();
      for role in roles {
        PartyStore::end_all_in_role(self.conn, &self.corp_num, self.event_id, role)?;
      }
    }

    for party in parties {
      self.create_party_roles(party)?;
    }
    Ok(())
  }

  fn create_party_roles(&self, party: &PartyEntry) -> Result<()> {
    for role in &party.roles {
      PartyStore::create(self.conn, &self.corp_num, self.event_id, &NewParty {
        role:             role.role_type,
        officer:          party.officer.clone(),
        delivery_address: party.delivery_address.clone(),
        mailing_address:  party.mailing_address.clone(),
        appointment_date: role.appointment_date,
        cessation_date:   role.cessation_date,
        prev_party_id:    None,
      })?;
    }
    Ok(())
  }

  fn process_share_structure(&self) -> Result<()> {
    let Some(share_structure) = &self.filing.body.share_structure else {
      return Ok(());
    };
    for date in &share_structure.resolution_dates {
      ShareStore::add_resolution(self.conn, &self.corp_num, self.event_id, *date)?;
    }
    if self.business.entity_type != EntityType::Coop
      && !share_structure.share_classes.is_empty()
    {
      ShareStore::end(self.conn, &self.corp_num, self.event_id, &())?;
      ShareStore::create(self.conn, &self.corp_num, self.event_id, &share_structure.share_classes)?;
    }
    Ok(())
  }

  fn process_name_request(&self) -> Result<()> {
    let Some(name_request) = &self.filing.body.name_request else {
      return Ok(());
    };
    if self.filing.filing_type.is_incorporation_like() {
      StateStore::transition(self.conn, &self.corp_num, self.event_id, CorpState::Active)?;
    }
    let target = self.legal_name_for(name_request.legal_name.as_deref())?;
    self.replace_legal_name(target)
  }

  // ── Names ───────────────────────────────────────────────────────────────

  /// The legal name to record: the requested name, or the numbered name
  /// when none was requested.
  fn legal_name_for(&self, requested: Option<&str>) -> Result<(NameType, String)> {
    if let Some(name) = requested.filter(|n| !n.is_empty()) {
      return Ok((NameType::Corporate, name.to_string()));
    }
    self
      .business
      .entity_type
      .numbered_name(&self.corp_num)
      .map(|name| (NameType::Numbered, name))
      .ok_or_else(|| self.missing("nameRequest.legalName"))
  }

  fn replace_legal_name(&self, name: (NameType, String)) -> Result<()> {
    NameStore::end(self.conn, &self.corp_num, self.event_id, &NameKey::Legal)?;
    NameStore::create(self.conn, &self.corp_num, self.event_id, &name)?;
    Ok(())
  }

  fn apply_translations(&self) -> Result<()> {
    let current = NameStore::current_translations(self.conn, &self.corp_num)?;
    let diff = diff_translations(&current, self.filing.body.name_translations.as_deref());
    if diff.is_empty() {
      return Ok(());
    }
    for name in diff.end {
      NameStore::end(self.conn, &self.corp_num, self.event_id, &NameKey::Translation(name))?;
    }
    for name in diff.create {
      NameStore::create(self.conn, &self.corp_num, self.event_id, &(NameType::Translation, name))?;
    }
    Ok(())
  }

  // ── Restrictions, summary, freeze ───────────────────────────────────────

  fn process_restrictions(&self) -> Result<()> {
    let body = &self.filing.body;
    let current = || -> Result<Option<bool>> {
      Ok(
        RestrictionStore::current(self.conn, &self.corp_num)?
          .first()
          .map(|r| r.restricted),
      )
    };

    if body.provisions_removed == Some(true) && current()? == Some(true) {
      RestrictionStore::end(self.conn, &self.corp_num, self.event_id, &())?;
    }

    if body.has_provisions == Some(true) {
      match current()? {
        Some(true) => {}
        Some(false) => {
          RestrictionStore::end(self.conn, &self.corp_num, self.event_id, &())?;
          RestrictionStore::create(self.conn, &self.corp_num, self.event_id, &true)?;
        }
        None => {
          RestrictionStore::create(self.conn, &self.corp_num, self.event_id, &true)?;
        }
      }
    }
    Ok(())
  }

  fn update_summary(&self) -> Result<()> {
    let today = Utc::now().date_naive();
    let annual_report = if self.filing.filing_type == FilingType::AnnualReport {
      Some((self.last_ar_filed_date(today)?, self.filing.body.annual_general_meeting_date))
    } else {
      None
    };
    corporation::update_summary(self.conn, &self.corp_num, today, annual_report)
  }

  /// Today, or for backfilled reports the anniversary of the founding date
  /// in the filing year.
  fn last_ar_filed_date(&self, today: NaiveDate) -> Result<NaiveDate> {
    if self.filing.header.source != FilingSource::Bar {
      return Ok(today);
    }
    let year = self.filing.header.filing_year.ok_or_else(|| self.missing("filingYear"))?;
    let founded = self.business.founding_date.date_naive();
    NaiveDate::from_ymd_opt(year, founded.month(), founded.day())
      .or_else(|| NaiveDate::from_ymd_opt(year, founded.month(), 28))
      .ok_or_else(|| crate::Error::DateParse(format!("filing year {year}")))
  }

  fn freeze_if_required(&self) -> Result<()> {
    let filing_type = self.filing.filing_type;
    let entity_type = self.business.entity_type;
    let freeze = filing_type == FilingType::Alteration
      || (matches!(
        filing_type,
        FilingType::IncorporationApplication | FilingType::AmalgamationApplication
      ) && entity_type == EntityType::BenefitCompany)
      || (filing_type == FilingType::ContinuationIn
        && entity_type == EntityType::BenefitContinueIn);
    if freeze {
      corporation::freeze(self.conn, &self.corp_num, FrozenType::Company)?;
    }
    Ok(())
  }
}

fn director(entry: &DirectorEntry, prev_party_id: Option<i64>) -> NewParty {
  NewParty {
    role: RoleType::Director,
    officer: entry.officer.clone(),
    delivery_address: entry.delivery_address.clone(),
    mailing_address: entry.mailing_address.clone(),
    appointment_date: entry.appointment_date,
    cessation_date: entry.cessation_date,
    prev_party_id,
  }
}

//! The document reconstructor: rebuilds the document of a stored filing by
//! reading every temporal store as of the filing's event.
//!
//! Runs in one deferred transaction, so every store is read from the same
//! snapshot.

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use filings_core::{
  Error as CoreError,
  codes::{CodeRegistry, FilingType, SubType, TypeCode},
  components::{Component, ComponentSource},
  diff::PartyId,
  document::{DocumentHeader, DocumentSource, FilingDocument},
  entity::{Business, EntityType, corp_num_from_identifier, identifier_from_corp_num},
  filing::{
    BusinessRef, ContactPoint, CourtOrder, DirectorAction, DirectorEntry, FilingBody,
    FilingSelector, NameTranslation, NameRequest, OfficeType, PartyEntry, Role, RoleType,
    ShareStructure,
  },
  temporal::EventId,
};
use rusqlite::{Connection, OptionalExtension as _, Params, params, params_from_iter};

use crate::{
  Result,
  encode::{date_to_dt, decode_code, decode_dt, decode_ind, decode_opt_date, encode_dt},
  stores::{
    TemporalStore,
    amalgamating::AmalgamatingStore,
    corporation,
    jurisdiction::JurisdictionStore,
    name::NameStore,
    office::OfficeStore,
    party::{PartyRecord, PartyStore},
    restriction::RestrictionStore,
    share::ShareStore,
  },
};

// ─── Event info ──────────────────────────────────────────────────────────────

/// The filing header row joined with its event and submitting user.
#[derive(Debug, Clone)]
pub(crate) struct EventInfo {
  pub event_id:        EventId,
  pub corp_num:        String,
  pub timestamp:       DateTime<Utc>,
  pub effective:       DateTime<Utc>,
  pub code:            TypeCode,
  pub period_end:      Option<NaiveDate>,
  pub agm_date:        Option<NaiveDate>,
  pub arrangement:     bool,
  pub court_order_num: Option<String>,
  /// Space-joined user name; "N/A" when the filing has none.
  pub certified_by:    String,
  /// Empty when the filing has none.
  pub email:           String,
}

const EVENT_INFO: &str = "
  SELECT event.event_id, event.corp_num, event_timestmp, filing_typ_cd,
         effective_dt, period_end_dt, agm_date, arrangement_ind, court_order_num,
         first_nme, middle_nme, last_nme, email_addr
  FROM event
  JOIN filing ON filing.event_id = event.event_id
  LEFT JOIN filing_user ON filing_user.event_id = event.event_id";

struct RawEventInfo {
  event_id:        EventId,
  corp_num:        String,
  timestamp:       String,
  effective:       String,
  code:            String,
  period_end:      Option<String>,
  agm_date:        Option<String>,
  arrangement:     Option<String>,
  court_order_num: Option<String>,
  names:           [Option<String>; 3],
  email:           Option<String>,
}

impl EventInfo {
  fn query(conn: &Connection, filter: &str, params: impl Params) -> Result<Vec<EventInfo>> {
    let sql = format!("{EVENT_INFO} WHERE {filter}");
    let mut stmt = conn.prepare(&sql)?;
    let raws = stmt
      .query_map(params, |row| {
        Ok(RawEventInfo {
          event_id:        row.get(0)?,
          corp_num:        row.get(1)?,
          timestamp:       row.get(2)?,
          code:            row.get(3)?,
          effective:       row.get(4)?,
          period_end:      row.get(5)?,
          agm_date:        row.get(6)?,
          arrangement:     row.get(7)?,
          court_order_num: row.get(8)?,
          names:           [row.get(9)?, row.get(10)?, row.get(11)?],
          email:           row.get(12)?,
        })
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    raws.into_iter().map(Self::decode).collect()
  }

  fn decode(raw: RawEventInfo) -> Result<EventInfo> {
    let certified_by = raw
      .names
      .iter()
      .filter_map(|n| n.as_deref())
      .filter(|n| !n.is_empty())
      .collect::<Vec<_>>()
      .join(" ");
    Ok(EventInfo {
      event_id:        raw.event_id,
      corp_num:        raw.corp_num,
      timestamp:       decode_dt(&raw.timestamp)?,
      effective:       decode_dt(&raw.effective)?,
      code:            decode_code("filing", &raw.code)?,
      period_end:      decode_opt_date(raw.period_end.as_deref())?,
      agm_date:        decode_opt_date(raw.agm_date.as_deref())?,
      arrangement:     decode_ind(raw.arrangement.as_deref()),
      court_order_num: raw.court_order_num,
      certified_by:    if certified_by.is_empty() { "N/A".into() } else { certified_by },
      email:           raw.email.unwrap_or_default(),
    })
  }

  /// Every filing of a corporation, oldest first.
  pub(crate) fn all_for(conn: &Connection, corp_num: &str) -> Result<Vec<EventInfo>> {
    Self::query(
      conn,
      "event.corp_num = ?1 ORDER BY event_timestmp, event.event_id",
      params![corp_num],
    )
  }

  /// Filings of a corporation whose effective date falls after `today`.
  pub(crate) fn effective_after(
    conn: &Connection,
    corp_num: &str,
    today: NaiveDate,
  ) -> Result<Vec<EventInfo>> {
    Self::query(
      conn,
      "event.corp_num = ?1 AND substr(effective_dt, 1, 10) > ?2
       ORDER BY event_timestmp, event.event_id",
      params![corp_num, today.format("%Y-%m-%d").to_string()],
    )
  }

  fn by_event(conn: &Connection, event_id: EventId) -> Result<Option<EventInfo>> {
    Ok(Self::query(conn, "event.event_id = ?1", params![event_id])?.into_iter().next())
  }

  /// Resolve a selector to one stored filing.
  fn resolve(
    conn: &Connection,
    registry: &CodeRegistry,
    selector: &FilingSelector,
  ) -> Result<EventInfo> {
    match selector {
      FilingSelector::Event(event_id) => Self::by_event(conn, *event_id)?.ok_or_else(|| {
        CoreError::FilingNotFound {
          identifier:  event_id.to_string(),
          filing_type: "filing".into(),
        }
        .into()
      }),
      FilingSelector::Latest { identifier, filing_type, sub_type, year } => {
        let not_found = || CoreError::FilingNotFound {
          identifier:  identifier.clone(),
          filing_type: filing_type.to_string(),
        };
        let corp_num = corp_num_from_identifier(identifier);
        let business = corporation::get(conn, &corp_num)?
          .ok_or_else(|| CoreError::EntityNotFound(identifier.clone()))?;
        let code = registry
          .code_for(*filing_type, business.entity_type, *sub_type)
          .ok_or_else(not_found)?;

        let order = "ORDER BY event_timestmp DESC, event.event_id DESC LIMIT 2";
        let matches = match year {
          Some(year) => Self::query(
            conn,
            &format!(
              "event.corp_num = ?1 AND filing_typ_cd = ?2
               AND substr(period_end_dt, 1, 4) = ?3 {order}"
            ),
            params![corp_num, code.as_str(), format!("{year:04}")],
          )?,
          None => Self::query(
            conn,
            &format!("event.corp_num = ?1 AND filing_typ_cd = ?2 {order}"),
            params![corp_num, code.as_str()],
          )?,
        };

        if year.is_some() && matches.len() > 1 {
          tracing::warn!(
            %identifier,
            %filing_type,
            ?year,
            "several filings for the same period; using the most recent"
          );
        }
        matches.into_iter().next().ok_or_else(|| not_found().into())
      }
    }
  }
}

// ─── Reconstruction ──────────────────────────────────────────────────────────

/// Rebuild the document selected by `selector`.
pub fn reconstruct(
  conn: &mut Connection,
  registry: &CodeRegistry,
  components: &dyn ComponentSource,
  selector: &FilingSelector,
) -> Result<FilingDocument> {
  let tx = conn.transaction()?;
  let info = EventInfo::resolve(&tx, registry, selector)?;

  let business = corporation::get(&tx, &info.corp_num)?
    .ok_or_else(|| CoreError::EntityNotFound(identifier_from_corp_num(&info.corp_num)))?;
  let filing_type = registry
    .filing_type_for_code(info.code)
    .ok_or_else(|| CoreError::InvalidFilingType(info.code.to_string()))?;
  let sub_type = match selector {
    FilingSelector::Latest { sub_type: Some(sub_type), .. } => Some(*sub_type),
    _ => registry.sub_type_for_code(filing_type, info.code),
  };
  let wanted = if filing_type == FilingType::ChangeOfAddress {
    BTreeSet::from([Component::LegalType, Component::Offices])
  } else {
    components.components_for(filing_type)?
  };

  let document = Reconstructor {
    conn: &tx,
    registry,
    effective_date: info.effective,
    body: FilingBody { event_id: Some(info.event_id), ..Default::default() },
    info,
    business,
    filing_type,
    sub_type,
    paper_only: false,
  }
  .build(&wanted)?;

  tx.commit()?;
  Ok(document)
}

struct Reconstructor<'a> {
  conn:           &'a Connection,
  registry:       &'a CodeRegistry,
  info:           EventInfo,
  business:       Business,
  filing_type:    FilingType,
  sub_type:       Option<SubType>,
  paper_only:     bool,
  effective_date: DateTime<Utc>,
  body:           FilingBody,
}

impl Reconstructor<'_> {
  fn event_id(&self) -> EventId { self.info.event_id }

  fn corp_num(&self) -> &str { &self.info.corp_num }

  fn is_annual_report(&self) -> bool { self.filing_type == FilingType::AnnualReport }

  fn build(mut self, wanted: &BTreeSet<Component>) -> Result<FilingDocument> {
    if wanted.contains(&Component::AnnualReportDate) {
      self.body.annual_report_date = self.info.period_end;
      if let Some(period_end) = self.info.period_end {
        self.effective_date = date_to_dt(period_end);
      }
    }
    if wanted.contains(&Component::AnnualGeneralMeetingDate) {
      self.body.annual_general_meeting_date = self.info.agm_date;
    }
    if wanted.contains(&Component::Offices) {
      self.offices()?;
    }
    if wanted.contains(&Component::CustodialOffice) {
      self.custodial_office()?;
    }
    if wanted.contains(&Component::Directors) {
      self.directors()?;
    }
    if wanted.contains(&Component::Parties) {
      self.parties()?;
    }
    if wanted.contains(&Component::ShareStructure) {
      self.share_structure()?;
    }
    if wanted.contains(&Component::NameTranslations) {
      self.name_translations()?;
    }
    if wanted.contains(&Component::NameRequest) || wanted.contains(&Component::LegalName) {
      self.legal_name(wanted.contains(&Component::NameRequest))?;
    }
    if wanted.contains(&Component::Business) && self.filing_type != FilingType::ContinuationIn {
      self.business_ref()?;
    }
    if wanted.contains(&Component::ProvisionsRemoved) {
      let removed = RestrictionStore::touching(self.conn, self.corp_num(), self.event_id())?
        .iter()
        .any(|r| r.span.ended_at(self.event_id()) && r.restricted);
      self.body.provisions_removed = Some(removed);
    }
    if wanted.contains(&Component::HasProvisions) {
      let has = RestrictionStore::as_of(self.conn, self.corp_num(), self.event_id())?
        .iter()
        .any(|r| r.restricted);
      self.body.has_provisions = Some(has);
    }
    if wanted.contains(&Component::Resolution) {
      let notation = self.last_notation()?.ok_or_else(|| CoreError::FilingNotFound {
        identifier:  self.business.identifier.clone(),
        filing_type: self.info.code.to_string(),
      })?;
      self.body.resolution = Some(notation);
      self.body.meeting_date = Some(self.effective_date.date_naive());
      self.paper_only = true;
    }
    if wanted.contains(&Component::DissolutionType) {
      self.body.dissolution_type = self.sub_type;
    }
    if wanted.contains(&Component::DissolutionDate) {
      self.body.dissolution_date = Some(self.effective_date.date_naive());
      self.paper_only = true;
    }
    if wanted.contains(&Component::ContactPoint) {
      self.body.contact_point =
        Some(ContactPoint { email: Some(self.info.email.clone()), phone: None });
    }
    if wanted.contains(&Component::LegalType) {
      self.body.legal_type = Some(self.business.entity_type);
    }
    if wanted.contains(&Component::CourtOrder) {
      if let Some(file_number) = &self.info.court_order_num {
        self.body.court_order = Some(CourtOrder {
          file_number:     Some(file_number.clone()),
          effect_of_order: Some(if self.info.arrangement {
            CourtOrder::PLAN_OF_ARRANGEMENT.into()
          } else {
            String::new()
          }),
        });
      }
    }
    if wanted.contains(&Component::ForeignJurisdiction) {
      self.body.foreign_jurisdiction =
        JurisdictionStore::as_of(self.conn, self.corp_num(), self.event_id())?
          .into_iter()
          .next()
          .map(|r| r.foreign_jurisdiction);
    }
    if wanted.contains(&Component::AmalgamatingBusinesses) {
      let involved =
        AmalgamatingStore::started_at(self.conn, self.corp_num(), self.event_id())?;
      if !involved.is_empty() {
        self.body.amalgamating_businesses =
          Some(involved.into_iter().map(|r| r.business).collect());
      }
      self.body.amalgamation_type = self.sub_type;
    }
    if wanted.contains(&Component::OrderDetails) {
      self.body.order_details = self.last_notation()?;
    }

    if self.filing_type == FilingType::IncorporationApplication
      && self.business.entity_type == EntityType::Coop
    {
      self.paper_only = true;
    }

    let header = DocumentHeader {
      available_on_paper_only: self.paper_only,
      in_colin_only:           Some(false),
      certified_by:            Some(self.info.certified_by.clone()),
      colin_ids:               vec![self.event_id()],
      date:                    self.info.timestamp.date_naive(),
      effective_date:          self.effective_date,
      email:                   (!self.info.email.is_empty()).then(|| self.info.email.clone()),
      name:                    self.filing_type,
      source:                  Some(DocumentSource::Colin),
      historic:                None,
    };
    Ok(FilingDocument { header, business: self.business, body: self.body })
  }

  // ── Annual report component events ──────────────────────────────────────

  /// The latest filing of `component_type` at or before this annual report.
  fn ar_component_event(&self, component_type: FilingType) -> Result<Option<EventId>> {
    let codes = self.registry.codes_for(component_type);
    if codes.is_empty() {
      return Ok(None);
    }
    let placeholders = (3..codes.len() + 3).map(|i| format!("?{i}")).collect::<Vec<_>>();
    let sql = format!(
      "SELECT event.event_id FROM event
       JOIN filing ON filing.event_id = event.event_id
       WHERE event.corp_num = ?1 AND event_timestmp <= ?2
         AND filing_typ_cd IN ({})
       ORDER BY event_timestmp DESC, event.event_id DESC
       LIMIT 1",
      placeholders.join(", ")
    );
    let params = [self.corp_num().to_string(), encode_dt(self.info.timestamp)]
      .into_iter()
      .chain(codes.iter().map(|c| c.as_str().to_string()));
    Ok(
      self
        .conn
        .query_row(&sql, params_from_iter(params), |row| row.get(0))
        .optional()?,
    )
  }

  // ── Offices ─────────────────────────────────────────────────────────────

  fn offices(&mut self) -> Result<()> {
    let event_id = if self.is_annual_report() {
      self.ar_component_event(FilingType::ChangeOfAddress)?
    } else {
      Some(self.event_id())
    };
    let mut records = match event_id {
      Some(event_id) => OfficeStore::as_of(self.conn, self.corp_num(), event_id)?,
      None => Vec::new(),
    };

    if records.is_empty() {
      if !self.is_annual_report() {
        return Err(CoreError::OfficeNotFound(self.business.identifier.clone()).into());
      }
      self.paper_only = true;
      records = OfficeStore::current(self.conn, self.corp_num())?;
    }
    self.body.offices = Some(OfficeStore::to_map(records));
    Ok(())
  }

  fn custodial_office(&mut self) -> Result<()> {
    self.body.custodial_office = OfficeStore::as_of(self.conn, self.corp_num(), self.event_id())?
      .into_iter()
      .find(|r| r.office_type == OfficeType::CustodialOffice)
      .map(|r| r.addresses);
    self.paper_only = true;
    Ok(())
  }

  // ── Directors & parties ─────────────────────────────────────────────────

  fn directors(&mut self) -> Result<()> {
    if self.is_annual_report() {
      let event_id = self.ar_component_event(FilingType::ChangeOfDirectors)?;
      let mut records = match event_id {
        Some(event_id) => {
          PartyStore::as_of_in_role(self.conn, self.corp_num(), event_id, RoleType::Director)?
        }
        None => Vec::new(),
      };
      if records.is_empty() {
        self.paper_only = true;
        records = PartyStore::current_in_role(self.conn, self.corp_num(), RoleType::Director)?;
      }
      self.body.directors = Some(records.into_iter().map(plain_director).collect());
      return Ok(());
    }

    let records =
      PartyStore::around_event(self.conn, self.corp_num(), self.event_id(), RoleType::Director)?;
    let entries = director_entries(records, self.event_id());
    if entries.is_empty() {
      return Err(CoreError::PartiesNotFound(self.business.identifier.clone()).into());
    }
    self.body.directors = Some(entries);
    Ok(())
  }

  fn parties(&mut self) -> Result<()> {
    let records = if self.filing_type == FilingType::Dissolution
      && self.sub_type == Some(SubType::Voluntary)
    {
      PartyStore::as_of_in_role(self.conn, self.corp_num(), self.event_id(), RoleType::Custodian)?
    } else {
      PartyStore::as_of(self.conn, self.corp_num(), self.event_id())?
    };

    let mut entries: Vec<PartyEntry> = Vec::new();
    for record in records {
      let role = Role {
        role_type:        record.role,
        appointment_date: record.appointment_date,
        cessation_date:   record.cessation_date,
      };
      let existing = entries.iter_mut().find(|e| {
        e.officer == record.officer
          && e.delivery_address == record.delivery_address
          && e.mailing_address == record.mailing_address
      });
      match existing {
        Some(entry) => entry.roles.push(role),
        None => entries.push(PartyEntry {
          officer:          record.officer,
          delivery_address: record.delivery_address,
          mailing_address:  record.mailing_address,
          roles:            vec![role],
        }),
      }
    }

    if entries.is_empty() {
      return Err(CoreError::PartiesNotFound(self.business.identifier.clone()).into());
    }
    self.body.parties = Some(entries);
    Ok(())
  }

  // ── Shares & names ──────────────────────────────────────────────────────

  fn share_structure(&mut self) -> Result<()> {
    let classes = ShareStore::as_of(self.conn, self.corp_num(), self.event_id())?
      .into_iter()
      .next()
      .map(|s| s.share_classes);
    let resolution_dates = ShareStore::resolutions_at(self.conn, self.corp_num(), self.event_id())?;
    if classes.is_none() && resolution_dates.is_empty() {
      return Ok(());
    }
    self.body.share_structure = Some(ShareStructure {
      resolution_dates,
      share_classes: classes.unwrap_or_default(),
    });
    Ok(())
  }

  fn name_translations(&mut self) -> Result<()> {
    let event_id = self.event_id();
    let translations: Vec<NameTranslation> =
      NameStore::touching(self.conn, self.corp_num(), event_id)?
        .into_iter()
        .filter(|n| !n.name_type.is_legal())
        .map(|n| NameTranslation {
          new:    n.span.started_at(event_id),
          ceased: n.span.ended_at(event_id),
          name:   n.name,
        })
        .collect();
    if !translations.is_empty() {
      self.body.name_translations = Some(translations);
    }
    Ok(())
  }

  fn legal_name(&mut self, as_name_request: bool) -> Result<()> {
    let event_id = self.event_id();
    let Some(name) = NameStore::touching(self.conn, self.corp_num(), event_id)?
      .into_iter()
      .find(|n| n.name_type.is_legal() && n.span.started_at(event_id))
    else {
      return Ok(());
    };
    if as_name_request {
      self.body.name_request = Some(NameRequest {
        legal_name: Some(name.name),
        legal_type: Some(self.business.entity_type),
        nr_number:  None,
      });
    } else {
      self.body.legal_name = Some(name.name);
    }
    Ok(())
  }

  // ── Business ────────────────────────────────────────────────────────────

  fn business_ref(&mut self) -> Result<()> {
    let legal_type = match self.info.code {
      TypeCode::NOALR => EntityType::BcCompany,
      TypeCode::NOALE => EntityType::BenefitCompany,
      TypeCode::NOALA => self
        .corp_type_before_event()?
        .ok_or(CoreError::UnableToDetermineCorpType(self.filing_type))?,
      other => return Err(CoreError::InvalidFilingType(other.to_string()).into()),
    };
    self.body.business = Some(BusinessRef {
      identifier: Some(format!("BC{}", self.corp_num())),
      legal_type: Some(legal_type),
    });
    Ok(())
  }

  /// The entity type implied by the most recent type-implying filing
  /// before this one.
  fn corp_type_before_event(&self) -> Result<Option<EntityType>> {
    let codes = TypeCode::type_implying();
    let placeholders = (3..codes.len() + 3).map(|i| format!("?{i}")).collect::<Vec<_>>();
    let sql = format!(
      "SELECT filing_typ_cd FROM event
       JOIN filing ON filing.event_id = event.event_id
       WHERE event.corp_num = ?1 AND event_timestmp < ?2
         AND filing_typ_cd IN ({})
       ORDER BY event_timestmp DESC, event.event_id DESC
       LIMIT 1",
      placeholders.join(", ")
    );
    let params = [self.corp_num().to_string(), encode_dt(self.info.timestamp)]
      .into_iter()
      .chain(codes.iter().map(|c| c.as_str().to_string()));
    let code: Option<String> = self
      .conn
      .query_row(&sql, params_from_iter(params), |row| row.get(0))
      .optional()?;
    Ok(match code {
      Some(code) => {
        self.registry.corp_type_implied_by_code(decode_code("filing", &code)?)
      }
      None => None,
    })
  }

  fn last_notation(&self) -> Result<Option<String>> {
    Ok(
      self
        .conn
        .query_row(
          "SELECT notation FROM ledger_text WHERE event_id = ?1
           ORDER BY ledger_text_id DESC LIMIT 1",
          params![self.event_id()],
          |row| row.get::<_, Option<String>>(0),
        )
        .optional()?
        .flatten(),
    )
  }
}

// ─── Director actions ────────────────────────────────────────────────────────

fn plain_director(record: PartyRecord) -> DirectorEntry {
  DirectorEntry {
    officer:          record.officer,
    delivery_address: record.delivery_address,
    mailing_address:  record.mailing_address,
    appointment_date: record.appointment_date,
    cessation_date:   record.cessation_date,
    actions:          Vec::new(),
  }
}

/// Director entries for the change recorded at `event_id`.
///
/// A row started at the event either replaces the row it names as previous
/// (a name or address change) or is an appointment. A row ended at the event
/// that nothing replaced is a cessation. Replaced rows are folded into their
/// replacement.
fn director_entries(records: Vec<PartyRecord>, event_id: EventId) -> Vec<DirectorEntry> {
  let by_id: HashMap<PartyId, PartyRecord> =
    records.iter().map(|r| (r.party_id, r.clone())).collect();
  let replaced: HashSet<PartyId> = records
    .iter()
    .filter(|r| r.span.started_at(event_id))
    .filter_map(|r| r.prev_party_id)
    .filter(|id| by_id.get(id).is_some_and(|p| p.span.ended_at(event_id)))
    .collect();

  records
    .into_iter()
    .filter(|r| !replaced.contains(&r.party_id))
    .map(|record| {
      let mut actions = Vec::new();
      let mut officer = record.officer.clone();

      if record.span.started_at(event_id) {
        let previous = record
          .prev_party_id
          .filter(|id| replaced.contains(id))
          .and_then(|id| by_id.get(&id));
        match previous {
          Some(prev) => {
            let renamed = prev.officer.first_name != record.officer.first_name
              || prev.officer.middle_initial != record.officer.middle_initial
              || prev.officer.last_name != record.officer.last_name
              || prev.officer.org_name != record.officer.org_name;
            if renamed {
              actions.push(DirectorAction::NameChanged);
              officer.prev_first_name = prev.officer.first_name.clone();
              officer.prev_middle_initial = prev.officer.middle_initial.clone();
              officer.prev_last_name = prev.officer.last_name.clone();
              officer.prev_org_name = prev.officer.org_name.clone();
            }
            if prev.delivery_address != record.delivery_address
              || prev.mailing_address != record.mailing_address
            {
              actions.push(DirectorAction::AddressChanged);
            }
          }
          None => actions.push(DirectorAction::Appointed),
        }
      }
      if record.span.ended_at(event_id) {
        actions.push(DirectorAction::Ceased);
      }

      DirectorEntry { officer, actions, ..plain_director(record) }
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use filings_core::{filing::Officer, temporal::TemporalSpan};

  use super::*;

  fn record(
    party_id: PartyId,
    last: &str,
    start: EventId,
    end: Option<EventId>,
    prev: Option<PartyId>,
  ) -> PartyRecord {
    PartyRecord {
      party_id,
      role: RoleType::Director,
      span: TemporalSpan { start_event_id: start, end_event_id: end },
      prev_party_id: prev,
      officer: Officer { last_name: Some(last.into()), ..Default::default() },
      delivery_address: None,
      mailing_address: None,
      appointment_date: None,
      cessation_date: None,
    }
  }

  #[test]
  fn actions_are_derived_from_spans() {
    let e = 10;
    let entries = director_entries(
      vec![
        record(1, "Unchanged", 1, None, None),
        record(2, "Lovelace", 1, Some(e), None),
        record(3, "King", e, None, Some(2)),
        record(4, "Turing", 1, Some(e), None),
        record(5, "Hopper", e, None, None),
      ],
      e,
    );

    let actions: Vec<_> = entries
      .iter()
      .map(|d| (d.officer.last_name.clone().unwrap(), d.actions.clone()))
      .collect();
    assert_eq!(actions, vec![
      ("Unchanged".to_string(), vec![]),
      ("King".to_string(), vec![DirectorAction::NameChanged]),
      ("Turing".to_string(), vec![DirectorAction::Ceased]),
      ("Hopper".to_string(), vec![DirectorAction::Appointed]),
    ]);
    assert_eq!(entries[1].officer.prev_last_name.as_deref(), Some("Lovelace"));
  }
}

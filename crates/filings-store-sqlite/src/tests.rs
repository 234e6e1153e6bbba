//! Integration tests for `SqliteLedger` against an in-memory database.

use chrono::{NaiveDate, TimeZone as _, Utc};
use filings_core::{
  Error as CoreError,
  codes::FilingType,
  entity::{CorpState, EntityType, NewBusiness},
  filing::{Filing, FilingSelector, NameTranslation, OfficeType, RoleType},
  ledger::{DissolutionMetadata, FilingLedger},
  temporal::EventId,
};
use serde_json::{Value, json};

use crate::{Error, SqliteLedger, encode::encode_dt};

async fn ledger() -> SqliteLedger {
  SqliteLedger::open_in_memory()
    .await
    .expect("in-memory ledger")
}

async fn register(ledger: &SqliteLedger, identifier: &str, entity_type: EntityType) {
  ledger
    .register_business(NewBusiness {
      identifier: identifier.into(),
      entity_type,
      founding_date: Utc.with_ymd_and_hms(2015, 4, 20, 9, 0, 0).unwrap(),
    })
    .await
    .expect("register business");
}

fn filing(value: Value) -> Filing { serde_json::from_value(value).expect("filing json") }

fn offices(street: &str) -> Value {
  json!({
    "registeredOffice": {
      "deliveryAddress": { "streetAddress": street, "addressCity": "Victoria", "addressCountry": "CA" },
      "mailingAddress": { "streetAddress": street, "addressCity": "Victoria", "addressCountry": "CA" }
    }
  })
}

fn change_of_address(identifier: &str, street: &str) -> Filing {
  filing(json!({
    "identifier": identifier,
    "filingType": "changeOfAddress",
    "effectiveDate": "2025-06-01T12:00:00Z",
    "header": { "certifiedBy": "Jane Doe", "email": "jane@example.com" },
    "body": { "offices": offices(street) }
  }))
}

fn incorporation(identifier: &str) -> Filing {
  filing(json!({
    "identifier": identifier,
    "filingType": "incorporationApplication",
    "effectiveDate": "2025-03-01T17:00:00Z",
    "header": { "certifiedBy": "Ada Lovelace" },
    "body": {
      "nameRequest": { "legalName": "ACME WIDGETS LTD.", "legalType": "BC" },
      "nameTranslations": [{ "name": "Alpha" }, { "name": "Beta" }],
      "offices": {
        "registeredOffice": {
          "deliveryAddress": { "streetAddress": "1 Main St", "addressCity": "Victoria" }
        },
        "recordsOffice": {
          "deliveryAddress": { "streetAddress": "2 Side St", "addressCity": "Victoria" }
        }
      },
      "parties": [{
        "officer": { "firstName": "Ada", "lastName": "Lovelace", "partyType": "person" },
        "deliveryAddress": { "streetAddress": "3 Home Rd", "addressCity": "Victoria" },
        "roles": [
          { "roleType": "Director", "appointmentDate": "2025-03-01" },
          { "roleType": "Incorporator", "appointmentDate": "2025-03-01" }
        ]
      }],
      "shareStructure": {
        "shareClasses": [{
          "name": "Common Shares",
          "priority": 1,
          "hasMaximumShares": true,
          "maxNumberOfShares": 1000,
          "hasParValue": false,
          "hasRightsOrRestrictions": false
        }]
      },
      "contactPoint": { "email": "ada@example.com" }
    }
  }))
}

/// Pin an event's timestamp so ordering does not depend on wall-clock time.
async fn set_timestamp(ledger: &SqliteLedger, event_id: EventId, ts: chrono::DateTime<Utc>) {
  ledger
    .call(move |conn| {
      conn.execute(
        "UPDATE event SET event_timestmp = ?2 WHERE event_id = ?1",
        rusqlite::params![event_id, encode_dt(ts)],
      )?;
      Ok(())
    })
    .await
    .unwrap();
}

/// Run a single-value query against the ledger's connection.
async fn query_i64(ledger: &SqliteLedger, sql: &'static str, corp_num: &'static str) -> i64 {
  ledger
    .call(move |conn| Ok(conn.query_row(sql, rusqlite::params![corp_num], |row| row.get(0))?))
    .await
    .unwrap()
}

/// `(start_event_id, end_event_id)` of every registered-office row, oldest
/// first.
async fn registered_office_spans(ledger: &SqliteLedger) -> Vec<(EventId, Option<EventId>)> {
  ledger
    .call(|conn| {
      let mut stmt = conn.prepare(
        "SELECT start_event_id, end_event_id FROM office
         WHERE office_typ_cd = 'RG' ORDER BY office_id",
      )?;
      let spans = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
      Ok(spans)
    })
    .await
    .unwrap()
}

fn core_error(err: &Error) -> Option<&CoreError> {
  match err {
    Error::Core(e) => Some(e),
    _ => None,
  }
}

// ─── Businesses ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_and_get_business() {
  let l = ledger().await;
  register(&l, "BC0870123", EntityType::BcCompany).await;

  let business = l.get_business("BC0870123".into()).await.unwrap().unwrap();
  assert_eq!(business.corp_num, "0870123");
  assert_eq!(business.identifier, "BC0870123");
  assert_eq!(business.entity_type, EntityType::BcCompany);
  assert_eq!(business.legal_name, None);

  assert!(l.get_business("BC9999999".into()).await.unwrap().is_none());
}

// ─── Submission ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn simple_address_change() {
  let l = ledger().await;
  register(&l, "BC0870123", EntityType::BcCompany).await;

  let first = l.submit(change_of_address("BC0870123", "1 Main St")).await.unwrap();
  let second = l.submit(change_of_address("BC0870123", "9 New St")).await.unwrap();
  assert!(second > first);

  // O1 is tombstoned by the second event, which also starts O2.
  assert_eq!(registered_office_spans(&l).await, vec![
    (first, Some(second)),
    (second, None),
  ]);

  let doc = l.reconstruct(FilingSelector::Event(first)).await.unwrap();
  assert_eq!(doc.header.name, FilingType::ChangeOfAddress);
  assert_eq!(doc.header.colin_ids, vec![first]);
  assert_eq!(doc.header.certified_by.as_deref(), Some("Jane Doe"));
  assert_eq!(doc.header.email.as_deref(), Some("jane@example.com"));
  assert!(!doc.header.available_on_paper_only);
  assert_eq!(doc.body.legal_type, Some(EntityType::BcCompany));

  let offices = doc.body.offices.unwrap();
  assert_eq!(offices.len(), 1);
  let registered = &offices[&OfficeType::RegisteredOffice];
  assert_eq!(
    registered.delivery_address.as_ref().unwrap().street_address.as_deref(),
    Some("1 Main St")
  );

  let latest = l
    .reconstruct(FilingSelector::Latest {
      identifier:  "BC0870123".into(),
      filing_type: FilingType::ChangeOfAddress,
      sub_type:    None,
      year:        None,
    })
    .await
    .unwrap();
  assert_eq!(latest.event_id(), Some(second));
  let registered = &latest.body.offices.unwrap()[&OfficeType::RegisteredOffice];
  assert_eq!(
    registered.mailing_address.as_ref().unwrap().street_address.as_deref(),
    Some("9 New St")
  );
}

#[tokio::test]
async fn cooperatives_draw_from_their_own_event_range() {
  let l = ledger().await;
  register(&l, "CP0001234", EntityType::Coop).await;
  register(&l, "BC0870123", EntityType::BcCompany).await;

  let coop = l.submit(change_of_address("CP0001234", "1 Co-op Way")).await.unwrap();
  let company = l.submit(change_of_address("BC0870123", "1 Main St")).await.unwrap();
  let company_again = l.submit(change_of_address("BC0870123", "2 Main St")).await.unwrap();

  assert!(coop < 100_000_000);
  assert_eq!(company, 100_000_000);
  assert_eq!(company_again, company + 1);
}

#[tokio::test]
async fn incorporation_round_trip() {
  let l = ledger().await;
  register(&l, "BC0870123", EntityType::BcCompany).await;

  let event_id = l.submit(incorporation("BC0870123")).await.unwrap();
  let business = l.get_business("BC0870123".into()).await.unwrap().unwrap();
  assert_eq!(business.legal_name.as_deref(), Some("ACME WIDGETS LTD."));
  assert_eq!(business.state, Some(CorpState::Active));

  let doc = l.reconstruct(FilingSelector::Event(event_id)).await.unwrap();
  assert_eq!(doc.header.name, FilingType::IncorporationApplication);
  assert!(!doc.header.available_on_paper_only);

  let name_request = doc.body.name_request.unwrap();
  assert_eq!(name_request.legal_name.as_deref(), Some("ACME WIDGETS LTD."));
  assert_eq!(name_request.legal_type, Some(EntityType::BcCompany));

  let translations = doc.body.name_translations.unwrap();
  assert_eq!(translations.len(), 2);
  assert!(translations.iter().all(|t| t.new && !t.ceased));

  let offices = doc.body.offices.unwrap();
  assert!(offices.contains_key(&OfficeType::RegisteredOffice));
  assert!(offices.contains_key(&OfficeType::RecordsOffice));

  let parties = doc.body.parties.unwrap();
  assert_eq!(parties.len(), 1);
  let roles: Vec<RoleType> = parties[0].roles.iter().map(|r| r.role_type).collect();
  assert_eq!(roles, vec![RoleType::Director, RoleType::Incorporator]);

  let shares = doc.body.share_structure.unwrap();
  assert_eq!(shares.share_classes.len(), 1);
  assert_eq!(shares.share_classes[0].name, "Common Shares");
  assert_eq!(shares.share_classes[0].max_number_of_shares, Some(1000));

  assert_eq!(
    doc.body.contact_point.and_then(|c| c.email).as_deref(),
    Some("ada@example.com")
  );
  assert!(doc.body.court_order.is_none());
}

#[tokio::test]
async fn translation_diff_touches_only_changed_names() {
  let l = ledger().await;
  register(&l, "BC0870123", EntityType::BcCompany).await;
  l.submit(incorporation("BC0870123")).await.unwrap();

  let alteration = l
    .submit(filing(json!({
      "identifier": "BC0870123",
      "filingType": "alteration",
      "effectiveDate": "2025-07-01T12:00:00Z",
      "header": { "certifiedBy": "Ada Lovelace" },
      "body": { "nameTranslations": [{ "name": "Alpha" }, { "name": "Gamma" }] }
    })))
    .await
    .unwrap();

  let doc = l.reconstruct(FilingSelector::Event(alteration)).await.unwrap();
  let mut translations = doc.body.name_translations.unwrap();
  translations.sort_by(|a, b| a.name.cmp(&b.name));
  assert_eq!(translations, vec![
    NameTranslation { name: "Beta".into(), new: false, ceased: true },
    NameTranslation { name: "Gamma".into(), new: true, ceased: false },
  ]);

  // The incorporation implies the entity type for the alteration.
  let business = doc.body.business.unwrap();
  assert_eq!(business.identifier.as_deref(), Some("BC0870123"));
  assert_eq!(business.legal_type, Some(EntityType::BcCompany));
  assert_eq!(doc.body.provisions_removed, Some(false));
}

#[tokio::test]
async fn director_failure_rolls_back_everything() {
  let l = ledger().await;
  register(&l, "BC0870123", EntityType::BcCompany).await;
  let incorporated = l.submit(incorporation("BC0870123")).await.unwrap();

  let count_events = "SELECT count(*) FROM event WHERE corp_num = ?1";
  let count_filings = "SELECT count(*) FROM filing JOIN event USING (event_id)
                       WHERE corp_num = ?1";
  let events_before = query_i64(&l, count_events, "0870123").await;
  let filings_before = query_i64(&l, count_filings, "0870123").await;

  let err = l
    .submit(filing(json!({
      "identifier": "BC0870123",
      "filingType": "changeOfDirectors",
      "effectiveDate": "2025-06-01T12:00:00Z",
      "header": { "certifiedBy": "Jane Doe" },
      "body": {
        "directors": [
          {
            "officer": { "firstName": "Grace", "lastName": "Hopper" },
            "actions": ["appointed"]
          },
          {
            "officer": {
              "firstName": "Alan", "lastName": "Turing",
              "prevFirstName": "Nobody", "prevLastName": "Known"
            },
            "actions": ["nameChanged"]
          }
        ]
      }
    })))
    .await
    .unwrap_err();
  assert!(matches!(core_error(&err), Some(CoreError::DirectorNotFound(_))));
  assert_eq!(err.status_code(), 404);

  // The existing director is still current.
  let current_lovelace = query_i64(
    &l,
    "SELECT count(*) FROM corp_party
     WHERE corp_num = ?1 AND party_typ_cd = 'DIR' AND last_nme = 'Lovelace'
       AND start_event_id = (SELECT min(event_id) FROM event WHERE corp_num = ?1)
       AND end_event_id IS NULL",
    "0870123",
  )
  .await;
  assert_eq!(current_lovelace, 1);

  // Nothing from the failed filing survived.
  let hopper = query_i64(
    &l,
    "SELECT count(*) FROM corp_party WHERE corp_num = ?1 AND last_nme = 'Hopper'",
    "0870123",
  )
  .await;
  assert_eq!(hopper, 0);
  assert_eq!(query_i64(&l, count_events, "0870123").await, events_before);
  assert_eq!(query_i64(&l, count_filings, "0870123").await, filings_before);

  let missing = l
    .reconstruct(FilingSelector::Latest {
      identifier:  "BC0870123".into(),
      filing_type: FilingType::ChangeOfDirectors,
      sub_type:    None,
      year:        None,
    })
    .await
    .unwrap_err();
  assert!(matches!(core_error(&missing), Some(CoreError::FilingNotFound { .. })));

  // The event id allocated by the failed submission was rolled back too.
  let next = l.submit(change_of_address("BC0870123", "1 Main St")).await.unwrap();
  assert_eq!(next, incorporated + 1);
}

#[tokio::test]
async fn director_changes_reconstruct_with_actions() {
  let l = ledger().await;
  register(&l, "BC0870123", EntityType::BcCompany).await;
  l.submit(incorporation("BC0870123")).await.unwrap();

  let change = l
    .submit(filing(json!({
      "identifier": "BC0870123",
      "filingType": "changeOfDirectors",
      "effectiveDate": "2025-08-01T12:00:00Z",
      "header": { "certifiedBy": "Ada King" },
      "body": {
        "directors": [
          {
            "officer": {
              "firstName": "Ada", "lastName": "King",
              "prevFirstName": "Ada", "prevLastName": "Lovelace"
            },
            "deliveryAddress": { "streetAddress": "3 Home Rd", "addressCity": "Victoria" },
            "actions": ["nameChanged"]
          },
          {
            "officer": { "firstName": "Grace", "lastName": "Hopper" },
            "appointmentDate": "2025-08-01",
            "actions": ["appointed"]
          }
        ]
      }
    })))
    .await
    .unwrap();

  let doc = l.reconstruct(FilingSelector::Event(change)).await.unwrap();
  let directors = doc.body.directors.unwrap();
  assert_eq!(directors.len(), 2);

  let king = directors
    .iter()
    .find(|d| d.officer.last_name.as_deref() == Some("King"))
    .unwrap();
  assert_eq!(king.actions, vec![filings_core::filing::DirectorAction::NameChanged]);
  assert_eq!(king.officer.prev_last_name.as_deref(), Some("Lovelace"));

  let hopper = directors
    .iter()
    .find(|d| d.officer.last_name.as_deref() == Some("Hopper"))
    .unwrap();
  assert_eq!(hopper.actions, vec![filings_core::filing::DirectorAction::Appointed]);
}

#[tokio::test]
async fn annual_report_uses_the_address_change_before_it() {
  let l = ledger().await;
  register(&l, "BC0870123", EntityType::BcCompany).await;

  let before = l.submit(change_of_address("BC0870123", "1 Before St")).await.unwrap();
  let report = l
    .submit(filing(json!({
      "identifier": "BC0870123",
      "filingType": "annualReport",
      "effectiveDate": "2025-10-01T12:00:00Z",
      "header": { "certifiedBy": "Jane Doe" },
      "body": { "annualReportDate": "2025-09-30" }
    })))
    .await
    .unwrap();
  let after = l.submit(change_of_address("BC0870123", "2 After St")).await.unwrap();

  set_timestamp(&l, before, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()).await;
  set_timestamp(&l, report, Utc.with_ymd_and_hms(2025, 10, 1, 0, 0, 0).unwrap()).await;
  set_timestamp(&l, after, Utc.with_ymd_and_hms(2025, 11, 1, 0, 0, 0).unwrap()).await;

  let doc = l
    .reconstruct(FilingSelector::Latest {
      identifier:  "BC0870123".into(),
      filing_type: FilingType::AnnualReport,
      sub_type:    None,
      year:        Some(2025),
    })
    .await
    .unwrap();
  assert_eq!(doc.event_id(), Some(report));
  assert_eq!(doc.body.annual_report_date, NaiveDate::from_ymd_opt(2025, 9, 30));
  assert_eq!(doc.header.effective_date, Utc.with_ymd_and_hms(2025, 9, 30, 0, 0, 0).unwrap());

  let registered = &doc.body.offices.unwrap()[&OfficeType::RegisteredOffice];
  assert_eq!(
    registered.delivery_address.as_ref().unwrap().street_address.as_deref(),
    Some("1 Before St")
  );
  // No director change was ever filed, so directors fall back to paper.
  assert!(doc.header.available_on_paper_only);

  let business = l.get_business("BC0870123".into()).await.unwrap().unwrap();
  assert_eq!(business.state, Some(CorpState::Active));
  assert!(business.last_ar_filed_date.is_some());
}

#[tokio::test]
async fn voluntary_dissolution_records_custodian() {
  let l = ledger().await;
  register(&l, "BC0870123", EntityType::BcCompany).await;

  let event_id = l
    .submit(filing(json!({
      "identifier": "BC0870123",
      "filingType": "dissolution",
      "subType": "voluntary",
      "effectiveDate": "2025-06-01T12:00:00Z",
      "header": { "certifiedBy": "Jane Doe" },
      "body": {
        "custodialOffice": {
          "deliveryAddress": { "streetAddress": "5 Keeper Ln", "addressCity": "Victoria" }
        },
        "parties": [{
          "officer": { "orgName": "Records Keepers Inc.", "partyType": "organization" },
          "roles": [{ "roleType": "Custodian" }]
        }]
      }
    })))
    .await
    .unwrap();

  let business = l.get_business("BC0870123".into()).await.unwrap().unwrap();
  assert_eq!(business.state, Some(CorpState::VoluntaryDissolution));

  let doc = l.reconstruct(FilingSelector::Event(event_id)).await.unwrap();
  assert!(doc.header.available_on_paper_only);
  assert_eq!(doc.body.dissolution_type, Some(filings_core::codes::SubType::Voluntary));
  assert!(doc.body.dissolution_date.is_some());
  assert!(doc.body.custodial_office.is_some());
  let parties = doc.body.parties.unwrap();
  assert_eq!(parties.len(), 1);
  assert_eq!(parties[0].roles[0].role_type, RoleType::Custodian);
}

// ─── Rejections ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn unknown_business_is_not_found() {
  let l = ledger().await;
  let err = l.submit(change_of_address("BC0000001", "1 Main St")).await.unwrap_err();
  assert!(matches!(core_error(&err), Some(CoreError::EntityNotFound(_))));
  assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn non_submittable_filing_type_is_rejected() {
  let l = ledger().await;
  register(&l, "BC0870123", EntityType::BcCompany).await;

  let err = l
    .submit(filing(json!({
      "identifier": "BC0870123",
      "filingType": "conversion",
      "effectiveDate": "2025-06-01T12:00:00Z"
    })))
    .await
    .unwrap_err();
  assert_eq!(err.status_code(), 400);
  assert!(matches!(err, Error::Filing { .. }));
}

#[tokio::test]
async fn unsupported_sub_type_is_rejected() {
  let l = ledger().await;
  register(&l, "BC0870123", EntityType::BcCompany).await;

  let err = l
    .submit(filing(json!({
      "identifier": "BC0870123",
      "filingType": "alteration",
      "subType": "voluntary",
      "effectiveDate": "2025-06-01T12:00:00Z"
    })))
    .await
    .unwrap_err();
  assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn missing_annual_report_date_is_rejected() {
  let l = ledger().await;
  register(&l, "BC0870123", EntityType::BcCompany).await;

  let err = l
    .submit(filing(json!({
      "identifier": "BC0870123",
      "filingType": "annualReport",
      "effectiveDate": "2025-06-01T12:00:00Z"
    })))
    .await
    .unwrap_err();
  assert_eq!(err.status_code(), 400);
}

// ─── Listings & system events ────────────────────────────────────────────────

#[tokio::test]
async fn historic_filings_for_companies() {
  let l = ledger().await;
  register(&l, "BC0870123", EntityType::BcCompany).await;
  register(&l, "CP0001234", EntityType::Coop).await;
  l.submit(change_of_address("BC0870123", "1 Main St")).await.unwrap();
  l.submit(change_of_address("CP0001234", "1 Co-op Way")).await.unwrap();

  let company = l.historic_filings("BC0870123".into()).await.unwrap();
  assert_eq!(company.len(), 1);
  assert_eq!(company[0].header.historic, Some(true));
  assert!(company[0].header.available_on_paper_only);

  // Cooperative filings after the cutover are not historic.
  let coop = l.historic_filings("CP0001234".into()).await.unwrap();
  assert!(coop.is_empty());
}

#[tokio::test]
async fn historic_filings_carry_the_effective_date() {
  let l = ledger().await;
  register(&l, "BC0870123", EntityType::BcCompany).await;

  let mut later = change_of_address("BC0870123", "1 Main St");
  later.effective_date = Utc.with_ymd_and_hms(2030, 5, 5, 9, 30, 0).unwrap();
  let event_id = l.submit(later).await.unwrap();

  let historic = l.historic_filings("BC0870123".into()).await.unwrap();
  assert_eq!(historic.len(), 1);
  assert_eq!(historic[0].event_id(), Some(event_id));
  assert_eq!(
    historic[0].header.effective_date,
    Utc.with_ymd_and_hms(2030, 5, 5, 9, 30, 0).unwrap()
  );
  assert_ne!(historic[0].header.date, NaiveDate::from_ymd_opt(2030, 5, 5).unwrap());

  let doc = l.reconstruct(FilingSelector::Event(event_id)).await.unwrap();
  assert_eq!(doc.header.effective_date, Utc.with_ymd_and_hms(2030, 5, 5, 9, 30, 0).unwrap());
}

#[tokio::test]
async fn dissolution_sub_type_can_come_from_the_body() {
  let l = ledger().await;
  register(&l, "BC0870123", EntityType::BcCompany).await;

  let event_id = l
    .submit(filing(json!({
      "identifier": "BC0870123",
      "filingType": "dissolution",
      "effectiveDate": "2025-06-01T12:00:00Z",
      "header": { "certifiedBy": "Jane Doe" },
      "body": {
        "dissolutionType": "voluntary",
        "custodialOffice": {
          "deliveryAddress": { "streetAddress": "5 Keeper Ln", "addressCity": "Victoria" }
        },
        "parties": [{
          "officer": { "orgName": "Records Keepers Inc.", "partyType": "organization" },
          "roles": [{ "roleType": "Custodian" }]
        }]
      }
    })))
    .await
    .unwrap();

  let business = l.get_business("BC0870123".into()).await.unwrap().unwrap();
  assert_eq!(business.state, Some(CorpState::VoluntaryDissolution));
  let doc = l.reconstruct(FilingSelector::Event(event_id)).await.unwrap();
  assert_eq!(doc.body.dissolution_type, Some(filings_core::codes::SubType::Voluntary));
}

#[tokio::test]
async fn missing_required_section_is_rejected() {
  let l = ledger().await;
  register(&l, "BC0870123", EntityType::BcCompany).await;

  let err = l
    .submit(filing(json!({
      "identifier": "BC0870123",
      "filingType": "changeOfAddress",
      "effectiveDate": "2025-06-01T12:00:00Z",
      "header": { "certifiedBy": "Jane Doe" }
    })))
    .await
    .unwrap_err();
  let Error::Filing { source, .. } = &err else {
    panic!("expected filing context, got {err:?}");
  };
  assert!(matches!(
    core_error(source),
    Some(CoreError::MissingComponent { component: "offices", .. })
  ));
  assert_eq!(err.status_code(), 400);
  assert_eq!(query_i64(&l, "SELECT count(*) FROM event WHERE corp_num = ?1", "0870123").await, 0);
}

#[tokio::test]
async fn future_effective_filings_are_listed() {
  let l = ledger().await;
  register(&l, "BC0870123", EntityType::BcCompany).await;
  l.submit(change_of_address("BC0870123", "1 Main St")).await.unwrap();

  let mut future = change_of_address("BC0870123", "2 Later St");
  future.effective_date = Utc.with_ymd_and_hms(2099, 1, 1, 0, 0, 0).unwrap();
  let event_id = l.submit(future).await.unwrap();

  let listed = l.future_effective_filings("BC0870123".into()).await.unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(listed[0].event_id(), Some(event_id));
  assert_eq!(listed[0].header.effective_date.date_naive(), NaiveDate::from_ymd_opt(2099, 1, 1).unwrap());
}

#[tokio::test]
async fn dissolution_events_move_state() {
  let l = ledger().await;
  register(&l, "BC0870123", EntityType::BcCompany).await;
  register(&l, "BC0870124", EntityType::BcCompany).await;

  l.add_administrative_dissolution("BC0870123".into()).await.unwrap();
  let business = l.get_business("BC0870123".into()).await.unwrap().unwrap();
  assert_eq!(business.state, Some(CorpState::AdministrativeDissolution));

  let none = l
    .add_involuntary_dissolution("BC0870124".into(), DissolutionMetadata::default())
    .await
    .unwrap();
  assert!(none.is_none());

  let event_id = l
    .add_involuntary_dissolution("BC0870124".into(), DissolutionMetadata {
      overdue_ars:        true,
      overdue_transition: true,
    })
    .await
    .unwrap();
  assert!(event_id.is_some());
  let business = l.get_business("BC0870124".into()).await.unwrap().unwrap();
  assert_eq!(business.state, Some(CorpState::InvoluntaryDissolutionNoAr));

  let err = l.add_administrative_dissolution("BC0000001".into()).await.unwrap_err();
  assert!(err.is_not_found());
}

// ─── Properties ──────────────────────────────────────────────────────────────

mod current_uniqueness {
  use filings_core::{
    entity::NewBusiness,
    filing::{Address, OfficeAddresses, OfficeType},
    temporal::EventType,
  };
  use proptest::prelude::*;
  use rusqlite::Connection;

  use crate::{
    events,
    schema::SCHEMA,
    stores::{TemporalStore as _, corporation, office::OfficeStore},
  };

  fn office_type(i: u8) -> OfficeType {
    match i % 3 {
      0 => OfficeType::RegisteredOffice,
      1 => OfficeType::RecordsOffice,
      _ => OfficeType::CustodialOffice,
    }
  }

  proptest! {
    #[test]
    fn at_most_one_current_office_per_type(ops in prop::collection::vec((any::<u8>(), any::<bool>()), 1..40)) {
      let conn = Connection::open_in_memory().unwrap();
      conn.execute_batch(SCHEMA).unwrap();
      corporation::insert(&conn, "0870123", &NewBusiness {
        identifier:    "BC0870123".into(),
        entity_type:   filings_core::entity::EntityType::BcCompany,
        founding_date: chrono::Utc::now(),
      })
      .unwrap();

      let mut model = std::collections::BTreeMap::new();
      for (i, (ty, create)) in ops.into_iter().enumerate() {
        let event_id = events::allocate(&conn, "0870123", EventType::File).unwrap();
        let office_type = office_type(ty);
        if create {
          let addresses = OfficeAddresses {
            delivery_address: Some(Address {
              street_address: Some(format!("{i} Main St")),
              ..Default::default()
            }),
            mailing_address: None,
          };
          OfficeStore::replace(&conn, "0870123", event_id, office_type, &addresses).unwrap();
          model.insert(office_type, i);
        } else {
          OfficeStore::end(&conn, "0870123", event_id, &office_type).unwrap();
          model.remove(&office_type);
        }

        let current = OfficeStore::current(&conn, "0870123").unwrap();
        let mut types: Vec<_> = current.iter().map(|r| r.office_type).collect();
        types.sort();
        types.dedup();
        prop_assert_eq!(types.len(), current.len());
        prop_assert_eq!(current.len(), model.len());
      }
    }
  }
}

//! [`SqliteLedger`], the SQLite implementation of [`FilingLedger`].

use std::{path::Path, sync::Arc};

use chrono::Utc;
use filings_core::{
  Error as CoreError,
  codes::{CodeRegistry, FilingType},
  components::{BuiltinComponents, ComponentSource},
  document::{DocumentHeader, DocumentSource, FilingDocument},
  entity::{Business, CorpState, EntityType, NewBusiness, corp_num_from_identifier},
  filing::{Filing, FilingBody, FilingSelector},
  ledger::{DissolutionMetadata, FilingLedger, digitization_cutover},
  temporal::{EventId, EventType},
};
use rusqlite::TransactionBehavior;

use crate::{
  Error, Result, events,
  reconstruct::{self, EventInfo},
  schema::SCHEMA,
  stores::{corporation, state::StateStore},
  writer,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A filing ledger backed by a single SQLite file.
///
/// Cloning is cheap; the connection and collaborators are reference-counted.
#[derive(Clone)]
pub struct SqliteLedger {
  conn:       tokio_rusqlite::Connection,
  registry:   Arc<CodeRegistry>,
  components: Arc<dyn ComponentSource>,
}

impl SqliteLedger {
  /// Open (or create) a ledger at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::with_connection(conn).await
  }

  /// Open an in-memory ledger, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::with_connection(conn).await
  }

  async fn with_connection(conn: tokio_rusqlite::Connection) -> Result<Self> {
    let registry = CodeRegistry::standard().map_err(CoreError::from)?;
    let ledger = Self {
      conn,
      registry: Arc::new(registry),
      components: Arc::new(BuiltinComponents),
    };
    ledger.init_schema().await?;
    Ok(ledger)
  }

  /// Replace the component source used by reconstruction.
  pub fn with_components(mut self, components: impl ComponentSource + 'static) -> Self {
    self.components = Arc::new(components);
    self
  }

  pub fn registry(&self) -> &CodeRegistry { &self.registry }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `f` on the connection thread, carrying crate errors across.
  pub(crate) async fn call<T, F>(&self, f: F) -> Result<T>
  where
    F: FnOnce(&mut rusqlite::Connection) -> Result<T> + Send + 'static,
    T: Send + 'static,
  {
    self
      .conn
      .call(move |conn| f(conn).map_err(Error::into_call))
      .await
      .map_err(Error::from_call)
  }

  /// Look up a business by identifier, failing when it does not exist.
  async fn require_business(&self, identifier: &str) -> Result<Business> {
    self
      .get_business(identifier.to_string())
      .await?
      .ok_or_else(|| CoreError::EntityNotFound(identifier.to_string()).into())
  }

  /// Record a system dissolution event and move the entity to `state`.
  async fn add_dissolution_event(
    &self,
    identifier: String,
    event_type: EventType,
    state: CorpState,
  ) -> Result<EventId> {
    let corp_num = corp_num_from_identifier(&identifier);
    let event_id = self
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !corporation::exists(&tx, &corp_num)? {
          return Err(CoreError::EntityNotFound(identifier).into());
        }
        let event_id = events::allocate(&tx, &corp_num, event_type)?;
        StateStore::transition(&tx, &corp_num, event_id, state)?;
        tx.commit()?;
        Ok(event_id)
      })
      .await?;
    tracing::info!(event_id, %event_type, %state, "recorded dissolution event");
    Ok(event_id)
  }
}

/// A header-only document for listings.
fn header_document(
  info: &EventInfo,
  filing_type: FilingType,
  business: &Business,
  historic: bool,
) -> FilingDocument {
  FilingDocument {
    header:   DocumentHeader {
      available_on_paper_only: historic,
      in_colin_only:           None,
      certified_by:            None,
      colin_ids:               vec![info.event_id],
      date:                    info.timestamp.date_naive(),
      effective_date:          info.effective,
      email:                   None,
      name:                    filing_type,
      source:                  Some(DocumentSource::Colin),
      historic:                historic.then_some(true),
    },
    business: business.clone(),
    body:     FilingBody {
      event_id: Some(info.event_id),
      annual_report_date: info.period_end,
      annual_general_meeting_date: info.agm_date,
      ..Default::default()
    },
  }
}

// ─── FilingLedger impl ───────────────────────────────────────────────────────

impl FilingLedger for SqliteLedger {
  type Error = Error;

  // ── Entities ──────────────────────────────────────────────────────────

  async fn register_business(&self, business: NewBusiness) -> Result<Business> {
    let corp_num = corp_num_from_identifier(&business.identifier);
    let created = self
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        corporation::insert(&tx, &corp_num, &business)?;
        let created = corporation::get(&tx, &corp_num)?
          .ok_or_else(|| CoreError::EntityNotFound(business.identifier.clone()))?;
        tx.commit()?;
        Ok(created)
      })
      .await?;
    tracing::info!(identifier = %created.identifier, "registered business");
    Ok(created)
  }

  async fn get_business(&self, identifier: String) -> Result<Option<Business>> {
    let corp_num = corp_num_from_identifier(&identifier);
    self.call(move |conn| corporation::get(conn, &corp_num)).await
  }

  // ── Filings ───────────────────────────────────────────────────────────

  async fn submit(&self, filing: Filing) -> Result<EventId> {
    let registry = Arc::clone(&self.registry);
    let identifier = filing.identifier.clone();
    let filing_type = filing.filing_type;
    self
      .call(move |conn| writer::submit(conn, &registry, &filing))
      .await
      .map_err(|e| e.with_filing_context(&identifier, filing_type))
  }

  async fn reconstruct(&self, selector: FilingSelector) -> Result<FilingDocument> {
    let registry = Arc::clone(&self.registry);
    let components = Arc::clone(&self.components);
    let (identifier, filing_type) = match &selector {
      FilingSelector::Event(event_id) => (event_id.to_string(), "filing".to_string()),
      FilingSelector::Latest { identifier, filing_type, .. } => {
        (identifier.clone(), filing_type.to_string())
      }
    };
    self
      .call(move |conn| reconstruct::reconstruct(conn, &registry, components.as_ref(), &selector))
      .await
      .map_err(|e| e.with_filing_context(&identifier, filing_type))
  }

  async fn historic_filings(&self, identifier: String) -> Result<Vec<FilingDocument>> {
    let business = self.require_business(&identifier).await?;
    let corp_num = business.corp_num.clone();
    let infos = self.call(move |conn| EventInfo::all_for(conn, &corp_num)).await?;

    let cutover = digitization_cutover();
    let mut documents = Vec::new();
    for info in infos {
      let historic =
        info.timestamp.date_naive() < cutover || business.entity_type != EntityType::Coop;
      if !historic {
        continue;
      }
      let Some(filing_type) = self.registry.filing_type_for_code(info.code) else {
        tracing::warn!(event_id = info.event_id, code = %info.code, "skipping filing with unmapped code");
        continue;
      };
      documents.push(header_document(&info, filing_type, &business, true));
    }
    Ok(documents)
  }

  async fn future_effective_filings(&self, identifier: String) -> Result<Vec<FilingDocument>> {
    let business = self.require_business(&identifier).await?;
    let corp_num = business.corp_num.clone();
    let today = Utc::now().date_naive();
    let infos = self
      .call(move |conn| EventInfo::effective_after(conn, &corp_num, today))
      .await?;

    Ok(
      infos
        .into_iter()
        .filter_map(|info| {
          let filing_type = self.registry.filing_type_for_code(info.code)?;
          Some(header_document(&info, filing_type, &business, false))
        })
        .collect(),
    )
  }

  // ── System events ─────────────────────────────────────────────────────

  async fn add_administrative_dissolution(&self, identifier: String) -> Result<EventId> {
    self
      .add_dissolution_event(identifier, EventType::Sysda, CorpState::AdministrativeDissolution)
      .await
  }

  async fn add_involuntary_dissolution(
    &self,
    identifier: String,
    metadata: DissolutionMetadata,
  ) -> Result<Option<EventId>> {
    let (event_type, state) = if metadata.overdue_ars {
      (EventType::Sysdf, CorpState::InvoluntaryDissolutionNoAr)
    } else if metadata.overdue_transition {
      (EventType::Sysdt, CorpState::InvoluntaryDissolutionNoTransition)
    } else {
      tracing::debug!(%identifier, "no involuntary dissolution reason given");
      return Ok(None);
    };
    Ok(Some(self.add_dissolution_event(identifier, event_type, state).await?))
  }
}

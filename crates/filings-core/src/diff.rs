//! Director and name-translation diffs: incoming filing → minimal ledger
//! operations.
//!
//! Both are pure. The writer feeds them the current records, applies the
//! returned operations in order, and owns all persistence.

use std::collections::BTreeSet;

use crate::{
  Error, Result,
  filing::{DirectorAction, DirectorEntry, NameTranslation, Officer},
};

/// Row identity of a party record.
pub type PartyId = i64;

/// A director as currently recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentDirector {
  pub party_id: PartyId,
  pub officer:  Officer,
}

// ─── Directors ───────────────────────────────────────────────────────────────

/// One step of a director change, in application order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartyOp {
  /// Insert a newly appointed director.
  Create(DirectorEntry),
  /// End every current director whose name matches the entry's officer,
  /// stamping its cessation date.
  EndByName(DirectorEntry),
  /// End one specific current row.
  End(PartyId),
  /// Insert the replacement for a changed director. When `ceased`, the row
  /// is ended in the same event it starts.
  CreateReplacement {
    entry:         DirectorEntry,
    prev_party_id: PartyId,
    ceased:        bool,
  },
}

/// Whether a recorded officer is the one an incoming entry refers to. A name
/// change refers to the director by its previous name.
pub fn compare(existing: &Officer, incoming: &Officer) -> bool {
  let (first, middle, last) = if incoming.has_previous_name() {
    (
      &incoming.prev_first_name,
      &incoming.prev_middle_initial,
      &incoming.prev_last_name,
    )
  } else {
    (&incoming.first_name, &incoming.middle_initial, &incoming.last_name)
  };

  if incoming.org_name.as_deref().is_some_and(|s| !s.is_empty()) {
    let org = incoming.prev_org_name.as_ref().or(incoming.org_name.as_ref());
    return same(&existing.org_name, &org.cloned());
  }
  same(&existing.first_name, first)
    && same(&existing.middle_initial, middle)
    && same(&existing.last_name, last)
}

fn same(a: &Option<String>, b: &Option<String>) -> bool { norm(a) == norm(b) }

fn norm(s: &Option<String>) -> String {
  s.as_deref().unwrap_or("").trim().to_uppercase()
}

/// Plan the operations that apply `incoming` director entries on top of the
/// `current` directors.
///
/// Replacements for changed directors are staged after every other
/// operation, so a replacement never matches a later entry's lookup.
/// Fails with [`Error::DirectorNotFound`] when a change names no current
/// director; callers must then discard every operation already applied.
pub fn plan_directors(
  current: &[CurrentDirector],
  incoming: &[DirectorEntry],
) -> Result<Vec<PartyOp>> {
  let mut ops = Vec::new();
  let mut staged = Vec::new();

  for entry in incoming {
    let changing = entry.has(DirectorAction::NameChanged)
      || entry.has(DirectorAction::AddressChanged);
    let ceased = entry.has(DirectorAction::Ceased);

    if entry.has(DirectorAction::Appointed) {
      ops.push(PartyOp::Create(entry.clone()));
      if changing {
        tracing::warn!(
          director = %entry.officer.display_name(),
          "director appointed with a name or address change"
        );
      }
    }

    if !changing {
      if ceased {
        ops.push(PartyOp::EndByName(entry.clone()));
      }
      continue;
    }

    let matches: Vec<PartyId> = current
      .iter()
      .filter(|d| compare(&d.officer, &entry.officer))
      .map(|d| d.party_id)
      .collect();
    let Some(&prev_party_id) = matches.iter().max() else {
      return Err(Error::DirectorNotFound(entry.officer.display_name()));
    };
    ops.extend(matches.iter().map(|&id| PartyOp::End(id)));
    staged.push(PartyOp::CreateReplacement {
      entry: entry.clone(),
      prev_party_id,
      ceased,
    });
  }

  ops.extend(staged);
  Ok(ops)
}

// ─── Name translations ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationDiff {
  pub create: Vec<String>,
  pub end:    Vec<String>,
}

impl TranslationDiff {
  pub fn is_empty(&self) -> bool { self.create.is_empty() && self.end.is_empty() }
}

/// Diff incoming translations against the current ones. `None` leaves the
/// translations untouched; `Some(&[])` ends all of them.
pub fn diff_translations(
  current: &[String],
  incoming: Option<&[NameTranslation]>,
) -> TranslationDiff {
  let Some(incoming) = incoming else {
    return TranslationDiff::default();
  };

  let wanted: BTreeSet<&str> = incoming.iter().map(|t| t.name.as_str()).collect();
  let have: BTreeSet<&str> = current.iter().map(String::as_str).collect();

  TranslationDiff {
    create: wanted.difference(&have).map(|s| s.to_string()).collect(),
    end:    have.difference(&wanted).map(|s| s.to_string()).collect(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::filing::PartyType;

  fn officer(first: &str, last: &str) -> Officer {
    Officer {
      first_name: Some(first.into()),
      last_name: Some(last.into()),
      ..Default::default()
    }
  }

  fn entry(officer: Officer, actions: &[DirectorAction]) -> DirectorEntry {
    DirectorEntry { officer, actions: actions.to_vec(), ..Default::default() }
  }

  fn current() -> Vec<CurrentDirector> {
    vec![
      CurrentDirector { party_id: 1, officer: officer("Ada", "Lovelace") },
      CurrentDirector { party_id: 2, officer: officer("Alan", "Turing") },
    ]
  }

  #[test]
  fn appointment_creates() {
    let e = entry(officer("Grace", "Hopper"), &[DirectorAction::Appointed]);
    let ops = plan_directors(&current(), &[e.clone()]).unwrap();
    assert_eq!(ops, vec![PartyOp::Create(e)]);
  }

  #[test]
  fn cessation_ends_by_name() {
    let e = entry(officer("Alan", "Turing"), &[DirectorAction::Ceased]);
    let ops = plan_directors(&current(), &[e.clone()]).unwrap();
    assert_eq!(ops, vec![PartyOp::EndByName(e)]);
  }

  #[test]
  fn name_change_matches_previous_name_and_stages_replacement() {
    let mut renamed = officer("Ada", "King");
    renamed.prev_first_name = Some("ada".into());
    renamed.prev_last_name = Some("LOVELACE".into());
    let changed = entry(renamed, &[DirectorAction::NameChanged]);
    let appointed = entry(officer("Grace", "Hopper"), &[DirectorAction::Appointed]);

    let ops = plan_directors(&current(), &[changed.clone(), appointed.clone()])
      .unwrap();
    assert_eq!(ops, vec![
      PartyOp::End(1),
      PartyOp::Create(appointed),
      PartyOp::CreateReplacement {
        entry:         changed,
        prev_party_id: 1,
        ceased:        false,
      },
    ]);
  }

  #[test]
  fn ceased_with_address_change_replaces_as_ended() {
    let e = entry(officer("Alan", "Turing"), &[
      DirectorAction::AddressChanged,
      DirectorAction::Ceased,
    ]);
    let ops = plan_directors(&current(), &[e.clone()]).unwrap();
    assert_eq!(ops, vec![
      PartyOp::End(2),
      PartyOp::CreateReplacement { entry: e, prev_party_id: 2, ceased: true },
    ]);
  }

  #[test]
  fn change_to_unknown_director_fails() {
    let e = entry(officer("Nobody", "Known"), &[DirectorAction::AddressChanged]);
    let err = plan_directors(&current(), &[e]).unwrap_err();
    assert!(matches!(err, Error::DirectorNotFound(_)));
    assert_eq!(err.status_code(), 404);
  }

  #[test]
  fn duplicate_matches_are_all_ended_with_one_replacement() {
    let mut dirs = current();
    dirs.push(CurrentDirector { party_id: 7, officer: officer("Ada", "Lovelace") });
    let e = entry(officer("Ada", "Lovelace"), &[DirectorAction::AddressChanged]);
    let ops = plan_directors(&dirs, &[e.clone()]).unwrap();
    assert_eq!(ops, vec![
      PartyOp::End(1),
      PartyOp::End(7),
      PartyOp::CreateReplacement { entry: e, prev_party_id: 7, ceased: false },
    ]);
  }

  #[test]
  fn organizations_compare_by_org_name() {
    let existing = Officer { org_name: Some("Acme Ltd.".into()), ..Default::default() };
    let incoming = Officer { org_name: Some("ACME LTD.".into()), ..Default::default() };
    assert!(compare(&existing, &incoming));
  }

  #[test]
  fn organization_rename_matches_previous_org_name() {
    let org = |name: &str| Officer {
      org_name: Some(name.into()),
      party_type: PartyType::Organization,
      ..Default::default()
    };
    let dirs = vec![CurrentDirector { party_id: 3, officer: org("Acme Ltd.") }];
    let renamed = Officer {
      prev_org_name: Some("ACME LTD.".into()),
      ..org("Acme Holdings Ltd.")
    };
    let e = entry(renamed, &[DirectorAction::NameChanged]);

    let ops = plan_directors(&dirs, &[e.clone()]).unwrap();
    assert_eq!(ops, vec![
      PartyOp::End(3),
      PartyOp::CreateReplacement { entry: e, prev_party_id: 3, ceased: false },
    ]);
    assert!(!compare(&dirs[0].officer, &org("Acme Holdings Ltd.")));
  }

  #[test]
  fn translations_diff_symmetrically() {
    let current = vec!["Alpha".to_string(), "Beta".to_string()];
    let incoming = [NameTranslation::named("Alpha"), NameTranslation::named("Gamma")];
    let diff = diff_translations(&current, Some(&incoming[..]));
    assert_eq!(diff.create, vec!["Gamma".to_string()]);
    assert_eq!(diff.end, vec!["Beta".to_string()]);
  }

  #[test]
  fn absent_translations_are_untouched_and_empty_ends_all() {
    let current = vec!["Alpha".to_string()];
    assert!(diff_translations(&current, None).is_empty());
    let diff = diff_translations(&current, Some(&[][..]));
    assert!(diff.create.is_empty());
    assert_eq!(diff.end, vec!["Alpha".to_string()]);
  }
}

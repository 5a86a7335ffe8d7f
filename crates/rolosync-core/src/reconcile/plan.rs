use crate::domain::{format_national, normalize_phone, Person, RemoteContact};
use crate::reconcile::diff::{diff_pair, FieldDiff};
use crate::reconcile::matching::match_records;
use serde::Serialize;

/// One pending update: the changed fields plus the etag observed at read
/// time. The remote service rejects the write if the etag has gone stale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactUpdate {
    pub resource_name: String,
    pub etag: String,
    pub fields: FieldDiff,
}

/// One pending create. Only fields with a non-empty source value are
/// carried; phones arrive already normalized and formatted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContactCreate {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl ContactCreate {
    fn from_person(person: &Person) -> ContactCreate {
        ContactCreate {
            display_name: non_empty(&person.name),
            email: non_empty(&person.email),
            phone: non_empty(&person.phone_number)
                .map(|raw| format_national(&normalize_phone(&raw))),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.email.is_none() && self.phone.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    MissingEtag,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedContact {
    pub resource_name: String,
    pub display_name: String,
    pub reason: SkipReason,
}

/// Full reconciliation output, computed before any write is issued.
#[derive(Debug, Default, Serialize)]
pub struct SyncPlan {
    pub updates: Vec<ContactUpdate>,
    pub creates: Vec<ContactCreate>,
    pub skipped: Vec<SkippedContact>,
    pub matched: usize,
    pub unmatched: usize,
    pub unchanged: usize,
}

/// Matches sheet records against the remote listing and decides, per
/// record, between update, create, skip, and no-op.
pub fn build_plan(records: &[Person], contacts: &[RemoteContact]) -> SyncPlan {
    let outcome = match_records(records, contacts);
    let mut plan = SyncPlan {
        matched: outcome.matched.len(),
        unmatched: outcome.unmatched.len(),
        ..SyncPlan::default()
    };

    for pair in outcome.matched {
        let diff = diff_pair(pair.person, pair.contact);
        let Some(etag) = pair.contact.etag.as_deref().filter(|etag| !etag.is_empty()) else {
            plan.skipped.push(SkippedContact {
                resource_name: pair.contact.resource_name.clone(),
                display_name: pair.contact.display_name.clone(),
                reason: SkipReason::MissingEtag,
            });
            continue;
        };
        if diff.is_empty() {
            plan.unchanged += 1;
            continue;
        }
        plan.updates.push(ContactUpdate {
            resource_name: pair.contact.resource_name.clone(),
            etag: etag.to_string(),
            fields: diff,
        });
    }

    for person in outcome.unmatched {
        let create = ContactCreate::from_person(person);
        if !create.is_empty() {
            plan.creates.push(create);
        }
    }

    plan
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

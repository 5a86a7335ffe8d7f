use crate::domain::{format_national, normalize_phone, Person, RemoteContact};
use serde::Serialize;

/// Fields whose sheet value differs from the remote contact. Each entry
/// carries the value to write; an empty diff means no remote call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldDiff {
    pub display_name: Option<String>,
    pub phone: Option<String>,
}

impl FieldDiff {
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.phone.is_none()
    }
}

/// Computes the per-field diff for a matched pair.
///
/// Names compare trimmed and case-folded but the value written is the sheet
/// name verbatim. Phones compare in normalized national format. A remote
/// contact with no phone at all is left alone: the sync never proposes
/// adding a number where none exists.
pub fn diff_pair(person: &Person, contact: &RemoteContact) -> FieldDiff {
    let mut diff = FieldDiff::default();

    if fold_name(&person.name) != fold_name(&contact.display_name) {
        diff.display_name = Some(person.name.clone());
    }

    if let Some(remote_phone) = contact.phones.first() {
        let sheet_phone = format_national(&normalize_phone(&person.phone_number));
        if sheet_phone != format_national(&normalize_phone(remote_phone)) {
            diff.phone = Some(sheet_phone);
        }
    }

    diff
}

fn fold_name(value: &str) -> String {
    value.trim().to_lowercase()
}

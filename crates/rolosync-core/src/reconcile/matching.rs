use crate::domain::{email_key, Person, RemoteContact};
use serde::Deserialize;

/// Field used to pair sheet records with remote contacts. Email is the only
/// recognized key; the enum names the policy so it stays explicit in
/// configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKey {
    #[default]
    Email,
}

#[derive(Debug, Clone, Copy)]
pub struct MatchedPair<'a> {
    pub person: &'a Person,
    pub contact: &'a RemoteContact,
}

#[derive(Debug, Default)]
pub struct MatchOutcome<'a> {
    pub matched: Vec<MatchedPair<'a>>,
    pub unmatched: Vec<&'a Person>,
}

/// Partitions sheet records by email equality against the remote listing.
///
/// Records are visited in sheet order; candidates are scanned in listing
/// order and the first contact whose email set contains the record's email
/// wins. Remaining candidates are not considered, so a second remote
/// contact sharing the same email is ignored.
pub fn match_records<'a>(
    records: &'a [Person],
    contacts: &'a [RemoteContact],
) -> MatchOutcome<'a> {
    let mut outcome = MatchOutcome::default();
    for person in records {
        let key = email_key(&person.email);
        let hit = contacts
            .iter()
            .find(|contact| contact.emails.iter().any(|email| email_key(email) == key));
        match hit {
            Some(contact) => outcome.matched.push(MatchedPair { person, contact }),
            None => outcome.unmatched.push(person),
        }
    }
    outcome
}

use serde::{Deserialize, Serialize};

/// One contact entity held by the remote address-book service.
///
/// `etag` is the optimistic-concurrency token the service requires on every
/// mutation; a contact listed without one is never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteContact {
    pub resource_name: String,
    pub etag: Option<String>,
    pub display_name: String,
    pub emails: Vec<String>,
    pub phones: Vec<String>,
}

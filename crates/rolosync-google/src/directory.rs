use crate::Result;
use rolosync_core::{ContactCreate, ContactUpdate, RemoteContact};

/// The remote address-book seam. The sync orchestration only talks to this
/// trait, so tests can substitute an in-memory double.
pub trait ContactDirectory {
    /// Cheap no-op request issued before the listing to absorb service
    /// warm-up latency.
    fn warm_up(&self) -> Result<()>;
    fn list_contacts(&self) -> Result<Vec<RemoteContact>>;
    fn update_contact(&self, update: &ContactUpdate) -> Result<()>;
    fn create_contact(&self, create: &ContactCreate) -> Result<()>;
}

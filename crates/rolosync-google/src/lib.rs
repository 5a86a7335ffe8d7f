pub mod auth;
pub mod directory;
pub mod error;
pub mod people;
pub mod sheets;

pub use directory::ContactDirectory;
pub use error::{GoogleError, Result};

use reqwest::blocking::Client;
use std::time::Duration;

const USER_AGENT: &str = concat!("rolosync/", env!("CARGO_PKG_VERSION"));

pub(crate) fn http_client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .build()
        .map_err(GoogleError::from)
}

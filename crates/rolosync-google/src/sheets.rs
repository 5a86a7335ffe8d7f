use crate::{GoogleError, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use url::Url;

const SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4/";

/// Reads the raw value grid of a worksheet. Rows come back exactly as the
/// service renders them; column interpretation happens in the core crate.
#[derive(Debug, Clone)]
pub struct SheetsClient {
    http: Client,
    base_url: Url,
    access_token: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ValueRange {
    values: Vec<Vec<String>>,
}

impl SheetsClient {
    pub fn new(access_token: String) -> Result<SheetsClient> {
        SheetsClient::with_base_url(SHEETS_BASE_URL, access_token)
    }

    pub fn with_base_url(base_url: &str, access_token: String) -> Result<SheetsClient> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(GoogleError::BaseUrl(base_url.into()));
        }
        Ok(SheetsClient {
            http: crate::http_client()?,
            base_url,
            access_token,
        })
    }

    pub fn fetch_rows(&self, spreadsheet_id: &str, worksheet: &str) -> Result<Vec<Vec<String>>> {
        let url = values_url(&self.base_url, spreadsheet_id, worksheet)?;
        let range: ValueRange = self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .send()?
            .error_for_status()?
            .json()?;
        Ok(range.values)
    }
}

fn values_url(base: &Url, spreadsheet_id: &str, worksheet: &str) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| GoogleError::BaseUrl(base.to_string()))?
        .extend(["spreadsheets", spreadsheet_id, "values", worksheet]);
    Ok(url)
}

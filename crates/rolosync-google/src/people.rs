use crate::directory::ContactDirectory;
use crate::{GoogleError, Result};
use reqwest::blocking::Client;
use rolosync_core::{ContactCreate, ContactUpdate, FieldDiff, RemoteContact};
use serde::{Deserialize, Serialize};
use url::Url;

const PEOPLE_BASE_URL: &str = "https://people.googleapis.com/v1/";
const PERSON_FIELDS: &str = "names,emailAddresses,phoneNumbers";
const SORT_ORDER: &str = "FIRST_NAME_ASCENDING";

/// Blocking client for the People v1 contact surface.
#[derive(Debug, Clone)]
pub struct PeopleClient {
    http: Client,
    base_url: Url,
    access_token: String,
    page_size: u32,
}

impl PeopleClient {
    pub fn new(access_token: String, page_size: u32) -> Result<PeopleClient> {
        PeopleClient::with_base_url(PEOPLE_BASE_URL, access_token, page_size)
    }

    pub fn with_base_url(
        base_url: &str,
        access_token: String,
        page_size: u32,
    ) -> Result<PeopleClient> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(GoogleError::BaseUrl(base_url.into()));
        }
        Ok(PeopleClient {
            http: crate::http_client()?,
            base_url,
            access_token,
            page_size,
        })
    }
}

impl ContactDirectory for PeopleClient {
    fn warm_up(&self) -> Result<()> {
        let url = profile_url(&self.base_url)?;
        self.http
            .get(url)
            .bearer_auth(&self.access_token)
            .send()?
            .error_for_status()?;
        Ok(())
    }

    fn list_contacts(&self) -> Result<Vec<RemoteContact>> {
        let mut contacts = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let url = connections_url(&self.base_url, self.page_size, page_token.as_deref())?;
            let page: ListConnectionsResponse = self
                .http
                .get(url)
                .bearer_auth(&self.access_token)
                .send()?
                .error_for_status()?
                .json()?;
            contacts.extend(
                page.connections
                    .into_iter()
                    .filter_map(PersonResource::into_remote_contact),
            );
            match page.next_page_token.filter(|token| !token.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }
        Ok(contacts)
    }

    fn update_contact(&self, update: &ContactUpdate) -> Result<()> {
        let url = update_url(&self.base_url, &update.resource_name, &update.fields)?;
        self.http
            .patch(url)
            .bearer_auth(&self.access_token)
            .json(&update_body(update))
            .send()?
            .error_for_status()?;
        Ok(())
    }

    fn create_contact(&self, create: &ContactCreate) -> Result<()> {
        let url = create_url(&self.base_url)?;
        self.http
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&create_body(create))
            .send()?
            .error_for_status()?;
        Ok(())
    }
}

/// People wire shape, shared by reads and writes. `displayName` is
/// output-only; writes carry `unstructuredName`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonResource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<NameField>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub email_addresses: Vec<ValueField>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub phone_numbers: Vec<ValueField>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NameField {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unstructured_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueField {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ListConnectionsResponse {
    connections: Vec<PersonResource>,
    next_page_token: Option<String>,
}

impl PersonResource {
    fn into_remote_contact(self) -> Option<RemoteContact> {
        let resource_name = self.resource_name?;
        let display_name = self
            .names
            .iter()
            .find_map(|name| {
                name.display_name
                    .clone()
                    .or_else(|| name.unstructured_name.clone())
            })
            .unwrap_or_default();
        Some(RemoteContact {
            resource_name,
            etag: self.etag,
            display_name,
            emails: self
                .email_addresses
                .into_iter()
                .filter_map(|field| field.value)
                .collect(),
            phones: self
                .phone_numbers
                .into_iter()
                .filter_map(|field| field.value)
                .collect(),
        })
    }
}

fn profile_url(base: &Url) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| GoogleError::BaseUrl(base.to_string()))?
        .extend(["people", "me"]);
    url.query_pairs_mut().append_pair("personFields", "names");
    Ok(url)
}

fn connections_url(base: &Url, page_size: u32, page_token: Option<&str>) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| GoogleError::BaseUrl(base.to_string()))?
        .extend(["people", "me", "connections"]);
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("personFields", PERSON_FIELDS);
        query.append_pair("sortOrder", SORT_ORDER);
        query.append_pair("pageSize", &page_size.to_string());
        if let Some(token) = page_token {
            query.append_pair("pageToken", token);
        }
    }
    Ok(url)
}

fn update_url(base: &Url, resource_name: &str, fields: &FieldDiff) -> Result<Url> {
    let mut url = base.clone();
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| GoogleError::BaseUrl(base.to_string()))?;
        let mut parts = resource_name.split('/').peekable();
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                segments.push(&format!("{part}:updateContact"));
            } else {
                segments.push(part);
            }
        }
    }
    url.query_pairs_mut()
        .append_pair("updatePersonFields", &update_person_fields(fields));
    Ok(url)
}

fn create_url(base: &Url) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| GoogleError::BaseUrl(base.to_string()))?
        .push("people:createContact");
    Ok(url)
}

/// Names the field groups an update touches, in the form the service
/// expects for `updatePersonFields`.
fn update_person_fields(fields: &FieldDiff) -> String {
    let mut groups = Vec::new();
    if fields.display_name.is_some() {
        groups.push("names");
    }
    if fields.phone.is_some() {
        groups.push("phoneNumbers");
    }
    groups.join(",")
}

fn update_body(update: &ContactUpdate) -> PersonResource {
    PersonResource {
        resource_name: Some(update.resource_name.clone()),
        etag: Some(update.etag.clone()),
        names: update
            .fields
            .display_name
            .iter()
            .map(|name| NameField {
                display_name: None,
                unstructured_name: Some(name.clone()),
            })
            .collect(),
        email_addresses: Vec::new(),
        phone_numbers: update
            .fields
            .phone
            .iter()
            .map(|phone| ValueField {
                value: Some(phone.clone()),
            })
            .collect(),
    }
}

fn create_body(create: &ContactCreate) -> PersonResource {
    PersonResource {
        resource_name: None,
        etag: None,
        names: create
            .display_name
            .iter()
            .map(|name| NameField {
                display_name: None,
                unstructured_name: Some(name.clone()),
            })
            .collect(),
        email_addresses: create
            .email
            .iter()
            .map(|email| ValueField {
                value: Some(email.clone()),
            })
            .collect(),
        phone_numbers: create
            .phone
            .iter()
            .map(|phone| ValueField {
                value: Some(phone.clone()),
            })
            .collect(),
    }
}

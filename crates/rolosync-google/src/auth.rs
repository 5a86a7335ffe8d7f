use crate::{GoogleError, Result};
use chrono::Utc;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use url::Url;

pub const SHEETS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets.readonly";
pub const CONTACTS_SCOPE: &str = "https://www.googleapis.com/auth/contacts";

const OOB_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";
const EXPIRY_SKEW_SECS: i64 = 60;

/// OAuth client registration, read from a Google-format credentials file
/// (the `installed` application shape).
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    pub auth_uri: String,
    pub token_uri: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SecretsFile {
    installed: ClientSecrets,
}

impl ClientSecrets {
    pub fn from_file(path: &Path) -> Result<ClientSecrets> {
        let contents = fs::read_to_string(path)?;
        let parsed: SecretsFile = serde_json::from_str(&contents)?;
        Ok(parsed.installed)
    }

    fn redirect_uri(&self) -> &str {
        self.redirect_uris
            .first()
            .map(String::as_str)
            .unwrap_or(OOB_REDIRECT_URI)
    }
}

/// Token persisted between runs. A malformed or missing file is treated as
/// absent, never as a failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: i64,
}

impl StoredToken {
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at <= now + EXPIRY_SKEW_SECS
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    expires_in: i64,
}

impl TokenResponse {
    fn into_stored(self, now: i64, previous_refresh: Option<String>) -> StoredToken {
        StoredToken {
            access_token: self.access_token,
            refresh_token: self.refresh_token.or(previous_refresh),
            expires_at: now + self.expires_in,
        }
    }
}

pub fn load_token(path: &Path) -> Option<StoredToken> {
    let contents = fs::read_to_string(path).ok()?;
    serde_json::from_str(&contents).ok()
}

pub fn store_token(path: &Path, token: &StoredToken) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let contents = serde_json::to_string_pretty(token)?;
    fs::write(path, contents)?;
    restrict_permissions(path)?;
    Ok(())
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(0o600);
    fs::set_permissions(path, perms)?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

/// Acquires and persists access tokens for the configured client. Reuses
/// the stored token while it is fresh, refreshes it when possible, and
/// falls back to the interactive console flow otherwise.
pub struct Authenticator {
    secrets: ClientSecrets,
    token_path: PathBuf,
    scopes: Vec<&'static str>,
    http: Client,
}

impl Authenticator {
    pub fn new(secrets: ClientSecrets, token_path: PathBuf) -> Result<Authenticator> {
        Ok(Authenticator {
            secrets,
            token_path,
            scopes: vec![SHEETS_READONLY_SCOPE, CONTACTS_SCOPE],
            http: crate::http_client()?,
        })
    }

    /// Returns a usable token, persisting whatever it had to mint.
    pub fn ensure_token(&self) -> Result<StoredToken> {
        let now = Utc::now().timestamp();
        if let Some(stored) = load_token(&self.token_path) {
            if !stored.is_expired(now) {
                return Ok(stored);
            }
            if let Some(refresh_token) = stored.refresh_token.clone() {
                if let Ok(token) = self.refresh(&refresh_token, now) {
                    store_token(&self.token_path, &token)?;
                    return Ok(token);
                }
            }
        }
        self.login()
    }

    /// Runs the interactive console flow unconditionally and persists the
    /// result.
    pub fn login(&self) -> Result<StoredToken> {
        let stdin = std::io::stdin();
        let stderr = std::io::stderr();
        let code = prompt_for_code(
            stdin.lock(),
            stderr.lock(),
            &authorization_url(&self.secrets, &self.scopes)?,
        )?;
        let token = self.exchange_code(&code, Utc::now().timestamp())?;
        store_token(&self.token_path, &token)?;
        Ok(token)
    }

    fn exchange_code(&self, code: &str, now: i64) -> Result<StoredToken> {
        let response: TokenResponse = self
            .http
            .post(&self.secrets.token_uri)
            .form(&[
                ("code", code),
                ("client_id", self.secrets.client_id.as_str()),
                ("client_secret", self.secrets.client_secret.as_str()),
                ("redirect_uri", self.secrets.redirect_uri()),
                ("grant_type", "authorization_code"),
            ])
            .send()?
            .error_for_status()?
            .json()?;
        Ok(response.into_stored(now, None))
    }

    fn refresh(&self, refresh_token: &str, now: i64) -> Result<StoredToken> {
        let response: TokenResponse = self
            .http
            .post(&self.secrets.token_uri)
            .form(&[
                ("refresh_token", refresh_token),
                ("client_id", self.secrets.client_id.as_str()),
                ("client_secret", self.secrets.client_secret.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()?
            .error_for_status()?
            .json()?;
        Ok(response.into_stored(now, Some(refresh_token.to_string())))
    }
}

fn authorization_url(secrets: &ClientSecrets, scopes: &[&str]) -> Result<String> {
    let url = Url::parse_with_params(
        &secrets.auth_uri,
        [
            ("client_id", secrets.client_id.as_str()),
            ("redirect_uri", secrets.redirect_uri()),
            ("response_type", "code"),
            ("scope", scopes.join(" ").as_str()),
            ("access_type", "offline"),
            ("prompt", "consent"),
        ],
    )?;
    Ok(url.into())
}

fn prompt_for_code(mut input: impl BufRead, mut output: impl Write, auth_url: &str) -> Result<String> {
    writeln!(output, "Open this URL in a browser and authorize access:")?;
    writeln!(output, "{auth_url}")?;
    write!(output, "Paste the authorization code: ")?;
    output.flush()?;

    let mut code = String::new();
    input.read_line(&mut code)?;
    let code = code.trim();
    if code.is_empty() {
        return Err(GoogleError::Auth("empty authorization code".to_string()));
    }
    Ok(code.to_string())
}

#[cfg(test)]
mod tests {
    use super::{
        authorization_url, load_token, prompt_for_code, store_token, ClientSecrets, StoredToken,
    };
    use std::fs;
    use tempfile::TempDir;

    fn secrets() -> ClientSecrets {
        ClientSecrets {
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            auth_uri: "https://accounts.example.com/o/oauth2/auth".to_string(),
            token_uri: "https://oauth2.example.com/token".to_string(),
            redirect_uris: vec!["http://localhost".to_string()],
        }
    }

    #[test]
    fn token_round_trips_through_disk() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("token.json");
        let token = StoredToken {
            access_token: "abc".to_string(),
            refresh_token: Some("refresh".to_string()),
            expires_at: 1_700_000_000,
        };
        store_token(&path, &token).expect("store");
        let loaded = load_token(&path).expect("load");
        assert_eq!(loaded.access_token, "abc");
        assert_eq!(loaded.refresh_token.as_deref(), Some("refresh"));
        assert_eq!(loaded.expires_at, 1_700_000_000);
    }

    #[test]
    fn malformed_token_file_reads_as_absent() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("token.json");
        fs::write(&path, "{not json").expect("write");
        assert!(load_token(&path).is_none());
        assert!(load_token(&temp.path().join("missing.json")).is_none());
    }

    #[test]
    fn expiry_includes_clock_skew() {
        let token = StoredToken {
            access_token: "abc".to_string(),
            refresh_token: None,
            expires_at: 1_000,
        };
        assert!(token.is_expired(960));
        assert!(!token.is_expired(900));
    }

    #[test]
    fn authorization_url_carries_scopes_and_client() {
        let url = authorization_url(
            &secrets(),
            &[super::SHEETS_READONLY_SCOPE, super::CONTACTS_SCOPE],
        )
        .expect("url");
        assert!(url.starts_with("https://accounts.example.com/o/oauth2/auth?"));
        assert!(url.contains("client_id=client-id"));
        assert!(url.contains("spreadsheets.readonly"));
        assert!(url.contains("response_type=code"));
    }

    #[test]
    fn prompt_for_code_trims_input() {
        let mut output = Vec::new();
        let code =
            prompt_for_code(&b"  4/abc123  \n"[..], &mut output, "https://example.com/auth")
                .expect("code");
        assert_eq!(code, "4/abc123");
        let printed = String::from_utf8(output).expect("utf8");
        assert!(printed.contains("https://example.com/auth"));
    }

    #[test]
    fn prompt_for_code_rejects_empty_input() {
        let mut output = Vec::new();
        assert!(prompt_for_code(&b"\n"[..], &mut output, "url").is_err());
    }

    #[test]
    fn secrets_parse_installed_shape() {
        let json = r#"{
            "installed": {
                "client_id": "id",
                "client_secret": "secret",
                "auth_uri": "https://accounts.google.com/o/oauth2/auth",
                "token_uri": "https://oauth2.googleapis.com/token",
                "redirect_uris": ["http://localhost"]
            }
        }"#;
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("credentials.json");
        fs::write(&path, json).expect("write");
        let secrets = ClientSecrets::from_file(&path).expect("secrets");
        assert_eq!(secrets.client_id, "id");
        assert_eq!(secrets.redirect_uris.len(), 1);
    }
}

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use rolosync_core::MatchKey;
use serde::Deserialize;
use thiserror::Error;

const APP_DIR: &str = "rolosync";
const CONFIG_FILENAME: &str = "config.toml";
const TOKEN_FILENAME: &str = "token.json";

pub const DEFAULT_WORKSHEET: &str = "Sheet1";
pub const DEFAULT_CREDENTIALS_FILE: &str = "credentials.json";
pub const DEFAULT_PAGE_SIZE: u32 = 1000;
pub const MAX_PAGE_SIZE: u32 = 1000;
pub const DEFAULT_WARMUP_DELAY_MS: u64 = 1500;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub spreadsheet: SpreadsheetConfig,
    pub credentials_path: PathBuf,
    pub token_path: Option<PathBuf>,
    pub page_size: u32,
    pub warmup_delay_ms: u64,
    pub match_key: MatchKey,
}

#[derive(Debug, Clone)]
pub struct SpreadsheetConfig {
    pub id: Option<String>,
    pub id_file: Option<PathBuf>,
    pub worksheet: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            spreadsheet: SpreadsheetConfig {
                id: None,
                id_file: None,
                worksheet: DEFAULT_WORKSHEET.to_string(),
            },
            credentials_path: PathBuf::from(DEFAULT_CREDENTIALS_FILE),
            token_path: None,
            page_size: DEFAULT_PAGE_SIZE,
            warmup_delay_ms: DEFAULT_WARMUP_DELAY_MS,
            match_key: MatchKey::Email,
        }
    }
}

impl SpreadsheetConfig {
    /// Resolves the spreadsheet id, reading the indirection file when the
    /// id is not given inline.
    pub fn resolve_id(&self) -> Result<String> {
        if let Some(id) = self.id.as_deref() {
            let id = id.trim();
            if !id.is_empty() {
                return Ok(id.to_string());
            }
        }
        if let Some(path) = self.id_file.as_deref() {
            let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            let id = contents.trim();
            if id.is_empty() {
                return Err(ConfigError::EmptySpreadsheetIdFile(path.to_path_buf()));
            }
            return Ok(id.to_string());
        }
        Err(ConfigError::MissingSpreadsheetId)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("invalid config path: {0}")]
    InvalidConfigPath(PathBuf),
    #[error("config file not found: {0}")]
    MissingConfigFile(PathBuf),
    #[error("invalid page_size value: {0} (expected 1..={MAX_PAGE_SIZE})")]
    InvalidPageSize(u32),
    #[error("spreadsheet id not configured (set spreadsheet.id or spreadsheet.id_file)")]
    MissingSpreadsheetId,
    #[error("spreadsheet id file is empty: {0}")]
    EmptySpreadsheetIdFile(PathBuf),
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    spreadsheet: Option<SpreadsheetFile>,
    credentials_path: Option<PathBuf>,
    token_path: Option<PathBuf>,
    page_size: Option<u32>,
    warmup_delay_ms: Option<u64>,
    match_key: Option<MatchKey>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SpreadsheetFile {
    id: Option<String>,
    id_file: Option<PathBuf>,
    worksheet: Option<String>,
}

pub fn load(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let required = config_path.is_some();
    let path = match resolve_config_path(config_path.clone()) {
        Ok(path) => path,
        Err(ConfigError::MissingHomeDir) if !required => return Ok(AppConfig::default()),
        Err(ConfigError::InvalidConfigPath(_)) if !required => return Ok(AppConfig::default()),
        Err(err) => return Err(err),
    };
    match load_at_path(&path, required)? {
        Some(config) => Ok(config),
        None => Ok(AppConfig::default()),
    }
}

pub fn resolve_config_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(path) => {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidConfigPath(path));
            }
            Ok(path)
        }
        None => Ok(config_dir()?.join(CONFIG_FILENAME)),
    }
}

/// Default location for the persisted OAuth token when the config does not
/// name one.
pub fn resolve_token_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(path) => {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidConfigPath(path));
            }
            Ok(path)
        }
        None => Ok(config_dir()?.join(TOKEN_FILENAME)),
    }
}

fn config_dir() -> Result<PathBuf> {
    let base = if let Some(dir) = env::var_os("XDG_CONFIG_HOME") {
        let path = PathBuf::from(dir);
        if path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidConfigPath(path));
        }
        path
    } else {
        let home = dirs::home_dir().ok_or(ConfigError::MissingHomeDir)?;
        home.join(".config")
    };
    Ok(base.join(APP_DIR))
}

fn load_at_path(path: &Path, required: bool) -> Result<Option<AppConfig>> {
    if !path.exists() {
        if required {
            return Err(ConfigError::MissingConfigFile(path.to_path_buf()));
        }
        return Ok(None);
    }

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(merge_config(parsed)?))
}

fn merge_config(parsed: ConfigFile) -> Result<AppConfig> {
    let mut config = AppConfig::default();

    if let Some(spreadsheet) = parsed.spreadsheet {
        if let Some(id) = spreadsheet.id {
            config.spreadsheet.id = Some(id);
        }
        if let Some(id_file) = spreadsheet.id_file {
            config.spreadsheet.id_file = Some(id_file);
        }
        if let Some(worksheet) = spreadsheet.worksheet {
            config.spreadsheet.worksheet = worksheet;
        }
    }

    if let Some(path) = parsed.credentials_path {
        config.credentials_path = path;
    }
    if let Some(path) = parsed.token_path {
        config.token_path = Some(path);
    }

    if let Some(page_size) = parsed.page_size {
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::InvalidPageSize(page_size));
        }
        config.page_size = page_size;
    }

    if let Some(delay) = parsed.warmup_delay_ms {
        config.warmup_delay_ms = delay;
    }

    if let Some(match_key) = parsed.match_key {
        config.match_key = match_key;
    }

    Ok(config)
}

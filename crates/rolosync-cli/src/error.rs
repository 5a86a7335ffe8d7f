use anyhow::Error;
use rolosync_config::ConfigError;
use rolosync_google::GoogleError;
use std::process::ExitCode;
use thiserror::Error as ThisError;

pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_AUTH_FAILURE: u8 = 2;
pub const EXIT_INVALID_INPUT: u8 = 3;

#[derive(Debug, ThisError)]
pub enum CliError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub fn invalid_input(message: impl Into<String>) -> Error {
    CliError::InvalidInput(message.into()).into()
}

pub fn report_error(err: &Error, verbose: bool) {
    if verbose {
        eprintln!("error: {:#}", err);
    } else {
        eprintln!("error: {}", err);
    }
}

pub fn exit_code_for(err: &Error) -> ExitCode {
    for cause in err.chain() {
        if let Some(cli_err) = cause.downcast_ref::<CliError>() {
            return ExitCode::from(match cli_err {
                CliError::InvalidInput(_) => EXIT_INVALID_INPUT,
            });
        }
        if let Some(config_err) = cause.downcast_ref::<ConfigError>() {
            return ExitCode::from(config_exit_code(config_err));
        }
        if let Some(google_err) = cause.downcast_ref::<GoogleError>() {
            return ExitCode::from(google_exit_code(google_err));
        }
    }
    ExitCode::from(EXIT_FAILURE)
}

fn config_exit_code(err: &ConfigError) -> u8 {
    match err {
        ConfigError::MissingHomeDir => EXIT_FAILURE,
        ConfigError::InvalidConfigPath(_)
        | ConfigError::MissingConfigFile(_)
        | ConfigError::InvalidPageSize(_)
        | ConfigError::MissingSpreadsheetId
        | ConfigError::EmptySpreadsheetIdFile(_)
        | ConfigError::Read { .. }
        | ConfigError::Parse { .. } => EXIT_INVALID_INPUT,
    }
}

fn google_exit_code(err: &GoogleError) -> u8 {
    match err {
        GoogleError::Auth(_) => EXIT_AUTH_FAILURE,
        GoogleError::Http(_) | GoogleError::Io(_) => EXIT_FAILURE,
        GoogleError::Url(_) | GoogleError::Decode(_) | GoogleError::BaseUrl(_) => {
            EXIT_INVALID_INPUT
        }
    }
}

use anyhow::Error;
use bulkmsg_config::ConfigError;
use bulkmsg_core::{CoreError, EngineError};
use bulkmsg_delivery::DeliveryError;
use std::io::ErrorKind;
use std::process::ExitCode;
use thiserror::Error as ThisError;

pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_NOT_FOUND: u8 = 2;
pub const EXIT_INVALID_INPUT: u8 = 3;

#[derive(Debug, ThisError)]
pub enum CliError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("not found: {0}")]
    NotFound(String),
}

pub fn invalid_input(message: impl Into<String>) -> Error {
    CliError::InvalidInput(message.into()).into()
}

pub fn not_found(message: impl Into<String>) -> Error {
    CliError::NotFound(message.into()).into()
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
                CliError::NotFound(_) => EXIT_NOT_FOUND,
            });
        }
        if let Some(config_err) = cause.downcast_ref::<ConfigError>() {
            return ExitCode::from(config_exit_code(config_err));
        }
        if let Some(delivery_err) = cause.downcast_ref::<DeliveryError>() {
            return ExitCode::from(delivery_exit_code(delivery_err));
        }
        if let Some(engine_err) = cause.downcast_ref::<EngineError>() {
            return ExitCode::from(match engine_err {
                EngineError::Input(core_err) => core_exit_code(core_err),
                _ => EXIT_INVALID_INPUT,
            });
        }
        if let Some(core_err) = cause.downcast_ref::<CoreError>() {
            return ExitCode::from(core_exit_code(core_err));
        }
    }
    ExitCode::from(EXIT_FAILURE)
}

fn core_exit_code(err: &CoreError) -> u8 {
    match err {
        CoreError::Read { source, .. } if source.kind() == ErrorKind::NotFound => EXIT_NOT_FOUND,
        CoreError::Read { .. } | CoreError::Encode(_) => EXIT_FAILURE,
        CoreError::EmptyInput
        | CoreError::Undecodable(_)
        | CoreError::UnsupportedFileType(_)
        | CoreError::NoDataSheet { .. }
        | CoreError::MissingHeader
        | CoreError::NoRecipients
        | CoreError::InvalidPhone(_) => EXIT_INVALID_INPUT,
    }
}

fn config_exit_code(err: &ConfigError) -> u8 {
    match err {
        ConfigError::MissingHomeDir => EXIT_FAILURE,
        ConfigError::InvalidConfigPath(_)
        | ConfigError::MissingConfigFile(_)
        | ConfigError::InsecurePermissions(_)
        | ConfigError::InvalidPreviewLimit(_)
        | ConfigError::InvalidLmsThreshold(_)
        | ConfigError::InvalidTimeout(_)
        | ConfigError::InvalidBaseUrl(_)
        | ConfigError::EmptySheetList(_)
        | ConfigError::Read { .. }
        | ConfigError::Parse { .. } => EXIT_INVALID_INPUT,
    }
}

fn delivery_exit_code(err: &DeliveryError) -> u8 {
    match err {
        DeliveryError::NotFound(_) => EXIT_NOT_FOUND,
        DeliveryError::Core(core_err) => core_exit_code(core_err),
        DeliveryError::InvalidKey(_)
        | DeliveryError::FileTooLarge { .. }
        | DeliveryError::InvalidFileType(_)
        | DeliveryError::EmptyBatch
        | DeliveryError::MissingCredentials(_)
        | DeliveryError::InvalidBaseUrl(_)
        | DeliveryError::InvalidStoragePath(_)
        | DeliveryError::Unavailable(_) => EXIT_INVALID_INPUT,
        DeliveryError::Io(_)
        | DeliveryError::Json(_)
        | DeliveryError::Api { .. }
        | DeliveryError::Parse(_)
        | DeliveryError::MissingHomeDir => EXIT_FAILURE,
        #[cfg(feature = "solapi")]
        DeliveryError::Signing(_) | DeliveryError::Http(_) => EXIT_FAILURE,
        #[cfg(feature = "solapi")]
        DeliveryError::Url(_) => EXIT_INVALID_INPUT,
    }
}

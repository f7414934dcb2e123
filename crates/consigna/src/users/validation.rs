use chrono::NaiveDateTime;
use validator::ValidateEmail;

use crate::cpf;
use crate::error::ErrorKind;

pub const ID_LENGTH: usize = 36;
pub const NAME_MAX_LENGTH: usize = 100;
pub const EMAIL_MAX_LENGTH: usize = 100;
/// Wire format of creation and edition timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Field-shape rule a user value failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("The user ID is not a valid UUID")]
    InvalidId,
    #[error("The user name cannot be empty")]
    EmptyName,
    #[error("The user name exceeds the max length")]
    NameTooLong,
    #[error("The user name is not valid")]
    NameInvalid,
    #[error("The user email cannot be empty")]
    EmptyEmail,
    #[error("The user email exceeds the max length")]
    EmailTooLong,
    #[error("The user email is not valid")]
    EmailInvalid,
    #[error("The user cpf cannot be empty")]
    EmptyCpf,
    #[error("The user cpf is not valid")]
    CpfInvalid,
    #[error("The user date creation cannot be empty")]
    EmptyDateCreation,
    #[error("The user date creation is not in a valid format")]
    DateCreationFormat,
    #[error("The user date edition cannot be empty")]
    EmptyDateEdition,
    #[error("The user date edition is not in a valid format")]
    DateEditionFormat,
    #[error("There is no data to update")]
    NothingToUpdate,
}

impl UserValidationError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }
}

pub(crate) fn validate_id(value: &str) -> Result<String, UserValidationError> {
    let value = value.trim();
    if value.len() != ID_LENGTH || uuid::Uuid::try_parse(value).is_err() {
        return Err(UserValidationError::InvalidId);
    }
    Ok(value.to_ascii_lowercase())
}

pub(crate) fn validate_name(value: &str) -> Result<String, UserValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(UserValidationError::EmptyName);
    }
    if value.chars().count() > NAME_MAX_LENGTH {
        return Err(UserValidationError::NameTooLong);
    }
    if value.chars().any(char::is_control) {
        return Err(UserValidationError::NameInvalid);
    }
    Ok(value.to_string())
}

pub(crate) fn validate_email(value: &str) -> Result<String, UserValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(UserValidationError::EmptyEmail);
    }
    if value.chars().count() > EMAIL_MAX_LENGTH {
        return Err(UserValidationError::EmailTooLong);
    }
    if !value.to_owned().validate_email() {
        return Err(UserValidationError::EmailInvalid);
    }
    Ok(value.to_string())
}

pub(crate) fn validate_cpf(value: &str) -> Result<String, UserValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(UserValidationError::EmptyCpf);
    }
    if !cpf::is_valid(value) {
        return Err(UserValidationError::CpfInvalid);
    }
    Ok(value.to_string())
}

pub(crate) fn parse_date_creation(value: &str) -> Result<NaiveDateTime, UserValidationError> {
    parse_timestamp(
        value,
        UserValidationError::EmptyDateCreation,
        UserValidationError::DateCreationFormat,
    )
}

pub(crate) fn parse_date_edition(value: &str) -> Result<NaiveDateTime, UserValidationError> {
    parse_timestamp(
        value,
        UserValidationError::EmptyDateEdition,
        UserValidationError::DateEditionFormat,
    )
}

fn parse_timestamp(
    value: &str,
    empty: UserValidationError,
    malformed: UserValidationError,
) -> Result<NaiveDateTime, UserValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(empty);
    }
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).map_err(|_| malformed)
}

pub(crate) fn format_timestamp(value: &NaiveDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

use crate::config::ConfigError;
use crate::eligibility::EligibilityError;
use crate::employees::EmployeeValidationError;
use crate::spreadsheet::SpreadsheetError;
use crate::tabular::CsvError;
use crate::telemetry::TelemetryError;
use crate::users::{RepositoryError, UserServiceError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use std::fmt;

/// Transport-independent classification of domain failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A field failed its shape rule (empty, too long, malformed, bad checksum).
    Validation,
    /// A cpf or email already belongs to another live record.
    Duplicate,
    NotFound,
    /// Rejected upload or CSV content.
    MalformedInput,
    /// A batch holding anything but fully built users.
    BatchComposition,
    /// The backing store failed.
    Unavailable,
}

impl ErrorKind {
    pub const fn status_code(self) -> StatusCode {
        match self {
            ErrorKind::Validation | ErrorKind::MalformedInput | ErrorKind::BatchComposition => {
                StatusCode::BAD_REQUEST
            }
            ErrorKind::Duplicate => StatusCode::CONFLICT,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Unavailable => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Users(UserServiceError),
    Spreadsheet(SpreadsheetError),
    Eligibility(EligibilityError),
    Csv(CsvError),
    Employees(EmployeeValidationError),
    Storage(RepositoryError),
}

impl AppError {
    /// Domain classification, `None` for process-level failures.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            AppError::Users(err) => Some(err.kind()),
            AppError::Spreadsheet(err) => Some(err.kind()),
            AppError::Eligibility(err) => Some(err.kind()),
            AppError::Csv(err) => Some(err.kind()),
            AppError::Employees(err) => Some(err.kind()),
            AppError::Storage(err) => Some(err.kind()),
            AppError::Config(_) | AppError::Telemetry(_) | AppError::Io(_) => None,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Users(err) => write!(f, "{}", err),
            AppError::Spreadsheet(err) => write!(f, "{}", err),
            AppError::Eligibility(err) => write!(f, "{}", err),
            AppError::Csv(err) => write!(f, "{}", err),
            AppError::Employees(err) => write!(f, "{}", err),
            AppError::Storage(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Users(err) => Some(err),
            AppError::Spreadsheet(err) => Some(err),
            AppError::Eligibility(err) => Some(err),
            AppError::Csv(err) => Some(err),
            AppError::Employees(err) => Some(err),
            AppError::Storage(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self.kind() {
            Some(kind) => kind.status_code(),
            None => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<UserServiceError> for AppError {
    fn from(value: UserServiceError) -> Self {
        Self::Users(value)
    }
}

impl From<SpreadsheetError> for AppError {
    fn from(value: SpreadsheetError) -> Self {
        Self::Spreadsheet(value)
    }
}

impl From<EligibilityError> for AppError {
    fn from(value: EligibilityError) -> Self {
        Self::Eligibility(value)
    }
}

impl From<CsvError> for AppError {
    fn from(value: CsvError) -> Self {
        Self::Csv(value)
    }
}

impl From<EmployeeValidationError> for AppError {
    fn from(value: EmployeeValidationError) -> Self {
        Self::Employees(value)
    }
}

impl From<RepositoryError> for AppError {
    fn from(value: RepositoryError) -> Self {
        Self::Storage(value)
    }
}

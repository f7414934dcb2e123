//! Bulk user import and export over the `name,cpf,email` CSV contract.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::ErrorKind;
use crate::ids::IdGenerator;
use crate::tabular::{encode, CsvError, CsvRow, CsvUpload};
use crate::users::validation::format_timestamp;
use crate::users::{User, UserRepository, UserService, UserServiceError};

/// Column contract shared by import and export.
pub const HEADERS: [&str; 3] = ["name", "cpf", "email"];

/// Result of a persisted import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub created_users: usize,
    pub date_time: String,
}

pub struct UserSpreadsheet<R, G> {
    users: Arc<UserService<R, G>>,
}

impl<R, G> UserSpreadsheet<R, G>
where
    R: UserRepository + 'static,
    G: IdGenerator + 'static,
{
    pub fn new(users: Arc<UserService<R, G>>) -> Self {
        Self { users }
    }

    /// Turn every row of `upload` into a new user without persisting anything.
    ///
    /// The first row that fails validation, or whose cpf or email is already
    /// taken in the store or by an earlier row, aborts the whole import.
    pub fn build_users(&self, upload: &CsvUpload) -> Result<Vec<User>, SpreadsheetError> {
        let rows = upload.decode(&HEADERS)?;

        let mut seen_cpfs = HashSet::new();
        let mut seen_emails = HashSet::new();
        let mut users = Vec::with_capacity(rows.len());

        for row in &rows {
            let user = self
                .build_row(row, &seen_cpfs, &seen_emails)
                .map_err(|source| {
                    warn!(line = row.line_number, reason = %source, "spreadsheet row rejected");
                    SpreadsheetError::Row {
                        line: row.line_number,
                        source,
                    }
                })?;

            if let Some(cpf) = user.cpf() {
                seen_cpfs.insert(cpf.to_string());
            }
            if let Some(email) = user.email() {
                seen_emails.insert(email.to_ascii_lowercase());
            }
            users.push(user);
        }

        Ok(users)
    }

    fn build_row(
        &self,
        row: &CsvRow,
        seen_cpfs: &HashSet<String>,
        seen_emails: &HashSet<String>,
    ) -> Result<User, UserServiceError> {
        let name = normalize_name(row.get("name").unwrap_or_default());
        let user = self.users.build_user(
            &name,
            row.get("email").unwrap_or_default(),
            row.get("cpf").unwrap_or_default(),
        )?;

        if user.cpf().is_some_and(|cpf| seen_cpfs.contains(cpf)) {
            return Err(UserServiceError::DuplicateCpf);
        }
        self.users.verify_cpf_available(&user)?;

        if user
            .email()
            .is_some_and(|email| seen_emails.contains(&email.to_ascii_lowercase()))
        {
            return Err(UserServiceError::DuplicateEmail);
        }
        self.users.verify_email_available(&user)?;

        Ok(user)
    }

    /// Build and persist in one step.
    pub fn import(&self, upload: &CsvUpload) -> Result<ImportSummary, SpreadsheetError> {
        let users = self.build_users(upload)?;
        let created_users = self.users.create_from_batch(&users)?;

        info!(created_users, "spreadsheet imported");
        Ok(ImportSummary {
            created_users,
            date_time: format_timestamp(&self.users.now()),
        })
    }

    /// Every live user as `name,cpf,email` lines.
    pub fn export(&self) -> Result<String, SpreadsheetError> {
        let users = self.users.find_all()?;
        Ok(render(&users)?)
    }
}

/// Encode `users` under the import header, one line per user.
pub fn render(users: &[User]) -> Result<String, CsvError> {
    let rows: Vec<Vec<String>> = users
        .iter()
        .map(|user| {
            vec![
                user.name().unwrap_or_default().to_string(),
                user.cpf().unwrap_or_default().to_string(),
                user.email().unwrap_or_default().to_string(),
            ]
        })
        .collect();
    encode(&HEADERS, &rows)
}

/// Drop BOM and zero-width characters and collapse runs of whitespace.
pub(crate) fn normalize_name(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug, thiserror::Error)]
pub enum SpreadsheetError {
    #[error(transparent)]
    Csv(#[from] CsvError),
    #[error("Spreadsheet error: line {line} | {source}")]
    Row {
        line: u64,
        #[source]
        source: UserServiceError,
    },
    #[error(transparent)]
    Users(#[from] UserServiceError),
}

impl SpreadsheetError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SpreadsheetError::Csv(err) => err.kind(),
            SpreadsheetError::Row { source, .. } => source.kind(),
            SpreadsheetError::Users(err) => err.kind(),
        }
    }
}

use chrono::NaiveDateTime;

use super::domain::{User, UserChanges};
use crate::error::ErrorKind;

/// Storage contract for users. Every method sees live (not soft-deleted) records only.
pub trait UserRepository: Send + Sync {
    fn create(&self, user: &User) -> Result<(), RepositoryError>;

    /// Persist a validated batch. Adapters with transactions should make this
    /// all-or-nothing; the default writes one record at a time.
    fn create_batch(&self, users: &[User]) -> Result<(), RepositoryError> {
        for user in users {
            self.create(user)?;
        }
        Ok(())
    }

    /// Whether another live user (different id) already holds `user`'s cpf.
    fn is_cpf_already_created(&self, user: &User) -> Result<bool, RepositoryError>;

    /// Whether another live user (different id) already holds `user`'s email.
    fn is_email_already_created(&self, user: &User) -> Result<bool, RepositoryError>;

    fn find_all(&self) -> Result<Vec<User>, RepositoryError>;
    fn find_by_id(&self, id: &str) -> Result<Option<User>, RepositoryError>;

    /// Soft delete: the record stays stored but disappears from every query.
    fn delete_by_id(&self, user: &User, deleted_at: NaiveDateTime) -> Result<(), RepositoryError>;

    fn update_by_id(&self, user: &User, changes: &UserChanges) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

impl RepositoryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RepositoryError::Conflict => ErrorKind::Duplicate,
            RepositoryError::NotFound => ErrorKind::NotFound,
            RepositoryError::Unavailable(_) => ErrorKind::Unavailable,
        }
    }
}

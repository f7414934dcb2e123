use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::{debug, info};

use super::domain::{User, UserPatch};
use super::repository::{RepositoryError, UserRepository};
use super::validation::{validate_id, UserValidationError};
use crate::error::ErrorKind;
use crate::ids::{Clock, IdGenerator, SystemClock};

/// Service composing validated user construction with the injected store.
pub struct UserService<R, G> {
    repository: Arc<R>,
    ids: Arc<G>,
    clock: Arc<dyn Clock>,
}

impl<R, G> UserService<R, G>
where
    R: UserRepository + 'static,
    G: IdGenerator + 'static,
{
    pub fn new(repository: Arc<R>, ids: Arc<G>) -> Self {
        Self::with_clock(repository, ids, Arc::new(SystemClock))
    }

    pub fn with_clock(repository: Arc<R>, ids: Arc<G>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            ids,
            clock,
        }
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    /// Run the setter chain for a new user: fields, fresh id, creation stamp.
    /// Nothing is persisted and uniqueness is not checked.
    pub fn build_user(
        &self,
        name: &str,
        email: &str,
        cpf: &str,
    ) -> Result<User, UserValidationError> {
        let mut user = User::new();
        user.set_name(name)?
            .set_cpf(cpf)?
            .set_email(email)?
            .generate_id(self.ids.as_ref())?
            .stamp_creation(self.clock.now());
        Ok(user)
    }

    pub fn verify_cpf_available(&self, user: &User) -> Result<(), UserServiceError> {
        if self.repository.is_cpf_already_created(user)? {
            return Err(UserServiceError::DuplicateCpf);
        }
        Ok(())
    }

    pub fn verify_email_available(&self, user: &User) -> Result<(), UserServiceError> {
        if self.repository.is_email_already_created(user)? {
            return Err(UserServiceError::DuplicateEmail);
        }
        Ok(())
    }

    /// Persist one fully built user after both uniqueness checks pass.
    pub fn create(&self, user: User) -> Result<User, UserServiceError> {
        if let Some(field) = user.missing_field() {
            return Err(UserServiceError::Incomplete(field));
        }

        self.verify_cpf_available(&user)?;
        self.verify_email_available(&user)?;
        self.repository.create(&user)?;

        debug!(user_id = ?user.id(), "user created");
        Ok(user)
    }

    pub fn find_all(&self) -> Result<Vec<User>, UserServiceError> {
        Ok(self.repository.find_all()?)
    }

    pub fn find_by_id(&self, id: &str) -> Result<User, UserServiceError> {
        let id = validate_id(id)?;
        self.repository
            .find_by_id(&id)?
            .ok_or(UserServiceError::NotFound)
    }

    /// Soft-delete the user and hand back the record as it was.
    pub fn delete_by_id(&self, id: &str) -> Result<User, UserServiceError> {
        let user = self.find_by_id(id)?;
        self.repository.delete_by_id(&user, self.clock.now())?;

        info!(user_id = ?user.id(), "user deleted");
        Ok(user)
    }

    /// Apply the supplied patch fields, each under its creation rule, and
    /// return the stored result.
    pub fn update_by_id(&self, id: &str, patch: &UserPatch) -> Result<User, UserServiceError> {
        let user = self.find_by_id(id)?;
        let (patched, changes) = patch.validate_against(&user, self.clock.now())?;

        if changes.cpf.is_some() {
            self.verify_cpf_available(&patched)?;
        }
        if changes.email.is_some() {
            self.verify_email_available(&patched)?;
        }

        self.repository.update_by_id(&user, &changes)?;
        debug!(user_id = ?user.id(), "user updated");

        match user.id() {
            Some(id) => self.find_by_id(id),
            None => Err(UserServiceError::NotFound),
        }
    }

    /// Persist a batch of users built elsewhere (the spreadsheet import).
    ///
    /// The whole batch is inspected before the first write: any element that
    /// is not a fully built user rejects the batch and nothing is stored.
    pub fn create_from_batch(&self, users: &[User]) -> Result<usize, UserServiceError> {
        for (index, user) in users.iter().enumerate() {
            if let Some(field) = user.missing_field() {
                return Err(UserServiceError::BatchComposition { index, field });
            }
        }

        self.repository.create_batch(users)?;
        info!(count = users.len(), "user batch persisted");
        Ok(users.len())
    }
}

/// Error raised by the user service.
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    #[error(transparent)]
    Validation(#[from] UserValidationError),
    #[error("CPF already created")]
    DuplicateCpf,
    #[error("Email already created")]
    DuplicateEmail,
    #[error("The user does not exist")]
    NotFound,
    #[error("The user is missing its {0}")]
    Incomplete(&'static str),
    #[error("The users array must have only users (item {index} has no {field})")]
    BatchComposition { index: usize, field: &'static str },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl UserServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            UserServiceError::Validation(_) | UserServiceError::Incomplete(_) => {
                ErrorKind::Validation
            }
            UserServiceError::DuplicateCpf | UserServiceError::DuplicateEmail => {
                ErrorKind::Duplicate
            }
            UserServiceError::NotFound => ErrorKind::NotFound,
            UserServiceError::BatchComposition { .. } => ErrorKind::BatchComposition,
            UserServiceError::Repository(err) => err.kind(),
        }
    }
}

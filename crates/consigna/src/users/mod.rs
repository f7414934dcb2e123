//! User records: validated construction, storage contract and service operations.

pub mod domain;
pub mod repository;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use domain::{User, UserChanges, UserPatch, UserView};
pub use repository::{RepositoryError, UserRepository};
pub use service::{UserService, UserServiceError};
pub use validation::{UserValidationError, TIMESTAMP_FORMAT};

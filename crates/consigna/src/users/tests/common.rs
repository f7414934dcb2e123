use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};

use crate::ids::{Clock, IdGenerator};
use crate::storage::InMemoryUserStore;
use crate::users::{RepositoryError, User, UserChanges, UserRepository, UserService};

/// Deterministic ids: `00000000-0000-4000-8000-000000000001`, `...002`, ...
#[derive(Debug, Default)]
pub(super) struct SequentialIds {
    next: AtomicU64,
}

impl IdGenerator for SequentialIds {
    fn generate(&self) -> String {
        let id = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        format!("00000000-0000-4000-8000-{id:012}")
    }
}

#[derive(Debug, Clone, Copy)]
pub(super) struct FixedClock(pub(super) NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

pub(super) fn timestamp(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, day)
        .and_then(|date| date.and_hms_opt(hour, 0, 0))
        .expect("valid timestamp")
}

pub(super) fn service_at(
    store: Arc<InMemoryUserStore>,
    now: NaiveDateTime,
) -> UserService<InMemoryUserStore, SequentialIds> {
    UserService::with_clock(
        store,
        Arc::new(SequentialIds::default()),
        Arc::new(FixedClock(now)),
    )
}

pub(super) fn service() -> (
    Arc<InMemoryUserStore>,
    UserService<InMemoryUserStore, SequentialIds>,
) {
    let store = Arc::new(InMemoryUserStore::new());
    let service = service_at(store.clone(), timestamp(1, 9));
    (store, service)
}

pub(super) fn ana() -> (&'static str, &'static str, &'static str) {
    ("Ana Souza", "ana@example.com", "48472338088")
}

pub(super) fn bruno() -> (&'static str, &'static str, &'static str) {
    ("Bruno Lima", "bruno@example.com", "16742019077")
}

pub(super) fn create(
    service: &UserService<InMemoryUserStore, SequentialIds>,
    (name, email, cpf): (&str, &str, &str),
) -> User {
    let user = service.build_user(name, email, cpf).expect("valid user");
    service.create(user).expect("user stored")
}

/// Store whose backend is always down.
#[derive(Debug, Default)]
pub(super) struct OfflineStore;

impl UserRepository for OfflineStore {
    fn create(&self, _user: &User) -> Result<(), RepositoryError> {
        Err(offline())
    }

    fn is_cpf_already_created(&self, _user: &User) -> Result<bool, RepositoryError> {
        Err(offline())
    }

    fn is_email_already_created(&self, _user: &User) -> Result<bool, RepositoryError> {
        Err(offline())
    }

    fn find_all(&self) -> Result<Vec<User>, RepositoryError> {
        Err(offline())
    }

    fn find_by_id(&self, _id: &str) -> Result<Option<User>, RepositoryError> {
        Err(offline())
    }

    fn delete_by_id(&self, _user: &User, _at: NaiveDateTime) -> Result<(), RepositoryError> {
        Err(offline())
    }

    fn update_by_id(&self, _user: &User, _changes: &UserChanges) -> Result<(), RepositoryError> {
        Err(offline())
    }
}

fn offline() -> RepositoryError {
    RepositoryError::Unavailable("connection refused".to_string())
}

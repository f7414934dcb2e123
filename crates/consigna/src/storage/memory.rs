use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDateTime;

use crate::employees::{Employee, EmployeeRepository};
use crate::users::{RepositoryError, User, UserChanges, UserRepository};

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    deleted_at: Option<NaiveDateTime>,
}

impl StoredUser {
    fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// Live users only. Every read goes through here so soft-deleted rows stay invisible.
fn live(records: &[StoredUser]) -> impl Iterator<Item = &User> {
    records
        .iter()
        .filter(|record| record.is_live())
        .map(|record| &record.user)
}

fn live_mut<'a>(records: &'a mut [StoredUser], id: &str) -> Option<&'a mut StoredUser> {
    records
        .iter_mut()
        .find(|record| record.is_live() && record.user.id() == Some(id))
}

fn same_email(left: Option<&str>, right: Option<&str>) -> bool {
    matches!((left, right), (Some(left), Some(right)) if left.eq_ignore_ascii_case(right))
}

fn cpf_taken<'a>(mut users: impl Iterator<Item = &'a User>, candidate: &User) -> bool {
    users.any(|user| {
        user.id() != candidate.id() && candidate.cpf().is_some() && user.cpf() == candidate.cpf()
    })
}

fn email_taken<'a>(mut users: impl Iterator<Item = &'a User>, candidate: &User) -> bool {
    users.any(|user| user.id() != candidate.id() && same_email(user.email(), candidate.email()))
}

/// Process-local user store with soft delete.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserStore {
    records: Arc<Mutex<Vec<StoredUser>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<StoredUser>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("user store lock poisoned".to_string()))
    }

    /// Rows held, soft-deleted ones included.
    pub fn stored_count(&self) -> Result<usize, RepositoryError> {
        Ok(self.lock()?.len())
    }

    fn admit(records: &[StoredUser], user: &User) -> Result<(), RepositoryError> {
        let id_taken = records.iter().any(|record| record.user.id() == user.id());
        if id_taken || cpf_taken(live(records), user) || email_taken(live(records), user) {
            return Err(RepositoryError::Conflict);
        }
        Ok(())
    }
}

impl UserRepository for InMemoryUserStore {
    fn create(&self, user: &User) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        Self::admit(&guard, user)?;
        guard.push(StoredUser {
            user: user.clone(),
            deleted_at: None,
        });
        Ok(())
    }

    /// All or nothing: every user is checked against the store and the rest of
    /// the batch before the first one is inserted.
    fn create_batch(&self, users: &[User]) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        for (index, user) in users.iter().enumerate() {
            Self::admit(&guard, user)?;
            let earlier = users[..index].iter();
            if earlier.clone().any(|other| other.id() == user.id())
                || cpf_taken(earlier.clone(), user)
                || email_taken(earlier, user)
            {
                return Err(RepositoryError::Conflict);
            }
        }

        guard.extend(users.iter().map(|user| StoredUser {
            user: user.clone(),
            deleted_at: None,
        }));
        Ok(())
    }

    fn is_cpf_already_created(&self, user: &User) -> Result<bool, RepositoryError> {
        let guard = self.lock()?;
        let taken = cpf_taken(live(&guard), user);
        Ok(taken)
    }

    fn is_email_already_created(&self, user: &User) -> Result<bool, RepositoryError> {
        let guard = self.lock()?;
        let taken = email_taken(live(&guard), user);
        Ok(taken)
    }

    fn find_all(&self) -> Result<Vec<User>, RepositoryError> {
        let guard = self.lock()?;
        let users = live(&guard).cloned().collect();
        Ok(users)
    }

    fn find_by_id(&self, id: &str) -> Result<Option<User>, RepositoryError> {
        let guard = self.lock()?;
        let found = live(&guard).find(|user| user.id() == Some(id)).cloned();
        Ok(found)
    }

    fn delete_by_id(&self, user: &User, deleted_at: NaiveDateTime) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        let id = user.id().ok_or(RepositoryError::NotFound)?;
        let record = live_mut(&mut guard, id).ok_or(RepositoryError::NotFound)?;
        record.deleted_at = Some(deleted_at);
        Ok(())
    }

    /// Uniqueness is checked again under the lock, so two racing updates
    /// cannot both claim the same cpf or email.
    fn update_by_id(&self, user: &User, changes: &UserChanges) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        let id = user.id().ok_or(RepositoryError::NotFound)?;
        let mut patched = live_mut(&mut guard, id)
            .ok_or(RepositoryError::NotFound)?
            .user
            .clone();
        patched.apply_changes(changes);

        if cpf_taken(live(&guard), &patched) || email_taken(live(&guard), &patched) {
            return Err(RepositoryError::Conflict);
        }

        if let Some(record) = live_mut(&mut guard, id) {
            record.user = patched;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct StoredEmployee {
    employee: Employee,
    deleted_at: Option<NaiveDateTime>,
}

/// Process-local employee store, filled by seeding.
#[derive(Debug, Default, Clone)]
pub struct InMemoryEmployeeStore {
    records: Arc<Mutex<Vec<StoredEmployee>>>,
}

impl InMemoryEmployeeStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<StoredEmployee>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("employee store lock poisoned".to_string()))
    }

    /// One live employee record per user.
    pub fn insert(&self, employee: Employee) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        let taken = guard.iter().any(|record| {
            record.employee.id() == employee.id()
                || (record.deleted_at.is_none()
                    && record.employee.user_id() == employee.user_id())
        });
        if taken {
            return Err(RepositoryError::Conflict);
        }
        guard.push(StoredEmployee {
            employee,
            deleted_at: None,
        });
        Ok(())
    }

    pub fn delete_by_id(&self, id: &str, deleted_at: NaiveDateTime) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        let record = guard
            .iter_mut()
            .find(|record| record.deleted_at.is_none() && record.employee.id() == id)
            .ok_or(RepositoryError::NotFound)?;
        record.deleted_at = Some(deleted_at);
        Ok(())
    }
}

impl EmployeeRepository for InMemoryEmployeeStore {
    fn find_by_user_id(&self, user_id: &str) -> Result<Option<Employee>, RepositoryError> {
        let guard = self.lock()?;
        let found = guard
            .iter()
            .filter(|record| record.deleted_at.is_none())
            .map(|record| &record.employee)
            .find(|employee| employee.is_active() && employee.user_id() == user_id)
            .cloned();
        Ok(found)
    }
}

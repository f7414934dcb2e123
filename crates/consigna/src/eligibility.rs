//! Consigned-credit eligibility from time in the job.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::employees::EmployeeRepository;
use crate::error::ErrorKind;
use crate::ids::{Clock, SystemClock};
use crate::users::validation::validate_id;
use crate::users::{RepositoryError, UserRepository, UserValidationError};

/// Window of whole months in the job that qualifies for credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityPolicy {
    pub minimum_months: u32,
    pub maximum_months: u32,
}

impl Default for EligibilityPolicy {
    fn default() -> Self {
        Self {
            minimum_months: 6,
            maximum_months: 120,
        }
    }
}

impl EligibilityPolicy {
    pub fn evaluate(&self, hire_date: NaiveDate, today: NaiveDate) -> EligibilityVerdict {
        let months = months_elapsed(hire_date, today);
        if months < i64::from(self.minimum_months) {
            EligibilityVerdict::InsufficientTime
        } else if months > i64::from(self.maximum_months) {
            EligibilityVerdict::ExceedsLimit
        } else {
            EligibilityVerdict::Eligible
        }
    }

    fn message(&self, verdict: EligibilityVerdict) -> String {
        match verdict {
            EligibilityVerdict::Eligible => "Employee is eligible for consigned credit.".to_string(),
            EligibilityVerdict::InsufficientTime => format!(
                "Employee does not have sufficient time in the job (minimum of {} months).",
                self.minimum_months
            ),
            EligibilityVerdict::ExceedsLimit => format!(
                "Employee exceeds the permitted time limit for admission ({}).",
                describe_months(self.maximum_months)
            ),
        }
    }
}

fn describe_months(months: u32) -> String {
    match (months / 12, months % 12) {
        (1, 0) => "1 year".to_string(),
        (years, 0) => format!("{years} years"),
        _ => format!("{months} months"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityVerdict {
    Eligible,
    InsufficientTime,
    ExceedsLimit,
}

impl EligibilityVerdict {
    pub fn is_eligible(self) -> bool {
        matches!(self, EligibilityVerdict::Eligible)
    }
}

/// Whole calendar months from `from` to `to`; negative when `to` comes first.
///
/// A month only counts once its day of month is reached, so 2024-01-31 to
/// 2024-02-29 is zero months.
pub fn months_elapsed(from: NaiveDate, to: NaiveDate) -> i64 {
    let mut months = i64::from(to.year() - from.year()) * 12 + i64::from(to.month())
        - i64::from(from.month());
    if months > 0 && to.day() < from.day() {
        months -= 1;
    } else if months < 0 && to.day() > from.day() {
        months += 1;
    }
    months
}

/// Answer returned to callers of the eligibility check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EligibilityOutcome {
    pub eligible: bool,
    pub message: String,
    #[serde(skip)]
    pub verdict: EligibilityVerdict,
}

pub struct EligibilityService<U, E> {
    users: Arc<U>,
    employees: Arc<E>,
    policy: EligibilityPolicy,
    clock: Arc<dyn Clock>,
}

impl<U, E> EligibilityService<U, E>
where
    U: UserRepository + 'static,
    E: EmployeeRepository + 'static,
{
    pub fn new(users: Arc<U>, employees: Arc<E>, policy: EligibilityPolicy) -> Self {
        Self::with_clock(users, employees, policy, Arc::new(SystemClock))
    }

    pub fn with_clock(
        users: Arc<U>,
        employees: Arc<E>,
        policy: EligibilityPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            employees,
            policy,
            clock,
        }
    }

    pub fn policy(&self) -> EligibilityPolicy {
        self.policy
    }

    pub fn check(&self, user_id: &str) -> Result<EligibilityOutcome, EligibilityError> {
        self.check_on(user_id, self.clock.now().date())
    }

    /// Look up the user, then its active employee record, then apply the policy at `today`.
    pub fn check_on(
        &self,
        user_id: &str,
        today: NaiveDate,
    ) -> Result<EligibilityOutcome, EligibilityError> {
        let user_id = validate_id(user_id)?;
        if self.users.find_by_id(&user_id)?.is_none() {
            return Err(EligibilityError::UserNotFound);
        }

        let employee = self
            .employees
            .find_by_user_id(&user_id)?
            .ok_or(EligibilityError::EmployeeNotFound)?;

        let verdict = self.policy.evaluate(employee.hire_date(), today);
        debug!(%user_id, ?verdict, "eligibility evaluated");

        Ok(EligibilityOutcome {
            eligible: verdict.is_eligible(),
            message: self.policy.message(verdict),
            verdict,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EligibilityError {
    #[error(transparent)]
    InvalidUserId(#[from] UserValidationError),
    #[error("The user does not exist")]
    UserNotFound,
    #[error("Employee not active in any partner company.")]
    EmployeeNotFound,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl EligibilityError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EligibilityError::InvalidUserId(_) => ErrorKind::Validation,
            EligibilityError::UserNotFound | EligibilityError::EmployeeNotFound => {
                ErrorKind::NotFound
            }
            EligibilityError::Repository(err) => err.kind(),
        }
    }
}

//! Employees of partner companies, read by the eligibility check.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::error::ErrorKind;
use crate::ids::IdGenerator;
use crate::users::validation::validate_id;
use crate::users::RepositoryError;

pub const HIRE_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmployeeValidationError {
    #[error("The employee ID is not a valid UUID")]
    InvalidId,
    #[error("The employee user ID is not a valid UUID")]
    InvalidUserId,
    #[error("The employee company ID is not a valid UUID")]
    InvalidCompanyId,
    #[error("The employee hire date cannot be empty")]
    EmptyHireDate,
    #[error("The employee hire date is not in a valid format")]
    HireDateFormat,
}

impl EmployeeValidationError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }
}

/// Employment link between a user and a partner company.
///
/// Built in one validated step since an employee without a hire date has no
/// meaning for the eligibility rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Employee {
    id: String,
    user_id: String,
    company_id: String,
    hire_date: NaiveDate,
    active: bool,
    date_creation: NaiveDateTime,
}

impl Employee {
    pub fn build(
        generator: &dyn IdGenerator,
        user_id: &str,
        company_id: &str,
        hire_date: &str,
        now: NaiveDateTime,
    ) -> Result<Self, EmployeeValidationError> {
        let id = validate_id(&generator.generate()).map_err(|_| EmployeeValidationError::InvalidId)?;
        let user_id = validate_id(user_id).map_err(|_| EmployeeValidationError::InvalidUserId)?;
        let company_id =
            validate_id(company_id).map_err(|_| EmployeeValidationError::InvalidCompanyId)?;

        Ok(Self {
            id,
            user_id,
            company_id,
            hire_date: parse_hire_date(hire_date)?,
            active: true,
            date_creation: now,
        })
    }

    pub fn set_active(&mut self, active: bool) -> &mut Self {
        self.active = active;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn hire_date(&self) -> NaiveDate {
        self.hire_date
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

fn parse_hire_date(value: &str) -> Result<NaiveDate, EmployeeValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(EmployeeValidationError::EmptyHireDate);
    }
    NaiveDate::parse_from_str(value, HIRE_DATE_FORMAT)
        .map_err(|_| EmployeeValidationError::HireDateFormat)
}

/// Read side of the employee store.
pub trait EmployeeRepository: Send + Sync {
    /// The active, not soft-deleted employee record of `user_id`, if any.
    fn find_by_user_id(&self, user_id: &str) -> Result<Option<Employee>, RepositoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedId(&'static str);

    impl IdGenerator for FixedId {
        fn generate(&self) -> String {
            self.0.to_string()
        }
    }

    const EMPLOYEE_ID: FixedId = FixedId("0b6f3c1e-9d7a-4f6b-8a9e-2c4d5e6f7a8b");
    const USER_ID: &str = "5d2a8f10-6c3b-4e9d-a1f2-3b4c5d6e7f80";
    const COMPANY_ID: &str = "a3e1b2c4-d5f6-4a7b-8c9d-0e1f2a3b4c5d";

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 15)
            .and_then(|date| date.and_hms_opt(9, 0, 0))
            .expect("valid timestamp")
    }

    #[test]
    fn build_validates_every_reference() {
        let employee = Employee::build(&EMPLOYEE_ID, USER_ID, COMPANY_ID, "2024-06-15", now())
            .expect("valid employee");
        assert_eq!(employee.user_id(), USER_ID);
        assert_eq!(
            employee.hire_date(),
            NaiveDate::from_ymd_opt(2024, 6, 15).expect("valid date")
        );
        assert!(employee.is_active());

        assert_eq!(
            Employee::build(&EMPLOYEE_ID, "user-1", COMPANY_ID, "2024-06-15", now()),
            Err(EmployeeValidationError::InvalidUserId)
        );
        assert_eq!(
            Employee::build(&EMPLOYEE_ID, USER_ID, "", "2024-06-15", now()),
            Err(EmployeeValidationError::InvalidCompanyId)
        );
        assert_eq!(
            Employee::build(&FixedId("nope"), USER_ID, COMPANY_ID, "2024-06-15", now()),
            Err(EmployeeValidationError::InvalidId)
        );
    }

    #[test]
    fn hire_dates_must_be_calendar_dates() {
        assert_eq!(
            Employee::build(&EMPLOYEE_ID, USER_ID, COMPANY_ID, "15/06/2020", now()),
            Err(EmployeeValidationError::HireDateFormat)
        );
        match Employee::build(&EMPLOYEE_ID, USER_ID, COMPANY_ID, " ", now()) {
            Err(err) => {
                assert_eq!(err, EmployeeValidationError::EmptyHireDate);
                assert_eq!(err.kind(), ErrorKind::Validation);
                assert_eq!(err.to_string(), "The employee hire date cannot be empty");
            }
            other => panic!("expected empty hire date, got {other:?}"),
        }

        let mut employee =
            Employee::build(&EMPLOYEE_ID, USER_ID, COMPANY_ID, " 2020-01-31 ", now())
                .expect("valid employee");
        employee.set_active(false);
        assert!(!employee.is_active());
        assert_eq!(
            employee.hire_date(),
            NaiveDate::from_ymd_opt(2020, 1, 31).expect("valid date")
        );
    }
}

//! Eligibility answers for seeded employees relative to a fixed "today".

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};

use consigna::eligibility::{
    EligibilityError, EligibilityPolicy, EligibilityService, EligibilityVerdict,
};
use consigna::employees::Employee;
use consigna::error::ErrorKind;
use consigna::ids::UuidV4Generator;
use consigna::storage::{InMemoryEmployeeStore, InMemoryUserStore};
use consigna::users::{UserRepository, UserService};

const COMPANY_ID: &str = "a3e1b2c4-d5f6-4a7b-8c9d-0e1f2a3b4c5d";

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).expect("valid date")
}

fn now() -> NaiveDateTime {
    today().and_hms_opt(8, 0, 0).expect("valid time")
}

struct Fixture {
    users: Arc<InMemoryUserStore>,
    employees: Arc<InMemoryEmployeeStore>,
    service: UserService<InMemoryUserStore, UuidV4Generator>,
}

impl Fixture {
    fn new() -> Self {
        let users = Arc::new(InMemoryUserStore::new());
        let service = UserService::new(users.clone(), Arc::new(UuidV4Generator));
        Self {
            users,
            employees: Arc::new(InMemoryEmployeeStore::new()),
            service,
        }
    }

    fn hire(&self, email: &str, cpf: &str, hire_date: &str) -> String {
        let user = self
            .service
            .build_user("Employee", email, cpf)
            .expect("valid user");
        let user = self.service.create(user).expect("stored");
        let user_id = user.id().expect("id").to_string();

        let employee = Employee::build(&UuidV4Generator, &user_id, COMPANY_ID, hire_date, now())
            .expect("valid employee");
        self.employees.insert(employee).expect("employee stored");
        user_id
    }

    fn eligibility(&self) -> EligibilityService<InMemoryUserStore, InMemoryEmployeeStore> {
        EligibilityService::new(
            self.users.clone(),
            self.employees.clone(),
            EligibilityPolicy::default(),
        )
    }
}

#[test]
fn verdicts_follow_time_in_the_job() {
    let fixture = Fixture::new();
    let five_months = fixture.hire("a@example.com", "48472338088", "2025-01-15");
    let eleven_years = fixture.hire("b@example.com", "16742019077", "2014-06-15");
    let one_year = fixture.hire("c@example.com", "94965217039", "2024-06-15");
    let service = fixture.eligibility();

    let outcome = service.check_on(&five_months, today()).expect("checked");
    assert!(!outcome.eligible);
    assert_eq!(outcome.verdict, EligibilityVerdict::InsufficientTime);
    assert_eq!(
        outcome.message,
        "Employee does not have sufficient time in the job (minimum of 6 months)."
    );

    let outcome = service.check_on(&eleven_years, today()).expect("checked");
    assert!(!outcome.eligible);
    assert_eq!(
        outcome.message,
        "Employee exceeds the permitted time limit for admission (10 years)."
    );

    let outcome = service.check_on(&one_year, today()).expect("checked");
    assert!(outcome.eligible);
    assert_eq!(outcome.message, "Employee is eligible for consigned credit.");

    let payload = serde_json::to_value(&outcome).expect("serializes");
    assert_eq!(
        payload,
        serde_json::json!({
            "eligible": true,
            "message": "Employee is eligible for consigned credit."
        })
    );
}

#[test]
fn missing_user_or_employee_is_not_found() {
    let fixture = Fixture::new();
    let service = fixture.eligibility();

    match service.check_on("6f1c2d9e-3b4a-4c5d-8e7f-0a1b2c3d4e5f", today()) {
        Err(err @ EligibilityError::UserNotFound) => {
            assert_eq!(err.to_string(), "The user does not exist");
            assert_eq!(err.kind(), ErrorKind::NotFound);
        }
        other => panic!("expected missing user, got {other:?}"),
    }

    let user = fixture
        .service
        .build_user("Unemployed", "free@example.com", "52998224725")
        .expect("valid user");
    let user = fixture.service.create(user).expect("stored");
    match service.check_on(user.id().expect("id"), today()) {
        Err(err @ EligibilityError::EmployeeNotFound) => {
            assert_eq!(err.to_string(), "Employee not active in any partner company.");
        }
        other => panic!("expected missing employee, got {other:?}"),
    }

    assert!(matches!(
        service.check_on("not-a-uuid", today()),
        Err(EligibilityError::InvalidUserId(_))
    ));
}

#[test]
fn deleted_users_are_not_checked() {
    let fixture = Fixture::new();
    let user_id = fixture.hire("d@example.com", "11144477735", "2024-06-15");
    fixture.service.delete_by_id(&user_id).expect("deleted");

    assert!(fixture.users.find_by_id(&user_id).expect("lookup").is_none());
    assert!(matches!(
        fixture.eligibility().check_on(&user_id, today()),
        Err(EligibilityError::UserNotFound)
    ));
}

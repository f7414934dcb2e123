use chrono::NaiveDate;
use consigna::eligibility::{EligibilityPolicy, EligibilityService};
use consigna::ids::UuidV4Generator;
use consigna::spreadsheet::UserSpreadsheet;
use consigna::storage::{InMemoryEmployeeStore, InMemoryUserStore};
use consigna::users::UserService;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub(crate) type Users = UserService<InMemoryUserStore, UuidV4Generator>;
pub(crate) type Spreadsheet = UserSpreadsheet<InMemoryUserStore, UuidV4Generator>;
pub(crate) type Eligibility = EligibilityService<InMemoryUserStore, InMemoryEmployeeStore>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Domain services wired over the in-memory stores.
#[derive(Clone)]
pub(crate) struct Services {
    pub(crate) users: Arc<Users>,
    pub(crate) spreadsheet: Arc<Spreadsheet>,
    pub(crate) eligibility: Arc<Eligibility>,
    pub(crate) employee_store: Arc<InMemoryEmployeeStore>,
}

impl Services {
    pub(crate) fn in_memory(policy: EligibilityPolicy) -> Self {
        let user_store = Arc::new(InMemoryUserStore::new());
        let employee_store = Arc::new(InMemoryEmployeeStore::new());

        let users = Arc::new(UserService::new(
            user_store.clone(),
            Arc::new(UuidV4Generator),
        ));
        let spreadsheet = Arc::new(UserSpreadsheet::new(users.clone()));
        let eligibility = Arc::new(EligibilityService::new(
            user_store,
            employee_store.clone(),
            policy,
        ));

        Self {
            users,
            spreadsheet,
            eligibility,
            employee_store,
        }
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

//! User registry with CPF validation, CSV bulk import and consigned-credit eligibility.

pub mod config;
pub mod cpf;
pub mod eligibility;
pub mod employees;
pub mod error;
pub mod ids;
pub mod spreadsheet;
pub mod storage;
pub mod tabular;
pub mod telemetry;
pub mod users;

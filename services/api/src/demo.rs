use crate::infra::Services;
use chrono::{Local, Months, NaiveDate};
use clap::Args;
use consigna::eligibility::EligibilityPolicy;
use consigna::employees::Employee;
use consigna::error::AppError;
use consigna::ids::{IdGenerator, UuidV4Generator};
use consigna::tabular::CsvUpload;
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reference date for eligibility (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct ImportArgs {
    /// CSV file with `name,cpf,email` columns
    pub(crate) path: PathBuf,
    /// MIME type to gate the upload with; guessed from the extension when absent
    #[arg(long)]
    pub(crate) mime_type: Option<String>,
}

struct PartnerCompany {
    id: String,
    name: &'static str,
}

struct SeedProfile {
    name: &'static str,
    email: &'static str,
    cpf: &'static str,
    months_in_job: u32,
    active: bool,
    archived: bool,
}

const PROFILES: [SeedProfile; 8] = [
    SeedProfile {
        name: "Ana Souza",
        email: "ana.souza@empresa-a.com.br",
        cpf: "48472338088",
        months_in_job: 12,
        active: true,
        archived: false,
    },
    SeedProfile {
        name: "Bruno Lima",
        email: "bruno.lima@empresa-a.com.br",
        cpf: "16742019077",
        months_in_job: 8,
        active: true,
        archived: false,
    },
    SeedProfile {
        name: "Carla Dias",
        email: "carla.dias@empresa-a.com.br",
        cpf: "94965217039",
        months_in_job: 24,
        active: false,
        archived: false,
    },
    SeedProfile {
        name: "Diego Alves",
        email: "diego.alves@empresa-b.com.br",
        cpf: "52998224725",
        months_in_job: 5,
        active: true,
        archived: false,
    },
    SeedProfile {
        name: "Elisa Rocha",
        email: "elisa.rocha@empresa-b.com.br",
        cpf: "11144477735",
        months_in_job: 120,
        active: true,
        archived: false,
    },
    SeedProfile {
        name: "Fabio Nunes",
        email: "fabio.nunes@empresa-b.com.br",
        cpf: "12345678909",
        months_in_job: 84,
        active: true,
        archived: false,
    },
    SeedProfile {
        name: "Gabriela Reis",
        email: "gabriela.reis@empresa-b.com.br",
        cpf: "98765432100",
        months_in_job: 180,
        active: true,
        archived: false,
    },
    SeedProfile {
        name: "Hugo Prado",
        email: "hugo.prado@empresa-b.com.br",
        cpf: "25836914737",
        months_in_job: 36,
        active: true,
        archived: true,
    },
];

const SAMPLE_CSV: &str = "name,cpf,email\nHelena Costa,74185296355,helena.costa@example.com\nIgor Martins,36925814755,igor.martins@example.com\n";

/// A seeded user together with its employment record.
#[derive(Debug, Clone)]
pub(crate) struct SeededEmployee {
    pub(crate) name: &'static str,
    pub(crate) company: &'static str,
    pub(crate) user_id: String,
    pub(crate) hire_date: NaiveDate,
    pub(crate) active: bool,
    pub(crate) archived: bool,
}

/// Store the demo users and their employee records, hire dates counted back from `today`.
pub(crate) fn seed(services: &Services, today: NaiveDate) -> Result<Vec<SeededEmployee>, AppError> {
    let ids = UuidV4Generator;
    let companies = [
        PartnerCompany {
            id: ids.generate(),
            name: "Empresa A",
        },
        PartnerCompany {
            id: ids.generate(),
            name: "Empresa B",
        },
    ];

    let now = services.users.now();
    let mut seeded = Vec::with_capacity(PROFILES.len());
    for (index, profile) in PROFILES.iter().enumerate() {
        let user = services
            .users
            .build_user(profile.name, profile.email, profile.cpf)
            .map_err(consigna::users::UserServiceError::from)?;
        let user = services.users.create(user)?;
        let user_id = user.id().unwrap_or_default().to_string();

        let company = &companies[if index < 3 { 0 } else { 1 }];
        let hire_date = today
            .checked_sub_months(Months::new(profile.months_in_job))
            .unwrap_or(today);

        let mut employee = Employee::build(
            &ids,
            &user_id,
            &company.id,
            &hire_date.format("%Y-%m-%d").to_string(),
            now,
        )?;
        employee.set_active(profile.active);
        let employee_id = employee.id().to_string();
        services.employee_store.insert(employee)?;
        if profile.archived {
            services.employee_store.delete_by_id(&employee_id, now)?;
        }

        seeded.push(SeededEmployee {
            name: profile.name,
            company: company.name,
            user_id,
            hire_date,
            active: profile.active,
            archived: profile.archived,
        });
    }

    Ok(seeded)
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let services = Services::in_memory(EligibilityPolicy::default());

    let seeded = seed(&services, today)?;
    println!("Seeded {} employees across partner companies", seeded.len());

    let upload = CsvUpload::new("text/csv", SAMPLE_CSV.len() as u64, SAMPLE_CSV)?;
    let summary = services.spreadsheet.import(&upload)?;
    println!(
        "Imported {} users from the sample spreadsheet at {}",
        summary.created_users, summary.date_time
    );

    let users = services.users.find_all()?;
    println!("\nRegistered users ({}):", users.len());
    for user in &users {
        let view = user.view();
        println!("  {} | {} | {}", view.name, view.cpf, view.email);
    }

    println!("\nEligibility on {today}:");
    for employee in &seeded {
        let status = match (employee.archived, employee.active) {
            (true, _) => "archived",
            (false, true) => "active",
            (false, false) => "inactive",
        };
        let answer = match services.eligibility.check_on(&employee.user_id, today) {
            Ok(outcome) => {
                let label = if outcome.eligible { "eligible" } else { "not eligible" };
                format!("{label}: {}", outcome.message)
            }
            Err(err) => format!("unavailable: {err}"),
        };
        println!(
            "  {:<14} {} since {} ({status}) -> {answer}",
            employee.name, employee.company, employee.hire_date
        );
    }

    println!("\nSpreadsheet export:\n{}", services.spreadsheet.export()?);
    Ok(())
}

/// Run a CSV file through the import pipeline against an empty store and print the result.
pub(crate) fn run_import(args: ImportArgs) -> Result<(), AppError> {
    let ImportArgs { path, mime_type } = args;

    let bytes = std::fs::read(&path)?;
    let mime_type = mime_type.unwrap_or_else(|| {
        mime_guess::from_path(&path)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    });

    let upload = CsvUpload::from_bytes(&mime_type, &bytes)?;
    let services = Services::in_memory(EligibilityPolicy::default());
    let summary = services.spreadsheet.import(&upload)?;

    println!(
        "{}: {} users pass validation",
        path.display(),
        summary.created_users
    );
    print!("{}", services.spreadsheet.export()?);
    Ok(())
}

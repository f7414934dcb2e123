use crate::demo::{run_demo, run_import, DemoArgs, ImportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use consigna::cpf;
use consigna::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "consigna",
    about = "User registry and consigned-credit eligibility service",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Check a CPF against the registry checksum
    Cpf {
        /// Eleven digits, no punctuation
        value: String,
    },
    /// Dry-run a user spreadsheet through the import pipeline
    Import(ImportArgs),
    /// Seed demo users and employees and walk through import and eligibility
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Cpf { value } => {
            let verdict = if cpf::is_valid(value.trim()) {
                "valid"
            } else {
                "invalid"
            };
            println!("{}: {verdict}", value.trim());
            Ok(())
        }
        Command::Import(args) => run_import(args),
        Command::Demo(args) => run_demo(args),
    }
}

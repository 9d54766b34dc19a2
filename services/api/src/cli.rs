use crate::report::{run_batch, run_catalog, run_diagnose, BatchArgs, CatalogArgs, DiagnoseArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use soho_diagnosis::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "SOHO Loan Diagnosis",
    about = "Grade small businesses, estimate loan limits and match policy funds",
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
    /// Diagnose a single applicant profile stored as JSON
    Diagnose(DiagnoseArgs),
    /// Diagnose every client row in a CSV export
    Batch(BatchArgs),
    /// List the policy programs the engine matches against
    Catalog(CatalogArgs),
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
        Command::Diagnose(args) => run_diagnose(args),
        Command::Batch(args) => run_batch(args),
        Command::Catalog(args) => run_catalog(args),
    }
}

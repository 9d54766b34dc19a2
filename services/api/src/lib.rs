mod cli;
mod infra;
mod report;
mod routes;
mod server;

use soho_diagnosis::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}

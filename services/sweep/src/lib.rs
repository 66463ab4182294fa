mod cli;
mod demo;
mod infra;
mod routes;
mod server;
mod sweep;

use wadp_compliance::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}

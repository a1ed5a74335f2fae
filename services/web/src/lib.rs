mod cli;
mod commands;
mod infra;
mod routes;
mod server;
mod session;
mod terminal;

#[cfg(test)]
mod testing;

use donor_finder::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}

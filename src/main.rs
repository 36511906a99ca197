mod config;
mod console;
mod net;
mod session;

use canvas::export::{ExportError, save_grid_png};
use canvas::grid::Grid;
use canvas::storage::StorageError;
use clap::Parser;

use crate::config::{Cli, Command, ConfigError};
use crate::net::NetError;
use crate::net::snapshot::fetch_snapshot;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Net(#[from] NetError),
    #[error("state file: {0}")]
    Storage(#[from] StorageError),
    #[error("export failed: {0}")]
    Export(#[from] ExportError),
    #[error("snapshot rejected: {0}")]
    Grid(#[from] canvas::grid::GridError),
    #[error("stdin: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    if let Err(error) = dotenvy::dotenv() {
        if !error.not_found() {
            eprintln!("ignoring .env: {error}");
        }
    }
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    cli.validate()?;
    match cli.command.clone().unwrap_or(Command::Run) {
        Command::Run => session::run(&cli).await,
        Command::Snapshot { out, scale } => {
            let cells = fetch_snapshot(&reqwest::Client::new(), &cli.snapshot_url()).await?;
            let grid = Grid::from_cells(cli.width, cli.height, cells)?;
            save_grid_png(&grid, scale, &out)?;
            tracing::info!(path = %out.display(), "snapshot saved");
            Ok(())
        }
    }
}

pub mod worker;

use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use glean_service::GleanService;
use glean_storage::db::Db;

#[derive(Debug, Parser)]
#[command(
	version = glean_cli::VERSION,
	rename_all = "kebab",
	styles = glean_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = glean_config::load(&args.config)?;

	init_tracing(&config);

	let db = Arc::new(Db::connect(&config.storage.postgres).await?);

	db.ensure_schema().await?;

	let backlog = config.backlog.clone();
	let service = GleanService::new(config, db.clone());
	let state = worker::WorkerState { db, service, backlog };

	tracing::info!("Backlog worker started.");

	worker::run_worker(state).await
}

fn init_tracing(config: &glean_config::Config) {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();
}

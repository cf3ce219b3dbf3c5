use clap::Parser;

use glean_worker::Args;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	glean_worker::run(Args::parse()).await
}

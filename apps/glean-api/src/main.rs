use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = glean_api::Args::parse();

	glean_api::run(args).await
}

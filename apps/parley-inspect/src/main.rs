use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = parley_inspect::Args::parse();

	parley_inspect::run(args).await
}

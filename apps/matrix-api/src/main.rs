use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = matrix_api::Args::parse();

	matrix_api::run(args).await
}

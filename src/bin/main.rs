use clap::Parser;
use pokecards::PokeCli;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let _ = dotenv::dotenv();

    let cli: PokeCli = PokeCli::parse();
    let subscriber = pokecards::logging::file_subscriber(&cli.log)?;
    tracing::subscriber::set_global_default(subscriber)?;
    tracing::debug!("Tracing initialized");

    cli.execute().await?;

    Ok(())
}

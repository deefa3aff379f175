use clap::Parser;
use tracing_subscriber::EnvFilter;

use tilegrid_cli::config::Config;
use tilegrid_cli::Cli;

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.log_filter)?)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output = tilegrid_cli::run(cli.command, &config)?;
    print!("{}", output);

    Ok(())
}

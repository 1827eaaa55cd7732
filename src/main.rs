use clap::Parser;
use edgewise::cli::{self, Cli, Commands, FixtureFile, Providers};
use edgewise::config::AppConfig;
use edgewise::error::Result;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match AppConfig::load_from(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(errors) = config.validate() {
        for e in &errors {
            error!("config: {e}");
        }
        std::process::exit(1);
    }

    let providers = match &cli.fixtures {
        Some(path) => {
            let fixtures = FixtureFile::load(path)?;
            Providers::from_fixtures(&fixtures)
        }
        None => {
            if config.providers.news_api_key.is_none() {
                warn!("No news API key configured; news signals will be neutral");
            }
            Providers::live(&config)
        }
    };

    match &cli.command {
        Commands::Scan { evaluate } => cli::run_scan(&config, &providers, *evaluate).await?,
        Commands::Signal { question } => cli::run_signal(&config, &providers, question).await?,
        Commands::Analyze { market_id } => cli::run_analyze(&config, &providers, market_id).await?,
        Commands::Rebalance => cli::run_rebalance(&config, &providers).await?,
        Commands::Fixture { out, markets } => cli::run_fixture(out, *markets)?,
    }

    Ok(())
}

fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));

    if config.logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

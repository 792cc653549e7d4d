//! Stargazer - astronomy chat assistant CLI
//!
#![doc = "Main entry point for the Stargazer application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use stargazer::cli::{Cli, Commands};
use stargazer::commands;
use stargazer::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(&cli);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    match cli.command {
        Commands::Chat { .. } => {
            tracing::info!("Starting interactive chat mode");
            commands::chat::run_chat(config).await?;
            Ok(())
        }
        Commands::Zenith { lat, lon, time, .. } => {
            tracing::info!("Running zenith calculator");
            commands::zenith::run_zenith(config, lat, lon, time).await?;
            Ok(())
        }
        Commands::Key { command } => {
            commands::key::run_key(command)?;
            Ok(())
        }
        Commands::Serve { .. } => {
            commands::serve::run_serve(config).await?;
            Ok(())
        }
        Commands::Apod { date } => {
            if let Some(d) = &date {
                tracing::debug!("Fetching APOD for {}", d);
            }
            commands::apod::run_apod(config, date).await?;
            Ok(())
        }
    }
}

/// Logs go to stderr so they never interleave with chat output on stdout.
/// `RUST_LOG` wins over the defaults; `STARGAZER_LOG_JSON=1` switches to
/// JSON lines for the proxy.
fn init_tracing(cli: &Cli) {
    let default_level = if cli.verbose {
        "stargazer=debug"
    } else if matches!(cli.command, Commands::Serve { .. }) {
        "stargazer=info"
    } else {
        "stargazer=warn"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let json = std::env::var("STARGAZER_LOG_JSON")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();
}

use anyhow::Result;
use clap::Parser;
use std::process;
use subject_watch::cli::{self, Cli, Commands};
use subject_watch::config::Config;
use subject_watch::error::WatchError;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Exit with proper code on error
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        eprintln!("\nFor help, run: subject-watch --help");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Install default crypto provider for rustls
    // On non-Windows platforms, use aws-lc-rs; on Windows, use ring
    #[cfg(not(windows))]
    rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install default crypto provider"))?;

    #[cfg(windows)]
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install default crypto provider"))?;

    // A missing .env is fine; variables may come from the environment
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("subject_watch=debug,info"))
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("subject_watch=info,warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    match &cli.command {
        None => {
            let config = cli.load_config().await?;
            cli::run_watch(&config, false).await?;
            Ok(())
        }

        Some(Commands::Watch { once }) => {
            let config = cli.load_config().await?;
            cli::run_watch(&config, *once).await?;
            Ok(())
        }

        Some(Commands::Auth { force }) => {
            tracing::info!("Authenticating with Gmail API...");
            let config = cli.load_config().await?;

            let email = cli::run_auth(&config, *force).await?;

            println!("Successfully authenticated with Gmail API");
            println!("Token cached at: {:?}", config.paths.token_cache);
            println!("Connected to account: {}", email);
            Ok(())
        }

        Some(Commands::History { limit }) => {
            let config = cli.load_config().await?;
            let records = cli::run_history(&config, *limit).await?;

            if records.is_empty() {
                println!("No matches logged in {:?}", config.paths.results);
            }
            for record in records {
                println!("{}  {}", record.timestamp, record.subject);
            }
            Ok(())
        }

        Some(Commands::InitConfig { output, force }) => {
            tracing::info!("Generating example configuration file");

            if output.exists() && !force {
                return Err(WatchError::ConfigError(format!(
                    "Configuration file already exists at {:?}. Use --force to overwrite.",
                    output
                ))
                .into());
            }

            Config::create_example(output).await?;

            println!("Created example configuration file at: {:?}", output);
            println!("\nKey settings to review:");
            println!(
                "  - watch.subject_prefix: subjects must start with this (or set SUBJECT_TO_SEARCH)"
            );
            println!(
                "  - watch.polling_interval_secs: seconds between checks (or set POLLING_INTERVAL)"
            );
            println!("  - paths.credentials: OAuth client secret downloaded from Google Cloud");
            Ok(())
        }
    }
}

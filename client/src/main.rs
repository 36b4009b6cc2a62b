//! Roster CLI - prints one page of a management screen as JSON.

use clap::{builder::PossibleValuesParser, Parser};
use roster_client::{ClientConfig, HttpRecordApi, Session, ViewDriver};
use roster_engine::presets;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "roster", version, about = "Browse a dashboard management screen")]
struct Cli {
    /// Screen to load
    #[arg(value_parser = PossibleValuesParser::new(presets::SCREEN_NAMES))]
    screen: String,

    /// Bucket to show
    #[arg(long, default_value = roster_engine::ALL_BUCKET)]
    bucket: String,

    /// Search term
    #[arg(long)]
    search: Option<String>,

    /// Page to show (clamped into range)
    #[arg(long, default_value_t = 1)]
    page: usize,

    /// Pretty-print the snapshot
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roster=info,roster_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = ClientConfig::from_env()?;
    let preset = presets::by_name(&cli.screen)
        .ok_or_else(|| format!("unknown screen {:?}", cli.screen))?;
    let screen = config.apply(preset);

    tracing::info!(screen = %screen.name, api = %config.api_url, "loading screen");

    let session = Session::new(config.api_token.clone());
    let api = HttpRecordApi::new(&config, &screen, session)?;
    let driver = ViewDriver::new(screen, Arc::new(api))?;

    driver.refresh().await?;
    driver.set_bucket(&cli.bucket).await?;
    if let Some(term) = cli.search {
        driver.set_search_term(term).await?;
        driver.flush_search().await;
    }
    driver.go_to_page(cli.page).await;

    let snapshot = driver.snapshot().await;
    let json = if cli.pretty {
        serde_json::to_string_pretty(&snapshot)?
    } else {
        snapshot.to_json()?
    };
    println!("{json}");

    driver.tear_down().await;

    if let Some(error) = snapshot.last_error {
        tracing::error!(%error, "screen loaded with an error");
        std::process::exit(1);
    }
    Ok(())
}

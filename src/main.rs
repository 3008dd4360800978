use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::sync::mpsc;

use coursenav::api::CatalogClient;
use coursenav::app::{App, AppEvent};
use coursenav::config::{Config, API_BASE_ENV};
use coursenav::ui;

#[derive(Parser, Debug)]
#[command(
    name = "coursenav",
    about = "Browse a course catalog in the terminal and open lectures in the companion player"
)]
struct Args {
    /// Catalog API base URL (overrides $COURSENAV_API_BASE and the config file)
    #[arg(long, value_name = "URL")]
    api_base: Option<String>,

    /// Companion player page (defaults to {api_base}/pwplayer.html)
    #[arg(long, value_name = "URL")]
    player_page: Option<String>,

    /// Config file path (defaults to ~/.config/coursenav/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Show the player URL in the status bar instead of opening a browser
    #[arg(long)]
    print_player_url: bool,
}

fn init_tracing(config: &Config) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    match &config.log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file '{}'", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match args.config.clone().or_else(Config::default_path) {
        Some(path) => Config::load(&path)
            .with_context(|| format!("Failed to load config '{}'", path.display()))?,
        None => Config::default(),
    };

    init_tracing(&config)?;
    for warning in &config.warnings {
        tracing::warn!("{}", warning);
        eprintln!("Warning: {}", warning);
    }

    let env_base = std::env::var(API_BASE_ENV).ok();
    let api_base = config.resolve_api_base(args.api_base.as_deref(), env_base.as_deref());
    let player_page = config.resolve_player_page(args.player_page.as_deref(), &api_base);
    tracing::info!(api_base = %api_base, player_page = %player_page, "Starting");

    let client = CatalogClient::new(&api_base, config.client_options())
        .with_context(|| format!("Invalid API base URL '{}'", api_base))?;

    let mut app = App::new(client, player_page);
    app.print_player_url = args.print_player_url;

    if !config.keybindings.is_empty() {
        for warning in app.keybindings.apply_overrides(&config.keybindings) {
            tracing::warn!("{}", warning);
            eprintln!("Warning: {}", warning);
        }
    }

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(64);

    ui::run(&mut app, event_tx, event_rx).await?;

    if let Some(url) = app.last_player_url.as_deref().filter(|_| app.print_player_url) {
        println!("{}", url);
    }
    Ok(())
}

mod ai;
mod app;
mod config;
mod models;
mod store;
mod tui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::OpenOptions;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::ai::GeminiRefiner;
use crate::app::App;
use crate::config::Config;
use crate::store::{RowStore, StoreClient};

#[derive(Parser)]
#[command(name = "pja")]
#[command(about = "Portal Jovem Aprendiz - submit manifestations and track protocols")]
struct Cli {
    /// Base URL of the row store project
    #[arg(long, global = true)]
    store_url: Option<String>,

    /// Publishable API key for the row store
    #[arg(long, global = true)]
    store_key: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter config file
    Init,

    /// Run the interactive portal (default)
    Portal,

    /// List partner companies
    Companies,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::Init) = cli.command {
        let path = config::write_starter_config()?;
        println!("Starter config written to {}", path.display());
        println!("Fill in store_url and store_key, or set PJA_STORE_URL and PJA_STORE_KEY.");
        return Ok(());
    }

    init_logging()?;
    info!("Starting pja v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load()?;
    config.apply_overrides(cli.store_url, cli.store_key);
    config.require_store()?;

    let store = StoreClient::new(&config.store_url, config.store_key.clone());

    match cli.command {
        Some(Commands::Companies) => list_companies(&store)?,
        _ => {
            let refiner = GeminiRefiner::new(config.ai_key, config.ai_model);
            let mut app = App::new(Box::new(store), Box::new(refiner));
            tui::run_portal(&mut app)?;
        }
    }

    Ok(())
}

// The portal owns the terminal, so diagnostics go to a file instead of
// stderr. RUST_LOG still controls the filter.
fn init_logging() -> Result<()> {
    let path = config::log_path();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,pja=debug")),
        )
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn list_companies(store: &StoreClient) -> Result<()> {
    let companies = store.companies()?;
    if companies.is_empty() {
        println!("No companies found.");
        return Ok(());
    }
    println!("{:<38} {:<30} {:<6}", "ID", "NAME", "LOGO");
    println!("{}", "-".repeat(76));
    for company in companies {
        let logo = if company.avatar_url.is_some() { "yes" } else { "-" };
        println!(
            "{:<38} {:<30} {:<6}",
            company.id,
            truncate(&company.name, 28),
            logo
        );
    }
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

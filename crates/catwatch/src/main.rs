//! Catwatch - Unified CLI
//!
//! REST server and administration commands for the statistics store.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use catwatch::{AdminService, AppConfig, AppState, Database, DatabaseBundle, FormulaScorer};
use clap::Parser;
use cli::{Cli, Command};
use std::path::PathBuf;
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_filter())),
        )
        .init();

    match cli.command {
        Command::Serve { host, port } => run_server(config, host, port).await,
        Command::Migrate => run_migrate(&config),
        Command::Init => run_init(&config),
        Command::Delete => run_delete(&config),
        Command::Export { output } => run_export(&config, output),
        Command::Import { file } => run_import(&config, file),
        Command::Score {
            organizations,
            formula,
        } => run_score(&config, organizations, formula),
    }
}

/// Opens the configured database with migrations applied.
#[instrument(skip(config), fields(url = %config.database_url()))]
fn open_database(config: &AppConfig) -> Result<Database> {
    let database = Database::new(config.database_url());
    let applied = database.run_migrations()?;
    info!(applied, "Database ready");
    Ok(database)
}

/// Run the REST server
async fn run_server(config: AppConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    let host = host.unwrap_or_else(|| config.host().clone());
    let port = port.unwrap_or(*config.port());

    let database = open_database(&config)?;
    let state = AppState::new(database, config.organization_list(), config.scoring_project());
    let app = catwatch::router(state);

    let listener = tokio::net::TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", host, port))?;
    info!(host = %host, port, "Server ready at http://{}:{}/", host, port);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Apply pending migrations
fn run_migrate(config: &AppConfig) -> Result<()> {
    open_database(config)?;
    Ok(())
}

/// Populate test data
fn run_init(config: &AppConfig) -> Result<()> {
    let admin = AdminService::new(open_database(config)?);
    let summary = admin.populate_test_data(&config.organization_list())?;
    info!(?summary, "Test data populated");
    Ok(())
}

/// Delete every record
fn run_delete(config: &AppConfig) -> Result<()> {
    let admin = AdminService::new(open_database(config)?);
    let summary = admin.delete_all()?;
    info!(?summary, "Database cleared");
    Ok(())
}

/// Export the database as JSON
fn run_export(config: &AppConfig, output: Option<PathBuf>) -> Result<()> {
    let admin = AdminService::new(open_database(config)?);
    let json = serde_json::to_string_pretty(&admin.export()?)?;

    match output {
        Some(path) => {
            std::fs::write(&path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), "Export written");
        }
        None => println!("{}", json),
    }
    Ok(())
}

/// Import a JSON bundle
fn run_import(config: &AppConfig, file: PathBuf) -> Result<()> {
    let content = std::fs::read_to_string(&file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let bundle: DatabaseBundle = serde_json::from_str(&content)
        .with_context(|| format!("Invalid bundle in {}", file.display()))?;

    if bundle.is_empty() {
        warn!(path = %file.display(), "Bundle is empty");
    }

    let admin = AdminService::new(open_database(config)?);
    let summary = admin.import(&bundle)?;
    info!(?summary, "Bundle imported");
    Ok(())
}

/// Recompute project scores
fn run_score(config: &AppConfig, organizations: Option<String>, formula: Option<String>) -> Result<()> {
    let organizations = organizations.unwrap_or_else(|| config.organizations().clone());
    let formula = formula.unwrap_or_else(|| config.scoring_project().clone());
    let scorer = FormulaScorer::parse(&formula)?;

    info!(organizations = %organizations, formula = %scorer.source(), "Rescoring projects");

    let admin = AdminService::new(open_database(config)?);
    let report = admin.rescore(&organizations, &scorer)?;
    if report.has_errors() {
        warn!(failures = report.errors().len(), "Scoring finished with errors");
    }
    for message in report.into_messages() {
        println!("{}", message);
    }
    Ok(())
}

//! CLI command definitions and dispatch.

pub mod license;
pub mod migrate;
pub mod seat;
pub mod session;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use licensehub_core::config::AppConfig;
use licensehub_core::error::AppError;
use licensehub_database::{DatabasePool, EntitlementStore};
use licensehub_service::Services;

use crate::output::OutputFormat;

/// LicenseHub: license issuance, activation and seat administration
#[derive(Debug, Parser)]
#[command(name = "licensehub", version, about, long_about = None)]
pub struct Cli {
    /// Path to the base configuration file
    #[arg(short, long, default_value = "config/default.toml", global = true)]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// License issuance, activation and revocation
    License(license::LicenseArgs),
    /// Seat administration
    Seat(seat::SeatArgs),
    /// Seat login and session inspection
    Session(session::SessionArgs),
}

impl Cli {
    /// Execute the selected command.
    pub async fn execute(&self, config: &AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, config).await,
            Commands::License(args) => license::execute(args, config, self.format).await,
            Commands::Seat(args) => seat::execute(args, config, self.format).await,
            Commands::Session(args) => session::execute(args, config, self.format).await,
        }
    }
}

/// Load configuration from `path`, the `LICENSEHUB_ENV` overlay and the environment.
pub fn load_config(path: &str) -> Result<AppConfig, AppError> {
    let env = std::env::var("LICENSEHUB_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load_from(path, &env)
}

/// Connect to PostgreSQL.
pub async fn create_db_pool(config: &AppConfig) -> Result<DatabasePool, AppError> {
    DatabasePool::connect(&config.database).await
}

/// Connect and build the service graph over the PostgreSQL store.
pub async fn connect_services(config: &AppConfig) -> Result<Services, AppError> {
    let pool = create_db_pool(config).await?;
    let store: Arc<dyn EntitlementStore> = Arc::new(pool.entitlement_store(&config.database));
    if !store.health_check().await? {
        return Err(AppError::database("Entitlement store is not reachable"));
    }
    Services::new(config, store)
}

/// Ask for a secret on the terminal when it was not passed as an argument.
pub fn prompt_secret(given: Option<&str>, prompt: &str) -> Result<String, AppError> {
    match given {
        Some(value) => Ok(value.to_string()),
        None => dialoguer::Password::new()
            .with_prompt(prompt)
            .interact()
            .map_err(|e| AppError::internal(format!("Input error: {e}"))),
    }
}

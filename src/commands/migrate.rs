//! Database migration commands.

use clap::{Args, Subcommand};

use licensehub_core::config::AppConfig;
use licensehub_core::error::AppError;
use licensehub_database::migration;

use crate::output;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Apply all pending migrations
    Run,
    /// Show which migrations have been applied
    Status,
}

/// Execute migration commands.
pub async fn execute(args: &MigrateArgs, config: &AppConfig) -> Result<(), AppError> {
    let pool = super::create_db_pool(config).await?;

    match &args.command {
        MigrateCommand::Run => {
            migration::run_migrations(pool.pool()).await?;
            output::print_success("All migrations applied.");
        }
        MigrateCommand::Status => {
            for entry in migration::migration_status(pool.pool()).await? {
                let state = if entry.applied { "applied" } else { "pending" };
                println!("  {} {} ({})", entry.version, entry.description, state);
            }
        }
    }

    pool.close().await;
    Ok(())
}

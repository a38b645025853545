//! Seat session commands.

use clap::{Args, Subcommand};

use licensehub_core::config::AppConfig;
use licensehub_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for session commands
#[derive(Debug, Args)]
pub struct SessionArgs {
    /// Session subcommand
    #[command(subcommand)]
    pub command: SessionCommand,
}

/// Session subcommands
#[derive(Debug, Subcommand)]
pub enum SessionCommand {
    /// Log a seat in and print its session token
    Login {
        /// License token
        token: String,
        /// Seat email
        #[arg(long)]
        email: String,
        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },
    /// Show the seat and license behind a session token
    Whoami {
        /// Session token
        access_token: String,
    },
}

/// Execute session commands.
pub async fn execute(
    args: &SessionArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let services = super::connect_services(config).await?;

    match &args.command {
        SessionCommand::Login {
            token,
            email,
            password,
        } => {
            let password = super::prompt_secret(password.as_deref(), "Password")?;
            let session = services.sessions.login(token, email, &password).await?;

            match format {
                OutputFormat::Json => output::print_json(&session),
                OutputFormat::Table => {
                    output::print_success(&format!("Logged in as {}", session.seat.email));
                    output::print_kv("Access token", &session.access_token);
                    output::print_kv("Expires", session.expires_at.to_rfc3339());
                    output::print_kv("Role", session.seat.role);
                    output::print_kv("Plan", session.license.plan);
                }
            }
        }
        SessionCommand::Whoami { access_token } => {
            let (seat, snapshot) = services.sessions.whoami(access_token).await?;

            match format {
                OutputFormat::Json => output::print_json(&serde_json::json!({
                    "seat": seat,
                    "license": snapshot,
                })),
                OutputFormat::Table => {
                    output::print_kv("Seat", seat.id);
                    output::print_kv("Email", &seat.email);
                    output::print_kv("Role", seat.role);
                    output::print_kv("License", snapshot.id);
                    output::print_kv("Plan", snapshot.plan);
                    output::print_kv(
                        "Seats",
                        format!("{}/{}", snapshot.seats_used, snapshot.seat_limit),
                    );
                }
            }
        }
    }

    Ok(())
}

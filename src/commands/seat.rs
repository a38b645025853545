//! Seat commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use licensehub_core::config::AppConfig;
use licensehub_core::error::AppError;
use licensehub_core::types::{LicenseId, SeatId};
use licensehub_entity::seat::{SeatRecord, SeatRole};
use licensehub_service::NewSeatRequest;

use crate::output::{self, OutputFormat};

/// Arguments for seat commands
#[derive(Debug, Args)]
pub struct SeatArgs {
    /// Seat subcommand
    #[command(subcommand)]
    pub command: SeatCommand,
}

/// Seat subcommands
#[derive(Debug, Subcommand)]
pub enum SeatCommand {
    /// Provision a seat under an activated license
    Add {
        /// License id
        license: LicenseId,
        /// Login email
        #[arg(long)]
        email: String,
        /// Role: owner or clerk
        #[arg(long, default_value = "clerk")]
        role: SeatRole,
        /// Display name
        #[arg(long, default_value = "")]
        name: String,
        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },
    /// List the seats of a license
    List {
        /// License id
        license: LicenseId,
    },
    /// Remove a seat, freeing its slot
    Remove {
        /// License id
        license: LicenseId,
        /// Seat id
        seat: SeatId,
    },
}

/// Seat display row for table output
#[derive(Debug, Serialize, Tabled)]
struct SeatRow {
    /// Seat id
    id: String,
    /// Email
    email: String,
    /// Role
    role: String,
    /// Display name
    name: String,
    /// Created at
    created_at: String,
}

impl From<&SeatRecord> for SeatRow {
    fn from(seat: &SeatRecord) -> Self {
        Self {
            id: seat.id.to_string(),
            email: seat.email.clone(),
            role: seat.role.to_string(),
            name: seat.display_name.clone(),
            created_at: seat.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Execute seat commands.
pub async fn execute(
    args: &SeatArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let services = super::connect_services(config).await?;

    match &args.command {
        SeatCommand::Add {
            license,
            email,
            role,
            name,
            password,
        } => {
            let password = super::prompt_secret(password.as_deref(), "Seat password")?;
            let allocation = services
                .coordinator
                .allocate_seat(
                    *license,
                    NewSeatRequest {
                        email: email.clone(),
                        role: *role,
                        password,
                        display_name: name.clone(),
                    },
                )
                .await?;

            match format {
                OutputFormat::Json => output::print_json(&allocation),
                OutputFormat::Table => {
                    output::print_success(&format!("Seat added for {}", allocation.seat.email));
                    output::print_kv("Seat id", allocation.seat.id);
                    output::print_kv(
                        "Seats",
                        format!("{}/{}", allocation.used, allocation.limit),
                    );
                }
            }
        }
        SeatCommand::List { license } => {
            let seats = services.query.list_seats(*license).await?;
            let rows: Vec<SeatRow> = seats.iter().map(SeatRow::from).collect();
            output::print_list(&rows, format);
        }
        SeatCommand::Remove { license, seat } => {
            services.coordinator.release_seat(*license, *seat).await?;
            output::print_success(&format!("Seat {seat} removed."));
        }
    }

    Ok(())
}

//! License commands.

use clap::{Args, Subcommand};
use serde::Serialize;

use licensehub_core::config::AppConfig;
use licensehub_core::error::AppError;
use licensehub_core::types::LicenseId;
use licensehub_entity::license::LicensePlan;
use licensehub_service::{ActivationOutcome, EntitlementSnapshot, IssueLicense};

use crate::output::{self, OutputFormat};

/// Arguments for license commands
#[derive(Debug, Args)]
pub struct LicenseArgs {
    /// License subcommand
    #[command(subcommand)]
    pub command: LicenseCommand,
}

/// License subcommands
#[derive(Debug, Subcommand)]
pub enum LicenseCommand {
    /// Issue a new license and print its token (shown only once)
    Issue {
        /// Customer name
        #[arg(long)]
        customer: String,
        /// Plan: basic, pro or business
        #[arg(long)]
        plan: LicensePlan,
        /// Validity in years (1-5)
        #[arg(long, default_value = "1")]
        years: u32,
        /// Seat limit (1-200)
        #[arg(long, default_value = "1")]
        seats: u32,
        /// Administrative note
        #[arg(long, default_value = "")]
        note: String,
    },
    /// Show a license by id
    Show {
        /// License id
        id: LicenseId,
    },
    /// Verify a token and show the license it refers to
    Validate {
        /// License token
        token: String,
        /// Also refuse a license bound to a different machine
        #[arg(long)]
        machine: Option<String>,
    },
    /// Bind a license to a machine
    Activate {
        /// License token
        token: String,
        /// Machine id
        #[arg(long)]
        machine: String,
    },
    /// Revoke a license
    Revoke {
        /// License id
        id: LicenseId,
        /// Skip confirmation
        #[arg(long)]
        force: bool,
    },
}

#[derive(Serialize)]
struct IssuedOutput<'a> {
    token: &'a str,
    license: &'a licensehub_entity::license::LicenseRecord,
}

/// Execute license commands.
pub async fn execute(
    args: &LicenseArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let services = super::connect_services(config).await?;

    match &args.command {
        LicenseCommand::Issue {
            customer,
            plan,
            years,
            seats,
            note,
        } => {
            let issued = services
                .issuance
                .issue(IssueLicense {
                    customer_name: customer.clone(),
                    plan: *plan,
                    years: *years,
                    seat_limit: *seats,
                    note: note.clone(),
                })
                .await?;

            match format {
                OutputFormat::Json => output::print_json(&IssuedOutput {
                    token: &issued.token,
                    license: &issued.record,
                }),
                OutputFormat::Table => {
                    output::print_success("License issued. Store the token now; it cannot be shown again.");
                    output::print_kv("Token", &issued.token);
                    output::print_kv("Id", issued.record.id);
                    output::print_kv("Customer", &issued.record.customer_name);
                    output::print_kv("Plan", issued.record.plan);
                    output::print_kv("Seats", issued.record.seat_limit);
                    output::print_kv("Expires", issued.record.expires_at.to_rfc3339());
                }
            }
        }
        LicenseCommand::Show { id } => {
            let snapshot = services.query.describe(*id).await?;
            print_snapshot(&snapshot, format);
        }
        LicenseCommand::Validate { token, machine } => {
            let snapshot = match machine {
                Some(machine) => services.query.validate_on_machine(token, machine).await?,
                None => services.query.validate(token).await?,
            };
            print_snapshot(&snapshot, format);
        }
        LicenseCommand::Activate { token, machine } => {
            let outcome = services.coordinator.activate(token, machine).await?;
            match format {
                OutputFormat::Json => output::print_json(&outcome),
                OutputFormat::Table => {
                    match &outcome {
                        ActivationOutcome::Activated(_) => {
                            output::print_success("License activated on this machine.")
                        }
                        ActivationOutcome::AlreadyActive(_) => {
                            output::print_success("License already active on this machine.")
                        }
                    }
                    let activated = outcome.license();
                    output::print_kv("Id", activated.license.id);
                    output::print_kv("Plan", activated.license.plan);
                    output::print_kv("Export", activated.features.export);
                    output::print_kv("OCR", activated.features.ocr);
                    output::print_kv("Multi-branch", activated.features.multi_branch);
                }
            }
        }
        LicenseCommand::Revoke { id, force } => {
            if !force {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!("Revoke license {id}? This cannot be undone."))
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?;

                if !confirm {
                    println!("Cancelled.");
                    return Ok(());
                }
            }

            let summary = services.coordinator.revoke(*id).await?;
            match format {
                OutputFormat::Json => output::print_json(&summary),
                OutputFormat::Table => output::print_success(&format!("License {id} revoked.")),
            }
        }
    }

    Ok(())
}

fn print_snapshot(snapshot: &EntitlementSnapshot, format: OutputFormat) {
    if format == OutputFormat::Json {
        output::print_json(snapshot);
        return;
    }

    output::print_kv("Id", snapshot.id);
    output::print_kv("Customer", &snapshot.customer_name);
    output::print_kv("Plan", snapshot.plan);
    output::print_kv("State", format!("{:?}", snapshot.state).to_lowercase());
    output::print_kv("Seats", format!("{}/{}", snapshot.seats_used, snapshot.seat_limit));
    output::print_kv(
        "Machine",
        snapshot.bound_machine_id.as_deref().unwrap_or("(unbound)"),
    );
    output::print_kv("Expires", snapshot.expires_at.to_rfc3339());
    if snapshot.expired {
        output::print_warning("License has expired.");
    }
}

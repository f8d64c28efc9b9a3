//! Manual rotation and vendor actuality commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use tokio_util::sync::CancellationToken;

use crate::output::{self, OutputFormat};
use nc_core::error::AppError;
use nc_core::types::TeamId;
use nc_service::{RotationOutcome, RotationReport};

/// Arguments for team commands
#[derive(Debug, Args)]
pub struct TeamArgs {
    /// Team subcommand
    #[command(subcommand)]
    pub command: TeamCommand,
}

/// Team subcommands
#[derive(Debug, Subcommand)]
pub enum TeamCommand {
    /// Rotate the live number of every active pool of a team now
    Rotate {
        /// Team ID
        team_id: i64,
    },
    /// Refresh every team's actual vendor from vendor control
    Sync,
}

#[derive(Debug, Serialize, Tabled)]
struct RotationRow {
    #[tabled(rename = "Pool")]
    pool: i64,
    #[tabled(rename = "Outcome")]
    outcome: &'static str,
    #[tabled(rename = "Detail")]
    detail: String,
}

fn rows(report: &RotationReport) -> Vec<RotationRow> {
    report
        .pools
        .iter()
        .map(|entry| {
            let (outcome, detail) = match &entry.outcome {
                RotationOutcome::Rotated { number, .. } => ("rotated", number.clone()),
                RotationOutcome::Skipped { reason } => ("skipped", reason.clone()),
                RotationOutcome::Cancelled => ("cancelled", String::new()),
                RotationOutcome::Failed { error } => ("failed", error.to_string()),
            };
            RotationRow {
                pool: entry.pool_id.get(),
                outcome,
                detail,
            }
        })
        .collect()
}

/// Execute team commands
pub async fn execute(
    args: &TeamArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let (db, services) = super::connect(config_path).await?;

    match &args.command {
        TeamCommand::Rotate { team_id } => {
            let report = services
                .rotation
                .rotate_team(TeamId(*team_id), CancellationToken::new())
                .await?;
            output::print_list(&rows(&report), format);
            match report.into_result() {
                Ok(report) => output::print_success(&format!(
                    "{} pool(s) rotated",
                    report.rotated()
                )),
                Err(e) => output::print_warning(&e.to_string()),
            }
        }
        TeamCommand::Sync => {
            let summary = services.actuality.sync_all().await?;
            match format {
                OutputFormat::Json => output::print_json(&summary),
                OutputFormat::Table => {
                    println!("Vendor actuality:");
                    output::print_kv("Teams", &summary.teams.to_string());
                    output::print_kv("Updated", &summary.updated.to_string());
                    output::print_kv("Failed", &summary.failed.to_string());
                }
            }
        }
    }

    db.close().await;
    Ok(())
}

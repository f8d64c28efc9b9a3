//! Pool inspection and subpool activation commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use nc_core::error::AppError;
use nc_core::types::{PoolId, TeamId};
use nc_entity::Pool;
use nc_service::{ActivationOutcome, PoolActivation};

/// Arguments for pool commands
#[derive(Debug, Args)]
pub struct PoolArgs {
    /// Pool subcommand
    #[command(subcommand)]
    pub command: PoolCommand,
}

/// Pool subcommands
#[derive(Debug, Subcommand)]
pub enum PoolCommand {
    /// List pools
    List {
        /// Only pools of this team
        #[arg(long)]
        team: Option<i64>,
    },
    /// Run the subpool activation cycle
    Activate {
        /// Only this pool (default: every active pool)
        #[arg(long)]
        pool: Option<i64>,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct PoolRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Team")]
    team: i64,
    #[tabled(rename = "Vendor")]
    vendor: i64,
    #[tabled(rename = "Numbers")]
    numbers: i32,
    #[tabled(rename = "Subpools")]
    subpools: i32,
    #[tabled(rename = "Active")]
    active: bool,
    #[tabled(rename = "Lap done")]
    finish: bool,
}

impl From<Pool> for PoolRow {
    fn from(pool: Pool) -> Self {
        Self {
            id: pool.id.get(),
            name: pool.name,
            team: pool.team_id.get(),
            vendor: pool.vendor_id.get(),
            numbers: pool.num_count,
            subpools: pool.subpool_count,
            active: pool.active,
            finish: pool.finish,
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
struct ActivationRow {
    #[tabled(rename = "Pool")]
    pool: i64,
    #[tabled(rename = "Outcome")]
    outcome: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

impl From<&PoolActivation> for ActivationRow {
    fn from(entry: &PoolActivation) -> Self {
        let (outcome, detail) = describe(&entry.outcome);
        Self {
            pool: entry.pool_id.get(),
            outcome: outcome.to_string(),
            detail,
        }
    }
}

fn describe(outcome: &ActivationOutcome) -> (&'static str, String) {
    match outcome {
        ActivationOutcome::Activated { index, wrapped, .. } => (
            "activated",
            if *wrapped {
                format!("index {index} (new lap)")
            } else {
                format!("index {index}")
            },
        ),
        ActivationOutcome::Skipped { reason } => ("skipped", reason.clone()),
        ActivationOutcome::Failed { error } => ("failed", error.to_string()),
    }
}

/// Execute pool commands
pub async fn execute(
    args: &PoolArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let (db, services) = super::connect(config_path).await?;

    match &args.command {
        PoolCommand::List { team } => {
            let pools = services.pools.list(team.map(TeamId)).await?;
            let rows: Vec<PoolRow> = pools.into_iter().map(PoolRow::from).collect();
            output::print_list(&rows, format);
        }
        PoolCommand::Activate { pool: Some(id) } => {
            let pool_id = PoolId(*id);
            let outcome = services.activator.activate_pool(pool_id).await?;
            let entry = PoolActivation {
                pool_id,
                outcome,
            };
            output::print_list(&[ActivationRow::from(&entry)], format);
        }
        PoolCommand::Activate { pool: None } => {
            let report = services.activator.activate_all().await?;
            let rows: Vec<ActivationRow> = report.pools.iter().map(ActivationRow::from).collect();
            output::print_list(&rows, format);
            if let Err(e) = report.into_result() {
                output::print_warning(&e.to_string());
            }
        }
    }

    db.close().await;
    Ok(())
}

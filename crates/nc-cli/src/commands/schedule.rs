//! Rotation schedule commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use nc_core::error::AppError;
use nc_entity::Schedule;

/// Arguments for schedule commands
#[derive(Debug, Args)]
pub struct ScheduleArgs {
    /// Schedule subcommand
    #[command(subcommand)]
    pub command: ScheduleCommand,
}

/// Schedule subcommands
#[derive(Debug, Subcommand)]
pub enum ScheduleCommand {
    /// List schedules
    List,
}

#[derive(Debug, Serialize, Tabled)]
struct ScheduleRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Team")]
    team: i64,
    #[tabled(rename = "Window")]
    window: String,
    #[tabled(rename = "Period (s)")]
    period: i32,
    #[tabled(rename = "Running")]
    running: bool,
}

impl From<Schedule> for ScheduleRow {
    fn from(s: Schedule) -> Self {
        Self {
            id: s.id.get(),
            name: s.name,
            team: s.team_id.get(),
            window: format!(
                "{}-{}",
                s.start_time.format("%H:%M"),
                s.stop_time.format("%H:%M")
            ),
            period: s.periodic_sec,
            running: s.running,
        }
    }
}

/// Execute schedule commands
pub async fn execute(
    args: &ScheduleArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let (db, services) = super::connect(config_path).await?;

    match &args.command {
        ScheduleCommand::List => {
            let rows: Vec<ScheduleRow> = services
                .schedules
                .list()
                .await?
                .into_iter()
                .map(ScheduleRow::from)
                .collect();
            output::print_list(&rows, format);
        }
    }

    db.close().await;
    Ok(())
}

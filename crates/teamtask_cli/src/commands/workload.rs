//! Load, suggestion and rebalance commands.

use super::{CommandOutput, Session};
use anyhow::Result;
use clap::Args;
use log::info;
use teamtask_core::TeamId;

#[derive(Args, Debug)]
pub struct TeamArgs {
    /// Team id
    #[arg(long)]
    team: TeamId,
}

#[derive(Args, Debug)]
pub struct ActivityArgs {
    /// Number of records (defaults to the configured display limit)
    #[arg(long)]
    limit: Option<u32>,
}

pub fn team_load(session: &Session, args: TeamArgs) -> Result<CommandOutput> {
    let loads = session.service().team_load(args.team)?;
    CommandOutput::json(&loads)
}

pub fn suggest(session: &Session, args: TeamArgs) -> Result<CommandOutput> {
    let suggestion = session.service().suggest_assignee(args.team)?;
    CommandOutput::json(&suggestion)
}

pub fn reassign(session: &Session, args: TeamArgs) -> Result<CommandOutput> {
    info!("event=cli_reassign module=cli status=start team_id={}", args.team);
    let report = session.service().reassign(session.actor(), args.team)?;
    CommandOutput::json(&report)
}

pub fn activity(session: &Session, args: ActivityArgs) -> Result<CommandOutput> {
    let records = session.service().recent_activity(args.limit)?;
    CommandOutput::json(&records)
}

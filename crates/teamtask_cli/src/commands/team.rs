//! Team structure commands.

use super::{CommandOutput, Session};
use anyhow::Result;
use clap::Args;
use teamtask_core::TeamId;

#[derive(Args, Debug)]
pub struct CreateTeamArgs {
    /// Team name
    #[arg(long)]
    name: String,
}

#[derive(Args, Debug)]
pub struct AddMemberArgs {
    /// Team id
    #[arg(long)]
    team: TeamId,
    /// Member display name
    #[arg(long)]
    name: String,
    /// Free-text role label
    #[arg(long)]
    role: String,
    /// Maximum simultaneous incomplete tasks
    #[arg(long)]
    capacity: u32,
}

#[derive(Args, Debug)]
pub struct CreateProjectArgs {
    /// Team id
    #[arg(long)]
    team: TeamId,
    /// Project name
    #[arg(long)]
    name: String,
}

pub fn create_team(session: &Session, args: CreateTeamArgs) -> Result<CommandOutput> {
    let team = session.service().create_team(session.actor(), &args.name)?;
    CommandOutput::json(&team)
}

pub fn list_teams(session: &Session) -> Result<CommandOutput> {
    let teams = session.service().list_teams(session.actor())?;
    CommandOutput::json(&teams)
}

pub fn add_member(session: &Session, args: AddMemberArgs) -> Result<CommandOutput> {
    let member = session.service().add_member(
        session.actor(),
        args.team,
        &args.name,
        &args.role,
        args.capacity,
    )?;
    CommandOutput::json(&member)
}

pub fn create_project(session: &Session, args: CreateProjectArgs) -> Result<CommandOutput> {
    let project = session
        .service()
        .create_project(session.actor(), args.team, &args.name)?;
    CommandOutput::json(&project)
}

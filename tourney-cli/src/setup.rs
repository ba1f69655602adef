//! Registration commands - create, apply, approve, reject, team
//!
//! Everything here runs before round one is drawn.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tourney_core::{ParticipantId, TournamentId, UserId};
use tourney_service::{Application, Service, TournamentStore};

use crate::output::Output;

// ============================================================================
// COMMAND ARGUMENTS
// ============================================================================

#[derive(Args)]
pub struct CreateArgs {
    /// Tournament title
    pub title: String,

    /// Owner's user id
    #[arg(long)]
    pub owner: i64,
}

#[derive(Args)]
pub struct ApplyArgs {
    /// Tournament id
    pub tournament: u64,

    /// Applicant's user id
    #[arg(long)]
    pub user: i64,

    /// Name to play under
    #[arg(long)]
    pub name: String,

    /// Optional handle shown next to the name
    #[arg(long)]
    pub handle: Option<String>,

    /// Message to the owner
    #[arg(long, default_value = "")]
    pub text: String,
}

#[derive(Args)]
pub struct DecideArgs {
    /// Tournament id
    pub tournament: u64,

    /// Owner's user id
    #[arg(long)]
    pub owner: i64,

    /// Applicant's user id
    #[arg(long)]
    pub user: i64,
}

#[derive(Args)]
pub struct ApplicationsArgs {
    /// Tournament id
    pub tournament: u64,
}

#[derive(Args)]
pub struct TeamArgs {
    /// Tournament id
    pub tournament: u64,

    /// Owner's user id
    #[arg(long)]
    pub owner: i64,

    /// Team name
    #[arg(long)]
    pub name: String,

    /// Member user ids (repeat for each member)
    #[arg(long = "member", required = true)]
    pub members: Vec<i64>,
}

#[derive(Serialize)]
struct Created {
    tournament: TournamentId,
}

#[derive(Serialize)]
struct Joined {
    tournament: TournamentId,
    participant: ParticipantId,
}

// ============================================================================
// COMMANDS
// ============================================================================

pub fn create<S: TournamentStore>(args: CreateArgs, service: &Service<S>, out: Output) -> Result<()> {
    let tournament = service
        .create_tournament(UserId(args.owner), args.title)
        .context("Failed to create tournament")?;
    out.emit(&Created { tournament }, |c| {
        println!("Created {}", c.tournament);
    })
}

pub fn apply<S: TournamentStore>(args: ApplyArgs, service: &Service<S>, out: Output) -> Result<()> {
    let tournament = TournamentId(args.tournament);
    let mut application =
        Application::new(tournament, UserId(args.user), args.name).with_text(args.text);
    if let Some(handle) = args.handle {
        application = application.with_handle(handle);
    }

    service
        .apply(application.clone())
        .with_context(|| format!("Failed to apply to {}", tournament))?;
    out.emit(&application, |a| {
        println!("{} applied to {} as {}", a.user_id, a.tournament_id, a.name);
    })
}

pub fn approve<S: TournamentStore>(args: DecideArgs, service: &Service<S>, out: Output) -> Result<()> {
    let tournament = TournamentId(args.tournament);
    let participant = service
        .approve_application(tournament, UserId(args.owner), UserId(args.user))
        .with_context(|| format!("Failed to approve user#{}", args.user))?;
    out.emit(
        &Joined {
            tournament,
            participant,
        },
        |j| println!("Approved: user#{} is {} in {}", args.user, j.participant, j.tournament),
    )
}

pub fn reject<S: TournamentStore>(args: DecideArgs, service: &Service<S>, out: Output) -> Result<()> {
    let tournament = TournamentId(args.tournament);
    service
        .reject_application(tournament, UserId(args.owner), UserId(args.user))
        .with_context(|| format!("Failed to reject user#{}", args.user))?;
    out.emit(&serde_json::json!({ "rejected": args.user }), |_| {
        println!("Rejected application from user#{}", args.user);
    })
}

pub fn applications<S: TournamentStore>(
    args: ApplicationsArgs,
    service: &Service<S>,
    out: Output,
) -> Result<()> {
    let tournament = TournamentId(args.tournament);
    let applications = service
        .applications(tournament)
        .with_context(|| format!("Failed to list applications for {}", tournament))?;
    out.emit(&applications, |apps| {
        if apps.is_empty() {
            println!("No pending applications");
        }
        for a in apps {
            let handle = a.handle.as_deref().map(|h| format!(" (@{})", h)).unwrap_or_default();
            println!("{:<12} {}{}  {}", a.user_id.to_string(), a.name, handle, a.text);
        }
    })
}

pub fn team<S: TournamentStore>(args: TeamArgs, service: &Service<S>, out: Output) -> Result<()> {
    let tournament = TournamentId(args.tournament);
    let roster = args.members.into_iter().map(UserId).collect();
    let participant = service
        .register_team(tournament, UserId(args.owner), args.name, roster)
        .with_context(|| format!("Failed to register team in {}", tournament))?;
    out.emit(
        &Joined {
            tournament,
            participant,
        },
        |j| println!("Team registered as {} in {}", j.participant, j.tournament),
    )
}

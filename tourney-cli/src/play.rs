//! Round commands - start, report, resolve, advance

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use tourney_core::{MatchId, MatchResult, TournamentId, UserId};
use tourney_service::{Service, TournamentStore};

use crate::output::{print_outcome, print_progress, state_label, Output};

// ============================================================================
// COMMAND ARGUMENTS
// ============================================================================

/// Match result as typed on the command line
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ResultArg {
    /// The first-listed participant won
    P1,
    /// The second-listed participant won
    P2,
    Draw,
}

impl From<ResultArg> for MatchResult {
    fn from(arg: ResultArg) -> Self {
        match arg {
            ResultArg::P1 => MatchResult::P1Won,
            ResultArg::P2 => MatchResult::P2Won,
            ResultArg::Draw => MatchResult::Draw,
        }
    }
}

#[derive(Args)]
pub struct StartArgs {
    /// Tournament id
    pub tournament: u64,

    /// Owner's user id
    #[arg(long)]
    pub owner: i64,
}

#[derive(Args)]
pub struct ReportArgs {
    /// Tournament id
    pub tournament: u64,

    /// Match id (as shown by `show`)
    #[arg(long = "match")]
    pub match_id: u64,

    /// Reporting user's id
    #[arg(long)]
    pub user: i64,

    #[arg(long, value_enum)]
    pub result: ResultArg,
}

#[derive(Args)]
pub struct ResolveArgs {
    /// Tournament id
    pub tournament: u64,

    /// Match id
    #[arg(long = "match")]
    pub match_id: u64,

    /// Owner's user id
    #[arg(long)]
    pub owner: i64,

    #[arg(long, value_enum)]
    pub result: ResultArg,
}

#[derive(Args)]
pub struct AdvanceArgs {
    /// Tournament id
    pub tournament: u64,

    /// Owner's user id
    #[arg(long)]
    pub owner: i64,
}

// ============================================================================
// COMMANDS
// ============================================================================

pub fn start<S: TournamentStore>(args: StartArgs, service: &Service<S>, out: Output) -> Result<()> {
    let tournament = TournamentId(args.tournament);
    let outcome = service
        .start_tournament(tournament, UserId(args.owner))
        .with_context(|| format!("Failed to start {}", tournament))?;
    out.emit(&outcome, print_outcome)
}

pub fn report<S: TournamentStore>(args: ReportArgs, service: &Service<S>, out: Output) -> Result<()> {
    let tournament = TournamentId(args.tournament);
    let report = service
        .report_result(
            tournament,
            MatchId(args.match_id),
            UserId(args.user),
            args.result.into(),
        )
        .with_context(|| format!("Failed to report result of M{}", args.match_id))?;
    out.emit(&report, |r| {
        println!("M{} is {}", args.match_id, state_label(r.state));
        print_progress(&r.progress);
    })
}

pub fn resolve<S: TournamentStore>(args: ResolveArgs, service: &Service<S>, out: Output) -> Result<()> {
    let tournament = TournamentId(args.tournament);
    let progress = service
        .set_result_by_admin(
            tournament,
            MatchId(args.match_id),
            UserId(args.owner),
            args.result.into(),
        )
        .with_context(|| format!("Failed to set result of M{}", args.match_id))?;
    out.emit(&progress, |p| {
        println!("M{} set to {:?}", args.match_id, args.result);
        print_progress(p);
    })
}

pub fn advance<S: TournamentStore>(args: AdvanceArgs, service: &Service<S>, out: Output) -> Result<()> {
    let tournament = TournamentId(args.tournament);
    let outcome = service
        .advance_round(tournament, UserId(args.owner))
        .with_context(|| format!("Failed to advance {}", tournament))?;
    out.emit(&outcome, print_outcome)
}

//! Inspection commands - show, standings, history, list

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tourney_core::{Match, Round, TournamentId, UserId};
use tourney_service::{Service, TournamentStore, TournamentSummary};

use crate::output::{describe_match, print_round, print_standings, Output};

#[derive(Args)]
pub struct ShowArgs {
    /// Tournament id
    pub tournament: u64,

    /// Round to show (defaults to the current one)
    #[arg(long)]
    pub round: Option<Round>,

    /// Show every round
    #[arg(long, conflicts_with = "round")]
    pub all: bool,
}

#[derive(Args)]
pub struct StandingsArgs {
    /// Tournament id
    pub tournament: u64,
}

#[derive(Args)]
pub struct HistoryArgs {
    /// Tournament id
    pub tournament: u64,

    /// User whose matches to list
    #[arg(long)]
    pub user: i64,
}

#[derive(Args)]
pub struct ListArgs {
    /// Only tournaments this user owns or plays in
    #[arg(long)]
    pub user: Option<i64>,
}

#[derive(Serialize)]
struct RoundView<'a> {
    tournament: TournamentId,
    title: &'a str,
    current_round: Round,
    total_rounds: Round,
    finished: bool,
    matches: Vec<&'a Match>,
}

pub fn show<S: TournamentStore>(args: ShowArgs, service: &Service<S>, out: Output) -> Result<()> {
    let id = TournamentId(args.tournament);
    let t = service
        .tournament(id)
        .with_context(|| format!("Failed to load {}", id))?;

    let rounds: Vec<Round> = if args.all {
        t.rounds.keys().copied().collect()
    } else {
        vec![args.round.unwrap_or(t.current_round)]
    };
    let view = RoundView {
        tournament: t.id,
        title: &t.title,
        current_round: t.current_round,
        total_rounds: t.total_rounds,
        finished: t.is_finished(),
        matches: rounds
            .iter()
            .flat_map(|&r| t.round_matches(r).iter())
            .collect(),
    };

    out.emit(&view, |v| {
        println!("{} \"{}\" ({} system)", v.tournament, v.title, t.system);
        if !t.is_started() {
            println!("Not started, {} participant(s) registered", t.participants.len());
            for p in &t.participants {
                println!("  {:<4} {}", p.id.to_string(), p.display_name());
            }
            return;
        }
        println!(
            "Round {}/{}{}",
            v.current_round,
            v.total_rounds,
            if v.finished { " (finished)" } else { "" }
        );
        for &round in &rounds {
            print_round(&t, round);
        }
    })
}

pub fn standings<S: TournamentStore>(
    args: StandingsArgs,
    service: &Service<S>,
    out: Output,
) -> Result<()> {
    let id = TournamentId(args.tournament);
    let standings = service
        .standings(id)
        .with_context(|| format!("Failed to compute standings of {}", id))?;
    out.emit(&standings, |s| print_standings(s))
}

pub fn history<S: TournamentStore>(args: HistoryArgs, service: &Service<S>, out: Output) -> Result<()> {
    let id = TournamentId(args.tournament);
    let user = UserId(args.user);
    let matches = service
        .participant_history(id, user)
        .with_context(|| format!("Failed to load history of {}", user))?;
    let t = service.tournament(id)?;

    out.emit(&matches, |ms| {
        if ms.is_empty() {
            println!("{} has not played yet", user);
        }
        for m in ms {
            println!("R{:<3} {}", m.round, describe_match(&t, m));
        }
    })
}

pub fn list<S: TournamentStore>(args: ListArgs, service: &Service<S>, out: Output) -> Result<()> {
    let summaries: Vec<TournamentSummary> = match args.user {
        Some(user) => service.user_tournaments(UserId(user))?,
        None => service.tournaments()?,
    };

    out.emit(&summaries, |list| {
        if list.is_empty() {
            println!("No tournaments");
        }
        for s in list {
            let status = if s.finished {
                "finished".to_string()
            } else if s.current_round == 0 {
                "registration".to_string()
            } else {
                format!("round {}/{}", s.current_round, s.total_rounds)
            };
            println!(
                "{:<14} {:<30} {:>3} players  {}",
                s.id.to_string(),
                s.title,
                s.participants,
                status
            );
        }
    })
}

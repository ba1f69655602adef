//! Text and JSON rendering shared by all commands

use anyhow::Result;
use serde::Serialize;
use tourney_core::{Match, MatchResult, MatchState, ParticipantId, Round, Tournament};
use tourney_engine::{RoundOutcome, Standing};
use tourney_service::Progress;

/// Where command output goes: human-readable text or pretty JSON
#[derive(Clone, Copy, Debug)]
pub struct Output {
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    /// Print `value` as JSON, or hand it to `text` for the plain rendering
    pub fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce(&T)) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            text(value);
        }
        Ok(())
    }
}

// ============================================================================
// Formatting utilities
// ============================================================================

pub fn result_label(result: Option<MatchResult>) -> &'static str {
    match result {
        Some(MatchResult::P1Won) => "p1 won",
        Some(MatchResult::P2Won) => "p2 won",
        Some(MatchResult::Draw) => "draw",
        None => "-",
    }
}

pub fn state_label(state: MatchState) -> &'static str {
    match state {
        MatchState::Scheduled => "scheduled",
        MatchState::Completed => "completed",
        MatchState::Conflicted => "CONFLICT",
    }
}

/// "M3  Ann vs Bob  [completed: p1 won]"
pub fn describe_match(tournament: &Tournament, game: &Match) -> String {
    let name = |p: ParticipantId| {
        tournament
            .participant(p)
            .map(|p| p.display_name())
            .unwrap_or_else(|| p.to_string())
    };
    let mut line = format!(
        "{:<5} {} vs {}  [{}",
        game.id.to_string(),
        name(game.p1),
        name(game.p2),
        state_label(game.state)
    );
    match game.state {
        MatchState::Completed => {
            line.push_str(": ");
            line.push_str(result_label(game.result));
        }
        MatchState::Conflicted => {
            line.push_str(&format!(
                ": p1 says {}, p2 says {}",
                result_label(game.opinion_p1),
                result_label(game.opinion_p2)
            ));
        }
        MatchState::Scheduled => {}
    }
    line.push(']');
    line
}

pub fn print_round(tournament: &Tournament, round: Round) {
    println!("\n--- Round {} ---", round);
    for game in tournament.round_matches(round) {
        println!("  {}", describe_match(tournament, game));
    }
    let seated: Vec<_> = tournament
        .round_matches(round)
        .iter()
        .flat_map(|m| [m.p1, m.p2])
        .collect();
    // A bye in the round is whoever had one but is not seated
    if round == tournament.current_round {
        for p in tournament.byes.iter().filter(|p| !seated.contains(p)) {
            if let Some(participant) = tournament.participant(p) {
                println!("  bye: {}", participant.display_name());
            }
        }
    }
}

pub fn print_standings(standings: &[Standing]) {
    println!(
        "\n{:>3}  {:<28} {:>6} {:>4} {:>4} {:>4} {:>8}",
        "#", "Participant", "Score", "W", "D", "L", "Buchholz"
    );
    println!("{}", "-".repeat(64));
    for (rank, s) in standings.iter().enumerate() {
        println!(
            "{:>3}  {:<28} {:>6.1} {:>4} {:>4} {:>4} {:>8.1}{}",
            rank + 1,
            s.name,
            s.score,
            s.wins,
            s.draws,
            s.losses,
            s.buchholz,
            if s.had_bye { "  (bye)" } else { "" }
        );
    }
}

pub fn print_outcome(outcome: &RoundOutcome) {
    match outcome {
        RoundOutcome::Advanced { round, matches, bye } => {
            println!("Round {} drawn with {} match(es)", round, matches.len());
            if let Some(bye) = bye {
                println!("Bye: {}", bye);
            }
        }
        RoundOutcome::Finished => println!("Tournament finished"),
        RoundOutcome::EndedEarly { round, unpaired } => print_ended_early(*round, unpaired),
    }
}

pub fn print_progress(progress: &Progress) {
    match progress {
        Progress::Pending { pending } => {
            println!("Waiting for {} match(es) in this round", pending)
        }
        Progress::Advanced { round, bye } => {
            println!("Round closed, round {} drawn", round);
            if let Some(bye) = bye {
                println!("Bye: {}", bye);
            }
        }
        Progress::Finished => println!("Tournament finished"),
        Progress::EndedEarly { round, unpaired } => print_ended_early(*round, unpaired),
    }
}

fn print_ended_early(round: Round, unpaired: &[ParticipantId]) {
    let names: Vec<_> = unpaired.iter().map(|p| p.to_string()).collect();
    println!(
        "Tournament finished early: round {} cannot be paired without rematches (unpaired: {})",
        round,
        names.join(", ")
    );
}

//! Simulate command - run a whole tournament with random results
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: register_players(), play_round()
//! - Level 3: pick_result()
//! - Level 4: create_rng()

use anyhow::{bail, Context, Result};
use clap::Args;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tourney_core::{MatchResult, ParticipantId, Round, Tournament, TournamentId, UserId};
use tourney_engine::Standing;
use tourney_service::{Application, MemoryStore, Progress, Service, ServiceConfig};

use crate::output::{print_round, print_standings, Output};

const OWNER: UserId = UserId(1);
/// Simulated players get user ids from here on
const FIRST_PLAYER: i64 = 1000;

// ============================================================================
// COMMAND ARGUMENTS
// ============================================================================

#[derive(Args)]
pub struct SimulateArgs {
    /// Number of players
    #[arg(long, default_value = "8")]
    pub players: usize,

    /// Probability that a match ends in a draw
    #[arg(long, default_value = "0.1")]
    pub draw_rate: f64,

    /// Probability that the two players report different results
    #[arg(long, default_value = "0.05")]
    pub conflict_rate: f64,

    /// Print every round, not just the final table
    #[arg(long)]
    pub verbose: bool,
}

#[derive(Serialize)]
struct SimulationReport {
    players: usize,
    rounds_played: Round,
    total_rounds: Round,
    conflicts_resolved: usize,
    ended_early: bool,
    standings: Vec<Standing>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run simulate command
///
/// 1. Register players through the apply/approve workflow
/// 2. Start, then play rounds until the event finishes
/// 3. Report the final standings
pub fn run(args: SimulateArgs, config: ServiceConfig, out: Output) -> Result<()> {
    if args.players < 2 {
        bail!("A simulation needs at least 2 players, got {}", args.players);
    }
    ensure_rate("draw rate", args.draw_rate)?;
    ensure_rate("conflict rate", args.conflict_rate)?;
    let mut rng = create_rng(config.seed.map(|s| s.wrapping_add(1)));
    let service = Service::new(MemoryStore::new(), config.with_auto_advance(true));

    let id = service.create_tournament(OWNER, "Simulation")?;
    register_players(&service, id, args.players)?;
    service
        .start_tournament(id, OWNER)
        .context("Failed to start simulation")?;

    tracing::info!("Simulating {} players", args.players);

    let mut conflicts_resolved = 0;
    let mut ended_early = false;
    loop {
        let t = service.tournament(id)?;
        let (progress, conflicts) = play_round(&service, &t, &args, &mut rng)?;
        conflicts_resolved += conflicts;
        if args.verbose && !out.is_json() {
            print_round(&service.tournament(id)?, t.current_round);
        }

        match progress {
            Progress::Advanced { .. } => continue,
            Progress::Finished => break,
            Progress::EndedEarly { .. } => {
                ended_early = true;
                break;
            }
            Progress::Pending { pending } => {
                bail!("Round {} still has {} open match(es)", t.current_round, pending)
            }
        }
    }

    let t = service.tournament(id)?;
    let report = SimulationReport {
        players: args.players,
        rounds_played: t.current_round,
        total_rounds: t.total_rounds,
        conflicts_resolved,
        ended_early,
        standings: service.standings(id)?,
    };

    out.emit(&report, |r| {
        println!(
            "\n=== Simulation: {} players, {}/{} rounds ===",
            r.players, r.rounds_played, r.total_rounds
        );
        if r.ended_early {
            println!("Stopped early: no rematch-free pairing left");
        }
        println!("Conflicts resolved by owner: {}", r.conflicts_resolved);
        print_standings(&r.standings);
    })
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn register_players(service: &Service<MemoryStore>, id: TournamentId, players: usize) -> Result<()> {
    for i in 0..players {
        let user = UserId(FIRST_PLAYER + i as i64);
        service.apply(
            Application::new(id, user, format!("Player {:02}", i + 1))
                .with_handle(format!("p{}", i + 1)),
        )?;
        service.approve_application(id, OWNER, user)?;
    }
    Ok(())
}

/// Report every match of the current round from both sides. Returns the
/// progress after the last result and the number of owner interventions.
fn play_round(
    service: &Service<MemoryStore>,
    t: &Tournament,
    args: &SimulateArgs,
    rng: &mut ChaCha8Rng,
) -> Result<(Progress, usize)> {
    let id = t.id;
    let mut progress = Progress::Pending {
        pending: t.current_matches().len(),
    };
    let mut conflicts = 0;

    for game in t.current_matches() {
        let result = pick_result(rng, args.draw_rate);
        let p1_user = roster_head(t, game.p1)?;
        let p2_user = roster_head(t, game.p2)?;

        service.report_result(id, game.id, p1_user, result)?;
        let claimed = if rng.gen_bool(args.conflict_rate) {
            disputed(result)
        } else {
            result
        };
        let report = service.report_result(id, game.id, p2_user, claimed)?;
        progress = report.progress;

        if claimed != result {
            conflicts += 1;
            progress = service.set_result_by_admin(id, game.id, OWNER, result)?;
        }
    }
    Ok((progress, conflicts))
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn pick_result(rng: &mut ChaCha8Rng, draw_rate: f64) -> MatchResult {
    if rng.gen_bool(draw_rate) {
        MatchResult::Draw
    } else if rng.gen_bool(0.5) {
        MatchResult::P1Won
    } else {
        MatchResult::P2Won
    }
}

/// What a sore loser claims instead
fn disputed(result: MatchResult) -> MatchResult {
    match result {
        MatchResult::P1Won => MatchResult::P2Won,
        MatchResult::P2Won => MatchResult::P1Won,
        MatchResult::Draw => MatchResult::P1Won,
    }
}

/// Probabilities must lie in [0, 1]; NaN fails the range check too
fn ensure_rate(name: &str, rate: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&rate) {
        bail!("The {} must be between 0 and 1, got {}", name, rate);
    }
    Ok(())
}

fn roster_head(t: &Tournament, p: ParticipantId) -> Result<UserId> {
    t.participant(p)
        .and_then(|p| p.roster.first().copied())
        .with_context(|| format!("{} has no roster", p))
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Create RNG from seed or random
fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

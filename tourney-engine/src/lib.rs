//! TOURNEY Engine - Round scheduling and result resolution
//!
//! This crate drives a single tournament aggregate:
//! - Pairing (random first round, Swiss afterwards)
//! - Match consensus from two-sided result opinions
//! - Round advancement, scoring and byes
//! - Standings
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: advance_round (orchestration)
//! - Level 2: pair_round, report_opinion, set_result_by_admin (phases)
//! - Level 3: pair_first_round, pair_swiss, apply_round_scores (steps)
//! - Level 4: ranking and bye selection utilities

mod consensus;
mod pairing;
mod round;
mod standings;

pub use consensus::{report_opinion, set_result_by_admin};
pub use pairing::{pair_first_round, pair_round, pair_swiss, Pairing};
pub use round::{
    advance_round, swiss_round_count, RoundOutcome, BYE_POINTS, DRAW_POINTS, WIN_POINTS,
};
pub use standings::{compute_standings, Standing};

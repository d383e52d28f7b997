//! Pure computation engine for scoring fixtures and building the table.

pub mod clean_sheet;
pub mod scoring;
pub mod standings;

pub use clean_sheet::{CleanSheetRule, Tally};
pub use scoring::{decide, score, score_tallies, ScoringError, DRAW_POINTS, LOSS_POINTS, WIN_POINTS};
pub use standings::{compute_standings, Standing};

//! Hero matchup win rates from tournament match reports.
//!
//! Report files are fetched from a hosted data repository, filtered by
//! patch, tournament and tracked players, and folded into an attacker by
//! defender win-rate matrix.
//!
//! The aggregation core lives in [`analysis`] and is pure: give
//! [`analysis::matrix::compute_matrix`] the raw report lines and a
//! [`analysis::tally::PlayerFilter`] and it returns the percentage matrix.

pub mod analysis;
pub mod api;
pub mod cache;
pub mod config;
pub mod display;
pub mod error;
pub mod rate_limit;
pub mod selection;

pub use analysis::matrix::{compute_matrix, PercentPair, PercentageMatrix};
pub use analysis::tally::{tally, PlayerFilter, TallyCell, TallyMatrix};
pub use error::AppError;

pub mod heroes;
pub mod matrix;
pub mod record;
pub mod tally;

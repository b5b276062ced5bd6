pub mod colors;
pub mod output;

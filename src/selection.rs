use crate::analysis::tally::PlayerFilter;
use crate::api::client::ReportSource;
use crate::error::AppError;
use std::fs;
use std::path::Path;

/// Patches, tournaments and tracked players chosen for one table.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub patches: Vec<String>,
    pub tournaments: Vec<String>,
    pub players: Vec<String>,
}

impl Selection {
    /// Fails with [`AppError::EmptySelection`] before anything is fetched.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.patches.is_empty() || self.tournaments.is_empty() {
            return Err(AppError::EmptySelection);
        }
        Ok(())
    }

    /// One report file per patch and tournament pair, duplicates removed.
    pub fn sources(&self) -> Vec<ReportSource> {
        let mut sources: Vec<ReportSource> = Vec::new();
        for patch in &self.patches {
            for tournament in &self.tournaments {
                let source = ReportSource::new(patch, tournament);
                if !sources.contains(&source) {
                    sources.push(source);
                }
            }
        }
        sources
    }

    pub fn player_filter(&self) -> PlayerFilter {
        PlayerFilter::new(self.players.iter().cloned())
    }
}

/// One name per line; surrounding whitespace trimmed, blank lines dropped.
pub fn parse_player_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| name.to_string())
        .collect()
}

pub fn load_player_file(path: &Path) -> Result<Vec<String>, AppError> {
    let content = fs::read_to_string(path).map_err(|e| {
        AppError::IoError(format!("Failed to read {}: {}", path.display(), e))
    })?;
    Ok(parse_player_list(&content))
}

/// Case-insensitive substring match over player names.
pub fn search_players<'a>(players: &'a [String], term: &str) -> Vec<&'a String> {
    let term = term.to_lowercase();
    players
        .iter()
        .filter(|name| name.to_lowercase().contains(&term))
        .collect()
}

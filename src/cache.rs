use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use chrono::{DateTime, Duration, Utc};
use crate::api::client::ReportSource;
use crate::error::AppError;
use tracing::{debug, info, warn};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CachedReport {
    pub lines: Vec<String>,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CachedListing {
    pub patches: Vec<String>,
    pub tournaments: Vec<String>,
    pub cached_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RepoCache {
    pub repo: String,
    pub last_updated: DateTime<Utc>,
    pub listing: Option<CachedListing>,
    pub reports: HashMap<String, CachedReport>,
}

/// `~/.pvzh_winrates`, falling back to the working directory.
pub fn app_dir() -> PathBuf {
    let dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".pvzh_winrates");

    let _ = fs::create_dir_all(&dir);
    dir
}

fn is_stale(timestamp: DateTime<Utc>, max_age_mins: u32) -> bool {
    let age = Utc::now().signed_duration_since(timestamp);
    Duration::try_minutes(i64::from(max_age_mins)).map_or(false, |max_age| age > max_age)
}

/// Lines gathered from a batch of fetches, plus the keys that failed.
#[derive(Debug, Default, PartialEq)]
pub struct FetchOutcome {
    pub lines: Vec<String>,
    pub skipped: Vec<String>,
}

impl RepoCache {
    pub fn new(repo: &str) -> Self {
        RepoCache {
            repo: repo.to_string(),
            last_updated: Utc::now(),
            listing: None,
            reports: HashMap::new(),
        }
    }

    pub fn get_cache_path(repo: &str) -> PathBuf {
        app_dir().join(format!("{}.cache.json", repo.replace('/', "_")))
    }

    pub fn load(repo: &str) -> Result<Self, AppError> {
        Self::load_from(&Self::get_cache_path(repo), repo)
    }

    pub fn load_from(path: &Path, repo: &str) -> Result<Self, AppError> {
        match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content)
                .map_err(|e| AppError::JsonError(format!("Failed to parse cache: {}", e))),
            // No cache yet
            Err(_) => Ok(RepoCache::new(repo)),
        }
    }

    pub fn save(&self) -> Result<(), AppError> {
        self.save_to(&Self::get_cache_path(&self.repo))
    }

    pub fn save_to(&self, path: &Path) -> Result<(), AppError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::JsonError(format!("Failed to serialize cache: {}", e)))?;

        fs::write(path, json)
            .map_err(|e| AppError::IoError(format!("Failed to write cache: {}", e)))?;

        Ok(())
    }

    pub fn fresh_listing(&self, max_age_mins: u32) -> Option<&CachedListing> {
        self.listing
            .as_ref()
            .filter(|listing| !is_stale(listing.cached_at, max_age_mins))
    }

    pub fn set_listing(&mut self, patches: Vec<String>, tournaments: Vec<String>) {
        self.listing = Some(CachedListing {
            patches,
            tournaments,
            cached_at: Utc::now(),
        });
        self.last_updated = Utc::now();
    }

    pub fn fresh_report(&self, source: &ReportSource, max_age_mins: u32) -> Option<&[String]> {
        self.reports
            .get(&source.key())
            .filter(|report| !is_stale(report.fetched_at, max_age_mins))
            .map(|report| report.lines.as_slice())
    }

    pub fn put_report(&mut self, source: &ReportSource, lines: Vec<String>) {
        self.reports.insert(
            source.key(),
            CachedReport {
                lines,
                fetched_at: Utc::now(),
            },
        );
        self.last_updated = Utc::now();
    }

    /// Caches every successful fetch and collects its lines. Failed sources
    /// are skipped and leave no cache entry.
    pub fn absorb_fetched(
        &mut self,
        results: Vec<(ReportSource, Result<Vec<String>, AppError>)>,
    ) -> FetchOutcome {
        let mut outcome = FetchOutcome::default();

        for (source, result) in results {
            match result {
                Ok(report) => {
                    info!(source = %source.key(), lines = report.len(), "report fetched");
                    outcome.lines.extend(report.iter().cloned());
                    self.put_report(&source, report);
                }
                Err(e) => {
                    warn!(source = %source.key(), error = %e, "skipping unavailable report");
                    outcome.skipped.push(source.key());
                }
            }
        }

        outcome
    }

    /// Drops reports and the listing once they are older than `max_age_mins`.
    /// Returns how many reports were removed.
    pub fn prune_stale(&mut self, max_age_mins: u32) -> usize {
        let before = self.reports.len();
        self.reports
            .retain(|_, report| !is_stale(report.fetched_at, max_age_mins));

        if self
            .listing
            .as_ref()
            .is_some_and(|listing| is_stale(listing.cached_at, max_age_mins))
        {
            self.listing = None;
        }

        let removed = before - self.reports.len();
        if removed > 0 {
            debug!(removed, "pruned stale cached reports");
        }
        removed
    }
}

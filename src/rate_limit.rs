use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use chrono::{DateTime, Utc, Duration};
use crate::cache::app_dir;
use crate::error::AppError;

// GitHub contents API budgets
const UNAUTHENTICATED_PER_HOUR: u32 = 60;
const AUTHENTICATED_PER_HOUR: u32 = 5000;

pub fn hourly_budget(has_token: bool) -> u32 {
    if has_token {
        AUTHENTICATED_PER_HOUR
    } else {
        UNAUTHENTICATED_PER_HOUR
    }
}

/// Persisted count of contents API requests in the current hour.
#[derive(Debug, Serialize, Deserialize)]
pub struct RequestLog {
    pub requests_this_hour: u32,
    pub last_request: DateTime<Utc>,
    pub hour_reset: DateTime<Utc>,
}

impl RequestLog {
    pub fn new() -> Self {
        let now = Utc::now();
        RequestLog {
            requests_this_hour: 0,
            last_request: now,
            hour_reset: now + Duration::hours(1),
        }
    }

    pub fn get_log_path() -> PathBuf {
        app_dir().join("requests.json")
    }

    pub fn load() -> Result<Self, AppError> {
        Self::load_from(&Self::get_log_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, AppError> {
        match fs::read_to_string(path) {
            Ok(content) => {
                let mut log: RequestLog = serde_json::from_str(&content).map_err(|e| {
                    AppError::JsonError(format!("Failed to parse request log: {}", e))
                })?;
                log.roll_window(Utc::now());
                Ok(log)
            }
            Err(_) => Ok(RequestLog::new()),
        }
    }

    pub fn save(&self) -> Result<(), AppError> {
        self.save_to(&Self::get_log_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), AppError> {
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            AppError::JsonError(format!("Failed to serialize request log: {}", e))
        })?;

        fs::write(path, json)
            .map_err(|e| AppError::IoError(format!("Failed to write request log: {}", e)))?;

        Ok(())
    }

    /// Starts a new hour once the reset time has passed.
    pub fn roll_window(&mut self, now: DateTime<Utc>) {
        if now > self.hour_reset {
            self.requests_this_hour = 0;
            self.hour_reset = now + Duration::hours(1);
        }
    }

    pub fn can_make_request(&self, budget: u32) -> bool {
        self.requests_this_hour < budget
    }

    pub fn record_requests(&mut self, count: u32) {
        if count == 0 {
            return;
        }
        self.requests_this_hour += count;
        self.last_request = Utc::now();
    }

    pub fn get_remaining(&self, budget: u32) -> u32 {
        budget.saturating_sub(self.requests_this_hour)
    }

    pub fn display_status(&self, budget: u32) {
        let until_reset = self.hour_reset.signed_duration_since(Utc::now());

        println!("\n📊 Contents API usage");
        println!("   Hourly:    {}/{} requests", self.requests_this_hour, budget);
        println!("   Remaining: {} requests", self.get_remaining(budget));
        println!(
            "   Reset in:  {}m\n",
            until_reset.num_minutes().max(0)
        );
    }
}

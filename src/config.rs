use crate::error::AppError;
use std::env;

const DEFAULT_REPO: &str = "pvzh-winrates/pvzh-winrates.github.io";
const DEFAULT_DATA_DIR: &str = "datafiles";
const DEFAULT_PLAYERS_URL: &str = "https://pvzh-winrates.github.io/playernames.txt";
// One year
const MAX_CACHE_TTL_MINS: u32 = 60 * 24 * 365;

#[derive(Debug, Clone)]
pub struct Config {
    /// `owner/name` of the repository holding the report files
    pub repo: String,
    pub data_dir: String,
    pub players_url: String,
    pub github_token: Option<String>,
    pub cache_ttl_mins: u32,
    pub max_concurrent_fetches: usize,
    pub requests_per_second: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let repo = lookup("WINRATES_REPO").unwrap_or_else(|| DEFAULT_REPO.to_string());
        if repo.split('/').filter(|part| !part.is_empty()).count() != 2 {
            return Err(AppError::ConfigError(format!(
                "WINRATES_REPO must look like owner/name, got '{}'",
                repo
            )));
        }

        let data_dir = lookup("WINRATES_DATA_DIR")
            .map(|dir| dir.trim_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());
        let players_url =
            lookup("WINRATES_PLAYERS_URL").unwrap_or_else(|| DEFAULT_PLAYERS_URL.to_string());
        let github_token = lookup("GITHUB_TOKEN").filter(|token| !token.trim().is_empty());

        let cache_ttl_mins: u32 = parse_number(&lookup, "WINRATES_CACHE_TTL_MINS", 60)?;
        if cache_ttl_mins > MAX_CACHE_TTL_MINS {
            return Err(AppError::ConfigError(format!(
                "WINRATES_CACHE_TTL_MINS must be at most {}, got {}",
                MAX_CACHE_TTL_MINS, cache_ttl_mins
            )));
        }
        let max_concurrent_fetches = parse_positive(&lookup, "WINRATES_MAX_CONCURRENT", 4)?;
        let requests_per_second = parse_positive(&lookup, "WINRATES_REQUESTS_PER_SECOND", 5)?;

        Ok(Config {
            repo,
            data_dir,
            players_url,
            github_token,
            cache_ttl_mins,
            max_concurrent_fetches,
            requests_per_second,
        })
    }
}

fn parse_number<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| {
            AppError::ConfigError(format!("{} must be a number, got '{}'", key, raw))
        }),
        None => Ok(default),
    }
}

fn parse_positive<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + PartialOrd + Default,
{
    let value = parse_number(lookup, key, default)?;
    if value <= T::default() {
        return Err(AppError::ConfigError(format!("{} must be at least 1", key)));
    }
    Ok(value)
}

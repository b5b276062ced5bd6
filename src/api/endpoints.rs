// URL builders for the GitHub contents API of the data repository.

use crate::config::Config;
use crate::error::AppError;
use url::Url;

pub const GITHUB_API_BASE: &str = "https://api.github.com/";

fn contents_url(config: &Config, extra: &[&str]) -> Result<Url, AppError> {
    let mut url = Url::parse(GITHUB_API_BASE)
        .map_err(|e| AppError::ConfigError(format!("Bad API base URL: {}", e)))?;

    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| AppError::ConfigError("API base URL cannot hold a path".to_string()))?;
        segments.pop_if_empty();
        segments.push("repos");
        segments.extend(config.repo.split('/').filter(|s| !s.is_empty()));
        segments.push("contents");
        segments.extend(config.data_dir.split('/').filter(|s| !s.is_empty()));
        segments.extend(extra);
    }

    Ok(url)
}

/// Listing of the data directory; each sub-directory is a patch.
pub fn patches_url(config: &Config) -> Result<Url, AppError> {
    contents_url(config, &[])
}

/// Listing of one patch directory; each `.txt` file is a tournament.
pub fn tournaments_url(config: &Config, patch: &str) -> Result<Url, AppError> {
    contents_url(config, &[patch])
}

pub fn report_url(config: &Config, patch: &str, tournament: &str) -> Result<Url, AppError> {
    let file_name = format!("{}.txt", tournament);
    contents_url(config, &[patch, &file_name])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            repo: "owner/data".to_string(),
            data_dir: "datafiles".to_string(),
            players_url: "https://example.invalid/players.txt".to_string(),
            github_token: None,
            cache_ttl_mins: 60,
            max_concurrent_fetches: 4,
            requests_per_second: 5,
        }
    }

    #[test]
    fn test_patches_url() {
        let url = patches_url(&config()).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/owner/data/contents/datafiles"
        );
    }

    #[test]
    fn test_report_url_encodes_names() {
        let url = report_url(&config(), "Patch 1.2", "Spring Cup").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/owner/data/contents/datafiles/Patch%201.2/Spring%20Cup.txt"
        );
    }

    #[test]
    fn test_nested_data_dir() {
        let mut config = config();
        config.data_dir = "data/files".to_string();
        let url = tournaments_url(&config, "p1").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/owner/data/contents/data/files/p1"
        );
    }
}

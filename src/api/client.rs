use crate::config::Config;
use crate::error::AppError;
use crate::selection::parse_player_list;
use base64::Engine;
use governor::{
    clock::{Clock, DefaultClock},
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::collections::HashSet;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

use super::endpoints;
use super::models::*;

const USER_AGENT: &str = concat!("pvzh_winrates/", env!("CARGO_PKG_VERSION"));
const MAX_RETRIES: u32 = 3;

/// One report file requested from the data repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReportSource {
    pub patch: String,
    pub tournament: String,
}

impl ReportSource {
    pub fn new(patch: &str, tournament: &str) -> Self {
        ReportSource {
            patch: patch.to_string(),
            tournament: tournament.to_string(),
        }
    }

    pub fn key(&self) -> String {
        format!("{}/{}", self.patch, self.tournament)
    }
}

pub struct DataRepoClient {
    config: Config,
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    clock: DefaultClock,
    api_requests: AtomicU32,
}

impl DataRepoClient {
    pub fn new(config: Config) -> Self {
        let per_second = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_second(per_second));
        DataRepoClient {
            config,
            rate_limiter,
            clock: DefaultClock::default(),
            api_requests: AtomicU32::new(0),
        }
    }

    /// Contents API requests issued so far, including failed ones.
    pub fn api_requests(&self) -> u32 {
        self.api_requests.load(Ordering::Relaxed)
    }

    fn wait_for_slot(&self) {
        while let Err(not_until) = self.rate_limiter.check() {
            thread::sleep(not_until.wait_time_from(self.clock.now()));
        }
    }

    fn execute_request(&self, url: &str, counted: bool) -> Result<String, AppError> {
        let mut retry_count = 0;

        loop {
            self.wait_for_slot();
            if counted {
                self.api_requests.fetch_add(1, Ordering::Relaxed);
            }
            debug!(url, "GET");

            let mut request = ureq::get(url)
                .set("User-Agent", USER_AGENT)
                .set("Accept", "application/vnd.github+json");
            if let Some(token) = &self.config.github_token {
                request = request.set("Authorization", &format!("Bearer {}", token));
            }

            match request.call() {
                Ok(resp) => {
                    return resp
                        .into_string()
                        .map_err(|e| AppError::HttpError(e.to_string()));
                }
                Err(ureq::Error::Status(429, _)) => {
                    if retry_count >= MAX_RETRIES {
                        return Err(AppError::RateLimited);
                    }
                    let wait_ms = 2000 * (retry_count + 1) as u64;
                    warn!(url, wait_ms, "rate limited, backing off");
                    thread::sleep(Duration::from_millis(wait_ms));
                    retry_count += 1;
                }
                Err(ureq::Error::Status(404, _)) => {
                    return Err(AppError::NotFound(url.to_string()));
                }
                Err(ureq::Error::Status(403, _)) => {
                    // GitHub answers 403 once the hourly quota is spent
                    return Err(AppError::RateLimited);
                }
                Err(e) => {
                    return Err(AppError::HttpError(e.to_string()));
                }
            }
        }
    }

    fn get_listing(&self, url: &str) -> Result<Vec<ContentEntryDto>, AppError> {
        let body = self.execute_request(url, true)?;
        serde_json::from_str(&body).map_err(|e| AppError::JsonError(e.to_string()))
    }

    pub fn list_patches(&self) -> Result<Vec<String>, AppError> {
        let url = endpoints::patches_url(&self.config)?;
        let entries = self.get_listing(url.as_str())?;
        Ok(patches_from_entries(&entries))
    }

    /// Union of tournaments across `patches`, first seen order. A patch
    /// whose listing fails is skipped.
    pub fn list_tournaments(&self, patches: &[String]) -> Result<Vec<String>, AppError> {
        let mut seen = HashSet::new();
        let mut tournaments = Vec::new();

        for patch in patches {
            let url = endpoints::tournaments_url(&self.config, patch)?;
            match self.get_listing(url.as_str()) {
                Ok(entries) => {
                    for name in tournaments_from_entries(&entries) {
                        if seen.insert(name.clone()) {
                            tournaments.push(name);
                        }
                    }
                }
                Err(AppError::RateLimited) => return Err(AppError::RateLimited),
                Err(e) => warn!(patch = %patch, error = %e, "skipping patch listing"),
            }
        }

        Ok(tournaments)
    }

    pub fn fetch_players(&self) -> Result<Vec<String>, AppError> {
        let body = self.execute_request(&self.config.players_url, false)?;
        Ok(parse_player_list(&body))
    }

    pub fn fetch_report(&self, source: &ReportSource) -> Result<Vec<String>, AppError> {
        let url = endpoints::report_url(&self.config, &source.patch, &source.tournament)?;
        let body = self.execute_request(url.as_str(), true)?;
        let file: FileContentDto =
            serde_json::from_str(&body).map_err(|e| AppError::JsonError(e.to_string()))?;
        decode_report(&file)
    }

    /// Fetches every source, at most `max_concurrent_fetches` at a time.
    /// Results come back in the order of `sources`.
    pub fn fetch_reports<F>(
        &self,
        sources: &[ReportSource],
        on_done: F,
    ) -> Vec<(ReportSource, Result<Vec<String>, AppError>)>
    where
        F: Fn() + Sync,
    {
        let mut results = Vec::with_capacity(sources.len());

        for batch in sources.chunks(self.config.max_concurrent_fetches.max(1)) {
            let batch_results: Vec<_> = thread::scope(|scope| {
                let handles: Vec<_> = batch
                    .iter()
                    .map(|source| {
                        let on_done = &on_done;
                        scope.spawn(move || {
                            let result = self.fetch_report(source);
                            on_done();
                            result
                        })
                    })
                    .collect();

                handles
                    .into_iter()
                    .map(|handle| {
                        handle.join().unwrap_or_else(|_| {
                            Err(AppError::HttpError("fetch thread panicked".to_string()))
                        })
                    })
                    .collect()
            });

            results.extend(batch.iter().cloned().zip(batch_results));
        }

        results
    }
}

pub fn patches_from_entries(entries: &[ContentEntryDto]) -> Vec<String> {
    entries
        .iter()
        .filter(|e| e.is_dir())
        .map(|e| e.name.clone())
        .collect()
}

pub fn tournaments_from_entries(entries: &[ContentEntryDto]) -> Vec<String> {
    entries
        .iter()
        .filter(|e| e.is_file())
        .filter_map(|e| e.name.strip_suffix(".txt"))
        .map(|name| name.to_string())
        .collect()
}

/// Decodes a contents API file into its non-blank lines.
pub fn decode_report(file: &FileContentDto) -> Result<Vec<String>, AppError> {
    if !file.encoding.is_empty() && file.encoding != "base64" {
        return Err(AppError::DecodeError(format!(
            "{}: unsupported encoding '{}'",
            file.name, file.encoding
        )));
    }

    let compact: String = file.content.split_whitespace().collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(compact)
        .map_err(|e| AppError::DecodeError(format!("{}: {}", file.name, e)))?;
    let text = String::from_utf8(bytes)
        .map_err(|e| AppError::DecodeError(format!("{}: {}", file.name, e)))?;

    Ok(split_report_lines(&text))
}

pub fn split_report_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entry(name: &str, kind: &str) -> ContentEntryDto {
        ContentEntryDto {
            name: name.to_string(),
            kind: kind.to_string(),
        }
    }

    #[test]
    fn test_patches_are_directories() {
        let entries = vec![
            entry("2024-05", "dir"),
            entry("notes.txt", "file"),
            entry("2024-08", "dir"),
        ];
        assert_eq!(patches_from_entries(&entries), vec!["2024-05", "2024-08"]);
    }

    #[test]
    fn test_tournaments_are_txt_files() {
        let entries = vec![
            entry("Spring Cup.txt", "file"),
            entry("README.md", "file"),
            entry("archive.txt", "dir"),
            entry("Finals.txt", "file"),
        ];
        assert_eq!(
            tournaments_from_entries(&entries),
            vec!["Spring Cup", "Finals"]
        );
    }

    #[test]
    fn test_decode_report_with_wrapped_base64() {
        let text = "m|Alice|Bob|gs|sb|x|y\n\n  \nm|Bob|Alice|sb|gs|x|y\r\n";
        let encoded = base64::engine::general_purpose::STANDARD.encode(text);
        let (head, tail) = encoded.split_at(10);
        let file = FileContentDto {
            name: "cup.txt".to_string(),
            content: format!("{}\n{}\n", head, tail),
            encoding: "base64".to_string(),
        };

        assert_eq!(
            decode_report(&file).unwrap(),
            vec!["m|Alice|Bob|gs|sb|x|y", "m|Bob|Alice|sb|gs|x|y"]
        );
    }

    #[test]
    fn test_decode_report_rejects_garbage() {
        let file = FileContentDto {
            name: "cup.txt".to_string(),
            content: "!!not base64!!".to_string(),
            encoding: "base64".to_string(),
        };
        assert!(matches!(decode_report(&file), Err(AppError::DecodeError(_))));

        let file = FileContentDto {
            name: "big.txt".to_string(),
            content: String::new(),
            encoding: "none".to_string(),
        };
        assert!(matches!(decode_report(&file), Err(AppError::DecodeError(_))));
    }

    #[test]
    fn test_source_key() {
        assert_eq!(ReportSource::new("p1", "Cup").key(), "p1/Cup");
    }
}

use std::path::PathBuf;

use clap::Parser;
use indicatif::ProgressBar;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pvzh_winrates::api::client::{DataRepoClient, ReportSource};
use pvzh_winrates::cache::RepoCache;
use pvzh_winrates::config::Config;
use pvzh_winrates::display::output::{
    display_error, display_info, display_listing, display_matrix, display_success,
    display_tallies, display_warning,
};
use pvzh_winrates::rate_limit::{hourly_budget, RequestLog};
use pvzh_winrates::selection::{load_player_file, search_players, Selection};
use pvzh_winrates::{compute_matrix, tally, AppError, PercentageMatrix};

#[derive(Parser, Debug)]
#[command(name = "PvZH Winrates")]
#[command(about = "Hero matchup win rates from tournament match reports", long_about = None)]
struct Args {
    /// Patch to include (repeatable)
    #[arg(short, long)]
    patch: Vec<String>,

    /// Tournament to include (repeatable)
    #[arg(short, long)]
    tournament: Vec<String>,

    /// Tracked player (repeatable); without any, every game counts
    #[arg(short = 'P', long)]
    player: Vec<String>,

    /// File with tracked players, one per line
    #[arg(long)]
    players_file: Option<PathBuf>,

    /// List available patches, tournaments and players
    #[arg(long)]
    list: bool,

    /// Case-insensitive filter for the player list
    #[arg(long)]
    search: Option<String>,

    /// Also print raw win/game counts
    #[arg(long)]
    counts: bool,

    /// Ignore the on-disk cache
    #[arg(long)]
    refresh: bool,

    /// Log filter used when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() {
    let args = Args::parse();
    init_logging(&args.log_level);

    if let Err(e) = run(args) {
        display_error(&e.to_string());
        std::process::exit(1);
    }
}

fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(args: Args) -> Result<(), AppError> {
    let config = Config::from_env()?;
    let budget = hourly_budget(config.github_token.is_some());
    info!(repo = %config.repo, budget, "starting");

    let mut request_log = RequestLog::load().unwrap_or_else(|e| {
        warn!(error = %e, "request log unreadable, starting a new one");
        RequestLog::new()
    });

    let mut cache = if args.refresh {
        RepoCache::new(&config.repo)
    } else {
        RepoCache::load(&config.repo).unwrap_or_else(|e| {
            warn!(error = %e, "cache unreadable, starting empty");
            RepoCache::new(&config.repo)
        })
    };

    let client = DataRepoClient::new(config.clone());

    let result = if args.list {
        run_listing(&args, &config, &client, &mut cache, &request_log, budget)
    } else {
        run_matrix(&args, &config, &client, &mut cache, &request_log, budget)
    };

    let requests = client.api_requests();
    if requests > 0 {
        request_log.record_requests(requests);
        if let Err(e) = request_log.save() {
            warn!(error = %e, "could not save request log");
        }
        request_log.display_status(budget);
    }
    cache.prune_stale(config.cache_ttl_mins);
    if let Err(e) = cache.save() {
        warn!(error = %e, "could not save cache");
    }

    result
}

fn ensure_budget(request_log: &RequestLog, budget: u32) -> Result<(), AppError> {
    if request_log.can_make_request(budget) {
        return Ok(());
    }
    request_log.display_status(budget);
    Err(AppError::RateLimited)
}

fn run_listing(
    args: &Args,
    config: &Config,
    client: &DataRepoClient,
    cache: &mut RepoCache,
    request_log: &RequestLog,
    budget: u32,
) -> Result<(), AppError> {
    let (patches, tournaments) = match cache.fresh_listing(config.cache_ttl_mins) {
        Some(listing) => {
            display_success("⚡ Using cached patch and tournament listing");
            (listing.patches.clone(), listing.tournaments.clone())
        }
        None => {
            ensure_budget(request_log, budget)?;
            display_info("Fetching patch and tournament listing...");
            let patches = client.list_patches()?;
            let tournaments = client.list_tournaments(&patches)?;
            cache.set_listing(patches.clone(), tournaments.clone());
            (patches, tournaments)
        }
    };

    let players = match &args.players_file {
        Some(path) => load_player_file(path)?,
        None => client.fetch_players().unwrap_or_else(|e| {
            warn!(error = %e, url = %config.players_url, "player list unavailable");
            Vec::new()
        }),
    };
    let shown = search_players(&players, args.search.as_deref().unwrap_or(""));

    display_listing(&patches, &tournaments, &shown);
    Ok(())
}

fn run_matrix(
    args: &Args,
    config: &Config,
    client: &DataRepoClient,
    cache: &mut RepoCache,
    request_log: &RequestLog,
    budget: u32,
) -> Result<(), AppError> {
    let mut players = args.player.clone();
    if let Some(path) = &args.players_file {
        players.extend(load_player_file(path)?);
    }

    let selection = Selection {
        patches: args.patch.clone(),
        tournaments: args.tournament.clone(),
        players,
    };
    selection.validate()?;

    let sources = selection.sources();
    let mut lines: Vec<String> = Vec::new();
    let mut to_fetch: Vec<ReportSource> = Vec::new();

    for source in &sources {
        match cache.fresh_report(source, config.cache_ttl_mins) {
            Some(cached) => lines.extend(cached.iter().cloned()),
            None => to_fetch.push(source.clone()),
        }
    }

    let cached_count = sources.len() - to_fetch.len();
    if cached_count > 0 {
        display_success(&format!("⚡ {} report files served from cache", cached_count));
    }

    let mut skipped = Vec::new();
    if !to_fetch.is_empty() {
        ensure_budget(request_log, budget)?;
        if request_log.get_remaining(budget) < to_fetch.len() as u32 {
            display_warning("Hourly request budget may run out before every file is fetched");
        }

        display_info(&format!("Fetching {} report files...", to_fetch.len()));
        let pb = ProgressBar::new(to_fetch.len() as u64);
        pb.set_message("Fetching report files");

        let results = client.fetch_reports(&to_fetch, || pb.inc(1));
        pb.finish_with_message("✓ Report files fetched");

        let outcome = cache.absorb_fetched(results);
        lines.extend(outcome.lines);
        skipped = outcome.skipped;
    }

    if !skipped.is_empty() {
        display_warning(&format!(
            "Skipped {} unavailable report files: {}",
            skipped.len(),
            skipped.join(", ")
        ));
    }
    display_success(&format!(
        "Loaded {} report lines from {} files",
        lines.len(),
        sources.len() - skipped.len()
    ));

    let filter = selection.player_filter();
    let matrix: PercentageMatrix = if args.counts {
        let tally_matrix = tally(&lines, &filter);
        display_success(&format!("Counted {} games", tally_matrix.total_games()));
        display_tallies(&tally_matrix);
        PercentageMatrix::from_tally(&tally_matrix)
    } else {
        compute_matrix(&lines, &filter)
    };

    let tracked = if selection.players.is_empty() {
        "all players".to_string()
    } else {
        selection.players.join(", ")
    };
    let title = format!(
        "WIN RATES | patches: {} | tournaments: {} | {}",
        selection.patches.join(", "),
        selection.tournaments.join(", "),
        tracked
    );
    display_matrix(&matrix, &title);

    Ok(())
}

//! Generate GitHub contribution streak and top language cards.
//!
//! Reads `GITHUB_TOKEN` and `GITHUB_REPOSITORY` (or a `.env` file), queries
//! the GitHub GraphQL API and writes `github-streak.svg` and
//! `top-languages.svg` into the output directory.
//!
//! ```bash
//! GITHUB_TOKEN=ghp_... GITHUB_REPOSITORY=octocat/octocat contrib-cards --output-dir assets
//! ```

mod api_client;
mod config;
mod error;
mod models;
mod stats;
mod svg;

use crate::{
    api_client::{GithubClient, StatsSource},
    config::Settings,
    error::AppError,
    stats::{TOP_LANGUAGES, TodayZeroPolicy},
    svg::Theme,
};
use chrono::{Local, NaiveDate};
use clap::Parser;
use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};
use tracing::{debug, error, info};

const STREAK_CARD_FILE: &str = "github-streak.svg";
const LANGUAGES_CARD_FILE: &str = "top-languages.svg";

/// Render GitHub contribution stats as SVG cards
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory the cards are written to (default: `assets`, or `output_dir` from the config file)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Config file path (default: <config dir>/contrib-cards/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Inputs that shape the cards besides the fetched data
struct RenderOptions<'a> {
    today: NaiveDate,
    policy: TodayZeroPolicy,
    theme: &'a Theme,
}

/// Rendered markup for both cards
#[derive(Debug)]
struct Cards {
    streak: String,
    languages: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let dotenv_path = config::load_dotenv();
    init_tracing(args.verbose);
    if let Some(path) = dotenv_path {
        debug!(path = %path.display(), "loaded .env file");
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_env("CONTRIB_CARDS_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: Args) -> Result<(), AppError> {
    let settings = Settings::load(args.output_dir, args.config.as_deref())?;
    let user = settings.credentials.username.as_str();
    info!(user, output_dir = %settings.output_dir.display(), "processing");

    let client = GithubClient::new(settings.credentials.token.clone())?;
    let today = Local::now().date_naive();

    let options = RenderOptions {
        today,
        policy: settings.today_zero_policy,
        theme: &settings.theme,
    };
    generate_and_write(&client, user, &options, &settings.output_dir).await
}

/// Fetch and render both cards, then write them. Nothing is written unless
/// both cards rendered.
async fn generate_and_write<S: StatsSource>(
    source: &S,
    user: &str,
    options: &RenderOptions<'_>,
    output_dir: &Path,
) -> Result<(), AppError> {
    let cards = generate_cards(source, user, options).await?;
    write_cards(output_dir, &cards)
}

async fn generate_cards<S: StatsSource>(
    source: &S,
    user: &str,
    options: &RenderOptions<'_>,
) -> Result<Cards, AppError> {
    info!("fetching contribution data");
    let calendar = source.fetch_contribution_calendar(user).await?;
    let streak = stats::calculate_streak(calendar.days(), options.today, options.policy);
    info!(
        current = streak.current_streak,
        longest = streak.longest_streak,
        total = calendar.total_contributions,
        "streak computed"
    );

    info!("fetching repository languages");
    let repos = source.fetch_repository_languages(user).await?;
    for repo in &repos {
        debug!(repo = %repo.name, languages = repo.languages.edges.len(), "repository");
    }
    let languages = stats::aggregate_languages(&repos, TOP_LANGUAGES);
    let names: Vec<&str> = languages.iter().map(|l| l.name.as_str()).collect();
    info!(repositories = repos.len(), top = ?names, "languages aggregated");

    Ok(Cards {
        streak: svg::render_streak_card(&streak, calendar.total_contributions, options.theme),
        languages: svg::render_languages_card(&languages, options.theme),
    })
}

fn write_cards(output_dir: &Path, cards: &Cards) -> Result<(), AppError> {
    fs::create_dir_all(output_dir)?;

    for (file_name, content) in [
        (STREAK_CARD_FILE, &cards.streak),
        (LANGUAGES_CARD_FILE, &cards.languages),
    ] {
        let path = output_dir.join(file_name);
        fs::write(&path, content)?;
        info!(path = %path.display(), "generated card");
    }

    Ok(())
}

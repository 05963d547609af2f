use crate::error::AppError;
use crate::stats::{TODAY_ZERO_POLICY, TodayZeroPolicy};
use crate::svg::Theme;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const APP_NAME: &str = "contrib-cards";
const DEFAULT_OUTPUT_DIR: &str = "assets";

/// Optional on-disk configuration
#[derive(Deserialize, Default, Debug)]
#[serde(default)]
struct FileConfig {
    output_dir: Option<PathBuf>,
    today_zero_policy: Option<TodayZeroPolicy>,
    theme: Theme,
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub username: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .field("username", &self.username)
            .finish()
    }
}

/// Everything a run needs, resolved once at start-up
#[derive(Debug, Clone)]
pub struct Settings {
    pub credentials: Credentials,
    pub output_dir: PathBuf,
    pub today_zero_policy: TodayZeroPolicy,
    pub theme: Theme,
}

impl Settings {
    /// Resolve settings from the process environment, the config file and
    /// command line overrides, in that order of increasing precedence.
    ///
    /// `.env` must already be loaded (see [`load_dotenv`]).
    pub fn load(output_dir: Option<PathBuf>, config_path: Option<&Path>) -> Result<Self, AppError> {
        let credentials = resolve_credentials(|key| std::env::var(key).ok())?;
        let file = load_file_config(config_path)?;
        Ok(Self::merge(credentials, output_dir, file))
    }

    /// CLI output dir beats the file, which beats the built-in default
    fn merge(credentials: Credentials, cli_output_dir: Option<PathBuf>, file: FileConfig) -> Self {
        Self {
            credentials,
            output_dir: cli_output_dir
                .or(file.output_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            today_zero_policy: file.today_zero_policy.unwrap_or(TODAY_ZERO_POLICY),
            theme: file.theme,
        }
    }
}

/// Load a `.env` file into the process environment if one exists.
///
/// Returns its path. Call before logging is set up so `CONTRIB_CARDS_LOG`
/// can come from the file too.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

/// Read the access token and target user through `lookup`.
///
/// The token comes from `GITHUB_TOKEN` or `GH_TOKEN`. The user comes from
/// `GH_USERNAME`, then the owner part of `GITHUB_REPOSITORY`, then
/// `GITHUB_REPOSITORY_OWNER`. Blank values count as unset.
pub fn resolve_credentials(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Credentials, AppError> {
    let get = |key: &str| {
        lookup(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let token = get("GITHUB_TOKEN")
        .or_else(|| get("GH_TOKEN"))
        .ok_or(AppError::MissingConfiguration(
            "GITHUB_TOKEN (or GH_TOKEN) environment variable not set",
        ))?;

    let username = get("GH_USERNAME")
        .or_else(|| get("GITHUB_REPOSITORY").and_then(|repo| owner_of(&repo)))
        .or_else(|| get("GITHUB_REPOSITORY_OWNER"))
        .ok_or(AppError::MissingConfiguration(
            "GITHUB_REPOSITORY (owner/repo) environment variable not set",
        ))?;

    Ok(Credentials { token, username })
}

/// Owner half of an `owner/repo` identifier
fn owner_of(repository: &str) -> Option<String> {
    let owner = repository.split('/').next()?.trim();
    (!owner.is_empty()).then(|| owner.to_string())
}

fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME).join("config.toml"))
}

/// An explicit path must exist; the default location is optional.
fn load_file_config(explicit: Option<&Path>) -> Result<FileConfig, AppError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match get_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(FileConfig::default()),
        },
    };

    let contents = fs::read_to_string(&path)?;
    let config: FileConfig = toml::from_str(&contents)?;
    info!(path = %path.display(), "loaded config file");
    Ok(config)
}

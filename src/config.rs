//! Command-line arguments and the configuration built from them once at startup.

use crate::wmata_api_models::{
    parse_timezone, Result, WmataError, API_KEY_ENV, BASE_URL, DEFAULT_TIMEZONE,
    REQUEST_TIMEOUT_SECS,
};
use chrono_tz::Tz;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;

fn timezone_arg(name: &str) -> std::result::Result<Tz, String> {
    parse_timezone(name).map_err(|e| e.to_string())
}

/// Arguments for the train position poller
#[derive(Parser, Debug, Clone)]
#[command(name = "api_to_text", about = "Poll WMATA train positions into timestamped files", version)]
pub struct PollerArgs {
    /// Directory that receives one file per poll
    #[arg(default_value = ".")]
    pub output_dir: PathBuf,

    /// WMATA developer API key
    #[arg(long = "wmata_api_key", env = API_KEY_ENV, hide_env_values = true)]
    pub wmata_api_key: Option<String>,

    /// IANA timezone used to name snapshot files
    #[arg(long, default_value = DEFAULT_TIMEZONE, value_parser = timezone_arg)]
    pub timezone: Tz,

    #[arg(long, default_value = BASE_URL)]
    pub base_url: String,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = REQUEST_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Pause between polls in seconds
    #[arg(long, default_value_t = 0)]
    pub interval_secs: u64,

    /// Stop after this many polls instead of running forever
    #[arg(long)]
    pub max_polls: Option<u64>,
}

/// Arguments for the route and station snapshot fetcher
#[derive(Parser, Debug, Clone)]
#[command(
    name = "routes_tracks_stations",
    about = "Fetch WMATA standard routes and per-line station lists",
    version
)]
pub struct SnapshotArgs {
    /// Directory that receives routes.json and stations.json
    #[arg(default_value = ".")]
    pub output_dir: PathBuf,

    /// WMATA developer API key
    #[arg(long = "wmata_api_key", visible_alias = "key", env = API_KEY_ENV, hide_env_values = true)]
    pub wmata_api_key: Option<String>,

    #[arg(long, default_value = BASE_URL)]
    pub base_url: String,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = REQUEST_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub api_key: Option<String>,
    pub timezone: Tz,
    pub output_dir: PathBuf,
    pub base_url: String,
    pub timeout: Duration,
    pub interval: Duration,
    pub max_polls: Option<u64>,
}

impl PollerConfig {
    pub fn new(api_key: Option<String>, timezone: Tz, output_dir: impl Into<PathBuf>) -> Self {
        PollerConfig {
            api_key,
            timezone,
            output_dir: output_dir.into(),
            base_url: BASE_URL.to_string(),
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            interval: Duration::ZERO,
            max_polls: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure_output_dir(&self.output_dir)
    }
}

impl From<PollerArgs> for PollerConfig {
    fn from(args: PollerArgs) -> Self {
        PollerConfig {
            api_key: non_empty(args.wmata_api_key),
            timezone: args.timezone,
            output_dir: args.output_dir,
            base_url: args.base_url,
            timeout: Duration::from_secs(args.timeout_secs),
            interval: Duration::from_secs(args.interval_secs),
            max_polls: args.max_polls,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SnapshotConfig {
    pub api_key: Option<String>,
    pub output_dir: PathBuf,
    pub base_url: String,
    pub timeout: Duration,
}

impl SnapshotConfig {
    pub fn new(api_key: Option<String>, output_dir: impl Into<PathBuf>) -> Self {
        SnapshotConfig {
            api_key,
            output_dir: output_dir.into(),
            base_url: BASE_URL.to_string(),
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure_output_dir(&self.output_dir)
    }
}

impl From<SnapshotArgs> for SnapshotConfig {
    fn from(args: SnapshotArgs) -> Self {
        SnapshotConfig {
            api_key: non_empty(args.wmata_api_key),
            output_dir: args.output_dir,
            base_url: args.base_url,
            timeout: Duration::from_secs(args.timeout_secs),
        }
    }
}

fn non_empty(key: Option<String>) -> Option<String> {
    key.filter(|k| !k.trim().is_empty())
}

fn ensure_output_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(WmataError::Config(format!(
            "Output directory {:?} does not exist or is not a directory",
            dir
        )))
    }
}

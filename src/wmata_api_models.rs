// API models and request plumbing for WMATA (Washington Metropolitan Area Transit Authority)
// WMATA developer portal: https://developer.wmata.com/
//
// WMATA API Endpoints:
// - Train Positions: https://api.wmata.com/TrainPositions/TrainPositions?contentType=json
// - Standard Routes: https://api.wmata.com/TrainPositions/StandardRoutes?contentType=json
// - Station List:    https://api.wmata.com/Rail.svc/json/jStations?LineCode=RD
//
// Every request carries the developer key in the `api_key` header.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use log::{debug, warn};
use reqwest::blocking;
use reqwest::StatusCode;
use serde::{Serialize, Serializer};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Constants
// ============================================================================

pub const BASE_URL: &str = "https://api.wmata.com";
pub const TRAIN_POSITIONS_PATH: &str = "/TrainPositions/TrainPositions";
pub const STANDARD_ROUTES_PATH: &str = "/TrainPositions/StandardRoutes";
pub const STATIONS_PATH: &str = "/Rail.svc/json/jStations";

pub const API_KEY_HEADER: &str = "api_key";
pub const API_KEY_ENV: &str = "WMATA_API_KEY";

pub const DEFAULT_TIMEZONE: &str = "America/New_York";
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Written in place of the response body when a poll request fails.
pub const ERROR_PLACEHOLDER: &str = "Uh oh, there was an error pulling the data";

pub const ROUTES_FILE: &str = "routes.json";
pub const STATIONS_FILE: &str = "stations.json";

/// `YYYY-MM-DD_HH:MM:SS`, used as the poller's file name.
pub const SNAPSHOT_TIME_FORMAT: &str = "%Y-%m-%d_%H:%M:%S";

// ============================================================================
// Line Codes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LineCode {
    Blue,
    Green,
    Orange,
    Red,
    Silver,
    Yellow,
}

impl LineCode {
    /// Every rail line, in the order the station directory is fetched.
    pub const ALL: [LineCode; 6] = [
        LineCode::Blue,
        LineCode::Green,
        LineCode::Orange,
        LineCode::Red,
        LineCode::Silver,
        LineCode::Yellow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LineCode::Blue => "BL",
            LineCode::Green => "GR",
            LineCode::Orange => "OR",
            LineCode::Red => "RD",
            LineCode::Silver => "SV",
            LineCode::Yellow => "YL",
        }
    }
}

impl fmt::Display for LineCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LineCode {
    type Err = WmataError;

    fn from_str(s: &str) -> Result<Self> {
        LineCode::ALL
            .iter()
            .copied()
            .find(|line| line.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| WmataError::Config(format!("Unknown line code: {}", s)))
    }
}

impl Serialize for LineCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Error, Debug)]
pub enum WmataError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API returned {status} for {url}")]
    Status { status: StatusCode, url: String },

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("File error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, WmataError>;

// ============================================================================
// HTTP Client
// ============================================================================

pub struct WmataClient {
    inner: blocking::Client,
    base_url: String,
    api_key: Option<String>,
}

impl WmataClient {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        // One connection per request; nothing is kept alive between polls.
        let inner = blocking::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| WmataError::Config(format!("Failed to create HTTP client: {}", e)))?;

        if api_key.is_none() {
            warn!(
                "⚠️  No API key configured (pass --wmata_api_key or set {}), requests will be rejected",
                API_KEY_ENV
            );
        }

        Ok(WmataClient {
            inner,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `path` with `query` and return the raw body of a 2xx response.
    pub fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Vec<u8>> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {} {:?}", url, query);

        let mut request = self.inner.get(&url).query(query);
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request.send()?;

        if !response.status().is_success() {
            return Err(WmataError::Status {
                status: response.status(),
                url,
            });
        }

        Ok(response.bytes()?.to_vec())
    }
}

// ============================================================================
// Filesystem Helpers
// ============================================================================

/// Local time of `instant` in `tz`, formatted for use as a file name.
pub fn snapshot_name(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format(SNAPSHOT_TIME_FORMAT).to_string()
}

pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|e| WmataError::Config(format!("Unknown timezone '{}': {}", name, e)))
}

/// Create or truncate `path` and write `bytes`. Not atomic.
pub fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).map_err(|source| WmataError::Io {
        path: path.to_path_buf(),
        source,
    })
}

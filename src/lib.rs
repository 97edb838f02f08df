//! WMATA data pullers
//!
//! `poller` captures live train positions into timestamped files and
//! `snapshot` captures the static route and station directory.

pub mod config;
pub mod poller;
pub mod snapshot;
pub mod wmata_api_models;

pub use config::{PollerArgs, PollerConfig, SnapshotArgs, SnapshotConfig};
pub use poller::Poller;
pub use snapshot::{SnapshotFetcher, SnapshotReport};
pub use wmata_api_models::{LineCode, Result, WmataClient, WmataError};

/// Log to stdout at `info` unless `RUST_LOG` says otherwise.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stdout)
        .init();
}

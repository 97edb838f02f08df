// One-shot snapshot of standard routes and per-line stations

use clap::Parser;
use log::{error, info};
use wmata_pull::{init_logging, SnapshotArgs, SnapshotConfig, SnapshotFetcher};

fn main() {
    init_logging();

    let config = SnapshotConfig::from(SnapshotArgs::parse());
    if let Err(e) = config.validate() {
        error!("❌ {}", e);
        std::process::exit(1);
    }

    let result = SnapshotFetcher::new(config).and_then(|fetcher| fetcher.run());
    match result {
        Ok(report) => {
            info!(
                "✓ Snapshot complete: routes {}, {} lines fetched, {} failed",
                if report.routes_written { "written" } else { "missing" },
                report.lines_fetched.len(),
                report.lines_failed.len()
            );
        }
        Err(e) => {
            error!("❌ Snapshot failed: {}", e);
            std::process::exit(1);
        }
    }
}

// Train position poller: one file per request, named by local time

use clap::Parser;
use log::{error, info};
use std::sync::atomic::AtomicBool;
use wmata_pull::{init_logging, Poller, PollerArgs, PollerConfig};

fn main() {
    init_logging();

    let config = PollerConfig::from(PollerArgs::parse());
    if let Err(e) = config.validate() {
        error!("❌ {}", e);
        std::process::exit(1);
    }

    info!(
        "🚆 Polling train positions into {} ({})",
        config.output_dir.display(),
        config.timezone
    );

    let poller = match Poller::new(config) {
        Ok(poller) => poller,
        Err(e) => {
            error!("❌ {}", e);
            std::process::exit(1);
        }
    };

    // Never raised here; the process is stopped from outside.
    let stop = AtomicBool::new(false);
    if let Err(e) = poller.run(&stop) {
        error!("❌ Poller aborted: {}", e);
        std::process::exit(1);
    }
}

// Train position poller
// Fetches /TrainPositions/TrainPositions over and over and stores every response
// body in a file named after the local time of the request.

use crate::config::PollerConfig;
use crate::wmata_api_models::{
    snapshot_name, write_file, Result, WmataClient, ERROR_PLACEHOLDER, TRAIN_POSITIONS_PATH,
};
use chrono::{DateTime, Utc};
use log::{info, warn};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

pub struct Poller {
    client: WmataClient,
    config: PollerConfig,
}

impl Poller {
    pub fn new(config: PollerConfig) -> Result<Self> {
        let client = WmataClient::new(&config.base_url, config.api_key.clone(), config.timeout)?;
        Ok(Poller { client, config })
    }

    pub fn fetch_payload(&self) -> Result<Vec<u8>> {
        self.client
            .get(TRAIN_POSITIONS_PATH, &[("contentType", "json")])
    }

    pub fn poll_once(&self) -> Result<PathBuf> {
        self.poll_at(Utc::now())
    }

    /// One iteration; `now` only decides the file name.
    pub fn poll_at(&self, now: DateTime<Utc>) -> Result<PathBuf> {
        let file_name = snapshot_name(now, self.config.timezone);
        let path = self.config.output_dir.join(&file_name);

        let payload = match self.fetch_payload() {
            Ok(body) => body,
            Err(e) => {
                warn!("⚠️  Train positions request failed ({})", e);
                ERROR_PLACEHOLDER.as_bytes().to_vec()
            }
        };

        write_file(&path, &payload)?;
        info!("✓ Wrote {} bytes to {}", payload.len(), path.display());
        Ok(path)
    }

    /// Poll until `stop` is raised or `max_polls` is reached. Returns the poll count.
    pub fn run(&self, stop: &AtomicBool) -> Result<u64> {
        let mut polls: u64 = 0;

        while !stop.load(Ordering::Relaxed) {
            if self.config.max_polls.is_some_and(|max| polls >= max) {
                break;
            }

            self.poll_once()?;
            polls += 1;

            if !self.config.interval.is_zero() {
                thread::sleep(self.config.interval);
            }
        }

        info!("🛑 Poller stopped after {} polls", polls);
        Ok(polls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs;
    use std::net::TcpListener;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;
    use tiny_http::{Response, Server};

    fn unreachable_base_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("http://127.0.0.1:{}", port)
    }

    fn failing_poller(dir: &std::path::Path) -> Poller {
        let mut config = PollerConfig::new(None, chrono_tz::America::New_York, dir);
        config.base_url = unreachable_base_url();
        Poller::new(config).unwrap()
    }

    #[test]
    fn test_failed_poll_writes_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let poller = failing_poller(dir.path());

        let now = Utc.with_ymd_and_hms(2016, 7, 4, 16, 5, 9).unwrap();
        let path = poller.poll_at(now).unwrap();

        assert_eq!(path, dir.path().join("2016-07-04_12:05:09"));
        assert_eq!(fs::read_to_string(&path).unwrap(), ERROR_PLACEHOLDER);
    }

    #[test]
    fn test_same_second_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let poller = failing_poller(dir.path());
        let now = Utc.with_ymd_and_hms(2016, 7, 4, 16, 5, 9).unwrap();

        fs::write(dir.path().join("2016-07-04_12:05:09"), "stale contents that are longer").unwrap();
        poller.poll_at(now).unwrap();
        poller.poll_at(now).unwrap();

        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
        assert_eq!(
            fs::read_to_string(dir.path().join("2016-07-04_12:05:09")).unwrap(),
            ERROR_PLACEHOLDER
        );
    }

    #[test]
    fn test_run_stops_at_max_polls() {
        let server = Arc::new(Server::http("127.0.0.1:0").unwrap());
        let port = server.server_addr().to_ip().unwrap().port();
        let hits = Arc::new(AtomicUsize::new(0));

        let srv = server.clone();
        let srv_hits = hits.clone();
        let handle = thread::spawn(move || {
            for req in srv.incoming_requests() {
                srv_hits.fetch_add(1, Ordering::SeqCst);
                let _ = req.respond(Response::from_string("{}"));
            }
        });

        let dir = tempfile::tempdir().unwrap();
        let mut config = PollerConfig::new(None, chrono_tz::UTC, dir.path());
        config.base_url = format!("http://127.0.0.1:{}", port);
        config.max_polls = Some(3);
        let poller = Poller::new(config).unwrap();

        let stop = AtomicBool::new(false);
        assert_eq!(poller.run(&stop).unwrap(), 3);

        server.unblock();
        handle.join().unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 3);
        assert!(fs::read_dir(dir.path()).unwrap().count() >= 1);
    }

    #[test]
    fn test_run_honors_stop_flag() {
        let dir = tempfile::tempdir().unwrap();
        let poller = failing_poller(dir.path());

        let stop = AtomicBool::new(true);
        assert_eq!(poller.run(&stop).unwrap(), 0);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_run_propagates_write_failure() {
        let dir = tempfile::tempdir().unwrap();
        let poller = failing_poller(&dir.path().join("gone"));

        let stop = AtomicBool::new(false);
        assert!(poller.run(&stop).is_err());
    }
}

// Route and station snapshot
// One StandardRoutes request written verbatim to routes.json, then one jStations
// request per rail line collected into stations.json.

use crate::config::SnapshotConfig;
use crate::wmata_api_models::{
    write_file, LineCode, Result, WmataClient, ROUTES_FILE, STANDARD_ROUTES_PATH, STATIONS_FILE,
    STATIONS_PATH,
};
use log::{info, warn};
use serde_json::Value;
use std::collections::BTreeMap;

/// What a snapshot run managed to produce.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotReport {
    pub routes_written: bool,
    pub lines_fetched: Vec<LineCode>,
    pub lines_failed: Vec<LineCode>,
}

pub struct SnapshotFetcher {
    client: WmataClient,
    config: SnapshotConfig,
}

impl SnapshotFetcher {
    pub fn new(config: SnapshotConfig) -> Result<Self> {
        let client = WmataClient::new(&config.base_url, config.api_key.clone(), config.timeout)?;
        Ok(SnapshotFetcher { client, config })
    }

    pub fn fetch_routes(&self) -> Result<Vec<u8>> {
        self.client
            .get(STANDARD_ROUTES_PATH, &[("contentType", "json")])
    }

    pub fn fetch_stations(&self, line: LineCode) -> Result<Value> {
        let body = self.client.get(STATIONS_PATH, &[("LineCode", line.as_str())])?;
        Ok(serde_json::from_slice(&body)?)
    }

    pub fn run(&self) -> Result<SnapshotReport> {
        let mut report = SnapshotReport::default();

        info!("🗺️  Fetching standard routes...");
        // A routes failure, fetch or write, never blocks stations.json.
        let routes_path = self.config.output_dir.join(ROUTES_FILE);
        let routes = self.fetch_routes().and_then(|body| {
            write_file(&routes_path, &body)?;
            Ok(body.len())
        });
        match routes {
            Ok(len) => {
                info!("✓ Wrote {} bytes to {}", len, routes_path.display());
                report.routes_written = true;
            }
            Err(e) => warn!("⚠️  Could not save standard routes ({})", e),
        }

        info!("🚇 Fetching stations for {} lines...", LineCode::ALL.len());
        let mut stations: BTreeMap<LineCode, Value> = BTreeMap::new();
        for line in LineCode::ALL {
            match self.fetch_stations(line) {
                Ok(value) => {
                    info!("   ✓ Loaded {} stations", line);
                    stations.insert(line, value);
                    report.lines_fetched.push(line);
                }
                Err(e) => {
                    warn!("   ⚠️  Could not fetch {} stations ({})", line, e);
                    report.lines_failed.push(line);
                }
            }
        }

        let path = self.config.output_dir.join(STATIONS_FILE);
        write_file(&path, &serde_json::to_vec(&stations)?)?;
        info!(
            "✓ Wrote {} with {}/{} lines",
            path.display(),
            stations.len(),
            LineCode::ALL.len()
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::net::TcpListener;

    #[test]
    fn test_all_requests_fail() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let dir = tempfile::tempdir().unwrap();
        let mut config = SnapshotConfig::new(None, dir.path());
        config.base_url = format!("http://127.0.0.1:{}", port);
        let report = SnapshotFetcher::new(config).unwrap().run().unwrap();

        assert!(!report.routes_written);
        assert!(report.lines_fetched.is_empty());
        assert_eq!(report.lines_failed, LineCode::ALL.to_vec());
        assert!(!dir.path().join(ROUTES_FILE).exists());
        assert_eq!(
            fs::read_to_string(dir.path().join(STATIONS_FILE)).unwrap(),
            "{}"
        );
    }

    #[test]
    fn test_station_map_serializes_in_line_order() {
        let mut stations = BTreeMap::new();
        stations.insert(LineCode::Yellow, Value::from(1));
        stations.insert(LineCode::Blue, Value::from(2));
        assert_eq!(
            serde_json::to_string(&stations).unwrap(),
            r#"{"BL":2,"YL":1}"#
        );
    }
}

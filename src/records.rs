//! Rolling run history
//!
//! Persisted as a JSON array, keeps the 100 most recent runs and stores
//! them sorted by time.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::persistence::{self, PersistError};

/// Maximum number of runs to keep
pub const MAX_RECORDS: usize = 100;

/// A single finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub victory: bool,
    /// Seconds spent playing
    pub time: f64,
    pub lives: u8,
    /// Percentile grade, absent when no history existed to grade against
    #[serde(default)]
    pub grade: Option<f64>,
    /// Tier label
    #[serde(default, alias = "university")]
    pub outcome: Option<String>,
    /// Insertion order; older files without it read as 0
    #[serde(default)]
    pub seq: u64,
}

/// Run history log
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunHistory {
    records: Vec<RunRecord>,
}

impl RunHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records sorted by time
    pub fn records(&self) -> &[RunRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Times of victorious runs, the samples grading compares against
    pub fn completion_times(&self) -> Vec<f64> {
        self.records
            .iter()
            .filter(|r| r.victory && r.time > 0.0)
            .map(|r| r.time)
            .collect()
    }

    /// Fastest victorious time
    pub fn best_time(&self) -> Option<f64> {
        self.completion_times().into_iter().reduce(f64::min)
    }

    /// Insert a run, keep the most recent `MAX_RECORDS`, re-sort by time
    pub fn record(&mut self, mut entry: RunRecord) {
        entry.seq = self.records.iter().map(|r| r.seq).max().map_or(1, |s| s + 1);
        self.records.push(entry);

        if self.records.len() > MAX_RECORDS {
            // Stable: legacy entries sharing seq 0 keep their stored order
            self.records.sort_by_key(|r| r.seq);
            let excess = self.records.len() - MAX_RECORDS;
            self.records.drain(..excess);
        }

        self.records.sort_by(|a, b| a.time.total_cmp(&b.time));
    }

    /// Load the history; missing or unreadable files yield an empty log
    pub fn load(path: &Path) -> Self {
        match persistence::load_json::<RunHistory>(path) {
            Ok(history) => {
                log::info!("Loaded {} run records", history.len());
                history
            }
            Err(e) if e.is_not_found() => {
                log::info!("No run records found, starting fresh");
                Self::new()
            }
            Err(e) => {
                log::warn!("Run records unreadable, starting fresh: {e}");
                Self::new()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), PersistError> {
        persistence::save_json(path, self)?;
        log::info!("Run records saved ({} entries)", self.records.len());
        Ok(())
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::Game;

pub const DEFAULT_PAUSE_FACTOR: f64 = 2.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pause {
    pub tournament: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub is_unusual: bool,
}

impl Pause {
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

/// Finds gaps between consecutive fixtures that are at least `pause_factor`
/// times the mean gap. Gaps are measured in whole days.
#[derive(Debug, Clone, Copy)]
pub struct PauseDetector {
    pause_factor: f64,
}

impl PauseDetector {
    pub fn new(pause_factor: f64) -> Self {
        Self { pause_factor }
    }

    pub fn pause_factor(&self) -> f64 {
        self.pause_factor
    }

    pub fn find_pauses(&self, games: &[Game]) -> Vec<Pause> {
        if games.len() < 2 {
            return Vec::new();
        }
        let mut sorted: Vec<&Game> = games.iter().collect();
        sorted.sort_by_key(|game| game.starts_at);

        let threshold = average_gap_days(&sorted) * self.pause_factor;
        let pauses: Vec<Pause> = sorted
            .windows(2)
            .filter(|pair| gap_days(pair[0], pair[1]) as f64 >= threshold)
            .map(|pair| Pause {
                tournament: pair[0].tournament.clone(),
                start: pair[0].starts_at,
                end: pair[1].starts_at,
                is_unusual: true,
            })
            .collect();
        debug!(
            "found {} pauses in {} games (threshold {threshold:.1} days)",
            pauses.len(),
            sorted.len()
        );
        pauses
    }
}

impl Default for PauseDetector {
    fn default() -> Self {
        Self::new(DEFAULT_PAUSE_FACTOR)
    }
}

/// Mean whole-day gap between consecutive games of a sorted list; 0 when there
/// is no gap.
pub fn average_gap_days(sorted: &[&Game]) -> f64 {
    if sorted.len() < 2 {
        return 0.0;
    }
    let total: i64 = sorted.windows(2).map(|pair| gap_days(pair[0], pair[1])).sum();
    total as f64 / (sorted.len() - 1) as f64
}

fn gap_days(earlier: &Game, later: &Game) -> i64 {
    (later.starts_at - earlier.starts_at).num_days()
}

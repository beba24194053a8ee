use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::WindowConfig;
use crate::schedule::pause::{Pause, PauseDetector};
use crate::types::Game;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub pauses: Vec<Pause>,
}

impl AnalysisWindow {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }
}

/// First pause starting at or after `start + min_horizon_days`; the minimum
/// horizon itself when there is none.
pub fn choose_end_date(
    start: DateTime<Utc>,
    pauses: &[Pause],
    min_horizon_days: i64,
) -> DateTime<Utc> {
    let min_end = offset_days(start, min_horizon_days);
    pauses
        .iter()
        .map(|pause| pause.start)
        .filter(|pause_start| *pause_start >= min_end)
        .min()
        .unwrap_or(min_end)
}

/// `start` moved by `days`, clamped to the representable range.
fn offset_days(start: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    Duration::try_days(days)
        .and_then(|delta| start.checked_add_signed(delta))
        .unwrap_or(if days < 0 {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        })
}

/// Bounds the analysis by the next off-season pause of the reference
/// competition. `reference_games` are the main-league fixtures; only those
/// inside the lookahead are used for detection.
pub fn plan_window(
    start: DateTime<Utc>,
    reference_games: &[Game],
    config: &WindowConfig,
) -> AnalysisWindow {
    let lookahead_end = offset_days(start, config.lookahead_days);
    let in_lookahead: Vec<Game> = reference_games
        .iter()
        .filter(|game| game.starts_at >= start && game.starts_at <= lookahead_end)
        .cloned()
        .collect();

    let pauses = PauseDetector::new(config.pause_factor).find_pauses(&in_lookahead);
    let end = choose_end_date(start, &pauses, config.min_horizon_days);
    AnalysisWindow { start, end, pauses }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn day(offset: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 8, 1, 0, 0, 0)
            .single()
            .expect("valid date")
            + Duration::days(offset)
    }

    fn pause(start: i64, end: i64) -> Pause {
        Pause {
            tournament: "Bundesliga".to_string(),
            start: day(start),
            end: day(end),
            is_unusual: true,
        }
    }

    #[test]
    fn falls_back_to_minimum_horizon() {
        assert_eq!(choose_end_date(day(0), &[], 90), day(90));
        assert_eq!(choose_end_date(day(0), &[pause(30, 60)], 90), day(90));
    }

    #[test]
    fn picks_first_pause_after_horizon() {
        let pauses = vec![pause(200, 230), pause(130, 160), pause(20, 40)];
        assert_eq!(choose_end_date(day(0), &pauses, 90), day(130));
        assert_eq!(choose_end_date(day(0), &[pause(90, 100)], 90), day(90));
    }

    #[test]
    fn window_uses_only_lookahead_games() {
        let offsets = [0, 7, 14, 21, 28, 35, 42, 49, 56, 63, 70, 77, 84, 91, 98, 105, 112, 119, 126];
        let mut games: Vec<Game> = offsets
            .iter()
            .enumerate()
            .map(|(i, d)| Game::new(i as u64, "A", "B", "Bundesliga 24/25", day(*d)))
            .collect();
        // Winter break, then the season restarts.
        games.push(Game::new(100, "A", "B", "Bundesliga 24/25", day(168)));
        games.push(Game::new(101, "A", "B", "Bundesliga 24/25", day(175)));
        // Far outside the lookahead; must not influence detection.
        games.push(Game::new(102, "A", "B", "Bundesliga 24/25", day(400)));

        let window = plan_window(day(0), &games, &WindowConfig::default());
        assert_eq!(window.pauses.len(), 1);
        assert_eq!(window.end, day(126));
        assert!(window.contains(day(100)));
        assert!(!window.contains(day(127)));
    }

    #[test]
    fn horizon_past_calendar_limit_is_clamped() {
        let late = DateTime::<Utc>::MAX_UTC - Duration::days(2);
        let games = vec![Game::new(1, "A", "B", "Bundesliga 24/25", late)];
        let window = plan_window(late, &games, &WindowConfig::default());
        assert_eq!(window.end, DateTime::<Utc>::MAX_UTC);
        assert!(window.contains(late));

        assert_eq!(choose_end_date(day(0), &[], i64::MAX), DateTime::<Utc>::MAX_UTC);
        assert_eq!(choose_end_date(day(0), &[], i64::MIN), DateTime::<Utc>::MIN_UTC);
    }
}

use std::collections::{BTreeMap, BTreeSet};

use crate::types::Game;
use crate::weights::base_tournament_name;

/// Checked in this order before falling back to league tiers.
pub const TOP_LEAGUES: &[&str] = &["Bundesliga", "Premier League", "LaLiga", "Serie A", "Ligue 1"];

pub const LEAGUE_TIERS: &[(&str, u8)] = &[
    ("Major League Soccer", 3),
    ("Saudi Prof. League", 3),
    ("Brasileirão", 3),
    ("Liga MX", 3),
    ("J-League", 2),
    ("A-League", 2),
    ("Chinese Super League", 2),
    ("Argentine Primera División", 2),
];

const DEFAULT_LEAGUE_TIER: u8 = 1;

pub fn league_tier(base_name: &str) -> u8 {
    LEAGUE_TIERS
        .iter()
        .find(|(name, _)| *name == base_name)
        .map(|(_, tier)| *tier)
        .unwrap_or(DEFAULT_LEAGUE_TIER)
}

/// Distinct tournament names (with season) the given teams play in.
pub fn team_tournaments(games: &[Game], teams: &[String]) -> BTreeSet<String> {
    games
        .iter()
        .filter(|game| teams.iter().any(|team| game.involves(team)))
        .map(|game| game.tournament.clone())
        .collect()
}

/// The competition whose calendar bounds the analysis: the first top league
/// present, otherwise the highest-tier base name (ties go to the
/// alphabetically first). Returns the latest season of that competition.
pub fn main_league(tournaments: &BTreeSet<String>) -> Option<String> {
    let mut groups: BTreeMap<String, Vec<&String>> = BTreeMap::new();
    for tournament in tournaments {
        groups
            .entry(base_tournament_name(tournament))
            .or_default()
            .push(tournament);
    }

    let base = TOP_LEAGUES
        .iter()
        .find(|league| groups.contains_key(**league))
        .map(|league| league.to_string())
        .or_else(|| {
            groups
                .keys()
                .fold(None::<&String>, |best, name| match best {
                    Some(current) if league_tier(current) >= league_tier(name) => Some(current),
                    _ => Some(name),
                })
                .cloned()
        })?;

    groups
        .get(&base)
        .and_then(|seasons| seasons.iter().max().map(|s| s.to_string()))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn top_league_wins_with_latest_season() {
        let tournaments = set(&[
            "DFB Pokal 24/25",
            "Bundesliga 23/24",
            "Bundesliga 24/25",
            "UEFA Champions League 24/25",
        ]);
        assert_eq!(main_league(&tournaments).as_deref(), Some("Bundesliga 24/25"));
    }

    #[test]
    fn falls_back_to_highest_tier() {
        let tournaments = set(&["A-League 24/25", "Eliteserien 2024", "Major League Soccer 2024"]);
        assert_eq!(
            main_league(&tournaments).as_deref(),
            Some("Major League Soccer 2024")
        );
    }

    #[test]
    fn no_tournaments_no_main_league() {
        assert!(main_league(&BTreeSet::new()).is_none());
    }

    #[test]
    fn collects_tournaments_of_requested_teams() {
        let now = Utc::now();
        let games = vec![
            Game::new(1, "Bayern", "Dortmund", "Bundesliga 24/25", now),
            Game::new(2, "Celtic", "Rangers", "Premiership 24/25", now),
            Game::new(3, "Mainz", "Bayern", "DFB Pokal 24/25", now),
        ];
        let found = team_tournaments(&games, &["Bayern".to_string()]);
        assert_eq!(found, set(&["Bundesliga 24/25", "DFB Pokal 24/25"]));
    }
}

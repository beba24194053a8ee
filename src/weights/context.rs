use std::collections::{BTreeMap, HashMap};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Game, GameId};
use crate::weights::tiers::base_tournament_name;

const TITLE_RACE_POSITIONS: u32 = 3;
const RELEGATION_POSITIONS: u32 = 3;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Group,
    Knockout,
    Semi,
    Final,
}

impl Phase {
    pub fn multiplier(self) -> f64 {
        match self {
            Self::Group => 1.0,
            Self::Knockout => 1.3,
            Self::Semi => 1.5,
            Self::Final => 1.5,
        }
    }

    /// Classifies free-text round metadata such as "Quarter-finals" or
    /// "Regular Season - 12". The more specific markers are checked before the
    /// bare "FINAL".
    pub fn from_round(round: &str) -> Self {
        let round = round.to_ascii_uppercase();
        if round.contains("SEMI") {
            Self::Semi
        } else if ["QUARTER", "1/4", "1/8", "1/16", "LAST 16", "ROUND OF"]
            .iter()
            .any(|marker| round.contains(marker))
        {
            Self::Knockout
        } else if round.contains("FINAL") {
            Self::Final
        } else {
            Self::Group
        }
    }
}

impl Display for Phase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::Group => "GROUP",
            Self::Knockout => "KNOCKOUT",
            Self::Semi => "SEMI",
            Self::Final => "FINAL",
        };
        write!(f, "{display}")
    }
}

#[derive(Debug, Error)]
#[error("unknown competition phase: {0}")]
pub struct PhaseParseError(pub String);

impl FromStr for Phase {
    type Err = PhaseParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GROUP" => Ok(Self::Group),
            "KNOCKOUT" => Ok(Self::Knockout),
            "SEMI" => Ok(Self::Semi),
            "FINAL" => Ok(Self::Final),
            _ => Err(PhaseParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Importance {
    Normal,
    Derby,
    Title,
    Relegation,
}

impl Importance {
    pub fn multiplier(self) -> f64 {
        match self {
            Self::Normal => 1.0,
            Self::Derby => 1.3,
            Self::Title => 1.4,
            Self::Relegation => 1.2,
        }
    }

    pub fn classify(positions: Option<TablePositions>, derby: bool) -> Self {
        if let Some(p) = positions {
            if p.home <= TITLE_RACE_POSITIONS && p.away <= TITLE_RACE_POSITIONS {
                return Self::Title;
            }
            let bottom = p.total_teams.saturating_sub(RELEGATION_POSITIONS);
            if p.home > bottom && p.away > bottom {
                return Self::Relegation;
            }
        }
        if derby {
            Self::Derby
        } else {
            Self::Normal
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TablePositions {
    pub home: u32,
    pub away: u32,
    pub total_teams: u32,
}

/// External data behind the phase and importance multipliers.
pub trait ContextSource {
    fn round(&self, game: &Game) -> Option<&str>;
    fn table_positions(&self, game: &Game) -> Option<TablePositions>;
}

/// Source used when no external data is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoContext;

impl ContextSource for NoContext {
    fn round(&self, _game: &Game) -> Option<&str> {
        None
    }

    fn table_positions(&self, _game: &Game) -> Option<TablePositions> {
        None
    }
}

/// Round names per game and league tables (team -> position) per tournament,
/// supplied alongside the fixtures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchContext {
    #[serde(default)]
    pub rounds: HashMap<GameId, String>,
    #[serde(default)]
    pub standings: HashMap<String, BTreeMap<String, u32>>,
}

impl MatchContext {
    fn table_for(&self, tournament: &str) -> Option<&BTreeMap<String, u32>> {
        self.standings
            .get(tournament)
            .or_else(|| self.standings.get(&base_tournament_name(tournament)))
    }
}

impl ContextSource for MatchContext {
    fn round(&self, game: &Game) -> Option<&str> {
        self.rounds.get(&game.id).map(String::as_str)
    }

    fn table_positions(&self, game: &Game) -> Option<TablePositions> {
        let table = self.table_for(&game.tournament)?;
        Some(TablePositions {
            home: *table.get(&game.home)?,
            away: *table.get(&game.away)?,
            total_teams: u32::try_from(table.len()).ok()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_map_to_phases() {
        assert_eq!(Phase::from_round("Final"), Phase::Final);
        assert_eq!(Phase::from_round("Semi-finals"), Phase::Semi);
        assert_eq!(Phase::from_round("Quarter-finals"), Phase::Knockout);
        assert_eq!(Phase::from_round("1/8-finals"), Phase::Knockout);
        assert_eq!(Phase::from_round("Round of 16"), Phase::Knockout);
        assert_eq!(Phase::from_round("Regular Season - 12"), Phase::Group);
        assert_eq!(Phase::from_round("Group A - 2"), Phase::Group);
    }

    #[test]
    fn table_positions_classify_importance() {
        let top = TablePositions {
            home: 1,
            away: 3,
            total_teams: 18,
        };
        let bottom = TablePositions {
            home: 16,
            away: 18,
            total_teams: 18,
        };
        let mixed = TablePositions {
            home: 2,
            away: 15,
            total_teams: 18,
        };
        assert_eq!(Importance::classify(Some(top), false), Importance::Title);
        assert_eq!(Importance::classify(Some(bottom), false), Importance::Relegation);
        assert_eq!(Importance::classify(Some(mixed), false), Importance::Normal);
        assert_eq!(Importance::classify(Some(mixed), true), Importance::Derby);
        assert_eq!(Importance::classify(None, false), Importance::Normal);
    }

    #[test]
    fn match_context_falls_back_to_base_tournament() {
        let mut context = MatchContext::default();
        let table: BTreeMap<String, u32> = [("Bayern", 1), ("Leverkusen", 2), ("Bochum", 3)]
            .into_iter()
            .map(|(team, pos)| (team.to_string(), pos))
            .collect();
        context.standings.insert("Bundesliga".to_string(), table);

        let game = Game::new(
            1,
            "Bayern",
            "Leverkusen",
            "Bundesliga 24/25",
            chrono::Utc::now(),
        );
        let positions = context.table_positions(&game).expect("table found");
        assert_eq!(positions.home, 1);
        assert_eq!(positions.away, 2);
        assert_eq!(positions.total_teams, 3);
    }
}

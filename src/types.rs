use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type GameId = u64;
pub type PackageId = u64;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Game {
    pub id: GameId,
    pub home: String,
    pub away: String,
    pub tournament: String,
    pub starts_at: DateTime<Utc>,
    #[serde(default = "neutral_weight")]
    pub base_weight: f64,
    #[serde(default = "neutral_weight")]
    pub phase_multiplier: f64,
    #[serde(default = "neutral_weight")]
    pub importance_multiplier: f64,
}

impl Game {
    pub fn new(
        id: GameId,
        home: &str,
        away: &str,
        tournament: &str,
        starts_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            home: home.to_string(),
            away: away.to_string(),
            tournament: tournament.to_string(),
            starts_at,
            base_weight: 1.0,
            phase_multiplier: 1.0,
            importance_multiplier: 1.0,
        }
    }

    pub fn with_base_weight(mut self, base_weight: f64) -> Self {
        self.base_weight = base_weight;
        self
    }

    /// Contribution of the game to coverage scoring.
    pub fn total_weight(&self) -> f64 {
        self.base_weight * self.phase_multiplier * self.importance_multiplier
    }

    pub fn involves(&self, team: &str) -> bool {
        self.home == team || self.away == team
    }
}

/// Prices are in minor currency units. `yearly_price` is the monthly
/// equivalent of a yearly subscription and is billed twelve times.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Package {
    pub id: PackageId,
    pub name: String,
    #[serde(default)]
    pub monthly_price: Option<u64>,
    #[serde(default)]
    pub yearly_price: Option<u64>,
}

impl Package {
    pub fn new(id: PackageId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            monthly_price: None,
            yearly_price: None,
        }
    }

    pub fn with_monthly(mut self, price: u64) -> Self {
        self.monthly_price = Some(price);
        self
    }

    pub fn with_yearly(mut self, price: u64) -> Self {
        self.yearly_price = Some(price);
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Offer {
    pub game_id: GameId,
    pub package_id: PackageId,
    #[serde(default)]
    pub live: bool,
    #[serde(default)]
    pub highlights: bool,
}

impl Offer {
    pub fn live(game_id: GameId, package_id: PackageId) -> Self {
        Self {
            game_id,
            package_id,
            live: true,
            highlights: false,
        }
    }

    pub fn highlights(game_id: GameId, package_id: PackageId) -> Self {
        Self {
            game_id,
            package_id,
            live: false,
            highlights: true,
        }
    }
}

fn neutral_weight() -> f64 {
    1.0
}

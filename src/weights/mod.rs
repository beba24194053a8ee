pub mod context;
pub mod tiers;

use tracing::debug;

use crate::config::WeightsConfig;
use crate::types::Game;

pub use context::{ContextSource, Importance, MatchContext, NoContext, Phase, TablePositions};
pub use tiers::{base_tournament_name, tournament_weight};

/// Importance score per game: `base × phase × importance`.
///
/// Phase and importance depend on external data and can be switched off, in
/// which case they stay at 1.0. Unknown tournaments get the baseline weight.
#[derive(Debug, Clone)]
pub struct WeightModel {
    config: WeightsConfig,
}

impl WeightModel {
    pub fn new(config: WeightsConfig) -> Self {
        Self { config }
    }

    pub fn base_weight(&self, tournament: &str) -> f64 {
        let base = base_tournament_name(tournament);
        if let Some(weight) = self.config.tournament_overrides.get(&base) {
            return *weight;
        }
        tournament_weight(&base).unwrap_or_else(|| {
            debug!("no tier for '{base}', using baseline {}", self.config.baseline_weight);
            self.config.baseline_weight
        })
    }

    pub fn phase(&self, game: &Game, context: &dyn ContextSource) -> Phase {
        if !self.config.phase_enabled {
            return Phase::Group;
        }
        context
            .round(game)
            .map(Phase::from_round)
            .unwrap_or(Phase::Group)
    }

    pub fn importance(&self, game: &Game, context: &dyn ContextSource) -> Importance {
        if !self.config.importance_enabled {
            return Importance::Normal;
        }
        Importance::classify(
            context.table_positions(game),
            self.is_derby(&game.home, &game.away),
        )
    }

    pub fn weigh(&self, mut game: Game, context: &dyn ContextSource) -> Game {
        game.base_weight = self.base_weight(&game.tournament);
        game.phase_multiplier = self.phase(&game, context).multiplier();
        game.importance_multiplier = self.importance(&game, context).multiplier();
        game
    }

    pub fn weigh_all(&self, games: Vec<Game>, context: &dyn ContextSource) -> Vec<Game> {
        games
            .into_iter()
            .map(|game| self.weigh(game, context))
            .collect()
    }

    fn is_derby(&self, home: &str, away: &str) -> bool {
        self.config
            .derbies
            .iter()
            .any(|[a, b]| (a == home && b == away) || (a == away && b == home))
    }
}

impl Default for WeightModel {
    fn default() -> Self {
        Self::new(WeightsConfig::default())
    }
}

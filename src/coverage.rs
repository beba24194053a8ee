use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::pricing::{PackageCost, Pricing};
use crate::types::{Game, GameId, Offer, Package, PackageId};

#[derive(Debug, Clone)]
pub struct CoverageEntry {
    pub package: Package,
    pub pricing: Pricing,
    /// Indices into `CoverageMap::games`, ascending.
    pub games: Vec<usize>,
    pub weight_sum: f64,
}

/// Which games each priceable package can show. Built once per optimization
/// run and read-only afterwards.
#[derive(Debug, Clone)]
pub struct CoverageMap {
    games: Vec<Game>,
    entries: Vec<CoverageEntry>,
    total_weight: f64,
}

impl CoverageMap {
    pub fn build(
        games: Vec<Game>,
        packages: &[Package],
        offers: &[Offer],
        require_live: bool,
    ) -> Self {
        let games = dedupe_games(games);
        let game_ids: HashSet<GameId> = games.iter().map(|g| g.id).collect();
        let package_ids: HashSet<PackageId> = packages.iter().map(|p| p.id).collect();

        let mut by_pair: HashMap<(GameId, PackageId), Vec<&Offer>> = HashMap::new();
        let mut dangling = 0usize;
        for offer in offers {
            if !game_ids.contains(&offer.game_id) || !package_ids.contains(&offer.package_id) {
                dangling += 1;
                continue;
            }
            by_pair
                .entry((offer.game_id, offer.package_id))
                .or_default()
                .push(offer);
        }
        if dangling > 0 {
            debug!("ignored {dangling} offers outside the game or package set");
        }

        let mut seen_packages = HashSet::new();
        let mut entries = Vec::with_capacity(packages.len());
        for package in packages {
            if !seen_packages.insert(package.id) {
                warn!("duplicate package id {}, keeping first", package.id);
                continue;
            }
            let pricing = match Pricing::from_package(package) {
                Ok(pricing) => pricing,
                Err(err) => {
                    warn!("package '{}' is uncoverable: {err}", package.name);
                    continue;
                }
            };

            let mut covered = Vec::new();
            let mut weight_sum = 0.0;
            for (idx, game) in games.iter().enumerate() {
                let Some(pair_offers) = by_pair.get(&(game.id, package.id)) else {
                    continue;
                };
                if pair_offers.iter().any(|offer| !require_live || offer.live) {
                    covered.push(idx);
                    weight_sum += game.total_weight();
                }
            }

            entries.push(CoverageEntry {
                package: package.clone(),
                pricing,
                games: covered,
                weight_sum,
            });
        }

        let total_weight = games.iter().map(Game::total_weight).sum();
        Self {
            games,
            entries,
            total_weight,
        }
    }

    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub fn entries(&self) -> &[CoverageEntry] {
        &self.entries
    }

    pub fn entry(&self, index: usize) -> &CoverageEntry {
        &self.entries[index]
    }

    pub fn position(&self, package_id: PackageId) -> Option<usize> {
        self.entries.iter().position(|e| e.package.id == package_id)
    }

    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    pub fn game_count(&self) -> usize {
        self.games.len()
    }

    pub fn cost_of(&self, entry: usize, games: &[usize]) -> PackageCost {
        self.entries[entry]
            .pricing
            .cost(games.iter().map(|&idx| &self.games[idx]))
    }

    pub fn weight_of(&self, games: &[usize]) -> f64 {
        games.iter().map(|&idx| self.games[idx].total_weight()).sum()
    }
}

fn dedupe_games(games: Vec<Game>) -> Vec<Game> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(games.len());
    for game in games {
        if seen.insert(game.id) {
            out.push(game);
        } else {
            warn!("duplicate game id {}, keeping first", game.id);
        }
    }
    out
}

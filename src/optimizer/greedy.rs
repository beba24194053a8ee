use tracing::debug;

use crate::coverage::CoverageMap;
use crate::optimizer::{summarize, Assignment, OptimizationResult, PackageOptimizer, Strategy};

/// Weighted max-coverage approximation: repeatedly buy the package with the
/// best ratio of newly covered weight to the cost of covering those games.
///
/// Packages whose marginal cost is zero are never picked; the ratio is only
/// defined for a positive cost.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyOptimizer;

impl GreedyOptimizer {
    pub fn select(&self, coverage: &CoverageMap, max_packages: usize) -> Vec<Assignment> {
        let entries = coverage.entries();
        let mut covered = vec![false; coverage.game_count()];
        let mut chosen = vec![false; entries.len()];
        let mut picks = Vec::new();

        for _ in 0..max_packages {
            let mut best: Option<(f64, Assignment)> = None;

            for (idx, entry) in entries.iter().enumerate() {
                if chosen[idx] {
                    continue;
                }
                let new_games: Vec<usize> = entry
                    .games
                    .iter()
                    .copied()
                    .filter(|&g| !covered[g])
                    .collect();
                if new_games.is_empty() {
                    continue;
                }
                let cost = coverage.cost_of(idx, &new_games).total_cost;
                if cost == 0 {
                    continue;
                }
                let score = coverage.weight_of(&new_games) / cost as f64;
                let improves = match &best {
                    Some((best_score, _)) => score > *best_score,
                    None => score > 0.0,
                };
                if improves {
                    best = Some((
                        score,
                        Assignment {
                            entry: idx,
                            games: new_games,
                        },
                    ));
                }
            }

            let Some((score, pick)) = best else {
                debug!("greedy stopped early after {} packages", picks.len());
                break;
            };
            debug!(
                "greedy picked '{}' (score {score:.6}, {} new games)",
                entries[pick.entry].package.name,
                pick.games.len()
            );
            chosen[pick.entry] = true;
            for &g in &pick.games {
                covered[g] = true;
            }
            picks.push(pick);
        }

        picks
    }
}

impl PackageOptimizer for GreedyOptimizer {
    fn strategy(&self) -> Strategy {
        Strategy::Greedy
    }

    fn optimize(&self, coverage: &CoverageMap, max_packages: usize) -> OptimizationResult {
        let picks = self.select(coverage, max_packages);
        summarize(coverage, &picks, Strategy::Greedy, None)
    }
}

#[cfg(test)]
mod tests {
    use crate::coverage::CoverageMap;
    use crate::optimizer::fixtures::{game, overlapping_pair};
    use crate::optimizer::PackageOptimizer;
    use crate::types::{Offer, Package};

    use super::GreedyOptimizer;

    #[test]
    fn picks_best_weight_per_cost() {
        let coverage = overlapping_pair();
        let result = GreedyOptimizer.optimize(&coverage, 1);

        assert_eq!(result.selected_packages.len(), 1);
        assert_eq!(result.selected_packages[0].package.name, "B");
        assert_eq!(result.total_cost, 300);
        assert_eq!(result.uncovered_games.len(), 1);
        assert_eq!(result.uncovered_games[0].id, 1);
        assert!((result.weighted_coverage - 3.5 / 4.5).abs() < 1e-9);
    }

    #[test]
    fn second_pick_only_pays_for_new_games() {
        let coverage = overlapping_pair();
        let result = GreedyOptimizer.optimize(&coverage, 2);

        assert_eq!(result.selected_packages.len(), 2);
        let second = &result.selected_packages[1];
        assert_eq!(second.package.name, "A");
        assert_eq!(
            second.covered_games.iter().map(|g| g.id).collect::<Vec<_>>(),
            vec![1]
        );
        assert_eq!(result.total_cost, 800);
        assert!((result.coverage_ratio - 1.0).abs() < 1e-9);
        assert!(result.uncovered_games.is_empty());
    }

    #[test]
    fn zero_budget_selects_nothing() {
        let coverage = overlapping_pair();
        let result = GreedyOptimizer.optimize(&coverage, 0);
        assert!(result.selected_packages.is_empty());
        assert_eq!(result.coverage_ratio, 0.0);
        assert_eq!(result.uncovered_games.len(), 3);
    }

    #[test]
    fn never_exceeds_budget() {
        let games = (1..=6).map(|id| game(id, 8 + (id as u32 % 3), 1.0)).collect();
        let packages = (1..=6)
            .map(|id| Package::new(id, &format!("P{id}")).with_monthly(100 * id))
            .collect::<Vec<_>>();
        let offers = (1..=6).map(|id| Offer::live(id, id)).collect::<Vec<_>>();
        let coverage = CoverageMap::build(games, &packages, &offers, true);

        for budget in 0..=7 {
            let result = GreedyOptimizer.optimize(&coverage, budget);
            assert!(result.selected_packages.len() <= budget);
            assert!((0.0..=1.0).contains(&result.coverage_ratio));
            assert!((0.0..=1.0).contains(&result.weighted_coverage));
        }
    }

    #[test]
    fn free_packages_are_never_picked() {
        let games = vec![game(1, 9, 1.0), game(2, 10, 1.0)];
        let packages = vec![
            Package::new(1, "Free").with_monthly(0),
            Package::new(2, "Paid").with_monthly(100),
        ];
        let offers = vec![Offer::live(1, 1), Offer::live(2, 1), Offer::live(1, 2)];
        let coverage = CoverageMap::build(games, &packages, &offers, true);

        let result = GreedyOptimizer.optimize(&coverage, 2);
        assert_eq!(result.selected_packages.len(), 1);
        assert_eq!(result.selected_packages[0].package.name, "Paid");
    }

    #[test]
    fn empty_games_give_empty_result() {
        let packages = vec![Package::new(1, "Sky").with_monthly(100)];
        let coverage = CoverageMap::build(Vec::new(), &packages, &[], true);
        let result = GreedyOptimizer.optimize(&coverage, 3);
        assert!(result.selected_packages.is_empty());
        assert_eq!(result.total_cost, 0);
        assert_eq!(result.weighted_coverage, 0.0);
    }
}

pub mod annealing;
pub mod greedy;

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AnnealingConfig;
use crate::coverage::CoverageMap;
use crate::optimizer::annealing::SimulatedAnnealingOptimizer;
use crate::optimizer::greedy::GreedyOptimizer;
use crate::pricing::BillingType;
use crate::types::{Game, Package};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Greedy,
    Annealing,
}

impl Strategy {
    pub const ALL: [Strategy; 2] = [Strategy::Greedy, Strategy::Annealing];

    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::Greedy => "greedy",
            Self::Annealing => "annealing",
        }
    }
}

impl Display for Strategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_slug())
    }
}

#[derive(Debug, Error)]
#[error("unknown optimizer strategy: {0}")]
pub struct StrategyParseError(pub String);

impl FromStr for Strategy {
    type Err = StrategyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "greedy" => Ok(Self::Greedy),
            "annealing" | "simulated-annealing" | "simulated_annealing" | "sa" => {
                Ok(Self::Annealing)
            }
            _ => Err(StrategyParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectedPackage {
    pub package: Package,
    /// Games attributed to this package, i.e. not already shown by an
    /// earlier package of the same solution.
    pub covered_games: Vec<Game>,
    pub weight_sum: f64,
    pub cost: u64,
    pub billing_type: Option<BillingType>,
    pub active_months: Option<BTreeSet<String>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Temperature,
    Iterations,
    TimeLimit,
    NoMoves,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchStats {
    pub seed_score: f64,
    pub best_score: f64,
    pub iterations: u64,
    pub accepted: u64,
    pub improvements: u64,
    pub elapsed_ms: u64,
    pub stop_reason: StopReason,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub strategy: Strategy,
    pub selected_packages: Vec<SelectedPackage>,
    pub total_cost: u64,
    pub coverage_ratio: f64,
    pub weighted_coverage: f64,
    pub uncovered_games: Vec<Game>,
    pub stats: Option<SearchStats>,
}

pub trait PackageOptimizer: Send + Sync {
    fn strategy(&self) -> Strategy;
    fn optimize(&self, coverage: &CoverageMap, max_packages: usize) -> OptimizationResult;
}

pub fn build_optimizer(strategy: Strategy, annealing: &AnnealingConfig) -> Box<dyn PackageOptimizer> {
    match strategy {
        Strategy::Greedy => Box::new(GreedyOptimizer),
        Strategy::Annealing => Box::new(SimulatedAnnealingOptimizer::from_config(annealing)),
    }
}

/// An ordered package combination, as indices into a coverage map's entries.
/// Each entry appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidate {
    entries: Vec<usize>,
}

/// Games attributed to one entry of a candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub entry: usize,
    pub games: Vec<usize>,
}

impl Candidate {
    pub fn new(entries: Vec<usize>) -> Self {
        let mut seen = BTreeSet::new();
        let entries = entries.into_iter().filter(|e| seen.insert(*e)).collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[usize] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, entry: usize) -> bool {
        self.entries.contains(&entry)
    }

    pub(crate) fn push(&mut self, entry: usize) {
        if !self.contains(entry) {
            self.entries.push(entry);
        }
    }

    pub(crate) fn remove_at(&mut self, position: usize) -> usize {
        self.entries.remove(position)
    }

    /// Gives every covered game to the first entry, in candidate order, whose
    /// coverage contains it.
    pub fn attribute(&self, coverage: &CoverageMap) -> Vec<Assignment> {
        let mut taken = vec![false; coverage.game_count()];
        self.entries
            .iter()
            .map(|&entry| {
                let games = coverage
                    .entry(entry)
                    .games
                    .iter()
                    .copied()
                    .filter(|&g| !std::mem::replace(&mut taken[g], true))
                    .collect();
                Assignment { entry, games }
            })
            .collect()
    }

    /// Drops entries that are attributed no games. The remaining entries keep
    /// their order and their attribution.
    pub fn without_idle(&self, coverage: &CoverageMap) -> Candidate {
        let entries = self
            .attribute(coverage)
            .into_iter()
            .filter(|assignment| !assignment.games.is_empty())
            .map(|assignment| assignment.entry)
            .collect();
        Candidate { entries }
    }
}

/// Turns attributed assignments into the reported result. Entries without
/// any attributed game are dropped.
pub fn summarize(
    coverage: &CoverageMap,
    assignments: &[Assignment],
    strategy: Strategy,
    stats: Option<SearchStats>,
) -> OptimizationResult {
    let games = coverage.games();
    let mut covered = vec![false; games.len()];
    let mut selected_packages = Vec::new();
    let mut total_cost = 0u64;
    let mut covered_weight = 0.0;

    for assignment in assignments.iter().filter(|a| !a.games.is_empty()) {
        let entry = coverage.entry(assignment.entry);
        let cost = coverage.cost_of(assignment.entry, &assignment.games);
        let weight_sum = coverage.weight_of(&assignment.games);
        for &g in &assignment.games {
            covered[g] = true;
        }
        covered_weight += weight_sum;
        total_cost = total_cost.saturating_add(cost.total_cost);
        selected_packages.push(SelectedPackage {
            package: entry.package.clone(),
            covered_games: assignment.games.iter().map(|&g| games[g].clone()).collect(),
            weight_sum,
            cost: cost.total_cost,
            billing_type: cost.billing_type,
            active_months: cost.active_months,
        });
    }

    let covered_count = covered.iter().filter(|c| **c).count();
    let uncovered_games = games
        .iter()
        .zip(&covered)
        .filter(|(_, c)| !**c)
        .map(|(g, _)| g.clone())
        .collect();

    OptimizationResult {
        strategy,
        selected_packages,
        total_cost,
        coverage_ratio: ratio(covered_count as f64, games.len() as f64),
        weighted_coverage: ratio(covered_weight, coverage.total_weight()),
        uncovered_games,
        stats,
    }
}

pub(crate) fn ratio(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole
    } else {
        0.0
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{TimeZone, Utc};

    use crate::coverage::CoverageMap;
    use crate::types::{Game, Offer, Package};

    pub fn game(id: u64, month: u32, weight: f64) -> Game {
        let starts_at = Utc
            .with_ymd_and_hms(2024, month, 10, 20, 0, 0)
            .single()
            .expect("valid date");
        Game::new(id, "Home", "Away", "Bundesliga", starts_at).with_base_weight(weight)
    }

    /// A covers {1, 2} for 500/month, B covers {2, 3} for 300/month.
    pub fn overlapping_pair() -> CoverageMap {
        let games = vec![game(1, 9, 1.0), game(2, 9, 2.0), game(3, 9, 1.5)];
        let packages = vec![
            Package::new(100, "A").with_monthly(500),
            Package::new(200, "B").with_monthly(300),
        ];
        let offers = vec![
            Offer::live(1, 100),
            Offer::live(2, 100),
            Offer::live(2, 200),
            Offer::live(3, 200),
        ];
        CoverageMap::build(games, &packages, &offers, true)
    }
}

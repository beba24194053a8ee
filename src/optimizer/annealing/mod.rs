//! Simulated annealing over package combinations.
//!
//! The walk starts from the greedy selection, proposes one neighbour per
//! iteration through [`MoveOperator`], scores it with [`SolutionEvaluator`]
//! and accepts it with the Metropolis criterion. The best combination ever
//! seen is kept, so the result never scores below the greedy seed.
//!
//! The run stops on the first of: temperature floor, iteration cap, wall-clock
//! limit. Randomness comes from an explicit RNG so runs can be replayed.

pub mod evaluator;
pub mod moves;

use std::time::{Duration, Instant};

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::config::AnnealingConfig;
use crate::coverage::CoverageMap;
use crate::optimizer::greedy::GreedyOptimizer;
use crate::optimizer::{
    summarize, Candidate, OptimizationResult, PackageOptimizer, SearchStats, StopReason, Strategy,
};

pub use evaluator::SolutionEvaluator;
pub use moves::{Move, MoveOperator};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnealingSchedule {
    pub initial_temp: f64,
    pub cooling_rate: f64,
    pub min_temp: f64,
    pub max_iterations: u64,
    pub time_limit: Duration,
}

impl Default for AnnealingSchedule {
    fn default() -> Self {
        Self {
            initial_temp: 100.0,
            cooling_rate: 0.98,
            min_temp: 0.01,
            max_iterations: 100_000,
            time_limit: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SimulatedAnnealingOptimizer {
    schedule: AnnealingSchedule,
    seed: Option<u64>,
    greedy: GreedyOptimizer,
    moves: MoveOperator,
}

impl SimulatedAnnealingOptimizer {
    pub fn new(schedule: AnnealingSchedule) -> Self {
        Self {
            schedule,
            ..Self::default()
        }
    }

    pub fn from_config(config: &AnnealingConfig) -> Self {
        let schedule = AnnealingSchedule {
            initial_temp: config.initial_temp,
            cooling_rate: config.cooling_rate,
            min_temp: config.min_temp,
            max_iterations: config.max_iterations,
            time_limit: time_limit_from_secs(config.time_limit_secs),
        };
        let optimizer = Self::new(schedule);
        match config.seed {
            Some(seed) => optimizer.with_seed(seed),
            None => optimizer,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn schedule(&self) -> &AnnealingSchedule {
        &self.schedule
    }

    pub fn optimize_with_rng<R: Rng + ?Sized>(
        &self,
        coverage: &CoverageMap,
        max_packages: usize,
        rng: &mut R,
    ) -> OptimizationResult {
        let evaluator = SolutionEvaluator::new(coverage);
        let package_count = coverage.entries().len();

        let seed_entries = self
            .greedy
            .select(coverage, max_packages)
            .into_iter()
            .map(|pick| pick.entry)
            .collect();
        let mut current = Candidate::new(seed_entries);
        let mut current_score = evaluator.evaluate(&current);
        let seed_score = current_score;

        let mut best = current.clone();
        let mut best_score = current_score;

        let mut temperature = self.schedule.initial_temp;
        let started = Instant::now();
        let mut iterations = 0u64;
        let mut accepted = 0u64;
        let mut improvements = 0u64;

        let stop_reason = loop {
            if temperature <= self.schedule.min_temp {
                break StopReason::Temperature;
            }
            if iterations >= self.schedule.max_iterations {
                break StopReason::Iterations;
            }
            if started.elapsed() >= self.schedule.time_limit {
                break StopReason::TimeLimit;
            }

            let Some((kind, neighbor)) =
                self.moves
                    .neighbor(&current, package_count, max_packages, rng)
            else {
                break StopReason::NoMoves;
            };
            let score = evaluator.evaluate(&neighbor);

            if should_accept(current_score, score, temperature, rng) {
                current = neighbor;
                current_score = score;
                accepted += 1;
                if current_score > best_score {
                    debug!("iteration {iterations}: {kind:?} improved best to {current_score:.4}");
                    best = current.clone();
                    best_score = current_score;
                    improvements += 1;
                }
            }

            temperature *= self.schedule.cooling_rate;
            iterations += 1;
        };

        // Idle entries only cost the package penalty; report the pruned combination.
        let best = best.without_idle(coverage);
        let best_score = evaluator.evaluate(&best);

        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(
            "annealing finished: {iterations} iterations, {accepted} accepted, {improvements} improvements, {elapsed_ms}ms, stop={stop_reason:?}"
        );

        let stats = SearchStats {
            seed_score,
            best_score,
            iterations,
            accepted,
            improvements,
            elapsed_ms,
            stop_reason,
        };
        summarize(
            coverage,
            &best.attribute(coverage),
            Strategy::Annealing,
            Some(stats),
        )
    }
}

impl PackageOptimizer for SimulatedAnnealingOptimizer {
    fn strategy(&self) -> Strategy {
        Strategy::Annealing
    }

    fn optimize(&self, coverage: &CoverageMap, max_packages: usize) -> OptimizationResult {
        let mut rng = match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        self.optimize_with_rng(coverage, max_packages, &mut rng)
    }
}

/// Negative and NaN limits stop at once; limits beyond `Duration`'s range
/// mean no wall-clock cap.
fn time_limit_from_secs(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::MAX)
}

/// Metropolis criterion. Improvements always pass; a worse score passes with
/// probability `exp((new - current) / temperature)`.
pub fn should_accept<R: Rng + ?Sized>(
    current_score: f64,
    new_score: f64,
    temperature: f64,
    rng: &mut R,
) -> bool {
    if new_score > current_score {
        return true;
    }
    if new_score == f64::NEG_INFINITY {
        return false;
    }
    let probability = ((new_score - current_score) / temperature).exp();
    rng.gen::<f64>() < probability
}

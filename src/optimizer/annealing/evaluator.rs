use crate::coverage::CoverageMap;
use crate::optimizer::{ratio, Candidate};

const COVERAGE_SCALE: f64 = 1000.0;
const PACKAGE_PENALTY_DIVISOR: f64 = 4.0;

/// Scores package combinations; higher is better.
///
/// `weighted_coverage * 1000 - ln(total_cost + 1) - packages / 4`, where each
/// game counts once no matter how many packages show it. An empty combination
/// scores negative infinity.
#[derive(Debug, Clone, Copy)]
pub struct SolutionEvaluator<'a> {
    coverage: &'a CoverageMap,
}

impl<'a> SolutionEvaluator<'a> {
    pub fn new(coverage: &'a CoverageMap) -> Self {
        Self { coverage }
    }

    pub fn evaluate(&self, candidate: &Candidate) -> f64 {
        if candidate.is_empty() {
            return f64::NEG_INFINITY;
        }

        let mut total_cost = 0u64;
        let mut covered_weight = 0.0;
        // Packages left without games are pruned from results, so they add no cost.
        for assignment in candidate.attribute(self.coverage) {
            if assignment.games.is_empty() {
                continue;
            }
            let cost = self.coverage.cost_of(assignment.entry, &assignment.games);
            total_cost = total_cost.saturating_add(cost.total_cost);
            covered_weight += self.coverage.weight_of(&assignment.games);
        }

        let weighted = ratio(covered_weight, self.coverage.total_weight());
        weighted * COVERAGE_SCALE
            - (total_cost as f64 + 1.0).ln()
            - candidate.len() as f64 / PACKAGE_PENALTY_DIVISOR
    }
}

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::optimizer::Candidate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Move {
    Swap,
    Add,
    Remove,
}

/// Neighbourhood for the annealing walk. Every move works on a copy; the
/// current candidate is never touched.
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveOperator;

impl MoveOperator {
    pub fn eligible_moves(current_len: usize, max_packages: usize) -> Vec<Move> {
        let mut moves = Vec::with_capacity(3);
        if current_len > 0 {
            moves.push(Move::Swap);
        }
        if current_len < max_packages {
            moves.push(Move::Add);
        }
        if current_len > 1 {
            moves.push(Move::Remove);
        }
        moves
    }

    /// Draws one eligible move uniformly and applies it. `None` when no move
    /// is possible (empty candidate with a zero budget).
    pub fn neighbor<R: Rng + ?Sized>(
        &self,
        current: &Candidate,
        package_count: usize,
        max_packages: usize,
        rng: &mut R,
    ) -> Option<(Move, Candidate)> {
        let moves = Self::eligible_moves(current.len(), max_packages);
        let chosen = *moves.choose(rng)?;
        let neighbor = match chosen {
            Move::Swap => self.swap(current, package_count, rng),
            Move::Add => self.add(current, package_count, max_packages, rng),
            Move::Remove => self.remove(current, rng),
        };
        Some((chosen, neighbor))
    }

    /// Drops one package and brings in an unused one. The dropped package is
    /// itself unused again, so it may come straight back.
    pub fn swap<R: Rng + ?Sized>(
        &self,
        current: &Candidate,
        package_count: usize,
        rng: &mut R,
    ) -> Candidate {
        let mut next = current.clone();
        if next.is_empty() {
            return next;
        }
        let position = rng.gen_range(0..next.len());
        next.remove_at(position);
        if let Some(entry) = pick_unused(&next, package_count, rng) {
            next.push(entry);
        }
        next
    }

    pub fn add<R: Rng + ?Sized>(
        &self,
        current: &Candidate,
        package_count: usize,
        max_packages: usize,
        rng: &mut R,
    ) -> Candidate {
        let mut next = current.clone();
        if next.len() >= max_packages {
            return next;
        }
        if let Some(entry) = pick_unused(&next, package_count, rng) {
            next.push(entry);
        }
        next
    }

    pub fn remove<R: Rng + ?Sized>(&self, current: &Candidate, rng: &mut R) -> Candidate {
        let mut next = current.clone();
        if next.len() <= 1 {
            return next;
        }
        let position = rng.gen_range(0..next.len());
        next.remove_at(position);
        next
    }
}

fn pick_unused<R: Rng + ?Sized>(
    candidate: &Candidate,
    package_count: usize,
    rng: &mut R,
) -> Option<usize> {
    let unused: Vec<usize> = (0..package_count)
        .filter(|entry| !candidate.contains(*entry))
        .collect();
    unused.choose(rng).copied()
}

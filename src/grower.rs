//! Single-arrow growth.

use crate::grid::Grid;
use crate::rng::SeededRandom;
use crate::{Cell, Direction};

/// Chance of continuing straight when a straight step is available. Keeps
/// arrows mostly straight with occasional bends.
const STRAIGHT_BIAS: f64 = 0.8;

/// An arrow shape fresh off the grower: head-first cells and the direction
/// the grower was asked for. Id, color and kind are assigned by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrownArrow {
    pub cells: Vec<Cell>,
    pub direction: Direction,
}

/// Grows an arrow from `start` toward `direction`.
///
/// The head goes at `start` and the neck at `start + direction`; both must be
/// free or growth fails. The tail then extends cell by cell, each step
/// continuing straight or turning 90 degrees either way (never reversing,
/// which would make the shape block itself), until `target_length` cells are
/// placed or no candidate cell is open. Returns `None` when fewer than 2
/// cells fit.
pub fn grow(
    start: Cell,
    direction: Direction,
    target_length: usize,
    grid: &Grid,
    rng: &mut SeededRandom,
) -> Option<GrownArrow> {
    if !grid.is_valid_and_free(start) {
        return None;
    }
    let mut cells = vec![start];

    let neck = direction.step(start);
    if !grid.is_valid_and_free(neck) {
        return None;
    }
    cells.push(neck);

    let mut current = neck;
    let mut current_dir = direction;

    while cells.len() < target_length {
        let allowed = [
            current_dir,
            current_dir.rotate_cw(),
            current_dir.rotate_ccw(),
        ];

        let candidates: Vec<(Cell, Direction)> = allowed
            .into_iter()
            .filter_map(|d| {
                let next = d.step(current);
                (grid.is_valid_and_free(next) && !cells.contains(&next)).then_some((next, d))
            })
            .collect();

        if candidates.is_empty() {
            break;
        }

        let straight = candidates.iter().find(|(_, d)| *d == current_dir).copied();
        let (next, next_dir) = match straight {
            Some(step) if rng.next_f64() < STRAIGHT_BIAS => step,
            _ => *rng.choice(&candidates)?,
        };

        cells.push(next);
        current = next;
        current_dir = next_dir;
    }

    if cells.len() < 2 {
        return None;
    }

    Some(GrownArrow { cells, direction })
}

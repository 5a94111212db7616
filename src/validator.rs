//! Solve-order validation, hints and reference solutions.
//!
//! All entry points rebuild the blocking relation from the arrow list with
//! the same ray walk the generator used, then work on live blocker counts.
//! Move-sequence validation is O(arrows + blocking edges): removing an arrow
//! decrements the counts of its dependents instead of rescanning the board.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::blocking::ray_cells;
use crate::{Arrow, Cell, Direction, Level, PuzzleError, Result};

/// Outcome of a move-sequence validation. Rejections carry a reason and the
/// 1-based index of the offending step where one exists; a verdict is an
/// expected result, never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub valid: bool,
    pub reason: Option<String>,
    pub step: Option<usize>,
}

impl Verdict {
    fn accept() -> Self {
        Self {
            valid: true,
            reason: None,
            step: None,
        }
    }

    fn reject(reason: impl Into<String>, step: Option<usize>) -> Self {
        Self {
            valid: false,
            reason: Some(reason.into()),
            step,
        }
    }
}

/// Blocking relation over a finished arrow list: who blocks each arrow, and
/// conversely who each arrow blocks. Built in one pass; scratch state owned
/// by a single validation call.
struct BlockingMaps<'a> {
    blockers_of: HashMap<&'a str, HashSet<&'a str>>,
    dependents_of: HashMap<&'a str, Vec<&'a str>>,
}

impl<'a> BlockingMaps<'a> {
    fn build(arrows: &'a [Arrow], width: i32, height: i32) -> Self {
        let mut cell_map: HashMap<Cell, &str> = HashMap::new();
        for arrow in arrows {
            for &cell in &arrow.cells {
                cell_map.insert(cell, &arrow.id);
            }
        }

        let mut blockers_of: HashMap<&str, HashSet<&str>> = HashMap::new();
        let mut dependents_of: HashMap<&str, Vec<&str>> = HashMap::new();

        for arrow in arrows {
            let mut blockers: HashSet<&str> = HashSet::new();
            for cell in ray_cells(arrow.head(), arrow.direction, width, height) {
                if let Some(&owner) = cell_map.get(&cell) {
                    if owner != arrow.id {
                        blockers.insert(owner);
                    }
                }
            }
            for &blocker in &blockers {
                dependents_of.entry(blocker).or_default().push(&arrow.id);
            }
            blockers_of.insert(&arrow.id, blockers);
        }

        Self {
            blockers_of,
            dependents_of,
        }
    }
}

/// Checks that `moves` is a legal complete solve order for the level.
pub fn validate_moves(arrows: &[Arrow], moves: &[String], width: i32, height: i32) -> Verdict {
    let known: HashSet<&str> = arrows.iter().map(|a| a.id.as_str()).collect();
    if moves.len() > arrows.len() {
        return Verdict::reject("Invalid move count", None);
    }

    let maps = BlockingMaps::build(arrows, width, height);
    let mut live_blockers: HashMap<&str, usize> = maps
        .blockers_of
        .iter()
        .map(|(id, blockers)| (*id, blockers.len()))
        .collect();
    let mut removed: HashSet<&str> = HashSet::new();

    for (index, move_id) in moves.iter().enumerate() {
        let step = index + 1;
        let Some(&id) = known.get(move_id.as_str()) else {
            return Verdict::reject(format!("Unknown arrow id at step {step}"), Some(step));
        };
        if removed.contains(id) {
            return Verdict::reject(format!("Arrow already removed at step {step}"), Some(step));
        }
        if live_blockers.get(id).copied().unwrap_or(0) > 0 {
            debug!(arrow = id, step, "move on a blocked arrow");
            return Verdict::reject(format!("Illegal move at step {step}"), Some(step));
        }

        removed.insert(id);
        if let Some(dependents) = maps.dependents_of.get(id) {
            for &dep in dependents {
                if let Some(count) = live_blockers.get_mut(dep) {
                    *count -= 1;
                }
            }
        }
    }

    if removed.len() != arrows.len() {
        return Verdict::reject("Not all arrows removed", None);
    }
    Verdict::accept()
}

/// Validates a client-submitted move sequence against a level.
pub fn validate(level: &Level, moves: &[String]) -> Verdict {
    validate_moves(&level.arrows, moves, level.grid.width, level.grid.height)
}

/// Arrows with nothing on their forward ray; eligible for removal now.
pub fn free_arrows(arrows: &[Arrow], width: i32, height: i32) -> Vec<&Arrow> {
    let mut cell_map: HashMap<Cell, &str> = HashMap::new();
    for arrow in arrows {
        for &cell in &arrow.cells {
            cell_map.insert(cell, &arrow.id);
        }
    }

    arrows
        .iter()
        .filter(|arrow| {
            ray_cells(arrow.head(), arrow.direction, width, height)
                .all(|cell| match cell_map.get(&cell) {
                    Some(&owner) => owner == arrow.id,
                    None => true,
                })
        })
        .collect()
}

/// One removable arrow among the ids still on the board, for hints. Returns
/// the first free arrow in arrow order.
pub fn hint(level: &Level, remaining_ids: &[String]) -> Option<String> {
    let remaining: HashSet<&str> = remaining_ids.iter().map(String::as_str).collect();
    let live: Vec<Arrow> = level
        .arrows
        .iter()
        .filter(|a| remaining.contains(a.id.as_str()))
        .cloned()
        .collect();
    free_arrows(&live, level.grid.width, level.grid.height)
        .first()
        .map(|a| a.id.clone())
}

/// Derives a complete valid removal order by repeatedly taking the first
/// free arrow. The iteration guard (2x the arrow count) only trips on
/// corrupt input; that is a data bug, not a normal rejection, and is logged
/// as such.
pub fn full_solution(arrows: &[Arrow], width: i32, height: i32) -> Result<Vec<String>> {
    let total = arrows.len();
    let mut remaining: Vec<Arrow> = arrows.to_vec();
    let mut solution = Vec::with_capacity(total);
    let mut iterations = 0usize;

    while !remaining.is_empty() && iterations < total * 2 {
        let Some(next) = free_arrows(&remaining, width, height).first().copied() else {
            break;
        };
        let id = next.id.clone();
        remaining.retain(|a| a.id != id);
        solution.push(id);
        iterations += 1;
    }

    if solution.len() != total {
        warn!(
            removed = solution.len(),
            total, "solution derivation stuck: level data is not acyclic"
        );
        return Err(PuzzleError::Unsolvable {
            removed: solution.len(),
            total,
        });
    }
    Ok(solution)
}

/// Structural integrity checks for a level, for content that was not
/// generated here (hand-authored or imported files are not acyclic by
/// construction). Returns every problem found, empty when sound.
pub fn check_level(level: &Level) -> Vec<String> {
    let mut errors = Vec::new();
    let width = level.grid.width;
    let height = level.grid.height;

    for arrow in &level.arrows {
        if arrow.len() < 2 {
            errors.push(format!("Arrow {} has fewer than 2 cells", arrow.id));
            continue;
        }
        for (i, pair) in arrow.cells.windows(2).enumerate() {
            let dx = (pair[1].x - pair[0].x).abs();
            let dy = (pair[1].y - pair[0].y).abs();
            if dx + dy != 1 {
                errors.push(format!("Arrow {} not orthogonal at cell {i}", arrow.id));
                break;
            }
        }
        if Direction::between(arrow.cells[0], arrow.cells[1]) != Some(arrow.direction) {
            errors.push(format!(
                "Arrow {}: head-neck vector does not match direction",
                arrow.id
            ));
        }
    }

    let voids: HashSet<Cell> = level.grid.void_cells.iter().copied().collect();
    let mut covered: HashSet<Cell> = HashSet::new();
    for arrow in &level.arrows {
        for &cell in &arrow.cells {
            if cell.x < 0 || cell.x >= width || cell.y < 0 || cell.y >= height {
                errors.push(format!("Arrow {} leaves the board at {cell:?}", arrow.id));
            } else if voids.contains(&cell) {
                errors.push(format!("Arrow {} covers void cell {cell:?}", arrow.id));
            } else if !covered.insert(cell) {
                errors.push(format!("Cell {cell:?} covered by more than one arrow"));
            }
        }
    }
    let expected = (width * height) as usize - voids.len();
    if covered.len() != expected {
        errors.push(format!(
            "Grid not fully covered: {}/{} cells",
            covered.len(),
            expected
        ));
    }

    if full_solution(&level.arrows, width, height).is_err() {
        errors.push("Level not solvable".to_string());
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::generate;
    use crate::ArrowKind;

    fn arrow(id: &str, cells: &[(i32, i32)], direction: Direction) -> Arrow {
        Arrow {
            id: id.to_string(),
            cells: cells.iter().map(|&(x, y)| Cell::new(x, y)).collect(),
            direction,
            kind: ArrowKind::Normal,
            color: String::new(),
            frozen: 0,
        }
    }

    fn moves(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    /// 2x2 board, two arrows: "a" exits to the right unobstructed, "b"
    /// points up through a's row and is blocked until a leaves.
    fn two_arrow_level() -> (Vec<Arrow>, i32, i32) {
        let a = arrow("a", &[(0, 0), (1, 0)], Direction::Right);
        let b = arrow("b", &[(0, 1), (1, 1)], Direction::Up);
        (vec![a, b], 2, 2)
    }

    #[test]
    fn test_free_arrows_unblocked_only() {
        let (arrows, w, h) = two_arrow_level();
        let free = free_arrows(&arrows, w, h);
        assert_eq!(free.len(), 1);
        assert_eq!(free[0].id, "a");
    }

    #[test]
    fn test_edge_pointing_arrow_is_always_free() {
        // Head on the right edge, pointing right: empty ray, never blocked.
        let a = arrow("a", &[(3, 0), (2, 0)], Direction::Right);
        let arrows = [a];
        let free = free_arrows(&arrows, 4, 4);
        assert_eq!(free.len(), 1);
    }

    #[test]
    fn test_partial_sequence_rejected_as_incomplete() {
        let (arrows, w, h) = two_arrow_level();
        let verdict = validate_moves(&arrows, &moves(&["a"]), w, h);
        assert!(!verdict.valid);
        assert_eq!(verdict.reason.as_deref(), Some("Not all arrows removed"));
    }

    #[test]
    fn test_full_sequence_accepted() {
        let (arrows, w, h) = two_arrow_level();
        let verdict = validate_moves(&arrows, &moves(&["a", "b"]), w, h);
        assert!(verdict.valid, "verdict: {verdict:?}");
    }

    #[test]
    fn test_blocked_move_rejected_at_step() {
        let (arrows, w, h) = two_arrow_level();
        // b is blocked by a, so leading with b fails at step 1.
        let verdict = validate_moves(&arrows, &moves(&["b", "a"]), w, h);
        assert!(!verdict.valid);
        assert_eq!(verdict.step, Some(1));
        assert_eq!(verdict.reason.as_deref(), Some("Illegal move at step 1"));
    }

    #[test]
    fn test_too_many_moves_rejected() {
        let (arrows, w, h) = two_arrow_level();
        let verdict = validate_moves(&arrows, &moves(&["a", "b", "a"]), w, h);
        assert!(!verdict.valid);
        assert_eq!(verdict.reason.as_deref(), Some("Invalid move count"));
    }

    #[test]
    fn test_unknown_id_rejected_at_step() {
        let (arrows, w, h) = two_arrow_level();
        let verdict = validate_moves(&arrows, &moves(&["a", "zz"]), w, h);
        assert!(!verdict.valid);
        assert_eq!(verdict.step, Some(2));
    }

    #[test]
    fn test_duplicate_move_rejected_at_step() {
        let a = arrow("a", &[(0, 0), (1, 0)], Direction::Right);
        let b = arrow("b", &[(0, 1), (1, 1)], Direction::Right);
        let c = arrow("c", &[(0, 2), (1, 2)], Direction::Right);
        let verdict = validate_moves(&[a, b, c], &moves(&["a", "a", "b"]), 2, 3);
        assert!(!verdict.valid);
        assert_eq!(verdict.step, Some(2));
        assert_eq!(
            verdict.reason.as_deref(),
            Some("Arrow already removed at step 2")
        );
    }

    #[test]
    fn test_full_solution_solves_generated_levels() {
        for level in [1, 8, 20, 35] {
            let generated = generate(level, None).unwrap();
            let solution =
                full_solution(&generated.arrows, generated.grid.width, generated.grid.height)
                    .unwrap();

            // A permutation of every arrow id.
            assert_eq!(solution.len(), generated.arrows.len());
            let unique: HashSet<&String> = solution.iter().collect();
            assert_eq!(unique.len(), solution.len());

            // And the validator accepts its own reference solution.
            let verdict = validate(&generated, &solution);
            assert!(verdict.valid, "level {level}: {verdict:?}");
        }
    }

    #[test]
    fn test_corrupted_solution_rejected_at_right_step() {
        let generated = generate(10, None).unwrap();
        let solution =
            full_solution(&generated.arrows, generated.grid.width, generated.grid.height).unwrap();
        let maps = BlockingMaps::build(
            &generated.arrows,
            generated.grid.width,
            generated.grid.height,
        );

        // Move a still-blocked arrow ahead of one of its blockers.
        let mut corrupted = solution.clone();
        let mut swapped_at = None;
        'outer: for i in 0..corrupted.len() {
            for j in (i + 1)..corrupted.len() {
                let early = corrupted[j].clone();
                let blockers = &maps.blockers_of[early.as_str()];
                if blockers.contains(corrupted[i].as_str()) {
                    corrupted.swap(i, j);
                    swapped_at = Some(i + 1);
                    break 'outer;
                }
            }
        }
        let step = swapped_at.expect("generated level has no dependency to corrupt");

        let verdict = validate(&generated, &corrupted);
        assert!(!verdict.valid);
        assert_eq!(verdict.step, Some(step));
    }

    #[test]
    fn test_generated_levels_are_acyclic() {
        let generated = generate(40, None).unwrap();
        let maps = BlockingMaps::build(
            &generated.arrows,
            generated.grid.width,
            generated.grid.height,
        );
        let mut dag = crate::dag::DependencyGraph::new();
        // Re-inserting the full relation one arrow at a time, both edge
        // directions relative to the arrows already present, must never
        // report a cycle.
        let mut inserted: HashSet<&str> = HashSet::new();
        for arrow in &generated.arrows {
            let blockers: HashSet<String> = maps.blockers_of[arrow.id.as_str()]
                .iter()
                .copied()
                .filter(|b| inserted.contains(b))
                .map(str::to_string)
                .collect();
            let dependents: HashSet<String> = maps
                .dependents_of
                .get(arrow.id.as_str())
                .map(|deps| {
                    deps.iter()
                        .copied()
                        .filter(|d| inserted.contains(d))
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
            assert!(
                !dag.would_create_cycle(&arrow.id, &blockers, &dependents),
                "cycle through {}",
                arrow.id
            );
            dag.add_arrow(&arrow.id, &blockers, &dependents);
            inserted.insert(&arrow.id);
        }
        assert_eq!(dag.depth(), generated.meta.dag_depth);
    }

    #[test]
    fn test_hint_returns_a_free_arrow() {
        let generated = generate(6, None).unwrap();
        let all_ids: Vec<String> = generated.arrows.iter().map(|a| a.id.clone()).collect();
        let hinted = hint(&generated, &all_ids).unwrap();
        let free: Vec<&str> = free_arrows(
            &generated.arrows,
            generated.grid.width,
            generated.grid.height,
        )
        .iter()
        .map(|a| a.id.as_str())
        .collect();
        assert!(free.contains(&hinted.as_str()));
    }

    #[test]
    fn test_hint_none_when_nothing_remains() {
        let generated = generate(2, None).unwrap();
        assert_eq!(hint(&generated, &[]), None);
    }

    #[test]
    fn test_full_solution_unsolvable_on_cycle() {
        // Two arrows facing each other: each blocks the other.
        let a = arrow("a", &[(0, 0), (1, 0)], Direction::Right);
        let b = arrow("b", &[(3, 0), (2, 0)], Direction::Left);
        let err = full_solution(&[a, b], 4, 1).unwrap_err();
        assert!(matches!(
            err,
            PuzzleError::Unsolvable {
                removed: 0,
                total: 2
            }
        ));
    }

    #[test]
    fn test_check_level_accepts_generated() {
        let generated = generate(15, None).unwrap();
        assert!(check_level(&generated).is_empty());
    }

    #[test]
    fn test_check_level_flags_corruption() {
        let mut generated = generate(3, None).unwrap();
        // Break orthogonality on the first arrow.
        generated.arrows[0].cells[1] = Cell::new(
            generated.arrows[0].cells[0].x + 2,
            generated.arrows[0].cells[0].y,
        );
        let errors = check_level(&generated);
        assert!(!errors.is_empty());
        assert!(errors.iter().any(|e| e.contains("not orthogonal")));
    }
}

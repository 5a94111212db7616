//! Geometric blocking resolution.
//!
//! The single source of truth for "what blocks what": walk the ray from one
//! cell past an arrow's head to the board edge and collect the owners of any
//! occupied cells. Generation feeds the dependency graph with both sides of
//! the relation (who blocks a new arrow, and whom it blocks in turn);
//! validation rebuilds the same relation from a finished arrow list.

use std::collections::{HashMap, HashSet};

use crate::grid::Grid;
use crate::{Arrow, Cell, Direction};

/// Cells on the forward ray, starting one step past `head`, ending at the
/// board edge.
pub fn ray_cells(
    head: Cell,
    direction: Direction,
    width: i32,
    height: i32,
) -> impl Iterator<Item = Cell> {
    let mut cell = direction.step(head);
    std::iter::from_fn(move || {
        if cell.x < 0 || cell.x >= width || cell.y < 0 || cell.y >= height {
            return None;
        }
        let current = cell;
        cell = direction.step(cell);
        Some(current)
    })
}

/// Ids of all arrows currently occupying `arrow`'s forward ray. The arrow's
/// own cells are skipped: a turning tail may fold back across the ray.
pub fn find_blockers(arrow: &Arrow, grid: &Grid) -> HashSet<String> {
    let own_cells: HashSet<Cell> = arrow.cells.iter().copied().collect();
    let mut blockers = HashSet::new();

    for cell in ray_cells(arrow.head(), arrow.direction, grid.width, grid.height) {
        if own_cells.contains(&cell) {
            continue;
        }
        if let Some(owner) = grid.owner(cell) {
            blockers.insert(owner.to_string());
        }
    }
    blockers
}

/// The converse relation: ids of all existing arrows whose forward ray
/// crosses one of `arrow`'s cells, i.e. the arrows `arrow` would block if
/// placed. An arrow's ray covers a cell exactly when its head sits on the
/// same row or column with its direction pointing at the cell, so instead of
/// re-walking every existing ray this walks the four lines out of each
/// candidate cell and looks for heads aimed back at it.
pub fn find_dependents(arrow: &Arrow, all_arrows: &[Arrow], grid: &Grid) -> HashSet<String> {
    let heads: HashMap<Cell, (&str, Direction)> = all_arrows
        .iter()
        .map(|a| (a.head(), (a.id.as_str(), a.direction)))
        .collect();
    let own_cells: HashSet<Cell> = arrow.cells.iter().copied().collect();
    let mut dependents = HashSet::new();

    for &cell in &arrow.cells {
        for outgoing in Direction::ALL {
            for probe in ray_cells(cell, outgoing, grid.width, grid.height) {
                if own_cells.contains(&probe) {
                    continue;
                }
                if let Some(&(id, head_dir)) = heads.get(&probe) {
                    if head_dir == outgoing.opposite() {
                        dependents.insert(id.to_string());
                    }
                }
            }
        }
    }
    dependents
}

#[cfg(test)]
mod tests {
    use super::*;
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

    fn occupy(grid: &mut Grid, arrow: &Arrow) {
        for &cell in &arrow.cells {
            grid.mark_occupied(cell, &arrow.id);
        }
    }

    #[test]
    fn test_ray_stops_at_board_edge() {
        let cells: Vec<Cell> = ray_cells(Cell::new(1, 2), Direction::Right, 5, 5).collect();
        assert_eq!(
            cells,
            vec![Cell::new(2, 2), Cell::new(3, 2), Cell::new(4, 2)]
        );
    }

    #[test]
    fn test_ray_off_board_is_empty() {
        // Head on the edge, pointing out: nothing ahead, never blocked.
        let cells: Vec<Cell> = ray_cells(Cell::new(0, 3), Direction::Left, 5, 5).collect();
        assert!(cells.is_empty());
    }

    #[test]
    fn test_finds_arrow_on_ray() {
        let mut grid = Grid::new(6, 6);
        let blocker = arrow("b", &[(4, 0), (4, 1)], Direction::Up);
        occupy(&mut grid, &blocker);

        let subject = arrow("a", &[(1, 0), (2, 0)], Direction::Right);
        occupy(&mut grid, &subject);

        assert_eq!(
            find_blockers(&subject, &grid),
            HashSet::from(["b".to_string()])
        );
        // The blocker's own ray exits the board immediately.
        assert!(find_blockers(&blocker, &grid).is_empty());
    }

    #[test]
    fn test_own_tail_on_ray_is_not_a_blocker() {
        let mut grid = Grid::new(6, 6);
        // U-shaped arrow whose tail folds back onto its own ray.
        let subject = arrow(
            "a",
            &[(2, 2), (2, 3), (3, 3), (3, 2), (3, 1), (2, 1)],
            Direction::Down,
        );
        occupy(&mut grid, &subject);
        assert!(find_blockers(&subject, &grid).is_empty());
    }

    #[test]
    fn test_dependents_are_arrows_aimed_at_us() {
        let mut grid = Grid::new(6, 6);
        // "x" points right along row 3; its ray covers (3,3)..(5,3).
        let x = arrow("x", &[(1, 3), (2, 3)], Direction::Right);
        occupy(&mut grid, &x);
        // "y" points up along column 0, far from the candidate.
        let y = arrow("y", &[(0, 5), (0, 4)], Direction::Up);
        occupy(&mut grid, &y);
        let all = vec![x, y];

        // Candidate sits on x's ray but not on y's.
        let candidate = arrow("c", &[(4, 3), (4, 2)], Direction::Up);
        assert_eq!(
            find_dependents(&candidate, &all, &grid),
            HashSet::from(["x".to_string()])
        );
    }

    #[test]
    fn test_dependents_seen_through_other_arrows() {
        // A ray covers every cell to the edge, not just up to the first
        // obstacle, so a head two arrows away still depends on us.
        let mut grid = Grid::new(8, 1);
        let far = arrow("far", &[(0, 0), (1, 0)], Direction::Right);
        let near = arrow("near", &[(3, 0), (4, 0)], Direction::Right);
        occupy(&mut grid, &far);
        occupy(&mut grid, &near);
        let all = vec![far, near];

        let candidate = arrow("c", &[(6, 0), (7, 0)], Direction::Right);
        assert_eq!(
            find_dependents(&candidate, &all, &grid),
            HashSet::from(["far".to_string(), "near".to_string()])
        );
    }

    #[test]
    fn test_multiple_blockers_collected() {
        let mut grid = Grid::new(8, 1);
        let b1 = arrow("b1", &[(4, 0), (3, 0)], Direction::Left);
        let b2 = arrow("b2", &[(6, 0), (7, 0)], Direction::Right);
        occupy(&mut grid, &b1);
        occupy(&mut grid, &b2);

        let subject = arrow("a", &[(1, 0), (2, 0)], Direction::Right);
        occupy(&mut grid, &subject);

        let blockers = find_blockers(&subject, &grid);
        assert_eq!(
            blockers,
            HashSet::from(["b1".to_string(), "b2".to_string()])
        );
    }
}

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod benchmark;
pub mod blocking;
pub mod cache;
pub mod dag;
pub mod generator;
pub mod grid;
pub mod grower;
pub mod rng;
pub mod validator;

#[derive(Debug, Error)]
pub enum PuzzleError {
    #[error("Invalid grid dimensions {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },
    #[error("Max arrow length {0} is below the minimum of 2")]
    InvalidMaxLength(usize),
    #[error("Level is not solvable: removed {removed} of {total} arrows")]
    Unsolvable { removed: usize, total: usize },
    #[error("Benchmark error: {0}")]
    Benchmark(String),
}

pub type Result<T> = std::result::Result<T, PuzzleError>;

/// Board coordinate, 0-indexed, x grows right and y grows down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Travel direction of an arrow, fixed by its head and neck cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit vector (dx, dy) for one step in this direction.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn rotate_cw(self) -> Direction {
        match self {
            Direction::Up => Direction::Right,
            Direction::Right => Direction::Down,
            Direction::Down => Direction::Left,
            Direction::Left => Direction::Up,
        }
    }

    pub fn rotate_ccw(self) -> Direction {
        match self {
            Direction::Up => Direction::Left,
            Direction::Left => Direction::Down,
            Direction::Down => Direction::Right,
            Direction::Right => Direction::Up,
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn step(self, cell: Cell) -> Cell {
        let (dx, dy) = self.delta();
        Cell::new(cell.x + dx, cell.y + dy)
    }

    /// Direction from one cell to an orthogonally adjacent cell, if any.
    pub fn between(from: Cell, to: Cell) -> Option<Direction> {
        match (to.x - from.x, to.y - from.y) {
            (1, 0) => Some(Direction::Right),
            (-1, 0) => Some(Direction::Left),
            (0, 1) => Some(Direction::Down),
            (0, -1) => Some(Direction::Up),
            _ => None,
        }
    }
}

/// Gameplay modifier carried by an arrow. Does not affect solve order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ArrowKind {
    #[default]
    Normal,
    Ice,
    #[serde(alias = "life")]
    PlusLife,
    #[serde(alias = "danger")]
    MinusLife,
    Bomb,
    Electric,
}

impl ArrowKind {
    pub fn is_special(self) -> bool {
        self != ArrowKind::Normal
    }
}

/// An ordered run of orthogonally adjacent cells. `cells[0]` is the head,
/// `cells[1]` the neck; `direction` is the head-to-neck vector and is never
/// recomputed from the cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arrow {
    pub id: String,
    pub cells: Vec<Cell>,
    pub direction: Direction,
    #[serde(rename = "type", default)]
    pub kind: ArrowKind,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub frozen: u8,
}

impl Arrow {
    pub fn head(&self) -> Cell {
        self.cells[0]
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDims {
    pub width: i32,
    pub height: i32,
    #[serde(default)]
    pub void_cells: Vec<Cell>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelMeta {
    pub difficulty: f64,
    pub arrow_count: usize,
    pub special_arrow_count: usize,
    pub dag_depth: usize,
    pub target_depth: (usize, usize),
}

/// A generated level. Immutable once produced; serialization beyond the
/// serde derives is the serving layer's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub level: u32,
    pub seed: u64,
    pub grid: GridDims,
    pub arrows: Vec<Arrow>,
    pub meta: LevelMeta,
}

//! DAG-first level generation.
//!
//! Arrows are grown over the board in concentric "onion layers" from the
//! center outward, each pointing away from the center so inner arrows are
//! blocked by outer ones. Every placement is vetted against the dependency
//! graph before commit, with edges in both directions: the arrows blocking
//! the candidate, and the already-placed arrows whose rays the candidate
//! lands on. A rejected placement simply leaves its cells free for a later
//! attempt; cells no legal arrow can cover become voids. Because the graph
//! mirrors the full geometric relation and stays acyclic by construction, a
//! complete removal order always exists and no separate solvability pass is
//! needed.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::blocking::{find_blockers, find_dependents};
use crate::dag::DependencyGraph;
use crate::grid::Grid;
use crate::grower::{grow, GrownArrow};
use crate::rng::SeededRandom;
use crate::{Arrow, ArrowKind, Cell, Direction, GridDims, Level, LevelMeta, PuzzleError, Result};

pub const ARROW_COLORS: [&str; 10] = [
    "#FF6B6B", // red
    "#4ECDC4", // teal
    "#45B7D1", // blue
    "#96CEB4", // green
    "#FFEAA7", // yellow
    "#DDA0DD", // plum
    "#F39C12", // orange
    "#9B59B6", // purple
    "#1ABC9C", // turquoise
    "#E74C3C", // crimson
];

/// Tunable generation curves, all pure functions of the level index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorParams {
    pub width: i32,
    pub height: i32,
    pub max_length: usize,
    pub target_depth: (usize, usize),
}

impl GeneratorParams {
    pub fn for_level(level: u32) -> Self {
        let (width, height) = grid_size(level);
        Self {
            width,
            height,
            max_length: max_arrow_length(level),
            target_depth: target_dag_depth(level),
        }
    }

    /// Fail-fast configuration check; bad parameters are never clamped.
    pub fn validate(&self) -> Result<()> {
        if self.width <= 0 || self.height <= 0 {
            return Err(PuzzleError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.max_length < 2 {
            return Err(PuzzleError::InvalidMaxLength(self.max_length));
        }
        Ok(())
    }
}

/// Board size progression.
fn grid_size(level: u32) -> (i32, i32) {
    let side = match level {
        0..=10 => 4,
        11..=20 => 5,
        21..=35 => 6,
        36..=50 => 7,
        51..=70 => 8,
        71..=100 => 10,
        101..=150 => 12,
        151..=200 => 14,
        201..=300 => 17,
        301..=500 => 22,
        501..=750 => 30,
        751..=1000 => 40,
        _ => {
            let extra = (level - 1000) / 50;
            (40 + extra * 5).min(250) as i32
        }
    };
    (side, side)
}

fn max_arrow_length(level: u32) -> usize {
    match level {
        0..=10 => 4,
        11..=30 => 6,
        31..=50 => 12,
        51..=100 => 20,
        _ => (20 + (level - 100) / 50).min(30) as usize,
    }
}

fn target_dag_depth(level: u32) -> (usize, usize) {
    match level {
        0..=5 => (1, 2),
        6..=15 => (2, 3),
        16..=30 => (2, 4),
        31..=50 => (3, 5),
        51..=100 => (4, 6),
        101..=200 => (5, 8),
        201..=500 => (6, 10),
        _ => (8, 15),
    }
}

/// Cells grouped by Manhattan distance from the board center, nearest first.
fn onion_layers(width: i32, height: i32) -> Vec<Vec<Cell>> {
    let cx = width / 2;
    let cy = height / 2;
    // (0,0) is the farthest cell from the (floored) center.
    let max_distance = (cx + cy) as usize;
    let mut layers: Vec<Vec<Cell>> = vec![Vec::new(); max_distance + 1];

    for y in 0..height {
        for x in 0..width {
            let distance = ((x - cx).abs() + (y - cy).abs()) as usize;
            layers[distance].push(Cell::new(x, y));
        }
    }
    layers
}

/// Target length shrinks linearly from `max_length` at the center layer to 2
/// at the outermost layer.
fn target_length_for_layer(layer_idx: usize, total_layers: usize, max_length: usize) -> usize {
    if total_layers <= 1 {
        return (max_length / 2).max(2);
    }
    let progress = layer_idx as f64 / (total_layers - 1) as f64;
    let length = max_length as i64 - (progress * (max_length - 2) as f64) as i64;
    (length.max(2)) as usize
}

/// Direction pointing away from the center along the dominant offset axis.
fn outward_direction(pos: Cell, width: i32, height: i32) -> Direction {
    let dx = pos.x - width / 2;
    let dy = pos.y - height / 2;
    if dx.abs() > dy.abs() {
        if dx > 0 {
            Direction::Right
        } else {
            Direction::Left
        }
    } else if dy > 0 {
        Direction::Down
    } else {
        Direction::Up
    }
}

fn commit_arrow(
    grown: GrownArrow,
    id: String,
    blockers: &HashSet<String>,
    dependents: &HashSet<String>,
    grid: &mut Grid,
    dag: &mut DependencyGraph,
    arrows: &mut Vec<Arrow>,
) {
    dag.add_arrow(&id, blockers, dependents);
    for &cell in &grown.cells {
        grid.mark_occupied(cell, &id);
    }
    arrows.push(Arrow {
        id,
        cells: grown.cells,
        direction: grown.direction,
        kind: ArrowKind::Normal,
        color: String::new(),
        frozen: 0,
    });
}

/// Tiles the board with arrows, center outward, cycle-checking every
/// placement. Returns the arrow list in placement order, the dependency
/// graph built along the way, and any cells left uncoverable (in scanline
/// order) to be declared void.
fn place_arrows(
    params: &GeneratorParams,
    rng: &mut SeededRandom,
) -> (Vec<Arrow>, DependencyGraph, Vec<Cell>) {
    let mut grid = Grid::new(params.width, params.height);
    let mut arrows: Vec<Arrow> = Vec::new();
    let mut dag = DependencyGraph::new();
    let mut next_id = 0usize;

    let layers = onion_layers(params.width, params.height);
    let total_layers = layers.len();

    for (layer_idx, layer) in layers.into_iter().enumerate() {
        let target_length = target_length_for_layer(layer_idx, total_layers, params.max_length);
        let mut cells = layer;
        rng.shuffle(&mut cells);

        for start in cells {
            if grid.is_occupied(start) {
                continue;
            }
            let direction = outward_direction(start, params.width, params.height);
            let Some(grown) = grow(start, direction, target_length, &grid, rng) else {
                continue;
            };

            let id = format!("a{next_id}");
            let candidate = Arrow {
                id: id.clone(),
                cells: grown.cells.clone(),
                direction: grown.direction,
                kind: ArrowKind::Normal,
                color: String::new(),
                frozen: 0,
            };
            let blockers = find_blockers(&candidate, &grid);
            let dependents = find_dependents(&candidate, &arrows, &grid);

            // The load-bearing check: committing a cycle would make the
            // level unsolvable. Discard and leave the cells free.
            if dag.would_create_cycle(&id, &blockers, &dependents) {
                debug!(arrow = %id, layer = layer_idx, "placement rejected: would cycle");
                continue;
            }

            commit_arrow(grown, id, &blockers, &dependents, &mut grid, &mut dag, &mut arrows);
            next_id += 1;
        }
    }

    // Sweep the holes left by rejected placements with minimal 2-cell arrows,
    // trying every direction before giving a cell up.
    for y in 0..params.height {
        for x in 0..params.width {
            let start = Cell::new(x, y);
            if grid.is_occupied(start) {
                continue;
            }

            let mut directions = Direction::ALL;
            rng.shuffle(&mut directions);

            for direction in directions {
                let Some(grown) = grow(start, direction, 2, &grid, rng) else {
                    continue;
                };
                let id = format!("a{next_id}");
                let candidate = Arrow {
                    id: id.clone(),
                    cells: grown.cells.clone(),
                    direction: grown.direction,
                    kind: ArrowKind::Normal,
                    color: String::new(),
                    frozen: 0,
                };
                let blockers = find_blockers(&candidate, &grid);
                let dependents = find_dependents(&candidate, &arrows, &grid);
                if dag.would_create_cycle(&id, &blockers, &dependents) {
                    continue;
                }
                commit_arrow(grown, id, &blockers, &dependents, &mut grid, &mut dag, &mut arrows);
                next_id += 1;
                break;
            }
        }
    }

    // Whatever the sweep could not fill becomes void: either every 2-cell
    // arrow from the cell would cycle, or the cell is a boxed-in singleton.
    let mut voids = Vec::new();
    for y in 0..params.height {
        for x in 0..params.width {
            let cell = Cell::new(x, y);
            if !grid.is_occupied(cell) {
                voids.push(cell);
            }
        }
    }
    if !voids.is_empty() {
        warn!(voids = voids.len(), "declaring uncoverable cells void");
    }

    (arrows, dag, voids)
}

/// Per-type special-arrow probabilities for a level index. Each type switches
/// on at its own level and ramps up to a cap.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpecialChances {
    pub ice: f64,
    pub plus_life: f64,
    pub minus_life: f64,
    pub bomb: f64,
    pub electric: f64,
}

impl SpecialChances {
    pub fn for_level(level: u32) -> Self {
        let ramp = |from: u32, base: f64, step: f64, cap: f64| {
            if level >= from {
                (base + (level - from) as f64 * step).min(cap)
            } else {
                0.0
            }
        };
        Self {
            ice: ramp(25, 0.05, 0.001, 0.20),
            plus_life: ramp(15, 0.03, 0.001, 0.10),
            minus_life: ramp(40, 0.03, 0.001, 0.12),
            bomb: ramp(60, 0.02, 0.001, 0.08),
            electric: ramp(90, 0.01, 0.0005, 0.06),
        }
    }
}

/// Assigns special kinds by one draw per arrow against cumulative thresholds.
/// The bucket order is fixed (ice, plus-life, minus-life, bomb, electric);
/// thresholds are additive, so reordering would change the distribution.
/// Returns the number of special arrows.
fn assign_kinds(arrows: &mut [Arrow], level: u32, rng: &mut SeededRandom) -> usize {
    let chances = SpecialChances::for_level(level);
    let buckets = [
        (chances.ice, ArrowKind::Ice),
        (chances.plus_life, ArrowKind::PlusLife),
        (chances.minus_life, ArrowKind::MinusLife),
        (chances.bomb, ArrowKind::Bomb),
        (chances.electric, ArrowKind::Electric),
    ];

    let mut special_count = 0;
    for arrow in arrows.iter_mut() {
        let draw = rng.next_f64();
        let mut cumulative = 0.0;
        arrow.kind = ArrowKind::Normal;

        for (chance, kind) in buckets {
            cumulative += chance;
            if draw < cumulative {
                arrow.kind = kind;
                if kind == ArrowKind::Ice {
                    arrow.frozen = 2;
                }
                special_count += 1;
                break;
            }
        }
    }
    special_count
}

/// Generates the level for `level`, seeded by `seed` (defaults to the level
/// index so that re-generation on the server reproduces the client's board).
pub fn generate(level: u32, seed: Option<u64>) -> Result<Level> {
    generate_with_params(level, seed, GeneratorParams::for_level(level))
}

pub fn generate_with_params(
    level: u32,
    seed: Option<u64>,
    params: GeneratorParams,
) -> Result<Level> {
    params.validate()?;
    let seed = seed.unwrap_or(u64::from(level));
    let mut rng = SeededRandom::new(seed);

    debug!(
        level,
        seed,
        width = params.width,
        height = params.height,
        max_length = params.max_length,
        "generating level"
    );

    let (mut arrows, dag, void_cells) = place_arrows(&params, &mut rng);

    for (i, arrow) in arrows.iter_mut().enumerate() {
        arrow.color = ARROW_COLORS[i % ARROW_COLORS.len()].to_string();
    }
    let special_count = assign_kinds(&mut arrows, level, &mut rng);

    let dag_depth = dag.depth();
    let difficulty = arrows.len() as f64 * 0.3 + dag_depth as f64 * 0.4 + special_count as f64 * 0.3;
    let difficulty = (difficulty * 100.0).round() / 100.0;

    info!(
        level,
        seed,
        arrows = arrows.len(),
        specials = special_count,
        voids = void_cells.len(),
        dag_depth,
        difficulty,
        "level generated"
    );

    Ok(Level {
        level,
        seed,
        grid: GridDims {
            width: params.width,
            height: params.height,
            void_cells,
        },
        meta: LevelMeta {
            difficulty,
            arrow_count: arrows.len(),
            special_arrow_count: special_count,
            dag_depth,
            target_depth: params.target_depth,
        },
        arrows,
    })
}

//! Sliding-arrow puzzle level tool.
//!
//! This program:
//! 1. Generates a level deterministically from a level index (and seed)
//! 2. Derives a reference solution from the dependency structure
//! 3. Re-validates the solution the way the server does for submitted moves
//! 4. Prints the board, the solve order and the difficulty metadata

use arrow_puzzle::cache::LevelCache;
use arrow_puzzle::validator::{full_solution, validate};
use arrow_puzzle::{benchmark, Cell, Direction, Level};
use std::env;
use tracing::{error, info, Level as LogLevel};
use tracing_subscriber::FmtSubscriber;

fn main() {
    FmtSubscriber::builder()
        .with_max_level(LogLevel::DEBUG)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_target(false)
        .with_thread_names(true)
        .with_ansi(true)
        .pretty()
        .init();

    let args: Vec<String> = env::args().collect();
    match args.get(1).map(|s| s.as_str()) {
        Some("benchmark") => {
            let count = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(100);

            info!("Running benchmark over {} levels...", count);
            match benchmark::run_benchmark(count) {
                Ok(results) => results.print_results(),
                Err(e) => error!("Benchmark failed: {}", e),
            }
        }
        Some("generate") | None => {
            let level_index: u32 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(1);
            let seed: Option<u64> = args.get(3).and_then(|s| s.parse().ok());

            info!("Generating level {}...", level_index);
            match LevelCache::global().get_or_generate(level_index, seed) {
                Ok(level) => {
                    print_level(&level);

                    match full_solution(&level.arrows, level.grid.width, level.grid.height) {
                        Ok(solution) => {
                            info!("Reference solution: {}", solution.join(" "));
                            let verdict = validate(&level, &solution);
                            if verdict.valid {
                                info!("✅ Reference solution re-validated!");
                            } else {
                                error!("❌ Reference solution rejected: {:?}", verdict.reason);
                            }
                        }
                        Err(e) => error!("Failed to solve level: {}", e),
                    }
                }
                Err(e) => error!("Failed to generate level: {}", e),
            }
        }
        Some(other) => {
            error!("Unknown command: {}", other);
            eprintln!("Usage: arrow-puzzle [generate <level> [seed] | benchmark <count>]");
        }
    }
}

/// Prints a level as an ASCII board. Heads show their travel direction,
/// tail cells show `+`, uncovered or void cells show `·`.
fn print_level(level: &Level) {
    println!(
        "Level {} (seed {}): {}x{}, {} arrows, depth {}, difficulty {}",
        level.level,
        level.seed,
        level.grid.width,
        level.grid.height,
        level.meta.arrow_count,
        level.meta.dag_depth,
        level.meta.difficulty
    );

    let mut glyphs = vec![vec!['·'; level.grid.width as usize]; level.grid.height as usize];
    for arrow in &level.arrows {
        for (i, cell) in arrow.cells.iter().enumerate() {
            let glyph = if i == 0 {
                match arrow.direction {
                    Direction::Up => '^',
                    Direction::Down => 'v',
                    Direction::Left => '<',
                    Direction::Right => '>',
                }
            } else {
                '+'
            };
            glyphs[cell.y as usize][cell.x as usize] = glyph;
        }
    }
    for void in &level.grid.void_cells {
        let Cell { x, y } = *void;
        glyphs[y as usize][x as usize] = '·';
    }

    println!("┌{}┐", "─".repeat(level.grid.width as usize * 2 + 1));
    for row in glyphs {
        print!("│ ");
        for glyph in row {
            print!("{glyph} ");
        }
        println!("│");
    }
    println!("└{}┘", "─".repeat(level.grid.width as usize * 2 + 1));
}

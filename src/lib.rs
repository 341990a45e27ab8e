//! Crossword filling as a constraint satisfaction problem.
//!
//! Each slot in the grid is a variable whose domain starts as the whole word list. We make the
//! domains node-consistent (right length) and arc-consistent (every word has a compatible word in
//! each crossing slot) and then run a backtracking search over what's left. See `find_fill`.

pub mod arc_consistency;
pub mod backtracking_search;
pub mod domains;
pub mod grid_config;
pub mod render;
pub mod word_list;

/// The expected maximum length for a single slot. Longer slots work, they just spill to the heap.
pub const MAX_SLOT_LENGTH: usize = 21;

pub use backtracking_search::{find_fill, Assignment, Choice, FillFailure, FillSuccess, Statistics};
pub use grid_config::{Direction, Puzzle, PuzzleError, Variable};
pub use render::render_grid;
pub use word_list::WordList;

//! Static puzzle geometry: the slots of a grid, where they cross, and which slots neighbor each
//! other. None of this changes during filling; the solver only reads it.

use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use thiserror::Error;

use crate::MAX_SLOT_LENGTH;

/// An identifier for a given slot, based on its index in the puzzle's `slot_configs` field, which
/// also corresponds to an index in the domain store and in any assignment.
pub type SlotId = usize;

/// Zero-indexed row and column for a cell in the grid, where row = 0 is the top row.
pub type GridCoord = (usize, usize);

/// Direction that a slot is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Across,
    Down,
}

/// A slot in the grid, identified entirely by its geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Variable {
    pub row: usize,
    pub col: usize,
    pub length: usize,
    pub direction: Direction,
}

impl Variable {
    pub fn new(row: usize, col: usize, length: usize, direction: Direction) -> Variable {
        Variable { row, col, length, direction }
    }

    /// Generate the coords for each cell of this variable, in word order.
    pub fn cells(&self) -> impl Iterator<Item = GridCoord> {
        let Variable { row, col, length, direction } = *self;

        (0..length).map(move |cell_idx| match direction {
            Direction::Across => (row, col + cell_idx),
            Direction::Down => (row + cell_idx, col),
        })
    }
}

/// Where two variables share a cell: `first` is the index into the first variable's word and
/// `second` the index into the second's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overlap {
    pub first: usize,
    pub second: usize,
}

impl Overlap {
    /// The same overlap seen from the other variable.
    pub fn flipped(self) -> Overlap {
        Overlap { first: self.second, second: self.first }
    }
}

/// A crossing between one slot and another, referencing the other slot's id and the location of
/// the intersection within the other slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crossing {
    pub other_slot_id: SlotId,
    pub other_slot_cell: usize,
}

/// The aspects of a slot that are static during filling.
pub struct SlotConfig {
    pub id: SlotId,
    pub variable: Variable,

    /// One entry per cell, `Some` where another slot passes through that cell.
    pub crossings: SmallVec<[Option<Crossing>; MAX_SLOT_LENGTH]>,

    /// Every other slot sharing a cell with this one, in cell order.
    pub neighbors: SmallVec<[SlotId; MAX_SLOT_LENGTH]>,
}

impl Debug for SlotConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotConfig")
            .field("id", &self.id)
            .field("variable", &self.variable)
            .field("neighbors", &self.neighbors)
            .finish()
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PuzzleError {
    #[error("Puzzle template has no rows")]
    Empty,

    #[error("{variable:?} extends outside the {height}x{width} grid")]
    OutOfBounds { variable: Variable, height: usize, width: usize },

    #[error("{variable:?} appears more than once")]
    DuplicateVariable { variable: Variable },

    #[error("Cell {cell:?} is covered by more than two slots")]
    CellOverloaded { cell: GridCoord },

    #[error("{first:?} and {second:?} share more than one cell")]
    MultipleOverlaps { first: Variable, second: Variable },
}

/// The full puzzle geometry.
pub struct Puzzle {
    height: usize,
    width: usize,
    structure: Vec<Vec<bool>>,
    slot_configs: Vec<SlotConfig>,
    slot_ids_by_variable: HashMap<Variable, SlotId>,
}

impl Debug for Puzzle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Puzzle")
            .field("height", &self.height)
            .field("width", &self.width)
            .field("slot_configs", &self.slot_configs)
            .finish()
    }
}

impl Puzzle {
    /// Build a puzzle from a fillable/blocked mask, deriving one variable for every run of two or
    /// more fillable cells in a row or column. Rows shorter than the widest row are treated as
    /// blocked past their end.
    pub fn from_structure(structure: Vec<Vec<bool>>) -> Result<Puzzle, PuzzleError> {
        if structure.is_empty() {
            return Err(PuzzleError::Empty);
        }

        let height = structure.len();
        let width = structure.iter().map(|row| row.len()).max().unwrap_or(0);
        let structure: Vec<Vec<bool>> = structure
            .into_iter()
            .map(|mut row| {
                row.resize(width, false);
                row
            })
            .collect();

        let mut variables: Vec<Variable> = vec![];

        for row in 0..height {
            for col in 0..width {
                if !structure[row][col] {
                    continue;
                }

                if row == 0 || !structure[row - 1][col] {
                    let length = (row..height).take_while(|&r| structure[r][col]).count();
                    if length > 1 {
                        variables.push(Variable::new(row, col, length, Direction::Down));
                    }
                }

                if col == 0 || !structure[row][col - 1] {
                    let length = (col..width).take_while(|&c| structure[row][c]).count();
                    if length > 1 {
                        variables.push(Variable::new(row, col, length, Direction::Across));
                    }
                }
            }
        }

        Puzzle::build(height, width, structure, variables)
    }

    /// Build a puzzle from a string template, with `_` or `.` representing fillable cells and
    /// anything else representing blocks. Blank lines and surrounding whitespace are ignored.
    pub fn from_template_str(template: &str) -> Result<Puzzle, PuzzleError> {
        let structure: Vec<Vec<bool>> = template
            .lines()
            .filter_map(|line| {
                let line = line.trim();
                if line.is_empty() {
                    None
                } else {
                    Some(line.chars().map(|c| c == '_' || c == '.').collect())
                }
            })
            .collect();

        Puzzle::from_structure(structure)
    }

    /// Build a puzzle with an explicit list of variables. The cells they cover are the fillable
    /// cells of the grid.
    pub fn from_variables(
        height: usize,
        width: usize,
        variables: Vec<Variable>,
    ) -> Result<Puzzle, PuzzleError> {
        let mut structure = vec![vec![false; width]; height];

        for variable in &variables {
            let fits = match variable.direction {
                Direction::Across => variable.row < height && variable.col + variable.length <= width,
                Direction::Down => variable.col < width && variable.row + variable.length <= height,
            };
            if !fits {
                return Err(PuzzleError::OutOfBounds { variable: *variable, height, width });
            }

            for (row, col) in variable.cells() {
                structure[row][col] = true;
            }
        }

        Puzzle::build(height, width, structure, variables)
    }

    fn build(
        height: usize,
        width: usize,
        structure: Vec<Vec<bool>>,
        variables: Vec<Variable>,
    ) -> Result<Puzzle, PuzzleError> {
        let mut slot_ids_by_variable: HashMap<Variable, SlotId> = HashMap::new();

        // (slot id, cell index within slot) for every slot passing through each cell.
        let mut slots_by_cell: HashMap<GridCoord, SmallVec<[(SlotId, usize); 2]>> = HashMap::new();

        for (slot_id, variable) in variables.iter().enumerate() {
            if slot_ids_by_variable.insert(*variable, slot_id).is_some() {
                return Err(PuzzleError::DuplicateVariable { variable: *variable });
            }

            for (cell_idx, cell) in variable.cells().enumerate() {
                let entries = slots_by_cell.entry(cell).or_default();
                if entries.len() == 2 {
                    return Err(PuzzleError::CellOverloaded { cell });
                }
                entries.push((slot_id, cell_idx));
            }
        }

        let mut slot_configs: Vec<SlotConfig> = Vec::with_capacity(variables.len());

        for (slot_id, variable) in variables.iter().enumerate() {
            let crossings: SmallVec<[Option<Crossing>; MAX_SLOT_LENGTH]> = variable
                .cells()
                .map(|cell| {
                    slots_by_cell[&cell]
                        .iter()
                        .find(|&&(other_slot_id, _)| other_slot_id != slot_id)
                        .map(|&(other_slot_id, other_slot_cell)| Crossing {
                            other_slot_id,
                            other_slot_cell,
                        })
                })
                .collect();

            let mut neighbors: SmallVec<[SlotId; MAX_SLOT_LENGTH]> = SmallVec::new();
            for crossing in crossings.iter().flatten() {
                if neighbors.contains(&crossing.other_slot_id) {
                    return Err(PuzzleError::MultipleOverlaps {
                        first: *variable,
                        second: variables[crossing.other_slot_id],
                    });
                }
                neighbors.push(crossing.other_slot_id);
            }

            slot_configs.push(SlotConfig {
                id: slot_id,
                variable: *variable,
                crossings,
                neighbors,
            });
        }

        Ok(Puzzle { height, width, structure, slot_configs, slot_ids_by_variable })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Is the given cell fillable? Cells outside the grid are not.
    pub fn is_open(&self, row: usize, col: usize) -> bool {
        self.structure.get(row).and_then(|cells| cells.get(col)).copied().unwrap_or(false)
    }

    pub fn slot_count(&self) -> usize {
        self.slot_configs.len()
    }

    pub fn slot_configs(&self) -> &[SlotConfig] {
        &self.slot_configs
    }

    pub fn slot_config(&self, slot_id: SlotId) -> &SlotConfig {
        &self.slot_configs[slot_id]
    }

    pub fn variable(&self, slot_id: SlotId) -> &Variable {
        &self.slot_configs[slot_id].variable
    }

    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.slot_configs.iter().map(|slot_config| &slot_config.variable)
    }

    pub fn slot_id(&self, variable: &Variable) -> Option<SlotId> {
        self.slot_ids_by_variable.get(variable).copied()
    }

    /// All slots sharing a cell with the given one.
    pub fn neighbors(&self, slot_id: SlotId) -> &[SlotId] {
        &self.slot_configs[slot_id].neighbors
    }

    /// Where `x` and `y` share a cell, if they do. Always `None` when `x == y`.
    pub fn overlap(&self, x: SlotId, y: SlotId) -> Option<Overlap> {
        if x == y {
            return None;
        }

        self.slot_configs[x]
            .crossings
            .iter()
            .enumerate()
            .find_map(|(cell_idx, crossing)| match crossing {
                Some(crossing) if crossing.other_slot_id == y => Some(Overlap {
                    first: cell_idx,
                    second: crossing.other_slot_cell,
                }),
                _ => None,
            })
    }
}

#[cfg(test)]
mod tests {
    use crate::grid_config::Direction::{Across, Down};
    use crate::grid_config::{Overlap, Puzzle, PuzzleError, Variable};

    /// _____#
    /// _##_##
    /// ______
    #[test]
    fn test_from_template_str_derives_variables() {
        let puzzle = Puzzle::from_template_str(
            "
            _____#
            _##_##
            ______
            ",
        )
        .expect("valid template");

        assert_eq!(puzzle.height(), 3);
        assert_eq!(puzzle.width(), 6);

        let variables: Vec<Variable> = puzzle.variables().cloned().collect();
        assert_eq!(
            variables,
            vec![
                Variable::new(0, 0, 3, Down),
                Variable::new(0, 0, 5, Across),
                Variable::new(0, 3, 3, Down),
                Variable::new(2, 0, 6, Across),
            ]
        );
    }

    #[test]
    fn test_overlaps_and_neighbors() {
        let puzzle = Puzzle::from_template_str(
            "
            _____#
            _##_##
            ______
            ",
        )
        .unwrap();

        let down_0 = puzzle.slot_id(&Variable::new(0, 0, 3, Down)).unwrap();
        let across_0 = puzzle.slot_id(&Variable::new(0, 0, 5, Across)).unwrap();
        let down_3 = puzzle.slot_id(&Variable::new(0, 3, 3, Down)).unwrap();
        let across_2 = puzzle.slot_id(&Variable::new(2, 0, 6, Across)).unwrap();

        assert_eq!(puzzle.overlap(down_0, across_0), Some(Overlap { first: 0, second: 0 }));
        assert_eq!(puzzle.overlap(across_0, down_3), Some(Overlap { first: 3, second: 0 }));
        assert_eq!(puzzle.overlap(down_3, across_2), Some(Overlap { first: 2, second: 3 }));
        assert_eq!(puzzle.overlap(down_0, down_3), None);
        assert_eq!(puzzle.overlap(across_0, across_0), None);

        for x in 0..puzzle.slot_count() {
            for y in 0..puzzle.slot_count() {
                assert_eq!(puzzle.overlap(x, y), puzzle.overlap(y, x).map(Overlap::flipped));
                assert_eq!(puzzle.overlap(x, y).is_some(), puzzle.neighbors(x).contains(&y));
            }
        }

        let mut across_0_neighbors = puzzle.neighbors(across_0).to_vec();
        across_0_neighbors.sort();
        let mut expected = vec![down_0, down_3];
        expected.sort();
        assert_eq!(across_0_neighbors, expected);
    }

    #[test]
    fn test_ragged_template_rows_are_blocked_past_their_end() {
        let puzzle = Puzzle::from_template_str("___\n__\n___").unwrap();

        assert_eq!(puzzle.width(), 3);
        assert!(!puzzle.is_open(1, 2));
        assert!(puzzle.is_open(1, 1));
        assert!(puzzle.slot_id(&Variable::new(0, 2, 3, Down)).is_none());
        assert!(puzzle.slot_id(&Variable::new(0, 0, 3, Down)).is_some());
    }

    #[test]
    fn test_single_cells_are_not_variables() {
        let puzzle = Puzzle::from_template_str("_#_\n###\n_#_").unwrap();

        assert_eq!(puzzle.slot_count(), 0);
        assert!(puzzle.is_open(0, 0));
    }

    #[test]
    fn test_empty_template_is_rejected() {
        assert_eq!(Puzzle::from_template_str("\n   \n").unwrap_err(), PuzzleError::Empty);
    }

    #[test]
    fn test_from_variables() {
        let puzzle = Puzzle::from_variables(
            3,
            3,
            vec![Variable::new(0, 0, 3, Across), Variable::new(0, 0, 3, Down)],
        )
        .unwrap();

        assert_eq!(puzzle.slot_count(), 2);
        assert_eq!(puzzle.overlap(0, 1), Some(Overlap { first: 0, second: 0 }));
        assert!(puzzle.is_open(2, 0));
        assert!(!puzzle.is_open(1, 1));
    }

    #[test]
    fn test_from_variables_rejects_bad_geometry() {
        assert!(matches!(
            Puzzle::from_variables(2, 2, vec![Variable::new(0, 0, 3, Across)]),
            Err(PuzzleError::OutOfBounds { .. })
        ));

        assert!(matches!(
            Puzzle::from_variables(
                3,
                3,
                vec![Variable::new(0, 0, 3, Across), Variable::new(0, 0, 3, Across)],
            ),
            Err(PuzzleError::DuplicateVariable { .. })
        ));

        assert!(matches!(
            Puzzle::from_variables(
                3,
                4,
                vec![
                    Variable::new(0, 0, 3, Across),
                    Variable::new(0, 1, 3, Across),
                    Variable::new(0, 2, 3, Down),
                ],
            ),
            Err(PuzzleError::CellOverloaded { cell: (0, 2) })
        ));

        assert!(matches!(
            Puzzle::from_variables(
                1,
                4,
                vec![Variable::new(0, 0, 3, Across), Variable::new(0, 1, 3, Across)],
            ),
            Err(PuzzleError::MultipleOverlaps { .. })
        ));
    }
}

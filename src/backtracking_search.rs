//! Backtracking search over slot assignments, plus `find_fill`, which runs the consistency passes
//! and then the search.
//!
//! Slots are chosen by minimum remaining values, breaking ties by degree. Words are tried in
//! least-constraining order, where a word constrains an unassigned neighbor if that neighbor could
//! also take it (since no word may appear twice in the grid). The search keeps its own explicit
//! stack of frames rather than recursing, so deep grids don't grow the call stack.

use bit_set::BitSet;
use instant::{Duration, Instant};
use log::debug;
use smallvec::SmallVec;
use std::cmp::Reverse;
use std::collections::HashMap;
use thiserror::Error;

use crate::arc_consistency::{establish_arc_consistency, ArcConsistencyFailure};
use crate::domains::{enforce_node_consistency, DomainStore};
use crate::grid_config::{Puzzle, SlotId, Variable};
use crate::word_list::{WordId, WordList};
use crate::MAX_SLOT_LENGTH;

/// A slot assignment made during the filling process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub slot_id: SlotId,
    pub word_id: WordId,
}

/// A partial mapping from slots to words, with at most one word per slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    word_ids: Vec<Option<WordId>>,
    assigned_count: usize,
}

impl Assignment {
    /// An empty assignment for a puzzle with `slot_count` slots.
    pub fn new(slot_count: usize) -> Assignment {
        Assignment { word_ids: vec![None; slot_count], assigned_count: 0 }
    }

    pub fn len(&self) -> usize {
        self.assigned_count
    }

    pub fn is_empty(&self) -> bool {
        self.assigned_count == 0
    }

    pub fn get(&self, slot_id: SlotId) -> Option<WordId> {
        self.word_ids.get(slot_id).copied().flatten()
    }

    pub fn is_assigned(&self, slot_id: SlotId) -> bool {
        self.get(slot_id).is_some()
    }

    /// Set the word for a slot, returning the word it replaced, if any.
    pub fn assign(&mut self, slot_id: SlotId, word_id: WordId) -> Option<WordId> {
        let previous = self.word_ids[slot_id].replace(word_id);
        if previous.is_none() {
            self.assigned_count += 1;
        }
        previous
    }

    /// Clear a slot, returning the word it held, if any.
    pub fn unassign(&mut self, slot_id: SlotId) -> Option<WordId> {
        let previous = self.word_ids[slot_id].take();
        if previous.is_some() {
            self.assigned_count -= 1;
        }
        previous
    }

    /// Every assigned slot, in slot id order.
    pub fn iter(&self) -> impl Iterator<Item = Choice> + '_ {
        self.word_ids.iter().enumerate().filter_map(|(slot_id, word_id)| {
            word_id.map(|word_id| Choice { slot_id, word_id })
        })
    }

    /// Does every slot in the puzzle have a word?
    pub fn is_complete(&self, puzzle: &Puzzle) -> bool {
        self.assigned_count == puzzle.slot_count()
    }

    /// Are the assigned words all distinct, of the right lengths, and in agreement wherever two
    /// assigned slots cross?
    pub fn is_consistent(&self, puzzle: &Puzzle, words: &WordList) -> bool {
        let mut used_word_ids = BitSet::with_capacity(words.len());

        for Choice { slot_id, word_id } in self.iter() {
            if !used_word_ids.insert(word_id) {
                return false;
            }

            if words.word(word_id).len() != puzzle.variable(slot_id).length {
                return false;
            }

            for &neighbor in puzzle.neighbors(slot_id) {
                if let Some(neighbor_word_id) = self.get(neighbor) {
                    let agrees =
                        crossing_agrees(puzzle, words, slot_id, word_id, neighbor, neighbor_word_id);
                    if !agrees {
                        return false;
                    }
                }
            }
        }

        true
    }

    /// Would this assignment stay consistent if we made the given choice? Assumes the assignment
    /// is consistent as it stands, so only the new word needs checking.
    fn is_consistent_with(&self, puzzle: &Puzzle, words: &WordList, choice: &Choice) -> bool {
        if words.word(choice.word_id).len() != puzzle.variable(choice.slot_id).length {
            return false;
        }

        let duplicate = self
            .iter()
            .any(|other| other.slot_id != choice.slot_id && other.word_id == choice.word_id);
        if duplicate {
            return false;
        }

        puzzle.neighbors(choice.slot_id).iter().all(|&neighbor| match self.get(neighbor) {
            Some(neighbor_word_id) => crossing_agrees(
                puzzle,
                words,
                choice.slot_id,
                choice.word_id,
                neighbor,
                neighbor_word_id,
            ),
            None => true,
        })
    }
}

/// Do these two words put the same letter in the cell shared by their slots? Slots that don't
/// cross always agree.
fn crossing_agrees(
    puzzle: &Puzzle,
    words: &WordList,
    x: SlotId,
    x_word_id: WordId,
    y: SlotId,
    y_word_id: WordId,
) -> bool {
    match puzzle.overlap(x, y) {
        None => true,
        Some(overlap) => {
            let x_glyph = words.word(x_word_id).glyph_at(overlap.first);
            let y_glyph = words.word(y_word_id).glyph_at(overlap.second);
            x_glyph.is_some() && x_glyph == y_glyph
        }
    }
}

/// Pick the unassigned slot with the fewest remaining words, preferring the one with the most
/// neighbors on a tie. Any remaining tie goes to the lowest slot id, but nothing should depend on
/// that.
pub fn select_unassigned_variable(
    puzzle: &Puzzle,
    domains: &DomainStore,
    assignment: &Assignment,
) -> Option<SlotId> {
    (0..puzzle.slot_count())
        .filter(|&slot_id| !assignment.is_assigned(slot_id))
        .min_by_key(|&slot_id| {
            (domains.option_count(slot_id), Reverse(puzzle.neighbors(slot_id).len()))
        })
}

/// Return the words in this slot's domain ordered by how many unassigned neighbors also have that
/// word in their domains, fewest first. Equal counts keep word id order.
pub fn order_domain_values(
    puzzle: &Puzzle,
    domains: &DomainStore,
    assignment: &Assignment,
    slot_id: SlotId,
) -> Vec<WordId> {
    let unassigned_neighbors: SmallVec<[SlotId; MAX_SLOT_LENGTH]> = puzzle
        .neighbors(slot_id)
        .iter()
        .copied()
        .filter(|&neighbor| !assignment.is_assigned(neighbor))
        .collect();

    let mut values: Vec<WordId> = domains.word_ids(slot_id).collect();
    values.sort_by_cached_key(|&word_id| {
        unassigned_neighbors
            .iter()
            .filter(|&&neighbor| domains.contains(neighbor, word_id))
            .count()
    });

    values
}

/// Statistics about the filling process.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    /// Slot selections made by the search.
    pub states: u64,
    /// Words withdrawn after the search below them failed.
    pub backtracks: u64,
    /// Arc revisions performed before the search started.
    pub revisions: u64,
    /// Options removed by node and arc consistency.
    pub eliminations: usize,
    pub duration: Duration,
}

/// The results of a successful fill.
#[derive(Debug, Clone)]
pub struct FillSuccess {
    pub statistics: Statistics,
    pub assignment: Assignment,
    /// The choices that make up the fill, in the order they were made.
    pub choices: Vec<Choice>,
}

impl FillSuccess {
    /// The fill as a map from each variable to its word.
    pub fn words_by_variable<'a>(
        &self,
        puzzle: &'a Puzzle,
        words: &'a WordList,
    ) -> HashMap<Variable, &'a str> {
        self.assignment
            .iter()
            .map(|Choice { slot_id, word_id }| {
                (*puzzle.variable(slot_id), words.word(word_id).string.as_str())
            })
            .collect()
    }
}

/// Why a grid couldn't be filled. Both are ordinary outcomes rather than faults.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillFailure {
    #[error("Slot {slot_id} has no options left after enforcing arc consistency")]
    Unsatisfiable { slot_id: SlotId },

    #[error("Exhausted every option without finding a fill")]
    SearchExhausted,
}

impl From<ArcConsistencyFailure> for FillFailure {
    fn from(failure: ArcConsistencyFailure) -> FillFailure {
        FillFailure::Unsatisfiable { slot_id: failure.slot_id }
    }
}

/// One level of the search: a slot and the words we're working through for it.
#[derive(Debug)]
struct Frame {
    slot_id: SlotId,
    values: Vec<WordId>,
    next_value_idx: usize,
}

/// Depth-first search for a complete, consistent assignment, starting from an empty one. The
/// domains are only read, so they should already be node- and arc-consistent.
///
/// # Panics
///
/// Panics if a domain holds a word whose length doesn't match its slot, since that means node
/// consistency was never enforced.
pub fn backtracking_search(
    puzzle: &Puzzle,
    words: &WordList,
    domains: &DomainStore,
) -> Result<FillSuccess, FillFailure> {
    let start = Instant::now();

    let mut statistics = Statistics::default();
    let mut assignment = Assignment::new(puzzle.slot_count());
    let mut choices: Vec<Choice> = Vec::with_capacity(puzzle.slot_count());
    let mut stack: Vec<Frame> = Vec::with_capacity(puzzle.slot_count());

    'slot_selection: while !assignment.is_complete(puzzle) {
        statistics.states += 1;

        let slot_id = select_unassigned_variable(puzzle, domains, &assignment)
            .expect("An incomplete assignment must have an unassigned slot");

        stack.push(Frame {
            slot_id,
            values: order_domain_values(puzzle, domains, &assignment, slot_id),
            next_value_idx: 0,
        });

        // Find the next usable word for the innermost frame, popping frames whose words have run
        // out. Each frame's slot is unassigned before its next word is tried.
        while let Some(frame) = stack.last_mut() {
            if assignment.unassign(frame.slot_id).is_some() {
                choices.pop();
                statistics.backtracks += 1;
            }

            while let Some(&word_id) = frame.values.get(frame.next_value_idx) {
                frame.next_value_idx += 1;

                assert_eq!(
                    words.word(word_id).len(),
                    puzzle.variable(frame.slot_id).length,
                    "Tried to assign {:?} to {:?}",
                    words.word(word_id).string,
                    puzzle.variable(frame.slot_id),
                );

                let choice = Choice { slot_id: frame.slot_id, word_id };
                if assignment.is_consistent_with(puzzle, words, &choice) {
                    assignment.assign(choice.slot_id, choice.word_id);
                    choices.push(choice);
                    continue 'slot_selection;
                }
            }

            stack.pop();
        }

        statistics.duration = start.elapsed();
        debug!("Search exhausted: {:?}", statistics);
        return Err(FillFailure::SearchExhausted);
    }

    statistics.duration = start.elapsed();
    debug!("Search found a fill: {:?}", statistics);

    Ok(FillSuccess { statistics, assignment, choices })
}

/// Search for a valid fill for the given grid: enforce node consistency, then arc consistency,
/// then search. If arc consistency empties any slot, we give up without searching.
pub fn find_fill(puzzle: &Puzzle, words: &WordList) -> Result<FillSuccess, FillFailure> {
    let start = Instant::now();

    let mut domains = DomainStore::initialize(puzzle, words);
    let node_eliminations = enforce_node_consistency(puzzle, words, &mut domains);
    let arc_consistency = establish_arc_consistency(puzzle, words, &mut domains, None)?;

    let mut result = backtracking_search(puzzle, words, &domains)?;

    result.statistics.revisions = arc_consistency.revisions;
    result.statistics.eliminations = node_eliminations + arc_consistency.eliminations;
    result.statistics.duration = start.elapsed();

    Ok(result)
}

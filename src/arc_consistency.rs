//! An implementation of the AC-3 algorithm for crossword slots. For our purposes, an arc `(x, y)`
//! is consistent when every word left in `x`'s domain has at least one word in `y`'s domain with
//! the same letter in their shared cell.
//!
//! We keep revising arcs until no more eliminations are possible, or until some slot runs out of
//! words entirely, in which case the grid can't be filled from the current domains.

use bit_set::BitSet;
use log::{debug, trace};
use std::collections::VecDeque;

use crate::domains::DomainStore;
use crate::grid_config::{Puzzle, SlotId};
use crate::word_list::{GlyphId, WordList};

/// An ordered pair of slots; revising it can only shrink the first slot's domain.
pub type SlotArc = (SlotId, SlotId);

/// Worklist of arcs still to be revised. An arc that's already waiting in the queue isn't added a
/// second time.
#[derive(Debug)]
struct ConsistencyQueue {
    queue: VecDeque<SlotArc>,
    pending: BitSet,
    slot_count: usize,
}

impl ConsistencyQueue {
    fn new(slot_count: usize) -> ConsistencyQueue {
        ConsistencyQueue {
            queue: VecDeque::new(),
            pending: BitSet::with_capacity(slot_count * slot_count),
            slot_count,
        }
    }

    fn with_initial_queue<Items>(slot_count: usize, items: Items) -> ConsistencyQueue
    where
        Items: IntoIterator<Item = SlotArc>,
    {
        let mut queue = ConsistencyQueue::new(slot_count);
        for arc in items {
            queue.enqueue(arc);
        }
        queue
    }

    fn key(&self, (x, y): SlotArc) -> usize {
        x * self.slot_count + y
    }

    fn enqueue(&mut self, arc: SlotArc) {
        if self.pending.insert(self.key(arc)) {
            self.queue.push_back(arc);
        }
    }

    fn pop_front(&mut self) -> Option<SlotArc> {
        let arc = self.queue.pop_front()?;
        let key = self.key(arc);
        self.pending.remove(key);
        Some(arc)
    }
}

/// Counters from a successful call to `establish_arc_consistency`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ArcConsistencySuccess {
    pub revisions: u64,
    pub eliminations: usize,
}

/// Returned when a slot's domain is emptied, meaning the grid has no fill under these domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArcConsistencyFailure {
    pub slot_id: SlotId,
}

pub type ArcConsistencyResult = Result<ArcConsistencySuccess, ArcConsistencyFailure>;

/// Remove the words from `x`'s domain that have no support in `y`'s domain, returning how many
/// were removed.
fn revise_impl(
    puzzle: &Puzzle,
    words: &WordList,
    domains: &mut DomainStore,
    x: SlotId,
    y: SlotId,
) -> usize {
    let Some(overlap) = puzzle.overlap(x, y) else {
        return 0;
    };

    // Which glyphs does `y` still offer in the shared cell? Words too short to reach the cell
    // don't offer anything.
    let supported_glyphs: BitSet = domains
        .word_ids(y)
        .filter_map(|word_id| words.word(word_id).glyph_at(overlap.second))
        .collect();

    domains.retain(x, |word_id| {
        words
            .word(word_id)
            .glyph_at(overlap.first)
            .map_or(false, |glyph: GlyphId| supported_glyphs.contains(glyph))
    })
}

/// Make `x` arc-consistent with `y`. Returns true if anything was removed from `x`'s domain; `y`'s
/// domain is never touched.
pub fn revise(
    puzzle: &Puzzle,
    words: &WordList,
    domains: &mut DomainStore,
    x: SlotId,
    y: SlotId,
) -> bool {
    revise_impl(puzzle, words, domains, x, y) > 0
}

/// Run AC-3 starting from the given arcs, or from every ordered pair of distinct slots if `arcs`
/// is `None`. Whenever revising `(x, y)` shrinks `x`, every other neighbor `z` of `x` gets `(z, x)`
/// re-queued, since `z` may have lost its support in `x`.
pub fn establish_arc_consistency(
    puzzle: &Puzzle,
    words: &WordList,
    domains: &mut DomainStore,
    arcs: Option<&[SlotArc]>,
) -> ArcConsistencyResult {
    let slot_count = puzzle.slot_count();

    let mut queue = match arcs {
        Some(arcs) => ConsistencyQueue::with_initial_queue(slot_count, arcs.iter().copied()),
        None => ConsistencyQueue::with_initial_queue(
            slot_count,
            (0..slot_count)
                .flat_map(|x| (0..slot_count).filter(move |&y| y != x).map(move |y| (x, y))),
        ),
    };

    let mut result = ArcConsistencySuccess::default();

    while let Some((x, y)) = queue.pop_front() {
        result.revisions += 1;

        let eliminated = revise_impl(puzzle, words, domains, x, y);
        if eliminated == 0 {
            continue;
        }

        result.eliminations += eliminated;
        trace!(
            "Revising slot {} against slot {} removed {} options ({} left)",
            x,
            y,
            eliminated,
            domains.option_count(x)
        );

        if domains.is_empty(x) {
            debug!(
                "Arc consistency emptied slot {} ({:?}) after {} revisions",
                x,
                puzzle.variable(x),
                result.revisions
            );
            return Err(ArcConsistencyFailure { slot_id: x });
        }

        for &z in puzzle.neighbors(x) {
            if z != y {
                queue.enqueue((z, x));
            }
        }
    }

    debug!(
        "Arc consistency reached a fixed point after {} revisions, removing {} options",
        result.revisions, result.eliminations
    );

    Ok(result)
}

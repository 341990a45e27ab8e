//! Per-slot candidate word sets, and the unary (length) filtering pass over them.

use bit_set::BitSet;
use log::debug;

use crate::grid_config::{Puzzle, SlotId};
use crate::word_list::{WordId, WordList};

/// Mapping from each slot to the set of words it could still take. Domains only ever shrink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainStore {
    domains: Vec<BitSet>,
}

impl DomainStore {
    /// Give every slot its own copy of the full word list.
    pub fn initialize(puzzle: &Puzzle, words: &WordList) -> DomainStore {
        let full_domain: BitSet = (0..words.len()).collect();

        DomainStore {
            domains: (0..puzzle.slot_count()).map(|_| full_domain.clone()).collect(),
        }
    }

    pub fn slot_count(&self) -> usize {
        self.domains.len()
    }

    pub fn domain(&self, slot_id: SlotId) -> &BitSet {
        &self.domains[slot_id]
    }

    /// How many words remain for this slot?
    pub fn option_count(&self, slot_id: SlotId) -> usize {
        self.domains[slot_id].len()
    }

    pub fn is_empty(&self, slot_id: SlotId) -> bool {
        self.domains[slot_id].is_empty()
    }

    pub fn contains(&self, slot_id: SlotId, word_id: WordId) -> bool {
        self.domains[slot_id].contains(word_id)
    }

    /// Remove a word from a slot's domain, returning whether it was present.
    pub fn remove(&mut self, slot_id: SlotId, word_id: WordId) -> bool {
        self.domains[slot_id].remove(word_id)
    }

    /// Remove every word for which `keep` returns false, returning how many were removed.
    pub fn retain<F>(&mut self, slot_id: SlotId, mut keep: F) -> usize
    where
        F: FnMut(WordId) -> bool,
    {
        let domain = &mut self.domains[slot_id];
        let eliminated: Vec<WordId> = domain.iter().filter(|&word_id| !keep(word_id)).collect();

        for &word_id in &eliminated {
            domain.remove(word_id);
        }

        eliminated.len()
    }

    /// Word ids in this slot's domain, in ascending order.
    pub fn word_ids(&self, slot_id: SlotId) -> impl Iterator<Item = WordId> + '_ {
        self.domains[slot_id].iter()
    }

    /// The strings in this slot's domain, in ascending word id order.
    pub fn words<'a>(
        &'a self,
        slot_id: SlotId,
        words: &'a WordList,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.word_ids(slot_id).map(move |word_id| words.word(word_id).string.as_str())
    }
}

/// Remove from every domain the words whose length doesn't match the slot. Returns the number of
/// words removed.
pub fn enforce_node_consistency(
    puzzle: &Puzzle,
    words: &WordList,
    domains: &mut DomainStore,
) -> usize {
    let mut eliminated = 0;

    for slot_config in puzzle.slot_configs() {
        let length = slot_config.variable.length;
        eliminated += domains.retain(slot_config.id, |word_id| words.word(word_id).len() == length);
    }

    debug!(
        "Node consistency removed {} options across {} slots",
        eliminated,
        puzzle.slot_count()
    );

    eliminated
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::domains::{enforce_node_consistency, DomainStore};
    use crate::grid_config::Direction::{Across, Down};
    use crate::grid_config::{Puzzle, Variable};
    use crate::word_list::WordList;

    #[test]
    fn test_initialize_copies_full_corpus_per_slot() {
        let puzzle = Puzzle::from_variables(
            3,
            3,
            vec![Variable::new(0, 0, 3, Across), Variable::new(0, 0, 3, Down)],
        )
        .unwrap();
        let words = WordList::new(["CAT", "DOG", "HORSE"]);

        let mut domains = DomainStore::initialize(&puzzle, &words);
        assert_eq!(domains.slot_count(), 2);
        assert_eq!(domains.option_count(0), 3);
        assert_eq!(domains.domain(0), domains.domain(1));

        assert!(domains.remove(0, words.id_of("DOG").unwrap()));
        assert_eq!(domains.option_count(0), 2);
        assert_eq!(domains.option_count(1), 3);
        assert!(domains.contains(1, words.id_of("DOG").unwrap()));
    }

    #[test]
    fn test_isolated_slot_keeps_only_matching_length() {
        let puzzle = Puzzle::from_variables(1, 4, vec![Variable::new(0, 0, 4, Across)]).unwrap();
        let words = WordList::new(["AAAA", "BB"]);

        let mut domains = DomainStore::initialize(&puzzle, &words);
        assert_eq!(enforce_node_consistency(&puzzle, &words, &mut domains), 1);

        let remaining: Vec<&str> = domains.words(0, &words).collect();
        assert_eq!(remaining, vec!["AAAA"]);
    }

    #[test]
    fn test_retain_reports_eliminations() {
        let puzzle = Puzzle::from_variables(1, 3, vec![Variable::new(0, 0, 3, Across)]).unwrap();
        let words = WordList::new(["ABC", "ABD", "XYZ"]);

        let mut domains = DomainStore::initialize(&puzzle, &words);
        let removed = domains.retain(0, |word_id| words.word(word_id).string.starts_with('A'));

        assert_eq!(removed, 1);
        assert_eq!(domains.words(0, &words).collect::<Vec<_>>(), vec!["ABC", "ABD"]);
    }

    proptest! {
        #[test]
        fn test_node_consistency_filters_by_length(entries in prop::collection::vec("[A-D]{1,6}", 0..40)) {
            let puzzle = Puzzle::from_template_str(
                "
                ____#
                _#__#
                _____
                ",
            ).unwrap();
            let words = WordList::new(&entries);

            let mut domains = DomainStore::initialize(&puzzle, &words);
            enforce_node_consistency(&puzzle, &words, &mut domains);

            for slot_config in puzzle.slot_configs() {
                for word_id in domains.word_ids(slot_config.id) {
                    prop_assert_eq!(words.word(word_id).len(), slot_config.variable.length);
                }

                let expected = words
                    .iter()
                    .filter(|(_, word)| word.len() == slot_config.variable.length)
                    .count();
                prop_assert_eq!(domains.option_count(slot_config.id), expected);
            }

            let before = domains.clone();
            prop_assert_eq!(enforce_node_consistency(&puzzle, &words, &mut domains), 0);
            prop_assert_eq!(domains, before);
        }
    }
}

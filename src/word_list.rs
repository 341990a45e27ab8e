//! The word corpus every slot draws its candidates from.

use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};

use crate::MAX_SLOT_LENGTH;

/// An identifier for a given letter or whatever, based on its index in the word list's `glyphs`
/// field.
pub type GlyphId = usize;

/// An identifier for a given word, based on its index in the word list. Equal strings always share
/// an id, so distinct ids mean distinct words.
pub type WordId = usize;

/// A word that can be chosen for a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub string: String,
    pub glyphs: SmallVec<[GlyphId; MAX_SLOT_LENGTH]>,
}

impl Word {
    /// Length in chars, which is what gets compared against slot lengths.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// The glyph at the given cell index, or `None` if the word is too short to reach it.
    pub fn glyph_at(&self, cell_idx: usize) -> Option<GlyphId> {
        self.glyphs.get(cell_idx).copied()
    }
}

/// An immutable, deduplicated list of uppercase words.
pub struct WordList {
    glyphs: Vec<char>,
    words: Vec<Word>,
    word_ids_by_string: HashMap<String, WordId>,
}

impl Debug for WordList {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordList")
            .field("glyphs", &self.glyphs)
            .field("words", &(["(", &self.words.len().to_string(), " entries)"].join("")))
            .finish()
    }
}

impl WordList {
    /// Build a word list from the given strings. Each one is trimmed and uppercased; blank entries
    /// are skipped and repeats keep the position of their first occurrence.
    pub fn new<I, S>(entries: I) -> WordList
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut glyphs: Vec<char> = vec![];
        let mut glyph_ids_by_char: HashMap<char, GlyphId> = HashMap::new();
        let mut words: Vec<Word> = vec![];
        let mut word_ids_by_string: HashMap<String, WordId> = HashMap::new();

        for entry in entries {
            let string = entry.as_ref().trim().to_uppercase();
            if string.is_empty() || word_ids_by_string.contains_key(&string) {
                continue;
            }

            let word_glyphs = string
                .chars()
                .map(|c| {
                    *glyph_ids_by_char.entry(c).or_insert_with(|| {
                        glyphs.push(c);
                        glyphs.len() - 1
                    })
                })
                .collect();

            word_ids_by_string.insert(string.clone(), words.len());
            words.push(Word { string, glyphs: word_glyphs });
        }

        WordList { glyphs, words, word_ids_by_string }
    }

    /// Parse a word list with one word per line.
    pub fn parse(contents: &str) -> WordList {
        WordList::new(contents.lines())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn word(&self, word_id: WordId) -> &Word {
        &self.words[word_id]
    }

    pub fn glyph(&self, glyph_id: GlyphId) -> char {
        self.glyphs[glyph_id]
    }

    /// Look up a word's id, normalizing it the same way `new` does.
    pub fn id_of(&self, string: &str) -> Option<WordId> {
        self.word_ids_by_string.get(&string.trim().to_uppercase()).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (WordId, &Word)> {
        self.words.iter().enumerate()
    }
}

#[cfg(test)]
mod tests {
    use crate::word_list::WordList;

    #[test]
    fn test_parse_normalizes_and_dedupes() {
        let words = WordList::parse("cat\n  Dog \n\nCAT\ncar\n");

        assert_eq!(words.len(), 3);
        let strings: Vec<&str> = words.iter().map(|(_, word)| word.string.as_str()).collect();
        assert_eq!(strings, vec!["CAT", "DOG", "CAR"]);
        assert_eq!(words.id_of("cat"), Some(0));
        assert_eq!(words.id_of("car"), Some(2));
        assert_eq!(words.id_of("cow"), None);
    }

    #[test]
    fn test_glyphs_are_shared_between_words() {
        let words = WordList::new(["CAT", "ACT"]);

        let cat = words.word(0);
        let act = words.word(1);
        assert_eq!(cat.glyphs[0], act.glyphs[1]);
        assert_eq!(cat.glyphs[1], act.glyphs[0]);
        assert_eq!(words.glyph(cat.glyphs[2]), 'T');
        assert_eq!(cat.glyph_at(3), None);
    }

    #[test]
    fn test_length_counts_chars() {
        let words = WordList::new(["ÉTÉ"]);

        assert_eq!(words.word(0).len(), 3);
    }
}

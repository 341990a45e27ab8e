use crate::backtracking_search::{Assignment, Choice};
use crate::grid_config::Puzzle;
use crate::word_list::WordList;

/// The glyph drawn for blocked cells.
pub const BLOCK: char = '█';

/// Lay out an assignment's letters cell by cell. Cells no assigned word passes through are `None`.
pub fn letter_grid(
    puzzle: &Puzzle,
    words: &WordList,
    assignment: &Assignment,
) -> Vec<Vec<Option<char>>> {
    let mut letters = vec![vec![None; puzzle.width()]; puzzle.height()];

    for Choice { slot_id, word_id } in assignment.iter() {
        let word = words.word(word_id);

        for ((row, col), &glyph) in puzzle.variable(slot_id).cells().zip(&word.glyphs) {
            letters[row][col] = Some(words.glyph(glyph));
        }
    }

    letters
}

/// Turn the given puzzle and assignment into a rendered string, with blocks drawn as `BLOCK` and
/// unfilled cells left blank.
pub fn render_grid(puzzle: &Puzzle, words: &WordList, assignment: &Assignment) -> String {
    let letters = letter_grid(puzzle, words, assignment);

    letters
        .iter()
        .enumerate()
        .map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .map(|(col, letter)| {
                    if puzzle.is_open(row, col) {
                        letter.unwrap_or(' ')
                    } else {
                        BLOCK
                    }
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use crate::backtracking_search::{find_fill, Assignment};
    use crate::grid_config::Direction::{Across, Down};
    use crate::grid_config::{Puzzle, Variable};
    use crate::render::{letter_grid, render_grid};
    use crate::word_list::WordList;

    #[test]
    fn test_render_partial_assignment() {
        let puzzle = Puzzle::from_template_str(
            "
            ___
            _#_
            ___
            ",
        )
        .unwrap();
        let words = WordList::new(["cat", "cot"]);

        let mut assignment = Assignment::new(puzzle.slot_count());
        assignment.assign(puzzle.slot_id(&Variable::new(0, 0, 3, Across)).unwrap(), 0);
        assignment.assign(puzzle.slot_id(&Variable::new(0, 0, 3, Down)).unwrap(), 1);

        assert_eq!(render_grid(&puzzle, &words, &assignment), "CAT\nO█ \nT  ");
    }

    #[test]
    fn test_letter_grid_marks_unfilled_cells() {
        let puzzle = Puzzle::from_template_str("__\n__").unwrap();
        let words = WordList::new(["AB"]);

        let mut assignment = Assignment::new(puzzle.slot_count());
        assignment.assign(puzzle.slot_id(&Variable::new(1, 0, 2, Across)).unwrap(), 0);

        assert_eq!(
            letter_grid(&puzzle, &words, &assignment),
            vec![vec![None, None], vec![Some('A'), Some('B')]]
        );
    }

    #[test]
    fn test_render_empty_assignment() {
        let puzzle = Puzzle::from_template_str("_#\n__").unwrap();
        let words = WordList::new(Vec::<String>::new());

        let assignment = Assignment::new(puzzle.slot_count());
        assert_eq!(render_grid(&puzzle, &words, &assignment), " █\n  ");
    }

    #[test]
    fn test_render_bundled_structure_fill() {
        let puzzle = Puzzle::from_template_str(include_str!("../data/structure0.txt")).unwrap();
        let words = WordList::parse(include_str!("../data/words0.txt"));

        let result = find_fill(&puzzle, &words).expect("Failed to find a fill");

        assert_eq!(
            render_grid(&puzzle, &words, &result.assignment),
            "█SIX█\n█E██F\n█V██I\n█E██V\n█NINE"
        );
    }
}

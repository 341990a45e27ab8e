use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use crossword_csp::{find_fill, render_grid, Puzzle, WordList};
use env_logger::Env;
use log::info;
use std::fs;
use std::path::PathBuf;

/// Fill a crossword grid from a word list.
#[derive(Parser, Debug)]
#[command(name = "crossword-csp", version)]
struct Cli {
    /// Grid structure file, with `_` for each fillable cell and any other character for a block
    structure: PathBuf,

    /// Word list, one word per line
    words: PathBuf,

    /// Also write the filled grid to this file
    output: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    let template = fs::read_to_string(&cli.structure)
        .with_context(|| format!("Failed to read structure file {}", cli.structure.display()))?;
    let puzzle = Puzzle::from_template_str(&template)
        .with_context(|| format!("Invalid structure file {}", cli.structure.display()))?;

    let word_list = fs::read_to_string(&cli.words)
        .with_context(|| format!("Failed to read word list {}", cli.words.display()))?;
    let words = WordList::parse(&word_list);

    info!(
        "Loaded a {}x{} grid with {} slots and {} words",
        puzzle.height(),
        puzzle.width(),
        puzzle.slot_count(),
        words.len()
    );

    match find_fill(&puzzle, &words) {
        Ok(result) => {
            info!("{:?}", result.statistics);

            let display_grid = render_grid(&puzzle, &words, &result.assignment);
            println!("{}", display_grid);

            if let Some(output) = &cli.output {
                fs::write(output, &display_grid)
                    .with_context(|| format!("Unable to write {}", output.display()))?;
                info!("Wrote grid to {}", output.display());
            }
        }
        Err(failure) => {
            info!("{}", failure);
            println!("No solution.");
        }
    }

    Ok(())
}

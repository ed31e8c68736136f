use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use touchword_cli::{compile_wordlist, run_suggest};
use touchword_core::TrieLexicon;

#[derive(Parser)]
#[command(name = "twtool", about = "Touchword suggestion diagnostics")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a TSV word list into a binary lexicon
    Compile {
        /// Path to the word list (word<TAB>probability per line)
        wordlist: PathBuf,
        /// Path to the output lexicon file
        output: PathBuf,
    },

    /// Print ranked suggestions for a typed string
    Suggest {
        /// Path to the compiled lexicon file
        lexicon: PathBuf,
        /// The typed string; touches are synthesized at QWERTY key centers
        typed: String,
        /// Previous word, for bigram context
        #[arg(long)]
        prev: Option<String>,
        /// Number of suggestions to show
        #[arg(short, long, default_value = "10")]
        n: usize,
    },

    /// Print word and node counts for a compiled lexicon
    Stats {
        /// Path to the compiled lexicon file
        lexicon: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Compile { wordlist, output } => {
            let text = std::fs::read_to_string(&wordlist)
                .with_context(|| format!("reading {}", wordlist.display()))?;
            let lexicon = compile_wordlist(&text)?;
            lexicon
                .save(&output)
                .with_context(|| format!("writing {}", output.display()))?;
            let (words, nodes) = lexicon.stats();
            println!("compiled {} words ({} trie nodes)", words, nodes);
        }
        Command::Suggest {
            lexicon,
            typed,
            prev,
            n,
        } => {
            let lexicon = TrieLexicon::load(&lexicon)
                .with_context(|| format!("loading {}", lexicon.display()))?;
            let prev_pos = match prev {
                Some(word) => match lexicon.position_of(&word) {
                    Some(pos) => Some(pos),
                    None => bail!("previous word {word:?} is not in the lexicon"),
                },
                None => None,
            };
            let results = run_suggest(&lexicon, &typed, prev_pos);
            if results.is_empty() {
                println!("no suggestions");
            }
            for (rank, s) in results.iter().take(n).enumerate() {
                println!(
                    "{:2}. {:<24} score={:<9} kind={:?} edits={} proximity={}",
                    rank + 1,
                    s.text,
                    s.score,
                    s.kind,
                    s.edit_correction_count,
                    s.proximity_correction_count,
                );
            }
        }
        Command::Stats { lexicon } => {
            let lexicon = TrieLexicon::load(&lexicon)
                .with_context(|| format!("loading {}", lexicon.display()))?;
            let (words, nodes) = lexicon.stats();
            println!("words: {words}");
            println!("nodes: {nodes}");
        }
    }
    Ok(())
}

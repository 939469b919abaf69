//! Offline frequency-table generator.
//!
//! Reads the full corpus (a JSON array of `{surah, ayah, text}` records),
//! tokenizes every verse with the shared splitting rule, normalizes every
//! token and writes the occurrence counts as JSON. Run once per corpus
//! revision; the engine only ever reads the generated artifact.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use mushaf_lexicon::FrequencyTable;

#[derive(Parser)]
#[command(name = "freqgen", about = "Generate the word-frequency table from a corpus dump")]
struct Args {
    /// Corpus JSON file (array of verse records)
    corpus: PathBuf,

    /// Output path for the generated table
    #[arg(short, long, default_value = "frequency.json")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let corpus = fs::read_to_string(&args.corpus)
        .with_context(|| format!("reading corpus {}", args.corpus.display()))?;

    let (table, stats) = FrequencyTable::build_from_corpus(&corpus)?;

    tracing::info!(
        "Counted {} tokens across {} verses ({} distinct forms)",
        stats.tokens,
        stats.verses,
        table.len()
    );
    if stats.skipped > 0 {
        tracing::warn!("Skipped {} malformed corpus records", stats.skipped);
    }

    fs::write(&args.output, table.to_json()?)
        .with_context(|| format!("writing {}", args.output.display()))?;
    tracing::info!("Wrote {}", args.output.display());

    Ok(())
}

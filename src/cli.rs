//! # Command line interface for `hapcousins`
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use crate::index::DataMode;
use crate::matrix::MAX_WORD_SIZE;

#[derive(Parser)]
#[command(
    name = "hapcousins",
    author,
    version,
    about = "Windowed closest-cousin search over bit-packed haplotypes",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Report the top-k closest cousins of every haplotype, per genomic window
    Search(SearchArgs),
    /// Print bit layouts, hash contents, or the word agreement of a haplotype pair
    Inspect(InspectArgs),
}

#[derive(Args)]
pub struct InputArgs {
    /// Input file root; `<root>.sample[s]`, `<root>.map[.gz]`, and `<root>.hap[s][.gz]` must exist
    #[arg(short, long)]
    pub input: String,

    /// Genetic map file. Defaults to `<root>.map[.gz]`
    #[arg(long)]
    pub map: Option<String>,

    /// Number of sites packed into each word
    #[arg(long, default_value_t = 64, value_parser = word_size_in_range)]
    pub word_size: usize,

    /// Whether the panel is 'sequence' or 'array' data. Stored as a hint, does not change behavior
    #[arg(long, default_value = "sequence", value_parser = parse_mode)]
    pub mode: DataMode,
}

#[derive(Args)]
pub struct SearchArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Number of cousins to report per window
    #[arg(short, long, default_value_t = 8)]
    pub k: usize,

    /// Number of mismatching words tolerated inside a match stretch
    #[arg(short, long, default_value_t = 0)]
    pub tolerance: usize,

    /// Minimum genetic span of a window in centimorgans; 0 or less puts every word in its own window
    #[arg(short, long, default_value_t = 0.0)]
    pub window_size: f64,

    /// Write results as JSON instead of TSV
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct InspectArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Print the site bits and packed words of this haplotype (repeatable)
    #[arg(long)]
    pub hap: Vec<usize>,

    /// Register every haplotype and print the per-column hash buckets
    #[arg(long)]
    pub hashes: bool,

    /// Print the word agreement diagram for a pair of haplotypes
    #[arg(long, num_args = 2, value_names = ["HAP_A", "HAP_B"])]
    pub diagram: Option<Vec<usize>>,
}

fn word_size_in_range(s: &str) -> Result<usize> {
    let word_size = s
        .parse()
        .context("Could not parse value passed to --word-size to integer")?;
    if !(1..=MAX_WORD_SIZE).contains(&word_size) {
        bail!("--word-size must be between 1 and {MAX_WORD_SIZE}");
    }
    Ok(word_size)
}

fn parse_mode(s: &str) -> Result<DataMode> {
    s.parse()
}

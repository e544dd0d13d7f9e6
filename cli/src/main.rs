use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use sparsemem::{
    Index, ReferenceIndex, SearchParams, find_mems,
    io::{SequenceReader, read_fasta, read_suffix_array, write_suffix_array},
    sais,
};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "sparsemem")]
#[command(about = "Sparse suffix-array MEM finder for genomic references")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the full suffix array of a reference and write it to disk
    Index {
        /// Reference sequence (FASTA)
        reference: PathBuf,

        /// Output path for the binary suffix array
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Find all maximal exact matches of each query against a reference
    Find {
        /// Reference sequence (FASTA)
        reference: PathBuf,

        /// Query sequences (FASTA or FASTQ)
        queries: PathBuf,

        /// Sparsification factor
        #[arg(short = 'k', long, default_value_t = 1)]
        factor: i64,

        /// Minimum MEM length to report
        #[arg(short = 'l', long, default_value_t = 20)]
        min_len: i64,

        /// Precomputed suffix array (skips construction)
        #[arg(long)]
        sa: Option<PathBuf>,

        /// Cap on the number of worker threads
        #[arg(long)]
        threads: Option<usize>,
    },
    /// Verify a suffix array file against its reference, suffix by suffix
    Check {
        /// Reference sequence (FASTA)
        reference: PathBuf,

        /// Suffix array to verify
        sa: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Commands::Index { reference, output } => index(&reference, &output),
        Commands::Find { reference, queries, factor, min_len, sa, threads } => {
            find(&reference, &queries, factor, min_len, sa.as_deref(), threads)
        }
        Commands::Check { reference, sa } => check(&reference, &sa),
    }
}

/// The terminator-appended reference widened to index symbols.
fn symbols(text: &[u8]) -> Vec<Index> {
    let mut symbols: Vec<Index> = text.iter().map(|&b| b as Index).collect();
    symbols.push(0);
    symbols
}

fn index(reference: &std::path::Path, output: &std::path::Path) -> anyhow::Result<()> {
    let text = read_fasta(reference).context("reading reference")?;
    info!(len = text.len(), "reference loaded");

    let sa = sais::suffix_array(&symbols(&text), sparsemem::index::ALPHABET)
        .context("building suffix array")?;
    write_suffix_array(output, &sa).context("writing suffix array")?;
    info!(entries = sa.len(), output = %output.display(), "suffix array written");
    Ok(())
}

fn find(
    reference: &std::path::Path,
    queries: &std::path::Path,
    factor: i64,
    min_len: i64,
    sa: Option<&std::path::Path>,
    threads: Option<usize>,
) -> anyhow::Result<()> {
    let text = read_fasta(reference).context("reading reference")?;
    let index = match sa {
        Some(path) => {
            let sa = read_suffix_array(path).context("reading suffix array")?;
            ReferenceIndex::with_suffix_array(&text, sa, factor)
        }
        None => ReferenceIndex::new(&text, factor),
    }
    .context("building index")?;
    info!(len = index.len(), factor, "index ready");

    let params = SearchParams::with_threads(min_len, threads).context("search parameters")?;
    let mut reader = SequenceReader::open(queries).context("opening queries")?;
    let mut record = 0usize;
    let mut incomplete = 0usize;

    while let Some(query) = reader.next_sequence().context("reading query")? {
        record += 1;
        if query.is_empty() {
            warn!(record, "skipping empty query record");
            continue;
        }
        let start = std::time::Instant::now();
        let result = find_mems(&index, &query, &params)
            .with_context(|| format!("searching query record {record}"))?;
        info!(record, mems = result.mems.len(), elapsed = ?start.elapsed(), "query searched");
        if !result.complete {
            incomplete += 1;
        }
        println!("# record {record}");
        for mem in &result.mems {
            println!("{}\t{}\t{}", mem.length, mem.query_pos, mem.ref_pos);
        }
    }

    if incomplete > 0 {
        bail!("{incomplete} of {record} query records returned partial results");
    }
    Ok(())
}

fn check(reference: &std::path::Path, sa_path: &std::path::Path) -> anyhow::Result<()> {
    let text = read_fasta(reference).context("reading reference")?;
    let seq = symbols(&text);
    let sa = read_suffix_array(sa_path).context("reading suffix array")?;

    if sa.len() != seq.len() {
        bail!("suffix array has {} entries, sequence has {}", sa.len(), seq.len());
    }
    let mut seen = vec![false; sa.len()];
    for &p in &sa {
        if p < 0 || p as usize >= seen.len() || seen[p as usize] {
            bail!("suffix array is not a permutation of sequence positions");
        }
        seen[p as usize] = true;
    }

    let mut violations = 0usize;
    for pair in sa.windows(2) {
        let (a, b) = (&seq[pair[0] as usize..], &seq[pair[1] as usize..]);
        if a >= b {
            violations += 1;
            warn!(first = pair[0], second = pair[1], "adjacent suffixes out of order");
        }
    }

    if violations > 0 {
        bail!("{violations} adjacent suffix pairs out of order");
    }
    info!(entries = sa.len(), "suffix array verified");
    Ok(())
}

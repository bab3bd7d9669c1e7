use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Args;

use crate::cli::OutputFormat;
use crate::core::config::{AlignConfig, DEFAULT_AMBIGUOUS, DEFAULT_MIN_LENGTH};
use crate::pipeline::aligner::{ExternalAligner, DEFAULT_ALIGNER};
use crate::pipeline::runner::{IncrementalAligner, RunSummary};

#[derive(Args)]
pub struct AlignArgs {
    /// FASTA file with new sequences (plain, gzip or xz)
    #[arg(required = true)]
    pub input: PathBuf,

    /// Reference sequence passed to the aligner
    #[arg(short, long, required = true)]
    pub reference: PathBuf,

    /// Existing alignment file whose sequences are not aligned again (repeatable)
    #[arg(short = 'a', long = "alignment")]
    pub alignments: Vec<PathBuf>,

    /// Output alignment [default: <workdir>/incremental.<timestamp>.aln.xz]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Number of chunks aligned concurrently [default: available CPUs]
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub threads: Option<u32>,

    /// Sequences with this many sites or fewer are skipped
    #[arg(short, long, default_value_t = DEFAULT_MIN_LENGTH)]
    pub length: usize,

    /// Maximum proportion of ambiguous sites (N); values outside (0, 0.9] fall back to 0.1
    #[arg(long, default_value_t = DEFAULT_AMBIGUOUS)]
    pub ambiguous: f64,

    /// Directory for temporary chunk files and the default output
    #[arg(long, default_value = ".")]
    pub workdir: PathBuf,

    /// Alignment executable, invoked as `<aligner> -a <ambiguous> -r <reference> <chunk>`
    #[arg(long, default_value = DEFAULT_ALIGNER)]
    pub aligner: PathBuf,

    /// Kill the aligner if a single chunk takes longer than this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

/// Execute align subcommand
///
/// # Errors
///
/// Returns an error if an input cannot be read, the aligner fails, or the
/// output cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: AlignArgs, format: OutputFormat) -> anyhow::Result<()> {
    anyhow::ensure!(
        args.workdir.is_dir(),
        "Working directory {} does not exist",
        args.workdir.display()
    );

    let timeout = args.timeout.map(Duration::from_secs);
    let mut config = AlignConfig::new(&args.reference)
        .with_ambiguous(args.ambiguous)
        .with_min_length(args.length)
        .with_workdir(&args.workdir)
        .with_timeout(timeout);
    if let Some(threads) = args.threads {
        config = config.with_workers(threads as usize);
    }
    if let Some(output) = &args.output {
        config = config.with_output(output);
    }

    let aligner = ExternalAligner::new(&args.aligner).with_timeout(config.timeout);
    let runner = IncrementalAligner::new(config, aligner);

    let summary = runner
        .run(&args.input, &args.alignments)
        .with_context(|| format!("Incremental alignment of {} failed", args.input.display()))?;

    match format {
        OutputFormat::Text => print_text_summary(&summary),
        OutputFormat::Json => print_json_summary(&summary)?,
    }

    Ok(())
}

fn print_text_summary(summary: &RunSummary) {
    println!("Known sequences:      {}", summary.n_known);
    println!("Already aligned:      {}", summary.n_already_aligned);
    println!("Too short:            {}", summary.n_short);
    println!("Candidates:           {}", summary.n_candidates);
    println!("Chunks:               {}", summary.n_chunks);
    println!("Aligned:              {}", summary.n_aligned);
    match &summary.output {
        Some(path) => println!("Output:               {}", path.display()),
        None => println!("Output:               (none)"),
    }
}

fn print_json_summary(summary: &RunSummary) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(summary)?);
    Ok(())
}

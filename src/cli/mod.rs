//! Command-line interface for incr-aligner.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **align**: Align the sequences of a FASTA file that are not yet in any
//!   existing alignment
//!
//! ## Usage
//!
//! ```text
//! # Align everything new in today's submission against the reference
//! incr-aligner align sequences.fas.xz -r MN908947.fas -a previous.aln.xz -t 16
//!
//! # Several previous alignments, custom output, JSON summary for scripting
//! incr-aligner --format json align new.fas.gz -r ref.fas \
//!     -a batch1.aln.xz -a batch2.aln.xz -o batch3.aln.xz
//! ```

use clap::{Parser, Subcommand};

pub mod align;

#[derive(Parser)]
#[command(name = "incr-aligner")]
#[command(version)]
#[command(about = "Incrementally align new sequences against a reference")]
#[command(
    long_about = "incr-aligner aligns only the sequences of a FASTA file that are not already present in existing alignment files.\n\nNew sequences longer than a minimum length are split into chunks and aligned concurrently by an external aligner (uvaialign by default). The per-chunk results are merged into a single output alignment."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only report warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format for the run summary
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Align sequences not present in existing alignments
    Align(align::AlignArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

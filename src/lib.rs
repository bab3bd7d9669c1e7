//! # incr-aligner
//!
//! Incremental alignment of new genomic sequences against a reference.
//!
//! Sequencing projects keep submitting new genomes, and realigning the whole
//! collection every time is wasteful. `incr-aligner` aligns only the
//! sequences that are not already present in previous alignment files, and
//! leaves merging the old and new alignments to the caller.
//!
//! The alignment itself is done by an external tool (`uvaialign` by default).
//! This crate decides what to align, splits the work into chunks, runs the
//! tool on each chunk concurrently and merges the results.
//!
//! ## Features
//!
//! - **Incremental**: sequences already present in any given alignment are skipped
//! - **Length filter**: sequences at or below a minimum length are skipped and counted
//! - **Parallel**: candidates are split into contiguous chunks aligned concurrently
//! - **Fail-safe**: the first aligner failure cancels pending chunks and every
//!   temporary file is removed, whatever the outcome
//! - **Compressed I/O**: gzip, xz and plain FASTA are read transparently
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::{Path, PathBuf};
//! use incr_aligner::{AlignConfig, ExternalAligner, IncrementalAligner};
//!
//! let config = AlignConfig::new("MN908947.fas")
//!     .with_workers(8)
//!     .with_min_length(20_000);
//! let runner = IncrementalAligner::new(config, ExternalAligner::default());
//!
//! let summary = runner
//!     .run(Path::new("new.fas.xz"), &[PathBuf::from("previous.aln.xz")])
//!     .unwrap();
//! println!("aligned {} new sequences", summary.n_aligned);
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Sequence records and run configuration
//! - [`parsing`]: Compressed FASTA reading and writing
//! - [`pipeline`]: Candidate selection, chunking, parallel alignment and merging
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod core;
pub mod parsing;
pub mod pipeline;
pub mod utils;

// Re-export commonly used types for convenience
pub use core::config::AlignConfig;
pub use core::record::SequenceRecord;
pub use pipeline::aligner::{Aligner, ExternalAligner, ToolError};
pub use pipeline::runner::{IncrementalAligner, RunSummary};
pub use pipeline::PipelineError;

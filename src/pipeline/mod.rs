//! The incremental alignment pipeline.
//!
//! Stages, in order:
//!
//! 1. [`headers`]: collect identifiers already present in existing alignments
//! 2. [`candidates`]: keep new sequences above the length threshold
//! 3. [`chunking`]: split candidates into per-worker temporary files
//! 4. [`pool`]: run the [`aligner`] on every chunk concurrently
//! 5. [`merge`]: concatenate per-chunk alignments into the output file
//!
//! [`runner::IncrementalAligner`] drives all five.

use thiserror::Error;

use crate::parsing::fasta::ParseError;

pub mod aligner;
pub mod candidates;
pub mod chunking;
pub mod headers;
pub mod merge;
pub mod pool;
pub mod runner;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Tool(#[from] aligner::ToolError),

    #[error("Failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

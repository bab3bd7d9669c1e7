use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::config::AlignConfig;
use crate::pipeline::aligner::Aligner;
use crate::pipeline::candidates::select_candidates;
use crate::pipeline::chunking::{write_chunks, RandomSuffix, SuffixSource};
use crate::pipeline::headers::collect_aligned_ids;
use crate::pipeline::merge::merge_chunks;
use crate::pipeline::pool::align_chunks;
use crate::pipeline::PipelineError;

/// What an incremental run did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Distinct identifiers found in the existing alignments
    pub n_known: usize,

    /// Input sequences skipped because they were already aligned
    pub n_already_aligned: usize,

    /// Input sequences at or below the length threshold
    pub n_short: usize,

    /// Sequences handed to the aligner
    pub n_candidates: usize,

    /// Number of chunks aligned concurrently
    pub n_chunks: usize,

    /// Sequences in the output file
    pub n_aligned: usize,

    /// Output file, if one was written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

/// Drives one incremental alignment run
pub struct IncrementalAligner {
    config: AlignConfig,
    aligner: Box<dyn Aligner>,
    suffixes: Box<dyn SuffixSource>,
}

impl IncrementalAligner {
    pub fn new(config: AlignConfig, aligner: impl Aligner + 'static) -> Self {
        Self {
            config,
            aligner: Box::new(aligner),
            suffixes: Box::new(RandomSuffix),
        }
    }

    /// Replace the random temporary-name suffixes (for reproducible names)
    #[must_use]
    pub fn with_suffixes(mut self, suffixes: impl SuffixSource + 'static) -> Self {
        self.suffixes = Box::new(suffixes);
        self
    }

    #[must_use]
    pub fn config(&self) -> &AlignConfig {
        &self.config
    }

    /// Align the sequences of `input` not yet present in any of `alignments`.
    ///
    /// Finding nothing new, or having every chunk come back empty, is not an
    /// error: the summary simply has no output.
    ///
    /// # Errors
    ///
    /// Returns a `PipelineError` on read/write failure or if the aligner fails
    /// on any chunk. No output file is left behind in that case, and every
    /// temporary chunk file is removed.
    pub fn run(&self, input: &Path, alignments: &[PathBuf]) -> Result<RunSummary, PipelineError> {
        let config = &self.config;
        info!(
            "Will exclude sequences with proportion of Ns higher than {} or shorter than {}",
            config.ambiguous(),
            config.min_length
        );

        let known = collect_aligned_ids(alignments)?;
        let candidates = select_candidates(input, config.min_length, &known)?;

        let mut summary = RunSummary {
            n_known: known.len(),
            n_already_aligned: candidates.n_already_aligned,
            n_short: candidates.n_short,
            n_candidates: candidates.len(),
            ..RunSummary::default()
        };
        drop(known);
        if candidates.is_empty() {
            return Ok(summary);
        }

        let chunks = write_chunks(
            &candidates.sequences,
            config.n_workers,
            &config.workdir,
            &config.timestamp,
            self.suffixes.as_ref(),
        )?;
        summary.n_chunks = chunks.len();
        drop(candidates);

        align_chunks(
            self.aligner.as_ref(),
            &chunks,
            &config.reference,
            config.ambiguous(),
        )?;

        let output = config.output_path();
        if let Some(n_aligned) = merge_chunks(&chunks, &output)? {
            summary.n_aligned = n_aligned;
            summary.output = Some(output);
        }

        Ok(summary)
    }
}

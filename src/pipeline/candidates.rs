use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::core::record::SequenceRecord;
use crate::parsing::fasta::{for_each_record, ParseError};

/// Sequences selected for alignment, plus the bookkeeping of what was skipped
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    /// New sequences longer than the threshold, in input order
    pub sequences: Vec<SequenceRecord>,

    /// Sequences at or below the length threshold (aligned or not)
    pub n_short: usize,

    /// Sufficiently long sequences skipped because they are already aligned
    pub n_already_aligned: usize,
}

impl CandidateSet {
    #[must_use]
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}

/// Stream `input` and keep the sequences that are not in `aligned` and are
/// strictly longer than `min_length`.
///
/// # Errors
///
/// Returns a `ParseError` if the input cannot be read or parsed.
#[allow(clippy::implicit_hasher)] // Default hasher is fine for this use case
pub fn select_candidates(
    input: &Path,
    min_length: usize,
    aligned: &HashSet<String>,
) -> Result<CandidateSet, ParseError> {
    info!(
        "Reading fasta file {} and store incrementally (i.e. not already aligned)",
        input.display()
    );

    let mut candidates = CandidateSet::default();
    for_each_record(input, |record| {
        let length = record.len();
        if length <= min_length {
            debug!("Sequence {} too short, has only {length} sites", record.id);
            candidates.n_short += 1;
        } else if aligned.contains(&record.id) {
            candidates.n_already_aligned += 1;
        } else {
            candidates.sequences.push(record);
        }
        Ok(())
    })?;

    if candidates.n_short > 0 {
        warn!(
            "Number of sequences excluded due to short length: {}",
            candidates.n_short
        );
    }
    if candidates.is_empty() {
        warn!(
            "No new sequences found in {} (empty file or all included in alignments)",
            input.display()
        );
    } else {
        info!(
            "Found {} new sequences ({} already aligned)",
            candidates.len(),
            candidates.n_already_aligned
        );
    }

    Ok(candidates)
}

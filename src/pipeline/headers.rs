use std::collections::HashSet;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::parsing::fasta::{read_fasta_headers, ParseError};

/// Collect the identifiers of every sequence in the given alignment files.
///
/// Only membership matters downstream, so duplicates across files collapse
/// and file order is irrelevant.
///
/// # Errors
///
/// Returns the first `ParseError` encountered; an unreadable alignment is
/// never skipped.
pub fn collect_aligned_ids(alignments: &[PathBuf]) -> Result<HashSet<String>, ParseError> {
    if alignments.is_empty() {
        info!("No alignment given; will align all sequences from fasta file");
        return Ok(HashSet::new());
    }

    info!("Will read all alignment files and store sequence names");
    let mut aligned = HashSet::new();
    for path in alignments {
        debug!("Reading alignment {}", path.display());
        aligned.extend(read_fasta_headers(path)?);
    }
    debug!(
        "Found {} distinct sequence names across {} alignment files",
        aligned.len(),
        alignments.len()
    );

    Ok(aligned)
}

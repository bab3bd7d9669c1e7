use std::path::Path;

use tracing::{info, warn};

use crate::core::record::SequenceRecord;
use crate::parsing::fasta::{read_records, write_records, ParseError};
use crate::pipeline::chunking::ChunkFile;

/// Concatenate per-chunk alignments, in chunk order, into `destination`.
///
/// Returns the number of sequences written, or `None` when every chunk came
/// back empty; in that case no output file is created. Per-chunk outputs are
/// deleted either way.
///
/// # Errors
///
/// Returns a `ParseError` if a chunk alignment cannot be read or the output
/// cannot be written.
pub fn merge_chunks(
    chunks: &[ChunkFile],
    destination: &Path,
) -> Result<Option<usize>, ParseError> {
    info!("Merging file chunks into single file");
    let mut sequences: Vec<SequenceRecord> = Vec::new();
    for chunk in chunks {
        sequences.extend(read_records(chunk.output())?);
    }

    info!("Deleting chunk files");
    for chunk in chunks {
        chunk.remove_output()?;
    }

    if sequences.is_empty() {
        warn!(
            "No new aligned sequences, all remaining sequences probably failed length or ambiguous QC"
        );
        return Ok(None);
    }

    info!("Saving aligned sequences to {}", destination.display());
    let n_written = write_records(destination, &sequences)?;
    Ok(Some(n_written))
}

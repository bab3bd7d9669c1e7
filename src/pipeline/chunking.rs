//! Partitioning of candidate sequences into per-worker chunk files.
//!
//! Each chunk is materialized as `<workdir>/prb.<timestamp>_<suffix>_<offset>.fas.gz`
//! and the aligner writes its result next to it with an `.aln` extension.
//! [`ChunkFile`] owns both paths and removes whatever is left of them when
//! dropped, so an aborted run leaves no temporary files behind.

use std::io;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use rand::Rng;
use tracing::{debug, info, warn};

use crate::core::config::TEMP_PREFIX;
use crate::core::record::SequenceRecord;
use crate::parsing::fasta::{write_records, ParseError};
use crate::utils::validation::{is_valid_suffix, SUFFIX_HEX_DIGITS};

/// Split `0..n` into at most `n_workers` contiguous, non-empty ranges.
///
/// Uses ceiling division, so every range except possibly the last has the
/// same length and no range is empty.
///
/// ```
/// use incr_aligner::pipeline::chunking::partition;
///
/// assert_eq!(partition(2, 4), vec![0..1, 1..2]);
/// assert_eq!(partition(10, 3), vec![0..4, 4..8, 8..10]);
/// assert!(partition(0, 3).is_empty());
/// ```
#[must_use]
pub fn partition(n: usize, n_workers: usize) -> Vec<Range<usize>> {
    if n == 0 {
        return Vec::new();
    }
    let n_chunks = n_workers.clamp(1, n);
    let chunk_size = n.div_ceil(n_chunks);

    (0..n)
        .step_by(chunk_size)
        .map(|start| start..(start + chunk_size).min(n))
        .collect()
}

/// Source of the unique suffix embedded in temporary file names
pub trait SuffixSource: Send + Sync {
    fn next_suffix(&self) -> String;
}

/// 48 random bits rendered as 12 lowercase hex digits
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomSuffix;

impl SuffixSource for RandomSuffix {
    fn next_suffix(&self) -> String {
        let value: u64 = rand::thread_rng().gen_range(0..1u64 << 48);
        format!("{value:0width$x}", width = SUFFIX_HEX_DIGITS)
    }
}

/// Deterministic suffixes (`000000000000`, `000000000001`, ...) for reproducible names
#[derive(Debug, Default)]
pub struct CounterSuffix {
    next: AtomicU64,
}

impl CounterSuffix {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SuffixSource for CounterSuffix {
    fn next_suffix(&self) -> String {
        let value = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{value:0width$x}", width = SUFFIX_HEX_DIGITS)
    }
}

/// One chunk of candidates and the temporary files that belong to it
#[derive(Debug)]
pub struct ChunkFile {
    /// Index of the chunk's first sequence in the candidate list
    pub offset: usize,

    /// Number of sequences in the chunk
    pub len: usize,

    input: PathBuf,
    output: PathBuf,
}

impl ChunkFile {
    #[must_use]
    pub fn new(workdir: &Path, timestamp: &str, suffix: &str, range: &Range<usize>) -> Self {
        debug_assert!(is_valid_suffix(suffix), "bad temporary suffix {suffix:?}");
        let stem = format!("{TEMP_PREFIX}{timestamp}_{suffix}_{}", range.start);
        Self {
            offset: range.start,
            len: range.len(),
            input: workdir.join(format!("{stem}.fas.gz")),
            output: workdir.join(format!("{stem}.aln")),
        }
    }

    /// Compressed FASTA handed to the aligner
    #[must_use]
    pub fn input(&self) -> &Path {
        &self.input
    }

    /// Where the aligner's output is captured
    #[must_use]
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Delete the aligner input once it is no longer needed.
    ///
    /// # Errors
    ///
    /// Returns an I/O error other than "not found".
    pub fn remove_input(&self) -> io::Result<()> {
        remove_if_exists(&self.input)
    }

    /// Delete the aligner output.
    ///
    /// # Errors
    ///
    /// Returns an I/O error other than "not found".
    pub fn remove_output(&self) -> io::Result<()> {
        remove_if_exists(&self.output)
    }
}

impl Drop for ChunkFile {
    fn drop(&mut self) {
        for path in [&self.input, &self.output] {
            if let Err(e) = remove_if_exists(path) {
                warn!("Could not remove temporary file {}: {e}", path.display());
            }
        }
    }
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

/// Write `sequences` into at most `n_workers` gzip-compressed chunk files.
///
/// Chunks are returned in creation order; concatenating them reproduces
/// the order of `sequences`.
///
/// # Errors
///
/// Returns `ParseError::Io` if a chunk cannot be written. Chunks already
/// written are removed when the partially built list is dropped.
pub fn write_chunks(
    sequences: &[SequenceRecord],
    n_workers: usize,
    workdir: &Path,
    timestamp: &str,
    suffixes: &dyn SuffixSource,
) -> Result<Vec<ChunkFile>, ParseError> {
    info!("Preparing file chunks with temporary file names (to run the aligner in parallel)");
    let ranges = partition(sequences.len(), n_workers);

    info!(
        "Saving new sequences temporarily into {} files for concurrent alignment",
        ranges.len()
    );
    let mut chunks = Vec::with_capacity(ranges.len());
    for range in &ranges {
        let chunk = ChunkFile::new(workdir, timestamp, &suffixes.next_suffix(), range);
        // Registered before writing so a failed write is still cleaned up
        chunks.push(chunk);
        let chunk = &chunks[chunks.len() - 1];
        write_records(chunk.input(), &sequences[range.clone()])?;
        debug!(
            "Wrote {} sequences to {}",
            chunk.len,
            chunk.input().display()
        );
    }

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::fasta::read_records;
    use tempfile::TempDir;

    fn records(n: usize) -> Vec<SequenceRecord> {
        (0..n)
            .map(|i| SequenceRecord::new(format!("seq{i}"), b"ACGT".to_vec()))
            .collect()
    }

    #[test]
    fn test_partition_is_complete_and_ordered() {
        for n in 1..40 {
            for w in 1..12 {
                let ranges = partition(n, w);
                assert!(!ranges.is_empty());
                assert!(ranges.len() <= w.min(n), "n={n} w={w} -> {ranges:?}");
                assert!(ranges.iter().all(|r| !r.is_empty()));

                let flattened: Vec<usize> = ranges.iter().flat_map(Clone::clone).collect();
                assert_eq!(flattened, (0..n).collect::<Vec<_>>());
            }
        }
    }

    #[test]
    fn test_partition_caps_workers_at_candidates() {
        assert_eq!(partition(2, 4), vec![0..1, 1..2]);
        assert_eq!(partition(1, 8), vec![0..1]);
        assert_eq!(partition(5, 0), vec![0..5]);
    }

    #[test]
    fn test_random_suffix_shape() {
        let a = RandomSuffix.next_suffix();
        let b = RandomSuffix.next_suffix();
        assert!(is_valid_suffix(&a));
        assert!(is_valid_suffix(&b));
    }

    #[test]
    fn test_counter_suffix() {
        let suffixes = CounterSuffix::new();
        assert_eq!(suffixes.next_suffix(), "000000000000");
        assert_eq!(suffixes.next_suffix(), "000000000001");
    }

    #[test]
    fn test_chunk_names() {
        let chunk = ChunkFile::new(Path::new("/work"), "20240101_000000", "00000000000a", &(4..8));
        assert_eq!(
            chunk.input(),
            Path::new("/work/prb.20240101_000000_00000000000a_4.fas.gz")
        );
        assert_eq!(
            chunk.output(),
            Path::new("/work/prb.20240101_000000_00000000000a_4.aln")
        );
        assert_eq!(chunk.offset, 4);
        assert_eq!(chunk.len, 4);
    }

    #[test]
    fn test_write_chunks_reconstructs_order() {
        let dir = TempDir::new().unwrap();
        let sequences = records(7);

        let chunks = write_chunks(&sequences, 3, dir.path(), "ts", &CounterSuffix::new()).unwrap();
        assert_eq!(chunks.len(), 3);

        let mut rebuilt = Vec::new();
        for chunk in &chunks {
            rebuilt.extend(read_records(chunk.input()).unwrap());
        }
        assert_eq!(rebuilt, sequences);
    }

    #[test]
    fn test_drop_removes_temporary_files() {
        let dir = TempDir::new().unwrap();
        let chunks = write_chunks(&records(4), 2, dir.path(), "ts", &CounterSuffix::new()).unwrap();
        std::fs::write(chunks[0].output(), b">seq0\nACGT\n").unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 3);

        drop(chunks);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_failed_write_leaves_nothing() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("does-not-exist");

        let result = write_chunks(&records(4), 2, &missing, "ts", &CounterSuffix::new());
        assert!(result.is_err());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::pipeline::aligner::{Aligner, ToolError};
use crate::pipeline::chunking::ChunkFile;
use crate::pipeline::PipelineError;

/// Align every chunk concurrently, one task per chunk.
///
/// Blocks until all tasks have finished. The first failure stops tasks that
/// have not started yet; tasks already running are allowed to complete.
/// A chunk's input file is deleted as soon as it has been aligned.
///
/// Returns the per-chunk alignment paths in chunk order.
///
/// # Errors
///
/// Returns `PipelineError::Pool` if the worker pool cannot be built, or
/// `PipelineError::Tool` with the first genuine (non-cancellation) failure.
pub fn align_chunks(
    aligner: &dyn Aligner,
    chunks: &[ChunkFile],
    reference: &Path,
    ambiguous: f64,
) -> Result<Vec<PathBuf>, PipelineError> {
    if chunks.is_empty() {
        return Ok(Vec::new());
    }

    info!("Running the aligner concurrently into {} file chunks", chunks.len());
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(chunks.len())
        .thread_name(|i| format!("aligner-{i}"))
        .build()?;

    let cancelled = AtomicBool::new(false);
    let results: Vec<Result<PathBuf, ToolError>> = pool.install(|| {
        chunks
            .par_iter()
            .map(|chunk| align_one(aligner, chunk, reference, ambiguous, &cancelled))
            .collect()
    });

    first_failure(results)
}

/// Align a single chunk unless an earlier chunk has already failed.
///
/// A failure raises `cancelled` so that chunks not yet started are skipped.
fn align_one(
    aligner: &dyn Aligner,
    chunk: &ChunkFile,
    reference: &Path,
    ambiguous: f64,
    cancelled: &AtomicBool,
) -> Result<PathBuf, ToolError> {
    if cancelled.load(Ordering::Acquire) {
        return Err(ToolError::Cancelled(chunk.input().to_path_buf()));
    }

    let result = aligner
        .invoke(chunk, reference, ambiguous)
        .and_then(|output| {
            chunk.remove_input()?;
            Ok(output)
        });

    match &result {
        Ok(output) => debug!(
            "Aligned chunk at offset {} into {}",
            chunk.offset,
            output.display()
        ),
        Err(e) => {
            warn!("Alignment of chunk at offset {} failed: {e}", chunk.offset);
            cancelled.store(true, Ordering::Release);
        }
    }
    result
}

fn first_failure(results: Vec<Result<PathBuf, ToolError>>) -> Result<Vec<PathBuf>, PipelineError> {
    let mut outputs = Vec::with_capacity(results.len());
    let mut cancellation = None;

    for result in results {
        match result {
            Ok(output) => outputs.push(output),
            Err(ToolError::Cancelled(path)) => {
                cancellation.get_or_insert(ToolError::Cancelled(path));
            }
            Err(e) => return Err(e.into()),
        }
    }

    match cancellation {
        Some(e) => Err(e.into()),
        None => Ok(outputs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::SequenceRecord;
    use crate::pipeline::chunking::{write_chunks, CounterSuffix};
    use std::sync::atomic::AtomicUsize;
    use tempfile::TempDir;

    /// Copies each chunk's input to its output unchanged
    struct CopyAligner {
        calls: AtomicUsize,
    }

    impl Aligner for CopyAligner {
        fn invoke(&self, chunk: &ChunkFile, _: &Path, _: f64) -> Result<PathBuf, ToolError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::fs::copy(chunk.input(), chunk.output())?;
            Ok(chunk.output().to_path_buf())
        }
    }

    /// Fails on the chunk starting at `offset`, succeeds elsewhere
    struct FailingAligner {
        offset: usize,
    }

    impl Aligner for FailingAligner {
        fn invoke(&self, chunk: &ChunkFile, _: &Path, _: f64) -> Result<PathBuf, ToolError> {
            if chunk.offset == self.offset {
                return Err(ToolError::Io(std::io::Error::other("boom")));
            }
            std::fs::write(chunk.output(), b"")?;
            Ok(chunk.output().to_path_buf())
        }
    }

    fn chunks(dir: &TempDir, n: usize, workers: usize) -> Vec<ChunkFile> {
        let records: Vec<SequenceRecord> = (0..n)
            .map(|i| SequenceRecord::new(format!("s{i}"), b"ACGT".to_vec()))
            .collect();
        write_chunks(&records, workers, dir.path(), "ts", &CounterSuffix::new()).unwrap()
    }

    #[test]
    fn test_all_chunks_aligned_in_order() {
        let dir = TempDir::new().unwrap();
        let chunks = chunks(&dir, 6, 3);
        let aligner = CopyAligner {
            calls: AtomicUsize::new(0),
        };

        let outputs = align_chunks(&aligner, &chunks, Path::new("ref.fas"), 0.1).unwrap();

        assert_eq!(aligner.calls.load(Ordering::SeqCst), 3);
        let expected: Vec<PathBuf> = chunks.iter().map(|c| c.output().to_path_buf()).collect();
        assert_eq!(outputs, expected);
        assert!(chunks.iter().all(|c| !c.input().exists()));
        assert!(chunks.iter().all(|c| c.output().exists()));
    }

    #[test]
    fn test_failure_is_reported() {
        let dir = TempDir::new().unwrap();
        let chunks = chunks(&dir, 4, 2);

        let aligner = FailingAligner { offset: 2 };
        let result = align_chunks(&aligner, &chunks, Path::new("ref.fas"), 0.1);
        assert!(matches!(result, Err(PipelineError::Tool(ToolError::Io(_)))));

        drop(chunks);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_cancelled_chunk_is_never_started() {
        let dir = TempDir::new().unwrap();
        let chunks = chunks(&dir, 2, 2);
        let aligner = CopyAligner {
            calls: AtomicUsize::new(0),
        };
        let cancelled = AtomicBool::new(true);

        let result = align_one(&aligner, &chunks[1], Path::new("ref.fas"), 0.1, &cancelled);

        assert!(matches!(result, Err(ToolError::Cancelled(ref p)) if p == chunks[1].input()));
        assert_eq!(aligner.calls.load(Ordering::SeqCst), 0);
        assert!(chunks[1].input().exists());
        assert!(!chunks[1].output().exists());
    }

    #[test]
    fn test_failure_cancels_later_chunks() {
        let dir = TempDir::new().unwrap();
        let chunks = chunks(&dir, 2, 2);
        let cancelled = AtomicBool::new(false);

        let failing = FailingAligner { offset: 0 };
        assert!(align_one(&failing, &chunks[0], Path::new("ref.fas"), 0.1, &cancelled).is_err());
        assert!(cancelled.load(Ordering::SeqCst));
        assert!(chunks[0].input().exists());

        let aligner = CopyAligner {
            calls: AtomicUsize::new(0),
        };
        let result = align_one(&aligner, &chunks[1], Path::new("ref.fas"), 0.1, &cancelled);
        assert!(matches!(result, Err(ToolError::Cancelled(_))));
        assert_eq!(aligner.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_success_removes_input_and_keeps_going() {
        let dir = TempDir::new().unwrap();
        let chunks = chunks(&dir, 1, 1);
        let cancelled = AtomicBool::new(false);
        let aligner = CopyAligner {
            calls: AtomicUsize::new(0),
        };

        let output =
            align_one(&aligner, &chunks[0], Path::new("ref.fas"), 0.1, &cancelled).unwrap();

        assert_eq!(output, chunks[0].output());
        assert!(!chunks[0].input().exists());
        assert!(!cancelled.load(Ordering::SeqCst));
    }

    #[test]
    fn test_genuine_failure_preferred_over_cancellation() {
        let results = vec![
            Ok(PathBuf::from("a.aln")),
            Err(ToolError::Cancelled(PathBuf::from("b.fas.gz"))),
            Err(ToolError::Io(std::io::Error::other("boom"))),
        ];
        assert!(matches!(
            first_failure(results),
            Err(PipelineError::Tool(ToolError::Io(_)))
        ));
    }

    #[test]
    fn test_no_chunks() {
        let aligner = CopyAligner {
            calls: AtomicUsize::new(0),
        };
        assert!(align_chunks(&aligner, &[], Path::new("ref.fas"), 0.1)
            .unwrap()
            .is_empty());
        assert_eq!(aligner.calls.load(Ordering::SeqCst), 0);
    }
}

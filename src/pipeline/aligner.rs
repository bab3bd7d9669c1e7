//! The external alignment tool.
//!
//! The orchestration code only sees the [`Aligner`] trait, so tests can swap
//! in a fake that never spawns a process.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, warn};

use crate::pipeline::chunking::ChunkFile;

/// Default executable for [`ExternalAligner`]
pub const DEFAULT_ALIGNER: &str = "uvaialign";

/// Poll interval while waiting on a subprocess with a deadline
const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} failed on {} ({status})", .input.display())]
    Failed {
        program: String,
        input: PathBuf,
        status: ExitStatus,
    },

    #[error("{program} timed out after {} seconds on {}", .timeout.as_secs(), .input.display())]
    TimedOut {
        program: String,
        input: PathBuf,
        timeout: Duration,
    },

    #[error("Chunk {} cancelled after an earlier failure", .0.display())]
    Cancelled(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Aligns one chunk of sequences against the reference.
///
/// Implementations must write the alignment to [`ChunkFile::output`] and
/// return that path. Sequences with more than `ambiguous` ambiguous bases
/// may be dropped by the implementation.
pub trait Aligner: Send + Sync {
    /// # Errors
    ///
    /// Returns a `ToolError` if the chunk could not be aligned.
    fn invoke(
        &self,
        chunk: &ChunkFile,
        reference: &Path,
        ambiguous: f64,
    ) -> Result<PathBuf, ToolError>;
}

/// Runs `<program> -a <ambiguous> -r <reference> <input> > <output>`
#[derive(Debug, Clone)]
pub struct ExternalAligner {
    program: PathBuf,
    timeout: Option<Duration>,
}

impl Default for ExternalAligner {
    fn default() -> Self {
        Self::new(DEFAULT_ALIGNER)
    }
}

impl ExternalAligner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: None,
        }
    }

    /// Kill the aligner if a single chunk takes longer than `timeout`
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn program_name(&self) -> String {
        self.program.display().to_string()
    }

    fn wait(&self, child: &mut Child, input: &Path) -> Result<ExitStatus, ToolError> {
        let Some(timeout) = self.timeout else {
            return Ok(child.wait()?);
        };

        let start = Instant::now();
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            if start.elapsed() > timeout {
                warn!(
                    "Killing {} (PID: {}) after {} seconds",
                    self.program_name(),
                    child.id(),
                    timeout.as_secs()
                );
                if let Err(e) = child.kill() {
                    debug!("Could not kill {}: {e}", self.program_name());
                }
                if let Err(e) = child.wait() {
                    debug!("Could not reap {}: {e}", self.program_name());
                }
                return Err(ToolError::TimedOut {
                    program: self.program_name(),
                    input: input.to_path_buf(),
                    timeout,
                });
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }
}

impl Aligner for ExternalAligner {
    fn invoke(
        &self,
        chunk: &ChunkFile,
        reference: &Path,
        ambiguous: f64,
    ) -> Result<PathBuf, ToolError> {
        let stdout = File::create(chunk.output())?;

        let mut cmd = Command::new(&self.program);
        cmd.arg("-a")
            .arg(ambiguous.to_string())
            .arg("-r")
            .arg(reference)
            .arg(chunk.input())
            .stdin(Stdio::null())
            .stdout(stdout);
        debug!("Running {cmd:?}");

        let mut child = cmd.spawn().map_err(|source| ToolError::Spawn {
            program: self.program_name(),
            source,
        })?;
        let status = self.wait(&mut child, chunk.input())?;

        if !status.success() {
            return Err(ToolError::Failed {
                program: self.program_name(),
                input: chunk.input().to_path_buf(),
                status,
            });
        }

        Ok(chunk.output().to_path_buf())
    }
}

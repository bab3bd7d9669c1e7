use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::utils::validation::sanitize_ambiguity;

/// Sequences must be strictly longer than this to be aligned
pub const DEFAULT_MIN_LENGTH: usize = 20_000;

/// Default proportion of ambiguous bases tolerated by the aligner
pub const DEFAULT_AMBIGUOUS: f64 = 0.1;

/// Largest accepted ambiguous fraction; anything above resets to the default
pub const MAX_AMBIGUOUS: f64 = 0.9;

/// Prefix shared by every temporary chunk file
pub const TEMP_PREFIX: &str = "prb.";

/// Format used for the run timestamp embedded in file names
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Configuration for an incremental alignment run
#[derive(Debug, Clone)]
pub struct AlignConfig {
    /// Reference sequence passed to the aligner
    pub reference: PathBuf,

    /// Upper bound on the number of chunks aligned concurrently
    pub n_workers: usize,

    /// Ambiguous-base fraction, always within (0, 0.9]
    ambiguous: f64,

    /// Minimum sequence length (exclusive)
    pub min_length: usize,

    /// Explicit output path; `None` means `<workdir>/incremental.<timestamp>.aln.xz`
    pub output: Option<PathBuf>,

    /// Directory holding temporary chunk files
    pub workdir: PathBuf,

    /// Timestamp embedded in temporary and default output names
    pub timestamp: String,

    /// Per-chunk limit on the external aligner's wall time
    pub timeout: Option<Duration>,
}

impl AlignConfig {
    /// Create a configuration with defaults for everything but the reference
    pub fn new(reference: impl Into<PathBuf>) -> Self {
        Self {
            reference: reference.into(),
            n_workers: default_workers(),
            ambiguous: DEFAULT_AMBIGUOUS,
            min_length: DEFAULT_MIN_LENGTH,
            output: None,
            workdir: PathBuf::from("."),
            timestamp: current_timestamp(),
            timeout: None,
        }
    }

    #[must_use]
    pub fn with_workers(mut self, n_workers: usize) -> Self {
        self.n_workers = n_workers.max(1);
        self
    }

    /// Set the ambiguous fraction, resetting invalid values to the default
    #[must_use]
    pub fn with_ambiguous(mut self, ambiguous: f64) -> Self {
        self.ambiguous = sanitize_ambiguity(ambiguous);
        self
    }

    #[must_use]
    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }

    #[must_use]
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    #[must_use]
    pub fn with_workdir(mut self, workdir: impl Into<PathBuf>) -> Self {
        self.workdir = workdir.into();
        self
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = timestamp.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn ambiguous(&self) -> f64 {
        self.ambiguous
    }

    /// Resolved output path
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None => default_output(&self.workdir, &self.timestamp),
        }
    }
}

/// `<workdir>/incremental.<timestamp>.aln.xz`
#[must_use]
pub fn default_output(workdir: &Path, timestamp: &str) -> PathBuf {
    workdir.join(format!("incremental.{timestamp}.aln.xz"))
}

/// Local time formatted with [`TIMESTAMP_FORMAT`]
#[must_use]
pub fn current_timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

fn default_workers() -> usize {
    std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AlignConfig::new("ref.fas").with_timestamp("20240101_000000");
        assert_eq!(config.min_length, DEFAULT_MIN_LENGTH);
        assert!((config.ambiguous() - DEFAULT_AMBIGUOUS).abs() < f64::EPSILON);
        assert!(config.n_workers >= 1);
        assert_eq!(
            config.output_path(),
            PathBuf::from("./incremental.20240101_000000.aln.xz")
        );
    }

    #[test]
    fn test_invalid_ambiguity_is_reset() {
        let config = AlignConfig::new("ref.fas").with_ambiguous(0.95);
        assert!((config.ambiguous() - DEFAULT_AMBIGUOUS).abs() < f64::EPSILON);

        let config = AlignConfig::new("ref.fas").with_ambiguous(0.0);
        assert!((config.ambiguous() - DEFAULT_AMBIGUOUS).abs() < f64::EPSILON);

        let config = AlignConfig::new("ref.fas").with_ambiguous(0.9);
        assert!((config.ambiguous() - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn test_explicit_output_wins() {
        let config = AlignConfig::new("ref.fas")
            .with_workdir("/tmp/work")
            .with_output("/data/new.aln.gz");
        assert_eq!(config.output_path(), PathBuf::from("/data/new.aln.gz"));
    }

    #[test]
    fn test_zero_workers_becomes_one() {
        let config = AlignConfig::new("ref.fas").with_workers(0);
        assert_eq!(config.n_workers, 1);
    }

    #[test]
    fn test_timestamp_shape() {
        let ts = current_timestamp();
        assert_eq!(ts.len(), "20240101_000000".len());
        assert!(ts.chars().all(|c| c.is_ascii_digit() || c == '_'));
    }
}

use std::fmt;

/// A single FASTA sequence: identifier plus residues
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    /// First whitespace-delimited token of the definition line
    pub id: String,

    /// Residues exactly as read (no case folding, no line breaks)
    pub sequence: Vec<u8>,
}

impl SequenceRecord {
    pub fn new(id: impl Into<String>, sequence: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.into(),
            sequence: sequence.into(),
        }
    }

    /// Number of residues
    #[must_use]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

impl fmt::Display for SequenceRecord {
    /// Unwrapped FASTA: one definition line, one sequence line
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, ">{}", self.id)?;
        writeln!(f, "{}", String::from_utf8_lossy(&self.sequence))
    }
}

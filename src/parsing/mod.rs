//! Reading and writing of (possibly compressed) FASTA files.
//!
//! - [`compression`]: gzip/xz/plain detection and codec-aware readers and writers
//! - [`fasta`]: record streaming, header collection and unwrapped FASTA output

pub mod compression;
pub mod fasta;

//! Core data types for incremental alignment.
//!
//! - [`SequenceRecord`](record::SequenceRecord): an identifier and its residues
//! - [`AlignConfig`](config::AlignConfig): everything a run needs besides its inputs
//!
//! ## Defaults
//!
//! | Setting | Default |
//! |---------|---------|
//! | minimum length | 20000 (exclusive) |
//! | ambiguous fraction | 0.1, reset when outside (0, 0.9] |
//! | workers | available CPUs |
//! | output | `<workdir>/incremental.<timestamp>.aln.xz` |

pub mod config;
pub mod record;

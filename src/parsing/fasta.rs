//! FASTA reading and writing using noodles.
//!
//! Inputs may be plain, gzip or xz compressed (see [`super::compression`]).
//! Output is written unwrapped: one definition line and one sequence line per
//! record, which is what downstream alignment tools expect.

use std::io::{self, Write};
use std::path::Path;

use noodles::fasta;
use thiserror::Error;
use tracing::warn;

use crate::core::record::SequenceRecord;
use crate::parsing::compression::{open_reader, SequenceWriter};

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("noodles error: {0}")]
    Noodles(String),
}

impl ParseError {
    fn in_file(path: &Path, e: &std::io::Error) -> Self {
        ParseError::Noodles(format!(
            "Failed to parse FASTA record in {}: {e}",
            path.display()
        ))
    }
}

/// Stream every record of a FASTA file through `visit`.
///
/// Records are converted one at a time, so memory use is bounded by the
/// largest single sequence rather than the file size.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be opened, or
/// `ParseError::Noodles` if a record is malformed. Errors returned by
/// `visit` are propagated unchanged.
pub fn for_each_record<F>(path: &Path, mut visit: F) -> Result<(), ParseError>
where
    F: FnMut(SequenceRecord) -> Result<(), ParseError>,
{
    let reader = open_reader(path)?;
    let mut fasta_reader = fasta::io::Reader::new(reader);

    for result in fasta_reader.records() {
        let record = result.map_err(|e| ParseError::in_file(path, &e))?;
        visit(to_sequence_record(&record))?;
    }

    Ok(())
}

/// Read all records of a FASTA file into memory, preserving file order.
///
/// # Errors
///
/// See [`for_each_record`].
pub fn read_records(path: &Path) -> Result<Vec<SequenceRecord>, ParseError> {
    let mut records = Vec::new();
    for_each_record(path, |record| {
        records.push(record);
        Ok(())
    })?;
    Ok(records)
}

/// Read only the sequence identifiers of a FASTA file, in file order.
///
/// # Errors
///
/// See [`for_each_record`].
pub fn read_fasta_headers(path: &Path) -> Result<Vec<String>, ParseError> {
    let mut names = Vec::new();
    for_each_record(path, |record| {
        names.push(record.id);
        Ok(())
    })?;
    Ok(names)
}

fn to_sequence_record(record: &fasta::Record) -> SequenceRecord {
    let name = String::from_utf8_lossy(record.name()).to_string();
    SequenceRecord::new(name, record.sequence().as_ref().to_vec())
}

/// Write records to `path`, compressed according to its extension.
///
/// Returns the number of records written. If writing fails after the file
/// was created, the incomplete file is removed; a file that could not be
/// created is left untouched.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be created or written.
pub fn write_records<'a, I>(path: &Path, records: I) -> Result<usize, ParseError>
where
    I: IntoIterator<Item = &'a SequenceRecord>,
{
    let writer = SequenceWriter::create(path)?;
    fill(writer, records).map_err(|e| {
        if let Err(remove) = std::fs::remove_file(path) {
            warn!("Could not remove incomplete file {}: {remove}", path.display());
        }
        ParseError::from(e)
    })
}

fn fill<'a, I>(mut writer: SequenceWriter, records: I) -> io::Result<usize>
where
    I: IntoIterator<Item = &'a SequenceRecord>,
{
    let mut n_written = 0;
    for record in records {
        write!(writer, "{record}")?;
        n_written += 1;
    }
    writer.finish()?;
    Ok(n_written)
}

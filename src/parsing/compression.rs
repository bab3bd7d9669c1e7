//! Transparent handling of gzip, xz and plain text files.
//!
//! Readers detect compression from the file name first and fall back to
//! magic bytes, so a gzip file without a `.gz` extension is still read
//! correctly. Writers choose the codec from the extension alone.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use xz2::read::XzDecoder;
use xz2::write::XzEncoder;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const XZ_MAGIC: [u8; 6] = [0xfd, b'7', b'z', b'X', b'Z', 0x00];

/// xz preset used for output files
const XZ_LEVEL: u32 = 6;

/// Compression codecs understood by the readers and writers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Plain,
    Gzip,
    Xz,
}

impl Compression {
    /// Detect compression from the file name (`.gz`, `.bgz`, `.xz`)
    #[must_use]
    #[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.to_string_lossy().to_lowercase();
        if name.ends_with(".gz") || name.ends_with(".bgz") {
            Some(Compression::Gzip)
        } else if name.ends_with(".xz") {
            Some(Compression::Xz)
        } else {
            None
        }
    }

    /// Detect compression from the leading bytes of a file
    #[must_use]
    pub fn from_magic(bytes: &[u8]) -> Self {
        if bytes.starts_with(&GZIP_MAGIC) {
            Compression::Gzip
        } else if bytes.starts_with(&XZ_MAGIC) {
            Compression::Xz
        } else {
            Compression::Plain
        }
    }
}

/// Open a possibly compressed file for buffered reading.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be opened or its header read.
pub fn open_reader(path: &Path) -> io::Result<Box<dyn BufRead>> {
    let compression = match Compression::from_path(path) {
        Some(compression) => compression,
        None => sniff(path)?,
    };

    let file = File::open(path)?;
    let reader: Box<dyn BufRead> = match compression {
        Compression::Gzip => Box::new(BufReader::new(MultiGzDecoder::new(file))),
        Compression::Xz => Box::new(BufReader::new(XzDecoder::new_multi_decoder(file))),
        Compression::Plain => Box::new(BufReader::new(file)),
    };
    Ok(reader)
}

fn sniff(path: &Path) -> io::Result<Compression> {
    let mut file = File::open(path)?;
    let mut magic = [0u8; XZ_MAGIC.len()];
    let mut filled = 0;
    while filled < magic.len() {
        match file.read(&mut magic[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(Compression::from_magic(&magic[..filled]))
}

/// A file writer that compresses according to the output extension.
///
/// [`SequenceWriter::finish`] must be called to flush the codec trailer;
/// dropping the writer without it may leave a truncated file.
pub enum SequenceWriter {
    Plain(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
    Xz(XzEncoder<BufWriter<File>>),
}

impl SequenceWriter {
    /// Create (or truncate) `path`, picking the codec from its extension.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created.
    pub fn create(path: &Path) -> io::Result<Self> {
        let file = BufWriter::new(File::create(path)?);
        let writer = match Compression::from_path(path) {
            Some(Compression::Gzip) => {
                SequenceWriter::Gzip(GzEncoder::new(file, flate2::Compression::default()))
            }
            Some(Compression::Xz) => SequenceWriter::Xz(XzEncoder::new(file, XZ_LEVEL)),
            Some(Compression::Plain) | None => SequenceWriter::Plain(file),
        };
        Ok(writer)
    }

    /// Flush all buffered data and write the codec trailer.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if flushing fails.
    pub fn finish(self) -> io::Result<()> {
        let mut inner = match self {
            SequenceWriter::Plain(w) => w,
            SequenceWriter::Gzip(w) => w.finish()?,
            SequenceWriter::Xz(w) => w.finish()?,
        };
        inner.flush()
    }
}

impl Write for SequenceWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            SequenceWriter::Plain(w) => w.write(buf),
            SequenceWriter::Gzip(w) => w.write(buf),
            SequenceWriter::Xz(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            SequenceWriter::Plain(w) => w.flush(),
            SequenceWriter::Gzip(w) => w.flush(),
            SequenceWriter::Xz(w) => w.flush(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn roundtrip(name: &str) -> (Compression, String) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(name);

        let mut writer = SequenceWriter::create(&path).unwrap();
        writer.write_all(b">a\nACGT\n").unwrap();
        writer.finish().unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let mut text = String::new();
        open_reader(&path).unwrap().read_to_string(&mut text).unwrap();
        (Compression::from_magic(&bytes), text)
    }

    #[test]
    fn test_from_path() {
        assert_eq!(Compression::from_path(Path::new("a.fas.gz")), Some(Compression::Gzip));
        assert_eq!(Compression::from_path(Path::new("a.fa.bgz")), Some(Compression::Gzip));
        assert_eq!(Compression::from_path(Path::new("a.aln.XZ")), Some(Compression::Xz));
        assert_eq!(Compression::from_path(Path::new("a.aln")), None);
    }

    #[test]
    fn test_writer_codec_follows_extension() {
        assert_eq!(roundtrip("out.fas.gz"), (Compression::Gzip, ">a\nACGT\n".to_string()));
        assert_eq!(roundtrip("out.aln.xz"), (Compression::Xz, ">a\nACGT\n".to_string()));
        assert_eq!(roundtrip("out.aln"), (Compression::Plain, ">a\nACGT\n".to_string()));
    }

    #[test]
    fn test_reader_sniffs_unlabelled_gzip() {
        let dir = TempDir::new().unwrap();
        let labelled = dir.path().join("chunk.fas.gz");
        let mut writer = SequenceWriter::create(&labelled).unwrap();
        writer.write_all(b">b\nTTTT\n").unwrap();
        writer.finish().unwrap();

        let unlabelled = dir.path().join("chunk.aln");
        std::fs::rename(&labelled, &unlabelled).unwrap();

        let mut text = String::new();
        open_reader(&unlabelled)
            .unwrap()
            .read_to_string(&mut text)
            .unwrap();
        assert_eq!(text, ">b\nTTTT\n");
    }

    #[test]
    fn test_reader_reads_concatenated_xz_streams() {
        let dir = TempDir::new().unwrap();
        let mut merged = Vec::new();
        let streams: [(&str, &[u8]); 2] = [
            ("old.aln.xz", b">old1\nACGT\n"),
            ("new.aln.xz", b">old2\nACGT\n"),
        ];
        for (name, content) in streams {
            let path = dir.path().join(name);
            let mut writer = SequenceWriter::create(&path).unwrap();
            writer.write_all(content).unwrap();
            writer.finish().unwrap();
            merged.extend(std::fs::read(&path).unwrap());
        }
        let path = dir.path().join("merged.aln.xz");
        std::fs::write(&path, merged).unwrap();

        let mut text = String::new();
        open_reader(&path).unwrap().read_to_string(&mut text).unwrap();
        assert_eq!(text, ">old1\nACGT\n>old2\nACGT\n");
    }

    #[test]
    fn test_reader_handles_tiny_plain_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tiny");
        std::fs::write(&path, b">").unwrap();

        let mut text = String::new();
        open_reader(&path).unwrap().read_to_string(&mut text).unwrap();
        assert_eq!(text, ">");
    }

    #[test]
    fn test_open_missing_file_fails() {
        assert!(open_reader(Path::new("/nonexistent/input.fas")).is_err());
    }
}

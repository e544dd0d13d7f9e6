//! File I/O collaborators: FASTA/FASTQ readers and the flat binary
//! suffix-array format.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use memmap2::Mmap;

use crate::Index;

const INDEX_SIZE: usize = size_of::<Index>();

fn trim_newline(line: &mut Vec<u8>) {
    while line.last() == Some(&b'\n') || line.last() == Some(&b'\r') {
        line.pop();
    }
}

/// Read a single-record FASTA file: header lines (starting with `>`) are
/// skipped, the remaining lines are concatenated with line endings
/// stripped.
pub fn read_fasta<P: AsRef<Path>>(path: P) -> io::Result<Vec<u8>> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut seq = Vec::new();
    let mut line = Vec::new();
    while reader.read_until(b'\n', &mut line)? > 0 {
        trim_newline(&mut line);
        if !line.starts_with(b">") {
            seq.extend_from_slice(&line);
        }
        line.clear();
    }
    Ok(seq)
}

/// Streams the sequence of each record in a multi-record FASTA or FASTQ
/// file, one record per call, and can be rewound to the start of its
/// source.
pub struct SequenceReader {
    reader: BufReader<File>,
}

impl SequenceReader {
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Ok(Self { reader: BufReader::new(File::open(path)?) })
    }

    /// Seek back to the first record.
    pub fn rewind(&mut self) -> io::Result<()> {
        self.reader.seek(SeekFrom::Start(0))?;
        Ok(())
    }

    fn peek(&mut self) -> io::Result<Option<u8>> {
        Ok(self.reader.fill_buf()?.first().copied())
    }

    /// The concatenated sequence lines of the next record, or `None` at
    /// the end of the input. FASTQ quality lines are skipped.
    pub fn next_sequence(&mut self) -> io::Result<Option<Vec<u8>>> {
        let mut line = Vec::new();

        // Record header.
        if self.reader.read_until(b'\n', &mut line)? == 0 {
            return Ok(None);
        }

        let mut seq = Vec::new();
        loop {
            match self.peek()? {
                None | Some(b'>') | Some(b'@') => break,
                Some(b'+') => {
                    // FASTQ separator: drop it and the quality lines.
                    line.clear();
                    self.reader.read_until(b'\n', &mut line)?;
                    loop {
                        match self.peek()? {
                            None | Some(b'@') => break,
                            _ => {
                                line.clear();
                                self.reader.read_until(b'\n', &mut line)?;
                            }
                        }
                    }
                    break;
                }
                Some(_) => {
                    line.clear();
                    self.reader.read_until(b'\n', &mut line)?;
                    trim_newline(&mut line);
                    seq.extend_from_slice(&line);
                }
            }
        }
        Ok(Some(seq))
    }
}

/// Read a persisted suffix array: a flat file of host-endian `Index`
/// values, count = file size / element size. The file is memory-mapped
/// rather than buffered through the heap twice.
pub fn read_suffix_array<P: AsRef<Path>>(path: P) -> io::Result<Vec<Index>> {
    let file = File::open(path)?;
    let map = unsafe { Mmap::map(&file)? };
    let bytes = &map[..];
    if bytes.len() % INDEX_SIZE != 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "suffix array file size is not a multiple of the element size",
        ));
    }

    let mut sa = Vec::with_capacity(bytes.len() / INDEX_SIZE);
    for chunk in bytes.chunks_exact(INDEX_SIZE) {
        let mut buf = [0u8; INDEX_SIZE];
        buf.copy_from_slice(chunk);
        sa.push(Index::from_ne_bytes(buf));
    }
    Ok(sa)
}

/// Persist a suffix array in the flat binary format `read_suffix_array`
/// consumes.
pub fn write_suffix_array<P: AsRef<Path>>(path: P, sa: &[Index]) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for &v in sa {
        writer.write_all(&v.to_ne_bytes())?;
    }
    writer.flush()
}

//! Chunked reading of raw reference audio.
//!
//! The reference file is raw 16-bit little-endian mono PCM. It is read in
//! fixed-size chunks so memory stays bounded no matter how long the file is.

use crate::defaults::BYTES_PER_SAMPLE;
use crate::error::{Result, SubsyncError};
use log::{trace, warn};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// A run of consecutive reference samples.
///
/// Always holds a whole number of samples: a chunk never splits a 16-bit
/// sample in half.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleChunk {
    samples: Vec<i16>,
}

impl SampleChunk {
    /// Decodes little-endian sample bytes. A trailing odd byte is ignored.
    pub fn from_le_bytes(bytes: &[u8]) -> Self {
        let samples = bytes
            .chunks_exact(BYTES_PER_SAMPLE)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Self { samples }
    }

    /// Wraps already decoded samples.
    pub fn from_samples(samples: Vec<i16>) -> Self {
        Self { samples }
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Number of samples in this chunk.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Size of this chunk in the source, in bytes. Always even.
    pub fn byte_len(&self) -> usize {
        self.samples.len() * BYTES_PER_SAMPLE
    }
}

/// Lazy sequence of [`SampleChunk`]s read from a byte source.
///
/// Chunks come out in source order and together cover the source exactly,
/// except for a dangling odd byte at the very end which is dropped.
/// Restarting requires opening a new stream.
pub struct SampleStream<R> {
    reader: R,
    buffer: Vec<u8>,
    finished: bool,
    dropped_trailing_byte: bool,
}

impl SampleStream<File> {
    /// Opens a raw PCM file for chunked reading.
    ///
    /// Failure to open is reported as [`SubsyncError::ReferenceOpen`].
    pub fn open(path: &Path, chunk_bytes: usize) -> Result<Self> {
        let file = File::open(path).map_err(|source| SubsyncError::ReferenceOpen {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::new(file, chunk_bytes))
    }
}

impl<R: Read> SampleStream<R> {
    /// Wraps a reader.
    ///
    /// The chunk capacity is rounded down to an even byte count, with a
    /// minimum of one sample, so full chunks never split a sample.
    pub fn new(reader: R, chunk_bytes: usize) -> Self {
        let capacity = effective_capacity(chunk_bytes);
        Self {
            reader,
            buffer: vec![0u8; capacity],
            finished: false,
            dropped_trailing_byte: false,
        }
    }

    /// Capacity of a full chunk in bytes.
    pub fn chunk_capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the source had an odd length and its last byte was dropped.
    pub fn dropped_trailing_byte(&self) -> bool {
        self.dropped_trailing_byte
    }

    fn next_chunk(&mut self) -> io::Result<Option<SampleChunk>> {
        if self.finished {
            return Ok(None);
        }

        let filled = fill_buffer(&mut self.reader, &mut self.buffer)?;
        if filled < self.buffer.len() {
            self.finished = true;
        }

        let whole = filled - filled % BYTES_PER_SAMPLE;
        if whole < filled {
            // Only the final read can be odd, full chunks are even by construction.
            self.dropped_trailing_byte = true;
            warn!("Reference audio has an odd byte count, dropping the trailing byte");
        }

        if whole == 0 {
            return Ok(None);
        }

        trace!("Read reference chunk of {} bytes", whole);
        Ok(Some(SampleChunk::from_le_bytes(&self.buffer[..whole])))
    }
}

impl<R: Read> Iterator for SampleStream<R> {
    type Item = io::Result<SampleChunk>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_chunk() {
            Ok(chunk) => chunk.map(Ok),
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

fn effective_capacity(chunk_bytes: usize) -> usize {
    (chunk_bytes - chunk_bytes % BYTES_PER_SAMPLE).max(BYTES_PER_SAMPLE)
}

/// Reads until `buffer` is full or the reader is exhausted.
///
/// Short reads are retried so chunk boundaries do not depend on how the
/// underlying source delivers its bytes.
fn fill_buffer<R: Read>(reader: &mut R, buffer: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        match reader.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

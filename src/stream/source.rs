//! Suppliers of table bytes.

use std::{
    fs::File,
    io::{self, ErrorKind, Read},
    path::Path,
};

use bytes::{Bytes, BytesMut};

/// Size of a single read from a [`ReaderSource`].
const READ_CHUNK: usize = 64 * 1024;

/// A non-blocking supplier of bytes.
pub trait Source {
    /// Take exactly `n` bytes, if that many are available now.
    ///
    /// Returns `Ok(None)` without consuming anything otherwise.
    fn try_read(&mut self, n: usize) -> io::Result<Option<Bytes>>;

    /// Number of bytes held and not yet taken.
    fn buffered(&self) -> usize;

    /// Whether no more bytes will ever become available.
    fn is_ended(&self) -> bool;

    /// Total length of the input, if known before decoding starts.
    fn total_length(&self) -> Option<u64> {
        None
    }

    /// Stop taking in bytes until resumed.
    fn pause(&mut self) {}

    /// Take in bytes again after a pause.
    fn resume(&mut self) {}
}

/// An incremental feed of bytes, pushed as they arrive.
///
/// Producers should check [`Feed::is_paused`] and hold back further chunks
/// while the consumer is applying backpressure. Chunks pushed anyway are
/// buffered, never dropped.
#[derive(Debug, Default)]
pub struct Feed {
    buffer: BytesMut,
    total_length: Option<u64>,
    is_ended: bool,
    is_paused: bool,
}

impl Feed {
    /// Create an empty feed of unknown length.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty feed that will deliver exactly `total_length` bytes.
    pub fn with_length(total_length: u64) -> Self {
        Self {
            total_length: Some(total_length),
            ..Self::default()
        }
    }

    /// Create an ended feed holding a whole table.
    pub fn from_slice(r: &[u8]) -> Self {
        Self {
            buffer: BytesMut::from(r),
            total_length: Some(r.len() as u64),
            is_ended: true,
            is_paused: false,
        }
    }

    /// Append a chunk of bytes.
    pub fn push(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Mark the end of the input.
    pub fn finish(&mut self) {
        self.is_ended = true;
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused
    }
}

impl Source for Feed {
    fn try_read(&mut self, n: usize) -> io::Result<Option<Bytes>> {
        if self.buffer.len() < n {
            return Ok(None);
        }

        Ok(Some(self.buffer.split_to(n).freeze()))
    }

    fn buffered(&self) -> usize {
        self.buffer.len()
    }

    fn is_ended(&self) -> bool {
        self.is_ended
    }

    fn total_length(&self) -> Option<u64> {
        self.total_length
    }

    fn pause(&mut self) {
        self.is_paused = true;
    }

    fn resume(&mut self) {
        self.is_paused = false;
    }
}

/// A source reading from an [`io::Read`] on demand, such as a local file.
///
/// Reads happen only inside [`Source::try_read`], so nothing is read while
/// paused.
#[derive(Debug)]
pub struct ReaderSource<R> {
    reader: R,
    buffer: BytesMut,
    total_length: Option<u64>,
    is_ended: bool,
    is_paused: bool,
}

impl<R: Read> ReaderSource<R> {
    /// Read from a reader of unknown length.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: BytesMut::new(),
            total_length: None,
            is_ended: false,
            is_paused: false,
        }
    }

    /// Read from a reader known to deliver `total_length` bytes.
    pub fn with_length(reader: R, total_length: u64) -> Self {
        Self {
            total_length: Some(total_length),
            ..Self::new(reader)
        }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Fill the buffer until it holds `n` bytes or the reader is exhausted.
    fn fill(&mut self, n: usize) -> io::Result<()> {
        if self.buffer.len() >= n || self.is_ended {
            return Ok(());
        }

        let mut chunk = vec![0; READ_CHUNK];

        while self.buffer.len() < n && !self.is_ended {
            match self.reader.read(&mut chunk) {
                Ok(0) => self.is_ended = true,
                Ok(read) => self.buffer.extend_from_slice(&chunk[..read]),
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(err) => Err(err)?,
            }
        }

        Ok(())
    }
}

impl ReaderSource<File> {
    /// Open a local file, using its length to check the header.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::open(path)?;
        let length = file.metadata()?.len();

        Ok(Self::with_length(file, length))
    }
}

impl<R: Read> Source for ReaderSource<R> {
    fn try_read(&mut self, n: usize) -> io::Result<Option<Bytes>> {
        if self.is_paused {
            return Ok(None);
        }

        self.fill(n)?;

        if self.buffer.len() < n {
            return Ok(None);
        }

        Ok(Some(self.buffer.split_to(n).freeze()))
    }

    fn buffered(&self) -> usize {
        self.buffer.len()
    }

    fn is_ended(&self) -> bool {
        self.is_ended
    }

    fn total_length(&self) -> Option<u64> {
        self.total_length
    }

    fn pause(&mut self) {
        self.is_paused = true;
    }

    fn resume(&mut self) {
        self.is_paused = false;
    }
}

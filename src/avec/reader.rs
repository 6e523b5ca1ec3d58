//! Reader-based decoder implementation.

use std::{fs::File, io::Read, path::Path};

use log::debug;

use crate::{
    Error,
    sans::{Codepage, Header, Record},
    stream::{Demand, Parser, ReaderSource, Sink, Status},
};

use super::{FromTable, Publisher};

/// Decode a whole table from a reader, publishing to a receiver.
///
/// The length of a reader is unknown, so it is not checked against the header.
/// Returns the header with its fields.
///
/// This method is also re-exported as `dbfstream::avec::decode_reader`.
pub fn decode(r: impl Read, codepage: Codepage, o: &mut impl FromTable) -> Result<Header, Error> {
    let mut parser = Parser::with_codepage(ReaderSource::new(r), codepage);
    let mut publisher = Publisher::new(o);

    // A reader source ends itself once exhausted, so a single pass suffices.
    parser.on_readable(&mut publisher);

    publisher.outcome()
}

/// A pull-based iterator over the records of a table.
///
/// Each call to [`Iterator::next`] reads only as many bytes as the next record
/// requires. Decoding stops after the first error, which is yielded once.
///
/// ```ignore
/// for record in Records::open("customers.dbf")? {
///     let record = record?;
///     println!("{}: {:?}", record.sequence, record.get("NAME"));
/// }
/// ```
#[derive(Debug)]
pub struct Records<R> {
    parser: Parser<ReaderSource<R>>,
    slot: Slot,
}

/// Sink holding at most one record, pausing as soon as it is filled.
#[derive(Debug, Default)]
struct Slot {
    record: Option<Record>,
    error: Option<Error>,
}

impl Sink for Slot {
    fn record(&mut self, record: Record) -> Demand {
        self.record = Some(record);
        Demand::Pause
    }

    fn error(&mut self, error: Error) {
        self.error = Some(error);
    }
}

impl Records<File> {
    /// Open a local file, using its length to check the header.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        debug!("Opening {}.", path.display());

        Ok(Self::from_source(ReaderSource::open(path)?, Codepage::default()))
    }
}

impl<R: Read> Records<R> {
    /// Iterate over records from a reader of unknown length.
    pub fn new(r: R) -> Self {
        Self::from_source(ReaderSource::new(r), Codepage::default())
    }

    pub fn from_source(source: ReaderSource<R>, codepage: Codepage) -> Self {
        Self {
            parser: Parser::with_codepage(source, codepage),
            slot: Slot::default(),
        }
    }

    /// The header, once it and its fields have been decoded.
    ///
    /// Decodes the header if no record has been pulled yet. Returns `None` if
    /// decoding failed first; the error is then yielded by the iterator.
    pub fn header(&mut self) -> Option<&Header> {
        if let Status::AwaitingHeader | Status::AwaitingFields = self.parser.status() {
            self.parser.on_readable(&mut self.slot);
        }

        self.parser.header()
    }
}

impl<R: Read> Iterator for Records<R> {
    type Item = Result<Record, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.slot.record.take() {
                return Some(Ok(record));
            }

            if let Some(error) = self.slot.error.take() {
                return Some(Err(error));
            }

            match self.parser.status() {
                Status::Done | Status::Failed(_) => return None,
                Status::Blocked => self.parser.on_demand(&mut self.slot),
                _ => self.parser.on_readable(&mut self.slot),
            }
        }
    }
}

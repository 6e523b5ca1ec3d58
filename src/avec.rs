//! Convenience interfaces for common decoding patterns.
//!
//! The functions in this module are suited to decoding whole tables from files
//! and data slices, publishing to the [`FromTable`] and [`FromRecord`] traits.
//! [`Records`] instead yields one record at a time, reading only as far as the
//! caller pulls.
//!
//! In many cases (when records are of a known shape), these traits can be
//! derived. See the [`FromTable`](macro@FromTable) and
//! [`FromRecord`](macro@FromRecord) macros for details.

pub mod reader;
pub mod slice;

pub use reader::{Records, decode as decode_reader};
pub use slice::decode as decode_slice;

use crate::{
    Error,
    sans::{Header, Record, Value},
    stream::{Demand, Sink},
};

/// Derive [`FromTable`] for a struct holding the records of a table.
///
/// _Requires Cargo feature `derive`._
///
/// # Example
///
/// Add the `records` attribute to a `Vec<T>` struct field, where `T` is a type
/// implementing [`FromRecord`] and [`Default`]. Use `records(active)` instead
/// to skip records marked as deleted. To keep the header, add the `header`
/// attribute to an `Option<Header>` field.
///
/// ```
/// #[derive(Debug, Default, FromTable)]
/// struct Customers {
///     #[header]
///     header: Option<Header>,
///     #[records(active)]
///     customers: Vec<Customer>,
/// }
/// ```
#[cfg(feature = "derive")]
pub use dbfstream_derive::FromTable;

/// Produce record receivers for a table.
///
/// See the [`FromTable`](macro@FromTable) derive macro for an automatic
/// implementation of this trait.
#[allow(unused_variables)]
pub trait FromTable {
    /// Receive the header and its fields, before any record.
    fn add_header(&mut self, header: &Header) {}
    /// Retrieve a receiver for a record, if one is wanted.
    fn add_record(&mut self, sequence: u32, deleted: bool) -> Option<&mut dyn FromRecord>;
}

impl<T: FromRecord + Default> FromTable for Vec<T> {
    fn add_record(&mut self, _: u32, _: bool) -> Option<&mut dyn FromRecord> {
        self.push(Default::default());
        self.last_mut().map(|r| r as _)
    }
}

/// Derive [`FromRecord`] for a struct representing a single record.
///
/// _Requires Cargo feature `derive`._
///
/// # Examples
///
/// To receive the value of a field, add the `field("NAME")` attribute to an
/// `Option<T>` struct field, where `NAME` is the field name as stored in the
/// table and `T` is `String` (character and other fields), `f64` (numeric
/// fields) or `bool` (logical fields). Values of another type are skipped.
///
/// To receive the delete marker or the sequence number, supply `deleted`
/// (`Option<bool>`) or `sequence` (`Option<u32>`) in place of a name.
///
/// ```
/// #[derive(Debug, Default, FromRecord)]
/// struct Customer {
///     #[field(sequence)]
///     row: Option<u32>,
///     #[field("NAME")]
///     name: Option<String>,
///     #[field("BALANCE")]
///     balance: Option<f64>,
///     #[field("ACTIVE")]
///     active: Option<bool>,
/// }
/// ```
///
/// To convert while receiving, supply an accumulator closure. Since the value
/// type cannot be inferred, the second argument must be typed.
///
/// ```
/// #[derive(Debug, Default, FromRecord)]
/// struct Customer {
///     #[field("TAGS", |v, s: String| v.extend(s.split(',').map(String::from)))]
///     tags: Vec<String>,
/// }
/// ```
#[cfg(feature = "derive")]
pub use dbfstream_derive::FromRecord;

/// Receive field values for a record.
///
/// Values are published in descriptor order, after the sequence number and
/// the delete marker.
///
/// The default implementation of each method ignores received values.
///
/// See the [`FromRecord`](macro@FromRecord) derive macro for an automatic
/// implementation of this trait.
#[allow(unused_variables)]
pub trait FromRecord {
    /// Add the sequence number to the record.
    fn add_sequence(&mut self, _: u32) {}
    /// Add the delete marker to the record.
    fn add_deleted(&mut self, _: bool) {}
    /// Add a character (or otherwise undecoded) value for a field.
    fn add_string(&mut self, field: &str, _: String) {}
    /// Add a numeric value for a field.
    fn add_f64(&mut self, field: &str, _: f64) {}
    /// Add a logical value for a field.
    fn add_bool(&mut self, field: &str, _: bool) {}
}

/// Publish a decoded record to a receiver.
pub fn publish(record: Record, o: &mut (impl FromRecord + ?Sized)) {
    o.add_sequence(record.sequence);
    o.add_deleted(record.deleted);

    for (field, value) in record.values {
        match value {
            Value::Text(s) => o.add_string(&field, s),
            Value::Number(x) => o.add_f64(&field, x),
            Value::Logical(b) => o.add_bool(&field, b),
        }
    }
}

/// Sink publishing every record to a table receiver.
struct Publisher<'a, O: ?Sized> {
    o: &'a mut O,
    header: Option<Header>,
    error: Option<Error>,
}

impl<'a, O: FromTable + ?Sized> Publisher<'a, O> {
    fn new(o: &'a mut O) -> Self {
        Self {
            o,
            header: None,
            error: None,
        }
    }

    /// The decoded header, or the error that stopped decoding.
    fn outcome(self) -> Result<Header, Error> {
        match (self.error, self.header) {
            (Some(err), _) => Err(err),
            (None, Some(header)) => Ok(header),
            (None, None) => Err(Error::InternalInconsistency),
        }
    }
}

impl<O: FromTable + ?Sized> Sink for Publisher<'_, O> {
    fn header(&mut self, header: &Header) {
        self.o.add_header(header);
        self.header = Some(header.clone());
    }

    fn record(&mut self, record: Record) -> Demand {
        if let Some(o) = self.o.add_record(record.sequence, record.deleted) {
            publish(record, o);
        }

        Demand::More
    }

    fn error(&mut self, error: Error) {
        self.error = Some(error);
    }
}

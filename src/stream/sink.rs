//! Consumers of decoded units.

use crate::{
    Error,
    sans::{Header, Record},
};

/// Whether a sink is ready for another record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Demand {
    /// Keep emitting records.
    More,
    /// Stop emitting until [`Parser::on_demand`](super::Parser::on_demand) is
    /// called.
    Pause,
}

/// Receive the output of a [`Parser`](super::Parser).
///
/// The default implementation of each notification ignores it.
#[allow(unused_variables)]
pub trait Sink {
    /// The header and its fields have been decoded. Called at most once,
    /// before any record.
    fn header(&mut self, header: &Header) {}
    /// A record has been decoded.
    fn record(&mut self, record: Record) -> Demand;
    /// Decoding failed. Called at most once, just before `end`.
    fn error(&mut self, error: Error) {}
    /// Decoding has stopped. Called exactly once.
    fn end(&mut self) {}
}

impl<T: Sink + ?Sized> Sink for &mut T {
    fn header(&mut self, header: &Header) {
        (**self).header(header)
    }
    fn record(&mut self, record: Record) -> Demand {
        (**self).record(record)
    }
    fn error(&mut self, error: Error) {
        (**self).error(error)
    }
    fn end(&mut self) {
        (**self).end()
    }
}

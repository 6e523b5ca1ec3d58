//! The decoding state machine.

use std::{io, mem};

use bytes::Bytes;
use either::Either::{self, Left, Right};
use log::{debug, trace, warn};

use super::{Demand, Sink, Source};
use crate::{
    Error, ErrorKind,
    sans::{
        Codepage, Header, descriptor,
        header::{self, HEADER_LENGTH, ShortRead},
        record,
    },
};

/// Number of consecutive short reads of the header or field descriptors after
/// which a table is considered corrupted.
pub const MAX_SHORT_READS: u8 = 3;

/// Observable progress of a [`Parser`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    AwaitingHeader,
    AwaitingFields,
    AwaitingRecords,
    Blocked,
    Done,
    Failed(ErrorKind),
}

#[derive(Debug)]
enum State {
    AwaitingHeader,
    AwaitingFields(Header),
    AwaitingRecords,
    Blocked,
    Done,
    Failed(ErrorKind),
    /// Held while a step owns the state. Only observable if a step unwound.
    Stepping,
}

/// Mutable state of one decoding session.
#[derive(Debug)]
struct Session {
    state: State,
    /// Consecutive short reads, shared by the header and field descriptor
    /// steps.
    short_reads: u8,
    /// Bytes buffered by the source at the previous attempt.
    seen: usize,
    /// Set once the end of input has been signalled.
    ended: bool,
    /// Set while the state machine is running.
    in_flight: bool,
}

/// Incremental decoder for a single table.
///
/// See the [module documentation](super) for how to drive it.
#[derive(Debug)]
pub struct Parser<S> {
    source: S,
    codepage: Codepage,
    header: Option<Header>,
    /// Sequence number of the last record emitted.
    sequence: u32,
    session: Session,
}

impl<S: Source> Parser<S> {
    /// Create a parser decoding text as UTF-8.
    pub fn new(source: S) -> Self {
        Self::with_codepage(source, Codepage::default())
    }

    pub fn with_codepage(source: S, codepage: Codepage) -> Self {
        Self {
            source,
            codepage,
            header: None,
            sequence: 0,
            session: Session {
                state: State::AwaitingHeader,
                short_reads: 0,
                seen: 0,
                ended: false,
                in_flight: false,
            },
        }
    }

    /// More bytes may be available from the source.
    pub fn on_readable(&mut self, sink: &mut impl Sink) {
        self.drive(sink);
    }

    /// The source has ended.
    ///
    /// From here on the source is treated as ended, whether or not it reports
    /// so itself.
    pub fn on_end(&mut self, sink: &mut impl Sink) {
        self.session.ended = true;
        self.drive(sink);
    }

    /// The sink is ready for more records.
    pub fn on_demand(&mut self, sink: &mut impl Sink) {
        if !self.session.in_flight && matches!(self.session.state, State::Blocked) {
            debug!("Resuming after record {}.", self.sequence);
            self.session.state = State::AwaitingRecords;
            self.source.resume();
        }

        self.drive(sink);
    }

    pub fn status(&self) -> Status {
        match &self.session.state {
            State::AwaitingHeader => Status::AwaitingHeader,
            State::AwaitingFields(_) => Status::AwaitingFields,
            State::AwaitingRecords => Status::AwaitingRecords,
            State::Blocked => Status::Blocked,
            State::Done => Status::Done,
            State::Failed(kind) => Status::Failed(*kind),
            State::Stepping => Status::Failed(ErrorKind::InternalInconsistency),
        }
    }

    /// Whether decoding has stopped for good.
    pub fn is_terminated(&self) -> bool {
        matches!(self.status(), Status::Done | Status::Failed(_))
    }

    /// The header, once it and its fields have been decoded.
    pub fn header(&self) -> Option<&Header> {
        self.header.as_ref()
    }

    /// Number of records emitted so far.
    pub fn records_emitted(&self) -> u32 {
        self.sequence
    }

    pub fn codepage(&self) -> Codepage {
        self.codepage
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }

    /// Run the state machine until it can make no further progress.
    fn drive(&mut self, sink: &mut impl Sink) {
        if self.session.in_flight {
            debug!("Decoding already in progress.");
            return;
        }

        self.session.in_flight = true;

        loop {
            let state = mem::replace(&mut self.session.state, State::Stepping);

            self.session.state = match self.step(state, sink) {
                Left(state) => state,
                Right(state) => {
                    self.session.state = state;
                    break;
                }
            };
        }

        self.session.in_flight = false;
    }

    /// Attempt a single transition.
    ///
    /// Returns the successor state, on the left if the machine should step
    /// again, or on the right if it must wait for a notification.
    fn step(&mut self, state: State, sink: &mut impl Sink) -> Either<State, State> {
        match state {
            State::AwaitingHeader => {
                let bytes = match self.read(HEADER_LENGTH) {
                    Ok(Some(bytes)) => bytes,
                    Ok(None) => return self.short_read(State::AwaitingHeader, HEADER_LENGTH, sink),
                    Err(err) => return self.fail(err.into(), sink),
                };

                let Ok(header) = header::decode(&bytes) else {
                    return self.fail(Error::InternalInconsistency, sink);
                };

                debug!(
                    "Decoded header: {} ({:#04x}), {} records of {} bytes.",
                    header.format, header.version, header.record_count, header.record_length
                );

                if header.record_count == 0 || header.record_length == 0 {
                    let error = Error::EmptyFile {
                        records: header.record_count,
                        record_length: header.record_length,
                    };
                    return self.fail(error, sink);
                }

                if let Some(found) = self.source.total_length() {
                    let expected = header.expected_length();
                    if found != expected {
                        return self.fail(Error::SizeMismatch { expected, found }, sink);
                    }
                }

                Left(State::AwaitingFields(header))
            }
            State::AwaitingFields(mut header) => {
                let length = header.descriptor_block_length();

                let bytes = match self.read(length) {
                    Ok(Some(bytes)) => bytes,
                    Ok(None) => {
                        return self.short_read(State::AwaitingFields(header), length, sink);
                    }
                    Err(err) => return self.fail(err.into(), sink),
                };

                header.fields = descriptor::decode(&bytes);

                if header.fields.is_empty() {
                    return self.fail(Error::NoFields, sink);
                }

                debug!("Decoded {} field descriptors.", header.fields.len());

                if !header.fields_consistent() {
                    warn!(
                        "Field lengths do not add up to the record length ({} bytes).",
                        header.record_length
                    );
                }

                sink.header(&header);
                self.header = Some(header);

                Left(State::AwaitingRecords)
            }
            State::AwaitingRecords => {
                let Some(header) = &self.header else {
                    return self.fail(Error::InternalInconsistency, sink);
                };

                match self.source.try_read(header.record_length as usize) {
                    Ok(Some(bytes)) => {
                        self.sequence += 1;

                        let record =
                            record::decode(&bytes, &header.fields, self.codepage, self.sequence);
                        trace!("Decoded record {}.", record.sequence);

                        match sink.record(record) {
                            Demand::More => Left(State::AwaitingRecords),
                            Demand::Pause => {
                                debug!("Pausing after record {}.", self.sequence);
                                self.source.pause();
                                Right(State::Blocked)
                            }
                        }
                    }
                    Ok(None) if self.is_ended() => {
                        let remaining = self.source.buffered();
                        if remaining != 0 {
                            warn!("Ignoring {remaining} trailing bytes.");
                        }

                        if self.sequence != header.record_count {
                            warn!(
                                "Header declares {} records, but the source held {}.",
                                header.record_count, self.sequence
                            );
                        }

                        self.finish(sink)
                    }
                    Ok(None) => Right(State::AwaitingRecords),
                    Err(err) => self.fail(err.into(), sink),
                }
            }
            State::Blocked => Right(State::Blocked),
            State::Done => Right(State::Done),
            State::Failed(kind) => Right(State::Failed(kind)),
            State::Stepping => self.fail(Error::InternalInconsistency, sink),
        }
    }

    fn is_ended(&self) -> bool {
        self.session.ended || self.source.is_ended()
    }

    /// Take bytes from the source, noting how many remain buffered.
    fn read(&mut self, n: usize) -> io::Result<Option<Bytes>> {
        let bytes = self.source.try_read(n)?;
        if bytes.is_some() {
            self.session.seen = self.source.buffered();
        }

        Ok(bytes)
    }

    /// Handle a header or field descriptor read that found too few bytes.
    ///
    /// Every short read counts toward [`MAX_SHORT_READS`], but an attempt that
    /// finds more bytes than the previous one starts the count again. An ended
    /// source is retried immediately, as no further notification will arrive.
    fn short_read(
        &mut self,
        state: State,
        needed: usize,
        sink: &mut impl Sink,
    ) -> Either<State, State> {
        let available = self.source.buffered();

        if available > self.session.seen {
            self.session.short_reads = 1;
        } else {
            self.session.short_reads += 1;
        }

        self.session.seen = available;

        trace!(
            "Short read {} of {MAX_SHORT_READS} ({available} of {needed} bytes).",
            self.session.short_reads
        );

        if self.session.short_reads >= MAX_SHORT_READS {
            return self.fail(Error::Corrupted(ShortRead { needed, available }), sink);
        }

        if self.is_ended() {
            Left(state)
        } else {
            Right(state)
        }
    }

    fn fail(&mut self, error: Error, sink: &mut impl Sink) -> Either<State, State> {
        warn!("Decoding failed after {} records: {error}", self.sequence);

        let kind = error.kind();

        self.source.pause();
        sink.error(error);
        sink.end();

        Right(State::Failed(kind))
    }

    fn finish(&mut self, sink: &mut impl Sink) -> Either<State, State> {
        debug!("Decoded {} records.", self.sequence);

        self.source.pause();
        sink.end();

        Right(State::Done)
    }
}

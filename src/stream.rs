//! Incremental decoding under consumer backpressure.
//!
//! A [`Parser`] pulls bytes from a [`Source`] and pushes decoded units into a
//! [`Sink`]. It never blocks: whenever the source cannot supply the next unit
//! in full, the parser returns and waits to be notified again.
//!
//! # Driving a parser
//!
//! The application notifies the parser of three events:
//!
//! - [`Parser::on_readable`], when more bytes may be available from the
//! source.
//!
//! - [`Parser::on_end`], when the source has ended and no more bytes will
//! arrive.
//!
//! - [`Parser::on_demand`], when a sink that previously returned
//! [`Demand::Pause`] is ready for more records.
//!
//! Each notification runs the state machine until no further progress is
//! possible, then returns. The sink receives the `header` notification once,
//! before any record, then records in file order, then exactly one `end`
//! (preceded by one `error` if decoding failed).
//!
//! ```ignore
//! let mut parser = Parser::new(Feed::new());
//!
//! for chunk in chunks {
//!     parser.source_mut().push(&chunk);
//!     parser.on_readable(&mut sink);
//! }
//!
//! parser.source_mut().finish();
//! parser.on_end(&mut sink);
//! ```

pub mod parser;
pub mod sink;
pub mod source;

pub use parser::{Parser, Status};
pub use sink::{Demand, Sink};
pub use source::{Feed, ReaderSource, Source};

//! Pure decoders for the structural units of a table.
//!
//! Nothing in this module performs I/O or keeps state between calls. Each
//! decoder receives the bytes of exactly one unit and returns its decoded
//! form:
//!
//! - [`header::decode`] turns the leading 32 bytes into a [`Header`].
//!
//! - [`descriptor::decode`] turns the field descriptor block that follows into
//! an ordered list of [`FieldDescriptor`]s.
//!
//! - [`record::decode`] turns one fixed-length record into a [`Record`].
//!
//! Deciding when enough bytes are available, and what to do when they are not,
//! is left to the caller. See [`crate::stream`] for the state machine that
//! does so.

pub mod descriptor;
pub mod header;
pub mod record;
pub mod text;

pub use descriptor::FieldDescriptor;
pub use header::Header;
pub use record::{Record, Value};
pub use text::Codepage;

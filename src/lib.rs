//! An incremental, backpressure-aware decoder for dBase and FoxPro table
//! (`.dbf`) files.
//!
//! A table is a fixed 32-byte header, a block of 32-byte field descriptors,
//! and a run of fixed-length records. Dbfstream decodes each of these units as
//! soon as enough bytes have arrived, without holding the whole file in
//! memory, and stops emitting records whenever the consumer asks it to.
//!
//! Most users should begin with the functions, iterator and derive macros in
//! the [`avec`] module. Applications feeding bytes as they arrive (from a
//! socket, say) should drive a [`stream::Parser`] directly. The pure decoders
//! underneath both live in the [`sans`] module.
//!
//! ## Cargo Features
//!
//! The following crate feature flags are available:
//!
//! - `derive`: enable derive macros (default).

pub mod avec;
pub mod error;
pub mod sans;
pub mod stream;

pub use error::{Error, ErrorKind};

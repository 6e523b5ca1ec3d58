//! Errors ending a decoding session.

use thiserror::Error;

use crate::sans::{header::ShortRead, text::UnknownCodepage};

/// A fatal decoding error.
#[derive(Debug, Error)]
pub enum Error {
    /// An error from the underlying reader.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Bytes for the header or field descriptors stopped arriving.
    #[error("Truncated or corrupted table: {0}")]
    Corrupted(#[source] ShortRead),
    /// The header declares no records, or records of no length.
    #[error("Empty table ({records} records of {record_length} bytes).")]
    EmptyFile { records: u32, record_length: u16 },
    /// The header disagrees with the known length of the source.
    #[error("Header declares {expected} bytes, but the source holds {found}.")]
    SizeMismatch { expected: u64, found: u64 },
    /// The field descriptor block holds no complete descriptor.
    #[error("No field descriptors.")]
    NoFields,
    /// The decoder reached a state it should never be in.
    #[error("Internal decoder inconsistency.")]
    InternalInconsistency,
    /// The requested codepage is not known.
    #[error(transparent)]
    UnknownCodepage(#[from] UnknownCodepage),
}

/// The kind of an [`Error`].
///
/// Transient short reads are not errors until they escalate; see
/// [`ShortRead`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Corrupted,
    EmptyFile,
    SizeMismatch,
    NoFields,
    InternalInconsistency,
    Io,
    UnknownCodepage,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) => ErrorKind::Io,
            Self::Corrupted(_) => ErrorKind::Corrupted,
            Self::EmptyFile { .. } => ErrorKind::EmptyFile,
            Self::SizeMismatch { .. } => ErrorKind::SizeMismatch,
            Self::NoFields => ErrorKind::NoFields,
            Self::InternalInconsistency => ErrorKind::InternalInconsistency,
            Self::UnknownCodepage(_) => ErrorKind::UnknownCodepage,
        }
    }
}

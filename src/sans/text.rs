//! Text decoding for character data.

use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_8};
use thiserror::Error;

/// An encoding label not known to the WHATWG encoding registry.
#[derive(Debug, Error)]
#[error("Unknown codepage label ({0}).")]
pub struct UnknownCodepage(pub String);

/// The encoding used to turn field bytes into text.
///
/// Defaults to UTF-8. Byte sequences invalid in the chosen encoding decode to
/// the replacement character rather than failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Codepage(&'static Encoding);

impl Codepage {
    /// Look up a codepage by label, such as `"windows-1252"` or `"cp866"`.
    pub fn for_label(label: &str) -> Result<Self, UnknownCodepage> {
        Encoding::for_label(label.trim().as_bytes())
            .map(Self)
            .ok_or_else(|| UnknownCodepage(label.to_owned()))
    }

    /// The canonical name of this codepage.
    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// Decode bytes into text.
    pub fn decode<'a>(&self, r: &'a [u8]) -> Cow<'a, str> {
        self.0.decode_without_bom_handling(r).0
    }
}

impl Default for Codepage {
    fn default() -> Self {
        Self(UTF_8)
    }
}

impl From<&'static Encoding> for Codepage {
    fn from(encoding: &'static Encoding) -> Self {
        Self(encoding)
    }
}

//! Slice-based decoder implementation.

use log::debug;

use crate::{
    Error,
    sans::{Codepage, Header},
    stream::{Feed, Parser},
};

use super::{FromTable, Publisher};

/// Decode a whole table held in a slice, publishing to a receiver.
///
/// The slice length is checked against the header. Returns the header with its
/// fields.
///
/// This method is also re-exported as `dbfstream::avec::decode_slice`.
pub fn decode(r: &[u8], codepage: Codepage, o: &mut impl FromTable) -> Result<Header, Error> {
    debug!("Decoding a {} byte table as {}.", r.len(), codepage.name());

    let mut parser = Parser::with_codepage(Feed::from_slice(r), codepage);
    let mut publisher = Publisher::new(o);

    parser.on_end(&mut publisher);

    publisher.outcome()
}

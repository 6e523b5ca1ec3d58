//! The fixed table header.

use tartan_bitfield::bitfield;
use thiserror::Error;
use zerocopy::{
    FromBytes,
    byteorder::little_endian::{U16, U32},
};

use super::FieldDescriptor;

/// Length of the fixed header, in bytes.
pub const HEADER_LENGTH: usize = 32;

/// Fewer bytes were supplied than the unit being decoded occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Not enough bytes ({available} of {needed}).")]
pub struct ShortRead {
    pub needed: usize,
    pub available: usize,
}

/// The decoded table header.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    /// Raw format code (the version byte).
    pub version: u8,
    /// Name of the format code, or `"unknown"`.
    pub format: &'static str,
    /// Date of the last update.
    pub last_update: Date,
    /// Number of records declared by the header.
    pub record_count: u32,
    /// Length of the header and field descriptor block, in bytes.
    pub header_length: u16,
    /// Length of a single record, including its delete marker, in bytes.
    pub record_length: u16,
    /// Field descriptors, in file order. Empty until the descriptor block has
    /// been decoded.
    pub fields: Vec<FieldDescriptor>,
}

/// A calendar date as stored in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Date {
    pub year: u16,
    /// Month of the year, from 1.
    pub month: u8,
    pub day: u8,
}

bitfield! {
    struct Version(u8) {
        [0..3] level: u8,
        [7] has_memo,
    }
}

impl Header {
    /// Length of the field descriptor block following the fixed header.
    pub fn descriptor_block_length(&self) -> usize {
        (self.header_length as usize).saturating_sub(HEADER_LENGTH)
    }

    /// Total length of a file holding exactly the declared records.
    pub fn expected_length(&self) -> u64 {
        self.header_length as u64 + self.record_count as u64 * self.record_length as u64
    }

    /// Whether the format code announces an accompanying memo file.
    pub fn has_memo(&self) -> bool {
        Version(self.version).has_memo()
    }

    /// The dBase level encoded in the low bits of the format code.
    pub fn level(&self) -> u8 {
        Version(self.version).level()
    }

    /// Whether the field lengths and the delete marker add up to the record
    /// length.
    pub fn fields_consistent(&self) -> bool {
        let sum: usize = self.fields.iter().map(|f| f.length as usize).sum();
        sum + 1 == self.record_length as usize
    }
}

#[repr(C, packed)]
#[derive(FromBytes)]
struct TableHeader {
    version: u8,
    last_update: [u8; 3],
    record_count: U32,
    header_length: U16,
    record_length: U16,
    _reserved: [u8; 20],
}

/// Decode the fixed header from the first 32 bytes of a table.
///
/// The returned header has no fields attached. Content is never rejected,
/// however implausible; only a short buffer is an error.
pub fn decode(r: &[u8]) -> Result<Header, ShortRead> {
    let Ok((header, _)) = TableHeader::read_from_prefix(r) else {
        Err(ShortRead {
            needed: HEADER_LENGTH,
            available: r.len(),
        })?
    };

    let TableHeader {
        version,
        last_update: [year, month, day],
        record_count,
        header_length,
        record_length,
        ..
    } = header;

    Ok(Header {
        version,
        format: format_name(version),
        last_update: Date {
            year: 1900 + year as u16,
            month,
            day,
        },
        record_count: record_count.get(),
        header_length: header_length.get(),
        record_length: record_length.get(),
        fields: Vec::new(),
    })
}

/// Name a format code.
pub fn format_name(version: u8) -> &'static str {
    match version {
        0x02 => "FoxBASE",
        0x03 => "FoxBASE+/dBase III PLUS, no memo",
        0x30 => "Visual FoxPro",
        0x31 => "Visual FoxPro, autoincrement enabled",
        0x32 => "Visual FoxPro, Varchar, Varbinary, or Blob-enabled",
        0x43 => "dBASE IV SQL table files, no memo",
        0x63 => "dBASE IV SQL system files, no memo",
        0x83 => "FoxBASE+/dBASE III PLUS, with memo",
        0x8B => "dBASE IV with memo",
        0xCB => "dBASE IV SQL table files, with memo",
        0xF5 => "FoxPro 2.x (or earlier) with memo",
        0xE5 => "HiPer-Six format with SMT memo file",
        0xFB => "FoxBASE",
        _ => "unknown",
    }
}

//! Field descriptors.

use std::sync::Arc;

use tartan_bitfield::bitfield;
use zerocopy::{FromBytes, byteorder::little_endian::U32};

/// Length of one field descriptor entry, in bytes.
pub const DESCRIPTOR_LENGTH: usize = 32;

/// Metadata describing a single column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Column name, without its null padding.
    pub name: Arc<str>,
    /// Type code, such as `C`, `N` or `L`.
    pub kind: char,
    /// Offset of the field within a record, as declared. Not used for
    /// decoding.
    pub displacement: u32,
    /// Length of the field, in bytes.
    pub length: u8,
    /// Number of decimal places.
    pub decimals: u8,
    /// Raw field flags.
    pub flags: u8,
}

bitfield! {
    struct FieldFlags(u8) {
        [0] system,
        [1] nullable,
        [2] binary,
    }
}

impl FieldDescriptor {
    /// Whether the field is a hidden system column.
    pub fn is_system(&self) -> bool {
        FieldFlags(self.flags).system()
    }

    /// Whether the field may store null values.
    pub fn is_nullable(&self) -> bool {
        FieldFlags(self.flags).nullable()
    }

    /// Whether the field holds binary data.
    pub fn is_binary(&self) -> bool {
        FieldFlags(self.flags).binary()
    }
}

#[repr(C, packed)]
#[derive(FromBytes)]
struct Descriptor {
    name: [u8; 11],
    kind: u8,
    displacement: U32,
    length: u8,
    decimals: u8,
    flags: u8,
    _reserved: [u8; 13],
}

/// Decode a field descriptor block into descriptors, in file order.
///
/// The block is read as consecutive 32-byte entries. A trailing remainder
/// shorter than an entry (usually the `0x0D` terminator) is ignored, and a
/// block without any complete entry yields an empty list.
pub fn decode(r: &[u8]) -> Vec<FieldDescriptor> {
    r.chunks_exact(DESCRIPTOR_LENGTH)
        .filter_map(|entry| Descriptor::read_from_bytes(entry).ok())
        .map(|entry| {
            let Descriptor {
                name,
                kind,
                displacement,
                length,
                decimals,
                flags,
                ..
            } = entry;

            let end = name.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);

            FieldDescriptor {
                name: String::from_utf8_lossy(&name[..end]).into(),
                kind: kind as char,
                displacement: displacement.get(),
                length,
                decimals,
                flags,
            }
        })
        .collect()
}

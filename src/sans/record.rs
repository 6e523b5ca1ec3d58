//! Fixed-length records.

use std::{fmt, sync::Arc};

use super::{Codepage, FieldDescriptor};

/// Delete marker of a record that has not been deleted.
pub const ACTIVE_MARKER: u8 = b' ';

/// A decoded field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Character data, and any type without a dedicated decoding.
    Text(String),
    /// Numeric data. Blank or unparsable text decodes to `NaN`.
    Number(f64),
    /// Logical data.
    Logical(bool),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Logical(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(x) => write!(f, "{x}"),
            Self::Logical(b) => write!(f, "{b}"),
        }
    }
}

/// A decoded record.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Position of the record in the table, from 1.
    pub sequence: u32,
    /// Whether the record is marked as deleted.
    pub deleted: bool,
    /// Field values, in descriptor order.
    pub values: Vec<(Arc<str>, Value)>,
}

impl Record {
    /// Look up a value by field name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(n, _)| &**n == name)
            .map(|(_, v)| v)
    }
}

/// Decode one record.
///
/// Fields are located by accumulating declared lengths from the byte after
/// the delete marker; descriptor displacements are ignored. Bytes missing
/// from a short record decode as blank.
pub fn decode(r: &[u8], fields: &[FieldDescriptor], codepage: Codepage, sequence: u32) -> Record {
    let deleted = r.first().is_some_and(|b| *b != ACTIVE_MARKER);

    let mut offset = 1;
    let values = fields
        .iter()
        .map(|field| {
            let start = offset.min(r.len());
            offset += field.length as usize;
            let end = offset.min(r.len());

            let text = codepage.decode(&r[start..end]);
            (field.name.clone(), coerce(field.kind, text.trim()))
        })
        .collect();

    Record {
        sequence,
        deleted,
        values,
    }
}

/// Convert trimmed field text according to a type code.
///
/// Numeric text that is blank, unparsable or not finite (such as `inf`)
/// becomes `NaN`.
pub fn coerce(kind: char, text: &str) -> Value {
    match kind {
        'N' => Value::Number(
            text.parse()
                .ok()
                .filter(|x: &f64| x.is_finite())
                .unwrap_or(f64::NAN),
        ),
        'L' => Value::Logical(text.eq_ignore_ascii_case("t")),
        _ => Value::Text(text.to_owned()),
    }
}

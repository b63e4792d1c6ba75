//! Single-field decoding against a code table.
//!
//! Buckets are lower bounds: a decoded value means "at least this much" and is
//! never mapped back to an exact quantity.

use thiserror::Error;

use crate::econ::EconField;
use crate::tables::{Label, NameTable, ThresholdTable};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("'{code}' is not a base-36 digit")]
    InvalidGlyph { code: char },
    #[error("code '{code}' (level {index}) is outside a table of {len} entries")]
    OutOfRange { code: char, index: u32, len: usize },
    #[error("{field}: {source}")]
    Field {
        field: EconField,
        #[source]
        source: Box<DecodeError>,
    },
}

impl DecodeError {
    pub fn in_field(self, field: EconField) -> Self {
        DecodeError::Field {
            field,
            source: Box::new(self),
        }
    }
}

/// Integer value of a base-36 glyph (`0-9`, `a-z`, case-insensitive).
pub fn code_index(code: char) -> Result<u32, DecodeError> {
    code.to_digit(36)
        .ok_or(DecodeError::InvalidGlyph { code })
}

pub fn decode_threshold(code: char, table: &ThresholdTable) -> Result<u64, DecodeError> {
    let index = code_index(code)?;
    table
        .get(index as usize)
        .ok_or(DecodeError::OutOfRange {
            code,
            index,
            len: table.len(),
        })
}

/// Looks up the literal glyph, not its integer value.
pub fn decode_name(code: char, table: &NameTable) -> Result<&Label, DecodeError> {
    let index = code_index(code)?;
    table.get(code).ok_or(DecodeError::OutOfRange {
        code,
        index,
        len: table.len(),
    })
}

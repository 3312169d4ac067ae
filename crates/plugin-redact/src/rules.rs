//! Redaction rule parsing.
//!
//! Rules come from the extension configuration as repeated `rule` keys:
//!
//! ```text
//! rule = com.example.Vault ; sk-secret ; sk-******
//! rule = com.example.Vault ; hex:cafebabe ; hex:00000000
//! ```
//!
//! A rule has three `;`-separated fields: the unit it applies to, the byte
//! pattern to find, and the replacement. Fields are UTF-8 text; prefix a
//! field with `hex:` for binary patterns or patterns that contain `;`. The
//! replacement may be empty to delete matches.

use thiserror::Error;

use bytegate_core::types::unit::UnitName;

/// Why a rule line was rejected.
#[derive(Debug, Error)]
pub enum RuleError {
    /// The line does not split into exactly three fields.
    #[error("rule needs `<unit> ; <find> ; <replace>`, got {found} fields")]
    FieldCount {
        /// Number of fields found.
        found: usize,
    },

    /// A required field is empty.
    #[error("rule has an empty {0} field")]
    EmptyField(&'static str),

    /// A `hex:` field does not decode.
    #[error("invalid hex in {field} field: {source}")]
    InvalidHex {
        /// Which field failed to decode.
        field: &'static str,
        /// Decoder error.
        #[source]
        source: hex::FromHexError,
    },
}

/// One find/replace rule scoped to a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedactRule {
    /// Unit the rule applies to.
    pub unit: UnitName,
    /// Byte pattern to locate.
    pub find: Vec<u8>,
    /// Replacement bytes.
    pub replace: Vec<u8>,
}

impl RedactRule {
    /// Parse one rule value.
    pub fn parse(line: &str) -> Result<Self, RuleError> {
        let fields: Vec<&str> = line.split(';').map(str::trim).collect();
        if fields.len() != 3 {
            return Err(RuleError::FieldCount {
                found: fields.len(),
            });
        }
        if fields[0].is_empty() {
            return Err(RuleError::EmptyField("unit"));
        }

        let find = decode_pattern("find", fields[1])?;
        if find.is_empty() {
            return Err(RuleError::EmptyField("find"));
        }
        let replace = decode_pattern("replace", fields[2])?;

        Ok(Self {
            unit: UnitName::from(fields[0]),
            find,
            replace,
        })
    }
}

fn decode_pattern(field: &'static str, text: &str) -> Result<Vec<u8>, RuleError> {
    match text.strip_prefix("hex:") {
        Some(digits) => {
            hex::decode(digits.trim()).map_err(|source| RuleError::InvalidHex { field, source })
        }
        None => Ok(text.as_bytes().to_vec()),
    }
}

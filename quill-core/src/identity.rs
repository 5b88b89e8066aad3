//! Identity types for Quill entities
//!
//! Record identifiers are 12 bytes rendered as 24 lowercase hex characters:
//! a 4-byte big-endian unix-seconds prefix (so ids sort roughly by creation
//! time) followed by 8 random bytes. The wire/path representation is always
//! the hex form, and malformed ids are rejected at parse time - before any
//! store lookup can happen.

use crate::error::IdFormatError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Length of the hex form of an [`ObjectId`].
pub const OBJECT_ID_HEX_LEN: usize = 24;

/// Raw 12-byte record identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; 12]);

impl ObjectId {
    /// Generate a fresh identifier: 4-byte unix-seconds prefix + 8 random bytes.
    pub fn generate() -> Self {
        let secs = Utc::now().timestamp().max(0) as u32;
        let tail: [u8; 8] = rand::random();

        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..].copy_from_slice(&tail);
        Self(bytes)
    }

    /// Construct from raw bytes (used by tests and store backends).
    pub fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 12] {
        &self.0
    }

    /// Render as the canonical 24-character lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse the canonical 24-character hex form.
    ///
    /// Uppercase hex digits are accepted on input (the rendered form is
    /// always lowercase). Anything else is an [`IdFormatError`], never a
    /// silent "not found".
    pub fn parse_hex(input: &str) -> Result<Self, IdFormatError> {
        if input.len() != OBJECT_ID_HEX_LEN {
            return Err(IdFormatError::WrongLength {
                input: input.to_string(),
                len: input.len(),
            });
        }
        let decoded = hex::decode(input).map_err(|_| IdFormatError::NotHex {
            input: input.to_string(),
        })?;
        let mut bytes = [0u8; 12];
        bytes.copy_from_slice(&decoded);
        Ok(Self(bytes))
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = IdFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hex(s)
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Trait for strongly-typed entity identifiers.
///
/// Each record kind gets its own newtype so a `NoteId` can never be passed
/// where a `NotebookId` is expected. The API layer's path extractor is
/// generic over this trait and uses `ENTITY_NAME` for error messages.
pub trait EntityIdType:
    Copy + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    /// Human-readable entity name used in error messages.
    const ENTITY_NAME: &'static str;

    fn from_object_id(id: ObjectId) -> Self;

    fn object_id(&self) -> ObjectId;

    /// Generate a fresh id of this type.
    fn generate() -> Self {
        Self::from_object_id(ObjectId::generate())
    }

    /// Parse the 24-hex form into this id type.
    fn parse(input: &str) -> Result<Self, IdFormatError> {
        ObjectId::parse_hex(input).map(Self::from_object_id)
    }
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $entity_name:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(ObjectId);

        impl EntityIdType for $name {
            const ENTITY_NAME: &'static str = $entity_name;

            fn from_object_id(id: ObjectId) -> Self {
                Self(id)
            }

            fn object_id(&self) -> ObjectId {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = IdFormatError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$name as EntityIdType>::parse(s)
            }
        }
    };
}

entity_id!(
    /// Identifier for a [`crate::User`] record.
    UserId,
    "user"
);
entity_id!(
    /// Identifier for a [`crate::Notebook`] record.
    NotebookId,
    "notebook"
);
entity_id!(
    /// Identifier for a [`crate::Note`] record.
    NoteId,
    "note"
);


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_hex_round_trip(bytes in proptest::array::uniform12(any::<u8>())) {
            let id = ObjectId::from_bytes(bytes);
            let parsed = ObjectId::parse_hex(&id.to_hex()).unwrap();
            prop_assert_eq!(parsed, id);
        }

        #[test]
        fn prop_parse_never_panics(input in ".{0,64}") {
            let _ = ObjectId::parse_hex(&input);
        }
    }
}

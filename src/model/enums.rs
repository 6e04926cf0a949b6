//! Enumeration model and underlying-storage inference.

use crate::hashing;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed-width integer storage of an enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntegerType {
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
}

impl IntegerType {
    /// Storage type for an enum of `byte_size` bytes.
    ///
    /// Negative sizes count as 0; any size other than 1, 2, 4 or 8 falls back
    /// to a signed 32-bit type regardless of sign.
    pub fn from_size(byte_size: i64, signed: bool) -> Self {
        match (byte_size.max(0), signed) {
            (1, true) => IntegerType::Int8,
            (2, true) => IntegerType::Int16,
            (4, true) => IntegerType::Int32,
            (8, true) => IntegerType::Int64,
            (1, false) => IntegerType::UInt8,
            (2, false) => IntegerType::UInt16,
            (4, false) => IntegerType::UInt32,
            (8, false) => IntegerType::UInt64,
            _ => IntegerType::Int32,
        }
    }

    /// C spelling used in emitted headers.
    pub fn c_name(self) -> &'static str {
        match self {
            IntegerType::Int8 => "__int8",
            IntegerType::Int16 => "__int16",
            IntegerType::Int32 => "__int32",
            IntegerType::Int64 => "__int64",
            IntegerType::UInt8 => "__uint8",
            IntegerType::UInt16 => "__uint16",
            IntegerType::UInt32 => "__uint32",
            IntegerType::UInt64 => "__uint64",
        }
    }

    pub fn byte_width(self) -> u32 {
        match self {
            IntegerType::Int8 | IntegerType::UInt8 => 1,
            IntegerType::Int16 | IntegerType::UInt16 => 2,
            IntegerType::Int32 | IntegerType::UInt32 => 4,
            IntegerType::Int64 | IntegerType::UInt64 => 8,
        }
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            IntegerType::Int8 | IntegerType::Int16 | IntegerType::Int32 | IntegerType::Int64
        )
    }

    /// Two's-complement bits of `value` truncated to this type's width.
    pub fn mask(self, value: i64) -> u64 {
        let bits = self.byte_width() * 8;
        if bits == 64 {
            value as u64
        } else {
            (value as u64) & ((1u64 << bits) - 1)
        }
    }
}

impl fmt::Display for IntegerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.c_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumMember {
    pub name: String,
    pub value: i64,
}

impl EnumMember {
    pub fn new(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumModel {
    pub name: String,
    pub underlying_type: IntegerType,
    pub is_scoped: bool,
    /// Members in stream order
    pub members: Vec<EnumMember>,
}

impl EnumModel {
    /// Same members and storage, ignoring the name.
    pub fn same_content(&self, other: &EnumModel) -> bool {
        self.underlying_type == other.underlying_type
            && self.is_scoped == other.is_scoped
            && self.members == other.members
    }
}

/// Canonical text of a member list: `enum {A=0; B=1}`.
pub fn canonical_members(members: &[EnumMember]) -> String {
    let body = members
        .iter()
        .map(|m| format!("{}={}", m.name, m.value))
        .collect::<Vec<_>>()
        .join("; ");
    format!("enum {{{body}}}")
}

/// Deterministic name for an anonymous enum, derived from its members.
pub fn anonymous_name(members: &[EnumMember]) -> String {
    format!("${}", hashing::short_digest(canonical_members(members).as_bytes(), 8))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_sign_table() {
        let table = [
            (1, false, "__uint8"),
            (2, false, "__uint16"),
            (4, false, "__uint32"),
            (8, false, "__uint64"),
            (1, true, "__int8"),
            (2, true, "__int16"),
            (4, true, "__int32"),
            (8, true, "__int64"),
        ];
        for (size, signed, name) in table {
            assert_eq!(IntegerType::from_size(size, signed).c_name(), name);
        }
    }

    #[test]
    fn odd_or_negative_sizes_default_to_int32() {
        assert_eq!(IntegerType::from_size(0, false), IntegerType::Int32);
        assert_eq!(IntegerType::from_size(-4, false), IntegerType::Int32);
        assert_eq!(IntegerType::from_size(-1, true), IntegerType::Int32);
        assert_eq!(IntegerType::from_size(3, false), IntegerType::Int32);
        assert_eq!(IntegerType::from_size(16, true), IntegerType::Int32);
    }

    #[test]
    fn mask_truncates_to_width() {
        assert_eq!(IntegerType::Int8.mask(-1), 0xFF);
        assert_eq!(IntegerType::UInt16.mask(-2), 0xFFFE);
        assert_eq!(IntegerType::Int32.mask(-1), 0xFFFF_FFFF);
        assert_eq!(IntegerType::Int64.mask(-1), u64::MAX);
        assert_eq!(IntegerType::UInt32.mask(0x1_0000_0005), 5);
    }

    #[test]
    fn canonical_text() {
        let m = vec![EnumMember::new("A", 0), EnumMember::new("B", -1)];
        assert_eq!(canonical_members(&m), "enum {A=0; B=-1}");
        assert_eq!(canonical_members(&[]), "enum {}");
    }

    #[test]
    fn anonymous_names_follow_content() {
        let a = vec![EnumMember::new("X", 1), EnumMember::new("Y", 2)];
        let b = vec![EnumMember::new("X", 1), EnumMember::new("Y", 2)];
        let c = vec![EnumMember::new("X", 1), EnumMember::new("Y", 3)];
        assert_eq!(anonymous_name(&a), anonymous_name(&b));
        assert_ne!(anonymous_name(&a), anonymous_name(&c));
        let name = anonymous_name(&a);
        assert!(name.starts_with('$'));
        assert_eq!(name.len(), 17);
    }
}

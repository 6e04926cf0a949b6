//! User-defined type (struct/class) model.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UdtKind {
    Struct,
    Class,
}

impl UdtKind {
    pub fn keyword(self) -> &'static str {
        match self {
            UdtKind::Struct => "struct",
            UdtKind::Class => "class",
        }
    }
}

impl fmt::Display for UdtKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A data member with storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldModel {
    pub name: String,
    /// Resolved display type
    pub type_name: String,
    pub byte_offset: u64,
    pub bit_offset: u64,
    /// 0 unless the field is a bitfield
    pub bit_size: u64,
}

impl FieldModel {
    pub fn is_bitfield(&self) -> bool {
        self.bit_size != 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UdtModel {
    pub name: String,
    pub kind: UdtKind,
    pub size_bytes: u64,
    /// Base type names in declaration order
    pub bases: Vec<String>,
    /// Fields in stream order
    pub fields: Vec<FieldModel>,
}

impl UdtModel {
    pub fn new(name: impl Into<String>, kind: UdtKind) -> Self {
        Self {
            name: name.into(),
            kind,
            size_bytes: 0,
            bases: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// No fields and no bases: only the name is known.
    pub fn is_forward_declaration(&self) -> bool {
        self.fields.is_empty() && self.bases.is_empty()
    }
}

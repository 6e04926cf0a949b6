//! Debug-info entries with strongly typed attributes.
//!
//! Only the attributes the extractor consumes survive decoding; each one is a
//! variant of [`Attr`] with a typed payload, so downstream code never has to
//! inspect DWARF forms.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of an entry: its offset within `.debug_info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Offset(pub u64);

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl fmt::LowerHex for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

/// Entry kinds the extractor distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    Namespace,
    ClassType,
    StructType,
    EnumerationType,
    Enumerator,
    BaseType,
    PointerType,
    ReferenceType,
    ArrayType,
    TypedefType,
    ConstType,
    Member,
    Inheritance,
    /// Any other DWARF tag, kept so nesting can still be walked
    Other(u16),
}

impl Tag {
    /// Map a raw DWARF tag onto the catalog.
    pub fn from_dw(tag: gimli::DwTag) -> Self {
        match tag {
            gimli::DW_TAG_namespace => Tag::Namespace,
            gimli::DW_TAG_class_type => Tag::ClassType,
            gimli::DW_TAG_structure_type => Tag::StructType,
            gimli::DW_TAG_enumeration_type => Tag::EnumerationType,
            gimli::DW_TAG_enumerator => Tag::Enumerator,
            gimli::DW_TAG_base_type => Tag::BaseType,
            gimli::DW_TAG_pointer_type => Tag::PointerType,
            gimli::DW_TAG_reference_type => Tag::ReferenceType,
            gimli::DW_TAG_array_type => Tag::ArrayType,
            gimli::DW_TAG_typedef => Tag::TypedefType,
            gimli::DW_TAG_const_type => Tag::ConstType,
            gimli::DW_TAG_member => Tag::Member,
            gimli::DW_TAG_inheritance => Tag::Inheritance,
            other => Tag::Other(other.0),
        }
    }

    /// Whether other entries may point at this kind through a type reference.
    pub fn is_referenceable(self) -> bool {
        matches!(
            self,
            Tag::Namespace
                | Tag::ClassType
                | Tag::StructType
                | Tag::EnumerationType
                | Tag::BaseType
                | Tag::PointerType
                | Tag::ReferenceType
                | Tag::ArrayType
                | Tag::TypedefType
                | Tag::ConstType
        )
    }
}

/// A decoded attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Attr {
    /// `DW_AT_type`
    TypeRef(Offset),
    /// `DW_AT_byte_size`
    ByteSize(i64),
    /// `DW_AT_declaration`
    Declaration(bool),
    /// `DW_AT_enum_class`
    EnumClass(bool),
    /// `DW_AT_const_value`
    ConstValue(i64),
    /// `DW_AT_data_member_location`
    DataMemberLocation(i64),
    /// `DW_AT_bit_offset`
    BitOffset(i64),
    /// `DW_AT_bit_size`
    BitSize(i64),
    /// `DW_AT_containing_type`
    ContainingType(Offset),
}

/// One node of the debug-info tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugEntry {
    pub offset: Offset,
    pub tag: Tag,
    pub name: Option<String>,
    pub has_children: bool,
    pub attrs: Vec<Attr>,
}

impl DebugEntry {
    pub fn new(offset: u64, tag: Tag) -> Self {
        Self {
            offset: Offset(offset),
            tag,
            name: None,
            has_children: false,
            attrs: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_children(mut self) -> Self {
        self.has_children = true;
        self
    }

    pub fn with_attr(mut self, attr: Attr) -> Self {
        self.attrs.push(attr);
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn type_ref(&self) -> Option<Offset> {
        self.attrs.iter().find_map(|a| match a {
            Attr::TypeRef(o) => Some(*o),
            _ => None,
        })
    }

    pub fn byte_size(&self) -> Option<i64> {
        self.attrs.iter().find_map(|a| match a {
            Attr::ByteSize(v) => Some(*v),
            _ => None,
        })
    }

    pub fn is_declaration(&self) -> bool {
        self.attrs.iter().any(|a| matches!(a, Attr::Declaration(true)))
    }

    pub fn is_enum_class(&self) -> bool {
        self.attrs.iter().any(|a| matches!(a, Attr::EnumClass(true)))
    }

    pub fn const_value(&self) -> Option<i64> {
        self.attrs.iter().find_map(|a| match a {
            Attr::ConstValue(v) => Some(*v),
            _ => None,
        })
    }

    pub fn data_member_location(&self) -> Option<i64> {
        self.attrs.iter().find_map(|a| match a {
            Attr::DataMemberLocation(v) => Some(*v),
            _ => None,
        })
    }

    pub fn bit_offset(&self) -> Option<i64> {
        self.attrs.iter().find_map(|a| match a {
            Attr::BitOffset(v) => Some(*v),
            _ => None,
        })
    }

    pub fn bit_size(&self) -> Option<i64> {
        self.attrs.iter().find_map(|a| match a {
            Attr::BitSize(v) => Some(*v),
            _ => None,
        })
    }

    pub fn containing_type(&self) -> Option<Offset> {
        self.attrs.iter().find_map(|a| match a {
            Attr::ContainingType(o) => Some(*o),
            _ => None,
        })
    }
}

//! # Symbols Module
//!
//! RTTI symbol listing. Scans the static and dynamic symbol tables for
//! type-info records and pairs each with its demangled form.

use crate::demangle;
use crate::error::{ExtractError, Result};
use object::read::{Object, ObjectSymbol};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RttiKind {
    /// `_ZTI*`: the `std::type_info` object
    TypeInfo,
    /// `_ZTS*`: the type-name string
    TypeName,
    /// Any other symbol mentioning `RTTI` (MSVC-style descriptors)
    Descriptor,
}

impl RttiKind {
    pub fn classify(name: &str) -> Option<Self> {
        let bare = name.strip_prefix('_').filter(|s| s.starts_with("_Z")).unwrap_or(name);
        if bare.starts_with("_ZTI") {
            Some(RttiKind::TypeInfo)
        } else if bare.starts_with("_ZTS") {
            Some(RttiKind::TypeName)
        } else if name.contains("RTTI") {
            Some(RttiKind::Descriptor)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct RttiSymbol {
    pub name: String,
    pub kind: RttiKind,
    pub demangled: Option<String>,
}

/// RTTI symbols of the binary in `data`, sorted by name and deduplicated
/// across the static and dynamic tables.
pub fn rtti_symbols(data: &[u8]) -> Result<Vec<RttiSymbol>> {
    let obj = object::read::File::parse(data)
        .map_err(|e| ExtractError::open_failure("<memory>", e))?;

    let mut names = BTreeSet::new();
    for sym in obj.symbols().chain(obj.dynamic_symbols()) {
        if let Ok(name) = sym.name() {
            if !name.is_empty() {
                names.insert(name.to_string());
            }
        }
    }
    debug!(symbols = names.len(), "Scanning symbol tables for RTTI");

    let found: Vec<RttiSymbol> = names
        .into_iter()
        .filter_map(|name| {
            let kind = RttiKind::classify(&name)?;
            let demangled = demangle::demangle_one(&name).map(|r| r.demangled);
            Some(RttiSymbol {
                name,
                kind,
                demangled,
            })
        })
        .collect();
    info!(rtti = found.len(), "RTTI scan finished");
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_rtti_names() {
        assert_eq!(RttiKind::classify("_ZTI3Foo"), Some(RttiKind::TypeInfo));
        assert_eq!(RttiKind::classify("__ZTS3Foo"), Some(RttiKind::TypeName));
        assert_eq!(
            RttiKind::classify("??_R0?AVFoo@@@8 RTTI Type Descriptor"),
            Some(RttiKind::Descriptor)
        );
        assert_eq!(RttiKind::classify("_ZN3Foo3barEv"), None);
        assert_eq!(RttiKind::classify("main"), None);
    }

    #[test]
    fn non_object_input_fails() {
        assert!(matches!(
            rtti_symbols(b"\x00\x01\x02"),
            Err(ExtractError::OpenFailure { .. })
        ));
    }
}

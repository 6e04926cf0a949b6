//! Itanium C++ demangling for symbol listings.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemangleResult {
    pub original: String,
    pub demangled: String,
}

/// Itanium-mangled names start with `_Z` (or `__Z` on Mach-O).
pub fn looks_mangled(s: &str) -> bool {
    s.starts_with("_Z") || s.starts_with("__Z")
}

/// Attempt to demangle a single symbol. Returns None when not recognized.
pub fn demangle_one(s: &str) -> Option<DemangleResult> {
    if !looks_mangled(s) {
        return None;
    }
    let sym = cpp_demangle::Symbol::new(s).ok()?;
    Some(DemangleResult {
        original: s.to_string(),
        demangled: sym.to_string(),
    })
}

//! Resolves a chain of type-modifier entries down to a display name.
//!
//! Const qualification is carried along the chain; enum and typedef names
//! stop the walk, everything else (pointers, references, arrays) is looked
//! through to the type it refers to.

use crate::config::ResolverConfig;
use crate::dwarf::entry::{DebugEntry, Tag};
use crate::dwarf::index::OffsetIndex;
use crate::error::Anomaly;
use tracing::debug;

/// Outcome of a resolution, with the reason when the name is degraded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub name: String,
    pub anomaly: Option<Anomaly>,
}

impl Resolution {
    fn named(name: String) -> Self {
        Self { name, anomaly: None }
    }
}

pub struct TypeNameResolver<'i, 'a> {
    index: &'i OffsetIndex<'a>,
    config: &'i ResolverConfig,
}

impl<'i, 'a> TypeNameResolver<'i, 'a> {
    pub fn new(index: &'i OffsetIndex<'a>, config: &'i ResolverConfig) -> Self {
        Self { index, config }
    }

    pub fn index(&self) -> &'i OffsetIndex<'a> {
        self.index
    }

    /// Display name for `entry`; empty when the chain ends anonymously.
    pub fn resolve(&self, entry: &DebugEntry, is_const: bool) -> String {
        self.resolve_traced(entry, is_const).name
    }

    /// Like [`resolve`](Self::resolve), also reporting why a degraded marker
    /// was returned.
    pub fn resolve_traced(&self, entry: &DebugEntry, is_const: bool) -> Resolution {
        let mut current = entry;
        let mut is_const = is_const;
        let mut hops = 0usize;

        loop {
            if current.tag == Tag::ConstType {
                is_const = true;
            }

            if matches!(current.tag, Tag::EnumerationType | Tag::TypedefType) {
                if let Some(name) = current.name() {
                    return Resolution::named(qualify(name, is_const));
                }
            }

            let Some(target) = current.type_ref() else {
                return Resolution::named(
                    current
                        .name()
                        .map(|n| qualify(n, is_const))
                        .unwrap_or_default(),
                );
            };

            let Some(next) = self.index.get(target) else {
                debug!(from = %current.offset, target = %target, "Dangling type reference");
                return self.degraded(Anomaly::UnresolvedTypeReference {
                    from: current.offset,
                    target,
                });
            };

            hops += 1;
            if hops > self.config.max_depth {
                debug!(offset = %entry.offset, hops, "Type chain exceeded depth guard");
                return self.degraded(Anomaly::ReferenceCycle {
                    offset: entry.offset,
                });
            }
            current = next;
        }
    }

    fn degraded(&self, anomaly: Anomaly) -> Resolution {
        Resolution {
            name: self.config.unresolved_marker.clone(),
            anomaly: Some(anomaly),
        }
    }
}

fn qualify(name: &str, is_const: bool) -> String {
    if is_const {
        format!("const {name}")
    } else {
        name.to_string()
    }
}

//! Class/struct extraction.

use crate::config::ResolverConfig;
use crate::dwarf::entry::{DebugEntry, Tag};
use crate::dwarf::resolver::TypeNameResolver;
use crate::error::Anomaly;
use crate::extract::Diagnostics;
use crate::model::{FieldModel, UdtKind, UdtModel};
use tracing::{debug, trace};

pub struct UdtExtractor<'r, 'i, 'a> {
    resolver: &'r TypeNameResolver<'i, 'a>,
    config: &'r ResolverConfig,
}

impl<'r, 'i, 'a> UdtExtractor<'r, 'i, 'a> {
    pub fn new(resolver: &'r TypeNameResolver<'i, 'a>, config: &'r ResolverConfig) -> Self {
        Self { resolver, config }
    }

    /// Build the model for a class or struct entry from its direct children.
    ///
    /// Returns `None` for a forward declaration (no fields and no bases).
    /// Members without a data-member location (static members, pure
    /// declarations) are not fields.
    pub fn extract(
        &self,
        entry: &DebugEntry,
        children: &[&DebugEntry],
        diagnostics: &mut Diagnostics,
    ) -> Option<UdtModel> {
        let kind = match entry.tag {
            Tag::ClassType => UdtKind::Class,
            Tag::StructType => UdtKind::Struct,
            _ => return None,
        };

        let mut udt = UdtModel::new(entry.name().unwrap_or_default(), kind);
        udt.size_bytes = entry.byte_size().unwrap_or(0).max(0) as u64;

        self.collect_containing_type(entry, &mut udt, diagnostics);

        for kid in children {
            match kid.tag {
                Tag::Member => {
                    if let Some(field) = self.field(kid, diagnostics) {
                        udt.fields.push(field);
                    }
                }
                Tag::Inheritance => self.collect_inheritance(kid, &mut udt, diagnostics),
                _ => {}
            }
        }

        if udt.is_forward_declaration() {
            debug!(
                offset = %entry.offset,
                name = %udt.name,
                declaration = entry.is_declaration(),
                "Dropping UDT without fields or bases"
            );
            return None;
        }
        trace!(offset = %entry.offset, name = %udt.name, fields = udt.fields.len(), "UDT built");
        Some(udt)
    }

    fn collect_containing_type(
        &self,
        entry: &DebugEntry,
        udt: &mut UdtModel,
        diagnostics: &mut Diagnostics,
    ) {
        let Some(target) = entry.containing_type() else {
            return;
        };
        // Vtable holders commonly point back at the record itself.
        if target == entry.offset {
            return;
        }
        match self.resolver.index().get(target).and_then(|t| t.name()) {
            Some(name) => push_base(udt, name.to_string()),
            None => diagnostics.record(Anomaly::UnresolvedTypeReference {
                from: entry.offset,
                target,
            }),
        }
    }

    fn collect_inheritance(
        &self,
        kid: &DebugEntry,
        udt: &mut UdtModel,
        diagnostics: &mut Diagnostics,
    ) {
        let Some(target) = kid.type_ref() else {
            diagnostics.record(Anomaly::malformed(kid.offset, "inheritance without a type"));
            return;
        };
        let Some(base) = self.resolver.index().get(target) else {
            diagnostics.record(Anomaly::UnresolvedTypeReference {
                from: kid.offset,
                target,
            });
            return;
        };
        let resolution = self.resolver.resolve_traced(base, false);
        match resolution.anomaly {
            Some(anomaly) => diagnostics.record(anomaly),
            None if resolution.name.is_empty() => {}
            None => push_base(udt, resolution.name),
        }
    }

    fn field(&self, kid: &DebugEntry, diagnostics: &mut Diagnostics) -> Option<FieldModel> {
        let Some(location) = kid.data_member_location() else {
            trace!(offset = %kid.offset, "Member without storage skipped");
            return None;
        };

        let type_name = match kid.type_ref() {
            None => {
                diagnostics.record(Anomaly::malformed(kid.offset, "member without a type"));
                self.config.unsupported_marker.clone()
            }
            Some(target) => match self.resolver.index().get(target) {
                None => {
                    diagnostics.record(Anomaly::UnresolvedTypeReference {
                        from: kid.offset,
                        target,
                    });
                    self.config.unsupported_marker.clone()
                }
                Some(ty) => {
                    let resolution = self.resolver.resolve_traced(ty, false);
                    if let Some(anomaly) = resolution.anomaly {
                        diagnostics.record(anomaly);
                    }
                    resolution.name
                }
            },
        };

        Some(FieldModel {
            name: kid.name().unwrap_or_default().to_string(),
            type_name,
            byte_offset: non_negative(location),
            bit_offset: non_negative(kid.bit_offset().unwrap_or(0)),
            bit_size: non_negative(kid.bit_size().unwrap_or(0)),
        })
    }
}

fn push_base(udt: &mut UdtModel, name: String) {
    if !udt.bases.contains(&name) {
        udt.bases.push(name);
    }
}

fn non_negative(v: i64) -> u64 {
    v.max(0) as u64
}

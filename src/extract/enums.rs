//! Enumeration extraction.

use crate::dwarf::entry::{DebugEntry, Tag};
use crate::error::Anomaly;
use crate::extract::Diagnostics;
use crate::model::enums::anonymous_name;
use crate::model::{EnumMember, EnumModel, IntegerType};
use tracing::trace;

#[derive(Debug, Default, Clone, Copy)]
pub struct EnumExtractor;

impl EnumExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Build the model for an enumeration entry from its direct children.
    ///
    /// Enumerators keep stream order. A missing name becomes `""` and a
    /// missing value `0`, both reported as malformed. Anonymous enums are
    /// named after a digest of their member list.
    pub fn extract(
        &self,
        entry: &DebugEntry,
        children: &[&DebugEntry],
        diagnostics: &mut Diagnostics,
    ) -> EnumModel {
        debug_assert_eq!(entry.tag, Tag::EnumerationType);

        let mut members = Vec::with_capacity(children.len());
        for kid in children.iter().filter(|k| k.tag == Tag::Enumerator) {
            let name = match kid.name() {
                Some(n) => n.to_string(),
                None => {
                    diagnostics.record(Anomaly::malformed(kid.offset, "enumerator without a name"));
                    String::new()
                }
            };
            let value = match kid.const_value() {
                Some(v) => v,
                None => {
                    diagnostics.record(Anomaly::malformed(
                        kid.offset,
                        "enumerator without a constant value",
                    ));
                    0
                }
            };
            members.push(EnumMember { name, value });
        }

        let signed = members.iter().any(|m| m.value < 0);
        let underlying_type = IntegerType::from_size(entry.byte_size().unwrap_or(0), signed);

        let name = match entry.name() {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => anonymous_name(&members),
        };
        trace!(offset = %entry.offset, name = %name, members = members.len(), "Enum built");

        EnumModel {
            name,
            underlying_type,
            is_scoped: entry.is_enum_class(),
            members,
        }
    }
}

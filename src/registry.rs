//! Name-keyed store of extracted models.
//!
//! Types recur across compile units, so every insertion is a merge: the most
//! complete definition seen under a name wins and a complete definition is
//! never replaced by an incomplete one. Iteration follows first-insertion
//! order, which keeps emitted output stable for identical input.

use crate::model::{EnumModel, UdtModel};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Default, Clone, Serialize)]
pub struct ModelRegistry {
    enums: IndexMap<String, EnumModel>,
    udts: IndexMap<String, UdtModel>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or merge an enum, returning the name it is stored under.
    ///
    /// Identical content under the same name is deduplicated; a stored enum
    /// without members gives way to one with members. Any other clash is
    /// stored under the first free `NAME_N` slot (or merged into an identical
    /// one), so repeated runs produce the same names.
    pub fn upsert_enum(&mut self, name: &str, mut model: EnumModel) -> String {
        let mut candidate = name.to_string();
        let mut suffix = 0usize;
        loop {
            match self.enums.get_mut(&candidate) {
                None => {
                    model.name = candidate.clone();
                    self.enums.insert(candidate.clone(), model);
                    return candidate;
                }
                Some(existing) if existing.same_content(&model) => return candidate,
                Some(existing) if existing.members.is_empty() && !model.members.is_empty() => {
                    debug!(name = %candidate, "Replacing memberless enum");
                    model.name = candidate.clone();
                    *existing = model;
                    return candidate;
                }
                Some(_) if model.members.is_empty() => {
                    // A declaration adds nothing to a stored definition.
                    return candidate;
                }
                Some(_) => {
                    suffix += 1;
                    candidate = format!("{name}_{suffix}");
                    debug!(name, disambiguated = %candidate, "Enum name collision");
                }
            }
        }
    }

    /// Insert or merge a UDT. The stored model is replaced only when it has no
    /// fields and the incoming one does.
    pub fn upsert_udt(&mut self, name: &str, model: UdtModel) {
        match self.udts.get_mut(name) {
            None => {
                self.udts.insert(name.to_string(), model);
            }
            Some(existing) if existing.fields.is_empty() && !model.fields.is_empty() => {
                debug!(name, fields = model.fields.len(), "Completing UDT definition");
                *existing = model;
            }
            Some(_) => {}
        }
    }

    pub fn get_enum(&self, name: &str) -> Option<&EnumModel> {
        self.enums.get(name)
    }

    /// Stored UDT, including forward declarations.
    pub fn get_udt(&self, name: &str) -> Option<&UdtModel> {
        self.udts.get(name)
    }

    pub fn enums(&self) -> impl Iterator<Item = &EnumModel> {
        self.enums.values()
    }

    /// Exportable UDTs: forward declarations are left out.
    pub fn udts(&self) -> impl Iterator<Item = &UdtModel> {
        self.udts.values().filter(|u| !u.is_forward_declaration())
    }

    pub fn enum_count(&self) -> usize {
        self.enums.len()
    }

    pub fn udt_count(&self) -> usize {
        self.udts().count()
    }

    pub fn to_json_string(&self) -> serde_json::Result<String> {
        #[derive(Serialize)]
        struct Export<'r> {
            enums: Vec<&'r EnumModel>,
            udts: Vec<&'r UdtModel>,
        }
        serde_json::to_string_pretty(&Export {
            enums: self.enums().collect(),
            udts: self.udts().collect(),
        })
    }
}

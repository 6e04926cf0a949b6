//! Offset → entry map for every entry that can be the target of a type
//! reference. Built in one full pass before any resolution happens, since an
//! entry may reference one that appears later in the stream.

use crate::dwarf::entry::{DebugEntry, Offset};
use crate::dwarf::stream::{EntryStream, StreamItem};
use crate::error::Result;
use std::collections::HashMap;
use tracing::{debug, info_span};

#[derive(Debug, Default, Clone)]
pub struct OffsetIndex<'a> {
    by_offset: HashMap<Offset, &'a DebugEntry>,
}

impl<'a> OffsetIndex<'a> {
    /// Consume `stream` from its start, then rewind it for the next pass.
    pub fn build<S: EntryStream<'a>>(stream: &mut S) -> Result<Self> {
        let _span = info_span!("index_pass").entered();
        stream.seek_to_start();

        let mut by_offset = HashMap::new();
        let mut scanned = 0usize;
        while let Some(item) = stream.next_item()? {
            if let StreamItem::Entry(entry) = item {
                scanned += 1;
                if entry.tag.is_referenceable() {
                    by_offset.insert(entry.offset, entry);
                }
            }
        }
        stream.seek_to_start();

        debug!(scanned, indexed = by_offset.len(), "Offset index built");
        Ok(Self { by_offset })
    }

    pub fn get(&self, offset: Offset) -> Option<&'a DebugEntry> {
        self.by_offset.get(&offset).copied()
    }

    pub fn len(&self) -> usize {
        self.by_offset.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_offset.is_empty()
    }
}

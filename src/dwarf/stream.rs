//! Sequential, rewindable access to debug-info entries.
//!
//! Entries are stored in linear definition order inside an [`EntryArena`];
//! nesting is implied by each entry's children flag and explicit
//! end-of-children markers, exactly as the entries appear in `.debug_info`.

use crate::dwarf::entry::DebugEntry;
use crate::error::Result;

/// One element read from an entry stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamItem<'a> {
    Entry(&'a DebugEntry),
    /// Closes the innermost entry that declared children
    EndOfChildren,
}

/// Cursor over a linear entry sequence.
///
/// `Ok(None)` marks the normal end of the stream.
pub trait EntryStream<'a> {
    fn next_item(&mut self) -> Result<Option<StreamItem<'a>>>;

    fn seek_to_start(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot {
    Entry(DebugEntry),
    End,
}

/// Owned storage for a decoded entry sequence.
#[derive(Debug, Clone, Default)]
pub struct EntryArena {
    slots: Vec<Slot>,
    entries: usize,
}

impl EntryArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_entry(&mut self, entry: DebugEntry) {
        self.entries += 1;
        self.slots.push(Slot::Entry(entry));
    }

    pub fn push_end(&mut self) {
        self.slots.push(Slot::End);
    }

    /// Number of entries, markers excluded.
    pub fn entry_count(&self) -> usize {
        self.entries
    }

    /// Number of stream elements, markers included.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Entries in stream order, markers skipped.
    pub fn entries(&self) -> impl Iterator<Item = &DebugEntry> {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Entry(e) => Some(e),
            Slot::End => None,
        })
    }

    pub fn stream(&self) -> ArenaStream<'_> {
        ArenaStream {
            slots: &self.slots,
            pos: 0,
        }
    }
}

/// [`EntryStream`] over an [`EntryArena`].
#[derive(Debug, Clone)]
pub struct ArenaStream<'a> {
    slots: &'a [Slot],
    pos: usize,
}

impl<'a> ArenaStream<'a> {
    /// Current cursor position in stream elements.
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl<'a> EntryStream<'a> for ArenaStream<'a> {
    fn next_item(&mut self) -> Result<Option<StreamItem<'a>>> {
        let Some(slot) = self.slots.get(self.pos) else {
            return Ok(None);
        };
        self.pos += 1;
        Ok(Some(match slot {
            Slot::Entry(e) => StreamItem::Entry(e),
            Slot::End => StreamItem::EndOfChildren,
        }))
    }

    fn seek_to_start(&mut self) {
        self.pos = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dwarf::entry::Tag;

    fn sample() -> EntryArena {
        let mut arena = EntryArena::new();
        arena.push_entry(DebugEntry::new(0xb, Tag::Other(0x11)).with_children());
        arena.push_entry(DebugEntry::new(0x20, Tag::BaseType).with_name("int"));
        arena.push_end();
        arena
    }

    #[test]
    fn yields_entries_then_markers_then_none() {
        let arena = sample();
        let mut s = arena.stream();
        assert!(matches!(s.next_item().unwrap(), Some(StreamItem::Entry(e)) if e.offset.0 == 0xb));
        assert!(matches!(s.next_item().unwrap(), Some(StreamItem::Entry(e)) if e.name() == Some("int")));
        assert_eq!(s.next_item().unwrap(), Some(StreamItem::EndOfChildren));
        assert_eq!(s.next_item().unwrap(), None);
        assert_eq!(s.next_item().unwrap(), None);
    }

    #[test]
    fn seek_to_start_rewinds() {
        let arena = sample();
        let mut s = arena.stream();
        while s.next_item().unwrap().is_some() {}
        assert_eq!(s.position(), 3);
        s.seek_to_start();
        assert_eq!(s.position(), 0);
        assert!(matches!(s.next_item().unwrap(), Some(StreamItem::Entry(_))));
    }

    #[test]
    fn counts_exclude_markers() {
        let arena = sample();
        assert_eq!(arena.entry_count(), 2);
        assert_eq!(arena.len(), 3);
        assert!(!arena.is_empty());
        assert!(EntryArena::new().is_empty());
    }
}

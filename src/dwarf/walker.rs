//! Direct-children iteration over the linear entry stream.
//!
//! Some producers (clang in particular) nest composite entries, such as an
//! inline type definition, inside a record. A depth counter makes sure only
//! the parent's true direct children are reported; anything that declares
//! children of its own is consumed together with its whole subtree.

use crate::dwarf::entry::DebugEntry;
use crate::dwarf::stream::{EntryStream, StreamItem};
use crate::error::Result;
use tracing::trace;

pub struct TreeWalker;

impl TreeWalker {
    /// Children of `parent`, read from the stream positioned right after it.
    ///
    /// Single use: the sequence advances the shared cursor and cannot be
    /// restarted. A parent without the children flag yields nothing and
    /// leaves the cursor untouched.
    pub fn direct_children<'s, 'a, S: EntryStream<'a>>(
        parent: &DebugEntry,
        stream: &'s mut S,
    ) -> DirectChildren<'s, 'a, S> {
        DirectChildren {
            stream,
            extra_depth: 0,
            done: !parent.has_children,
            _entries: std::marker::PhantomData,
        }
    }
}

pub struct DirectChildren<'s, 'a, S: EntryStream<'a>> {
    stream: &'s mut S,
    extra_depth: usize,
    done: bool,
    _entries: std::marker::PhantomData<&'a DebugEntry>,
}

impl<'s, 'a, S: EntryStream<'a>> DirectChildren<'s, 'a, S> {
    fn advance(&mut self) -> Result<Option<&'a DebugEntry>> {
        loop {
            let Some(item) = self.stream.next_item()? else {
                return Ok(None);
            };
            match item {
                StreamItem::EndOfChildren if self.extra_depth > 0 => {
                    self.extra_depth -= 1;
                }
                StreamItem::EndOfChildren => return Ok(None),
                StreamItem::Entry(entry) => {
                    if entry.has_children {
                        self.extra_depth += 1;
                    }
                    if self.extra_depth > 0 {
                        trace!(offset = %entry.offset, "Skipping nested entry");
                        continue;
                    }
                    return Ok(Some(entry));
                }
            }
        }
    }
}

impl<'s, 'a, S: EntryStream<'a>> Iterator for DirectChildren<'s, 'a, S> {
    type Item = Result<&'a DebugEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.advance() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

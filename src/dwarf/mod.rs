//! Debug-info entry graph: decoding, indexing, walking and type naming.

pub mod entry;
pub mod index;
pub mod resolver;
pub mod session;
pub mod stream;
pub mod walker;

pub use entry::{Attr, DebugEntry, Offset, Tag};
pub use index::OffsetIndex;
pub use resolver::{Resolution, TypeNameResolver};
pub use session::Session;
pub use stream::{ArenaStream, EntryArena, EntryStream, StreamItem};
pub use walker::{DirectChildren, TreeWalker};

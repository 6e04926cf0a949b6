//! Canonical type models produced by extraction and consumed by the emitter.

pub mod enums;
pub mod udt;

pub use enums::{EnumMember, EnumModel, IntegerType};
pub use udt::{FieldModel, UdtKind, UdtModel};

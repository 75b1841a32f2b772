//! Object and type model
//!
//! Value types yielded during snapshot traversal. An [`ObjectRecord`] is a
//! read-only per-object view; addresses are opaque handles that remain valid
//! as plain values after the snapshot is released, though re-resolving them
//! requires a live snapshot.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque object handle, unique within one snapshot
pub type Address = u64;

/// Generation index for objects outside generational collection
pub const NO_GENERATION: i8 = -1;

/// Number of generation counters (index 0 reserved for "no generation",
/// generations 0..2 stored at `index + 1`)
pub const GENERATION_SLOTS: usize = 4;

/// Dense index into the snapshot's type table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeId(pub u32);

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type#{}", self.0)
    }
}

/// A named field of a type, identified by its byte offset within instances
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub offset: u64,
    /// Field name from runtime metadata, when resolved
    pub name: Option<String>,
}

/// Resolved type metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRecord {
    pub name: String,
    pub is_string: bool,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

impl TypeRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_string: false,
            fields: Vec::new(),
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_string: true,
            fields: Vec::new(),
        }
    }

    /// Look up the declared name of the field at `offset`
    pub fn field_name(&self, offset: u64) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.offset == offset)
            .and_then(|f| f.name.as_deref())
    }
}

/// Per-object view supplied during traversal
///
/// `type_id` is `None` when the runtime could not resolve the object's type;
/// such objects are free/unresolvable space, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectRecord {
    pub address: Address,
    pub type_id: Option<TypeId>,
    pub generation: i8,
}

/// One reference-typed slot of an object: byte offset and the address it
/// holds, if non-null
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSlot {
    pub offset: u64,
    pub value: Option<Address>,
}

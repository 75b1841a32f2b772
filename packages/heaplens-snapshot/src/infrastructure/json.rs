//! JSON dump adapter
//!
//! Fixture/interchange format for heap dumps. Real product dump containers
//! are parsed by their own tooling; this adapter exists so analyses can be
//! driven end-to-end from a file on disk.
//!
//! Format sketch:
//!
//! ```json
//! {
//!   "char_width_bytes": 2,
//!   "types": [
//!     { "name": "System.String", "is_string": true },
//!     { "name": "MyApp.Session", "fields": [{ "offset": 8, "name": "_name" }] }
//!   ],
//!   "segments": [
//!     {
//!       "ephemeral": true,
//!       "objects": [
//!         { "address": 4096, "type": 0, "generation": 0, "size": 24, "string": "foo" },
//!         { "address": 8192, "type": 1, "generation": 1, "size": 32,
//!           "fields": [{ "offset": 8, "value": 4096 }] }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! `"type": null` marks an object whose type the runtime could not resolve.

use crate::domain::{
    FieldDef, FieldSlot, HeapSnapshot, SegmentInfo, TypeId, TypeRecord, NO_GENERATION,
};
use crate::error::{Result, SnapshotError};
use crate::infrastructure::memory::{MemorySnapshot, SnapshotBuilder};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

fn default_char_width() -> u32 {
    2
}

fn default_generation() -> i8 {
    NO_GENERATION
}

#[derive(Debug, Serialize, Deserialize)]
struct DumpFile {
    #[serde(default = "default_char_width")]
    char_width_bytes: u32,
    types: Vec<DumpType>,
    segments: Vec<DumpSegment>,
}

#[derive(Debug, Serialize, Deserialize)]
struct DumpType {
    name: String,
    #[serde(default)]
    is_string: bool,
    #[serde(default)]
    fields: Vec<DumpField>,
}

#[derive(Debug, Serialize, Deserialize)]
struct DumpField {
    offset: u64,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct DumpSegment {
    #[serde(default)]
    ephemeral: bool,
    #[serde(default)]
    large: bool,
    objects: Vec<DumpObject>,
}

#[derive(Debug, Serialize, Deserialize)]
struct DumpObject {
    address: u64,
    #[serde(rename = "type")]
    type_index: Option<u32>,
    #[serde(default = "default_generation")]
    generation: i8,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    string: Option<String>,
    #[serde(default)]
    fields: Vec<DumpSlot>,
}

#[derive(Debug, Serialize, Deserialize)]
struct DumpSlot {
    offset: u64,
    #[serde(default)]
    value: Option<u64>,
}

/// Open and materialize a JSON heap dump
pub fn open(path: impl AsRef<Path>) -> Result<MemorySnapshot> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|e| {
        SnapshotError::dump_load(format!("Cannot open dump {}", path.display())).with_source(e)
    })?;
    let snapshot = parse(&raw)?;
    info!(
        "Opened dump {} ({} segments, {} objects)",
        path.display(),
        snapshot.segments().len(),
        snapshot.object_count_hint().unwrap_or(0)
    );
    Ok(snapshot)
}

/// Parse a JSON heap dump from memory
pub fn parse(raw: &str) -> Result<MemorySnapshot> {
    let dump: DumpFile = serde_json::from_str(raw)?;

    let type_count = dump.types.len() as u32;
    let mut builder = SnapshotBuilder::new().char_width_bytes(dump.char_width_bytes);

    for ty in dump.types {
        let mut record = if ty.is_string {
            TypeRecord::string(ty.name)
        } else {
            TypeRecord::new(ty.name)
        };
        record.fields = ty
            .fields
            .into_iter()
            .map(|f| FieldDef {
                offset: f.offset,
                name: f.name,
            })
            .collect();
        builder.add_type(record);
    }

    for seg in dump.segments {
        let index = builder.segment(SegmentInfo {
            is_ephemeral: seg.ephemeral,
            is_large: seg.large,
        });
        for obj in seg.objects {
            let Some(type_index) = obj.type_index else {
                builder.push_unresolved(index, obj.address);
                continue;
            };
            if type_index >= type_count {
                return Err(SnapshotError::dump_load(format!(
                    "Object {:#x} references type {} but dump declares {} types",
                    obj.address, type_index, type_count
                )));
            }
            let type_id = TypeId(type_index);
            let fields = obj
                .fields
                .into_iter()
                .map(|s| FieldSlot {
                    offset: s.offset,
                    value: s.value,
                })
                .collect();
            match obj.string {
                Some(content) => {
                    builder.push_string(index, obj.address, type_id, obj.size, obj.generation, content)
                }
                None => builder.push_object_with_fields(
                    index,
                    obj.address,
                    type_id,
                    obj.size,
                    obj.generation,
                    fields,
                ),
            }
        }
    }

    Ok(builder.build())
}

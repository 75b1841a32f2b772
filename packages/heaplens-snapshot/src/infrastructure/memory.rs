//! In-memory snapshot
//!
//! [`MemorySnapshot`] is a fully materialized [`HeapSnapshot`] used by the
//! JSON dump adapter, tests and benches. [`SnapshotBuilder`] constructs one
//! programmatically; a segment can be poisoned to simulate a heap whose
//! layout becomes unwalkable mid-scan.

use crate::domain::{
    Address, FieldSlot, HeapSnapshot, ObjectRecord, SegmentInfo, TypeId, TypeRecord, NO_GENERATION,
};
use crate::error::{Result, SnapshotError};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone)]
struct StoredObject {
    address: Address,
    type_id: Option<TypeId>,
    generation: i8,
    size: u64,
    string: Option<String>,
    fields: Vec<FieldSlot>,
}

impl StoredObject {
    fn record(&self) -> ObjectRecord {
        ObjectRecord {
            address: self.address,
            type_id: self.type_id,
            generation: self.generation,
        }
    }
}

#[derive(Debug, Clone)]
struct SegmentData {
    info: SegmentInfo,
    objects: Vec<StoredObject>,
    /// Walk fails after yielding this many objects
    poison_at: Option<usize>,
}

/// Fully materialized heap snapshot
#[derive(Debug)]
pub struct MemorySnapshot {
    types: Vec<TypeRecord>,
    segments: Vec<SegmentData>,
    segment_infos: Vec<SegmentInfo>,
    by_address: FxHashMap<Address, (usize, usize)>,
    char_width: u32,
    object_count: u64,
}

impl MemorySnapshot {
    pub fn builder() -> SnapshotBuilder {
        SnapshotBuilder::new()
    }

    fn stored(&self, address: Address) -> Option<&StoredObject> {
        let (seg, idx) = *self.by_address.get(&address)?;
        Some(&self.segments[seg].objects[idx])
    }
}

impl HeapSnapshot for MemorySnapshot {
    fn segments(&self) -> &[SegmentInfo] {
        &self.segment_infos
    }

    fn objects(&self, segment: usize) -> Box<dyn Iterator<Item = Result<ObjectRecord>> + '_> {
        let Some(seg) = self.segments.get(segment) else {
            return Box::new(std::iter::empty());
        };
        let walkable = seg.poison_at.unwrap_or(seg.objects.len()).min(seg.objects.len());
        let head = seg.objects[..walkable].iter().map(|o| Ok(o.record()));
        let tail = seg.poison_at.map(move |_| {
            Err(SnapshotError::unwalkable(format!(
                "segment {segment} layout inconsistent after {walkable} objects"
            )))
        });
        Box::new(head.chain(tail))
    }

    fn type_count(&self) -> u32 {
        self.types.len() as u32
    }

    fn type_record(&self, id: TypeId) -> Option<&TypeRecord> {
        self.types.get(id.0 as usize)
    }

    fn object_size(&self, _id: TypeId, address: Address) -> u64 {
        self.stored(address).map(|o| o.size).unwrap_or(0)
    }

    fn string_value(&self, _id: TypeId, address: Address) -> Result<String> {
        let stored = self
            .stored(address)
            .ok_or_else(|| SnapshotError::bad_address(address))?;
        stored
            .string
            .clone()
            .ok_or_else(|| SnapshotError::not_a_string(address))
    }

    fn fields(&self, address: Address) -> Box<dyn Iterator<Item = FieldSlot> + '_> {
        match self.stored(address) {
            Some(stored) => Box::new(stored.fields.iter().copied()),
            None => Box::new(std::iter::empty()),
        }
    }

    fn char_width_bytes(&self) -> u32 {
        self.char_width
    }

    fn object_count_hint(&self) -> Option<u64> {
        Some(self.object_count)
    }
}

/// Programmatic snapshot construction
#[derive(Debug)]
pub struct SnapshotBuilder {
    types: Vec<TypeRecord>,
    segments: Vec<SegmentData>,
    char_width: u32,
}

impl Default for SnapshotBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self {
            types: Vec::new(),
            segments: Vec::new(),
            char_width: 2,
        }
    }

    pub fn char_width_bytes(mut self, width: u32) -> Self {
        self.char_width = width;
        self
    }

    /// Register a type; returns its dense id
    pub fn add_type(&mut self, record: TypeRecord) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(record);
        id
    }

    /// Add a segment with explicit flags; returns its index
    pub fn segment(&mut self, info: SegmentInfo) -> usize {
        self.segments.push(SegmentData {
            info,
            objects: Vec::new(),
            poison_at: None,
        });
        self.segments.len() - 1
    }

    pub fn ephemeral_segment(&mut self) -> usize {
        self.segment(SegmentInfo {
            is_ephemeral: true,
            is_large: false,
        })
    }

    pub fn large_segment(&mut self) -> usize {
        self.segment(SegmentInfo {
            is_ephemeral: false,
            is_large: true,
        })
    }

    pub fn regular_segment(&mut self) -> usize {
        self.segment(SegmentInfo::default())
    }

    /// Add a non-string object with no outgoing references
    pub fn push_object(
        &mut self,
        segment: usize,
        address: Address,
        type_id: TypeId,
        size: u64,
        generation: i8,
    ) {
        self.push_object_with_fields(segment, address, type_id, size, generation, Vec::new());
    }

    /// Add a non-string object with reference-typed slots
    pub fn push_object_with_fields(
        &mut self,
        segment: usize,
        address: Address,
        type_id: TypeId,
        size: u64,
        generation: i8,
        fields: Vec<FieldSlot>,
    ) {
        self.segments[segment].objects.push(StoredObject {
            address,
            type_id: Some(type_id),
            generation,
            size,
            string: None,
            fields,
        });
    }

    /// Add a string object with decoded content
    pub fn push_string(
        &mut self,
        segment: usize,
        address: Address,
        type_id: TypeId,
        size: u64,
        generation: i8,
        content: impl Into<String>,
    ) {
        self.segments[segment].objects.push(StoredObject {
            address,
            type_id: Some(type_id),
            generation,
            size,
            string: Some(content.into()),
            fields: Vec::new(),
        });
    }

    /// Add an object whose type the runtime could not resolve
    pub fn push_unresolved(&mut self, segment: usize, address: Address) {
        self.segments[segment].objects.push(StoredObject {
            address,
            type_id: None,
            generation: NO_GENERATION,
            size: 0,
            string: None,
            fields: Vec::new(),
        });
    }

    /// Make segment walks fail after yielding `after` objects
    pub fn poison_segment(&mut self, segment: usize, after: usize) {
        self.segments[segment].poison_at = Some(after);
    }

    pub fn build(mut self) -> MemorySnapshot {
        let mut by_address = FxHashMap::default();
        let mut object_count = 0u64;
        for (seg_idx, seg) in self.segments.iter_mut().enumerate() {
            seg.objects.sort_by_key(|o| o.address);
            for (obj_idx, obj) in seg.objects.iter().enumerate() {
                by_address.insert(obj.address, (seg_idx, obj_idx));
                object_count += 1;
            }
        }
        let segment_infos = self.segments.iter().map(|s| s.info).collect();
        MemorySnapshot {
            types: self.types,
            segments: self.segments,
            segment_infos,
            by_address,
            char_width: self.char_width,
            object_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SegmentKind;
    use pretty_assertions::assert_eq;

    fn two_segment_snapshot() -> MemorySnapshot {
        let mut b = SnapshotBuilder::new();
        let string_ty = b.add_type(TypeRecord::string("System.String"));
        let object_ty = b.add_type(TypeRecord::new("System.Object"));

        let eph = b.ephemeral_segment();
        let loh = b.large_segment();
        b.push_string(eph, 0x2000, string_ty, 24, 0, "foo");
        b.push_string(eph, 0x1000, string_ty, 24, 1, "bar");
        b.push_object(loh, 0x9000, object_ty, 96_000, 2);
        b.build()
    }

    #[test]
    fn test_objects_yielded_in_address_order() {
        let snapshot = two_segment_snapshot();
        let addrs: Vec<_> = snapshot
            .objects(0)
            .map(|r| r.unwrap().address)
            .collect();
        assert_eq!(addrs, vec![0x1000, 0x2000]);
    }

    #[test]
    fn test_segment_classification() {
        let snapshot = two_segment_snapshot();
        let kinds: Vec<_> = snapshot
            .segments()
            .iter()
            .map(|s| SegmentKind::classify(*s))
            .collect();
        assert_eq!(kinds, vec![SegmentKind::Ephemeral, SegmentKind::LargeObject]);
    }

    #[test]
    fn test_string_value_resolution() {
        let snapshot = two_segment_snapshot();
        let ty = TypeId(0);
        assert_eq!(snapshot.string_value(ty, 0x2000).unwrap(), "foo");
        assert_eq!(snapshot.object_size(ty, 0x2000), 24);

        let err = snapshot.string_value(ty, 0x9000).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::NotAString);

        let err = snapshot.string_value(ty, 0xdead).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::BadAddress);
    }

    #[test]
    fn test_poisoned_segment_surfaces_walk_error() {
        let mut b = SnapshotBuilder::new();
        let ty = b.add_type(TypeRecord::new("System.Object"));
        let seg = b.regular_segment();
        b.push_object(seg, 0x1000, ty, 16, 0);
        b.push_object(seg, 0x2000, ty, 16, 0);
        b.poison_segment(seg, 1);
        let snapshot = b.build();

        let results: Vec<_> = snapshot.objects(0).collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }

    #[test]
    fn test_out_of_range_segment_is_empty() {
        let snapshot = two_segment_snapshot();
        assert_eq!(snapshot.objects(7).count(), 0);
    }
}

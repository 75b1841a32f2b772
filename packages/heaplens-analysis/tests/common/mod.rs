//! Shared test fixtures

use heaplens_analysis::StringSummary;
use heaplens_snapshot::{SnapshotBuilder, TypeId, TypeRecord};

/// Builder pre-loaded with the common type table
pub struct Fixture {
    pub builder: SnapshotBuilder,
    pub string_ty: TypeId,
    pub object_ty: TypeId,
}

pub fn fixture() -> Fixture {
    let mut builder = SnapshotBuilder::new();
    let string_ty = builder.add_type(TypeRecord::string("System.String"));
    let object_ty = builder.add_type(TypeRecord::new("System.Object"));
    Fixture {
        builder,
        string_ty,
        object_ty,
    }
}

/// Check the identities every summary must satisfy
pub fn assert_summary_invariants(summary: &StringSummary) {
    assert_eq!(summary.unique_string_count, summary.items.len() as u64);
    assert_eq!(
        summary.total_string_count,
        summary.items.iter().map(|i| i.occurrence_count).sum::<u64>()
    );
    assert!(summary.total_object_byte_count >= summary.total_string_byte_count);
    assert_eq!(
        summary.total_wasted_bytes,
        summary.items.iter().map(|i| i.wasted_bytes).sum::<u64>()
    );

    for item in &summary.items {
        assert_eq!(
            item.wasted_bytes,
            (item.occurrence_count - 1) * item.instance_size
        );
        assert_eq!(item.occurrence_count, item.addresses.len() as u64);
        assert_eq!(
            item.occurrence_count,
            item.count_by_segment.iter().sum::<u64>()
        );
        assert_eq!(
            item.occurrence_count,
            item.count_by_generation.iter().sum::<u64>()
        );
    }

    for pair in summary.items.windows(2) {
        assert!(pair[0].wasted_bytes >= pair[1].wasted_bytes);
    }
}

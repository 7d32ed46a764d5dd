use crate::domain::model::{
    AlignedRecord, AlignmentOutcome, CatalogMapping, EnrichedRecord, EnrichmentStats,
    ProductMetadata,
};
use std::collections::HashSet;

/// Joins aligned records against the catalog. Pure: the same inputs always
/// produce the same output, in input order, one record out per record in.
pub fn enrich_records(
    records: &[AlignedRecord],
    mapping: &CatalogMapping,
) -> (Vec<EnrichedRecord>, EnrichmentStats) {
    let mut enriched = Vec::with_capacity(records.len());
    let mut stats = EnrichmentStats {
        total_attempted: records.len(),
        ..Default::default()
    };
    let mut seen_unmatched = HashSet::new();

    for aligned in records {
        let result = enrich_record(aligned, mapping);

        if result.is_match() {
            stats.total_enriched += 1;
        } else {
            let original = aligned.record.product_id.as_str();
            if seen_unmatched.insert(original) {
                stats.unmatched_product_ids.push(original.to_string());
            }
        }

        enriched.push(result);
    }

    (enriched, stats)
}

pub fn enrich_record(aligned: &AlignedRecord, mapping: &CatalogMapping) -> EnrichedRecord {
    let (aligned_id, metadata) = match aligned.alignment {
        AlignmentOutcome::Unalignable => (None, None),
        AlignmentOutcome::Aligned(id) => (Some(id), mapping.get(id).map(ProductMetadata::from)),
    };

    EnrichedRecord {
        record: aligned.record.clone(),
        aligned_id,
        metadata,
    }
}

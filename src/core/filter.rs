use crate::domain::model::{CleanRecord, CleaningOutcome, RecordFilter};

/// Narrows a cleaned record set by region and amount, recording how many
/// records each criterion removed.
pub fn apply_filter(outcome: CleaningOutcome, filter: &RecordFilter) -> CleaningOutcome {
    let CleaningOutcome {
        mut records,
        mut report,
    } = outcome;

    if let Some(region) = filter.region.as_deref().map(str::trim) {
        let before = records.len();
        records.retain(|r| r.region.eq_ignore_ascii_case(region));
        report.filtered_by_region = before - records.len();
        tracing::info!("Records after region filter '{}': {}", region, records.len());
    }

    if filter.min_amount.is_some() || filter.max_amount.is_some() {
        let before = records.len();
        records.retain(|r| within_amount(r, filter));
        report.filtered_by_amount = before - records.len();
        tracing::info!("Records after amount filter: {}", records.len());
    }

    report.final_count = records.len();
    CleaningOutcome { records, report }
}

fn within_amount(record: &CleanRecord, filter: &RecordFilter) -> bool {
    let amount = record.amount();
    filter.min_amount.is_none_or(|min| amount >= min)
        && filter.max_amount.is_none_or(|max| amount <= max)
}

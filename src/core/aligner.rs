use crate::domain::model::{AlignedRecord, AlignmentOutcome, CleanRecord, ProductId};
use crate::utils::error::{EtlError, Result};
use std::num::NonZeroU32;

/// Folds arbitrary ProductID suffixes into the catalog id range `[1, R]`
/// with `((s - 1) mod R) + 1`. Ids already in range map to themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdAligner {
    range: NonZeroU32,
}

impl IdAligner {
    pub fn new(range: u32) -> Result<Self> {
        let range = NonZeroU32::new(range).ok_or_else(|| EtlError::InvalidConfigValueError {
            field: "catalog.range".to_string(),
            value: range.to_string(),
            reason: "Catalog id range must be at least 1".to_string(),
        })?;
        Ok(Self { range })
    }

    pub fn range(&self) -> u32 {
        self.range.get()
    }

    /// A suffix of 0 cannot pass validation; if one shows up it is shifted to 1.
    pub fn align_suffix(&self, suffix: u64) -> u32 {
        let suffix = suffix.max(1);
        let range = u64::from(self.range.get());
        // The result is at most `range`, which came from a u32.
        ((suffix - 1) % range + 1) as u32
    }

    pub fn align(&self, product_id: &ProductId) -> AlignmentOutcome {
        match product_id.numeric_suffix() {
            Some(suffix) => AlignmentOutcome::Aligned(self.align_suffix(suffix)),
            None => AlignmentOutcome::Unalignable,
        }
    }

    pub fn align_records(&self, records: Vec<CleanRecord>) -> Vec<AlignedRecord> {
        records
            .into_iter()
            .map(|record| {
                let alignment = self.align(&record.product_id);
                if let AlignmentOutcome::Aligned(id) = alignment {
                    if record.product_id.numeric_suffix() != Some(u64::from(id)) {
                        tracing::debug!("Aligned {} to catalog id {}", record.product_id, id);
                    }
                }
                AlignedRecord { record, alignment }
            })
            .collect()
    }
}

use crate::core::analytics::SalesAnalytics;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Field order of the transaction file.
pub const FIELD_NAMES: [&str; 8] = [
    "TransactionID",
    "Date",
    "ProductID",
    "ProductName",
    "Quantity",
    "UnitPrice",
    "CustomerID",
    "Region",
];

pub const FIELD_COUNT: usize = FIELD_NAMES.len();

/// Columns appended to the enriched output file.
pub const ENRICHMENT_FIELD_NAMES: [&str; 4] = ["APICategory", "APIBrand", "APIRating", "APIMatch"];

/// How the parser treats bytes that are not valid UTF-8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodePolicy {
    #[default]
    Strict,
    Latin1Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseStatus {
    Parsed,
    MalformedStructure { found: usize },
    DecodeFailure,
}

/// One non-empty input line split into its raw, unvalidated fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRecord {
    pub line: usize,
    pub transaction_id: String,
    pub date: String,
    pub product_id: String,
    pub product_name: String,
    pub quantity: String,
    pub unit_price: String,
    pub customer_id: String,
    pub region: String,
    pub status: ParseStatus,
}

impl CandidateRecord {
    /// Assigns fields positionally; missing trailing fields stay empty and
    /// any count other than [`FIELD_COUNT`] marks the record malformed.
    pub fn from_fields(line: usize, fields: Vec<String>) -> Self {
        let found = fields.len();
        let status = if found == FIELD_COUNT {
            ParseStatus::Parsed
        } else {
            ParseStatus::MalformedStructure { found }
        };

        let mut fields = fields.into_iter();
        let mut next = || fields.next().unwrap_or_default();

        Self {
            line,
            transaction_id: next(),
            date: next(),
            product_id: next(),
            product_name: next(),
            quantity: next(),
            unit_price: next(),
            customer_id: next(),
            region: next(),
            status,
        }
    }

    pub fn decode_failure(line: usize) -> Self {
        Self {
            status: ParseStatus::DecodeFailure,
            ..Self::from_fields(line, vec![String::new(); FIELD_COUNT])
        }
    }
}

/// A validated product identifier: letter prefix plus digits, prefix upper-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductId(String);

impl ProductId {
    pub(crate) fn new_unchecked(id: String) -> Self {
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Trailing run of ASCII digits, if it is present and fits in a `u64`.
    pub fn numeric_suffix(&self) -> Option<u64> {
        let digits_start = self
            .0
            .rfind(|c: char| !c.is_ascii_digit())
            .map(|idx| idx + 1)
            .unwrap_or(0);
        let digits = &self.0[digits_start..];
        if digits.is_empty() {
            return None;
        }
        digits.parse().ok()
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A transaction that passed every validation rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanRecord {
    pub line: usize,
    pub transaction_id: String,
    pub date: NaiveDate,
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u64,
    pub unit_price: Decimal,
    pub customer_id: String,
    pub region: String,
}

impl CleanRecord {
    /// Line amount, saturating at `Decimal::MAX`. The validator rejects records
    /// whose amount would not fit, so saturation only affects hand-built records.
    pub fn amount(&self) -> Decimal {
        Decimal::from(self.quantity).saturating_mul(self.unit_price)
    }
}

/// Why a candidate was dropped. Declaration order is rule evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum RejectReason {
    StructurallyInvalid,
    InvalidDate,
    InvalidQuantity,
    InvalidPrice,
    InvalidProductId,
}

impl RejectReason {
    pub const ALL: [RejectReason; 5] = [
        RejectReason::StructurallyInvalid,
        RejectReason::InvalidDate,
        RejectReason::InvalidQuantity,
        RejectReason::InvalidPrice,
        RejectReason::InvalidProductId,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::StructurallyInvalid => "structurally invalid",
            RejectReason::InvalidDate => "invalid date",
            RejectReason::InvalidQuantity => "invalid quantity",
            RejectReason::InvalidPrice => "invalid price",
            RejectReason::InvalidProductId => "invalid product id format",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleaningReport {
    pub total_parsed: usize,
    pub rejected: BTreeMap<RejectReason, usize>,
    pub retained: usize,
    /// Distinct regions among retained records, before any filter.
    pub available_regions: Vec<String>,
    /// Smallest and largest transaction amount among retained records.
    pub amount_range: Option<(Decimal, Decimal)>,
    pub filtered_by_region: usize,
    pub filtered_by_amount: usize,
    pub final_count: usize,
}

impl CleaningReport {
    pub fn rejected_for(&self, reason: RejectReason) -> usize {
        self.rejected.get(&reason).copied().unwrap_or(0)
    }

    pub fn total_rejected(&self) -> usize {
        self.rejected.values().sum()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CleaningOutcome {
    pub records: Vec<CleanRecord>,
    pub report: CleaningReport,
}

/// Optional post-validation narrowing of the record set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordFilter {
    pub region: Option<String>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
}

impl RecordFilter {
    pub fn is_empty(&self) -> bool {
        self.region.is_none() && self.min_amount.is_none() && self.max_amount.is_none()
    }
}

/// A product as served by the remote catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub id: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub stock: Option<u64>,
}

/// Immutable id → product lookup built once per run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogMapping {
    products: BTreeMap<u32, CatalogProduct>,
}

impl CatalogMapping {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The first product seen for an id wins.
    pub fn from_products(products: impl IntoIterator<Item = CatalogProduct>) -> Self {
        let mut map = BTreeMap::new();
        for product in products {
            map.entry(product.id).or_insert(product);
        }
        Self { products: map }
    }

    pub fn get(&self, id: u32) -> Option<&CatalogProduct> {
        self.products.get(&id)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignmentOutcome {
    Aligned(u32),
    Unalignable,
}

impl AlignmentOutcome {
    pub fn aligned_id(&self) -> Option<u32> {
        match self {
            AlignmentOutcome::Aligned(id) => Some(*id),
            AlignmentOutcome::Unalignable => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlignedRecord {
    pub record: CleanRecord,
    pub alignment: AlignmentOutcome,
}

/// Catalog fields copied onto a matched record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductMetadata {
    pub title: String,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub rating: Option<f64>,
}

impl From<&CatalogProduct> for ProductMetadata {
    fn from(product: &CatalogProduct) -> Self {
        Self {
            title: product.title.clone(),
            category: product.category.clone(),
            brand: product.brand.clone(),
            rating: product.rating,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedRecord {
    pub record: CleanRecord,
    pub aligned_id: Option<u32>,
    pub metadata: Option<ProductMetadata>,
}

impl EnrichedRecord {
    pub fn is_match(&self) -> bool {
        self.metadata.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnrichmentStats {
    pub total_enriched: usize,
    pub total_attempted: usize,
    /// Original ProductIDs without a catalog match, first occurrence order.
    pub unmatched_product_ids: Vec<String>,
}

impl EnrichmentStats {
    /// Percentage in `0.0..=100.0`; zero when nothing was attempted.
    pub fn success_rate(&self) -> f64 {
        if self.total_attempted == 0 {
            0.0
        } else {
            self.total_enriched as f64 / self.total_attempted as f64 * 100.0
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TransformResult {
    pub cleaning: CleaningReport,
    pub enriched: Vec<EnrichedRecord>,
    pub enrichment: EnrichmentStats,
    pub catalog_size: usize,
    pub analytics: SalesAnalytics,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactOutcome {
    pub name: &'static str,
    pub path: String,
    pub error: Option<String>,
}

impl ArtifactOutcome {
    pub fn is_written(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoadSummary {
    pub artifacts: Vec<ArtifactOutcome>,
    pub warnings: Vec<String>,
}

impl LoadSummary {
    pub fn failed_artifacts(&self) -> impl Iterator<Item = &ArtifactOutcome> {
        self.artifacts.iter().filter(|a| !a.is_written())
    }

    pub fn has_failures(&self) -> bool {
        self.failed_artifacts().next().is_some()
    }
}

use crate::domain::model::{
    CandidateRecord, CleanRecord, CleaningOutcome, CleaningReport, ParseStatus, ProductId,
    RejectReason,
};
use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::LazyLock;

/// Accepted date layouts, tried in order. Non-ISO layouts are day-first.
pub const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%d/%m/%Y", "%d.%m.%Y"];

static PRODUCT_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z]+)([0-9]+)$").expect("product id pattern is valid"));

/// Runs every candidate through the rule chain and tallies rejections.
pub fn clean_records<I>(candidates: I) -> CleaningOutcome
where
    I: IntoIterator<Item = CandidateRecord>,
{
    let mut report = CleaningReport::default();
    let mut records = Vec::new();

    for candidate in candidates {
        report.total_parsed += 1;
        match validate_candidate(&candidate) {
            Ok(record) => records.push(record),
            Err(reason) => {
                tracing::debug!("Rejected line {}: {}", candidate.line, reason);
                *report.rejected.entry(reason).or_insert(0) += 1;
            }
        }
    }

    report.retained = records.len();
    report.final_count = records.len();
    report.available_regions = records
        .iter()
        .map(|r| r.region.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    report.amount_range = records
        .iter()
        .map(CleanRecord::amount)
        .min()
        .zip(records.iter().map(CleanRecord::amount).max());

    tracing::info!(
        "🧹 Cleaning: {} parsed, {} rejected, {} retained",
        report.total_parsed,
        report.total_rejected(),
        report.retained
    );

    CleaningOutcome { records, report }
}

/// Applies the rules in fixed order; the first failing rule decides the reason.
pub fn validate_candidate(candidate: &CandidateRecord) -> Result<CleanRecord, RejectReason> {
    let transaction_id = candidate.transaction_id.trim();
    let product_id = candidate.product_id.trim();
    let product_name = normalize_product_name(&candidate.product_name);
    let customer_id = candidate.customer_id.trim();
    let region = normalize_region(&candidate.region);

    if candidate.status != ParseStatus::Parsed
        || transaction_id.is_empty()
        || product_id.is_empty()
        || customer_id.is_empty()
        || product_name.is_empty()
        || region.is_empty()
    {
        return Err(RejectReason::StructurallyInvalid);
    }

    let date = parse_date(&candidate.date).ok_or(RejectReason::InvalidDate)?;
    let quantity = parse_quantity(&candidate.quantity).ok_or(RejectReason::InvalidQuantity)?;
    // A price whose line amount does not fit in a Decimal is unusable.
    let unit_price = parse_price(&candidate.unit_price)
        .filter(|price| price.checked_mul(Decimal::from(quantity)).is_some())
        .ok_or(RejectReason::InvalidPrice)?;
    let product_id = normalize_product_id(product_id).ok_or(RejectReason::InvalidProductId)?;

    Ok(CleanRecord {
        line: candidate.line,
        transaction_id: transaction_id.to_string(),
        date,
        product_id,
        product_name,
        quantity,
        unit_price,
        customer_id: customer_id.to_string(),
        region,
    })
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

pub fn parse_quantity(raw: &str) -> Option<u64> {
    let digits = strip_thousands(raw);
    if digits.starts_with('-') {
        return None;
    }
    digits.parse().ok()
}

pub fn parse_price(raw: &str) -> Option<Decimal> {
    let value = Decimal::from_str(&strip_thousands(raw)).ok()?;
    if value.is_sign_negative() && !value.is_zero() {
        return None;
    }
    Some(value)
}

/// Letter prefix plus a positive numeric suffix; the prefix is upper-cased and
/// the digits are kept as written.
pub fn normalize_product_id(raw: &str) -> Option<ProductId> {
    let caps = PRODUCT_ID_PATTERN.captures(raw.trim())?;
    let prefix = &caps[1];
    let digits = &caps[2];

    let suffix: u64 = digits.parse().ok()?;
    if suffix == 0 {
        return None;
    }

    Some(ProductId::new_unchecked(format!(
        "{}{}",
        prefix.to_ascii_uppercase(),
        digits
    )))
}

fn strip_thousands(raw: &str) -> String {
    raw.trim().replace(',', "")
}

fn normalize_product_name(raw: &str) -> String {
    raw.replace(',', "").trim().to_string()
}

/// "north  east" -> "North East"
fn normalize_region(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(line: &str) -> CandidateRecord {
        let fields = line.split('|').map(str::to_string).collect();
        CandidateRecord::from_fields(1, fields)
    }

    #[test]
    fn test_valid_record_is_coerced() {
        let record =
            validate_candidate(&candidate(" T001 |2024-12-01| p01 |Mouse, Wireless| 1,200 |1,499.50|C001|  north east ")).unwrap();
        assert_eq!(record.transaction_id, "T001");
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
        assert_eq!(record.product_id.as_str(), "P01");
        assert_eq!(record.product_name, "Mouse Wireless");
        assert_eq!(record.quantity, 1200);
        assert_eq!(record.unit_price, Decimal::from_str("1499.50").unwrap());
        assert_eq!(record.region, "North East");
    }

    #[test]
    fn test_zero_quantity_and_price_are_allowed() {
        let record = validate_candidate(&candidate("T001|2024-12-01|P1|Sample|0|0|C001|North")).unwrap();
        assert_eq!(record.quantity, 0);
        assert_eq!(record.unit_price, Decimal::ZERO);
    }

    #[test]
    fn test_each_rule_reports_its_reason() {
        let cases = [
            ("T001|2024-12-01|P1|Laptop|2|45000|C001", RejectReason::StructurallyInvalid),
            ("|2024-12-01|P1|Laptop|2|45000|C001|North", RejectReason::StructurallyInvalid),
            ("T001|2024-12-01||Laptop|2|45000|C001|North", RejectReason::StructurallyInvalid),
            ("T001|2024-12-01|P1|Laptop|2|45000| |North", RejectReason::StructurallyInvalid),
            ("T001|2024-12-01|P1|Laptop|2|45000|C001|", RejectReason::StructurallyInvalid),
            ("T002|bad-date|P5|Widget|3|20|C002|South", RejectReason::InvalidDate),
            ("T002||P5|Widget|3|20|C002|South", RejectReason::InvalidDate),
            ("T002|2024-02-30|P5|Widget|3|20|C002|South", RejectReason::InvalidDate),
            ("T003|2024-12-01|P5|Widget|-3|20|C002|South", RejectReason::InvalidQuantity),
            ("T003|2024-12-01|P5|Widget|three|20|C002|South", RejectReason::InvalidQuantity),
            ("T003|2024-12-01|P5|Widget|2.5|20|C002|South", RejectReason::InvalidQuantity),
            ("T004|2024-12-01|P5|Widget|3|-20|C002|South", RejectReason::InvalidPrice),
            ("T004|2024-12-01|P5|Widget|3|abc|C002|South", RejectReason::InvalidPrice),
            ("T005|2024-12-01|5|Widget|3|20|C002|South", RejectReason::InvalidProductId),
            ("T005|2024-12-01|P|Widget|3|20|C002|South", RejectReason::InvalidProductId),
            ("T005|2024-12-01|P0|Widget|3|20|C002|South", RejectReason::InvalidProductId),
            ("T005|2024-12-01|P-5|Widget|3|20|C002|South", RejectReason::InvalidProductId),
        ];

        for (line, expected) in cases {
            assert_eq!(validate_candidate(&candidate(line)).unwrap_err(), expected, "{}", line);
        }
    }

    #[test]
    fn test_first_failing_rule_wins() {
        // Bad date, quantity, price and product id all at once.
        let line = "T009|someday|X|Widget|-1|free|C009|West";
        assert_eq!(
            validate_candidate(&candidate(line)).unwrap_err(),
            RejectReason::InvalidDate
        );
        // Bad quantity and price.
        let line = "T009|2024-12-01|X|Widget|-1|free|C009|West";
        assert_eq!(
            validate_candidate(&candidate(line)).unwrap_err(),
            RejectReason::InvalidQuantity
        );
        // Structure beats everything.
        let line = "|someday|X|Widget|-1|free|C009|West";
        assert_eq!(
            validate_candidate(&candidate(line)).unwrap_err(),
            RejectReason::StructurallyInvalid
        );
    }

    #[test]
    fn test_quantity_uses_full_unsigned_range() {
        assert_eq!(parse_quantity("9223372036854775808"), Some(9_223_372_036_854_775_808));
        assert_eq!(parse_quantity("18446744073709551615"), Some(u64::MAX));
        assert_eq!(parse_quantity("18446744073709551616"), None);
        assert_eq!(parse_quantity("-0"), None);
    }

    #[test]
    fn test_unrepresentable_amount_is_invalid_price() {
        let line = "T001|2024-12-01|P1|Widget|1000000|100000000000000000000000|C001|North";
        assert_eq!(
            validate_candidate(&candidate(line)).unwrap_err(),
            RejectReason::InvalidPrice
        );

        let outcome = clean_records([candidate(line)]);
        assert_eq!(outcome.report.retained, 0);
        assert_eq!(outcome.report.rejected_for(RejectReason::InvalidPrice), 1);
    }

    #[test]
    fn test_decode_failure_is_structurally_invalid() {
        let candidate = CandidateRecord::decode_failure(7);
        assert_eq!(
            validate_candidate(&candidate).unwrap_err(),
            RejectReason::StructurallyInvalid
        );
    }

    #[test]
    fn test_out_of_range_suffix_is_kept() {
        let record = validate_candidate(&candidate("T010|2024-12-01|P150|Widget|1|10|C010|East")).unwrap();
        assert_eq!(record.product_id.as_str(), "P150");
        assert_eq!(record.product_id.numeric_suffix(), Some(150));
    }

    #[test]
    fn test_accepted_date_formats_normalize() {
        let expected = NaiveDate::from_ymd_opt(2024, 12, 5).unwrap();
        for raw in ["2024-12-05", "2024/12/05", "05-12-2024", "05/12/2024", "05.12.2024"] {
            assert_eq!(parse_date(raw), Some(expected), "{}", raw);
        }
    }

    #[test]
    fn test_clean_records_tallies_reasons() {
        let lines = [
            "T001|2024-12-01|P1|iPhone 9|2|549|C001|North",
            "T002|bad-date|P5|Widget|3|20|C002|South",
            "T003|2024-12-02|P7|Widget|-3|20|C002|South",
            "T004|2024-12-03|P8|Widget|3|20|C003|South",
            "T005|2024-12-04|Q|Widget|3|20|C003|South",
        ];
        let outcome = clean_records(lines.iter().map(|l| candidate(l)));

        assert_eq!(outcome.report.total_parsed, 5);
        assert_eq!(outcome.report.retained, 2);
        assert_eq!(outcome.report.rejected_for(RejectReason::InvalidDate), 1);
        assert_eq!(outcome.report.rejected_for(RejectReason::InvalidQuantity), 1);
        assert_eq!(outcome.report.rejected_for(RejectReason::InvalidProductId), 1);
        assert_eq!(outcome.report.rejected_for(RejectReason::InvalidPrice), 0);
        assert_eq!(outcome.report.total_rejected(), 3);

        let ids: Vec<_> = outcome.records.iter().map(|r| r.transaction_id.as_str()).collect();
        assert_eq!(ids, vec!["T001", "T004"]);
    }

    #[test]
    fn test_clean_records_reports_regions_and_amount_range() {
        let lines = [
            "T001|2024-12-01|P1|iPhone 9|2|549|C001|north",
            "T002|2024-12-02|P2|Widget|3|20|C002|South",
            "T003|2024-12-03|P3|Widget|1|20|C003|North",
            "T004|bad-date|P4|Widget|100|9999|C003|West",
        ];
        let outcome = clean_records(lines.iter().map(|l| candidate(l)));

        assert_eq!(outcome.report.available_regions, vec!["North", "South"]);
        assert_eq!(
            outcome.report.amount_range,
            Some((Decimal::from(20), Decimal::from(1098)))
        );

        let empty = clean_records(std::iter::empty());
        assert!(empty.report.available_regions.is_empty());
        assert!(empty.report.amount_range.is_none());
    }
}

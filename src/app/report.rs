//! Text report and enriched data file rendering.

use crate::core::analytics::{SalesAnalytics, DEFAULT_TOP_N};
use crate::core::parser::DELIMITER;
use crate::domain::model::{
    CleaningReport, EnrichedRecord, EnrichmentStats, RejectReason, ENRICHMENT_FIELD_NAMES,
    FIELD_NAMES,
};
use crate::utils::error::{EtlError, Result};
use chrono::NaiveDateTime;
use csv::{QuoteStyle, WriterBuilder};
use rust_decimal::Decimal;
use std::fmt::Write;

const WIDTH: usize = 70;
const CURRENCY: &str = "₹";
const TOP_CUSTOMERS: usize = 5;

pub struct ReportInput<'a> {
    pub generated_at: NaiveDateTime,
    pub cleaning: &'a CleaningReport,
    pub analytics: &'a SalesAnalytics,
    pub enrichment: &'a EnrichmentStats,
    pub catalog_size: usize,
    pub warnings: &'a [String],
}

/// Enriched records in input order: the eight input columns followed by
/// `APICategory|APIBrand|APIRating|APIMatch`.
pub fn render_enriched_data(records: &[EnrichedRecord]) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .delimiter(DELIMITER)
        .quote_style(QuoteStyle::Never)
        .from_writer(Vec::new());

    writer.write_record(FIELD_NAMES.iter().chain(ENRICHMENT_FIELD_NAMES.iter()))?;

    for enriched in records {
        let record = &enriched.record;
        let metadata = enriched.metadata.as_ref();
        writer.write_record([
            record.transaction_id.clone(),
            record.date.format("%Y-%m-%d").to_string(),
            record.product_id.to_string(),
            record.product_name.clone(),
            record.quantity.to_string(),
            record.unit_price.to_string(),
            record.customer_id.clone(),
            record.region.clone(),
            metadata.and_then(|m| m.category.clone()).unwrap_or_default(),
            metadata.and_then(|m| m.brand.clone()).unwrap_or_default(),
            metadata
                .and_then(|m| m.rating)
                .map(|r| r.to_string())
                .unwrap_or_default(),
            enriched.is_match().to_string(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| EtlError::IoError(e.into_error()))
}

pub fn render_report(input: &ReportInput<'_>) -> String {
    let mut out = String::new();
    // Formatting into a String only fails if a Display impl does.
    if let Err(e) = write_report(&mut out, input) {
        tracing::error!("Report rendering stopped early: {}", e);
    }
    out
}

fn write_report(out: &mut String, input: &ReportInput<'_>) -> std::fmt::Result {
    let rule = "=".repeat(WIDTH);
    let line = "-".repeat(WIDTH);
    let analytics = input.analytics;

    writeln!(out, "{}", rule)?;
    writeln!(out, "{:^WIDTH$}", "SALES ANALYTICS REPORT")?;
    writeln!(
        out,
        "{:^WIDTH$}",
        format!("Generated: {}", input.generated_at.format("%Y-%m-%d %H:%M:%S"))
    )?;
    writeln!(
        out,
        "{:^WIDTH$}",
        format!("Records Processed: {}", analytics.transaction_count)
    )?;
    writeln!(out, "{}\n", rule)?;

    let cleaning = input.cleaning;
    writeln!(out, "CLEANING SUMMARY\n{}", line)?;
    writeln!(out, "{:<30}{}", "Records Parsed:", cleaning.total_parsed)?;
    writeln!(out, "{:<30}{}", "Records Rejected:", cleaning.total_rejected())?;
    for reason in RejectReason::ALL {
        writeln!(
            out,
            "  {:<28}{}",
            format!("{}:", reason),
            cleaning.rejected_for(reason)
        )?;
    }
    writeln!(out, "{:<30}{}", "Records Retained:", cleaning.retained)?;
    let regions = if cleaning.available_regions.is_empty() {
        "N/A".to_string()
    } else {
        cleaning.available_regions.join(", ")
    };
    writeln!(out, "{:<30}{}", "Regions Available:", regions)?;
    let amount_range = match cleaning.amount_range {
        Some((min, max)) => format!("{} - {}", money(min, 2), money(max, 2)),
        None => "N/A".to_string(),
    };
    writeln!(out, "{:<30}{}", "Amount Range:", amount_range)?;
    writeln!(out, "{:<30}{}", "Filtered by Region:", cleaning.filtered_by_region)?;
    writeln!(out, "{:<30}{}", "Filtered by Amount:", cleaning.filtered_by_amount)?;
    writeln!(out, "{:<30}{}\n", "Final Record Count:", cleaning.final_count)?;

    writeln!(out, "OVERALL SUMMARY\n{}", line)?;
    writeln!(out, "{:<25}{}", "Total Revenue:", money(analytics.total_revenue, 2))?;
    writeln!(out, "{:<25}{}", "Total Transactions:", analytics.transaction_count)?;
    writeln!(
        out,
        "{:<25}{}",
        "Average Order Value:",
        money(analytics.average_order_value, 2)
    )?;
    let date_range = match analytics.date_range {
        Some((first, last)) => format!("{} to {}", first, last),
        None => "N/A".to_string(),
    };
    writeln!(out, "{:<25}{}\n", "Date Range:", date_range)?;

    writeln!(out, "REGION-WISE PERFORMANCE\n{}", line)?;
    writeln!(out, "{:<14}{:<18}{:<14}{:<14}", "Region", "Sales", "% of Total", "Transactions")?;
    for region in &analytics.regions {
        writeln!(
            out,
            "{:<14}{:<18}{:<14}{:<14}",
            region.region,
            money(region.total_sales, 0),
            format!("{:.2}%", region.percentage),
            region.transaction_count
        )?;
    }
    writeln!(out)?;

    writeln!(out, "TOP {} PRODUCTS\n{}", DEFAULT_TOP_N, line)?;
    writeln!(out, "{:<6}{:<24}{:<12}{:<15}", "Rank", "Product Name", "Quantity", "Revenue")?;
    for (rank, product) in analytics.top_products.iter().enumerate() {
        writeln!(
            out,
            "{:<6}{:<24}{:<12}{:<15}",
            rank + 1,
            product.name,
            product.quantity,
            money(product.revenue, 0)
        )?;
    }
    writeln!(out)?;

    writeln!(out, "TOP {} CUSTOMERS\n{}", TOP_CUSTOMERS, line)?;
    writeln!(out, "{:<6}{:<15}{:<18}{:<10}", "Rank", "Customer ID", "Total Spent", "Orders")?;
    for (rank, customer) in analytics.customers.iter().take(TOP_CUSTOMERS).enumerate() {
        writeln!(
            out,
            "{:<6}{:<15}{:<18}{:<10}",
            rank + 1,
            customer.customer_id,
            money(customer.total_spent, 0),
            customer.purchase_count
        )?;
    }
    writeln!(out)?;

    writeln!(out, "DAILY SALES TREND\n{}", line)?;
    writeln!(
        out,
        "{:<12}{:<18}{:<15}{:<18}",
        "Date", "Revenue", "Transactions", "Unique Customers"
    )?;
    for day in &analytics.daily_trend {
        writeln!(
            out,
            "{:<12}{:<18}{:<15}{:<18}",
            day.date.to_string(),
            money(day.revenue, 0),
            day.transaction_count,
            day.unique_customers
        )?;
    }
    writeln!(out)?;

    writeln!(out, "PRODUCT PERFORMANCE ANALYSIS\n{}", line)?;
    if let Some(peak) = &analytics.peak_day {
        writeln!(
            out,
            "Best Selling Day: {} (Revenue {}, Transactions {})",
            peak.date,
            money(peak.revenue, 0),
            peak.transaction_count
        )?;
    }
    if !analytics.low_performers.is_empty() {
        writeln!(out, "Low Performing Products:")?;
        writeln!(out, "{:<24}{:<12}{:<15}", "Product", "Quantity", "Revenue")?;
        for product in &analytics.low_performers {
            writeln!(
                out,
                "{:<24}{:<12}{:<15}",
                product.name,
                product.quantity,
                money(product.revenue, 0)
            )?;
        }
    }
    writeln!(out)?;

    let enrichment = input.enrichment;
    writeln!(out, "API ENRICHMENT SUMMARY\n{}", line)?;
    writeln!(out, "Catalog Products Available: {}", input.catalog_size)?;
    writeln!(
        out,
        "Total Products Enriched: {}/{}",
        enrichment.total_enriched, enrichment.total_attempted
    )?;
    writeln!(out, "Success Rate: {:.1}%", enrichment.success_rate())?;
    if !enrichment.unmatched_product_ids.is_empty() {
        writeln!(out, "Unmatched ProductIDs:")?;
        for id in &enrichment.unmatched_product_ids {
            writeln!(out, "  - {}", id)?;
        }
    }
    writeln!(out)?;

    writeln!(out, "WARNINGS\n{}", line)?;
    if input.warnings.is_empty() {
        writeln!(out, "None")?;
    }
    for warning in input.warnings {
        writeln!(out, "! {}", warning)?;
    }

    Ok(())
}

fn money(value: Decimal, dp: u32) -> String {
    format!("{}{}", CURRENCY, group_thousands(value, dp))
}

/// `1234567.891` with `dp = 2` -> `1,234,567.89`
pub fn group_thousands(value: Decimal, dp: u32) -> String {
    let text = format!("{:.*}", dp as usize, value.round_dp(dp));
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

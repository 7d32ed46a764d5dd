//! Business aggregates over the final record set, printed in the sales report.

use crate::domain::model::CleanRecord;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

pub const DEFAULT_TOP_N: usize = 5;
pub const DEFAULT_LOW_PERFORMER_THRESHOLD: u64 = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionStats {
    pub region: String,
    pub total_sales: Decimal,
    pub transaction_count: usize,
    /// Share of total revenue, two decimal places.
    pub percentage: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductStats {
    pub name: String,
    pub quantity: u64,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerStats {
    pub customer_id: String,
    pub total_spent: Decimal,
    pub purchase_count: usize,
    pub avg_order_value: Decimal,
    pub products_bought: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyStats {
    pub date: NaiveDate,
    pub revenue: Decimal,
    pub transaction_count: usize,
    pub unique_customers: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SalesAnalytics {
    pub total_revenue: Decimal,
    pub transaction_count: usize,
    pub average_order_value: Decimal,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub regions: Vec<RegionStats>,
    pub top_products: Vec<ProductStats>,
    pub customers: Vec<CustomerStats>,
    pub daily_trend: Vec<DailyStats>,
    pub peak_day: Option<DailyStats>,
    pub low_performers: Vec<ProductStats>,
}

impl SalesAnalytics {
    pub fn compute(records: &[CleanRecord], top_n: usize, low_threshold: u64) -> Self {
        let total_revenue = total_revenue(records);
        let transaction_count = records.len();
        let average_order_value = if transaction_count == 0 {
            Decimal::ZERO
        } else {
            (total_revenue / Decimal::from(transaction_count)).round_dp(2)
        };
        let date_range = records
            .iter()
            .map(|r| r.date)
            .min()
            .zip(records.iter().map(|r| r.date).max());
        let daily_trend = daily_sales_trend(records);

        Self {
            total_revenue,
            transaction_count,
            average_order_value,
            date_range,
            regions: region_wise_sales(records),
            top_products: top_selling_products(records, top_n),
            customers: customer_analysis(records),
            peak_day: peak_sales_day(&daily_trend),
            daily_trend,
            low_performers: low_performing_products(records, low_threshold),
        }
    }
}

pub fn total_revenue(records: &[CleanRecord]) -> Decimal {
    records
        .iter()
        .fold(Decimal::ZERO, |total, record| total.saturating_add(record.amount()))
}

/// Sorted by total sales, highest first.
pub fn region_wise_sales(records: &[CleanRecord]) -> Vec<RegionStats> {
    let total = total_revenue(records);
    let mut by_region: BTreeMap<&str, (Decimal, usize)> = BTreeMap::new();
    for record in records {
        let entry = by_region.entry(record.region.as_str()).or_default();
        entry.0 = entry.0.saturating_add(record.amount());
        entry.1 += 1;
    }

    let mut regions: Vec<RegionStats> = by_region
        .into_iter()
        .map(|(region, (total_sales, transaction_count))| RegionStats {
            region: region.to_string(),
            total_sales,
            transaction_count,
            percentage: percentage_of(total_sales, total),
        })
        .collect();
    regions.sort_by(|a, b| b.total_sales.cmp(&a.total_sales));
    regions
}

fn product_totals(records: &[CleanRecord]) -> Vec<ProductStats> {
    let mut by_product: BTreeMap<&str, (u64, Decimal)> = BTreeMap::new();
    for record in records {
        let entry = by_product.entry(record.product_name.as_str()).or_default();
        entry.0 = entry.0.saturating_add(record.quantity);
        entry.1 = entry.1.saturating_add(record.amount());
    }
    by_product
        .into_iter()
        .map(|(name, (quantity, revenue))| ProductStats {
            name: name.to_string(),
            quantity,
            revenue,
        })
        .collect()
}

/// Top `n` products by quantity sold.
pub fn top_selling_products(records: &[CleanRecord], n: usize) -> Vec<ProductStats> {
    let mut products = product_totals(records);
    products.sort_by(|a, b| b.quantity.cmp(&a.quantity));
    products.truncate(n);
    products
}

/// Products whose total quantity is below `threshold`, lowest first.
pub fn low_performing_products(records: &[CleanRecord], threshold: u64) -> Vec<ProductStats> {
    let mut products: Vec<_> = product_totals(records)
        .into_iter()
        .filter(|p| p.quantity < threshold)
        .collect();
    products.sort_by_key(|p| p.quantity);
    products
}

/// Sorted by total spent, highest first.
pub fn customer_analysis(records: &[CleanRecord]) -> Vec<CustomerStats> {
    let mut by_customer: BTreeMap<&str, (Decimal, usize, BTreeSet<&str>)> = BTreeMap::new();
    for record in records {
        let entry = by_customer.entry(record.customer_id.as_str()).or_default();
        entry.0 = entry.0.saturating_add(record.amount());
        entry.1 += 1;
        entry.2.insert(record.product_name.as_str());
    }

    let mut customers: Vec<CustomerStats> = by_customer
        .into_iter()
        .map(|(customer_id, (total_spent, purchase_count, products))| CustomerStats {
            customer_id: customer_id.to_string(),
            total_spent,
            purchase_count,
            avg_order_value: (total_spent / Decimal::from(purchase_count)).round_dp(2),
            products_bought: products.into_iter().map(str::to_string).collect(),
        })
        .collect();
    customers.sort_by(|a, b| b.total_spent.cmp(&a.total_spent));
    customers
}

/// Chronological per-day totals.
pub fn daily_sales_trend(records: &[CleanRecord]) -> Vec<DailyStats> {
    let mut by_date: BTreeMap<NaiveDate, (Decimal, usize, BTreeSet<&str>)> = BTreeMap::new();
    for record in records {
        let entry = by_date.entry(record.date).or_default();
        entry.0 = entry.0.saturating_add(record.amount());
        entry.1 += 1;
        entry.2.insert(record.customer_id.as_str());
    }

    by_date
        .into_iter()
        .map(|(date, (revenue, transaction_count, customers))| DailyStats {
            date,
            revenue,
            transaction_count,
            unique_customers: customers.len(),
        })
        .collect()
}

/// Highest-revenue day; the earliest one wins a tie.
pub fn peak_sales_day(trend: &[DailyStats]) -> Option<DailyStats> {
    trend
        .iter()
        .fold(None::<&DailyStats>, |best, day| match best {
            Some(best) if best.revenue >= day.revenue => Some(best),
            _ => Some(day),
        })
        .cloned()
}

fn percentage_of(part: Decimal, total: Decimal) -> Decimal {
    if total > Decimal::ZERO {
        (part / total * Decimal::ONE_HUNDRED).round_dp(2)
    } else {
        Decimal::ZERO
    }
}

use crate::schema::{CustomerRollup, SalesData};
use log::debug;
use std::collections::BTreeMap;

#[derive(Debug, Default, Clone, Copy)]
struct CustomerTotals {
    turnover: f64,
    margin: f64,
    portfolio: f64,
}

/// Outer join of both record sets on the customer key.
///
/// Customers present on one side only get zero for the other side. Rows with
/// a blank customer are left out of the grouping. The result is ordered by
/// customer key.
pub fn merge_customers(data: &SalesData) -> Vec<CustomerRollup> {
    let mut grouped: BTreeMap<&str, CustomerTotals> = BTreeMap::new();

    for row in &data.turnover {
        if let Some(customer) = row.customer.as_deref() {
            let totals = grouped.entry(customer).or_default();
            totals.turnover += row.turnover;
            totals.margin += row.margin;
        }
    }

    for row in &data.portfolio {
        if let Some(customer) = row.customer.as_deref() {
            grouped.entry(customer).or_default().portfolio += row.net_amount;
        }
    }

    grouped
        .into_iter()
        .map(|(customer, totals)| CustomerRollup {
            customer: customer.to_string(),
            turnover: totals.turnover,
            margin: totals.margin,
            portfolio: totals.portfolio,
            total: totals.turnover + totals.portfolio,
        })
        .collect()
}

/// Highest `total` first, at most `limit` rows. Ties keep merge order.
pub fn top_customers(merged: &[CustomerRollup], limit: usize) -> Vec<CustomerRollup> {
    let mut ranked = merged.to_vec();
    ranked.sort_by(|a, b| b.total.total_cmp(&a.total));
    ranked.truncate(limit);
    ranked
}

/// Returns the full merged table and its ranked head.
pub fn customer_rollup(data: &SalesData, limit: usize) -> (Vec<CustomerRollup>, Vec<CustomerRollup>) {
    let merged = merge_customers(data);
    let top = top_customers(&merged, limit);
    debug!(
        "Customer rollup: {} distinct customers, {} retained",
        merged.len(),
        top.len()
    );
    (merged, top)
}

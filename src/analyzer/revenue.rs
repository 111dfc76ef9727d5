//! Revenue aggregation over per-branch monthly rows.
use serde::Serialize;

use crate::fetch::types::BranchRevenueRow;
use crate::filters::BranchFilter;

/// Shop/outsource/total sums for the selected month and branch scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueTotals {
    pub shop_revenue: f64,
    pub outsource_revenue: f64,
    pub total_revenue: f64,
}

/// Decimal-as-string → f64. Missing or unparseable values count as 0.
fn parse_decimal(value: Option<&str>) -> f64 {
    value
        .and_then(|s| s.trim().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Reduce revenue rows to totals, optionally restricted to one branch.
/// Both dashboard consumers (the per-branch table's grand totals and the
/// branch-scoped summary card) go through this single path, so parsing
/// behavior can never diverge between them.
pub fn aggregate(rows: &[BranchRevenueRow], branch: &BranchFilter) -> RevenueTotals {
    let mut totals = RevenueTotals::default();
    for row in rows.iter().filter(|r| branch.matches(&r.branch_id)) {
        totals.shop_revenue += parse_decimal(row.shop_revenue.as_deref());
        totals.outsource_revenue += parse_decimal(row.outsource_revenue.as_deref());
        totals.total_revenue += parse_decimal(row.total_revenue.as_deref());
    }
    totals
}

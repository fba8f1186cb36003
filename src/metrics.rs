//! Summary figures for the dashboard and the JSON export.
use crate::types::{
    BlockedProjectSummary, ItemStatus, MaterialLineItem, Project, Readiness, StatusCount,
    SummaryMetrics, SupplierProfile, SupplyQuantity,
};
use crate::util::percent;
use std::cmp::Ordering;
use std::collections::BTreeMap;

pub fn summarize(
    items: &[MaterialLineItem],
    statuses: &[ItemStatus],
    projects: &[Project],
    suppliers: &[SupplierProfile],
    warning_count: usize,
    top_n: usize,
) -> SummaryMetrics {
    let status_counts = ItemStatus::ALL
        .into_iter()
        .map(|status| StatusCount {
            status,
            count: statuses.iter().filter(|&&s| s == status).count(),
        })
        .collect();

    let mut supply: BTreeMap<&'static str, (usize, f64)> = BTreeMap::new();
    for it in items {
        let e = supply.entry(it.supply_type.label()).or_insert((0, 0.0));
        e.0 += 1;
        e.1 += it.allocated_qty;
    }
    let mut supply_types: Vec<SupplyQuantity> = supply
        .into_iter()
        .map(|(label, (n, qty))| SupplyQuantity {
            supply_type: label.to_string(),
            items: n,
            allocated_qty: qty,
        })
        .collect();
    supply_types.sort_by(|a, b| b.items.cmp(&a.items).then_with(|| a.supply_type.cmp(&b.supply_type)));

    let mut blocked: Vec<BlockedProjectSummary> = projects
        .iter()
        .filter(|p| p.readiness == Readiness::Blocked)
        .map(|p| BlockedProjectSummary {
            sec_order: p.key.sec_order.clone(),
            product: p.key.product.clone(),
            blocking_count: p.blocking_items.len(),
            blocking_balance: p.blocking_items.iter().map(|&i| items[i].balance).sum(),
            max_delay: p.max_delay,
            sec_delivery: p.sec_delivery,
        })
        .collect();
    blocked.sort_by(worst_blocked_first);
    blocked.truncate(top_n);

    let ready_projects = projects
        .iter()
        .filter(|p| p.readiness == Readiness::Ready)
        .count();
    let total_req: f64 = items.iter().map(|it| it.req_qty).sum();
    let total_allocated: f64 = items.iter().map(|it| it.allocated_qty).sum();

    SummaryMetrics {
        total_items: items.len(),
        total_projects: projects.len(),
        ready_projects,
        blocked_projects: projects.len() - ready_projects,
        total_suppliers: suppliers.len(),
        overall_fulfillment_pct: percent(total_allocated, total_req),
        status_counts,
        supply_types,
        top_blocked_projects: blocked,
        top_suppliers: suppliers
            .iter()
            .filter(|s| s.delayed_count > 0)
            .take(top_n)
            .cloned()
            .collect(),
        warning_count,
    }
}

// Most blockers, then most open quantity, then the earliest delivery target
// (projects without one go last), then key.
fn worst_blocked_first(a: &BlockedProjectSummary, b: &BlockedProjectSummary) -> Ordering {
    b.blocking_count
        .cmp(&a.blocking_count)
        .then_with(|| b.blocking_balance.total_cmp(&a.blocking_balance))
        .then_with(|| match (a.sec_delivery, b.sec_delivery) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.sec_order.cmp(&b.sec_order))
        .then_with(|| a.product.cmp(&b.product))
}

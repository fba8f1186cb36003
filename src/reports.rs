use crate::analysis::Analysis;
use crate::types::{
    BlockingItemRow, Project, ProjectReadinessRow, Readiness, StatusCountRow,
    SupplierRankingRow,
};
use crate::util::{format_date, format_number};
use std::cmp::Ordering;

/// Project readiness table: blocked projects first (most blockers on top),
/// then ready projects by fulfillment.
pub fn project_readiness_rows(analysis: &Analysis) -> Vec<ProjectReadinessRow> {
    let mut projects: Vec<_> = analysis.projects.iter().collect();
    projects.sort_by(|a, b| {
        let blocked = |p: &Project| p.readiness == Readiness::Blocked;
        blocked(*b)
            .cmp(&blocked(*a))
            .then_with(|| b.blocking_items.len().cmp(&a.blocking_items.len()))
            .then_with(|| {
                b.fulfillment_pct
                    .partial_cmp(&a.fulfillment_pct)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| a.key.cmp(&b.key))
    });
    projects
        .into_iter()
        .map(|p| ProjectReadinessRow {
            sec_order: p.key.sec_order.clone(),
            product: p.key.product.clone(),
            readiness: p.readiness.to_string(),
            items: p.items.len(),
            blocking: p.blocking_items.len(),
            fulfillment_pct: format_number(p.fulfillment_pct, 1),
            max_delay: format_number(p.max_delay, 0),
            sec_delivery: format_date(p.sec_delivery),
        })
        .collect()
}

/// Every blocking line, project by project, in push-to-production order.
pub fn blocking_item_rows(analysis: &Analysis) -> Vec<BlockingItemRow> {
    let mut rows = Vec::new();
    for p in &analysis.projects {
        for (it, status) in analysis.blocking_items(p) {
            rows.push(BlockingItemRow {
                sec_order: it.sec_order.clone(),
                product: it.product.clone(),
                item: it.item.clone(),
                description: it.description.clone(),
                status: status.to_string(),
                balance: format_number(it.balance, 2),
                delay: format_number(it.delay, 0),
                supplier: it.supplier.clone(),
                eta: format_date(it.eta()),
            });
        }
    }
    rows
}

pub fn supplier_ranking_rows(analysis: &Analysis) -> Vec<SupplierRankingRow> {
    analysis
        .suppliers
        .iter()
        .map(|s| SupplierRankingRow {
            rank: s.rank,
            supplier: s.supplier.clone(),
            items: s.item_count,
            delayed_items: s.delayed_count,
            avg_delay: format_number(s.mean_delay, 2),
            max_delay: format_number(s.max_delay, 0),
            qty_delayed: format_number(s.delayed_allocated_qty, 0),
        })
        .collect()
}

pub fn status_count_rows(analysis: &Analysis) -> Vec<StatusCountRow> {
    analysis
        .metrics
        .status_counts
        .iter()
        .map(|c| StatusCountRow {
            status: c.status.to_string(),
            items: c.count,
            blocking: if c.status.is_blocking() {
                "yes".to_string()
            } else {
                "no".to_string()
            },
        })
        .collect()
}

//! Groups line items into projects and derives project readiness.
use crate::types::{
    ItemStatus, MaterialLineItem, Project, ProjectKey, Readiness, StatusCount, SupplyQuantity,
    SupplyType,
};
use crate::util::percent;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// Partition `items` by `(sec_order, product)` and derive each project.
///
/// `statuses` must be index-aligned with `items`. Projects come back sorted by
/// key, so the result depends only on the content of the input.
pub fn aggregate_projects(items: &[MaterialLineItem], statuses: &[ItemStatus]) -> Vec<Project> {
    debug_assert_eq!(items.len(), statuses.len());
    let mut groups: BTreeMap<ProjectKey, Vec<usize>> = BTreeMap::new();
    for (idx, item) in items.iter().enumerate() {
        groups.entry(item.project_key()).or_default().push(idx);
    }
    groups
        .into_iter()
        .map(|(key, members)| build_project(key, members, items, statuses))
        .collect()
}

fn build_project(
    key: ProjectKey,
    members: Vec<usize>,
    items: &[MaterialLineItem],
    statuses: &[ItemStatus],
) -> Project {
    let mut blocking_items: Vec<usize> = members
        .iter()
        .copied()
        .filter(|&i| statuses[i].is_blocking())
        .collect();
    blocking_items.sort_by(|&a, &b| blocking_order(&items[a], &items[b]).then(a.cmp(&b)));

    let readiness = if blocking_items.is_empty() {
        Readiness::Ready
    } else {
        Readiness::Blocked
    };

    let mut sec_numbers = BTreeSet::new();
    let mut supply: BTreeMap<&'static str, (usize, f64)> = BTreeMap::new();
    let (mut total_req, mut total_allocated, mut total_balance, mut max_delay) =
        (0.0, 0.0, 0.0, 0.0_f64);
    for &i in &members {
        let it = &items[i];
        total_req += it.req_qty;
        total_allocated += it.allocated_qty;
        total_balance += it.balance;
        max_delay = max_delay.max(it.delay);
        if !it.sec_number.is_empty() {
            sec_numbers.insert(it.sec_number.clone());
        }
        let e = supply.entry(it.supply_type.label()).or_insert((0, 0.0));
        e.0 += 1;
        e.1 += it.allocated_qty;
    }

    let status_counts = ItemStatus::ALL
        .into_iter()
        .map(|status| StatusCount {
            status,
            count: members.iter().filter(|&&i| statuses[i] == status).count(),
        })
        .collect();

    Project {
        sec_numbers: sec_numbers.into_iter().collect(),
        readiness,
        total_req,
        total_allocated,
        total_balance,
        fulfillment_pct: percent(total_allocated, total_req),
        max_delay,
        sec_delivery: members.iter().filter_map(|&i| items[i].sec_delivery).min(),
        roh_delivery: members.iter().filter_map(|&i| items[i].roh_delivery).min(),
        status_counts,
        supply_breakdown: supply
            .into_iter()
            .map(|(label, (n, qty))| SupplyQuantity {
                supply_type: label.to_string(),
                items: n,
                allocated_qty: qty,
            })
            .collect(),
        key,
        items: members,
        blocking_items,
    }
}

/// Push-to-production priority: biggest open balance first, then the longest
/// delay. Remaining ties are broken on every other content field; only lines
/// identical in all of them fall back to input position.
pub fn blocking_order(a: &MaterialLineItem, b: &MaterialLineItem) -> Ordering {
    b.balance
        .total_cmp(&a.balance)
        .then_with(|| b.delay.total_cmp(&a.delay))
        .then_with(|| a.item.cmp(&b.item))
        .then_with(|| a.supplier.cmp(&b.supplier))
        .then_with(|| a.source.cmp(&b.source))
        .then_with(|| a.sec_number.cmp(&b.sec_number))
        .then_with(|| a.eta().cmp(&b.eta()))
        .then_with(|| a.asn_expected_date.cmp(&b.asn_expected_date))
        .then_with(|| a.sec_delivery.cmp(&b.sec_delivery))
        .then_with(|| a.roh_delivery.cmp(&b.roh_delivery))
        .then_with(|| a.asn_creation_date.cmp(&b.asn_creation_date))
        .then_with(|| supply_text(&a.supply_type).cmp(supply_text(&b.supply_type)))
        .then_with(|| a.locater.cmp(&b.locater))
        .then_with(|| a.description.cmp(&b.description))
        .then_with(|| a.req_qty.total_cmp(&b.req_qty))
        .then_with(|| a.allocated_qty.total_cmp(&b.allocated_qty))
        .then_with(|| a.delay_reported.cmp(&b.delay_reported))
}

fn supply_text(t: &SupplyType) -> &str {
    match t {
        SupplyType::Other(raw) => raw,
        known => known.label(),
    }
}

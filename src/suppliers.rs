//! Supplier delay statistics and ranking.
use crate::types::{MaterialLineItem, SupplierProfile};
use std::collections::BTreeMap;

#[derive(Default)]
struct Acc {
    items: usize,
    delayed: usize,
    delay_sum: f64,
    max_delay: Option<f64>,
    delayed_qty: f64,
}

/// Rank every supplier that appears on at least one line.
///
/// Worst first: most delayed lines, then highest mean delay, then name.
/// Lines with a blank supplier (typically on-hand stock) are ignored.
pub fn rank_suppliers(items: &[MaterialLineItem]) -> Vec<SupplierProfile> {
    let mut map: BTreeMap<&str, Acc> = BTreeMap::new();
    for it in items.iter().filter(|it| !it.supplier.trim().is_empty()) {
        let e = map.entry(it.supplier.trim()).or_default();
        e.items += 1;
        e.delay_sum += it.delay;
        e.max_delay = Some(e.max_delay.map_or(it.delay, |m| m.max(it.delay)));
        if it.delay > 0.0 {
            e.delayed += 1;
            e.delayed_qty += it.allocated_qty;
        }
    }

    let mut profiles: Vec<SupplierProfile> = map
        .into_iter()
        .map(|(name, acc)| SupplierProfile {
            rank: 0,
            supplier: name.to_string(),
            item_count: acc.items,
            delayed_count: acc.delayed,
            mean_delay: acc.delay_sum / acc.items as f64,
            max_delay: acc.max_delay.unwrap_or(0.0),
            delayed_allocated_qty: acc.delayed_qty,
        })
        .collect();

    profiles.sort_by(|a, b| {
        b.delayed_count
            .cmp(&a.delayed_count)
            .then_with(|| b.mean_delay.total_cmp(&a.mean_delay))
            .then_with(|| a.supplier.cmp(&b.supplier))
    });
    for (idx, p) in profiles.iter_mut().enumerate() {
        p.rank = idx + 1;
    }
    profiles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::tests::line;

    fn supplied(name: &str, delay: f64) -> MaterialLineItem {
        let mut it = line("X", 10.0, delay);
        it.supplier = name.to_string();
        it.allocated_qty = 4.0;
        it
    }

    fn names(p: &[SupplierProfile]) -> Vec<&str> {
        p.iter().map(|p| p.supplier.as_str()).collect()
    }

    #[test]
    fn ranks_by_delayed_count_then_mean() {
        let items = vec![
            supplied("Acme", 2.0),
            supplied("Acme", 0.0),
            supplied("Bolt", 1.0),
            supplied("Bolt", 1.0),
            supplied("Core", 30.0),
        ];
        let ranked = rank_suppliers(&items);
        assert_eq!(names(&ranked), vec!["Bolt", "Core", "Acme"]);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[0].delayed_count, 2);
        assert_eq!(ranked[0].delayed_allocated_qty, 8.0);
        assert_eq!(ranked[2].mean_delay, 1.0);
        assert_eq!(ranked[2].max_delay, 2.0);
    }

    #[test]
    fn full_ties_fall_back_to_name() {
        let items = vec![supplied("Zeta", 3.0), supplied("Alpha", 3.0)];
        assert_eq!(names(&rank_suppliers(&items)), vec!["Alpha", "Zeta"]);
    }

    #[test]
    fn blank_suppliers_are_excluded() {
        let items = vec![supplied("", 5.0), supplied("  ", 5.0), supplied("Acme", -2.0)];
        let ranked = rank_suppliers(&items);
        assert_eq!(names(&ranked), vec!["Acme"]);
        assert_eq!(ranked[0].delayed_count, 0);
        assert_eq!(ranked[0].max_delay, -2.0);
        assert!(rank_suppliers(&[]).is_empty());
    }
}

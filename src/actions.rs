//! Push-to-production action lists for a selection of projects.
use crate::analysis::Analysis;
use crate::types::{ActionItemRow, MaterialLineItem, SupplyType};
use crate::util::{format_number, percent};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Which projects the planner is looking at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectFilter {
    SecOrder(Vec<String>),
    SecNumber(Vec<String>),
    Product(Vec<String>),
}

impl ProjectFilter {
    /// Menu choice (`1` SEC order, `2` SEC number, `3` product) plus a comma
    /// separated list of values.
    pub fn from_choice(kind: &str, values: &str) -> Option<Self> {
        let values: Vec<String> = values
            .split(',')
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect();
        match kind.trim() {
            "1" => Some(ProjectFilter::SecOrder(values)),
            "2" => Some(ProjectFilter::SecNumber(values)),
            "3" => Some(ProjectFilter::Product(values)),
            _ => None,
        }
    }

    pub fn matches(&self, it: &MaterialLineItem) -> bool {
        let (wanted, value) = match self {
            ProjectFilter::SecOrder(w) => (w, &it.sec_order),
            ProjectFilter::SecNumber(w) => (w, &it.sec_number),
            ProjectFilter::Product(w) => (w, &it.product),
        };
        wanted.iter().any(|w| w.trim() == value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionSettings {
    /// Locater code of production-floor stock that can be issued directly.
    pub wip_locater: String,
    /// Source value of unreserved on-hand stock.
    pub free_stock_source: String,
}

impl Default for ActionSettings {
    fn default() -> Self {
        Self {
            wip_locater: "1-1-1-1".to_string(),
            free_stock_source: "free_stock".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    AllClear,
    AlmostReady { blockers: usize },
    NotReady { blockers: usize },
}

impl Verdict {
    pub fn code(self) -> &'static str {
        match self {
            Verdict::AllClear => "all_clear",
            Verdict::AlmostReady { .. } => "almost_ready",
            Verdict::NotReady { .. } => "not_ready",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::AllClear => write!(f, "ALL CLEAR: ready to push to production"),
            Verdict::AlmostReady { blockers } => {
                write!(f, "ALMOST READY: clear {blockers} blocking items to proceed")
            }
            Verdict::NotReady { blockers } => {
                write!(f, "NOT READY: {blockers} critical blockers need resolution")
            }
        }
    }
}

/// Line indices (into `Analysis::items`) per action category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionPlan {
    pub total_items: usize,
    pub fulfillment_pct: f64,
    /// Delivered but awaiting quality approval.
    pub quality_hold: Vec<usize>,
    /// Received but not yet booked into inventory.
    pub goods_receipt: Vec<usize>,
    /// Sitting in the WIP locater, ready to issue.
    pub wip: Vec<usize>,
    /// On-hand stock reserved for some other job.
    pub reallocate: Vec<usize>,
    /// Open balance with nothing allocated.
    pub missing: Vec<usize>,
    pub verdict: Verdict,
}

/// Per-category counts, exported next to the row listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionSummary {
    pub total_items: usize,
    pub fulfillment_pct: f64,
    pub quality_hold: usize,
    pub goods_receipt: usize,
    pub wip: usize,
    pub reallocate: usize,
    pub missing: usize,
    pub blockers: usize,
    pub verdict: &'static str,
}

impl ActionPlan {
    pub fn blocker_count(&self) -> usize {
        self.quality_hold.len() + self.goods_receipt.len() + self.missing.len()
    }

    pub fn summary(&self) -> ActionSummary {
        ActionSummary {
            total_items: self.total_items,
            fulfillment_pct: self.fulfillment_pct,
            quality_hold: self.quality_hold.len(),
            goods_receipt: self.goods_receipt.len(),
            wip: self.wip.len(),
            reallocate: self.reallocate.len(),
            missing: self.missing.len(),
            blockers: self.blocker_count(),
            verdict: self.verdict.code(),
        }
    }

    /// One table row per listed line, grouped by category.
    pub fn rows(&self, analysis: &Analysis) -> Vec<ActionItemRow> {
        let sections: [(&str, &[usize], fn(&MaterialLineItem) -> f64); 5] = [
            ("QC hold", &self.quality_hold[..], allocated),
            ("GR pending", &self.goods_receipt[..], allocated),
            ("WIP issue", &self.wip[..], allocated),
            ("Reallocate", &self.reallocate[..], allocated),
            ("Missing", &self.missing[..], open_balance),
        ];
        sections
            .iter()
            .flat_map(|(category, idx, qty)| {
                idx.iter().map(move |&i| {
                    let it = &analysis.items[i];
                    ActionItemRow {
                        category: category.to_string(),
                        sec_order: it.sec_order.clone(),
                        item: it.item.clone(),
                        description: it.description.clone(),
                        qty: format_number(qty(it), 0),
                        source: it.source.clone(),
                        locater: it.locater.clone(),
                        supplier: it.supplier.clone(),
                    }
                })
            })
            .collect()
    }
}

fn allocated(it: &MaterialLineItem) -> f64 {
    it.allocated_qty
}

fn open_balance(it: &MaterialLineItem) -> f64 {
    it.balance
}

fn pick(
    items: &[MaterialLineItem],
    selected: &[usize],
    pred: impl Fn(&MaterialLineItem) -> bool,
) -> Vec<usize> {
    selected.iter().copied().filter(|&i| pred(&items[i])).collect()
}

/// Build the action lists for every line matching `filter`.
/// Returns `None` when the selection is empty.
pub fn action_plan(
    analysis: &Analysis,
    filter: &ProjectFilter,
    settings: &ActionSettings,
) -> Option<ActionPlan> {
    let selected: Vec<usize> = analysis
        .items
        .iter()
        .enumerate()
        .filter(|(_, it)| filter.matches(it))
        .map(|(i, _)| i)
        .collect();
    if selected.is_empty() {
        return None;
    }

    let orders: BTreeSet<&str> = selected
        .iter()
        .map(|&i| analysis.items[i].sec_order.as_str())
        .collect();
    let items = &analysis.items;
    let quality_hold = pick(items, &selected, |it| it.supply_type == SupplyType::QualityControl);
    let goods_receipt = pick(items, &selected, |it| it.supply_type == SupplyType::GoodsReceipt);
    let wip = pick(items, &selected, |it| it.locater == settings.wip_locater);
    let reallocate = pick(items, &selected, |it| {
        it.supply_type == SupplyType::OnHand
            && !it.source.is_empty()
            && it.source != "-"
            && it.source != settings.free_stock_source
            && !orders.contains(it.source.as_str())
    });
    let missing = pick(items, &selected, |it| it.balance > 0.0 && it.allocated_qty <= 0.0);

    let req: f64 = selected.iter().map(|&i| items[i].req_qty).sum();
    let alloc: f64 = selected.iter().map(|&i| items[i].allocated_qty).sum();
    let fulfillment_pct = percent(alloc, req);

    let blockers = quality_hold.len() + goods_receipt.len() + missing.len();
    let verdict = if blockers == 0 && fulfillment_pct >= 100.0 {
        Verdict::AllClear
    } else if blockers <= 3 && fulfillment_pct >= 90.0 {
        Verdict::AlmostReady { blockers }
    } else {
        Verdict::NotReady { blockers }
    };

    Some(ActionPlan {
        total_items: selected.len(),
        fulfillment_pct,
        quality_hold,
        goods_receipt,
        wip,
        reallocate,
        missing,
        verdict,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{analyze, AnalysisOptions};
    use crate::types::RawRecord;

    fn row(pairs: &[(&str, &str)]) -> RawRecord {
        let mut r: RawRecord = [
            ("SEC order", "SO-1"),
            ("SEC Number", "SEC-1"),
            ("product", "PUMP"),
            ("delay", "0"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        for (k, v) in pairs {
            r.insert(k.to_string(), v.to_string());
        }
        r
    }

    fn analysis() -> Analysis {
        let records = vec![
            row(&[("item", "A"), ("supply_type", "QC"), ("req_qty", "10"), ("allocated_qty", "10")]),
            row(&[("item", "B"), ("supply_type", "GR_in_process"), ("req_qty", "10"), ("allocated_qty", "10")]),
            row(&[("item", "C"), ("supply_type", "inventory"), ("source", "SO-9"), ("req_qty", "10"), ("allocated_qty", "10")]),
            row(&[("item", "D"), ("supply_type", "inventory"), ("source", "free_stock"), ("locater", "1-1-1-1"), ("req_qty", "10"), ("allocated_qty", "10")]),
            row(&[("item", "E"), ("supply_type", "inventory"), ("source", "SO-1"), ("req_qty", "10"), ("allocated_qty", "10")]),
            row(&[("item", "F"), ("supply_type", "PR"), ("req_qty", "10"), ("allocated_qty", "0")]),
            row(&[("SEC order", "SO-2"), ("SEC Number", "SEC-2"), ("item", "G"), ("req_qty", "10"), ("allocated_qty", "10")]),
        ];
        analyze(&records, &AnalysisOptions::default()).unwrap()
    }

    #[test]
    fn categorises_selected_lines() {
        let a = analysis();
        let plan = action_plan(
            &a,
            &ProjectFilter::SecOrder(vec!["SO-1".to_string()]),
            &ActionSettings::default(),
        )
        .unwrap();
        assert_eq!(plan.total_items, 6);
        assert_eq!(plan.quality_hold, vec![0]);
        assert_eq!(plan.goods_receipt, vec![1]);
        assert_eq!(plan.reallocate, vec![2]);
        assert_eq!(plan.wip, vec![3]);
        assert_eq!(plan.missing, vec![5]);
        assert_eq!(plan.blocker_count(), 3);
        assert!((plan.fulfillment_pct - 500.0 / 6.0).abs() < 1e-9);
        assert_eq!(plan.verdict, Verdict::NotReady { blockers: 3 });
        assert_eq!(plan.rows(&a).len(), 5);
        assert_eq!(plan.rows(&a)[4].qty, "10");

        let summary = plan.summary();
        assert_eq!(summary.missing, 1);
        assert_eq!(summary.blockers, 3);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["verdict"], "not_ready");
        assert_eq!(json["reallocate"], 1);
    }

    #[test]
    fn clean_selection_is_all_clear() {
        let a = analysis();
        let plan = action_plan(
            &a,
            &ProjectFilter::SecNumber(vec!["SEC-2".to_string()]),
            &ActionSettings::default(),
        )
        .unwrap();
        assert_eq!(plan.total_items, 1);
        assert_eq!(plan.verdict, Verdict::AllClear);
        assert!(plan.rows(&a).is_empty());
    }

    #[test]
    fn near_complete_selection_is_almost_ready() {
        let mut records: Vec<RawRecord> = (0..9)
            .map(|i| {
                let item = format!("OK-{i}");
                row(&[("item", item.as_str()), ("req_qty", "10"), ("allocated_qty", "10")])
            })
            .collect();
        records.push(row(&[("item", "QC-1"), ("supply_type", "QC"), ("req_qty", "10"), ("allocated_qty", "10")]));
        let a = analyze(&records, &AnalysisOptions::default()).unwrap();
        let plan = action_plan(
            &a,
            &ProjectFilter::Product(vec!["PUMP".to_string()]),
            &ActionSettings::default(),
        )
        .unwrap();
        assert_eq!(plan.verdict, Verdict::AlmostReady { blockers: 1 });
    }

    #[test]
    fn filter_from_menu_choice() {
        assert_eq!(
            ProjectFilter::from_choice("1", "SO-1, SO-2,"),
            Some(ProjectFilter::SecOrder(vec!["SO-1".to_string(), "SO-2".to_string()]))
        );
        assert_eq!(
            ProjectFilter::from_choice(" 2", "SEC-2"),
            Some(ProjectFilter::SecNumber(vec!["SEC-2".to_string()]))
        );
        assert_eq!(
            ProjectFilter::from_choice("3", "PUMP"),
            Some(ProjectFilter::Product(vec!["PUMP".to_string()]))
        );
        assert_eq!(ProjectFilter::from_choice("4", "PUMP"), None);

        let a = analysis();
        let by_number = ProjectFilter::from_choice("2", "SEC-1").unwrap();
        let plan = action_plan(&a, &by_number, &ActionSettings::default()).unwrap();
        assert_eq!(plan.total_items, 6);
    }

    #[test]
    fn empty_selection_is_none() {
        let a = analysis();
        let filter = ProjectFilter::Product(vec!["VALVE".to_string()]);
        assert!(action_plan(&a, &filter, &ActionSettings::default()).is_none());
    }
}

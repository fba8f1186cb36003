//! Cross-project view of a single material.
use crate::analysis::Analysis;
use crate::types::SupplyType;
use crate::util::format_number;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectAllocation {
    pub sec_order: String,
    pub req_qty: f64,
    pub allocated_qty: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplySource {
    pub supply_type: String,
    pub source: String,
    pub allocated_qty: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialInquiry {
    pub item: String,
    pub description: String,
    pub total_req: f64,
    pub total_allocated: f64,
    pub total_balance: f64,
    pub by_project: Vec<ProjectAllocation>,
    pub supply_sources: Vec<SupplySource>,
    pub issues: Vec<String>,
    /// Indices of the matching lines in `Analysis::items`.
    pub lines: Vec<usize>,
}

/// Everything known about `item_code`, or `None` if no line carries it.
pub fn inquire(analysis: &Analysis, item_code: &str) -> Option<MaterialInquiry> {
    let code = item_code.trim();
    let lines: Vec<usize> = analysis
        .items
        .iter()
        .enumerate()
        .filter(|(_, it)| it.item == code)
        .map(|(i, _)| i)
        .collect();
    let first = &analysis.items[*lines.first()?];

    let mut by_project: BTreeMap<&str, (f64, f64, f64)> = BTreeMap::new();
    let mut sources: BTreeMap<(&'static str, &str), f64> = BTreeMap::new();
    let (mut qc, mut gr, mut late_po, mut to_request) = (0.0, 0.0, 0.0, 0.0);
    for &i in &lines {
        let it = &analysis.items[i];
        let e = by_project.entry(it.sec_order.as_str()).or_insert((0.0, 0.0, 0.0));
        e.0 += it.req_qty;
        e.1 += it.allocated_qty;
        e.2 += it.balance;
        *sources
            .entry((it.supply_type.label(), it.source.as_str()))
            .or_insert(0.0) += it.allocated_qty;
        match it.supply_type {
            SupplyType::QualityControl => qc += it.allocated_qty,
            SupplyType::GoodsReceipt => gr += it.allocated_qty,
            SupplyType::Purchased if it.delay > 0.0 => late_po += it.allocated_qty,
            SupplyType::Requisition => to_request += it.balance,
            _ => {}
        }
    }

    let mut issues = Vec::new();
    if qc > 0.0 {
        issues.push(format!("{} units stuck in QC", format_number(qc, 0)));
    }
    if gr > 0.0 {
        issues.push(format!("{} units in goods receipt", format_number(gr, 0)));
    }
    if late_po > 0.0 {
        issues.push(format!("{} units on delayed POs", format_number(late_po, 0)));
    }
    if to_request > 0.0 {
        issues.push(format!("{} units need PR creation", format_number(to_request, 0)));
    }

    let by_project: Vec<ProjectAllocation> = by_project
        .into_iter()
        .map(|(order, (req, alloc, bal))| ProjectAllocation {
            sec_order: order.to_string(),
            req_qty: req,
            allocated_qty: alloc,
            balance: bal,
        })
        .collect();

    Some(MaterialInquiry {
        item: code.to_string(),
        description: first.description.clone(),
        total_req: by_project.iter().map(|p| p.req_qty).sum(),
        total_allocated: by_project.iter().map(|p| p.allocated_qty).sum(),
        total_balance: by_project.iter().map(|p| p.balance).sum(),
        supply_sources: sources
            .into_iter()
            .map(|((supply_type, source), qty)| SupplySource {
                supply_type: supply_type.to_string(),
                source: source.to_string(),
                allocated_qty: qty,
            })
            .collect(),
        by_project,
        issues,
        lines,
    })
}

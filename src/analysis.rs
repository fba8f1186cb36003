//! One full analysis pass over a snapshot of extract rows.
use crate::classify::classify_all;
use crate::error::{AnalysisError, Result};
use crate::metrics::summarize;
use crate::normalize::normalize_all;
use crate::projects::aggregate_projects;
use crate::suppliers::rank_suppliers;
use crate::types::{
    ItemStatus, MaterialLineItem, Project, RawRecord, SummaryMetrics, SupplierProfile,
};
use crate::warnings::{DataQualityWarning, WarningKind};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisOptions {
    /// Length of the top-blocked-projects and top-suppliers lists.
    pub top_n: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self { top_n: 10 }
    }
}

/// Everything derived from one input snapshot. Plain data, ready to render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub items: Vec<MaterialLineItem>,
    /// Index-aligned with `items`.
    pub statuses: Vec<ItemStatus>,
    pub projects: Vec<Project>,
    pub suppliers: Vec<SupplierProfile>,
    pub metrics: SummaryMetrics,
    pub warnings: Vec<DataQualityWarning>,
}

impl Analysis {
    pub fn status_of(&self, idx: usize) -> ItemStatus {
        self.statuses[idx]
    }

    pub fn project(&self, sec_order: &str, product: &str) -> Option<&Project> {
        self.projects
            .iter()
            .find(|p| p.key.sec_order == sec_order && p.key.product == product)
    }

    /// Blocking lines of `project`, in priority order.
    pub fn blocking_items<'a>(
        &'a self,
        project: &'a Project,
    ) -> impl Iterator<Item = (&'a MaterialLineItem, ItemStatus)> + 'a {
        project
            .blocking_items
            .iter()
            .map(move |&i| (&self.items[i], self.statuses[i]))
    }
}

/// Run the whole pipeline: normalize, classify, group, rank, summarise.
///
/// Bad rows are skipped and reported in `Analysis::warnings`. Fails only with
/// `EmptyDataset` when no row survives normalization.
pub fn analyze<'a, I>(records: I, options: &AnalysisOptions) -> Result<Analysis>
where
    I: IntoIterator<Item = &'a RawRecord>,
{
    let (items, warnings) = normalize_all(records);
    if items.is_empty() {
        let skipped_rows = warnings
            .iter()
            .filter(|w| w.kind == WarningKind::RowSkipped)
            .count();
        warn!(skipped_rows, "analysis aborted: no usable rows");
        return Err(AnalysisError::EmptyDataset {
            total_rows: skipped_rows,
            skipped_rows,
        });
    }

    let statuses = classify_all(&items);
    let projects = aggregate_projects(&items, &statuses);
    let suppliers = rank_suppliers(&items);
    let metrics = summarize(
        &items,
        &statuses,
        &projects,
        &suppliers,
        warnings.len(),
        options.top_n,
    );
    info!(
        items = items.len(),
        projects = projects.len(),
        blocked = metrics.blocked_projects,
        suppliers = suppliers.len(),
        warnings = warnings.len(),
        "analysis complete"
    );

    Ok(Analysis {
        items,
        statuses,
        projects,
        suppliers,
        metrics,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Readiness;

    fn raw(pairs: &[(&str, &str)]) -> RawRecord {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_input_is_an_error() {
        let records: Vec<RawRecord> = Vec::new();
        let err = analyze(&records, &AnalysisOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::EmptyDataset {
                total_rows: 0,
                skipped_rows: 0
            }
        ));
    }

    #[test]
    fn all_rows_unusable_is_an_error() {
        let records = vec![raw(&[("item", "X")]), raw(&[("product", "P")])];
        let err = analyze(&records, &AnalysisOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::EmptyDataset {
                total_rows: 2,
                skipped_rows: 2
            }
        ));
    }

    #[test]
    fn delayed_line_blocks_its_project() {
        let records = vec![
            raw(&[
                ("SEC order", "SO-1"),
                ("product", "PUMP"),
                ("item", "BOLT"),
                ("req_qty", "100"),
                ("allocated_qty", "100"),
                ("delay", "0"),
            ]),
            raw(&[
                ("SEC order", "SO-1"),
                ("product", "PUMP"),
                ("item", "SEAL"),
                ("req_qty", "20"),
                ("allocated_qty", "0"),
                ("delay", "5"),
                ("supplier", "Acme"),
            ]),
            raw(&[("SEC order", "SO-1"), ("item", "NUT")]),
        ];
        let a = analyze(&records, &AnalysisOptions::default()).unwrap();
        assert_eq!(a.items.len(), 2);
        assert_eq!(a.warnings.len(), 1);
        let p = a.project("SO-1", "PUMP").unwrap();
        assert_eq!(p.readiness, Readiness::Blocked);
        let blockers: Vec<_> = a.blocking_items(p).collect();
        assert_eq!(blockers.len(), 1);
        assert_eq!(blockers[0].0.item, "SEAL");
        assert_eq!(blockers[0].1, ItemStatus::Delayed);
        assert_eq!(a.status_of(0), ItemStatus::Available);
    }
}

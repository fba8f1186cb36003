//! Non-fatal data-quality findings collected while normalizing rows.

use serde::Serialize;
use std::fmt;
use tabled::Tabled;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    RowSkipped,
    NumericCoerced,
    DateUnparseable,
    NoDelayData,
    BalanceMismatch,
    NegativeQuantity,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WarningKind::RowSkipped => "row skipped",
            WarningKind::NumericCoerced => "numeric coerced",
            WarningKind::DateUnparseable => "date unparseable",
            WarningKind::NoDelayData => "no delay data",
            WarningKind::BalanceMismatch => "balance mismatch",
            WarningKind::NegativeQuantity => "negative quantity",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct DataQualityWarning {
    #[serde(rename = "Row")]
    #[tabled(rename = "Row")]
    pub row: usize,
    /// Column the finding is about; empty for whole-row findings.
    #[serde(rename = "Field")]
    #[tabled(rename = "Field")]
    pub field: String,
    #[serde(rename = "Kind")]
    #[tabled(rename = "Kind")]
    pub kind: WarningKind,
    #[serde(rename = "Detail")]
    #[tabled(rename = "Detail")]
    pub detail: String,
}

impl DataQualityWarning {
    pub fn new(row: usize, field: &str, kind: WarningKind, detail: impl Into<String>) -> Self {
        Self {
            row,
            field: field.to_string(),
            kind,
            detail: detail.into(),
        }
    }
}

/// Number of warnings of each kind, in first-seen order.
pub fn count_by_kind(warnings: &[DataQualityWarning]) -> Vec<(WarningKind, usize)> {
    let mut counts: Vec<(WarningKind, usize)> = Vec::new();
    for w in warnings {
        match counts.iter_mut().find(|(k, _)| *k == w.kind) {
            Some((_, n)) => *n += 1,
            None => counts.push((w.kind, 1)),
        }
    }
    counts
}

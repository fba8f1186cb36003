//! Turns raw extract rows into canonical `MaterialLineItem`s.
//!
//! Header lookup is case-insensitive and ignores surrounding whitespace, so
//! `"SEC Order"` and `"sec order "` both resolve to the `SEC order` column.
use crate::error::NormalizeError;
use crate::types::{columns, MaterialLineItem, RawRecord, SupplyType};
use crate::util::{parse_date, parse_number, DateParse, NumberParse};
use crate::warnings::{DataQualityWarning, WarningKind};
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::debug;

/// Supplied and computed balances closer than this are considered equal.
const BALANCE_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub item: MaterialLineItem,
    pub warnings: Vec<DataQualityWarning>,
}

struct RowReader<'a> {
    row: usize,
    cells: HashMap<String, &'a str>,
    warnings: Vec<DataQualityWarning>,
}

impl<'a> RowReader<'a> {
    fn new(row: usize, raw: &'a RawRecord) -> Self {
        let cells = raw
            .iter()
            .map(|(k, v)| (header_key(k), v.as_str()))
            .collect();
        Self {
            row,
            cells,
            warnings: Vec::new(),
        }
    }

    fn cell(&self, column: &str) -> Option<&'a str> {
        self.cells
            .get(&header_key(column))
            .copied()
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    fn text(&self, column: &str) -> String {
        self.cell(column).unwrap_or_default().to_string()
    }

    fn identifier(&self, column: &'static str) -> Result<String, NormalizeError> {
        self.cell(column)
            .map(str::to_string)
            .ok_or(NormalizeError::MissingIdentifier { field: column })
    }

    fn warn(&mut self, column: &str, kind: WarningKind, detail: String) {
        self.warnings
            .push(DataQualityWarning::new(self.row, column, kind, detail));
    }

    /// Non-negative quantity; blank cells count as 0.
    fn quantity(&mut self, column: &str) -> f64 {
        match parse_number(self.cell(column)) {
            NumberParse::Absent => 0.0,
            NumberParse::Parsed(v) => self.non_negative(column, v),
            NumberParse::Unparseable => {
                let raw = self.text(column);
                self.warn(
                    column,
                    WarningKind::NumericCoerced,
                    format!("'{raw}' is not a number, treated as 0"),
                );
                0.0
            }
        }
    }

    fn non_negative(&mut self, column: &str, v: f64) -> f64 {
        if v < 0.0 {
            self.warn(
                column,
                WarningKind::NegativeQuantity,
                format!("{v} clamped to 0"),
            );
            0.0
        } else {
            v
        }
    }

    /// Supplied balance wins over the computed one; disagreement is reported.
    fn balance(&mut self, req_qty: f64, allocated_qty: f64) -> f64 {
        let computed = (req_qty - allocated_qty).max(0.0);
        match parse_number(self.cell(columns::BALANCE)) {
            NumberParse::Absent => computed,
            NumberParse::Parsed(v) => {
                let supplied = self.non_negative(columns::BALANCE, v);
                if (supplied - computed).abs() > BALANCE_TOLERANCE {
                    self.warn(
                        columns::BALANCE,
                        WarningKind::BalanceMismatch,
                        format!("supplied {supplied} but req_qty - allocated_qty gives {computed}"),
                    );
                }
                supplied
            }
            NumberParse::Unparseable => {
                let raw = self.text(columns::BALANCE);
                self.warn(
                    columns::BALANCE,
                    WarningKind::NumericCoerced,
                    format!("'{raw}' is not a number, using computed {computed}"),
                );
                computed
            }
        }
    }

    /// Signed delay in days plus whether the value came from the row.
    fn delay(&mut self) -> (f64, bool) {
        match parse_number(self.cell(columns::DELAY)) {
            NumberParse::Parsed(v) => (v, true),
            NumberParse::Absent => {
                self.warn(
                    columns::DELAY,
                    WarningKind::NoDelayData,
                    "blank delay treated as 0".to_string(),
                );
                (0.0, false)
            }
            NumberParse::Unparseable => {
                let raw = self.text(columns::DELAY);
                self.warn(
                    columns::DELAY,
                    WarningKind::NumericCoerced,
                    format!("'{raw}' is not a number, treated as 0"),
                );
                (0.0, false)
            }
        }
    }

    fn date(&mut self, column: &str) -> Option<NaiveDate> {
        match parse_date(self.cell(column)) {
            DateParse::Parsed(d) => Some(d),
            DateParse::Absent => None,
            DateParse::Unparseable => {
                let raw = self.text(column);
                self.warn(
                    column,
                    WarningKind::DateUnparseable,
                    format!("'{raw}' is not a recognised date"),
                );
                None
            }
        }
    }
}

fn header_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Normalize a single row. `row` is its 1-based position in the input.
///
/// Only a missing identifier fails the row; every other problem is defaulted
/// and reported in `Normalized::warnings`.
pub fn normalize_record(row: usize, raw: &RawRecord) -> Result<Normalized, NormalizeError> {
    let mut r = RowReader::new(row, raw);

    let sec_order = r.identifier(columns::SEC_ORDER)?;
    let product = r.identifier(columns::PRODUCT)?;
    let item = r.identifier(columns::ITEM)?;

    let req_qty = r.quantity(columns::REQ_QTY);
    let allocated_qty = r.quantity(columns::ALLOCATED_QTY);
    let balance = r.balance(req_qty, allocated_qty);
    let (delay, delay_reported) = r.delay();

    let item = MaterialLineItem {
        row,
        sec_order,
        sec_number: r.text(columns::SEC_NUMBER),
        product,
        item,
        description: r.text(columns::DESCRIPTION),
        req_qty,
        allocated_qty,
        balance,
        supply_type: SupplyType::parse(&r.text(columns::SUPPLY_TYPE)),
        source: r.text(columns::SOURCE),
        locater: r.text(columns::LOCATER),
        supplier: r.text(columns::SUPPLIER),
        delay,
        delay_reported,
        availability_date: r.date(columns::AVAILABILITY_DATE),
        roh_delivery: r.date(columns::ROH_DELIVERY),
        sec_delivery: r.date(columns::SEC_DELIVERY),
        asn_expected_date: r.date(columns::ASN_EXPECTED_DATE),
        asn_creation_date: r.date(columns::ASN_CREATION_DATE),
    };
    Ok(Normalized {
        item,
        warnings: r.warnings,
    })
}

/// Normalize a whole batch. Rows that fail are dropped and reported as
/// `RowSkipped` warnings; the batch itself never fails.
pub fn normalize_all<'a, I>(records: I) -> (Vec<MaterialLineItem>, Vec<DataQualityWarning>)
where
    I: IntoIterator<Item = &'a RawRecord>,
{
    let mut items = Vec::new();
    let mut warnings = Vec::new();
    for (idx, raw) in records.into_iter().enumerate() {
        let row = idx + 1;
        match normalize_record(row, raw) {
            Ok(n) => {
                items.push(n.item);
                warnings.extend(n.warnings);
            }
            Err(e) => {
                debug!(row, error = %e, "skipping row");
                let field = match &e {
                    NormalizeError::MissingIdentifier { field } => *field,
                };
                warnings.push(DataQualityWarning::new(
                    row,
                    field,
                    WarningKind::RowSkipped,
                    e.to_string(),
                ));
            }
        }
    }
    (items, warnings)
}

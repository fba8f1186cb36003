use crate::error::Result;
use crate::types::{columns, RawRecord};
use csv::ReaderBuilder;
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub blank_rows: usize,
    /// Documented extract columns that the header row does not contain.
    pub missing_columns: Vec<String>,
}

/// Raw rows of one source snapshot plus its content fingerprint.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub fingerprint: String,
    pub records: Vec<RawRecord>,
    pub report: LoadReport,
}

/// SHA-256 of the source bytes, hex encoded.
pub fn fingerprint(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

pub fn load_path(path: &Path) -> Result<LoadedDataset> {
    let bytes = std::fs::read(path)?;
    let dataset = load_bytes(&bytes)?;
    info!(
        path = %path.display(),
        rows = dataset.report.total_rows,
        fingerprint = %&dataset.fingerprint[..12],
        "loaded material study"
    );
    Ok(dataset)
}

/// Parse CSV bytes into raw records.
///
/// Cells are decoded lossily so a stray non-UTF-8 byte never loses a row, and
/// short or long rows are accepted as they are. Completely blank rows (common
/// at the bottom of spreadsheet exports) are dropped.
pub fn load_bytes(bytes: &[u8]) -> Result<LoadedDataset> {
    let fingerprint = fingerprint(bytes);
    let body = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(body);

    let headers: Vec<String> = rdr
        .byte_headers()?
        .iter()
        .map(|h| String::from_utf8_lossy(h).trim().to_string())
        .collect();
    let missing_columns: Vec<String> = columns::ALL
        .iter()
        .filter(|c| !headers.iter().any(|h| h.eq_ignore_ascii_case(c)))
        .map(|c| c.to_string())
        .collect();
    if !missing_columns.is_empty() {
        warn!(missing = ?missing_columns, "extract is missing documented columns");
    }

    let mut records = Vec::new();
    let mut blank_rows = 0usize;
    for result in rdr.byte_records() {
        let rec = result?;
        if rec.iter().all(|cell| cell.iter().all(u8::is_ascii_whitespace)) {
            blank_rows += 1;
            continue;
        }
        let row: RawRecord = headers
            .iter()
            .zip(rec.iter())
            .filter(|(h, _)| !h.is_empty())
            .map(|(h, cell)| (h.clone(), String::from_utf8_lossy(cell).into_owned()))
            .collect();
        records.push(row);
    }

    let report = LoadReport {
        total_rows: records.len(),
        blank_rows,
        missing_columns,
    };
    Ok(LoadedDataset {
        fingerprint,
        records,
        report,
    })
}

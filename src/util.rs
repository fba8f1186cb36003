// Utility helpers for parsing and basic statistics.
//
// All of the "dirty" spreadsheet handling lives here so the engine modules can
// work on clean, typed values. Parsers report three outcomes instead of a bare
// `Option` because an empty cell and a cell holding garbage are different
// data-quality situations.
use chrono::{Duration, NaiveDate, NaiveDateTime};
use num_format::{Locale, ToFormattedString};

/// Outcome of a lenient numeric parse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberParse {
    Absent,
    Parsed(f64),
    Unparseable,
}

/// Outcome of a lenient date parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateParse {
    Absent,
    Parsed(NaiveDate),
    Unparseable,
}

/// Slash dates are read month-first; day-first is tried only when that fails.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d.%m.%Y",
    "%d-%b-%Y",
];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Serial day numbers outside this window are not treated as spreadsheet dates.
const SERIAL_DAY_RANGE: std::ops::RangeInclusive<f64> = 1.0..=80_000.0;

/// Parse a cell into `f64`, forgiving the formatting noise that is common in
/// spreadsheet exports.
///
/// - Trims whitespace and strips thousands separators (`","`).
/// - Accepts a leading numeric token followed by unit text, so `"5 days"`
///   yields `5.0`.
/// - Blank cells are `Absent`; anything else that yields no number is
///   `Unparseable`.
pub fn parse_number(s: Option<&str>) -> NumberParse {
    let Some(s) = s.map(str::trim).filter(|s| !s.is_empty()) else {
        return NumberParse::Absent;
    };
    let cleaned = s.replace(',', "");
    if let Ok(v) = cleaned.parse::<f64>() {
        return if v.is_finite() {
            NumberParse::Parsed(v)
        } else {
            NumberParse::Unparseable
        };
    }
    match leading_number(&cleaned) {
        Some(v) => NumberParse::Parsed(v),
        None => NumberParse::Unparseable,
    }
}

fn leading_number(s: &str) -> Option<f64> {
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (idx, c) in s.char_indices() {
        match c {
            '+' | '-' if idx == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = idx + c.len_utf8();
    }
    if !seen_digit {
        return None;
    }
    s[..end].trim_end_matches('.').parse::<f64>().ok()
}

/// Parse a date cell. Accepts the usual textual layouts plus spreadsheet
/// serial day numbers (days since 1899-12-30).
pub fn parse_date(s: Option<&str>) -> DateParse {
    let Some(s) = s.map(str::trim).filter(|s| !s.is_empty()) else {
        return DateParse::Absent;
    };
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return DateParse::Parsed(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return DateParse::Parsed(dt.date());
        }
    }
    if let Ok(serial) = s.parse::<f64>() {
        if SERIAL_DAY_RANGE.contains(&serial) {
            if let Some(d) = serial_day_to_date(serial) {
                return DateParse::Parsed(d);
            }
        }
    }
    DateParse::Unparseable
}

fn serial_day_to_date(serial: f64) -> Option<NaiveDate> {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.trunc() as i64))
}

/// Percentage of `part` in `whole`, 0 when `whole` is not positive.
pub fn percent(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus locale-aware thousands separators (`1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

pub fn format_date(d: Option<NaiveDate>) -> String {
    d.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_accept_separators_and_units() {
        assert_eq!(parse_number(Some(" 1,250.5 ")), NumberParse::Parsed(1250.5));
        assert_eq!(parse_number(Some("5 days")), NumberParse::Parsed(5.0));
        assert_eq!(parse_number(Some("-3")), NumberParse::Parsed(-3.0));
    }

    #[test]
    fn blank_and_garbage_numbers_are_distinguished() {
        assert_eq!(parse_number(None), NumberParse::Absent);
        assert_eq!(parse_number(Some("   ")), NumberParse::Absent);
        assert_eq!(parse_number(Some("late")), NumberParse::Unparseable);
        assert_eq!(parse_number(Some("-")), NumberParse::Unparseable);
    }

    #[test]
    fn dates_in_common_layouts() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        for raw in [
            "2024-03-15",
            "2024/03/15",
            "15/03/2024",
            "15.03.2024",
            "15-Mar-2024",
            "2024-03-15 00:00:00",
            "2024-03-15T08:30:00",
        ] {
            assert_eq!(parse_date(Some(raw)), DateParse::Parsed(expected), "{raw}");
        }
    }

    #[test]
    fn slash_dates_prefer_month_first() {
        let d = |m, day| DateParse::Parsed(NaiveDate::from_ymd_opt(2024, m, day).unwrap());
        assert_eq!(parse_date(Some("3/15/2024")), d(3, 15));
        assert_eq!(parse_date(Some("03/05/2024")), d(3, 5));
        assert_eq!(parse_date(Some("12/1/2024")), d(12, 1));
        // No 15th month, so this can only be day-first.
        assert_eq!(parse_date(Some("15/3/2024")), d(3, 15));
        assert_eq!(parse_date(Some("31/12/2024")), d(12, 31));
        assert_eq!(parse_date(Some("13/13/2024")), DateParse::Unparseable);
    }

    #[test]
    fn spreadsheet_serial_dates() {
        // 45366 is 2024-03-15 in the 1900 date system.
        assert_eq!(
            parse_date(Some("45366")),
            DateParse::Parsed(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
        );
        assert_eq!(parse_date(Some("not a date")), DateParse::Unparseable);
        assert_eq!(parse_date(Some("")), DateParse::Absent);
    }

    #[test]
    fn formatting() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-12.5, 1), "-12.5");
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_int(9855usize), "9,855");
        assert_eq!(percent(50.0, 200.0), 25.0);
        assert_eq!(percent(5.0, 0.0), 0.0);
    }
}

//! Date and amount parsing for individual cells.
//!
//! Bank exports mix spreadsheet serial dates, day-first and month-first text
//! dates, currency prefixes, thousands separators and accounting parentheses.
//! Everything here is infallible: unparseable input yields `None`.

use std::sync::LazyLock;

use chrono::{Datelike, Duration, NaiveDate};
use ledgerlift_core::RawCell;
use regex::Regex;

/// Serial day numbers accepted as dates (1970-01-01 onwards).
const SERIAL_MIN: f64 = 25569.0;
const SERIAL_MAX: f64 = 1_000_000.0;

/// Tried in order; the first parse with a plausible year wins.
/// chrono accepts unpadded day/month digits for `%d`/`%m`, so these also cover
/// `d/M/yyyy`, `d-M-yyyy` and `d.M.yyyy`.
const DATE_FORMATS: &[&str] = &[
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%Y/%m/%d",
    "%d-%b-%Y",
    "%d %b %Y",
    "%d/%b/%Y",
];

const CURRENCY_SYMBOLS: &[char] = &['$', '€', '£', '¥', '₹', '₨'];

static CURRENCY_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(inr|usd|eur|gbp|rs\.?)|(inr|usd|eur|gbp)$").expect("static regex")
});

static DRCR_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(cr|dr)\.?$").expect("static regex"));

static PURE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\(?[+-]?\d[\d,]*(\.\d+)?\)?$").expect("static regex"));

/// Spreadsheet serial day number to calendar date (epoch 1899-12-30).
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::try_days(serial.floor() as i64)?)
}

fn is_serial_date(value: f64) -> bool {
    (SERIAL_MIN..=SERIAL_MAX).contains(&value)
}

/// Parse a textual date: serial number first, then the explicit formats.
pub fn parse_date_text(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(serial) = s.parse::<f64>() {
        if is_serial_date(serial) {
            return serial_to_date(serial);
        }
    }

    // "01/02/2024 10:15:00" and "2024-01-02T10:15:00"
    let date_part = s.split([' ', 'T']).next().unwrap_or(s);

    let candidates = if date_part.len() < s.len() {
        vec![s, date_part]
    } else {
        vec![s]
    };

    candidates.into_iter().find_map(|candidate| {
        DATE_FORMATS.iter().find_map(|fmt| {
            NaiveDate::parse_from_str(candidate, fmt)
                .ok()
                .filter(|d| d.year() > 1900 && d.year() < 2100)
        })
    })
}

pub fn parse_date(cell: &RawCell) -> Option<NaiveDate> {
    match cell {
        RawCell::Date { value, .. } => Some(*value),
        RawCell::Number { value, display } => {
            if is_serial_date(*value) {
                serial_to_date(*value)
            } else {
                parse_date_text(display)
            }
        }
        RawCell::Text { text } => parse_date_text(text),
        RawCell::Empty => None,
    }
}

/// Parse a monetary string. Parenthesised values and a trailing `Dr` are
/// negative. Anything still alphabetic after cleanup is rejected.
pub fn parse_amount_text(raw: &str) -> Option<f64> {
    let mut s: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && !CURRENCY_SYMBOLS.contains(c))
        .map(|c| if c == '\u{2212}' { '-' } else { c })
        .collect();

    let mut negative = false;
    if let Some(marker) = DRCR_SUFFIX.find(&s) {
        negative = marker.as_str().to_ascii_lowercase().starts_with("dr");
        s.truncate(marker.start());
    }
    let s = CURRENCY_CODE.replace_all(&s, "");
    let mut s = s.as_ref();

    if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        negative = !negative;
        s = inner;
    }

    if s.is_empty() || s.chars().any(|c| c.is_alphabetic()) {
        return None;
    }

    let value: f64 = normalize_separators(s)?
        .parse()
        .ok()
        .filter(|v: &f64| v.is_finite())?;
    Some(if negative { -value } else { value })
}

/// Rewrite grouping and decimal marks to a plain `1234.5` form.
///
/// With both `.` and `,` present the right-most one is the decimal mark. A lone
/// comma followed by one or two digits is a decimal comma (`12,50`); otherwise
/// commas group thousands, including lakh-style `1,23,456`. Repeated dots are
/// only accepted as three-digit groups (`1.234.567`).
fn normalize_separators(s: &str) -> Option<String> {
    let decimal = match (s.rfind('.'), s.rfind(',')) {
        (None, None) => return Some(s.to_string()),
        (Some(dot), Some(comma)) => {
            if dot > comma {
                '.'
            } else {
                ','
            }
        }
        (None, Some(comma)) => {
            let tail = &s[comma + 1..];
            let decimal_comma = s.matches(',').count() == 1
                && (1..=2).contains(&tail.len())
                && tail.bytes().all(|b| b.is_ascii_digit());
            if !decimal_comma {
                return Some(s.replace(',', ""));
            }
            ','
        }
        (Some(_), None) => {
            if s.matches('.').count() == 1 {
                return Some(s.to_string());
            }
            return dot_groups_valid(s).then(|| s.replace('.', ""));
        }
    };

    if s.matches(decimal).count() > 1 {
        return None;
    }
    let (whole, fraction) = s.split_once(decimal)?;
    if decimal == ',' && !dot_groups_valid(whole) {
        return None;
    }
    let whole = whole.replace([',', '.'], "");
    Some(format!("{whole}.{fraction}"))
}

fn dot_groups_valid(s: &str) -> bool {
    s.split('.')
        .skip(1)
        .all(|group| group.len() == 3 && group.bytes().all(|b| b.is_ascii_digit()))
}

pub fn parse_amount(cell: &RawCell) -> Option<f64> {
    match cell {
        RawCell::Number { value, .. } => Some(*value),
        RawCell::Text { text } => parse_amount_text(text),
        RawCell::Date { .. } | RawCell::Empty => None,
    }
}

/// `1,234.50`, `(500)` and `-12` are pure numbers; `500/IMPS` and `12-01` are not.
pub fn is_pure_number(raw: &str) -> bool {
    PURE_NUMBER.is_match(raw.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_excel_serial_date() {
        assert_eq!(serial_to_date(44927.0), Some(ymd(2023, 1, 1)));
        assert_eq!(parse_date(&RawCell::number(44927.0)), Some(ymd(2023, 1, 1)));
        assert_eq!(parse_date_text("44927"), Some(ymd(2023, 1, 1)));
        assert_eq!(parse_date_text("45292.75"), Some(ymd(2024, 1, 1)));
    }

    #[test]
    fn test_numbers_outside_serial_range_are_not_dates() {
        assert_eq!(parse_date(&RawCell::number(500.0)), None);
        assert_eq!(parse_date_text("12345"), None);
    }

    #[test]
    fn test_day_first_wins_over_month_first() {
        assert_eq!(parse_date_text("02/01/2024"), Some(ymd(2024, 1, 2)));
        // Only valid month-first
        assert_eq!(parse_date_text("01/13/2024"), Some(ymd(2024, 1, 13)));
    }

    #[test]
    fn test_other_formats() {
        assert_eq!(parse_date_text("15-03-2024"), Some(ymd(2024, 3, 15)));
        assert_eq!(parse_date_text("2024-03-15"), Some(ymd(2024, 3, 15)));
        assert_eq!(parse_date_text("15.03.2024"), Some(ymd(2024, 3, 15)));
        assert_eq!(parse_date_text("2024/03/15"), Some(ymd(2024, 3, 15)));
        assert_eq!(parse_date_text("5/3/2024"), Some(ymd(2024, 3, 5)));
        assert_eq!(parse_date_text("5.3.2024"), Some(ymd(2024, 3, 5)));
        assert_eq!(parse_date_text("05-Mar-2024"), Some(ymd(2024, 3, 5)));
        assert_eq!(parse_date_text("05 Mar 2024"), Some(ymd(2024, 3, 5)));
        assert_eq!(parse_date_text("05/03/2024 10:15:00"), Some(ymd(2024, 3, 5)));
    }

    #[test]
    fn test_implausible_years_rejected() {
        assert_eq!(parse_date_text("01/01/1899"), None);
        assert_eq!(parse_date_text("01/01/2150"), None);
        assert_eq!(parse_date_text("Opening Balance"), None);
        assert_eq!(parse_date_text(""), None);
    }

    #[test]
    fn test_amount_cleanup() {
        assert_eq!(parse_amount_text("1,234.50"), Some(1234.5));
        assert_eq!(parse_amount_text(" $ 99.99 "), Some(99.99));
        assert_eq!(parse_amount_text("₹12,000"), Some(12000.0));
        assert_eq!(parse_amount_text("INR 250.00"), Some(250.0));
        assert_eq!(parse_amount_text("Rs. 40"), Some(40.0));
        assert_eq!(parse_amount_text("-15.00"), Some(-15.0));
        assert_eq!(parse_amount_text("1\u{a0}000"), Some(1000.0));
    }

    #[test]
    fn test_decimal_comma() {
        assert_eq!(parse_amount_text("1.234,50"), Some(1234.5));
        assert_eq!(parse_amount_text("1,234.50"), Some(1234.5));
        assert_eq!(parse_amount_text("€ 1.234.567,89"), Some(1234567.89));
        assert_eq!(parse_amount_text("12,5"), Some(12.5));
        assert_eq!(parse_amount_text("-250,00"), Some(-250.0));
        assert_eq!(parse_amount_text("(1.234,50)"), Some(-1234.5));
        assert_eq!(parse_amount_text("1.234.567"), Some(1234567.0));
    }

    #[test]
    fn test_grouping_still_stripped() {
        assert_eq!(parse_amount_text("12,345"), Some(12345.0));
        assert_eq!(parse_amount_text("1,23,456.00"), Some(123456.0));
        assert_eq!(parse_amount_text("1,234"), Some(1234.0));
    }

    #[test]
    fn test_ambiguous_separators_rejected() {
        assert_eq!(parse_amount_text("1.2.3"), None);
        assert_eq!(parse_amount_text("01.02.2024"), None);
        assert_eq!(parse_amount_text("1.234,5,6"), None);
    }

    #[test]
    fn test_parenthesis_is_negative() {
        assert_eq!(parse_amount_text("(500.00)"), Some(-500.0));
        assert_eq!(parse_amount_text("($1,200)"), Some(-1200.0));
    }

    #[test]
    fn test_drcr_marker() {
        assert_eq!(parse_amount_text("15,000.00 Cr"), Some(15000.0));
        assert_eq!(parse_amount_text("250.00Dr"), Some(-250.0));
    }

    #[test]
    fn test_alphabetic_amounts_rejected() {
        assert_eq!(parse_amount_text("500/IMPS/NEFT/Rent"), None);
        assert_eq!(parse_amount_text("nan"), None);
        assert_eq!(parse_amount_text("inf"), None);
        assert_eq!(parse_amount_text("-"), None);
        assert_eq!(parse_amount_text(""), None);
        assert_eq!(parse_amount(&RawCell::Empty), None);
        assert_eq!(parse_amount(&RawCell::number(-3.5)), Some(-3.5));
    }

    #[test]
    fn test_pure_number_pattern() {
        assert!(is_pure_number("1,234.50"));
        assert!(is_pure_number("(500)"));
        assert!(is_pure_number("000123"));
        assert!(!is_pure_number("500/IMPS"));
        assert!(!is_pure_number("12-01"));
        assert!(!is_pure_number("UPI"));
    }
}

//! Header row detection.
//!
//! Exports often open with a bank title, account details and blank spacer rows.
//! The header is the first row in the scan window that mentions at least two
//! ledger keywords.

use ledgerlift_core::{RawCell, RawGrid};
use tracing::{debug, warn};

pub const HEADER_SCAN_ROWS: usize = 20;
const MIN_KEYWORD_HITS: usize = 2;

const HEADER_KEYWORDS: &[&str] = &[
    "date",
    "description",
    "narration",
    "particulars",
    "debit",
    "credit",
    "amount",
    "balance",
    "ref",
    "reference",
    "value date",
    "transaction",
];

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderRow {
    pub index: usize,
    /// One trimmed label per grid column; blanks become `Column_N`.
    pub labels: Vec<String>,
    /// True when no row qualified and row 0 was assumed.
    pub fallback: bool,
}

/// Number of distinct header keywords mentioned anywhere in the row.
pub fn keyword_score(row: &[RawCell]) -> usize {
    let joined = row
        .iter()
        .map(|cell| cell.display().to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");

    HEADER_KEYWORDS
        .iter()
        .filter(|keyword| joined.contains(*keyword))
        .count()
}

pub fn locate_header(grid: &RawGrid) -> HeaderRow {
    let found = grid
        .rows()
        .iter()
        .take(HEADER_SCAN_ROWS)
        .position(|row| keyword_score(row) >= MIN_KEYWORD_HITS);

    let (index, fallback) = match found {
        Some(index) => {
            debug!(header_row = index, "located header row");
            (index, false)
        }
        None => {
            warn!(
                scanned = grid.len().min(HEADER_SCAN_ROWS),
                "no header row found; assuming row 0"
            );
            (0, true)
        }
    };

    let labels = header_labels(grid.row(index).unwrap_or(&[]), grid.width());
    HeaderRow {
        index,
        labels,
        fallback,
    }
}

fn header_labels(row: &[RawCell], width: usize) -> Vec<String> {
    (0..width)
        .map(|i| {
            let label = row.get(i).map(|cell| cell.display().trim()).unwrap_or("");
            if label.is_empty() {
                format!("Column_{}", i + 1)
            } else {
                label.to_string()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_row(cells: &[&str]) -> Vec<RawCell> {
        cells.iter().map(|c| RawCell::text(*c)).collect()
    }

    #[test]
    fn test_skips_title_rows() {
        let grid = RawGrid::new(vec![
            text_row(&["HDFC BANK LTD"]),
            text_row(&[]),
            text_row(&["Statement of account", "", "Period: Jan 2024"]),
            text_row(&[]),
            text_row(&["Date", "Narration", "Debit", "Credit", "Balance"]),
            text_row(&["01/01/2024", "ATM", "500", "", "9500"]),
        ]);

        let header = locate_header(&grid);
        assert_eq!(header.index, 4);
        assert!(!header.fallback);
        assert_eq!(header.labels, vec!["Date", "Narration", "Debit", "Credit", "Balance"]);
    }

    #[test]
    fn test_single_keyword_is_not_enough() {
        let row = text_row(&["Opening Balance", "10000"]);
        assert_eq!(keyword_score(&row), 1);
    }

    #[test]
    fn test_fallback_to_first_row() {
        let grid = RawGrid::new(vec![
            text_row(&["foo", "bar"]),
            text_row(&["1", "2"]),
        ]);
        let header = locate_header(&grid);
        assert_eq!(header.index, 0);
        assert!(header.fallback);
        assert_eq!(header.labels, vec!["foo", "bar"]);
    }

    #[test]
    fn test_blank_labels_get_synthetic_names() {
        let grid = RawGrid::new(vec![text_row(&["  Txn Date ", "", "Withdrawal", "Deposit", ""])]);
        let header = locate_header(&grid);
        assert_eq!(
            header.labels,
            vec!["Txn Date", "Column_2", "Withdrawal", "Deposit", "Column_5"]
        );
    }

    #[test]
    fn test_header_beyond_scan_window_falls_back() {
        let mut rows: Vec<Vec<RawCell>> = (0..HEADER_SCAN_ROWS).map(|_| text_row(&["x"])).collect();
        rows.push(text_row(&["Date", "Debit"]));
        let header = locate_header(&RawGrid::new(rows));
        assert_eq!(header.index, 0);
        assert!(header.fallback);
    }
}

//! Column classification: header labels -> `ColumnMapping`.
//!
//! Two phases. Labels are matched against substring rules first; then every
//! column labelled Debit or Credit is checked against a few sampled data rows
//! and revoked if the samples are narrations rather than amounts. Exports that
//! put "Transaction Details" under a "Credit" heading are common enough that
//! trusting labels alone corrupts totals.

use ledgerlift_core::{ColumnMapping, ColumnRole, RawCell, RawGrid};
use tracing::debug;

use crate::values::parse_amount_text;

/// Data rows inspected by the validation phase.
pub const SAMPLE_ROWS: usize = 4;

const DESCRIPTION_WORDS: &[&str] = &[
    "description",
    "narration",
    "particulars",
    "details",
    "remarks",
    "transaction",
];
const REFERENCE_WORDS: &[&str] = &["reference", "ref", "cheque", "chq", "instrument"];
const DEBIT_WORDS: &[&str] = &["debit", "withdrawal", "dr"];
const CREDIT_WORDS: &[&str] = &["credit", "deposit", "cr"];
const BALANCE_WORDS: &[&str] = &["balance", "closing"];

fn mentions(label: &str, words: &[&str]) -> bool {
    words.iter().any(|w| label.contains(w))
}

/// Role suggested by a header label alone. Rules are checked in precedence
/// order, so a description-like label never reaches the short `dr`/`cr` tests.
pub fn label_role(label: &str) -> ColumnRole {
    let label = label.to_lowercase();

    if label.contains("value") && label.contains("date") {
        ColumnRole::ValueDate
    } else if label.contains("date") {
        ColumnRole::TransactionDate
    } else if mentions(&label, DESCRIPTION_WORDS) {
        ColumnRole::Description
    } else if mentions(&label, REFERENCE_WORDS) {
        ColumnRole::Reference
    } else if mentions(&label, DEBIT_WORDS) {
        ColumnRole::Debit
    } else if mentions(&label, CREDIT_WORDS) {
        ColumnRole::Credit
    } else if mentions(&label, BALANCE_WORDS) {
        ColumnRole::Balance
    } else {
        ColumnRole::Unknown
    }
}

/// True for a sampled cell that reads like a narration ("500/IMPS/NEFT/Rent")
/// instead of a monetary value. Transfer-rail tokens such as IMPS, NEFT and
/// UPI are alphabetic, so they fail the amount parse and trip this check.
fn looks_like_narration(cell: &RawCell) -> bool {
    match cell {
        RawCell::Text { text } => {
            parse_amount_text(text).is_none()
                && text.chars().any(|c| c.is_alphabetic() || c == '/')
        }
        RawCell::Number { .. } | RawCell::Date { .. } | RawCell::Empty => false,
    }
}

/// Up to `SAMPLE_ROWS` non-blank rows directly below the header.
pub fn sample_rows(grid: &RawGrid, header_index: usize) -> Vec<&[RawCell]> {
    grid.rows()
        .iter()
        .skip(header_index + 1)
        .filter(|row| !row.iter().all(RawCell::is_blank))
        .take(SAMPLE_ROWS)
        .map(Vec::as_slice)
        .collect()
}

/// Label every column, then revoke amount roles the samples contradict.
pub fn classify_columns(labels: &[String], samples: &[&[RawCell]]) -> ColumnMapping {
    let mut mapping = ColumnMapping::new(labels.len());

    for (column, label) in labels.iter().enumerate() {
        let role = label_role(label);
        if role == ColumnRole::Unknown {
            continue;
        }
        if !mapping.assign(column, role) {
            debug!(column, label = %label, ?role, "role already claimed; column shadowed");
        }
    }

    for role in [ColumnRole::Debit, ColumnRole::Credit] {
        let Some(column) = mapping.column_for(role) else {
            continue;
        };
        let offending = samples
            .iter()
            .filter_map(|row| row.get(column))
            .find(|cell| looks_like_narration(cell));

        if let Some(cell) = offending {
            debug!(
                column,
                label = %labels[column],
                ?role,
                sample = %cell.display(),
                "sampled values are not amounts; revoking role"
            );
            mapping.revoke(column);
        }
    }

    debug!(roles = ?mapping.roles(), "classified columns");
    mapping
}

//! Row normalization: grid rows below the header -> `TransactionRecord`s.
//!
//! Each row yields at most one record. Nothing here aborts the file; rows that
//! carry no usable signal are skipped and counted.

use chrono::NaiveDate;
use ledgerlift_core::{
    ColumnMapping, ColumnRole, ParseOptions, RawCell, RawField, RawGrid, TransactionRecord,
    TransactionType,
};
use tracing::{debug, warn};

use crate::header::HeaderRow;
use crate::values::{is_pure_number, parse_amount, parse_date};

const DEFAULT_DESCRIPTION: &str = "Transaction";
const FRAGMENT_SEPARATOR: &str = "/";

/// What became of one grid row
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Blank,
    Skipped,
    Record(TransactionRecord),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedRows {
    pub transactions: Vec<TransactionRecord>,
    pub skipped: usize,
    pub blank: usize,
}

/// Direction from the parsed magnitudes. A zero-amount row leans towards
/// whichever amount column actually had content, defaulting to credit.
pub fn classify_type(debit: f64, credit: f64, debit_present: bool, credit_present: bool) -> TransactionType {
    match (debit > 0.0, credit > 0.0) {
        (true, true) => TransactionType::Both,
        (true, false) => TransactionType::Debit,
        (false, true) => TransactionType::Credit,
        (false, false) if debit_present && !credit_present => TransactionType::Debit,
        (false, false) => TransactionType::Credit,
    }
}

pub struct RowNormalizer<'a> {
    labels: &'a [String],
    mapping: &'a ColumnMapping,
    options: &'a ParseOptions,
}

impl<'a> RowNormalizer<'a> {
    pub fn new(labels: &'a [String], mapping: &'a ColumnMapping, options: &'a ParseOptions) -> Self {
        Self {
            labels,
            mapping,
            options,
        }
    }

    fn cell<'r>(&self, row: &'r [RawCell], role: ColumnRole) -> Option<&'r RawCell> {
        self.mapping
            .column_for(role)
            .and_then(|column| row.get(column))
            .filter(|cell| !cell.is_blank())
    }

    fn date(&self, row: &[RawCell], role: ColumnRole) -> Option<NaiveDate> {
        self.cell(row, role).and_then(parse_date)
    }

    fn amount(&self, row: &[RawCell], role: ColumnRole) -> Option<f64> {
        self.cell(row, role).and_then(parse_amount)
    }

    /// Description columns first, then every other non-date, non-amount column
    /// whose value is not a bare number, in column order.
    fn description_fragments(&self, row: &[RawCell]) -> Vec<String> {
        let primary = self.mapping.columns_with(ColumnRole::Description);
        let others = (0..row.len()).filter(|&column| {
            self.mapping.role(column) != ColumnRole::Description
                && self.mapping.contributes_to_description(column)
        });

        let mut fragments = Vec::new();
        for column in primary {
            if let Some(text) = row.get(column).and_then(fragment_text) {
                fragments.push(text.to_string());
            }
        }
        for column in others {
            if let Some(text) = row.get(column).and_then(fragment_text) {
                if !is_pure_number(text) {
                    fragments.push(text.to_string());
                }
            }
        }
        fragments
    }

    fn raw_fields(&self, row: &[RawCell]) -> Vec<RawField> {
        row.iter()
            .enumerate()
            .filter(|(_, cell)| !cell.is_blank())
            .map(|(column, cell)| RawField {
                column: self
                    .labels
                    .get(column)
                    .cloned()
                    .unwrap_or_else(|| format!("Column_{}", column + 1)),
                value: cell.display().trim().to_string(),
            })
            .collect()
    }

    pub fn normalize_row(&self, row: &[RawCell], source_row_number: usize) -> RowOutcome {
        if row.iter().all(RawCell::is_blank) {
            return RowOutcome::Blank;
        }

        let debit = self.amount(row, ColumnRole::Debit).map(f64::abs);
        let credit = self.amount(row, ColumnRole::Credit).map(f64::abs);
        let balance = self.amount(row, ColumnRole::Balance);
        let fragments = self.description_fragments(row);

        let transaction_date = match self.date(row, ColumnRole::TransactionDate) {
            Some(date) => date,
            None if self.options.is_strict() => {
                debug!(row = source_row_number, "no transaction date; skipped under strict policy");
                return RowOutcome::Skipped;
            }
            None => {
                let has_amount = debit.is_some() || credit.is_some() || balance.is_some();
                if !has_amount && fragments.is_empty() {
                    debug!(row = source_row_number, "no date, amount or description; skipped");
                    return RowOutcome::Skipped;
                }
                warn!(
                    row = source_row_number,
                    placeholder = %self.options.ingestion_date,
                    "no parseable transaction date; using ingestion date"
                );
                self.options.ingestion_date
            }
        };

        let value_date = self
            .date(row, ColumnRole::ValueDate)
            .unwrap_or(transaction_date);

        let reference = self
            .cell(row, ColumnRole::Reference)
            .map(|cell| cell.display().trim().to_string())
            .filter(|s| !s.is_empty());

        let debit_present = self.cell(row, ColumnRole::Debit).is_some();
        let credit_present = self.cell(row, ColumnRole::Credit).is_some();
        let debit_amount = debit.unwrap_or(0.0);
        let credit_amount = credit.unwrap_or(0.0);

        let description = if fragments.is_empty() {
            DEFAULT_DESCRIPTION.to_string()
        } else {
            fragments.join(FRAGMENT_SEPARATOR)
        };

        RowOutcome::Record(TransactionRecord {
            transaction_date,
            value_date,
            description,
            reference,
            debit_amount,
            credit_amount,
            balance,
            transaction_type: classify_type(debit_amount, credit_amount, debit_present, credit_present),
            raw_fields: self.raw_fields(row),
            source_row_number,
        })
    }
}

/// Trimmed cell text, ignoring cells with nothing alphanumeric (`-`, `*`).
fn fragment_text(cell: &RawCell) -> Option<&str> {
    let text = cell.display().trim();
    text.chars().any(char::is_alphanumeric).then_some(text)
}

/// Normalize every row below the header, in sheet order.
pub fn normalize_rows(
    grid: &RawGrid,
    header: &HeaderRow,
    mapping: &ColumnMapping,
    options: &ParseOptions,
) -> NormalizedRows {
    let normalizer = RowNormalizer::new(&header.labels, mapping, options);
    let mut out = NormalizedRows::default();

    for (index, row) in grid.rows().iter().enumerate().skip(header.index + 1) {
        match normalizer.normalize_row(row, grid.source_row_number(index)) {
            RowOutcome::Record(record) => out.transactions.push(record),
            RowOutcome::Skipped => out.skipped += 1,
            RowOutcome::Blank => out.blank += 1,
        }
    }

    out
}

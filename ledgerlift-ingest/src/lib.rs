//! ledgerlift-ingest: bank statement ingestion for arbitrary spreadsheet exports.
//!
//! Pipeline: loader -> header -> classifier -> normalizer -> aggregator.
//! Each call is a pure function of the bytes, the filename and `ParseOptions`.

pub mod aggregator;
pub mod classifier;
pub mod header;
pub mod loader;
pub mod normalizer;
pub mod values;

pub use aggregator::{StatementAccumulator, summarize};
pub use classifier::{classify_columns, label_role};
pub use header::{HeaderRow, locate_header};
pub use loader::{SourceFormat, load_workbook};
pub use normalizer::{NormalizedRows, RowNormalizer, RowOutcome, normalize_rows};

use ledgerlift_core::{ColumnInfo, ParseOptions, ParsedStatement, RawGrid, Result};
use tracing::info;

/// Parse one statement file.
///
/// Fails only for an unsupported extension or bytes that are not a
/// spreadsheet; every other irregularity degrades to a best-effort result.
pub fn parse_statement(bytes: &[u8], filename: &str, options: &ParseOptions) -> Result<ParsedStatement> {
    let format = SourceFormat::from_filename(filename)?;
    let grid = load_workbook(bytes, format)?;
    let parsed = parse_grid(&grid, options);

    info!(
        filename,
        transactions = parsed.transactions.len(),
        skipped = parsed.skipped_row_count,
        header_row = parsed.header_row_index,
        "parsed statement"
    );
    Ok(parsed)
}

/// Run the inference and normalization stages over an already-decoded grid.
pub fn parse_grid(grid: &RawGrid, options: &ParseOptions) -> ParsedStatement {
    let header = locate_header(grid);
    let samples = classifier::sample_rows(grid, header.index);
    let mapping = classify_columns(&header.labels, &samples);

    let rows = normalize_rows(grid, &header, &mapping, options);
    let statement = summarize(&rows.transactions, &options.default_currency);

    let columns = header
        .labels
        .iter()
        .enumerate()
        .map(|(column, label)| ColumnInfo {
            label: label.clone(),
            role: mapping.role(column),
        })
        .collect();

    ParsedStatement {
        statement,
        transactions: rows.transactions,
        header_row_index: header.index,
        columns,
        skipped_row_count: rows.skipped,
        blank_row_count: rows.blank,
    }
}

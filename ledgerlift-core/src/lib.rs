//! ledgerlift-core: data model shared by the statement ingestion engine and its callers

pub mod cell;
pub mod error;
pub mod options;
pub mod statement;

pub use cell::{RawCell, RawGrid};
pub use error::{IngestError, Result};
pub use options::{ParseOptions, RowPolicy};
pub use statement::{
    ColumnInfo, ColumnMapping, ColumnRole, ParsedStatement, RawField, StatementSummary, TransactionRecord,
    TransactionType,
};

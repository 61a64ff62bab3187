//! Canonical statement types produced by the ingestion engine

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Semantic meaning assigned to a spreadsheet column
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    TransactionDate,
    ValueDate,
    Description,
    Reference,
    Debit,
    Credit,
    Balance,
    Unknown,
}

impl ColumnRole {
    /// Roles that at most one column may hold.
    pub fn is_exclusive(&self) -> bool {
        !matches!(self, ColumnRole::Description | ColumnRole::Unknown)
    }

    pub fn is_date(&self) -> bool {
        matches!(self, ColumnRole::TransactionDate | ColumnRole::ValueDate)
    }

    pub fn is_amount(&self) -> bool {
        matches!(self, ColumnRole::Debit | ColumnRole::Credit | ColumnRole::Balance)
    }
}

/// Column index -> role, with per-column bookkeeping for description assembly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnMapping {
    roles: Vec<ColumnRole>,
    /// Columns that asked for an exclusive role another column already holds.
    shadowed: Vec<bool>,
}

impl ColumnMapping {
    pub fn new(width: usize) -> Self {
        Self {
            roles: vec![ColumnRole::Unknown; width],
            shadowed: vec![false; width],
        }
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn role(&self, column: usize) -> ColumnRole {
        self.roles.get(column).copied().unwrap_or(ColumnRole::Unknown)
    }

    pub fn roles(&self) -> &[ColumnRole] {
        &self.roles
    }

    /// First column holding `role`.
    pub fn column_for(&self, role: ColumnRole) -> Option<usize> {
        self.roles.iter().position(|r| *r == role)
    }

    pub fn columns_with(&self, role: ColumnRole) -> impl Iterator<Item = usize> + '_ {
        self.roles
            .iter()
            .enumerate()
            .filter(move |(_, r)| **r == role)
            .map(|(i, _)| i)
    }

    /// Give `column` the role. Returns false (and shadows the column) when an
    /// exclusive role is already held elsewhere.
    pub fn assign(&mut self, column: usize, role: ColumnRole) -> bool {
        if column >= self.roles.len() {
            return false;
        }
        if role.is_exclusive() && self.column_for(role).is_some_and(|held| held != column) {
            self.roles[column] = ColumnRole::Unknown;
            self.shadowed[column] = true;
            return false;
        }
        self.roles[column] = role;
        self.shadowed[column] = false;
        true
    }

    /// Drop a column's role; it becomes a description contributor.
    pub fn revoke(&mut self, column: usize) {
        if let Some(role) = self.roles.get_mut(column) {
            *role = ColumnRole::Unknown;
        }
    }

    pub fn is_shadowed(&self, column: usize) -> bool {
        self.shadowed.get(column).copied().unwrap_or(false)
    }

    /// Whether values from this column may be appended to a narration.
    pub fn contributes_to_description(&self, column: usize) -> bool {
        if self.is_shadowed(column) {
            return false;
        }
        let role = self.role(column);
        !role.is_date() && !role.is_amount()
    }
}

/// Direction of a transaction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Debit,
    Credit,
    Both,
}

/// Original cell text kept for display, keyed by header label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawField {
    pub column: String,
    pub value: String,
}

/// One normalized ledger line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionRecord {
    pub transaction_date: NaiveDate,
    /// Equal to `transaction_date` when the sheet has no usable value date.
    pub value_date: NaiveDate,
    pub description: String,
    pub reference: Option<String>,
    /// Outflow magnitude, never negative
    pub debit_amount: f64,
    /// Inflow magnitude, never negative
    pub credit_amount: f64,
    /// Running balance; may be negative (overdraft)
    pub balance: Option<f64>,
    pub transaction_type: TransactionType,
    pub raw_fields: Vec<RawField>,
    /// 1-based row number in the source sheet
    pub source_row_number: usize,
}

impl TransactionRecord {
    /// Signed movement: credits positive, debits negative.
    pub fn net_amount(&self) -> f64 {
        self.credit_amount - self.debit_amount
    }
}

/// Statement-level metadata derived from the transactions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatementSummary {
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    pub opening_balance: Option<f64>,
    pub closing_balance: Option<f64>,
    pub total_debits: f64,
    pub total_credits: f64,
    pub transaction_count: usize,
    pub currency: String,
}

impl StatementSummary {
    pub fn empty(currency: impl Into<String>) -> Self {
        Self {
            period_start: None,
            period_end: None,
            opening_balance: None,
            closing_balance: None,
            total_debits: 0.0,
            total_credits: 0.0,
            transaction_count: 0,
            currency: currency.into(),
        }
    }

    /// `closing - (opening + credits - debits)`, when both balances are known.
    ///
    /// The opening balance is the balance *after* the first row, so a non-zero
    /// gap of exactly that row's movement is normal for most exports.
    pub fn reconciliation_gap(&self) -> Option<f64> {
        let opening = self.opening_balance?;
        let closing = self.closing_balance?;
        Some(closing - (opening + self.total_credits - self.total_debits))
    }
}

/// Header label and final role of one column
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColumnInfo {
    pub label: String,
    pub role: ColumnRole,
}

/// Everything one ingestion call returns
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParsedStatement {
    pub statement: StatementSummary,
    pub transactions: Vec<TransactionRecord>,
    pub header_row_index: usize,
    pub columns: Vec<ColumnInfo>,
    /// Non-blank rows below the header that produced no transaction
    pub skipped_row_count: usize,
    pub blank_row_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exclusive_roles_are_single_holder() {
        let mut mapping = ColumnMapping::new(4);
        assert!(mapping.assign(0, ColumnRole::TransactionDate));
        assert!(!mapping.assign(1, ColumnRole::TransactionDate));
        assert!(mapping.assign(2, ColumnRole::Description));
        assert!(mapping.assign(3, ColumnRole::Description));

        assert_eq!(mapping.role(1), ColumnRole::Unknown);
        assert!(mapping.is_shadowed(1));
        assert!(!mapping.contributes_to_description(1));
        assert_eq!(mapping.columns_with(ColumnRole::Description).count(), 2);
    }

    #[test]
    fn test_revoked_column_contributes_to_description() {
        let mut mapping = ColumnMapping::new(2);
        mapping.assign(1, ColumnRole::Credit);
        assert!(!mapping.contributes_to_description(1));

        mapping.revoke(1);
        assert_eq!(mapping.role(1), ColumnRole::Unknown);
        assert!(mapping.contributes_to_description(1));
        assert_eq!(mapping.column_for(ColumnRole::Credit), None);
    }

    #[test]
    fn test_reconciliation_gap() {
        let mut summary = StatementSummary::empty("INR");
        assert_eq!(summary.reconciliation_gap(), None);

        summary.opening_balance = Some(10000.0);
        summary.closing_balance = Some(15000.0);
        summary.total_credits = 5000.0;
        assert_eq!(summary.reconciliation_gap(), Some(0.0));
    }

    #[test]
    fn test_type_and_role_serialization() {
        assert_eq!(serde_json::to_string(&TransactionType::Both).unwrap(), "\"both\"");
        assert_eq!(
            serde_json::to_string(&ColumnRole::TransactionDate).unwrap(),
            "\"transaction_date\""
        );
    }
}

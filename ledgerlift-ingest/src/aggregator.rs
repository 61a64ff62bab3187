//! Statement summary as a single left-to-right fold over transactions.

use chrono::NaiveDate;
use ledgerlift_core::{StatementSummary, TransactionRecord};

/// Running state of the fold. Order matters only for the balances: the
/// opening balance is the first one seen, the closing balance the last.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatementAccumulator {
    period_start: Option<NaiveDate>,
    period_end: Option<NaiveDate>,
    opening_balance: Option<f64>,
    closing_balance: Option<f64>,
    total_debits: f64,
    total_credits: f64,
    transaction_count: usize,
}

impl StatementAccumulator {
    pub fn push(mut self, txn: &TransactionRecord) -> Self {
        let date = txn.transaction_date;
        self.period_start = Some(self.period_start.map_or(date, |d| d.min(date)));
        self.period_end = Some(self.period_end.map_or(date, |d| d.max(date)));

        if let Some(balance) = txn.balance {
            self.opening_balance.get_or_insert(balance);
            self.closing_balance = Some(balance);
        }

        self.total_debits += txn.debit_amount;
        self.total_credits += txn.credit_amount;
        self.transaction_count += 1;
        self
    }

    pub fn finish(self, currency: &str) -> StatementSummary {
        StatementSummary {
            period_start: self.period_start,
            period_end: self.period_end,
            opening_balance: self.opening_balance,
            closing_balance: self.closing_balance,
            total_debits: self.total_debits,
            total_credits: self.total_credits,
            transaction_count: self.transaction_count,
            currency: currency.to_string(),
        }
    }
}

pub fn summarize(transactions: &[TransactionRecord], currency: &str) -> StatementSummary {
    transactions
        .iter()
        .fold(StatementAccumulator::default(), StatementAccumulator::push)
        .finish(currency)
}

//! Per-call engine configuration

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// What to do with a row whose transaction date cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowPolicy {
    /// Keep the row if it carries an amount or a description, dated with
    /// `ParseOptions::ingestion_date`. Footer and summary lines may slip through.
    #[default]
    Lenient,
    /// Skip (and count) every row without a parseable transaction date.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseOptions {
    /// Currency code attached to the summary; no conversion is performed.
    pub default_currency: String,
    pub row_policy: RowPolicy,
    /// Placeholder date for lenient rows without a parseable date.
    pub ingestion_date: NaiveDate,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            default_currency: "INR".to_string(),
            row_policy: RowPolicy::Lenient,
            ingestion_date: Local::now().date_naive(),
        }
    }
}

impl ParseOptions {
    pub fn new(default_currency: impl Into<String>) -> Self {
        Self {
            default_currency: default_currency.into(),
            ..Self::default()
        }
    }

    pub fn with_row_policy(mut self, row_policy: RowPolicy) -> Self {
        self.row_policy = row_policy;
        self
    }

    pub fn with_ingestion_date(mut self, ingestion_date: NaiveDate) -> Self {
        self.ingestion_date = ingestion_date;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.row_policy == RowPolicy::Strict
    }
}

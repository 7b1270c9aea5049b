//! Parsing error types and the structured per-field outcome log.
//!
//! Field extraction never aborts a record; what it does instead is record
//! how each field was resolved so callers (and tests) can observe misses
//! without digging through log output.

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ExtractError {
    #[error("invalid CSS selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("invalid regular expression '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

impl ExtractError {
    pub fn invalid_selector(selector: &str, reason: impl ToString) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_pattern(pattern: &str, reason: impl ToString) -> Self {
        Self::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type ExtractResult<T> = Result<T, ExtractError>;

/// How a single field was resolved during record extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldStatus {
    /// Primary selector produced a usable value.
    Extracted,
    /// Primary selector missed; the fallback selector produced the value.
    FellBack,
    /// All selectors missed (or validation rejected the value); the field
    /// carries its sentinel.
    Defaulted,
}

/// One entry in the extraction report.
#[derive(Debug, Clone, Serialize)]
pub struct FieldOutcome {
    pub field: String,
    pub status: FieldStatus,
}

/// Per-record log of how every field extraction went.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractionReport {
    outcomes: Vec<FieldOutcome>,
}

impl ExtractionReport {
    pub fn record(&mut self, field: &str, status: FieldStatus) {
        self.outcomes.push(FieldOutcome {
            field: field.to_string(),
            status,
        });
    }

    pub fn status_of(&self, field: &str) -> Option<FieldStatus> {
        self.outcomes
            .iter()
            .find(|o| o.field == field)
            .map(|o| o.status)
    }

    pub fn outcomes(&self) -> &[FieldOutcome] {
        &self.outcomes
    }

    /// Fields that ended up with their sentinel value.
    pub fn defaulted_fields(&self) -> impl Iterator<Item = &str> {
        self.outcomes
            .iter()
            .filter(|o| o.status == FieldStatus::Defaulted)
            .map(|o| o.field.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_tracks_status_per_field() {
        let mut report = ExtractionReport::default();
        report.record("product_name", FieldStatus::FellBack);
        report.record("price", FieldStatus::Defaulted);

        assert_eq!(report.status_of("product_name"), Some(FieldStatus::FellBack));
        assert_eq!(report.status_of("price"), Some(FieldStatus::Defaulted));
        assert_eq!(report.status_of("unknown"), None);
        assert_eq!(report.defaulted_fields().collect::<Vec<_>>(), vec!["price"]);
    }
}

//! Keyword-cleaning run report and mutable report builder.

use std::collections::BTreeMap;
use std::fmt;

use crate::spec::ParseError;

/// Aggregate counters and diagnostics for one cleaning run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReportKeywordClean {
    /// Number of sheets read.
    pub cnt_sheets: u64,
    /// Number of columns inspected across all sheets.
    pub cnt_columns_scanned: u64,
    /// Number of columns that qualified as text columns.
    pub cnt_columns_text: u64,
    /// Number of raw values collected from text columns.
    pub cnt_values_raw: u64,
    /// Number of unique cleaned keywords.
    pub cnt_keywords: u64,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
    /// Parse failure that aborted extraction, if any.
    pub error: Option<ParseError>,
}

impl ReportKeywordClean {
    /// Whether extraction succeeded.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Number of collected warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// User-facing success line.
    pub fn format_summary(&self) -> String {
        format!("Cleaned {} unique keywords.", self.cnt_keywords)
    }

    /// User-facing error line, if extraction failed.
    pub fn format_error(&self) -> Option<String> {
        self.error
            .as_ref()
            .map(|err| format!("Error processing file: {err}"))
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_sheets".to_string(), self.cnt_sheets);
        dict_counts.insert("cnt_columns_scanned".to_string(), self.cnt_columns_scanned);
        dict_counts.insert("cnt_columns_text".to_string(), self.cnt_columns_text);
        dict_counts.insert("cnt_values_raw".to_string(), self.cnt_values_raw);
        dict_counts.insert("cnt_keywords".to_string(), self.cnt_keywords);
        dict_counts.insert("cnt_errors".to_string(), u64::from(self.error.is_some()));
        dict_counts.insert("cnt_warnings".to_string(), self.warning_count() as u64);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        let dict_counts = self.to_dict();
        format!(
            "{prefix} sheets={} columns={} text_columns={} raw={} keywords={} \
             errors={} warnings={}",
            dict_counts["cnt_sheets"],
            dict_counts["cnt_columns_scanned"],
            dict_counts["cnt_columns_text"],
            dict_counts["cnt_values_raw"],
            dict_counts["cnt_keywords"],
            dict_counts["cnt_errors"],
            dict_counts["cnt_warnings"]
        )
    }
}

impl fmt::Display for ReportKeywordClean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[CLEAN]"))
    }
}

/// Mutable accumulator for run statistics.
#[derive(Debug, Default, Clone)]
pub struct ReportKeywordCleanBuilder {
    /// See [`ReportKeywordClean::cnt_sheets`].
    pub cnt_sheets: u64,
    /// See [`ReportKeywordClean::cnt_columns_scanned`].
    pub cnt_columns_scanned: u64,
    /// See [`ReportKeywordClean::cnt_columns_text`].
    pub cnt_columns_text: u64,
    /// See [`ReportKeywordClean::cnt_values_raw`].
    pub cnt_values_raw: u64,
    /// See [`ReportKeywordClean::cnt_keywords`].
    pub cnt_keywords: u64,
    /// See [`ReportKeywordClean::warnings`].
    pub warnings: Vec<String>,
    /// See [`ReportKeywordClean::error`].
    pub error: Option<ParseError>,
}

impl ReportKeywordCleanBuilder {
    /// Count one sheet with `n_columns` columns, `n_columns_text` of them text.
    pub fn add_sheet(&mut self, n_columns: usize, n_columns_text: usize) {
        self.cnt_sheets += 1;
        self.cnt_columns_scanned += n_columns as u64;
        self.cnt_columns_text += n_columns_text as u64;
    }

    /// Add warning message.
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// Record the parse failure of this run.
    pub fn set_error(&mut self, error: ParseError) {
        self.error = Some(error);
    }

    /// Finalize builder into immutable report.
    pub fn build(self) -> ReportKeywordClean {
        ReportKeywordClean {
            cnt_sheets: self.cnt_sheets,
            cnt_columns_scanned: self.cnt_columns_scanned,
            cnt_columns_text: self.cnt_columns_text,
            cnt_values_raw: self.cnt_values_raw,
            cnt_keywords: self.cnt_keywords,
            warnings: self.warnings,
            error: self.error,
        }
    }
}

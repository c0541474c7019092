//! One upload-to-download cleaning run: read, clean, export.

use crate::clean::aggregate_raw_keywords;
use crate::reader::{derive_text_column_indices, extract_column_keywords, read_workbook_tables};
use crate::report::{ReportKeywordClean, ReportKeywordCleanBuilder};
use crate::spec::{ParseError, SerializationFault, SpecExportDocument, SpecKeywordCleanOptions};
use crate::writer::export_keywords;

/// Result of one cleaning run.
#[derive(Debug, Clone)]
pub struct SpecKeywordCleanRun {
    /// Unique cleaned keywords, ascending. Empty when parsing failed.
    pub keywords: Vec<String>,
    /// Export workbook built from `keywords`.
    pub export: SpecExportDocument,
    /// Run counters and parse failure, if any.
    pub report: ReportKeywordClean,
}

impl SpecKeywordCleanRun {
    /// Number of unique cleaned keywords.
    pub fn n_keywords(&self) -> usize {
        self.keywords.len()
    }

    /// Parse failure of this run, if any.
    pub fn error(&self) -> Option<&ParseError> {
        self.report.error.as_ref()
    }

    /// Display-ready status line: error text on failure, summary otherwise.
    pub fn message(&self) -> String {
        self.report
            .format_error()
            .unwrap_or_else(|| self.report.format_summary())
    }
}

/// Clean every keyword in a workbook buffer and build the export workbook.
///
/// A buffer that cannot be parsed is not an `Err`: the run carries the
/// [`ParseError`] in its report, no keywords, and a header-only export.
/// Only export serialization failures are returned as errors.
pub fn clean_workbook_bytes(
    v_bytes: &[u8],
    options: &SpecKeywordCleanOptions,
) -> Result<SpecKeywordCleanRun, SerializationFault> {
    let mut report_builder = ReportKeywordCleanBuilder::default();

    let l_keywords = match read_workbook_tables(v_bytes, &options.read) {
        Ok(l_tables) => {
            let mut l_raw_keywords = Vec::new();
            for table in &l_tables {
                let l_idx_cols = derive_text_column_indices(table);
                report_builder.add_sheet(table.width(), l_idx_cols.len());
                l_raw_keywords.extend(extract_column_keywords(table, &l_idx_cols));
            }
            if report_builder.cnt_columns_text == 0 {
                report_builder.add_warning("No text columns found in workbook.".to_string());
            }

            report_builder.cnt_values_raw = l_raw_keywords.len() as u64;
            aggregate_raw_keywords(&l_raw_keywords)
        }
        Err(err) => {
            log::warn!("Failed to parse workbook ({} bytes): {err}", v_bytes.len());
            report_builder.set_error(err);
            vec![]
        }
    };
    report_builder.cnt_keywords = l_keywords.len() as u64;

    let export = export_keywords(&l_keywords, &options.export)?;
    let report = report_builder.build();
    log::info!("{report}");

    Ok(SpecKeywordCleanRun {
        keywords: l_keywords,
        export,
        report,
    })
}

#[cfg(test)]
mod tests {
    use rust_xlsxwriter::Workbook;

    use super::*;

    fn build_keyword_workbook(l_sheets: &[(&str, &str, &[&str])]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        for (sheet_name, c_header, l_values) in l_sheets {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(*sheet_name).unwrap();
            worksheet.write_string(0, 0, *c_header).unwrap();
            for (n_idx, c_value) in l_values.iter().enumerate() {
                worksheet
                    .write_string(n_idx as u32 + 1, 0, *c_value)
                    .unwrap();
            }
        }
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_clean_workbook_bytes_counts_and_dedupes() {
        let v_bytes = build_keyword_workbook(&[(
            "Sheet1",
            "Keywords",
            &["  Foo--Bar ", "foo-bar", "FOO-BAR", "   "][..],
        )]);

        let run = clean_workbook_bytes(&v_bytes, &SpecKeywordCleanOptions::default()).unwrap();
        assert_eq!(run.keywords, vec!["foo-bar".to_string()]);
        assert_eq!(run.n_keywords(), 1);
        assert!(run.error().is_none());
        assert_eq!(run.message(), "Cleaned 1 unique keywords.");
        assert_eq!(run.report.cnt_sheets, 1);
        assert_eq!(run.report.cnt_columns_text, 1);
        assert_eq!(run.report.cnt_values_raw, 4);
        assert!(run.report.warnings.is_empty());
    }

    #[test]
    fn test_clean_workbook_bytes_counts_match_extracted_columns() {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.write_string(0, 0, "Ids").unwrap();
        worksheet.write_string(0, 1, "Primary").unwrap();
        worksheet.write_string(0, 2, "Secondary").unwrap();
        for (n_row, c_value) in ["Shoes", "Socks"].iter().enumerate() {
            let n_row = n_row as u32 + 1;
            worksheet.write_number(n_row, 0, f64::from(n_row)).unwrap();
            worksheet.write_string(n_row, 1, *c_value).unwrap();
        }
        worksheet.write_string(1, 2, "shoes").unwrap();
        let v_bytes = workbook.save_to_buffer().unwrap();

        let run = clean_workbook_bytes(&v_bytes, &SpecKeywordCleanOptions::default()).unwrap();
        assert_eq!(run.report.cnt_columns_scanned, 3);
        assert_eq!(run.report.cnt_columns_text, 2);
        assert_eq!(run.report.cnt_values_raw, 3);
        assert_eq!(run.keywords, vec!["shoes".to_string(), "socks".to_string()]);
    }

    #[test]
    fn test_clean_workbook_bytes_reports_parse_error() {
        let run =
            clean_workbook_bytes(b"not an xlsx", &SpecKeywordCleanOptions::default()).unwrap();

        assert!(run.keywords.is_empty());
        assert!(matches!(run.error(), Some(ParseError::InvalidWorkbook(_))));
        assert!(run.message().starts_with("Error processing file: "));
        assert!(!run.export.is_empty());
    }

    #[test]
    fn test_clean_workbook_bytes_warns_without_text_columns() {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.write_string(0, 0, "Ids").unwrap();
        worksheet.write_number(1, 0, 1.0).unwrap();
        let v_bytes = workbook.save_to_buffer().unwrap();

        let run = clean_workbook_bytes(&v_bytes, &SpecKeywordCleanOptions::default()).unwrap();
        assert!(run.keywords.is_empty());
        assert!(run.error().is_none());
        assert_eq!(run.report.warning_count(), 1);
        assert_eq!(run.message(), "Cleaned 0 unique keywords.");
    }
}

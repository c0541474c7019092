//! Keyword-cleaner constants and default preset factories.

use std::collections::BTreeMap;

use crate::spec::{SpecCellFormat, SpecKeywordCleanOptions};

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];

/// Name of the single sheet in the export workbook.
pub const C_EXPORT_SHEET_NAME: &str = "Cleaned";
/// Header of the single export column.
pub const C_EXPORT_COLUMN_NAME: &str = "Cleaned Keywords";
/// Suggested download file name for the export workbook.
pub const C_EXPORT_FILE_NAME: &str = "cleaned_keywords.xlsx";
/// MIME type of the export workbook.
pub const C_EXPORT_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Cell texts read as missing by default (pandas `read_excel` marker set).
pub const TUP_NA_VALUES_DEFAULT: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Canonical format preset keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumFmtKey {
    /// Generic text cell format.
    Text,
    /// Header cell format.
    Header,
}

impl EnumFmtKey {
    /// Preset map key.
    pub fn as_str(&self) -> &'static str {
        match self {
            EnumFmtKey::Text => "text",
            EnumFmtKey::Header => "header",
        }
    }
}

/// Build default named format presets used by [`crate::writer::KeywordXlsxWriter`].
pub fn derive_default_xlsx_formats() -> BTreeMap<String, SpecCellFormat> {
    let cfg_base_fmt_spec = SpecCellFormat {
        font_name: Some("Calibri".to_string()),
        font_size: Some(11),
        align: Some("left".to_string()),
        valign: Some("vcenter".to_string()),
        ..Default::default()
    };

    let mut dict_fmt = BTreeMap::new();
    dict_fmt.insert(EnumFmtKey::Text.as_str().to_string(), cfg_base_fmt_spec.clone());
    dict_fmt.insert(
        EnumFmtKey::Header.as_str().to_string(),
        cfg_base_fmt_spec.with_(SpecCellFormat {
            bold: Some(true),
            border: Some(1),
            align: Some("center".to_string()),
            ..Default::default()
        }),
    );

    dict_fmt
}

/// Build default run options; identical to [`SpecKeywordCleanOptions::default`].
pub fn derive_default_keyword_clean_options() -> SpecKeywordCleanOptions {
    SpecKeywordCleanOptions::default()
}

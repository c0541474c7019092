//! Shared keyword-cleaner models, options and errors.

use std::io::Cursor;

use rust_xlsxwriter::XlsxError;
use thiserror::Error;

use crate::conf::{
    C_EXPORT_COLUMN_NAME, C_EXPORT_FILE_NAME, C_EXPORT_MIME_TYPE, C_EXPORT_SHEET_NAME,
    EnumFmtKey, TUP_NA_VALUES_DEFAULT, derive_default_xlsx_formats,
};

////////////////////////////////////////////////////////////////////////////////
// #region CellFormat

/// Cell format used by the export writer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Font family name.
    pub font_name: Option<String>,
    /// Font size in points.
    pub font_size: Option<i64>,
    /// Bold style.
    pub bold: Option<bool>,

    /// Horizontal alignment.
    pub align: Option<String>,
    /// Vertical alignment.
    pub valign: Option<String>,
    /// Border style for all sides.
    pub border: Option<i64>,
    /// Text wrap.
    pub text_wrap: Option<bool>,

    /// Number format code.
    pub num_format: Option<String>,
    /// Background fill color.
    pub bg_color: Option<String>,
    /// Font color.
    pub font_color: Option<String>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            font_name: other.font_name.clone().or_else(|| self.font_name.clone()),
            font_size: other.font_size.or(self.font_size),
            bold: other.bold.or(self.bold),
            align: other.align.clone().or_else(|| self.align.clone()),
            valign: other.valign.clone().or_else(|| self.valign.clone()),
            border: other.border.or(self.border),
            text_wrap: other.text_wrap.or(self.text_wrap),
            num_format: other.num_format.clone().or_else(|| self.num_format.clone()),
            bg_color: other.bg_color.clone().or_else(|| self.bg_color.clone()),
            font_color: other.font_color.clone().or_else(|| self.font_color.clone()),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellAndSheetModels

/// Typed cell value as read from an input workbook.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellValue {
    /// Missing/blank value (empty cell, error cell, or missing-value marker).
    None,
    /// Text value.
    String(String),
    /// Numeric value.
    Number(f64),
    /// Boolean value.
    Boolean(bool),
    /// Date/time value, already rendered to text.
    DateTime(String),
}

/// Scalar kind of a non-missing cell, used for column qualification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EnumCellKind {
    /// Text cell.
    Text,
    /// Numeric cell.
    Number,
    /// Boolean cell.
    Boolean,
    /// Date/time cell.
    DateTime,
}

/// One named column of a parsed sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecSheetColumn {
    /// Header text taken from the first sheet row.
    pub name: String,
    /// Body values, one per data row.
    pub values: Vec<EnumCellValue>,
}

/// One sheet parsed as header row + named columns.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecSheetTable {
    /// Sheet name as defined by the workbook.
    pub sheet_name: String,
    /// Columns in sheet order.
    pub columns: Vec<SpecSheetColumn>,
}

impl SpecSheetTable {
    /// Number of body rows.
    pub fn height(&self) -> usize {
        self.columns.first().map_or(0, |col| col.values.len())
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Options

/// Autofit rule for column width inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumAutofitColumnsRule {
    /// Disable autofit.
    None,
    /// Infer width from header cells only (default).
    #[default]
    Header,
    /// Infer width from body cells only.
    Body,
    /// Infer width from both header and body cells.
    All,
}

/// Autofit policy for the export sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecAutofitCellsPolicy {
    /// Autofit width inference rule.
    pub rule_columns: EnumAutofitColumnsRule,
    /// Max body rows inspected when body-based inference is active.
    pub height_body_inferred_max: Option<usize>,
    /// Minimum final width.
    pub width_cell_min: usize,
    /// Maximum final width.
    pub width_cell_max: usize,
    /// Width padding added after inference.
    pub width_cell_padding: usize,
}

impl Default for SpecAutofitCellsPolicy {
    fn default() -> Self {
        Self {
            rule_columns: EnumAutofitColumnsRule::Header,
            height_body_inferred_max: Some(20_000),
            width_cell_min: 8,
            width_cell_max: 60,
            width_cell_padding: 2,
        }
    }
}

/// Options for reading input workbooks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecWorkbookReadOptions {
    /// Cell texts treated as missing values (exact match, no trimming).
    pub na_values: Vec<String>,
}

impl Default for SpecWorkbookReadOptions {
    fn default() -> Self {
        Self {
            na_values: TUP_NA_VALUES_DEFAULT
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

/// Options for the exported keyword workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecKeywordExportOptions {
    /// Export sheet name.
    pub sheet_name: String,
    /// Export header text.
    pub column_name: String,
    /// Header cell format.
    pub fmt_header: SpecCellFormat,
    /// Body cell format.
    pub fmt_text: SpecCellFormat,
    /// Column autofit policy.
    pub policy_autofit: SpecAutofitCellsPolicy,
}

impl Default for SpecKeywordExportOptions {
    /// Export sheet/header names with the named `text` and `header` presets.
    fn default() -> Self {
        let mut dict_fmt = derive_default_xlsx_formats();
        Self {
            sheet_name: C_EXPORT_SHEET_NAME.to_string(),
            column_name: C_EXPORT_COLUMN_NAME.to_string(),
            fmt_header: dict_fmt.remove(EnumFmtKey::Header.as_str()).unwrap_or_default(),
            fmt_text: dict_fmt.remove(EnumFmtKey::Text.as_str()).unwrap_or_default(),
            policy_autofit: SpecAutofitCellsPolicy::default(),
        }
    }
}

/// Options for one keyword-cleaning run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecKeywordCleanOptions {
    /// Input read options.
    pub read: SpecWorkbookReadOptions,
    /// Export options.
    pub export: SpecKeywordExportOptions,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ExportDocument

/// Serialized export workbook, ready to be offered as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecExportDocument {
    /// Suggested download file name.
    pub file_name: String,
    /// Download MIME type.
    pub mime_type: String,
    /// Workbook bytes.
    pub bytes: Vec<u8>,
}

impl SpecExportDocument {
    /// Wrap serialized workbook bytes with the default download metadata.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            file_name: C_EXPORT_FILE_NAME.to_string(),
            mime_type: C_EXPORT_MIME_TYPE.to_string(),
            bytes,
        }
    }

    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Consume into a reader positioned at the start of the payload.
    pub fn into_reader(self) -> Cursor<Vec<u8>> {
        Cursor::new(self.bytes)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Input buffer could not be interpreted as a workbook.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Not a readable workbook (corrupt, wrong format, empty buffer).
    #[error("{0}")]
    InvalidWorkbook(String),
    /// Workbook opened but one sheet could not be read.
    #[error("failed to read sheet {sheet_name:?}: {message}")]
    UnreadableSheet {
        /// Sheet that failed.
        sheet_name: String,
        /// Underlying reader error text.
        message: String,
    },
}

/// Export workbook could not be built or serialized.
#[derive(Debug, Error)]
pub enum SerializationFault {
    /// Workbook writer failure.
    #[error("xlsx write error: {0}")]
    Xlsx(#[from] XlsxError),
    /// Export frame construction/access failure.
    #[error("dataframe error: {0}")]
    Dataframe(String),
    /// Sheet layout rejected (limits, duplicate columns, writer state).
    #[error("{0}")]
    Layout(String),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

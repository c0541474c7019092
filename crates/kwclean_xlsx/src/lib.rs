//! `kwclean_xlsx` v1:
//! Rust-side keyword cleaning kernel for spreadsheet keyword lists.
//!
//! Modules:
//! - `conf`     : constants and default presets
//! - `spec`     : models/options/errors
//! - `util`     : pure helper functions
//! - `reader`   : workbook reader, raw keyword extraction
//! - `clean`    : keyword canonicalization and aggregation
//! - `writer`   : in-memory export workbook writer
//! - `report`   : run report model
//! - `pipeline` : one read/clean/export run
pub mod clean;
pub mod conf;
pub mod pipeline;
pub mod reader;
pub mod report;
pub mod spec;
pub mod util;
pub mod writer;

pub use clean::{aggregate_keywords, aggregate_raw_keywords, clean_keyword};
pub use conf::{
    C_EXPORT_COLUMN_NAME, C_EXPORT_FILE_NAME, C_EXPORT_MIME_TYPE, C_EXPORT_SHEET_NAME,
    derive_default_keyword_clean_options, derive_default_xlsx_formats,
};
pub use pipeline::{SpecKeywordCleanRun, clean_workbook_bytes};
pub use reader::{
    extract_column_keywords, extract_raw_keywords, extract_raw_keywords_from_bytes,
    read_workbook_tables,
};
pub use report::{ReportKeywordClean, ReportKeywordCleanBuilder};
pub use spec::{
    EnumAutofitColumnsRule, EnumCellValue, ParseError, SerializationFault, SpecAutofitCellsPolicy,
    SpecCellFormat, SpecExportDocument, SpecKeywordCleanOptions, SpecKeywordExportOptions,
    SpecSheetColumn, SpecSheetTable, SpecWorkbookReadOptions,
};
pub use writer::{KeywordXlsxWriter, export_keywords};

//! XLSX writer kernel that serializes keyword frames into in-memory workbooks.

use std::collections::BTreeSet;

use polars::prelude::{AnyValue, Column, DataFrame};
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet};

use crate::conf::{N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX};
use crate::spec::{
    EnumAutofitColumnsRule, EnumCellValue, SerializationFault, SpecAutofitCellsPolicy,
    SpecCellFormat, SpecExportDocument, SpecKeywordExportOptions,
};
use crate::util::{
    cast_col_num, cast_row_num, convert_cell_value_to_text, estimate_unicode_string_width,
    sanitize_sheet_name, validate_unique_columns,
};

/// Stateful in-memory workbook writer.
pub struct KeywordXlsxWriter {
    workbook: Workbook,
    fmt_text: SpecCellFormat,
    fmt_header: SpecCellFormat,
    policy_autofit: SpecAutofitCellsPolicy,
    set_sheet_names_existing: BTreeSet<String>,
    if_closed: bool,
}

impl KeywordXlsxWriter {
    /// Create writer with body/header formats and autofit policy.
    ///
    /// The workbook is buffered in memory until [`Self::close`] is called.
    pub fn new(
        fmt_text: SpecCellFormat,
        fmt_header: SpecCellFormat,
        policy_autofit: SpecAutofitCellsPolicy,
    ) -> Self {
        Self {
            workbook: Workbook::new(),
            fmt_text,
            fmt_header,
            policy_autofit,
            set_sheet_names_existing: BTreeSet::new(),
            if_closed: false,
        }
    }

    /// Create writer from export options.
    pub fn from_options(options: &SpecKeywordExportOptions) -> Self {
        Self::new(
            options.fmt_text.clone(),
            options.fmt_header.clone(),
            options.policy_autofit.clone(),
        )
    }

    /// Names of sheets written so far.
    pub fn sheet_names(&self) -> Vec<String> {
        self.set_sheet_names_existing.iter().cloned().collect()
    }

    /// Serialize the workbook into an export document.
    ///
    /// The writer cannot be used afterwards.
    pub fn close(&mut self) -> Result<SpecExportDocument, SerializationFault> {
        if self.if_closed {
            return Err(SerializationFault::Layout(
                "Writer already closed.".to_string(),
            ));
        }
        let v_bytes = self.workbook.save_to_buffer()?;
        self.if_closed = true;
        Ok(SpecExportDocument::new(v_bytes))
    }

    /// Write one sheet: header row from column names, then one row per frame row.
    pub fn write_sheet_from_dataframe(
        &mut self,
        df_data: &DataFrame,
        sheet_name: &str,
    ) -> Result<(), SerializationFault> {
        if self.if_closed {
            return Err(SerializationFault::Layout(
                "Cannot write after close().".to_string(),
            ));
        }
        validate_policy_autofit(&self.policy_autofit).map_err(SerializationFault::Layout)?;

        let l_colnames_df: Vec<String> = df_data
            .get_column_names_str()
            .into_iter()
            .map(ToString::to_string)
            .collect();
        validate_unique_columns(&l_colnames_df).map_err(SerializationFault::Layout)?;

        let n_width_df = l_colnames_df.len();
        let n_height_df = df_data.height();
        if n_width_df > N_NCOLS_EXCEL_MAX {
            return Err(SerializationFault::Layout(format!(
                "Too many columns for one sheet: {n_width_df} > {N_NCOLS_EXCEL_MAX}."
            )));
        }
        if n_height_df + 1 > N_NROWS_EXCEL_MAX {
            return Err(SerializationFault::Layout(format!(
                "Too many rows for one sheet: {n_height_df} + header > {N_NROWS_EXCEL_MAX}."
            )));
        }

        let sheet_name_unique = sanitize_sheet_name(sheet_name, "_");
        if self.set_sheet_names_existing.contains(&sheet_name_unique) {
            return Err(SerializationFault::Layout(format!(
                "Duplicate sheet name: {sheet_name_unique:?}"
            )));
        }

        let fmt_header = derive_rust_xlsx_format(&self.fmt_header);
        let fmt_text = derive_rust_xlsx_format(&self.fmt_text);
        let policy_autofit = self.policy_autofit.clone();

        let worksheet = self.workbook.add_worksheet();
        worksheet.set_name(&sheet_name_unique)?;

        let mut l_width_by_col_header = vec![0usize; n_width_df];
        let mut l_width_by_col_body = vec![0usize; n_width_df];
        let if_autofit_columns =
            !matches!(policy_autofit.rule_columns, EnumAutofitColumnsRule::None);

        for (n_idx_col, c_name) in l_colnames_df.iter().enumerate() {
            worksheet.write_string_with_format(
                0,
                cast_col_num_fault(n_idx_col)?,
                c_name,
                &fmt_header,
            )?;
            l_width_by_col_header[n_idx_col] = estimate_unicode_string_width(c_name);
        }

        let n_rows_inferred_max = policy_autofit.height_body_inferred_max.unwrap_or(usize::MAX);
        for (n_idx_col, col) in df_data.get_columns().iter().enumerate() {
            for n_row in 0..n_height_df {
                let value = derive_cell_value_from_column(col, n_row)?;
                if if_autofit_columns
                    && n_row < n_rows_inferred_max
                    && let Some(c_text) = convert_cell_value_to_text(&value)
                {
                    l_width_by_col_body[n_idx_col] = usize::max(
                        l_width_by_col_body[n_idx_col],
                        estimate_unicode_string_width(&c_text),
                    );
                }
                write_cell_with_format(worksheet, n_row + 1, n_idx_col, &value, &fmt_text)?;
            }
        }

        if if_autofit_columns {
            let n_min = usize::max(1, policy_autofit.width_cell_min);
            let n_max = usize::min(255, usize::max(n_min, policy_autofit.width_cell_max));
            let n_pad = policy_autofit.width_cell_padding;

            for n_idx_col in 0..n_width_df {
                let n_width_recorded = match policy_autofit.rule_columns {
                    EnumAutofitColumnsRule::Header | EnumAutofitColumnsRule::None => {
                        l_width_by_col_header[n_idx_col]
                    }
                    EnumAutofitColumnsRule::Body => l_width_by_col_body[n_idx_col],
                    EnumAutofitColumnsRule::All => usize::max(
                        l_width_by_col_header[n_idx_col],
                        l_width_by_col_body[n_idx_col],
                    ),
                };
                let n_width_final = usize::min(n_max, usize::max(n_min, n_width_recorded + n_pad));
                worksheet.set_column_width(cast_col_num_fault(n_idx_col)?, n_width_final as f64)?;
            }
        }

        log::debug!(
            "Wrote sheet {:?}: {} rows x {} columns",
            sheet_name_unique,
            n_height_df,
            n_width_df
        );
        self.set_sheet_names_existing.insert(sheet_name_unique);
        Ok(())
    }
}

/// Serialize sorted keywords into a one-sheet, one-column workbook.
///
/// An empty keyword list yields a header-only sheet.
pub fn export_keywords(
    keywords: &[String],
    options: &SpecKeywordExportOptions,
) -> Result<SpecExportDocument, SerializationFault> {
    let df_keywords = derive_keyword_dataframe(keywords, &options.column_name)?;

    let mut writer = KeywordXlsxWriter::from_options(options);
    writer.write_sheet_from_dataframe(&df_keywords, &options.sheet_name)?;
    writer.close()
}

/// Build the one-column keyword frame.
pub fn derive_keyword_dataframe(
    keywords: &[String],
    column_name: &str,
) -> Result<DataFrame, SerializationFault> {
    let col_keywords = Column::new(column_name.into(), keywords);
    DataFrame::new(vec![col_keywords])
        .map_err(|err| SerializationFault::Dataframe(err.to_string()))
}

fn validate_policy_autofit(policy_autofit: &SpecAutofitCellsPolicy) -> Result<(), String> {
    if policy_autofit.width_cell_min == 0 {
        return Err("policy_autofit.width_cell_min must be >= 1.".to_string());
    }
    if policy_autofit.width_cell_max < policy_autofit.width_cell_min {
        return Err(
            "policy_autofit.width_cell_max must be >= policy_autofit.width_cell_min.".to_string(),
        );
    }
    Ok(())
}

fn derive_cell_value_from_column(
    col: &Column,
    n_row: usize,
) -> Result<EnumCellValue, SerializationFault> {
    let value = col.get(n_row).map_err(|err| {
        SerializationFault::Dataframe(format!("Failed to access cell value: {err}"))
    })?;
    Ok(derive_cell_value_from_any_value(value))
}

fn derive_cell_value_from_any_value(value: AnyValue<'_>) -> EnumCellValue {
    match value {
        AnyValue::Null => EnumCellValue::None,
        AnyValue::String(val) => EnumCellValue::String(val.to_string()),
        AnyValue::StringOwned(val) => EnumCellValue::String(val.to_string()),
        AnyValue::Boolean(val) => EnumCellValue::Boolean(val),
        AnyValue::UInt8(val) => EnumCellValue::Number(val as f64),
        AnyValue::UInt16(val) => EnumCellValue::Number(val as f64),
        AnyValue::UInt32(val) => EnumCellValue::Number(val as f64),
        AnyValue::UInt64(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int8(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int16(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int32(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int64(val) => EnumCellValue::Number(val as f64),
        AnyValue::Float32(val) => EnumCellValue::Number(val as f64),
        AnyValue::Float64(val) => EnumCellValue::Number(val),
        _ => EnumCellValue::String(value.to_string()),
    }
}

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    row_idx: usize,
    col_idx: usize,
    value: &EnumCellValue,
    format: &Format,
) -> Result<(), SerializationFault> {
    let n_row = cast_row_num(row_idx).map_err(SerializationFault::Layout)?;
    let n_col = cast_col_num_fault(col_idx)?;
    match value {
        EnumCellValue::None => {
            worksheet.write_blank(n_row, n_col, format)?;
        }
        EnumCellValue::String(val) | EnumCellValue::DateTime(val) => {
            worksheet.write_string_with_format(n_row, n_col, val, format)?;
        }
        EnumCellValue::Number(val) => {
            worksheet.write_number_with_format(n_row, n_col, *val, format)?;
        }
        EnumCellValue::Boolean(val) => {
            worksheet.write_boolean_with_format(n_row, n_col, *val, format)?;
        }
    }
    Ok(())
}

fn cast_col_num_fault(value: usize) -> Result<u16, SerializationFault> {
    cast_col_num(value).map_err(SerializationFault::Layout)
}

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if let Some(val) = &spec.font_name {
        format = format.set_font_name(val.clone());
    }
    if let Some(val) = spec.font_size {
        format = format.set_font_size(val as f64);
    }
    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }

    if let Some(val) = &spec.align
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }
    if let Some(val) = &spec.valign
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }

    if let Some(val) = &spec.num_format {
        format = format.set_num_format(val.clone());
    }
    if let Some(val) = &spec.bg_color {
        format = format.set_background_color(val.as_str());
    }
    if let Some(val) = &spec.font_color {
        format = format.set_font_color(val.as_str());
    }
    if let Some(val) = spec.border {
        format = format.set_border(derive_format_border(val));
    }
    if spec.text_wrap.unwrap_or(false) {
        format = format.set_text_wrap();
    }

    format
}

fn derive_format_border(border: i64) -> FormatBorder {
    match border {
        1 => FormatBorder::Thin,
        2 => FormatBorder::Medium,
        3 => FormatBorder::Dashed,
        4 => FormatBorder::Dotted,
        5 => FormatBorder::Thick,
        6 => FormatBorder::Double,
        7 => FormatBorder::Hair,
        _ => FormatBorder::None,
    }
}

fn derive_format_align(align: &str) -> Option<FormatAlign> {
    let value = align.trim().to_ascii_lowercase();
    match value.as_str() {
        "general" => Some(FormatAlign::General),
        "left" => Some(FormatAlign::Left),
        "center" => Some(FormatAlign::Center),
        "right" => Some(FormatAlign::Right),
        "fill" => Some(FormatAlign::Fill),
        "justify" => Some(FormatAlign::Justify),
        "top" => Some(FormatAlign::Top),
        "bottom" => Some(FormatAlign::Bottom),
        "vcenter" | "vertical_center" => Some(FormatAlign::VerticalCenter),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use calamine::{Data, Reader, Xlsx, open_workbook_from_rs};

    use super::*;

    fn read_back(doc: &SpecExportDocument) -> (Vec<String>, Vec<Vec<Data>>) {
        let mut workbook: Xlsx<_> =
            open_workbook_from_rs(Cursor::new(doc.bytes.clone())).unwrap();
        let l_sheet_names = workbook.sheet_names();
        let range = workbook.worksheet_range(&l_sheet_names[0]).unwrap();
        let l_rows = range.rows().map(|row| row.to_vec()).collect();
        (l_sheet_names, l_rows)
    }

    #[test]
    fn test_export_keywords_writes_single_sheet_in_order() {
        let l_keywords = vec!["alpha".to_string(), "mike".to_string(), "zeta".to_string()];
        let doc = export_keywords(&l_keywords, &SpecKeywordExportOptions::default()).unwrap();

        assert_eq!(doc.file_name, "cleaned_keywords.xlsx");
        assert_eq!(
            doc.mime_type,
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );

        let (l_sheet_names, l_rows) = read_back(&doc);
        assert_eq!(l_sheet_names, vec!["Cleaned".to_string()]);
        assert_eq!(
            l_rows,
            vec![
                vec![Data::String("Cleaned Keywords".to_string())],
                vec![Data::String("alpha".to_string())],
                vec![Data::String("mike".to_string())],
                vec![Data::String("zeta".to_string())],
            ]
        );
    }

    #[test]
    fn test_export_keywords_empty_is_header_only() {
        let doc = export_keywords(&[], &SpecKeywordExportOptions::default()).unwrap();
        assert!(!doc.is_empty());

        let (l_sheet_names, l_rows) = read_back(&doc);
        assert_eq!(l_sheet_names, vec!["Cleaned".to_string()]);
        assert_eq!(
            l_rows,
            vec![vec![Data::String("Cleaned Keywords".to_string())]]
        );
    }

    #[test]
    fn test_export_document_reader_starts_at_zero() {
        let doc =
            export_keywords(&["a".to_string()], &SpecKeywordExportOptions::default()).unwrap();
        let n_len = doc.len();
        let reader = doc.into_reader();
        assert_eq!(reader.position(), 0);
        assert_eq!(reader.get_ref().len(), n_len);
        assert_eq!(&reader.get_ref()[..2], b"PK");
    }

    #[test]
    fn test_writer_rejects_write_after_close_and_duplicate_sheets() {
        let df = derive_keyword_dataframe(&["a".to_string()], "K").unwrap();
        let mut writer = KeywordXlsxWriter::from_options(&SpecKeywordExportOptions::default());

        writer.write_sheet_from_dataframe(&df, "Cleaned").unwrap();
        let err = writer.write_sheet_from_dataframe(&df, "Cleaned").unwrap_err();
        assert!(err.to_string().contains("Duplicate sheet name"));
        assert_eq!(writer.sheet_names(), vec!["Cleaned".to_string()]);

        writer.close().unwrap();
        let err = writer.write_sheet_from_dataframe(&df, "Other").unwrap_err();
        assert_eq!(err.to_string(), "Cannot write after close().");
        assert!(writer.close().is_err());
    }

    #[test]
    fn test_writer_rejects_invalid_autofit_policy() {
        let options = SpecKeywordExportOptions {
            policy_autofit: SpecAutofitCellsPolicy {
                width_cell_min: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        let err = export_keywords(&["a".to_string()], &options).unwrap_err();
        assert!(matches!(err, SerializationFault::Layout(_)));
    }

    #[test]
    fn test_export_sanitizes_sheet_name() {
        let options = SpecKeywordExportOptions {
            sheet_name: "Clean/ed".to_string(),
            ..Default::default()
        };
        let doc = export_keywords(&["a".to_string()], &options).unwrap();
        let (l_sheet_names, _) = read_back(&doc);
        assert_eq!(l_sheet_names, vec!["Clean_ed".to_string()]);
    }
}

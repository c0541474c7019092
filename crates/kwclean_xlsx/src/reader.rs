//! Workbook reader kernel that extracts raw keyword text from every sheet.
//!
//! Sheets are parsed as header row + named columns. Only text-like columns
//! (see [`check_is_text_column`]) contribute values.

use std::borrow::Cow;
use std::collections::HashSet;
use std::io::Cursor;

use calamine::{Data, DataType, Range, Reader, open_workbook_auto_from_rs};

use crate::spec::{
    EnumCellValue, ParseError, SpecSheetColumn, SpecSheetTable, SpecWorkbookReadOptions,
};
use crate::util::{check_is_text_column, convert_cell_value_to_text};

/// Parse every sheet of a workbook buffer, in workbook order.
///
/// Format is auto-detected (`xlsx`, `xlsm`, `xlsb`, `xls`, `ods`). Any sheet
/// that cannot be read fails the whole call.
pub fn read_workbook_tables(
    v_bytes: &[u8],
    options: &SpecWorkbookReadOptions,
) -> Result<Vec<SpecSheetTable>, ParseError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(v_bytes))
        .map_err(|err| ParseError::InvalidWorkbook(err.to_string()))?;

    let set_na_values: HashSet<&str> = options.na_values.iter().map(String::as_str).collect();

    let l_sheet_names = workbook.sheet_names();
    let mut l_tables = Vec::with_capacity(l_sheet_names.len());
    for sheet_name in l_sheet_names {
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|err| ParseError::UnreadableSheet {
                sheet_name: sheet_name.clone(),
                message: err.to_string(),
            })?;

        let table = derive_sheet_table(&sheet_name, &range, &set_na_values);
        log::debug!(
            "Read sheet {:?}: {} rows x {} columns",
            table.sheet_name,
            table.height(),
            table.width()
        );
        l_tables.push(table);
    }

    Ok(l_tables)
}

/// Indices of columns that qualify as text columns.
pub fn derive_text_column_indices(table: &SpecSheetTable) -> Vec<usize> {
    table
        .columns
        .iter()
        .enumerate()
        .filter_map(|(n_idx, col)| check_is_text_column(&col.values).then_some(n_idx))
        .collect()
}

/// Non-missing values of the selected columns of one table, column by column.
pub fn extract_column_keywords<'a>(
    table: &'a SpecSheetTable,
    l_idx_cols: &'a [usize],
) -> impl Iterator<Item = String> + 'a {
    l_idx_cols.iter().flat_map(move |&n_idx_col| {
        table.columns[n_idx_col]
            .values
            .iter()
            .filter_map(convert_cell_value_to_text)
    })
}

/// Collect every non-missing value of every text column, across all sheets.
pub fn extract_raw_keywords(tables: &[SpecSheetTable]) -> Vec<String> {
    let mut l_raw_keywords = Vec::new();
    for table in tables {
        let l_idx_cols = derive_text_column_indices(table);
        l_raw_keywords.extend(extract_column_keywords(table, &l_idx_cols));
    }
    l_raw_keywords
}

/// Read a workbook buffer and collect its raw keyword values.
pub fn extract_raw_keywords_from_bytes(
    v_bytes: &[u8],
    options: &SpecWorkbookReadOptions,
) -> Result<Vec<String>, ParseError> {
    let l_tables = read_workbook_tables(v_bytes, options)?;
    Ok(extract_raw_keywords(&l_tables))
}

fn derive_sheet_table(
    sheet_name: &str,
    range: &Range<Data>,
    set_na_values: &HashSet<&str>,
) -> SpecSheetTable {
    let mut l_rows = range.rows();
    let Some(row_header) = l_rows.next() else {
        return SpecSheetTable {
            sheet_name: sheet_name.to_string(),
            columns: vec![],
        };
    };

    let n_height_body = range.height().saturating_sub(1);
    let mut l_columns: Vec<SpecSheetColumn> = row_header
        .iter()
        .enumerate()
        .map(|(n_idx, cell)| SpecSheetColumn {
            name: derive_header_name(n_idx, cell),
            values: Vec::with_capacity(n_height_body),
        })
        .collect();

    for row in l_rows {
        for (col, cell) in l_columns.iter_mut().zip(row.iter()) {
            col.values.push(derive_cell_value(cell, set_na_values));
        }
    }

    SpecSheetTable {
        sheet_name: sheet_name.to_string(),
        columns: l_columns,
    }
}

fn derive_header_name(n_idx: usize, cell: &Data) -> String {
    match cell {
        Data::Empty => format!("Unnamed: {n_idx}"),
        Data::String(s) if s.is_empty() => format!("Unnamed: {n_idx}"),
        _ => convert_cell_value_to_text(&derive_cell_value(cell, &HashSet::new()))
            .unwrap_or_else(|| format!("Unnamed: {n_idx}")),
    }
}

fn derive_cell_value(cell: &Data, set_na_values: &HashSet<&str>) -> EnumCellValue {
    match cell {
        Data::Empty | Data::Error(_) => EnumCellValue::None,
        Data::String(s) => {
            let c_text = decode_ooxml_escapes(s);
            if c_text.is_empty() || set_na_values.contains(&*c_text) {
                EnumCellValue::None
            } else {
                EnumCellValue::String(c_text.into_owned())
            }
        }
        Data::Float(val) => EnumCellValue::Number(*val),
        Data::Int(val) => EnumCellValue::Number(*val as f64),
        Data::Bool(val) => EnumCellValue::Boolean(*val),
        Data::DateTime(_) => match cell.as_datetime() {
            Some(dt) => EnumCellValue::DateTime(dt.to_string()),
            None => EnumCellValue::DateTime(cell.to_string()),
        },
        other => EnumCellValue::DateTime(other.to_string()),
    }
}

/// Decode `_xHHHH_` character escapes left in shared-string text.
///
/// `_x005F_` decodes to `_`, so an escaped literal `_x005F_x0041_` yields
/// `_x0041_`. Malformed or surrogate escapes are kept verbatim.
fn decode_ooxml_escapes(s: &str) -> Cow<'_, str> {
    if !s.contains("_x") {
        return Cow::Borrowed(s);
    }

    let mut c_out = String::with_capacity(s.len());
    let mut c_rest = s;
    while let Some(n_pos) = c_rest.find("_x") {
        c_out.push_str(&c_rest[..n_pos]);
        let c_tail = &c_rest[n_pos..];
        let chr_decoded = c_tail
            .get(2..6)
            .filter(|c_hex| c_hex.bytes().all(|b| b.is_ascii_hexdigit()))
            .filter(|_| c_tail.as_bytes().get(6) == Some(&b'_'))
            .and_then(|c_hex| u32::from_str_radix(c_hex, 16).ok())
            .and_then(char::from_u32);
        match chr_decoded {
            Some(chr) => {
                c_out.push(chr);
                c_rest = &c_tail[7..];
            }
            None => {
                c_out.push_str("_x");
                c_rest = &c_tail[2..];
            }
        }
    }
    c_out.push_str(c_rest);
    Cow::Owned(c_out)
}

//! Stateless helper utilities shared by the reader and writer kernels.

use std::collections::{BTreeMap, BTreeSet};

use crate::conf::{N_LEN_EXCEL_SHEET_NAME_MAX, TUP_EXCEL_ILLEGAL};
use crate::spec::{EnumCellKind, EnumCellValue};

////////////////////////////////////////////////////////////////////////////////
// #region CellValueConversion

/// Scalar kind of a cell value; `None` for missing values.
pub fn derive_cell_kind(value: &EnumCellValue) -> Option<EnumCellKind> {
    match value {
        EnumCellValue::None => None,
        EnumCellValue::String(_) => Some(EnumCellKind::Text),
        EnumCellValue::Number(_) => Some(EnumCellKind::Number),
        EnumCellValue::Boolean(_) => Some(EnumCellKind::Boolean),
        EnumCellValue::DateTime(_) => Some(EnumCellKind::DateTime),
    }
}

/// Render a non-missing cell value as text; `None` for missing values.
///
/// Integral numbers render without a fractional part (`3`, not `3.0`); other
/// numbers use shortest round-trip digits, switching to exponent form for
/// very small or very large magnitudes.
pub fn convert_cell_value_to_text(value: &EnumCellValue) -> Option<String> {
    match value {
        EnumCellValue::None => None,
        EnumCellValue::String(s) => Some(s.clone()),
        EnumCellValue::Number(n) => Some(format_number_text(*n)),
        EnumCellValue::Boolean(b) => Some(if *b { "True" } else { "False" }.to_string()),
        EnumCellValue::DateTime(s) => Some(s.clone()),
    }
}

/// Shortest round-trip digits; scientific form (`1e-05`, `1.5e+16`) when the
/// decimal exponent is below -4 or at least 16.
fn format_number_text(n: f64) -> String {
    if n.is_nan() {
        return "nan".to_string();
    }
    if n.is_infinite() {
        return n.to_string();
    }
    if n.fract() == 0.0 && n.abs() < 1e15 {
        return (n as i64).to_string();
    }

    let c_sci = format!("{n:e}");
    let (c_mantissa, c_exp) = c_sci.split_once('e').unwrap_or((c_sci.as_str(), "0"));
    let n_exp: i32 = c_exp.parse().unwrap_or(0);
    if (-4..16).contains(&n_exp) {
        let c_fixed = n.to_string();
        if c_fixed.contains('.') {
            c_fixed
        } else {
            format!("{c_fixed}.0")
        }
    } else {
        let chr_sign = if n_exp < 0 { '-' } else { '+' };
        format!("{c_mantissa}e{chr_sign}{:02}", n_exp.unsigned_abs())
    }
}

/// Whether a column holds text-like values.
///
/// A column qualifies when it has at least one non-missing value and its
/// non-missing values are not all of one non-text kind. Any text value, or a
/// mix of kinds, qualifies it.
///
/// A boolean column with missing cells also qualifies: it cannot hold the
/// gaps as booleans and degrades to generic values. Number and date columns
/// keep their kind across gaps and are still skipped.
pub fn check_is_text_column(values: &[EnumCellValue]) -> bool {
    let set_kinds: BTreeSet<EnumCellKind> = values.iter().filter_map(derive_cell_kind).collect();

    if set_kinds.is_empty() {
        return false;
    }
    if set_kinds.contains(&EnumCellKind::Text) || set_kinds.len() > 1 {
        return true;
    }
    set_kinds.contains(&EnumCellKind::Boolean)
        && values.iter().any(|val| matches!(val, EnumCellValue::None))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region DataFrameLikeUtils

/// Validate that `columns` has no duplicated names.
pub fn validate_unique_columns(columns: &[String]) -> Result<(), String> {
    if columns.len() == columns.iter().collect::<BTreeSet<_>>().len() {
        return Ok(());
    }

    let mut dict_pos: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (n_idx, c_name) in columns.iter().enumerate() {
        dict_pos.entry(c_name).or_default().push(n_idx);
    }

    let c_msg = dict_pos
        .iter()
        .filter_map(|(c_name, l_pos)| {
            if l_pos.len() > 1 {
                Some(format!(
                    "{c_name:?} x{} at indices {:?}",
                    l_pos.len(),
                    l_pos
                ))
            } else {
                None
            }
        })
        .collect::<Vec<_>>()
        .join("; ");

    Err(format!("Duplicate column names detected: {c_msg}"))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Replace invalid chars and trim to valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    c_name = c_name.trim().to_string();
    if c_name.is_empty() {
        c_name = "Sheet".to_string();
    }

    c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect()
}

/// Estimate displayed width units of a text cell.
///
/// Non-ASCII characters count as 1.6 units.
pub fn estimate_unicode_string_width(s: &str) -> usize {
    let n_ascii = s.chars().filter(|chr| chr.is_ascii()).count();
    let n_non_ascii = s.chars().count().saturating_sub(n_ascii);
    n_ascii + (n_non_ascii as f64 * 1.6).round() as usize
}

pub(crate) fn cast_row_num(value: usize) -> Result<u32, String> {
    u32::try_from(value).map_err(|_| format!("row index overflow: {value}"))
}

pub(crate) fn cast_col_num(value: usize) -> Result<u16, String> {
    u16::try_from(value).map_err(|_| format!("column index overflow: {value}"))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

//! End-to-end runs over in-memory workbooks.

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx, open_workbook_from_rs};
use kwclean_xlsx::{
    C_EXPORT_FILE_NAME, C_EXPORT_MIME_TYPE, ParseError, SpecKeywordCleanOptions,
    clean_workbook_bytes, derive_default_keyword_clean_options,
};
use rust_xlsxwriter::Workbook;

fn build_workbook(l_sheets: Vec<(&str, Vec<(&str, Vec<&str>)>)>) -> Vec<u8> {
    let mut workbook = Workbook::new();
    for (sheet_name, l_columns) in l_sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet_name).unwrap();
        for (n_col, (c_header, l_values)) in l_columns.into_iter().enumerate() {
            let n_col = n_col as u16;
            worksheet.write_string(0, n_col, c_header).unwrap();
            for (n_row, c_value) in l_values.into_iter().enumerate() {
                worksheet.write_string(n_row as u32 + 1, n_col, c_value).unwrap();
            }
        }
    }
    workbook.save_to_buffer().unwrap()
}

fn read_export(v_bytes: Vec<u8>) -> (Vec<String>, Vec<String>) {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(v_bytes)).unwrap();
    let l_sheet_names = workbook.sheet_names();
    let range = workbook.worksheet_range(&l_sheet_names[0]).unwrap();
    let l_cells = range
        .rows()
        .map(|row| match &row[0] {
            Data::String(s) => s.clone(),
            other => panic!("unexpected export cell: {other:?}"),
        })
        .collect();
    (l_sheet_names, l_cells)
}

#[test]
fn cleans_two_sheet_workbook_into_sorted_export() {
    let v_bytes = build_workbook(vec![
        (
            "Products",
            vec![(
                "Keywords",
                vec!["Running Shoes", "running  shoes", "RUNNING-SHOES"],
            )],
        ),
        ("Labels", vec![("Tags", vec!["  Blue--Sky "])]),
    ]);

    let run = clean_workbook_bytes(&v_bytes, &derive_default_keyword_clean_options()).unwrap();

    assert_eq!(
        run.keywords,
        vec![
            "blue-sky".to_string(),
            "running shoes".to_string(),
            "running-shoes".to_string()
        ]
    );
    assert_eq!(run.message(), "Cleaned 3 unique keywords.");
    assert_eq!(run.report.cnt_sheets, 2);
    assert_eq!(run.report.cnt_values_raw, 4);

    assert_eq!(run.export.file_name, C_EXPORT_FILE_NAME);
    assert_eq!(run.export.mime_type, C_EXPORT_MIME_TYPE);

    let (l_sheet_names, l_cells) = read_export(run.export.bytes);
    assert_eq!(l_sheet_names, vec!["Cleaned".to_string()]);
    assert_eq!(
        l_cells,
        vec![
            "Cleaned Keywords".to_string(),
            "blue-sky".to_string(),
            "running shoes".to_string(),
            "running-shoes".to_string()
        ]
    );
}

#[test]
fn output_is_independent_of_input_order_and_multiplicity() {
    let v_bytes_a = build_workbook(vec![(
        "Sheet1",
        vec![("K", vec!["zeta", "alpha", "mike", "Alpha"])],
    )]);
    let v_bytes_b = build_workbook(vec![
        ("Sheet1", vec![("K", vec!["mike", "MIKE"])]),
        ("Sheet2", vec![("K", vec!["alpha", "zeta", " zeta "])]),
    ]);

    let options = SpecKeywordCleanOptions::default();
    let run_a = clean_workbook_bytes(&v_bytes_a, &options).unwrap();
    let run_b = clean_workbook_bytes(&v_bytes_b, &options).unwrap();

    assert_eq!(
        run_a.keywords,
        vec!["alpha".to_string(), "mike".to_string(), "zeta".to_string()]
    );
    assert_eq!(run_a.keywords, run_b.keywords);
}

#[test]
fn malformed_input_yields_error_and_header_only_export() {
    let run = clean_workbook_bytes(&[0u8, 1, 2, 3], &SpecKeywordCleanOptions::default()).unwrap();

    assert!(run.keywords.is_empty());
    assert_eq!(run.n_keywords(), 0);
    assert!(matches!(run.error(), Some(ParseError::InvalidWorkbook(_))));
    assert!(run.message().starts_with("Error processing file:"));

    let (l_sheet_names, l_cells) = read_export(run.export.into_reader().into_inner());
    assert_eq!(l_sheet_names, vec!["Cleaned".to_string()]);
    assert_eq!(l_cells, vec!["Cleaned Keywords".to_string()]);
}

use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Reader};

use crate::data::cell::{CellValue, Dataset, RowRecord};
use crate::error::LoadError;

/// Extensions accepted by the file picker and drag-and-drop.
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["xlsx", "xls", "xlsm", "xlsb", "ods"];

pub fn is_supported(path: &Path) -> bool {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    SUPPORTED_EXTENSIONS.contains(&ext.as_str())
}

/// Read a workbook from disk and decode its first sheet.
pub fn load_file(path: &Path) -> Result<Dataset, LoadError> {
    let bytes = std::fs::read(path)
        .map_err(|e| LoadError::InvalidFile(format!("Cannot read file: {e}")))?;
    load_bytes(bytes)
}

/// Decode the first sheet of an in-memory workbook into row records.
///
/// The first row of the used range supplies the keys; every later row becomes
/// a record holding only its non-empty cells. Rows without any value are
/// dropped.
pub fn load_bytes(bytes: Vec<u8>) -> Result<Dataset, LoadError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| LoadError::InvalidFile(format!("Cannot open workbook: {e}")))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| LoadError::InvalidFile("No sheets found".to_string()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| LoadError::InvalidFile(format!("Cannot read sheet: {e}")))?;

    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(header_row) => header_names(header_row),
        None => return Ok(Dataset::default()),
    };

    let records: Vec<RowRecord> = rows
        .filter_map(|row| {
            let mut record = RowRecord::new();
            for (col_idx, cell) in row.iter().enumerate() {
                let (Some(key), Some(value)) = (headers.get(col_idx), cell_value(cell)) else {
                    continue;
                };
                record.insert(key.clone(), value);
            }
            (!record.is_empty()).then_some(record)
        })
        .collect();

    Ok(Dataset::from_rows(records))
}

/// Header text per column. Blank headers become `__EMPTY`, repeats get a
/// `_<n>` suffix.
fn header_names(row: &[Data]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(row.len());
    for cell in row {
        let base = match cell_value(cell) {
            Some(v) => v.display(),
            None => "__EMPTY".to_string(),
        };
        let mut name = base.clone();
        let mut counter = 0;
        while names.contains(&name) {
            counter += 1;
            name = format!("{base}_{counter}");
        }
        names.push(name);
    }
    names
}

fn cell_value(cell: &Data) -> Option<CellValue> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(CellValue::Text(s.clone())),
        Data::Float(f) => Some(CellValue::Number(*f)),
        Data::Int(i) => Some(CellValue::Number(*i as f64)),
        Data::Bool(b) => Some(CellValue::Bool(*b)),
        // Dates keep their serial number, as the raw sheet value does.
        Data::DateTime(dt) => Some(CellValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) => Some(CellValue::Text(s.clone())),
        Data::DurationIso(s) => Some(CellValue::Text(s.clone())),
        Data::Error(e) => Some(CellValue::Text(e.to_string())),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    /// Cell contents used to build workbook fixtures.
    pub enum Fx<'a> {
        S(&'a str),
        N(f64),
        Blank,
    }

    pub fn workbook_bytes(rows: &[Vec<Fx<'_>>]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                match cell {
                    Fx::S(s) => {
                        sheet.write_string(r as u32, c as u16, *s).unwrap();
                    }
                    Fx::N(n) => {
                        sheet.write_number(r as u32, c as u16, *n).unwrap();
                    }
                    Fx::Blank => {}
                }
            }
        }
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn decodes_two_column_sheet() {
        let bytes = workbook_bytes(&[
            vec![Fx::S("A"), Fx::S("B")],
            vec![Fx::N(1.0), Fx::N(10.0)],
            vec![Fx::N(2.0), Fx::N(20.0)],
        ]);
        let ds = load_bytes(bytes).unwrap();
        assert_eq!(ds.columns(), &["A".to_string(), "B".to_string()]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.rows()[1].get("B"), Some(&CellValue::Number(20.0)));
    }

    #[test]
    fn blank_cells_are_absent_and_blank_rows_skipped() {
        let bytes = workbook_bytes(&[
            vec![Fx::S("Name"), Fx::S("Score"), Fx::S("Note")],
            vec![Fx::S("a"), Fx::Blank, Fx::S("first")],
            vec![Fx::Blank, Fx::Blank, Fx::Blank],
            vec![Fx::S("b"), Fx::N(7.0), Fx::S("second")],
        ]);
        let ds = load_bytes(bytes).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.rows()[0].get("Score"), None);
        // The first record has no Score, so the column cannot be selected.
        assert_eq!(ds.columns(), &["Name".to_string(), "Note".to_string()]);
        assert_eq!(ds.rows()[1].get("Score"), Some(&CellValue::Number(7.0)));
    }

    #[test]
    fn blank_and_duplicate_headers_are_renamed() {
        let bytes = workbook_bytes(&[
            vec![Fx::S("X"), Fx::Blank, Fx::S("X"), Fx::Blank],
            vec![Fx::N(1.0), Fx::N(2.0), Fx::N(3.0), Fx::N(4.0)],
        ]);
        let ds = load_bytes(bytes).unwrap();
        assert_eq!(
            ds.columns(),
            &["X".to_string(), "__EMPTY".to_string(), "X_1".to_string(), "__EMPTY_1".to_string()]
        );
    }

    #[test]
    fn garbage_bytes_are_an_invalid_file() {
        let err = load_bytes(b"definitely not a workbook".to_vec()).unwrap_err();
        assert!(matches!(err, LoadError::InvalidFile(_)));
    }

    #[test]
    fn extension_filter() {
        assert!(is_supported(Path::new("report.XLSX")));
        assert!(is_supported(Path::new("legacy.xls")));
        assert!(!is_supported(Path::new("data.csv")));
    }
}

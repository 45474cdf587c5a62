use crate::model::{Cell, JoinedRows};
use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;
use tracing::info;

/// Writes one header row plus one row per record to an `.xlsx` workbook.
///
/// Returns the number of data rows written. Nothing is written for an empty
/// result, and `Ok(0)` is returned.
pub fn write_xlsx(rows: &JoinedRows, path: &Path) -> Result<usize> {
    if rows.is_empty() {
        return Ok(0);
    }

    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Smokers")?;

    for (col, name) in rows.columns.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, name.as_str(), &header)?;
    }

    for (r, record) in rows.rows.iter().enumerate() {
        let row = r as u32 + 1;
        for (col, cell) in record.iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Null => {}
                Cell::Int(v) => {
                    sheet.write_number(row, col, *v as f64)?;
                }
                Cell::Text(s) => {
                    sheet.write_string(row, col, s.as_str())?;
                }
                Cell::Date(_) => {
                    sheet.write_string(row, col, cell.to_string())?;
                }
            }
        }
    }
    sheet.autofit();

    workbook
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), rows = rows.len(), "exported records");
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ColumnKind, JOINED_COLUMNS};
    use chrono::NaiveDate;
    use std::io::Read;
    use tempfile::TempDir;

    fn sample() -> JoinedRows {
        JoinedRows {
            columns: vec![
                "smoker_id".to_string(),
                "first_name".to_string(),
                "quit_date".to_string(),
                "date_of_birth".to_string(),
            ],
            rows: vec![
                vec![
                    Cell::Int(1),
                    Cell::Text("Alice".to_string()),
                    Cell::Null,
                    Cell::Date(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()),
                ],
                vec![
                    Cell::Int(2),
                    Cell::Text("Bob".to_string()),
                    Cell::Null,
                    Cell::Date(NaiveDate::from_ymd_opt(1981, 3, 4).unwrap()),
                ],
            ],
        }
    }

    #[test]
    fn test_empty_result_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.xlsx");
        let written = write_xlsx(&JoinedRows::default(), &path).unwrap();
        assert_eq!(written, 0);
        assert!(!path.exists());
    }

    fn joined_sample(records: i64) -> JoinedRows {
        let columns: Vec<String> = JOINED_COLUMNS.iter().map(|c| c.name.to_string()).collect();
        let rows = (1..=records)
            .map(|id| {
                JOINED_COLUMNS
                    .iter()
                    .map(|c| match (c.name, c.kind) {
                        ("quit_date", _) => Cell::Null,
                        (_, ColumnKind::Int) => Cell::Int(id),
                        (_, ColumnKind::Date) => {
                            Cell::Date(NaiveDate::from_ymd_opt(2000, 1, id as u32).unwrap())
                        }
                        (name, ColumnKind::Text) => Cell::Text(format!("{} {}", name, id)),
                    })
                    .collect()
            })
            .collect();
        JoinedRows { columns, rows }
    }

    fn read_entry(path: &Path, name: &str) -> String {
        let mut archive = zip::ZipArchive::new(std::fs::File::open(path).unwrap()).unwrap();
        let mut xml = String::new();
        archive.by_name(name).unwrap().read_to_string(&mut xml).unwrap();
        xml
    }

    #[test]
    fn test_writes_one_row_per_record() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.xlsx");
        let written = write_xlsx(&joined_sample(3), &path).unwrap();
        assert_eq!(written, 3);

        let sheet = read_entry(&path, "xl/worksheets/sheet1.xml");
        assert_eq!(sheet.matches("<row r=\"").count(), 4);
        for row in 1..=4 {
            assert!(sheet.contains(&format!("<row r=\"{}\"", row)));
        }

        // quit_date is column I; NULL leaves the cell out entirely.
        let quit = JOINED_COLUMNS.iter().position(|c| c.name == "quit_date").unwrap();
        assert_eq!(quit, 8);
        assert!(sheet.contains("r=\"I1\""));
        for row in 2..=4 {
            assert!(!sheet.contains(&format!("r=\"I{}\"", row)));
            assert!(sheet.contains(&format!("r=\"H{}\"", row)));
        }

        // Headers are the first shared strings, in column order.
        let strings = read_entry(&path, "xl/sharedStrings.xml");
        let texts: Vec<&str> = strings
            .split("<t>")
            .skip(1)
            .filter_map(|s| s.split("</t>").next())
            .collect();
        let names: Vec<&str> = JOINED_COLUMNS.iter().map(|c| c.name).collect();
        assert_eq!(&texts[..names.len()], names.as_slice());
    }

    #[test]
    fn test_unwritable_path_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("out.xlsx");
        let err = write_xlsx(&sample(), &path).unwrap_err();
        assert!(err.to_string().contains("Failed to write"));
    }
}

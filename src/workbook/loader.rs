use std::fs;
use std::path::Path;

use csv::ReaderBuilder;

use crate::error::LoadError;
use super::xlsx::load_xlsx;
use super::{Sheet, Workbook};

/// Loads the rankings workbook.
///
/// An `.xlsx` file keeps its own sheet names and tab order. Any other file is read as CSV
/// and becomes a single sheet named after the file stem. A directory is read as a workbook
/// with one sheet per `.csv` file, ordered by file name.
pub fn load_workbook<P: AsRef<Path>>(path: P) -> Result<Workbook, LoadError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let sheets = if path.is_dir() {
        let mut files: Vec<_> = fs::read_dir(path)
            .map_err(|source| LoadError::Io { path: path.to_path_buf(), source })?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && has_extension(p, "csv"))
            .collect();
        files.sort();

        files
            .iter()
            .map(|file| load_sheet(file))
            .collect::<Result<Vec<_>, _>>()?
    } else if has_extension(path, "xlsx") {
        load_xlsx(path)?
    } else {
        vec![load_sheet(path)?]
    };

    if sheets.is_empty() {
        return Err(LoadError::NoSheets(path.to_path_buf()));
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    tracing::info!(file = %file_name, sheets = sheets.len(), "workbook loaded");
    Ok(Workbook { file_name, sheets })
}

fn has_extension(path: &Path, wanted: &str) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case(wanted))
        .unwrap_or(false)
}

/// Drops blank rows and pads short rows to the widest row
pub(super) fn tidy_rows(rows: &mut Vec<Vec<String>>) {
    rows.retain(|row| row.iter().any(|cell| !cell.trim().is_empty()));
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    for row in rows.iter_mut() {
        row.resize(width, String::new());
    }
}

/// Reads one CSV file
fn load_sheet(path: &Path) -> Result<Sheet, LoadError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|source| LoadError::Csv { path: path.to_path_buf(), source })?;

    let mut rows: Vec<Vec<String>> = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|source| LoadError::Csv { path: path.to_path_buf(), source })?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    tidy_rows(&mut rows);

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    tracing::debug!(sheet = %name, rows = rows.len(), "sheet parsed");
    Ok(Sheet::new(&name, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_file_is_one_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("PPR.csv");
        fs::write(&path, "Rank,Player Name,POS\n1,Bijan Robinson,RB\n,,\n2,Ja'Marr Chase\n").unwrap();

        let workbook = load_workbook(&path).unwrap();

        assert_eq!(workbook.file_name, "PPR.csv");
        assert_eq!(workbook.sheets.len(), 1);
        let sheet = &workbook.sheets[0];
        assert_eq!(sheet.name, "PPR");
        assert_eq!(sheet.rows.len(), 3);
        assert_eq!(sheet.rows[2], vec!["2", "Ja'Marr Chase", ""]);
    }

    #[test]
    fn directory_sheets_are_sorted_by_file_name() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b-superflex.csv"), "Player Name,POS\nJosh Allen,QB\n").unwrap();
        fs::write(dir.path().join("a-ppr.csv"), "Player Name,POS\nPuka Nacua,WR\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let workbook = load_workbook(dir.path()).unwrap();
        let names: Vec<&str> = workbook.sheets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a-ppr", "b-superflex"]);
    }

    #[test]
    fn xlsx_extension_is_read_as_a_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Cheat Sheet 2025.XLSX");
        fs::write(&path, "not a zip").unwrap();

        // dispatched to the xlsx reader, not parsed as CSV
        assert!(matches!(load_workbook(&path), Err(LoadError::Zip { .. })));
    }

    #[test]
    fn missing_path_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_workbook(dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
        assert!(err.to_string().contains("nope.csv"));
    }

    #[test]
    fn empty_directory_has_no_sheets() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(load_workbook(dir.path()), Err(LoadError::NoSheets(_))));
    }

    #[test]
    fn serializes_to_loader_contract() {
        let workbook = Workbook {
            file_name: "rankings.csv".into(),
            sheets: vec![Sheet::new("PPR", vec![vec!["Player Name".into()]])],
        };
        let json = serde_json::to_value(&workbook).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"fileName": "rankings.csv", "sheets": [{"name": "PPR", "rows": [["Player Name"]]}]})
        );
    }
}

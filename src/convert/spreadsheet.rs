use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;

use super::{ConversionError, ConversionResult};

/// One `## sheet` section with a markdown table per worksheet
pub fn convert_workbook(path: &Path) -> Result<ConversionResult, ConversionError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| ConversionError::malformed(path, e))?;

    let mut sections = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| ConversionError::malformed(path, format!("sheet {}: {}", name, e)))?;

        let rows: Vec<Vec<String>> = range
            .rows()
            .map(|row| row.iter().map(cell_text).collect())
            .collect();

        sections.push(format!("## {}\n{}", name, markdown_table(&rows)));
    }

    Ok(ConversionResult::new(None, sections.join("\n\n")))
}

pub fn convert_csv(path: &Path) -> Result<ConversionResult, ConversionError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| ConversionError::malformed(path, e))?;

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|e| ConversionError::malformed(path, e))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(ConversionResult::new(None, markdown_table(&rows)))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// First row is the header; short rows are padded to the widest row
pub fn markdown_table(rows: &[Vec<String>]) -> String {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    if width == 0 {
        return String::new();
    }

    let format_row = |row: &Vec<String>| {
        let cells: Vec<String> = (0..width)
            .map(|i| row.get(i).map(|c| escape_cell(c)).unwrap_or_default())
            .collect();
        format!("| {} |", cells.join(" | "))
    };

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(format_row(&rows[0]));
    lines.push(format!("|{}", " --- |".repeat(width)));
    lines.extend(rows[1..].iter().map(format_row));
    lines.join("\n")
}

fn escape_cell(cell: &str) -> String {
    cell.replace('|', "\\|").replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_markdown_table_pads_short_rows() {
        let rows = vec![
            vec!["name".to_string(), "count".to_string()],
            vec!["apples".to_string()],
        ];
        assert_eq!(markdown_table(&rows), "| name | count |\n| --- | --- |\n| apples |  |");
    }

    #[test]
    fn test_markdown_table_escapes_pipes() {
        let rows = vec![vec!["a|b".to_string()]];
        assert_eq!(markdown_table(&rows), "| a\\|b |\n| --- |");
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(markdown_table(&[]), "");
    }

    #[test]
    fn test_csv_conversion() {
        let mut temp = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        write!(temp, "city,population\nOslo,709037\nBergen,291940\n").unwrap();

        let result = convert_csv(temp.path()).unwrap();
        assert_eq!(
            result.text_content,
            "| city | population |\n| --- | --- |\n| Oslo | 709037 |\n| Bergen | 291940 |"
        );
    }

    #[test]
    fn test_corrupt_workbook() {
        let mut temp = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        write!(temp, "definitely not a zip container").unwrap();

        assert!(matches!(convert_workbook(temp.path()), Err(ConversionError::Malformed { .. })));
    }
}

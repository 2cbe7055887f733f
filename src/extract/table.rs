use std::io::Cursor;

use calamine::{ open_workbook_auto_from_rs, Reader };

/// First `max_rows` data rows of a CSV file as a pipe table.
pub fn csv_preview(bytes: &[u8], max_rows: usize) -> Result<String, String> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(bytes);
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| format!("invalid CSV header: {}", e))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    let mut total = 0;
    for record in reader.records() {
        let record = record.map_err(|e| format!("invalid CSV record: {}", e))?;
        total += 1;
        if rows.len() < max_rows {
            rows.push(record.iter().map(str::to_string).collect());
        }
    }
    Ok(render_table(&headers, &rows, total))
}

/// First sheet of an xlsx/xls workbook, rendered like [`csv_preview`].
pub fn spreadsheet_preview(bytes: &[u8], max_rows: usize) -> Result<String, String> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| format!("invalid workbook: {}", e))?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| "workbook has no sheets".to_string())?;
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| format!("unreadable sheet '{}': {}", sheet, e))?;

    let mut all_rows = range.rows().map(|row| row.iter().map(|cell| cell.to_string()).collect::<Vec<_>>());
    let headers = all_rows.next().unwrap_or_default();
    let rows: Vec<Vec<String>> = all_rows.by_ref().take(max_rows).collect();
    let total = rows.len() + all_rows.count();
    Ok(render_table(&headers, &rows, total))
}

fn cell(value: &str) -> String {
    value.replace(['\r', '\n'], " ").replace('|', "/").trim().to_string()
}

fn render_table(headers: &[String], rows: &[Vec<String>], total_rows: usize) -> String {
    let width = rows.iter().map(Vec::len).chain(std::iter::once(headers.len())).max().unwrap_or(0);
    if width == 0 {
        return String::new();
    }

    let line = |values: &[String]| {
        let cells: Vec<String> = (0..width)
            .map(|i| values.get(i).map(|v| cell(v)).unwrap_or_default())
            .collect();
        format!("| {} |", cells.join(" | "))
    };

    let mut out = vec![line(headers), format!("|{}", "---|".repeat(width))];
    out.extend(rows.iter().map(|row| line(row)));
    if total_rows > rows.len() {
        out.push(format!("(showing {} of {} rows)", rows.len(), total_rows));
    }
    out.join("\n")
}

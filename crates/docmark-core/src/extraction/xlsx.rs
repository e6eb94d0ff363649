use std::io::Cursor;

use calamine::{Data, Range, Reader, Xlsx};
use tracing::debug;

use crate::error::DocmarkError;

/// Render every sheet of an xlsx workbook as tab-separated text.
///
/// Each sheet starts with a `--- Sheet: <name> ---` line, followed by one
/// line per row from the first row of the sheet down to the last used one.
/// Rows are padded to the widest used column, so leading empty rows and
/// columns are kept as empty cells. Formula cells show their formula
/// (`=A1+B1`), not the cached result.
pub fn extract_text(bytes: Vec<u8>) -> Result<String, DocmarkError> {
    let mut workbook: Xlsx<_> = calamine::open_workbook_from_rs(Cursor::new(bytes))
        .map_err(|e| DocmarkError::Spreadsheet(format!("failed to open xlsx: {e}")))?;

    let mut text = String::new();
    let sheet_names = workbook.sheet_names();
    debug!(sheets = sheet_names.len(), "xlsx opened");

    for name in sheet_names {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| DocmarkError::Spreadsheet(format!("sheet '{name}': {e}")))?;
        let formulas = workbook
            .worksheet_formula(&name)
            .map_err(|e| DocmarkError::Spreadsheet(format!("sheet '{name}' formulas: {e}")))?;
        text.push_str(&format!("--- Sheet: {name} ---\n"));
        render_sheet(&range, &formulas, &mut text);
    }

    Ok(text)
}

fn render_sheet(values: &Range<Data>, formulas: &Range<String>, out: &mut String) {
    let end = match (values.end(), formulas.end()) {
        (Some(a), Some(b)) => Some((a.0.max(b.0), a.1.max(b.1))),
        (a, b) => a.or(b),
    };
    let Some((last_row, last_col)) = end else {
        // A sheet with no cells still reads as a single empty row.
        out.push('\n');
        return;
    };

    for row in 0..=last_row {
        let cells: Vec<String> = (0..=last_col)
            .map(|col| match formulas.get_value((row, col)) {
                Some(formula) if !formula.is_empty() => format!("={formula}"),
                _ => values
                    .get_value((row, col))
                    .map(cell_to_string)
                    .unwrap_or_default(),
            })
            .collect();
        out.push_str(&cells.join("\t"));
        out.push('\n');
    }
}

/// String form of a cell value. Empty cells become `""`.
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => format_float(*f),
        Data::Int(i) => i.to_string(),
        Data::Bool(true) => "True".into(),
        Data::Bool(false) => "False".into(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => naive.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => format_float(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
    }
}

/// Integral floats print without a fractional part (`1`, not `1.0`).
fn format_float(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

//! Text output for grids and records.
//!
//! Tables follow the grid's column definitions: one column per visible data column, in grid
//! order, headed by the last segment of its label key. Cells are cut to [`MAX_CELL`] display
//! columns with `unicode-width`, so Cyrillic and wide glyphs line up.

use super::styles;
use educenterapp::grid::{ColumnDef, ColumnKind, GridOptions};
use serde::Serialize;
use serde_json::Value;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const MAX_CELL: usize = 24;
const ELLIPSIS: char = '…';

/// Renders `rows` as a table over the grid's data columns. `wide` includes hidden columns.
pub fn render_grid<R: Serialize>(
    grid: &GridOptions,
    rows: &[R],
    wide: bool,
) -> serde_json::Result<String> {
    let columns: Vec<&ColumnDef> = grid
        .columns
        .iter()
        .filter(|c| c.field.is_some() && (wide || c.visible))
        .collect();
    let records = rows
        .iter()
        .map(serde_json::to_value)
        .collect::<serde_json::Result<Vec<_>>>()?;

    let headers: Vec<String> = columns.iter().map(|c| header_text(c)).collect();
    let cells: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|c| truncate_to_width(&cell_text(c, c.value_of(record)), MAX_CELL))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            cells
                .iter()
                .map(|row| row[i].width())
                .chain([h.width()])
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    let header_line: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, w)| styles::header().apply_to(pad(h, *w)).to_string())
        .collect();
    out.push_str(header_line.join("  ").trim_end());
    out.push('\n');

    for (record, row) in records.iter().zip(&cells) {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| pad(cell, *w))
            .collect();
        let line = line.join("  ");
        let line = line.trim_end();
        if record.get("isActive") == Some(&Value::Bool(false)) {
            out.push_str(&styles::inactive().apply_to(line).to_string());
        } else {
            out.push_str(line);
        }
        out.push('\n');
    }

    if records.is_empty() {
        out.push_str(&styles::muted().apply_to("(no records)").to_string());
        out.push('\n');
    }
    Ok(out)
}

/// Renders one record as `label: value` lines, skipping empty fields.
pub fn render_record<R: Serialize>(record: &R) -> serde_json::Result<String> {
    let value = serde_json::to_value(record)?;
    let Value::Object(fields) = value else {
        return Ok(format!("{value}\n"));
    };
    let width = fields.keys().map(|k| k.width()).max().unwrap_or(0);
    let mut out = String::new();
    for (key, value) in &fields {
        let text = plain_text(value);
        if text.is_empty() {
            continue;
        }
        out.push_str(&format!(
            "{} {}\n",
            styles::label().apply_to(pad(&format!("{key}:"), width + 1)),
            text
        ));
    }
    Ok(out)
}

pub fn render_json<R: Serialize + ?Sized>(rows: &R) -> serde_json::Result<String> {
    serde_json::to_string_pretty(rows).map(|s| s + "\n")
}

fn header_text(column: &ColumnDef) -> String {
    column
        .label_key
        .as_deref()
        .and_then(|k| k.rsplit('.').next())
        .unwrap_or(&column.key)
        .to_string()
}

fn cell_text(column: &ColumnDef, value: Option<&Value>) -> String {
    match (column.kind, value) {
        (ColumnKind::Boolean, Some(Value::Bool(true))) => "✓".to_string(),
        (ColumnKind::Boolean, _) => String::new(),
        (_, Some(value)) => plain_text(value),
        (_, None) => String::new(),
    }
}

fn plain_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Object(map) => map
            .get("name")
            .or_else(|| map.get("id"))
            .map(plain_text)
            .unwrap_or_default(),
        other => other.to_string(),
    }
}

fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{text}{}", " ".repeat(fill))
}

pub fn truncate_to_width(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push(ELLIPSIS);
    out
}

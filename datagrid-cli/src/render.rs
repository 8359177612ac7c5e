//! Plain-text rendering of a table page.

use datagrid_lib::model::PageResult;
use datagrid_lib::model::Row;
use serde_json::Value;

/// Longest a cell may get before it is cut.
const MAX_CELL_WIDTH: usize = 40;

/// Picks the columns to show: the requested ones, or every field of the
/// first row in document order.
pub fn columns(page: &PageResult, requested: &[String]) -> Vec<String> {
    if !requested.is_empty() {
        return requested.to_vec();
    }
    page.rows()
        .first()
        .map(|row| row.columns().map(str::to_string).collect())
        .unwrap_or_default()
}

fn cell(row: &Row, column: &str) -> String {
    let text = match row.get(column) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };
    if text.chars().count() > MAX_CELL_WIDTH {
        let cut: String = text.chars().take(MAX_CELL_WIDTH - 1).collect();
        format!("{}…", cut)
    } else {
        text
    }
}

/// Renders the page as an aligned text table with a header line.
pub fn table(page: &PageResult, columns: &[String]) -> String {
    if columns.is_empty() {
        return String::new();
    }

    let cells: Vec<Vec<String>> = page
        .rows()
        .iter()
        .map(|row| columns.iter().map(|c| cell(row, c)).collect())
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            cells
                .iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |values: &[String]| {
        values
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{:<width$}", v, width = *w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = Vec::with_capacity(cells.len() + 2);
    out.push(line(columns));
    out.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in &cells {
        out.push(line(row));
    }
    out.join("\n")
}

/// Renders the "page X of Y" footer.
pub fn footer(page: &PageResult, page_index: usize, page_size: usize) -> String {
    let pages = page.page_count(page_size).max(1);
    format!(
        "Page {} of {} ({} rows total, {} shown)",
        page_index.saturating_add(1),
        pages,
        page.total_count(),
        page.len()
    )
}

//! Plain-text rendering of the table.

use roster_lib::table::Column;
use roster_lib::table::ColumnKind;
use roster_lib::table::ColumnSet;
use roster_lib::table::ListState;

/// Renders the text columns of `state` with an id column first, followed by
/// a `showing N of TOTAL` footer.
pub fn render(columns: &ColumnSet, state: &ListState) -> String {
    let text: Vec<&Column> = columns.iter().filter(|c| c.kind == ColumnKind::Text).collect();

    let mut header = vec!["id".to_string()];
    header.extend(text.iter().map(|c| c.header()));

    let rows: Vec<Vec<String>> = state
        .items()
        .iter()
        .map(|record| {
            let mut row = vec![record.id().map(|id| id.to_string()).unwrap_or_default()];
            row.extend(text.iter().map(|c| record.display(&c.key).into_owned()));
            row
        })
        .collect();

    let widths: Vec<usize> = (0..header.len())
        .map(|i| {
            rows.iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(header[i].chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    push_row(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut out, &rule, &widths);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out.push_str(&format!("showing {} of {}", state.len(), state.total()));
    out
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

use std::cmp;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Align {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy)]
pub struct Column<'a> {
    pub name: &'a str,
    pub align: Align,
}

impl<'a> Column<'a> {
    pub const fn left(name: &'a str) -> Self {
        Self {
            name,
            align: Align::Left,
        }
    }

    pub const fn right(name: &'a str) -> Self {
        Self {
            name,
            align: Align::Right,
        }
    }
}

const INDENT: usize = 2;
const COLUMN_GAP: usize = 2;

pub fn terminal_width() -> usize {
    let from_env = std::env::var("COLUMNS")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(120);
    cmp::max(from_env, 40)
}

pub fn key_value_rows(entries: &[(&str, String)], indent: usize) -> Vec<String> {
    let label_width = entries
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);
    let padding = " ".repeat(indent);

    entries
        .iter()
        .map(|(label, value)| format!("{padding}{label:<label_width$}  {value}"))
        .collect()
}

/// Aligned table when every column fits in `max_width`; one labeled block
/// per row otherwise. Cells are never truncated.
pub fn render_table_or_blocks(
    columns: &[Column<'_>],
    rows: &[Vec<String>],
    max_width: usize,
    block_label: &str,
) -> Vec<String> {
    if columns.is_empty() {
        return Vec::new();
    }

    let widths = natural_column_widths(columns, rows);
    let table_width =
        INDENT + widths.iter().sum::<usize>() + COLUMN_GAP * columns.len().saturating_sub(1);
    if table_width > max_width {
        return render_blocks(columns, rows, block_label);
    }

    let header = columns
        .iter()
        .map(|column| column.name.to_string())
        .collect::<Vec<String>>();
    let mut output = vec![format_row(columns, &header, &widths)];
    output.extend(rows.iter().map(|row| format_row(columns, row, &widths)));
    output
}

fn natural_column_widths(columns: &[Column<'_>], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths = columns
        .iter()
        .map(|column| column.name.chars().count())
        .collect::<Vec<usize>>();

    for row in rows {
        for (index, value) in row.iter().enumerate() {
            if let Some(slot) = widths.get_mut(index) {
                *slot = cmp::max(*slot, value.chars().count());
            }
        }
    }

    widths
}

fn format_row(columns: &[Column<'_>], cells: &[String], widths: &[usize]) -> String {
    let pieces = columns
        .iter()
        .enumerate()
        .map(|(index, column)| {
            let width = widths.get(index).copied().unwrap_or(0);
            let value = cells.get(index).map(String::as_str).unwrap_or("");
            match column.align {
                Align::Left => format!("{value:<width$}"),
                Align::Right => format!("{value:>width$}"),
            }
        })
        .collect::<Vec<String>>();

    let line = format!("{}{}", " ".repeat(INDENT), pieces.join("  "));
    line.trim_end().to_string()
}

fn render_blocks(columns: &[Column<'_>], rows: &[Vec<String>], block_label: &str) -> Vec<String> {
    let labels = columns
        .iter()
        .map(|column| format!("{}:", column.name))
        .collect::<Vec<String>>();
    let label_width = labels.iter().map(String::len).max().unwrap_or(0);

    let mut output = Vec::new();
    for (row_index, row) in rows.iter().enumerate() {
        if row_index > 0 {
            output.push(String::new());
        }
        output.push(format!("  {block_label} {}:", row_index + 1));

        for (column_index, label) in labels.iter().enumerate() {
            let value = row.get(column_index).map(String::as_str).unwrap_or("");
            output.push(format!("    {label:<label_width$}  {value}"));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::{Column, key_value_rows, render_table_or_blocks};

    #[test]
    fn key_value_rows_align_labels() {
        let rows = key_value_rows(
            &[
                ("Cycle end:", "2025-06-30".to_string()),
                ("Days until expiry:", "12".to_string()),
            ],
            2,
        );

        assert_eq!(rows[0], "  Cycle end:          2025-06-30");
        assert_eq!(rows[1], "  Days until expiry:  12");
    }

    #[test]
    fn table_aligns_columns_when_width_is_sufficient() {
        let columns = [Column::left("Benefit"), Column::right("Days")];
        let rows = vec![
            vec!["Uber Cash".to_string(), "5".to_string()],
            vec!["Saks".to_string(), "120".to_string()],
        ];

        let rendered = render_table_or_blocks(&columns, &rows, 80, "Benefit");
        assert_eq!(rendered[0], "  Benefit    Days");
        assert_eq!(rendered[1], "  Uber Cash     5");
        assert_eq!(rendered[2], "  Saks        120");
    }

    #[test]
    fn narrow_width_falls_back_to_blocks() {
        let columns = [
            Column::left("Benefit"),
            Column::right("Days"),
            Column::left("Expires"),
        ];
        let rows = vec![
            vec![
                "Hotel Credit".to_string(),
                "3".to_string(),
                "2025-06-30".to_string(),
            ],
            vec![
                "Airline Fee".to_string(),
                "40".to_string(),
                "2025-08-01".to_string(),
            ],
        ];

        let rendered = render_table_or_blocks(&columns, &rows, 20, "Benefit");
        assert_eq!(rendered[0], "  Benefit 1:");
        assert_eq!(rendered[1], "    Benefit:  Hotel Credit");
        assert_eq!(rendered[2], "    Days:     3");
        assert_eq!(rendered[3], "    Expires:  2025-06-30");
        assert_eq!(rendered[4], "");
        assert_eq!(rendered[5], "  Benefit 2:");
    }
}

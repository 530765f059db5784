//! Terminal preview of a field map.

use crd_kernel::FieldMap;

/// Render the first `max_rows` rows as a right-aligned table with labels.
///
/// A trailing `... (k more rows)` line is added when rows are cut off.
pub fn render_preview(map: &FieldMap, max_rows: usize) -> String {
    let shown: Vec<(&str, &[crd_kernel::TreatmentCode])> = map.iter_rows().take(max_rows).collect();

    let label_width = shown.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    let widths: Vec<usize> = map
        .col_labels()
        .iter()
        .enumerate()
        .map(|(j, label)| {
            shown
                .iter()
                .map(|(_, row)| row[j].as_str().chars().count())
                .max()
                .unwrap_or(0)
                .max(label.len())
        })
        .collect();

    let mut out = String::new();
    out.push_str(&" ".repeat(label_width));
    for (label, width) in map.col_labels().iter().zip(&widths) {
        out.push_str(&format!(" {:>width$}", label, width = *width));
    }
    out.push('\n');

    for (label, row) in &shown {
        out.push_str(&format!("{:<width$}", label, width = label_width));
        for (code, width) in row.iter().zip(&widths) {
            out.push_str(&format!(" {:>width$}", code.as_str(), width = *width));
        }
        out.push('\n');
    }

    let hidden = map.rows().saturating_sub(shown.len());
    if hidden > 0 {
        out.push_str(&format!("... ({} more rows)\n", hidden));
    }
    out
}

/// One-line plot count per treatment, e.g. `A=40 B=40 C=40`.
pub fn render_tally(map: &FieldMap) -> String {
    map.tally()
        .iter()
        .map(|(code, n)| format!("{}={}", code, n))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use crd_kernel::{GridDims, TreatmentCode};

    use super::*;

    fn sample() -> FieldMap {
        let cells = ["A", "Ctrl", "B", "A", "B", "Ctrl", "Ctrl", "A", "B"]
            .iter()
            .map(|c| TreatmentCode::new(c).unwrap())
            .collect();
        FieldMap::from_row_major(cells, GridDims { rows: 3, cols: 3 }).unwrap()
    }

    #[test]
    fn test_preview_aligns_columns() {
        let text = render_preview(&sample(), 10);
        assert_eq!(
            text,
            "     Pos1 Pos2 Pos3\n\
             Row1    A Ctrl    B\n\
             Row2    A    B Ctrl\n\
             Row3 Ctrl    A    B\n"
        );
    }

    #[test]
    fn test_preview_truncates() {
        let text = render_preview(&sample(), 1);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("Row1"));
        assert_eq!(lines[2], "... (2 more rows)");
    }

    #[test]
    fn test_preview_zero_rows_shows_header_only() {
        let text = render_preview(&sample(), 0);
        assert!(text.starts_with(" Pos1"));
        assert!(text.ends_with("... (3 more rows)\n"));
    }

    #[test]
    fn test_tally_line() {
        assert_eq!(render_tally(&sample()), "A=3 Ctrl=3 B=3");
    }
}

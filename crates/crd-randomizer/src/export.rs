//! Writing and reading field maps.
//!
//! Delimited layout: the header row is an empty corner cell followed by
//! `Pos1..PosM`; every following line is `RowN` followed by that row's codes.
//! JSON uses the field map's own serde form. Files are written in one call,
//! so a failed export never leaves a half-written map behind.

use std::path::{Path, PathBuf};

use chrono::Local;
use crd_kernel::{FieldMap, LayoutError, TreatmentCode, TreatmentError};
use thiserror::Error;

/// On-disk format, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Tsv,
    Json,
}

impl ExportFormat {
    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some("tsv") | Some("txt") => Ok(Self::Tsv),
            Some("json") => Ok(Self::Json),
            _ => Err(ExportError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    fn delimiter(self) -> Option<char> {
        match self {
            Self::Csv => Some(','),
            Self::Tsv => Some('\t'),
            Self::Json => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Tsv => "tsv",
            Self::Json => "json",
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("unsupported output format for {}: use .csv, .tsv, .txt or .json", .path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("line {line}: {detail}")]
    Malformed { line: usize, detail: String },

    #[error("line {line}: {source}")]
    Code {
        line: usize,
        #[source]
        source: TreatmentError,
    },

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// Write `map` to `path` in the format its extension names.
pub fn write_field_map(map: &FieldMap, path: &Path) -> Result<ExportFormat, ExportError> {
    let format = ExportFormat::from_path(path)?;
    let contents = match format.delimiter() {
        Some(delimiter) => render_delimited(map, delimiter),
        None => serde_json::to_string_pretty(map)?,
    };
    std::fs::write(path, contents).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(format)
}

/// Read a map previously written by [`write_field_map`].
pub fn read_field_map(path: &Path) -> Result<FieldMap, ExportError> {
    let format = ExportFormat::from_path(path)?;
    let contents = std::fs::read_to_string(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    match format.delimiter() {
        Some(delimiter) => parse_delimited(&contents, delimiter),
        None => Ok(serde_json::from_str(&contents)?),
    }
}

/// Render `map` as delimited text, one line per row plus a header.
pub fn render_delimited(map: &FieldMap, delimiter: char) -> String {
    let mut out = String::new();

    for label in map.col_labels() {
        out.push(delimiter);
        out.push_str(label);
    }
    out.push('\n');

    for (label, row) in map.iter_rows() {
        out.push_str(label);
        for code in row {
            out.push(delimiter);
            push_field(&mut out, code.as_str(), delimiter);
        }
        out.push('\n');
    }

    out
}

/// Parse delimited text back into a map, checking labels and shape.
pub fn parse_delimited(text: &str, delimiter: char) -> Result<FieldMap, ExportError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .filter(|(_, line)| !line.is_empty());

    let (header_line, header) = lines.next().ok_or_else(|| ExportError::Malformed {
        line: 1,
        detail: "file is empty".to_string(),
    })?;
    let mut header = split_fields(header, delimiter, header_line)?.into_iter();
    match header.next() {
        Some(corner) if corner.is_empty() => {}
        _ => {
            return Err(ExportError::Malformed {
                line: header_line,
                detail: "header must start with an empty corner cell".to_string(),
            });
        }
    }
    let col_labels: Vec<String> = header.collect();

    let mut row_labels = Vec::new();
    let mut grid = Vec::new();
    for (line_no, line) in lines {
        let mut fields = split_fields(line, delimiter, line_no)?.into_iter();
        let label = fields.next().unwrap_or_default();
        let row = fields
            .map(|field| {
                TreatmentCode::new(&field).map_err(|source| ExportError::Code {
                    line: line_no,
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        row_labels.push(label);
        grid.push(row);
    }

    Ok(FieldMap::with_labels(&row_labels, &col_labels, grid)?)
}

fn push_field(out: &mut String, field: &str, delimiter: char) {
    if field.contains(delimiter) || field.contains('"') {
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(field);
    }
}

fn split_fields(line: &str, delimiter: char, line_no: usize) -> Result<Vec<String>, ExportError> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut chars = line.chars().peekable();
    let mut quoted = false;

    while let Some(c) = chars.next() {
        if quoted {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => quoted = false,
                _ => field.push(c),
            }
        } else if c == '"' && field.is_empty() {
            quoted = true;
        } else if c == delimiter {
            fields.push(std::mem::take(&mut field));
        } else {
            field.push(c);
        }
    }

    if quoted {
        return Err(ExportError::Malformed {
            line: line_no,
            detail: "unterminated quoted field".to_string(),
        });
    }
    fields.push(field);
    Ok(fields)
}

/// Insert a local timestamp before the extension.
/// e.g., "field_map.csv" -> "field_map-20260108-010530.csv"
pub fn timestamped_path(path: &Path) -> PathBuf {
    let timestamp = Local::now().format("%Y%m%d-%H%M%S");
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("field_map");
    let parent = path.parent().unwrap_or(Path::new("."));
    match path.extension().and_then(|s| s.to_str()) {
        Some(ext) => parent.join(format!("{}-{}.{}", stem, timestamp, ext)),
        None => parent.join(format!("{}-{}", stem, timestamp)),
    }
}

#[cfg(test)]
mod tests {
    use crd_kernel::GridDims;

    use super::*;

    fn map_of(codes: &[&str], rows: usize, cols: usize) -> FieldMap {
        let cells = codes.iter().map(|c| TreatmentCode::new(c).unwrap()).collect();
        FieldMap::from_row_major(cells, GridDims { rows, cols }).unwrap()
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ExportFormat::from_path(Path::new("a.CSV")).unwrap(), ExportFormat::Csv);
        assert_eq!(ExportFormat::from_path(Path::new("a.txt")).unwrap(), ExportFormat::Tsv);
        assert_eq!(ExportFormat::from_path(Path::new("a.json")).unwrap(), ExportFormat::Json);
        assert!(matches!(
            ExportFormat::from_path(Path::new("field_map.xlsx")),
            Err(ExportError::UnsupportedFormat { .. })
        ));
        assert!(ExportFormat::from_path(Path::new("field_map")).is_err());
    }

    #[test]
    fn test_render_csv_layout() {
        let map = map_of(&["A", "B", "B", "A"], 2, 2);
        assert_eq!(
            render_delimited(&map, ','),
            ",Pos1,Pos2\nRow1,A,B\nRow2,B,A\n"
        );
    }

    #[test]
    fn test_render_quotes_awkward_codes() {
        let map = map_of(&["N,high", "say \"x\""], 1, 2);
        assert_eq!(
            render_delimited(&map, ','),
            ",Pos1,Pos2\nRow1,\"N,high\",\"say \"\"x\"\"\"\n"
        );
    }

    #[test]
    fn test_parse_inverts_render() {
        let map = map_of(&["N,high", "say \"x\"", "C", "D", "E", "F"], 3, 2);
        for delimiter in [',', '\t'] {
            let text = render_delimited(&map, delimiter);
            assert_eq!(parse_delimited(&text, delimiter).unwrap(), map);
        }
    }

    #[test]
    fn test_parse_accepts_crlf() {
        let map = parse_delimited(",Pos1\r\nRow1,A\r\n", ',').unwrap();
        assert_eq!(map.cell(0, 0).unwrap().as_str(), "A");
    }

    #[test]
    fn test_parse_rejects_bad_labels() {
        let err = parse_delimited(",Pos1,Pos2\nRow2,A,B\n", ',').unwrap_err();
        assert!(matches!(err, ExportError::Layout(LayoutError::BadLabel { .. })));

        let err = parse_delimited(",Pos2\nRow1,A\n", ',').unwrap_err();
        assert!(matches!(err, ExportError::Layout(LayoutError::BadLabel { kind: "column", .. })));
    }

    #[test]
    fn test_parse_rejects_ragged_and_empty() {
        let err = parse_delimited(",Pos1,Pos2\nRow1,A,B\nRow2,A\n", ',').unwrap_err();
        assert!(matches!(err, ExportError::Layout(LayoutError::RaggedRow { row: 1, .. })));

        assert!(matches!(
            parse_delimited("", ','),
            Err(ExportError::Malformed { .. })
        ));
        assert!(matches!(
            parse_delimited("x,Pos1\nRow1,A\n", ','),
            Err(ExportError::Malformed { .. })
        ));
        assert!(matches!(
            parse_delimited(",Pos1\nRow1,\"A\n", ','),
            Err(ExportError::Malformed { line: 2, .. })
        ));
    }

    #[test]
    fn test_parse_rejects_empty_cell() {
        let err = parse_delimited(",Pos1,Pos2\nRow1,A,\n", ',').unwrap_err();
        assert!(matches!(
            err,
            ExportError::Code {
                line: 2,
                source: TreatmentError::EmptyCode
            }
        ));
    }

    #[test]
    fn test_timestamped_path_keeps_extension() {
        let path = timestamped_path(Path::new("out/field_map.csv"));
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("field_map-"));
        assert!(name.ends_with(".csv"));
        assert_eq!(path.parent().unwrap(), Path::new("out"));
    }
}

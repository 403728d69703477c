//! CSV export of a filtered set
//!
//! Rows are the filtered, sorted records (never just the current page).
//! Columns follow the caller's visible-column list; columns the layout does
//! not know (e.g. `actions`) are skipped. Fields are quoted only when they
//! contain a comma, quote or line break, with inner quotes doubled. Lines are
//! joined with `\n` and there is no trailing newline.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Export errors
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Export buffer error: {0}")]
    Buffer(String),

    #[error("Exported data is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;

/// Renders one cell of a record
pub type CellFn<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;

/// One exportable column
pub struct CsvColumn<T> {
    pub key: &'static str,
    pub header: &'static str,
    cell: CellFn<T>,
}

impl<T> CsvColumn<T> {
    pub fn new(
        key: &'static str,
        header: &'static str,
        cell: impl Fn(&T) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            key,
            header,
            cell: Arc::new(cell),
        }
    }

    pub fn render(&self, record: &T) -> String {
        (self.cell)(record)
    }
}

impl<T> Clone for CsvColumn<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key,
            header: self.header,
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<T> fmt::Debug for CsvColumn<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsvColumn")
            .field("key", &self.key)
            .field("header", &self.header)
            .finish()
    }
}

/// Every exportable column of an entity, with its formatter
#[derive(Debug, Clone)]
pub struct CsvLayout<T> {
    columns: Vec<CsvColumn<T>>,
}

impl<T> Default for CsvLayout<T> {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
        }
    }
}

impl<T> CsvLayout<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a column
    pub fn column(
        mut self,
        key: &'static str,
        header: &'static str,
        cell: impl Fn(&T) -> String + Send + Sync + 'static,
    ) -> Self {
        self.columns.push(CsvColumn::new(key, header, cell));
        self
    }

    /// Every column key in declared order
    pub fn keys(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.key).collect()
    }

    pub fn get(&self, key: &str) -> Option<&CsvColumn<T>> {
        self.columns.iter().find(|c| c.key == key)
    }

    /// Export with every column
    pub fn to_csv_all(&self, records: &[&T]) -> ExportResult<String> {
        to_csv(records, &self.keys(), self)
    }
}

/// Serialize `records` with the `visible` columns, in that order.
///
/// Returns an empty string when none of the visible columns is exportable.
pub fn to_csv<T>(records: &[&T], visible: &[&str], layout: &CsvLayout<T>) -> ExportResult<String> {
    let columns: Vec<&CsvColumn<T>> = visible.iter().filter_map(|key| layout.get(key)).collect();
    if columns.is_empty() {
        return Ok(String::new());
    }

    let mut builder = csv::WriterBuilder::new();
    builder
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'));

    let mut writer = builder.from_writer(Vec::new());
    writer.write_record(columns.iter().map(|c| c.header))?;
    for record in records {
        let cells: Vec<String> = columns.iter().map(|c| c.render(*record)).collect();
        if let [only] = cells.as_slice() {
            if only.is_empty() {
                // The writer would emit `""` for a lone empty field
                let mut bytes = finish(writer)?;
                bytes.push(b'\n');
                writer = builder.from_writer(bytes);
                continue;
            }
        }
        writer.write_record(&cells)?;
    }

    let mut text = String::from_utf8(finish(writer)?)?;
    if text.ends_with('\n') {
        text.pop();
    }

    tracing::debug!(rows = records.len(), columns = columns.len(), "Exported CSV");
    Ok(text)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> ExportResult<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| ExportError::Buffer(e.error().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row {
        id: &'static str,
        note: &'static str,
        done: bool,
    }

    fn layout() -> CsvLayout<Row> {
        CsvLayout::new()
            .column("id", "ID", |r: &Row| r.id.to_string())
            .column("note", "Note", |r: &Row| r.note.to_string())
            .column("done", "Done", |r: &Row| {
                let text = if r.done { "Yes" } else { "No" };
                text.to_string()
            })
    }

    #[test]
    fn test_plain_values_are_unquoted() {
        let rows = [Row {
            id: "P1",
            note: "fine",
            done: true,
        }];
        let refs: Vec<&Row> = rows.iter().collect();
        let csv = to_csv(&refs, &["id", "note", "done"], &layout()).unwrap();
        assert_eq!(csv, "ID,Note,Done\nP1,fine,Yes");
    }

    #[test]
    fn test_special_characters_are_quoted() {
        let rows = [Row {
            id: "P2",
            note: "said \"hi\", then\nleft",
            done: false,
        }];
        let refs: Vec<&Row> = rows.iter().collect();
        let csv = to_csv(&refs, &["note", "id"], &layout()).unwrap();
        assert_eq!(csv, "Note,ID\n\"said \"\"hi\"\", then\nleft\",P2");
    }

    #[test]
    fn test_single_column_empty_values_stay_empty() {
        let rows = [
            Row {
                id: "P4",
                note: "",
                done: false,
            },
            Row {
                id: "P5",
                note: "x\n\"\n",
                done: false,
            },
            Row {
                id: "P6",
                note: "",
                done: true,
            },
        ];
        let refs: Vec<&Row> = rows.iter().collect();
        let csv = to_csv(&refs, &["note"], &layout()).unwrap();
        assert_eq!(csv, "Note\n\n\"x\n\"\"\n\"\n");

        let csv = to_csv(&refs[..1], &["note", "done"], &layout()).unwrap();
        assert_eq!(csv, "Note,Done\n,No");
    }

    #[test]
    fn test_hidden_and_unknown_columns_are_skipped() {
        let rows = [Row {
            id: "P3",
            note: "x",
            done: true,
        }];
        let refs: Vec<&Row> = rows.iter().collect();
        let csv = to_csv(&refs, &["id", "actions", "done"], &layout()).unwrap();
        assert_eq!(csv, "ID,Done\nP3,Yes");

        assert_eq!(to_csv(&refs, &["actions"], &layout()).unwrap(), "");
    }

    #[test]
    fn test_header_only_when_no_rows() {
        let csv = layout().to_csv_all(&[]).unwrap();
        assert_eq!(csv, "ID,Note,Done");
    }
}

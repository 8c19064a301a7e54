//! CSV conversation source.
//!
//! Expects a header row with `username` and `session_content`, plus an
//! optional `title` (or `session_title`) column. Extra columns are ignored,
//! empty title cells count as absent, and quoted multi-line content is fine.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};

use vectorlab_types::conversation::SourceRecord;
use vectorlab_types::error::SourceError;

const USERNAME: &str = "username";
const CONTENT: &str = "session_content";
const TITLE_COLUMNS: [&str; 2] = ["title", "session_title"];

/// Column positions resolved from the header row.
#[derive(Debug, Clone, Copy)]
struct Columns {
    username: usize,
    content: usize,
    title: Option<usize>,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self, SourceError> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let required = |name: &str| {
            find(name).ok_or_else(|| SourceError::MissingField {
                line: 1,
                field: name.to_string(),
            })
        };

        Ok(Self {
            username: required(USERNAME)?,
            content: required(CONTENT)?,
            title: TITLE_COLUMNS.iter().find_map(|name| find(name)),
        })
    }
}

/// Iterator of [`SourceRecord`]s read lazily from CSV.
pub struct CsvRecordSource<R> {
    reader: csv::Reader<R>,
    columns: Columns,
    done: bool,
}

impl CsvRecordSource<File> {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path)
            .map_err(|e| SourceError::Io(format!("{}: {e}", path.display())))?;
        Self::from_reader(file)
    }
}

impl<R: Read> CsvRecordSource<R> {
    pub fn from_reader(input: R) -> Result<Self, SourceError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(input);
        let headers = reader.headers().map_err(map_csv_error)?.clone();
        let columns = Columns::resolve(&headers)?;

        Ok(Self {
            reader,
            columns,
            done: false,
        })
    }

    fn to_record(&self, row: &StringRecord) -> Result<SourceRecord, SourceError> {
        let line = row.position().map(|p| p.line()).unwrap_or(0);
        let field = |idx: usize, name: &str| {
            row.get(idx).ok_or_else(|| SourceError::MissingField {
                line,
                field: name.to_string(),
            })
        };

        let mut record = SourceRecord::new(
            field(self.columns.username, USERNAME)?,
            field(self.columns.content, CONTENT)?,
        );
        if let Some(title) = self
            .columns
            .title
            .and_then(|idx| row.get(idx))
            .map(str::trim)
            .filter(|t| !t.is_empty())
        {
            record = record.with_title(title);
        }
        Ok(record)
    }
}

impl<R: Read> Iterator for CsvRecordSource<R> {
    type Item = Result<SourceRecord, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut row = StringRecord::new();
        match self.reader.read_record(&mut row) {
            Ok(true) => Some(self.to_record(&row)),
            Ok(false) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(map_csv_error(e)))
            }
        }
    }
}

fn map_csv_error(err: csv::Error) -> SourceError {
    let line = err.position().map(|p| p.line()).unwrap_or(0);
    match err.kind() {
        csv::ErrorKind::Io(e) => SourceError::Io(e.to_string()),
        _ => SourceError::Malformed {
            line,
            message: err.to_string(),
        },
    }
}

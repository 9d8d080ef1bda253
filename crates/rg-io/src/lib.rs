#![forbid(unsafe_code)]

//! Dataset loader for the registry CSVs.
//!
//! The three source files share no delimiter convention, so the loader
//! tries a fixed priority list and keeps the first parse that looks like a
//! table (more than one column, at least one row). Individual malformed
//! lines are skipped, never fatal; only a dataset that no delimiter can
//! parse is an error. Loaded text goes through the replacement-glyph
//! repair from [`rg_types::repair`].

pub mod rules;

use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use rg_frame::Table;
use rg_types::{repair::mask_glyphs, Scalar};
use thiserror::Error;
use tracing::{debug, warn};

/// Delimiters tried in order when loading a dataset.
pub const DELIMITERS: &[u8] = &[b',', b';', b'\t', b'|'];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("dataset name '{0}' is not valid: file name should be lower case")]
    InvalidName(String),
    #[error("dataset '{}' is not valid: file extension should be csv", .0.display())]
    InvalidExtension(PathBuf),
    #[error("no suitable delimiter found in '{}'", .0.display())]
    DelimiterNotFound(PathBuf),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Resolves dataset names against a fixed data directory.
///
/// Every call re-reads and re-parses the file; the datasets are small,
/// static, and historical, so there is deliberately no cache.
#[derive(Debug, Clone)]
pub struct DatasetStore {
    data_dir: PathBuf,
}

impl DatasetStore {
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Loads a dataset by file name.
    ///
    /// The name must be all-lowercase and resolve to a `.csv` path; both
    /// checks happen before any I/O and are hard failures, never silent
    /// corrections.
    pub fn load(&self, name: &str) -> Result<Table, LoadError> {
        if !rules::is_lowercase_name(name) {
            return Err(LoadError::InvalidName(name.to_owned()));
        }
        let path = self.data_dir.join(name);
        if !rules::is_csv_extension(&path) {
            return Err(LoadError::InvalidExtension(path));
        }
        load_with_unknown_delimiter(&path)
    }
}

/// Reads `path` and tries each delimiter in [`DELIMITERS`] until one yields
/// a usable table.
///
/// The file is decoded lossily: bytes that are not valid UTF-8 become the
/// replacement glyph and are then masked like the glyphs already present
/// in the data.
pub fn load_with_unknown_delimiter(path: &Path) -> Result<Table, LoadError> {
    let bytes = std::fs::read(path)?;
    let content = String::from_utf8_lossy(&bytes);

    for &delimiter in DELIMITERS {
        match parse_delimited(&content, delimiter) {
            Some(table) => {
                debug!(
                    delimiter = %(delimiter as char),
                    rows = table.row_count(),
                    columns = table.column_count(),
                    "delimiter accepted"
                );
                return Ok(table);
            }
            None => {
                debug!(delimiter = %(delimiter as char), "delimiter rejected");
            }
        }
    }

    warn!(path = %path.display(), "no suitable delimiter found");
    Err(LoadError::DelimiterNotFound(path.to_owned()))
}

/// Tolerant parse with one fixed delimiter.
///
/// Rows whose field count differs from the header are skipped, as are rows
/// the csv reader rejects outright. Returns `None` when the result is not
/// a usable table: a single column means the delimiter never split
/// anything, zero rows means there was nothing to load.
fn parse_delimited(content: &str, delimiter: u8) -> Option<Table> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader.headers().ok()?.clone();
    let width = headers.len();

    let mut columns: Vec<Vec<Scalar>> = vec![Vec::new(); width];
    let mut rows = 0usize;
    for record in reader.records() {
        let Ok(record) = record else {
            continue;
        };
        if record.len() != width {
            continue;
        }
        for (idx, column) in columns.iter_mut().enumerate() {
            column.push(parse_field(record.get(idx).unwrap_or_default()));
        }
        rows += 1;
    }

    if width <= 1 || rows == 0 {
        return None;
    }

    let mut table = Table::new();
    for (idx, values) in columns.into_iter().enumerate() {
        let name = headers.get(idx).unwrap_or_default().to_owned();
        // A duplicated header means this delimiter split the line wrongly.
        table.push_column(name, values).ok()?;
    }
    Some(table)
}

/// Field typing priority: missing → integer → float → repaired text.
fn parse_field(field: &str) -> Scalar {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return Scalar::Null;
    }
    if let Ok(value) = trimmed.parse::<i64>() {
        return Scalar::Int64(value);
    }
    if let Ok(value) = trimmed.parse::<f64>() {
        return Scalar::Float64(value);
    }
    Scalar::Utf8(mask_glyphs(trimmed))
}

//! Data loading and export utilities

use crate::error::{Result, SentinelError};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// Tokens read as missing values in addition to empty fields
pub const DEFAULT_NULL_TOKENS: [&str; 5] = ["NA", "N/A", "NaN", "null", "NULL"];

/// Loader for delimited KPI files
#[derive(Debug, Clone)]
pub struct DataLoader {
    /// Field separator; inferred from the extension when unset
    delimiter: Option<u8>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    /// Create a new data loader
    pub fn new() -> Self {
        Self { delimiter: None }
    }

    /// Set an explicit field separator
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Load a delimited file (comma by default, tab for `.tsv`)
    pub fn load_csv(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let path = path.as_ref();
        let delimiter = self.delimiter.unwrap_or_else(|| Self::delimiter_for(path));

        let null_values = NullValues::AllColumns(
            DEFAULT_NULL_TOKENS.iter().map(|t| (*t).into()).collect(),
        );
        let parse_opts = CsvParseOptions::default()
            .with_separator(delimiter)
            .with_null_values(Some(null_values));

        let df = CsvReadOptions::default()
            .with_has_header(true)
            // infer types from every row
            .with_infer_schema_length(None)
            .with_parse_options(parse_opts)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .map_err(|e| SentinelError::DataError(format!("{}: {}", path.display(), e)))?
            .finish()
            .map_err(|e| SentinelError::DataError(format!("{}: {}", path.display(), e)))?;

        debug!(path = %path.display(), rows = df.height(), cols = df.width(), "Loaded table");
        Ok(df)
    }

    fn delimiter_for(path: &Path) -> u8 {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
            _ => b',',
        }
    }
}

/// Data saver for exported tables
pub struct DataSaver;

impl DataSaver {
    /// Save to CSV; floats are written in shortest round-trip form
    pub fn save_csv(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path.as_ref())?;

        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(df)
            .map_err(|e| SentinelError::DataError(e.to_string()))
    }
}

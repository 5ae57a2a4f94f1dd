//! Data loading utilities

use crate::error::{HousingError, Result};
use polars::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// CSV loader for the cleaned housing dataset
#[derive(Debug, Clone)]
pub struct DataLoader {
    /// Rows sampled for schema inference
    infer_schema_length: usize,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    /// Create a new data loader
    pub fn new() -> Self {
        Self {
            infer_schema_length: 1000,
        }
    }

    /// Set the number of rows used to infer column types
    pub fn with_infer_schema_length(mut self, n: usize) -> Self {
        self.infer_schema_length = n.max(1);
        self
    }

    /// Load a headered CSV file
    pub fn load_csv(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| HousingError::DataError(format!("{}: {}", path.display(), e)))?;

        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(self.infer_schema_length))
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| HousingError::DataError(format!("{}: {}", path.display(), e)))
    }

    /// Get file info from the header line without parsing the body
    pub fn get_file_info(&self, path: impl AsRef<Path>) -> Result<FileInfo> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path)
            .map_err(|e| HousingError::DataError(format!("{}: {}", path.display(), e)))?;

        let file = File::open(path)?;
        let mut lines = BufReader::new(file).lines();

        let header = lines.next().transpose()?.unwrap_or_default();
        let columns: Vec<String> = header
            .split(',')
            .map(|s| s.trim().trim_matches('"').to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let mut n_rows = 0;
        for line in lines {
            if !line?.trim().is_empty() {
                n_rows += 1;
            }
        }

        Ok(FileInfo {
            path: path.display().to_string(),
            file_size: metadata.len(),
            n_rows,
            n_cols: columns.len(),
            columns,
        })
    }
}

/// File information
#[derive(Debug, Clone)]
pub struct FileInfo {
    pub path: String,
    pub file_size: u64,
    pub n_rows: usize,
    pub n_cols: usize,
    pub columns: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_csv() -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .unwrap();
        writeln!(file, "Size_sqft,Bedrooms,Price,LogPrice").unwrap();
        writeln!(file, "1200,2,250000,12.43").unwrap();
        writeln!(file, "1800,3,340000,12.74").unwrap();
        writeln!(file, "2400,4,455000,13.03").unwrap();
        file
    }

    #[test]
    fn test_load_csv() {
        let file = create_test_csv();
        let loader = DataLoader::new();

        let df = loader.load_csv(file.path()).unwrap();

        assert_eq!(df.height(), 3);
        assert_eq!(df.width(), 4);
    }

    #[test]
    fn test_load_missing_file() {
        let loader = DataLoader::new();
        let err = loader.load_csv("definitely/not/here.csv").unwrap_err();

        assert!(matches!(err, HousingError::DataError(_)));
        assert!(err.to_string().contains("here.csv"));
    }

    #[test]
    fn test_get_file_info() {
        let file = create_test_csv();
        let loader = DataLoader::new();

        let info = loader.get_file_info(file.path()).unwrap();

        assert_eq!(info.n_rows, 3);
        assert_eq!(info.n_cols, 4);
        assert_eq!(info.columns[2], "Price");
    }
}

//! Delimited-text ingestion into named numeric tables.
//!
//! Measurement exports in this domain lead with a few lines of free-form
//! metadata, then a header row of column names, then numeric rows. The parser
//! skips the metadata, keeps the names, and hands the core a dense `f64`
//! matrix; everything downstream addresses columns by index.

use crate::{Error, Result};
use ndarray::Array2;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// A named numeric table: one row per measurement, one column per scalar.
#[derive(Debug, Clone)]
pub struct ScalarTable {
    names: Vec<String>,
    data: Array2<f64>,
}

impl ScalarTable {
    /// Read a table from a delimited-text file, skipping `header_lines` lines
    /// of leading metadata before the header row.
    pub fn from_csv_path(path: impl AsRef<Path>, header_lines: usize) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file, header_lines)
    }

    /// Read a table from any reader; see [`ScalarTable::from_csv_path`].
    pub fn from_reader(reader: impl Read, header_lines: usize) -> Result<Self> {
        let mut buffered = BufReader::new(reader);
        for k in 0..header_lines {
            let mut line = String::new();
            if buffered.read_line(&mut line)? == 0 {
                return Err(Error::Parse(format!(
                    "file ended inside the {header_lines}-line metadata block (line {k})"
                )));
            }
        }

        // Flexible record lengths so ragged rows reach the shape check below
        // and report row context instead of a bare CSV-layer error.
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(buffered);

        let names: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|name| name.to_string())
            .collect();
        if names.is_empty() {
            return Err(Error::Parse("header row is empty".to_string()));
        }

        let mut values: Vec<f64> = Vec::new();
        let mut nrows = 0usize;
        for (row, record) in csv_reader.records().enumerate() {
            let record = record?;
            if record.len() != names.len() {
                return Err(Error::Parse(format!(
                    "row {} has {} fields, header has {}",
                    row,
                    record.len(),
                    names.len()
                )));
            }
            for (col, field) in record.iter().enumerate() {
                let value: f64 = field.parse().map_err(|_| {
                    Error::Parse(format!("row {row}, column {col}: not a number: {field:?}"))
                })?;
                values.push(value);
            }
            nrows += 1;
        }

        let data = Array2::from_shape_vec((nrows, names.len()), values)
            .map_err(|_| Error::ShapeMismatch("table rows do not form a rectangular matrix"))?;
        Ok(Self { names, data })
    }

    /// Column names in file order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The numeric matrix, rows × columns.
    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    pub fn nrows(&self) -> usize {
        self.data.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.data.ncols()
    }

    /// 0-based index of a named column, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|candidate| candidate == name)
    }
}

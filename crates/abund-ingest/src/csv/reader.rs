//! CSV file reading with load-failure classification.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use polars::prelude::{
    CsvReadOptions, DataFrame, DataType, NamedFrom, PolarsError, PolarsResult, SerReader, Series,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{LoadError, Result};

use super::header::{HeaderProblem, check_header, parse_csv_line};

/// Default number of rows polars inspects when inferring column dtypes.
pub const DEFAULT_INFER_SCHEMA_LENGTH: usize = 100;

/// Options controlling how a source table is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Field separator byte.
    pub separator: u8,
    /// Rows used for dtype inference (`None` scans the whole file).
    pub infer_schema_length: Option<usize>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            separator: b',',
            infer_schema_length: Some(DEFAULT_INFER_SCHEMA_LENGTH),
        }
    }
}

impl LoadOptions {
    #[must_use]
    pub fn with_separator(mut self, separator: u8) -> Self {
        self.separator = separator;
        self
    }

    #[must_use]
    pub fn with_infer_schema_length(mut self, rows: Option<usize>) -> Self {
        self.infer_schema_length = rows;
        self
    }
}

/// Reject encodings polars cannot read (UTF-16 byte order marks).
pub fn validate_encoding(path: &Path) -> Result<()> {
    let mut file = File::open(path).map_err(|e| LoadError::from_io(path, &e))?;

    let mut buffer = [0u8; 2];
    let bytes_read = file
        .read(&mut buffer)
        .map_err(|e| LoadError::from_io(path, &e))?;

    if bytes_read == 2 && (buffer == [0xFF, 0xFE] || buffer == [0xFE, 0xFF]) {
        return Err(LoadError::Malformed {
            path: path.to_path_buf(),
            message: "UTF-16 encoded input is not supported".to_string(),
        });
    }
    Ok(())
}

/// Reads the header row, returning `None` when the file has no lines.
fn read_header_line(path: &Path) -> Result<Option<String>> {
    let file = File::open(path).map_err(|e| LoadError::from_io(path, &e))?;
    let mut reader = BufReader::new(file);
    let mut line = String::new();
    let bytes = reader
        .read_line(&mut line)
        .map_err(|e| LoadError::from_io(path, &e))?;
    if bytes == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Reads and validates the header row of a CSV file.
pub fn read_csv_header(path: &Path, separator: u8) -> Result<Vec<String>> {
    let Some(line) = read_header_line(path)? else {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
        });
    };
    let columns = parse_csv_line(&line, separator);
    match check_header(&columns) {
        None => Ok(columns),
        Some(HeaderProblem::Blank) => Err(LoadError::Empty {
            path: path.to_path_buf(),
        }),
        Some(HeaderProblem::EmptyName(idx)) => Err(LoadError::Malformed {
            path: path.to_path_buf(),
            message: format!("column {} has an empty name", idx + 1),
        }),
        Some(HeaderProblem::Duplicate(name)) => Err(LoadError::Malformed {
            path: path.to_path_buf(),
            message: format!("column name '{name}' appears more than once"),
        }),
    }
}

fn classify_polars_error(path: &Path, error: &PolarsError) -> LoadError {
    match error {
        PolarsError::IO { .. } => LoadError::Unknown {
            path: path.to_path_buf(),
            message: error.to_string(),
        },
        _ => LoadError::Malformed {
            path: path.to_path_buf(),
            message: error.to_string(),
        },
    }
}

/// Loads a CSV file with default options.
pub fn load_table(path: &Path) -> Result<DataFrame> {
    load_table_with_options(path, &LoadOptions::default())
}

/// Loads a CSV file into a DataFrame, classifying every failure.
///
/// Floating-point `NaN` cells are converted to nulls so that downstream
/// stages see a single missing-value marker.
pub fn load_table_with_options(path: &Path, options: &LoadOptions) -> Result<DataFrame> {
    validate_encoding(path)?;
    let headers = read_csv_header(path, options.separator)?;
    debug!(path = %path.display(), columns = headers.len(), "header parsed");

    let separator = options.separator;
    let mut df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(options.infer_schema_length)
        .map_parse_options(|parse| parse.with_separator(separator))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| classify_polars_error(path, &e))?
        .finish()
        .map_err(|e| classify_polars_error(path, &e))?;

    if df.height() == 0 || df.width() == 0 {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
        });
    }

    let nan_cells = nan_to_null(&mut df).map_err(|e| LoadError::Unknown {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    if nan_cells > 0 {
        debug!(nan_cells, "converted NaN cells to nulls");
    }

    info!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "data loaded"
    );
    Ok(df)
}

/// Replaces `NaN` in floating-point columns with null. Returns the number of
/// cells converted.
pub fn nan_to_null(df: &mut DataFrame) -> PolarsResult<usize> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();
    let mut converted = 0usize;
    for name in &names {
        let column = df.column(name)?;
        if !matches!(column.dtype(), DataType::Float32 | DataType::Float64) {
            continue;
        }
        let as_f64 = column.cast(&DataType::Float64)?;
        let values = as_f64.f64()?;
        let nan_count = values
            .into_iter()
            .filter(|value| value.is_some_and(f64::is_nan))
            .count();
        if nan_count == 0 {
            continue;
        }
        let cleaned: Vec<Option<f64>> = values
            .into_iter()
            .map(|value| value.filter(|v| !v.is_nan()))
            .collect();
        df.with_column(Series::new(name.as_str().into(), cleaned))?;
        converted += nan_count;
    }
    Ok(converted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_read_csv_header_with_bom() {
        let file = create_temp_csv("\u{feff}id,SpeciesA\n1,2\n");
        let headers = read_csv_header(file.path(), b',').unwrap();
        assert_eq!(headers, vec!["id", "SpeciesA"]);
    }

    #[test]
    fn test_read_csv_header_empty_file() {
        let file = create_temp_csv("");
        let result = read_csv_header(file.path(), b',');
        assert!(matches!(result, Err(LoadError::Empty { .. })));
    }

    #[test]
    fn test_read_csv_header_duplicate_names() {
        let file = create_temp_csv("id,id\n1,2\n");
        let result = read_csv_header(file.path(), b',');
        assert!(matches!(result, Err(LoadError::Malformed { .. })));
    }

    #[test]
    fn test_read_csv_header_keeps_padded_names() {
        let file = create_temp_csv("a,a , SpeciesA\n1,2,3\n");
        let headers = read_csv_header(file.path(), b',').unwrap();
        assert_eq!(headers, vec!["a", "a ", " SpeciesA"]);
    }

    #[test]
    fn test_validate_encoding_rejects_utf16() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[0xFF, 0xFE, b'i', 0, b'd', 0]).unwrap();
        let result = validate_encoding(file.path());
        assert!(matches!(result, Err(LoadError::Malformed { .. })));
    }

    #[test]
    fn test_load_table_basic() {
        let file = create_temp_csv("id,SpeciesA,SpeciesB\n1,10,0\n2,,5\n");
        let df = load_table(file.path()).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 3);
        assert_eq!(df.column("SpeciesA").unwrap().null_count(), 1);
    }

    #[test]
    fn test_load_table_converts_nan() {
        let file = create_temp_csv("id,SpeciesA\n1,1.5\n2,NaN\n3,2.5\n");
        let df = load_table(file.path()).unwrap();
        assert_eq!(df.column("SpeciesA").unwrap().null_count(), 1);
    }

    #[test]
    fn test_load_table_header_only_is_empty() {
        let file = create_temp_csv("id,SpeciesA\n");
        let result = load_table(file.path());
        assert!(matches!(result, Err(LoadError::Empty { .. })));
    }

    #[test]
    fn test_load_table_tab_separated() {
        let file = create_temp_csv("id\tSpeciesA\n1\t4\n");
        let options = LoadOptions::default().with_separator(b'\t');
        let df = load_table_with_options(file.path(), &options).unwrap();
        assert_eq!(df.width(), 2);
    }
}

//! Dataset loader for delimited text files

use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::*;

use crate::utils::{create_spinner, finish_with_success, print_warning};

/// Read a file and decode it as UTF-8, replacing malformed sequences with
/// U+FFFD. Returns the text and whether any replacement happened.
pub fn read_lossy(path: &Path) -> Result<(String, bool)> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;
    let (text, had_errors) = encoding_rs::UTF_8.decode_with_bom_removal(&bytes);
    Ok((text.into_owned(), had_errors))
}

fn csv_options(infer_schema_length: usize) -> CsvReadOptions {
    // 0 means full table scan
    let schema_length = if infer_schema_length == 0 {
        None
    } else {
        Some(infer_schema_length)
    };

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(schema_length)
}

/// Parse decoded CSV text into a DataFrame
pub fn parse_csv(text: String, infer_schema_length: usize) -> Result<DataFrame> {
    let df = csv_options(infer_schema_length)
        .into_reader_with_file_handle(Cursor::new(text.into_bytes()))
        .finish()
        .context("Failed to parse CSV data")?;
    Ok(df)
}

/// Load a dataset with a spinner, returning the frame and its shape.
///
/// # Returns
/// `(dataframe, rows, columns, estimated memory in MB)`
pub fn load_dataset_with_progress(
    path: &Path,
    infer_schema_length: usize,
) -> Result<(DataFrame, usize, usize, f64)> {
    let spinner = create_spinner("Loading dataset...");

    let (text, had_errors) = match read_lossy(path) {
        Ok(decoded) => decoded,
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e);
        }
    };

    let df = match parse_csv(text, infer_schema_length) {
        Ok(df) => df,
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e.context(format!("Failed to load CSV file: {}", path.display())));
        }
    };

    let (rows, cols) = df.shape();
    let memory_mb = df.estimated_size() as f64 / (1024.0 * 1024.0);
    finish_with_success(&spinner, &format!("Dataset loaded ({} rows)", rows));

    if had_errors {
        print_warning("Input contained invalid UTF-8; affected bytes were replaced");
    }

    Ok((df, rows, cols, memory_mb))
}

/// Read only the header of a CSV file
pub fn get_column_names(path: &Path) -> Result<Vec<String>> {
    let (text, _) = read_lossy(path)?;
    let df = csv_options(1)
        .with_n_rows(Some(1))
        .into_reader_with_file_handle(Cursor::new(text.into_bytes()))
        .finish()
        .with_context(|| format!("Failed to read CSV header: {}", path.display()))?;

    Ok(df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect())
}

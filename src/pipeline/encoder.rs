//! Categorical encoding: distinct values to integer codes and back

use std::collections::HashMap;

use anyhow::Result;
use polars::prelude::*;
use serde::Serialize;

use super::preprocess::{column_as_text, require_columns};
use crate::error::PipelineError;
use crate::utils::create_progress_bar;

/// Maps each distinct value of one column to a dense code.
///
/// Codes follow the sorted order of the distinct values: numeric columns sort
/// by value, everything else lexicographically. Nulls are encoded as the
/// absence token, like any other value.
#[derive(Debug, Clone, Serialize)]
pub struct CategoricalEncoder {
    column: String,
    classes: Vec<String>,
    #[serde(skip)]
    index: HashMap<String, u32>,
}

impl CategoricalEncoder {
    /// Fit on every row of the column
    pub fn fit(column: &Column) -> Result<Self> {
        let keys = column_as_text(column)?;
        Ok(Self::from_keys(
            column.name().as_str(),
            keys,
            column.dtype().is_primitive_numeric(),
        ))
    }

    /// Fit on a subset of rows only
    pub fn fit_rows(column: &Column, rows: &[usize]) -> Result<Self> {
        let keys = column_as_text(column)?;
        let subset: Vec<String> = rows.iter().map(|&r| keys[r].clone()).collect();
        Ok(Self::from_keys(
            column.name().as_str(),
            subset,
            column.dtype().is_primitive_numeric(),
        ))
    }

    fn from_keys(name: &str, keys: Vec<String>, numeric: bool) -> Self {
        let mut classes = keys;
        if numeric {
            classes.sort_by(|a, b| parse_key(a).total_cmp(&parse_key(b)));
        } else {
            classes.sort();
        }
        classes.dedup();

        let index = classes
            .iter()
            .enumerate()
            .map(|(code, value)| (value.clone(), code as u32))
            .collect();

        Self {
            column: name.to_string(),
            classes,
            index,
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    /// Distinct values in code order
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Code for a single value
    pub fn encode(&self, value: &str) -> Option<u32> {
        self.index.get(value).copied()
    }

    /// Replace values by codes, failing on a value not seen during fit
    pub fn transform(&self, column: &Column) -> Result<Column> {
        let keys = column_as_text(column)?;
        let codes = keys
            .iter()
            .map(|k| {
                self.encode(k).ok_or_else(|| PipelineError::UnknownCategory {
                    column: self.column.clone(),
                    value: k.clone(),
                })
            })
            .collect::<std::result::Result<Vec<u32>, _>>()?;
        Ok(Column::new(column.name().clone(), codes))
    }

    /// Replace values by codes; unseen values get the reserved code
    /// `n_classes()`
    pub fn transform_with_unknown(&self, column: &Column) -> Result<Column> {
        let unknown = self.classes.len() as u32;
        let codes: Vec<u32> = column_as_text(column)?
            .iter()
            .map(|k| self.encode(k).unwrap_or(unknown))
            .collect();
        Ok(Column::new(column.name().clone(), codes))
    }

    /// Map codes back to the original values
    pub fn inverse_transform(&self, codes: &[u32]) -> Result<Vec<String>> {
        codes
            .iter()
            .map(|&code| {
                self.classes.get(code as usize).cloned().ok_or_else(|| {
                    PipelineError::UnknownCode {
                        column: self.column.clone(),
                        code,
                        classes: self.classes.len(),
                    }
                    .into()
                })
            })
            .collect()
    }
}

fn parse_key(key: &str) -> f64 {
    key.parse::<f64>().unwrap_or(f64::NAN)
}

/// The fitted encoders of one run, in encoding order
#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoricalEncoders {
    encoders: Vec<CategoricalEncoder>,
}

impl CategoricalEncoders {
    pub fn get(&self, column: &str) -> Option<&CategoricalEncoder> {
        self.encoders.iter().find(|e| e.column == column)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoricalEncoder> {
        self.encoders.iter()
    }

    pub fn len(&self) -> usize {
        self.encoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encoders.is_empty()
    }
}

/// Fit one encoder per column over the whole column and replace the values
/// with codes.
pub fn encode_categoricals(
    df: &DataFrame,
    columns: &[String],
) -> Result<(DataFrame, CategoricalEncoders)> {
    encode_with(df, columns, |column| {
        let encoder = CategoricalEncoder::fit(column)?;
        let codes = encoder.transform(column)?;
        Ok((encoder, codes))
    })
}

/// Fit one encoder per column on `rows` only and encode every row; values
/// absent from those rows get the reserved unknown code.
pub fn encode_categoricals_on_rows(
    df: &DataFrame,
    columns: &[String],
    rows: &[usize],
) -> Result<(DataFrame, CategoricalEncoders)> {
    encode_with(df, columns, |column| {
        let encoder = CategoricalEncoder::fit_rows(column, rows)?;
        let codes = encoder.transform_with_unknown(column)?;
        Ok((encoder, codes))
    })
}

fn encode_with<F>(
    df: &DataFrame,
    columns: &[String],
    mut encode: F,
) -> Result<(DataFrame, CategoricalEncoders)>
where
    F: FnMut(&Column) -> Result<(CategoricalEncoder, Column)>,
{
    let names: Vec<&str> = columns.iter().map(|s| s.as_str()).collect();
    require_columns(df, "encode categoricals", &names)?;

    let mut data = df.clone();
    let mut encoders = CategoricalEncoders::default();

    let pb = create_progress_bar(columns.len() as u64, "   Encoding categorical columns");
    for name in columns {
        let (encoder, codes) = encode(data.column(name)?)?;
        data.with_column(codes)?;
        encoders.encoders.push(encoder);
        pb.inc(1);
    }
    pb.finish_and_clear();

    Ok((data, encoders))
}

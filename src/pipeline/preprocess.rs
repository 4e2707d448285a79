//! Feature derivation and cleanup for the supply-chain order table
//!
//! Steps run in a fixed order because later steps read columns created by
//! earlier ones. Each step checks the columns it needs before touching the
//! frame, so a schema mismatch names the failing step.

use anyhow::Result;
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use polars::prelude::*;

use super::config::{PipelineConfig, FRAUD_COLUMN, LATE_DELIVERY_COLUMN, ORDER_DATE_COLUMN};
use crate::error::PipelineError;
use crate::utils::print_warning;

/// Text used for a missing value when columns are rendered as strings
pub const ABSENT_TOKEN: &str = "nan";

/// Order status marking a suspected fraud
pub const FRAUD_STATUS: &str = "SUSPECTED_FRAUD";

/// Delivery status marking a late delivery
pub const LATE_DELIVERY_STATUS: &str = "Late delivery";

pub const FIRST_NAME_COLUMN: &str = "Customer Fname";
pub const LAST_NAME_COLUMN: &str = "Customer Lname";
pub const FULL_NAME_COLUMN: &str = "Customer Full Name";
pub const ZIPCODE_COLUMN: &str = "Customer Zipcode";
pub const QUANTITY_COLUMN: &str = "Order Item Quantity";
pub const ITEM_TOTAL_COLUMN: &str = "Order Item Total";
pub const TOTAL_PRICE_COLUMN: &str = "TotalPrice";
pub const ORDER_STATUS_COLUMN: &str = "Order Status";
pub const DELIVERY_STATUS_COLUMN: &str = "Delivery Status";

pub const YEAR_COLUMN: &str = "order_year";
pub const MONTH_COLUMN: &str = "order_month";
pub const WEEKDAY_COLUMN: &str = "order_week_day";
pub const HOUR_COLUMN: &str = "order_hour";

const DATETIME_FORMATS: [&str; 6] = [
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const DATE_FORMATS: [&str; 2] = ["%m/%d/%Y", "%Y-%m-%d"];

/// Run every derivation and cleanup step except categorical encoding.
///
/// The input frame is left untouched; the processed copy keeps the source
/// column order with derived columns appended.
pub fn preprocess(df: &DataFrame, config: &PipelineConfig) -> Result<DataFrame> {
    let mut data = df.clone();

    add_full_name(&mut data)?;
    data = drop_columns(&data, "drop irrelevant columns", &config.drop_columns)?;
    let unreadable = fill_missing_zipcode(&mut data)?;
    if unreadable > 0 {
        print_warning(&format!(
            "{} non-numeric '{}' value(s) were replaced with 0",
            unreadable, ZIPCODE_COLUMN
        ));
    }
    add_order_date_parts(&mut data)?;
    add_total_price(&mut data)?;
    add_labels(&mut data)?;
    data = drop_columns(&data, "drop redundant columns", &config.redundant_columns)?;

    Ok(data)
}

/// Source columns read by preprocessing or encoding that `header` lacks,
/// in first-use order. Derived columns are not expected in the input.
pub fn missing_source_columns(header: &[String], config: &PipelineConfig) -> Vec<String> {
    let fixed = [
        FIRST_NAME_COLUMN,
        LAST_NAME_COLUMN,
        ZIPCODE_COLUMN,
        ORDER_DATE_COLUMN,
        QUANTITY_COLUMN,
        ITEM_TOTAL_COLUMN,
        ORDER_STATUS_COLUMN,
        DELIVERY_STATUS_COLUMN,
    ];
    let derived = [FULL_NAME_COLUMN, WEEKDAY_COLUMN];

    let expected = fixed
        .iter()
        .map(|s| s.to_string())
        .chain(config.drop_columns.iter().cloned())
        .chain(config.redundant_columns.iter().cloned())
        .chain(config.categorical_columns.iter().cloned())
        .filter(|name| !derived.contains(&name.as_str()));

    let mut missing: Vec<String> = Vec::new();
    for name in expected {
        if !header.contains(&name) && !missing.contains(&name) {
            missing.push(name);
        }
    }
    missing
}

/// Fail with `MissingColumn` naming the first absent column
pub fn require_columns(df: &DataFrame, step: &'static str, columns: &[&str]) -> Result<()> {
    for column in columns {
        if df.column(column).is_err() {
            anyhow::bail!(PipelineError::MissingColumn {
                step,
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

/// Render a column as strings, with nulls as the absence token
pub fn column_as_text(column: &Column) -> Result<Vec<String>> {
    let text = column.cast(&DataType::String)?;
    Ok(text
        .str()?
        .into_iter()
        .map(|v| v.unwrap_or(ABSENT_TOKEN).to_string())
        .collect())
}

/// Step 1: concatenate first and last name
pub fn add_full_name(df: &mut DataFrame) -> Result<()> {
    require_columns(df, "full name", &[FIRST_NAME_COLUMN, LAST_NAME_COLUMN])?;

    let first = column_as_text(df.column(FIRST_NAME_COLUMN)?)?;
    let last = column_as_text(df.column(LAST_NAME_COLUMN)?)?;
    let full: Vec<String> = first
        .into_iter()
        .zip(last)
        .map(|(f, l)| f + &l)
        .collect();

    df.with_column(Column::new(FULL_NAME_COLUMN.into(), full))?;
    Ok(())
}

/// Steps 2 and 8: drop a fixed column set, failing on any absent name
pub fn drop_columns(df: &DataFrame, step: &'static str, columns: &[String]) -> Result<DataFrame> {
    let names: Vec<&str> = columns.iter().map(|s| s.as_str()).collect();
    require_columns(df, step, &names)?;
    Ok(df.drop_many(names))
}

/// Step 3: missing postal codes become 0.
///
/// Values that are present but not numeric also become 0; their count is
/// returned so the caller can report it.
pub fn fill_missing_zipcode(df: &mut DataFrame) -> Result<usize> {
    require_columns(df, "fill zipcode", &[ZIPCODE_COLUMN])?;

    let source = df.column(ZIPCODE_COLUMN)?;
    let zip = source.cast(&DataType::Float64)?;
    let unreadable = zip.null_count().saturating_sub(source.null_count());
    let filled: Vec<f64> = zip.f64()?.into_iter().map(|v| v.unwrap_or(0.0)).collect();

    df.with_column(Column::new(ZIPCODE_COLUMN.into(), filled))?;
    Ok(unreadable)
}

/// Parse an order timestamp in any of the accepted layouts
pub fn parse_order_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS.iter().find_map(|fmt| {
                NaiveDate::parse_from_str(raw, fmt)
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
        })
}

/// Step 4: year, month, weekday (Monday = 0) and hour of the order
pub fn add_order_date_parts(df: &mut DataFrame) -> Result<()> {
    require_columns(df, "order date parts", &[ORDER_DATE_COLUMN])?;

    let dates = df.column(ORDER_DATE_COLUMN)?.cast(&DataType::String)?;
    let dates = dates.str()?;

    let n = df.height();
    let mut years = Vec::with_capacity(n);
    let mut months = Vec::with_capacity(n);
    let mut weekdays = Vec::with_capacity(n);
    let mut hours = Vec::with_capacity(n);

    for (row, value) in dates.into_iter().enumerate() {
        let ts = value.and_then(parse_order_timestamp).ok_or_else(|| {
            PipelineError::InvalidTimestamp {
                row,
                value: value.unwrap_or(ABSENT_TOKEN).to_string(),
            }
        })?;

        years.push(ts.year());
        months.push(ts.month() as i32);
        weekdays.push(ts.weekday().num_days_from_monday() as i32);
        hours.push(ts.hour() as i32);
    }

    df.with_column(Column::new(YEAR_COLUMN.into(), years))?;
    df.with_column(Column::new(MONTH_COLUMN.into(), months))?;
    df.with_column(Column::new(WEEKDAY_COLUMN.into(), weekdays))?;
    df.with_column(Column::new(HOUR_COLUMN.into(), hours))?;
    Ok(())
}

/// Step 5: quantity times item total
pub fn add_total_price(df: &mut DataFrame) -> Result<()> {
    require_columns(df, "total price", &[QUANTITY_COLUMN, ITEM_TOTAL_COLUMN])?;

    let quantity = df.column(QUANTITY_COLUMN)?.cast(&DataType::Float64)?;
    let item_total = df.column(ITEM_TOTAL_COLUMN)?.cast(&DataType::Float64)?;

    let total: Vec<Option<f64>> = quantity
        .f64()?
        .into_iter()
        .zip(item_total.f64()?.into_iter())
        .map(|(q, t)| Some(q? * t?))
        .collect();

    df.with_column(Column::new(TOTAL_PRICE_COLUMN.into(), total))?;
    Ok(())
}

fn flag_equal(column: &Column, literal: &str) -> Result<Vec<i32>> {
    let text = column.cast(&DataType::String)?;
    Ok(text
        .str()?
        .into_iter()
        .map(|v| i32::from(v == Some(literal)))
        .collect())
}

/// Steps 6 and 7: binary fraud and late-delivery labels
pub fn add_labels(df: &mut DataFrame) -> Result<()> {
    require_columns(df, "labels", &[ORDER_STATUS_COLUMN, DELIVERY_STATUS_COLUMN])?;

    let fraud = flag_equal(df.column(ORDER_STATUS_COLUMN)?, FRAUD_STATUS)?;
    let late = flag_equal(df.column(DELIVERY_STATUS_COLUMN)?, LATE_DELIVERY_STATUS)?;

    df.with_column(Column::new(FRAUD_COLUMN.into(), fraud))?;
    df.with_column(Column::new(LATE_DELIVERY_COLUMN.into(), late))?;
    Ok(())
}

//! Shared test utilities and fixture generators

use polars::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

/// Rows in the standard order fixture
pub const FIXTURE_ROWS: usize = 100;

/// Rows `i` with `i % 10 == 3` are suspected fraud (10 of 100)
pub fn is_fraud_row(i: usize) -> bool {
    i % 10 == 3
}

/// Rows `i` with `i % 7 == 0` are late deliveries (15 of 100)
pub fn is_late_row(i: usize) -> bool {
    i % 7 == 0
}

fn cycle(options: &[&str], n: usize) -> Vec<String> {
    (0..n).map(|i| options[i % options.len()].to_string()).collect()
}

fn order_timestamp(i: usize) -> String {
    format!(
        "{}/{}/{} {}:{:02}",
        i % 12 + 1,
        i % 28 + 1,
        2015 + i % 4,
        i % 24,
        (i * 7) % 60
    )
}

/// Create a DataCo-shaped order table with `n` rows.
///
/// This DataFrame includes every column the preprocessing steps read or drop,
/// plus a handful of numeric passthrough columns:
/// - `Order Status`: `SUSPECTED_FRAUD` on fraud rows, other statuses elsewhere
/// - `Delivery Status`: `Late delivery` on late rows
/// - `Customer Zipcode`: missing on every 9th row
/// - `Product Description`: entirely empty
pub fn create_orders_dataframe(n: usize) -> DataFrame {
    let order_status: Vec<String> = (0..n)
        .map(|i| {
            if is_fraud_row(i) {
                "SUSPECTED_FRAUD".to_string()
            } else {
                ["COMPLETE", "PENDING", "CLOSED", "PROCESSING"][i % 4].to_string()
            }
        })
        .collect();
    let delivery_status: Vec<String> = (0..n)
        .map(|i| {
            if is_late_row(i) {
                "Late delivery".to_string()
            } else {
                ["Advance shipping", "Shipping on time", "Shipping canceled"][i % 3].to_string()
            }
        })
        .collect();
    let late_risk: Vec<i32> = (0..n).map(|i| i32::from(is_late_row(i))).collect();
    let zipcode: Vec<Option<f64>> = (0..n)
        .map(|i| (i % 9 != 4).then_some(725.0 + (i % 13) as f64))
        .collect();
    let order_zipcode: Vec<Option<f64>> = (0..n)
        .map(|i| (i % 3 == 0).then_some(10000.0 + i as f64))
        .collect();
    let quantity: Vec<i64> = (0..n).map(|i| (i % 5) as i64).collect();
    let item_total: Vec<f64> = (0..n).map(|i| (i as f64 * 3.5) - 40.0).collect();

    let columns = vec![
        Column::new("Type".into(), cycle(&["DEBIT", "TRANSFER", "CASH", "PAYMENT"], n)),
        Column::new(
            "Days for shipping (real)".into(),
            (0..n).map(|i| (i % 7) as i64).collect::<Vec<_>>(),
        ),
        Column::new(
            "Days for shipment (scheduled)".into(),
            (0..n).map(|i| (i % 4) as i64).collect::<Vec<_>>(),
        ),
        Column::new(
            "Benefit per order".into(),
            (0..n).map(|i| (i as f64 * 1.7) % 90.0 - 20.0).collect::<Vec<_>>(),
        ),
        Column::new("Delivery Status".into(), delivery_status),
        Column::new("Late_delivery_risk".into(), late_risk),
        Column::new("Category Name".into(), cycle(&["Cleats", "Fishing", "Cardio Equipment"], n)),
        Column::new("Customer City".into(), cycle(&["Caguas", "San Jose", "Los Angeles", "Tonawanda"], n)),
        Column::new("Customer Country".into(), cycle(&["Puerto Rico", "EE. UU."], n)),
        Column::new("Customer Email".into(), cycle(&["XXXXXXXXX"], n)),
        Column::new("Customer Fname".into(), cycle(&["Mary", "Ann", "Robert", "Cally", "Irene"], n)),
        Column::new(
            "Customer Id".into(),
            (0..n).map(|i| (i % 37 + 1) as i64).collect::<Vec<_>>(),
        ),
        Column::new("Customer Lname".into(), cycle(&["Smith", "Jones", "Maxwell"], n)),
        Column::new("Customer Password".into(), cycle(&["XXXXXXXXX"], n)),
        Column::new("Customer Segment".into(), cycle(&["Consumer", "Home Office", "Corporate"], n)),
        Column::new("Customer State".into(), cycle(&["PR", "CA", "NY"], n)),
        Column::new("Customer Street".into(), cycle(&["5365 Noble Nectar Island", "2679 Rustic Loop"], n)),
        Column::new("Customer Zipcode".into(), zipcode),
        Column::new("Department Name".into(), cycle(&["Fitness", "Apparel", "Golf", "Footwear"], n)),
        Column::new(
            "Latitude".into(),
            (0..n).map(|i| 18.0 + (i % 10) as f64 * 0.1).collect::<Vec<_>>(),
        ),
        Column::new(
            "Longitude".into(),
            (0..n).map(|i| -66.0 - (i % 10) as f64 * 0.1).collect::<Vec<_>>(),
        ),
        Column::new("Market".into(), cycle(&["LATAM", "Europe", "Pacific Asia", "USCA", "Africa"], n)),
        Column::new("Order City".into(), cycle(&["Bikaner", "Townsville", "Toowoomba", "Guangzhou"], n)),
        Column::new("Order Country".into(), cycle(&["India", "Australia", "China"], n)),
        Column::new(
            "order date (DateOrders)".into(),
            (0..n).map(order_timestamp).collect::<Vec<_>>(),
        ),
        Column::new(
            "Order Id".into(),
            (0..n).map(|i| 77000 + i as i64).collect::<Vec<_>>(),
        ),
        Column::new("Order Item Quantity".into(), quantity),
        Column::new("Order Item Total".into(), item_total),
        Column::new("Order Region".into(), cycle(&["Southeast Asia", "South Asia", "Oceania"], n)),
        Column::new("Order State".into(), cycle(&["Rajastán", "Queensland", "Guangdong"], n)),
        Column::new("Order Status".into(), order_status),
        Column::new("Order Zipcode".into(), order_zipcode),
        Column::new("Product Description".into(), vec![None::<&str>; n]),
        Column::new("Product Image".into(), cycle(&["http://images.example/one.jpg"], n)),
        Column::new("Product Name".into(), cycle(&["Smart watch", "Perfect Fitness Rip Deck", "Nike Dri-FIT"], n)),
        Column::new(
            "Product Price".into(),
            (0..n).map(|i| 20.0 + (i % 6) as f64 * 15.0).collect::<Vec<_>>(),
        ),
        Column::new("Product Status".into(), vec![0i64; n]),
        Column::new(
            "shipping date (DateOrders)".into(),
            (0..n).map(|i| order_timestamp(i + 3)).collect::<Vec<_>>(),
        ),
        Column::new("Shipping Mode".into(), cycle(&["Standard Class", "First Class", "Second Class", "Same Day"], n)),
    ];

    DataFrame::new(columns).unwrap()
}

/// The 100-row order fixture
pub fn create_orders_fixture() -> DataFrame {
    create_orders_dataframe(FIXTURE_ROWS)
}

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("test_data.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Integer values of a column (nulls fail the test)
pub fn column_i64(df: &DataFrame, name: &str) -> Vec<i64> {
    df.column(name)
        .unwrap()
        .cast(&DataType::Int64)
        .unwrap()
        .i64()
        .unwrap()
        .into_no_null_iter()
        .collect()
}

/// Float values of a column (nulls fail the test)
pub fn column_f64(df: &DataFrame, name: &str) -> Vec<f64> {
    df.column(name)
        .unwrap()
        .cast(&DataType::Float64)
        .unwrap()
        .f64()
        .unwrap()
        .into_no_null_iter()
        .collect()
}

/// Assert that a DataFrame contains specific columns
pub fn assert_has_columns(df: &DataFrame, expected_cols: &[&str]) {
    let actual_cols: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for col in expected_cols {
        assert!(
            actual_cols.contains(&col.to_string()),
            "Missing expected column: '{}'. Actual columns: {:?}",
            col,
            actual_cols
        );
    }
}

/// Assert that a DataFrame does NOT contain specific columns
pub fn assert_missing_columns(df: &DataFrame, unexpected_cols: &[&str]) {
    let actual_cols: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for col in unexpected_cols {
        assert!(
            !actual_cols.contains(&col.to_string()),
            "Unexpected column still present: '{}'",
            col
        );
    }
}

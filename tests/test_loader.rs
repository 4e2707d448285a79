//! Tests for CSV loading

use std::io::Write;

use supplyrisk::pipeline::*;
use tempfile::TempDir;

#[path = "common/mod.rs"]
mod common;

use common::*;

#[test]
fn test_load_reports_shape() {
    let mut df = create_orders_fixture();
    let (_temp_dir, csv_path) = create_temp_csv(&mut df);

    let (loaded, rows, cols, memory_mb) = load_dataset_with_progress(&csv_path, 0).unwrap();

    assert_eq!(rows, FIXTURE_ROWS);
    assert_eq!(cols, df.width());
    assert_eq!(loaded.shape(), (rows, cols));
    assert!(memory_mb > 0.0);
}

#[test]
fn test_load_keeps_missing_values() {
    let mut df = create_orders_fixture();
    let (_temp_dir, csv_path) = create_temp_csv(&mut df);

    let (loaded, _, _, _) = load_dataset_with_progress(&csv_path, 0).unwrap();
    let zip_nulls = loaded.column("Customer Zipcode").unwrap().null_count();

    // Every 9th row starting at 4
    assert_eq!(zip_nulls, (0..FIXTURE_ROWS).filter(|i| i % 9 == 4).count());
}

#[test]
fn test_load_replaces_invalid_utf8() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("latin1.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(b"Order City,Sales\nBogot\xe1,10.5\nLima,3.0\n").unwrap();
    drop(file);

    let (text, had_errors) = read_lossy(&path).unwrap();
    assert!(had_errors);
    assert!(text.contains("Bogot\u{FFFD}"));

    let (loaded, rows, _, _) = load_dataset_with_progress(&path, 0).unwrap();
    assert_eq!(rows, 2);
    assert_eq!(
        loaded.column("Order City").unwrap().str().unwrap().get(0),
        Some("Bogot\u{FFFD}")
    );
}

#[test]
fn test_load_strips_byte_order_mark() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("bom.csv");
    std::fs::write(&path, b"\xef\xbb\xbfType,Sales\nDEBIT,1.0\n").unwrap();

    let (loaded, _, _, _) = load_dataset_with_progress(&path, 0).unwrap();
    assert_has_columns(&loaded, &["Type", "Sales"]);
}

#[test]
fn test_missing_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("does_not_exist.csv");

    let err = load_dataset_with_progress(&path, 0).unwrap_err();
    assert!(format!("{:#}", err).contains("does_not_exist.csv"));
}

#[test]
fn test_column_names_from_header() {
    let mut df = create_orders_fixture();
    let (_temp_dir, csv_path) = create_temp_csv(&mut df);

    let names = get_column_names(&csv_path).unwrap();
    assert_eq!(names.len(), df.width());
    assert_eq!(names[0], "Type");
    assert!(names.contains(&"order date (DateOrders)".to_string()));
}

//! Tests for CLI argument parsing and the binary itself

use assert_cmd::Command;
use clap::Parser;
use predicates::prelude::*;
use std::path::PathBuf;
use supplyrisk::cli::Cli;
use supplyrisk::models::ModelKind;
use supplyrisk::pipeline::EncoderFit;

#[path = "common/mod.rs"]
mod common;

use common::*;

#[test]
fn test_cli_default_values() {
    let cli = Cli::parse_from(["supplyrisk"]);

    assert_eq!(cli.input, PathBuf::from("data/DataCoSupplyChainDataset.csv"));
    assert_eq!(cli.output, PathBuf::from("model_results.txt"));
    assert_eq!(cli.json, None);
    assert_eq!(cli.seed, 42, "Default seed should be 42");
    assert_eq!(cli.test_size, 0.2, "Default test size should be 0.2");
    assert_eq!(cli.encoder_fit, EncoderFit::FullColumn);
    assert!(cli.models.is_empty());
    assert_eq!(
        cli.infer_schema_length, 0,
        "Default schema inference should scan the whole file"
    );
}

#[test]
fn test_empty_model_list_runs_full_roster() {
    let config = Cli::parse_from(["supplyrisk"]).to_config();
    assert_eq!(config.models, ModelKind::ROSTER.to_vec());
}

#[test]
fn test_model_list_and_aliases() {
    let cli = Cli::parse_from(["supplyrisk", "--models", "xgb,knn,decision-tree,lda"]);

    assert_eq!(
        cli.to_config().models,
        vec![
            ModelKind::GradientBoosting,
            ModelKind::KNeighbors,
            ModelKind::DecisionTree,
            ModelKind::LinearDiscriminant,
        ]
    );
}

#[test]
fn test_custom_flags_reach_config() {
    let cli = Cli::parse_from([
        "supplyrisk",
        "-i",
        "orders.csv",
        "-o",
        "out.tsv",
        "--json",
        "run.json",
        "--seed",
        "7",
        "--test-size",
        "0.25",
        "--encoder-fit",
        "train-only",
    ]);
    let config = cli.to_config();

    assert_eq!(config.input, PathBuf::from("orders.csv"));
    assert_eq!(config.output, PathBuf::from("out.tsv"));
    assert_eq!(config.json_output, Some(PathBuf::from("run.json")));
    assert_eq!(config.seed, 7);
    assert_eq!(config.test_size, 0.25);
    assert_eq!(config.encoder_fit, EncoderFit::TrainOnly);
    assert_eq!(config.categorical_columns.len(), 16);
}

#[test]
fn test_invalid_arguments_are_rejected() {
    assert!(Cli::try_parse_from(["supplyrisk", "--test-size", "1.5"]).is_err());
    assert!(Cli::try_parse_from(["supplyrisk", "--test-size", "0"]).is_err());
    assert!(Cli::try_parse_from(["supplyrisk", "--models", "perceptron"]).is_err());
    assert!(Cli::try_parse_from(["supplyrisk", "--encoder-fit", "sometimes"]).is_err());
}

#[test]
fn test_missing_input_file_fails() {
    Command::cargo_bin("supplyrisk")
        .unwrap()
        .args(["-i", "does/not/exist.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_binary_writes_results_and_json() {
    let mut df = create_orders_fixture();
    let (temp_dir, csv_path) = create_temp_csv(&mut df);
    let results_path = temp_dir.path().join("model_results.txt");
    let json_path = temp_dir.path().join("run.json");

    Command::cargo_bin("supplyrisk")
        .unwrap()
        .arg("-i")
        .arg(&csv_path)
        .arg("-o")
        .arg(&results_path)
        .arg("--json")
        .arg(&json_path)
        .args(["--models", "gaussian-nb,decision-tree"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Model: GaussianNB"))
        .stdout(predicate::str::contains("Confusion Matrix (late_delivery):"));

    let text = std::fs::read_to_string(&results_path).unwrap();
    let models: Vec<&str> = text
        .lines()
        .skip(1)
        .filter_map(|line| line.split('\t').next())
        .collect();
    assert_eq!(models, vec!["GaussianNB", "DecisionTreeClassifier"]);
    assert!(json_path.exists());
}

//! supplyrisk: Supply-Chain Classification CLI Tool
//!
//! Loads the DataCo order table, derives features and labels, then trains
//! and scores nine classifiers for fraud detection and late delivery.

use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use console::style;

use supplyrisk::cli::Cli;
use supplyrisk::pipeline::{
    get_column_names, load_dataset_with_progress, missing_source_columns, prepare, preprocess,
    run_experiment, RunEvent,
};
use supplyrisk::report::{export_results_json, print_evaluation, print_evaluation_start, SplitSizes};
use supplyrisk::utils::{
    create_spinner, finish_with_success, print_banner, print_completion, print_config, print_count,
    print_info, print_step_header, print_step_time, print_success, print_warning,
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.to_config();

    if !config.input.exists() {
        anyhow::bail!("Input file not found: {}", config.input.display());
    }

    // Print styled banner
    print_banner(env!("CARGO_PKG_VERSION"));

    // Print configuration card
    print_config(&config);

    // Step 1: Load dataset
    print_step_header(1, "Load Dataset");

    let step_start = Instant::now();
    let header = get_column_names(&config.input)?;
    let missing = missing_source_columns(&header, &config);
    if !missing.is_empty() {
        print_warning(&format!(
            "{} expected column(s) not in header: {}",
            missing.len(),
            missing.join(", ")
        ));
    }

    println!(); // Blank line before spinner
    let (df, rows, cols, memory_mb) = load_dataset_with_progress(&config.input, cli.infer_schema_length)?;

    println!("\n    {} Dataset Statistics:", style("✧").cyan());
    println!("      Rows: {}", rows);
    println!("      Columns: {}", cols);
    println!("      Estimated memory: {:.2} MB", memory_mb);
    print_step_time(step_start.elapsed());

    // Step 2: Preprocess
    print_step_header(2, "Preprocessing");

    let step_start = Instant::now();
    let spinner = create_spinner("Deriving features and labels...");
    let processed = match preprocess(&df, &config) {
        Ok(processed) => processed,
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e);
        }
    };
    finish_with_success(&spinner, "Preprocessing complete");
    drop(df);

    print_count(
        "column(s) after preprocessing",
        processed.width(),
        Some(&format!("({} dropped)", config.drop_columns.len() + config.redundant_columns.len())),
    );
    print_step_time(step_start.elapsed());

    // Step 3: Encode, split and standardize
    print_step_header(3, "Train/Test Preparation");

    let step_start = Instant::now();
    let prepared = prepare(&processed, &config)?;
    let sizes = SplitSizes::from(&prepared);
    print_success(&format!(
        "Encoded {} categorical column(s) ({})",
        prepared.encoders.len(),
        config.encoder_fit
    ));
    print_info(&format!(
        "{} training rows, {} test rows, {} features per target",
        sizes.train_rows, sizes.test_rows, sizes.feature_count
    ));
    for target in &prepared.targets {
        let positives = target.data.y_train.iter().filter(|&&v| v == 1).count();
        print_count(
            &format!("positive '{}' training row(s)", target.target.column()),
            positives,
            None,
        );
    }
    print_step_time(step_start.elapsed());

    // Step 4: Models
    print_step_header(4, "Model Evaluation");

    let step_start = Instant::now();
    let results = run_experiment(&prepared, &config, |event| match event {
        RunEvent::Started { model, target } => print_evaluation_start(model, target),
        RunEvent::Finished(eval) => print_evaluation(eval),
    })?;
    print_success(&format!("Results saved to {}", config.output.display()));

    if let Some(json_path) = &config.json_output {
        export_results_json(&results, &config, sizes, json_path)?;
        print_success(&format!("Evaluations exported to {}", json_path.display()));
    }
    print_step_time(step_start.elapsed());

    // Display summary
    results.display();

    // Final completion message
    print_completion();

    Ok(())
}

//! Console blocks printed after each model/target evaluation

use console::style;

use crate::models::ModelKind;
use crate::pipeline::{ConfusionMatrix, Evaluation, Target};

/// Task wording used in the "Evaluating ..." line
fn task_description(target: Target) -> &'static str {
    match target {
        Target::Fraud => "fraud detection",
        Target::LateDelivery => "late delivery prediction",
    }
}

/// Right-aligned two-row matrix, `[[tn fp]` over ` [fn tp]]`
pub fn format_confusion_matrix(cm: &ConfusionMatrix) -> String {
    let rows = cm.as_rows();
    let width = rows
        .iter()
        .flatten()
        .map(|v| v.to_string().len())
        .max()
        .unwrap_or(1);

    format!(
        "[[{:>w$} {:>w$}]\n [{:>w$} {:>w$}]]",
        rows[0][0],
        rows[0][1],
        rows[1][0],
        rows[1][1],
        w = width
    )
}

/// Plain-text report block for one evaluation
pub fn format_evaluation(eval: &Evaluation) -> String {
    let target = eval.target.report_name();
    format!(
        "Model: {}\n\
         Accuracy ({target}): {:.2}%\n\
         Recall ({target}): {:.2}%\n\
         F1 Score ({target}): {:.2}%\n\
         Confusion Matrix ({target}):\n{}\n",
        eval.model_name,
        eval.accuracy * 100.0,
        eval.recall * 100.0,
        eval.f1 * 100.0,
        format_confusion_matrix(&eval.confusion),
    )
}

pub fn print_evaluation_start(kind: ModelKind, target: Target) {
    println!(
        "\n    {} Evaluating {} for {}...",
        style("◆").cyan(),
        style(kind.display_name()).bold(),
        task_description(target)
    );
}

pub fn print_evaluation(eval: &Evaluation) {
    for line in format_evaluation(eval).lines() {
        println!("      {}", line);
    }
    println!(
        "      {}",
        style(format!(
            "fit {:.2}s, predict {:.2}s",
            eval.fit_seconds, eval.predict_seconds
        ))
        .dim()
    );
}

//! Per-model results table: TSV output and console summary

use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Color, Table};
use console::style;
use polars::prelude::*;
use serde::Serialize;

use crate::models::ModelKind;
use crate::pipeline::{Evaluation, Target};

/// Header of the first results column
pub const MODEL_HEADER: &str = "Model";

/// One classifier's scores on both targets
#[derive(Debug, Clone, Serialize)]
pub struct ResultRow {
    pub model: ModelKind,
    pub fraud: Evaluation,
    pub late_delivery: Evaluation,
}

impl ResultRow {
    pub fn evaluation(&self, target: Target) -> &Evaluation {
        match target {
            Target::Fraud => &self.fraud,
            Target::LateDelivery => &self.late_delivery,
        }
    }
}

/// Results of a run, one row per classifier in roster order
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResultsTable {
    pub rows: Vec<ResultRow>,
}

impl ResultsTable {
    pub fn push(&mut self, row: ResultRow) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column headers in output order
    pub fn headers() -> Vec<String> {
        let mut headers = vec![MODEL_HEADER.to_string()];
        for target in Target::ALL {
            for metric in ["Accuracy", "Recall", "F1"] {
                headers.push(format!("{} {}", target.heading(), metric));
            }
        }
        headers
    }

    /// Model names plus six metric columns
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let headers = Self::headers();
        let names: Vec<&str> = self.rows.iter().map(|r| r.model.display_name()).collect();

        let mut columns = vec![Column::new(headers[0].as_str().into(), names)];
        let mut header = headers.iter().skip(1);
        for target in Target::ALL {
            let metrics: [fn(&Evaluation) -> f64; 3] = [|e| e.accuracy, |e| e.recall, |e| e.f1];
            for metric in metrics {
                let values: Vec<f64> = self
                    .rows
                    .iter()
                    .map(|r| metric(r.evaluation(target)))
                    .collect();
                let name = header.next().map(|h| h.as_str()).unwrap_or_default();
                columns.push(Column::new(name.into(), values));
            }
        }

        DataFrame::new(columns).context("Failed to assemble results table")
    }

    /// Write the table as tab-separated text with a header row
    pub fn write_tsv(&self, path: &Path) -> Result<()> {
        let mut df = self.to_dataframe()?;
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create results file: {}", path.display()))?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(b'\t')
            .finish(&mut df)
            .with_context(|| format!("Failed to write results file: {}", path.display()))?;
        Ok(())
    }

    /// Styled summary of every model's scores
    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("MODEL RESULTS").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(
            Self::headers()
                .into_iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
                .collect::<Vec<_>>(),
        );

        let best_f1 = |target: Target| {
            self.rows
                .iter()
                .map(|r| r.evaluation(target).f1)
                .fold(f64::NEG_INFINITY, f64::max)
        };
        let best = [best_f1(Target::Fraud), best_f1(Target::LateDelivery)];

        for row in &self.rows {
            let mut cells = vec![Cell::new(row.model.display_name())];
            for (t, target) in Target::ALL.into_iter().enumerate() {
                let eval = row.evaluation(target);
                cells.push(percent_cell(eval.accuracy));
                cells.push(percent_cell(eval.recall));

                let f1 = percent_cell(eval.f1);
                cells.push(if eval.f1 == best[t] {
                    f1.fg(Color::Green).add_attribute(Attribute::Bold)
                } else {
                    f1
                });
            }
            table.add_row(cells);
        }

        // Indent the table
        for line in table.to_string().lines() {
            println!("    {}", line);
        }
    }
}

fn percent_cell(value: f64) -> Cell {
    Cell::new(format!("{:.2}%", value * 100.0)).set_alignment(CellAlignment::Right)
}

//! Run configuration shared by every pipeline stage

use std::path::PathBuf;

use serde::Serialize;

use crate::models::ModelKind;

/// Source column holding the order timestamp
pub const ORDER_DATE_COLUMN: &str = "order date (DateOrders)";

/// Derived fraud label column
pub const FRAUD_COLUMN: &str = "fraud";

/// Derived late-delivery label column
pub const LATE_DELIVERY_COLUMN: &str = "late_delivery";

/// Columns removed right after the full name is built
pub const DEFAULT_DROP_COLUMNS: [&str; 12] = [
    "Customer Email",
    "Product Status",
    "Customer Password",
    "Customer Street",
    "Customer Fname",
    "Customer Lname",
    "Latitude",
    "Longitude",
    "Product Description",
    "Product Image",
    "Order Zipcode",
    "shipping date (DateOrders)",
];

/// Source columns made redundant by the derived labels and date parts
pub const DEFAULT_REDUNDANT_COLUMNS: [&str; 4] = [
    "Delivery Status",
    "Late_delivery_risk",
    "Order Status",
    ORDER_DATE_COLUMN,
];

/// Columns replaced by integer codes
pub const DEFAULT_CATEGORICAL_COLUMNS: [&str; 16] = [
    "Customer Country",
    "Market",
    "Type",
    "Product Name",
    "Customer Segment",
    "Customer State",
    "Order Region",
    "Order City",
    "Category Name",
    "Customer City",
    "Department Name",
    "Order State",
    "Shipping Mode",
    "order_week_day",
    "Order Country",
    "Customer Full Name",
];

/// Where the categorical encoders learn their vocabulary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum EncoderFit {
    /// Fit on the whole column before splitting. Test rows leak into the
    /// vocabulary.
    #[default]
    FullColumn,
    /// Fit on the training partition only; unseen test values get a
    /// reserved code.
    TrainOnly,
}

impl std::fmt::Display for EncoderFit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncoderFit::FullColumn => write!(f, "full-column"),
            EncoderFit::TrainOnly => write!(f, "train-only"),
        }
    }
}

/// A prediction target and the labels it is reported under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Target {
    Fraud,
    LateDelivery,
}

impl Target {
    pub const ALL: [Target; 2] = [Target::Fraud, Target::LateDelivery];

    /// Label column in the processed table
    pub fn column(&self) -> &'static str {
        match self {
            Target::Fraud => FRAUD_COLUMN,
            Target::LateDelivery => LATE_DELIVERY_COLUMN,
        }
    }

    /// Short name used in the per-model report blocks
    pub fn report_name(&self) -> &'static str {
        self.column()
    }

    /// Prefix of the result table headers
    pub fn heading(&self) -> &'static str {
        match self {
            Target::Fraud => "Fraud Detection",
            Target::LateDelivery => "Late Delivery",
        }
    }
}

/// Every tunable of a run. `Default` holds the standard run constants.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub json_output: Option<PathBuf>,
    pub test_size: f64,
    pub seed: u64,
    pub drop_columns: Vec<String>,
    pub redundant_columns: Vec<String>,
    pub categorical_columns: Vec<String>,
    pub encoder_fit: EncoderFit,
    pub models: Vec<ModelKind>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("data/DataCoSupplyChainDataset.csv"),
            output: PathBuf::from("model_results.txt"),
            json_output: None,
            test_size: 0.2,
            seed: 42,
            drop_columns: to_owned(&DEFAULT_DROP_COLUMNS),
            redundant_columns: to_owned(&DEFAULT_REDUNDANT_COLUMNS),
            categorical_columns: to_owned(&DEFAULT_CATEGORICAL_COLUMNS),
            encoder_fit: EncoderFit::default(),
            models: ModelKind::ROSTER.to_vec(),
        }
    }
}

fn to_owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

//! supplyrisk: supply-chain fraud and late-delivery classification
//!
//! A library for preparing the DataCo order table (derived features,
//! categorical codes, a seeded train/test split, standardization) and
//! comparing a roster of binary classifiers on two targets.

pub mod cli;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod utils;

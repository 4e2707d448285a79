//! Report module - console blocks, results table and JSON export

pub mod evaluation;
pub mod export;
pub mod results;

pub use evaluation::*;
pub use export::*;
pub use results::*;

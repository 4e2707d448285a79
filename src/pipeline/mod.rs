//! Pipeline module - loading, preprocessing, preparation and evaluation

pub mod config;
pub mod encoder;
pub mod evaluate;
pub mod loader;
pub mod preprocess;
pub mod runner;
pub mod scaler;
pub mod split;

pub use config::*;
pub use encoder::*;
pub use evaluate::*;
pub use loader::*;
pub use preprocess::*;
pub use runner::*;
pub use scaler::*;
pub use split::*;

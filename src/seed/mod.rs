pub mod catalog;
pub mod generator;

pub use generator::{Dataset, DatasetGenerator, GenerateError, GenerationSummary};

pub mod generation;
pub mod pipeline;
pub mod splitters;

pub use pipeline::{Pipeline, PipelineOutput, PipelineReport};

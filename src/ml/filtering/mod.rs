pub mod correlation;
pub mod experiments;
pub mod filter;

pub use correlation::{CorrelationMatrix, CorrelationMethod};
pub use experiments::{build_experiment, top_n, Experiment};
pub use filter::{FeatureSelector, SelectionOutcome};

pub mod least_squares;
pub mod metrics;
pub mod trainer;

pub use least_squares::{LeastSquaresTrainer, LinearModel};
pub use metrics::RegressionMetrics;
pub use trainer::{ModelTrainer, TrainingReport};

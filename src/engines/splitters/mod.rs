pub mod base;
pub mod chronological;
pub mod types;

pub use base::DataSplitter;
pub use chronological::{train_rows, ChronologicalSplitter};
pub use types::SplitResult;

use super::types::SplitResult;
use crate::error::Result;
use crate::table::FeatureTable;

pub trait DataSplitter {
    /// Partition `data` into train and validation sets, separating `target`
    fn split(&self, data: &FeatureTable, target: &str) -> Result<SplitResult>;
}

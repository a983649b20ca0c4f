use crate::table::FeatureTable;

/// Chronological train/validation partition with the target separated out
#[derive(Debug, Clone)]
pub struct SplitResult {
    pub train_x: FeatureTable,
    pub train_y: FeatureTable,
    pub val_x: FeatureTable,
    pub val_y: FeatureTable,
}

impl SplitResult {
    pub fn train_rows(&self) -> usize {
        self.train_y.height()
    }

    pub fn val_rows(&self) -> usize {
        self.val_y.height()
    }
}

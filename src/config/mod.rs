pub mod traits;
pub mod data;
pub mod features;
pub mod symbolic;
pub mod selection;
pub mod model;
pub mod manager;

pub use manager::{AppConfig, ConfigManager};
pub use data::{DataConfig, DataSourceKind, SyntheticConfig};
pub use features::{FeaturesConfig, FitScope};
pub use symbolic::{SymbolicConfig, SymbolicParams};
pub use selection::SelectionConfig;
pub use model::{ModelConfig, SplitSection};
pub use traits::ConfigSection;

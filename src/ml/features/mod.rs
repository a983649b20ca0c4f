pub mod engineer;
pub mod profile;
pub mod scaler;

pub use engineer::{price_spreads, LinearFeatureBuilder};
pub use profile::{ColumnProfile, DataProfile};
pub use scaler::{scale, FittedScaler, Scaler, ScalerKind};

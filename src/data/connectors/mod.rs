mod csv;
mod synthetic;
mod types;
mod validator;

pub use csv::CsvConnector;
pub use synthetic::SyntheticConnector;
pub use types::RequiredColumn;
pub use validator::DataValidator;

use crate::error::Result;
use crate::types::BarSeries;

/// Anything that can produce a time-ordered bar series
pub trait BarSource {
    fn load(&self) -> Result<BarSeries>;

    /// Short label used in logs
    fn describe(&self) -> String;
}

impl<T: BarSource + ?Sized> BarSource for Box<T> {
    fn load(&self) -> Result<BarSeries> {
        (**self).load()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

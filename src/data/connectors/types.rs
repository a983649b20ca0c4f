/// Columns a bar file must provide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequiredColumn {
    Timestamp,
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl RequiredColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timestamp => "timestamp",
            Self::Open => "open",
            Self::High => "high",
            Self::Low => "low",
            Self::Close => "close",
            Self::Volume => "volume",
        }
    }

    pub fn all() -> Vec<Self> {
        vec![
            Self::Timestamp,
            Self::Open,
            Self::High,
            Self::Low,
            Self::Close,
            Self::Volume,
        ]
    }

    /// Common alternative column names
    pub fn aliases(&self) -> Vec<&'static str> {
        match self {
            Self::Timestamp => vec![
                "timestamp", "Timestamp", "TIMESTAMP", "time", "Time", "date", "Date", "datetime",
                "DateTime", "open_time",
            ],
            Self::Open => vec!["open", "Open", "OPEN", "o"],
            Self::High => vec!["high", "High", "HIGH", "h"],
            Self::Low => vec!["low", "Low", "LOW", "l"],
            Self::Close => vec!["close", "Close", "CLOSE", "c"],
            Self::Volume => vec!["volume", "Volume", "VOLUME", "vol", "Vol", "v"],
        }
    }
}

use derive_more::{AsRef, Display};

/// Trading pair identifier as sent upstream, e.g. `BTCUSDT`.
///
/// Only trimmed and upper-cased; whether the pair exists is for the
/// exchange to decide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, AsRef)]
#[as_ref(str)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Symbol {
    fn from(raw: &str) -> Self {
        Symbol::new(raw)
    }
}

impl From<String> for Symbol {
    fn from(raw: String) -> Self {
        Symbol::new(raw)
    }
}

impl Default for Symbol {
    fn default() -> Self {
        Symbol("BTCUSDT".to_string())
    }
}

use thiserror::Error;

/// Why a kline fetch did not produce a table.
///
/// An empty or non-array payload is not an error; it comes back as an empty
/// [`CandleTable`](crate::CandleTable).
#[derive(Debug, Error)]
pub enum FetchError {
    /// Upstream answered with a non-2xx status.
    #[error("{status} {reason} for url {url}")]
    Http {
        status: u16,
        reason: String,
        url: String,
        body: String,
    },

    /// DNS, connect, timeout or reset before a full response arrived.
    #[error("{0}")]
    Network(#[source] reqwest::Error),

    /// Body was not JSON.
    #[error("response body is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    /// A row could not be laid out as a kline.
    #[error("row {index}: {reason}")]
    MalformedRow { index: usize, reason: String },
}

/// Coarse classes the UI reports differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum FailureKind {
    #[strum(to_string = "Network error")]
    Transport,
    #[strum(to_string = "HTTP error")]
    Response,
    #[strum(to_string = "Unexpected error")]
    Unexpected,
}

impl FetchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::Network(_) => FailureKind::Transport,
            FetchError::Http { .. } => FailureKind::Response,
            FetchError::Decode(_) | FetchError::MalformedRow { .. } => FailureKind::Unexpected,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Network(e) if e.is_timeout())
    }

    /// Status code of an `Http` failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn malformed(index: usize, reason: impl Into<String>) -> Self {
        FetchError::MalformedRow {
            index,
            reason: reason.into(),
        }
    }
}

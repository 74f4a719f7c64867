use thiserror::Error;

/// Failure to retrieve the alert collection. No retry happens at this level;
/// the sync loop's interval is the retry cadence.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure (DNS, connect, body read).
    #[error("alert request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("alert endpoint returned {status}")]
    Status { status: reqwest::StatusCode },

    /// The body was not a JSON array of alert records.
    #[error("alert payload could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Failure to resolve a driving route between two points.
#[derive(Debug, Error)]
pub enum RouteError {
    /// Transport-level failure reaching the routing provider.
    #[error("route request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered but rejected the query.
    #[error("routing provider returned status {status}")]
    Provider { status: String },

    /// The provider answered OK but produced no route.
    #[error("no route between the given points")]
    NoRoute,
}

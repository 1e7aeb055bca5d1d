use reqwest::StatusCode;
use thiserror::Error;

/// The only failure the weather pipeline surfaces to its caller.
///
/// Geocoding failures are folded into a fallback label before they can reach
/// this type's users, so every `FetchError` the app sees comes from the
/// forecast call.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider returned HTTP {0}")]
    Status(StatusCode),

    #[error("could not decode provider response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("provider response is missing data: {0}")]
    MalformedResponse(String),
}

/// Reasons a device position could not be obtained. Never leaves the
/// location resolver.
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("location detection is disabled")]
    Disabled,

    #[error("location lookup timed out")]
    Timeout,

    #[error("location unavailable: {0}")]
    Unavailable(String),

    #[error("location service returned invalid coordinates ({0}, {1})")]
    InvalidCoordinates(String, String),
}

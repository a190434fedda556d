//! Unified error types for coverscout.
//!
//! Each variant corresponds to one failure kind of the cover resolution
//! pipeline. None of them escape `CoverPipeline::resolve_cover`; they are
//! logged and folded into a "no cover" result at that boundary.

/// Unified error types for cover resolution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The website URL could not be canonicalized.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// DNS, connection, or protocol failure during the static fetch.
    #[error("NETWORK_FAILURE: {0}")]
    Network(String),

    /// The static fetch exceeded its timeout.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),

    /// The redirect chain exceeded the configured hop limit.
    #[error("TOO_MANY_REDIRECTS: {0}")]
    TooManyRedirects(String),

    /// The server answered with a status of 400 or above.
    #[error("HTTP_STATUS: {status}")]
    HttpStatus { status: u16 },

    /// Response body exceeded the configured byte cap.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// A structured-data block could not be parsed.
    #[error("PARSE_FAILURE: {0}")]
    Parse(String),

    /// Browser launch, navigation, or in-page evaluation failed.
    #[error("RENDER_FAILED: {0}")]
    RenderFailed(String),

    /// The rendered fallback was requested but no renderer is configured.
    #[error("RENDER_DISABLED")]
    RenderDisabled,

    /// The HTTP client or browser could not be configured.
    #[error("CONFIG_ERROR: {0}")]
    Config(String),
}

impl Error {
    /// Whether this error is absorbed by the pipeline as a stage miss.
    ///
    /// Configuration errors are the only kind that indicate a programming or
    /// deployment mistake rather than an uncooperative website.
    pub fn is_stage_miss(&self) -> bool {
        !matches!(self, Error::Config(_))
    }

    /// Short machine-readable code, used as a structured log field.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidUrl(_) => "INVALID_URL",
            Error::Network(_) => "NETWORK_FAILURE",
            Error::FetchTimeout(_) => "FETCH_TIMEOUT",
            Error::TooManyRedirects(_) => "TOO_MANY_REDIRECTS",
            Error::HttpStatus { .. } => "HTTP_STATUS",
            Error::FetchTooLarge(_) => "FETCH_TOO_LARGE",
            Error::Parse(_) => "PARSE_FAILURE",
            Error::RenderFailed(_) => "RENDER_FAILED",
            Error::RenderDisabled => "RENDER_DISABLED",
            Error::Config(_) => "CONFIG_ERROR",
        }
    }
}

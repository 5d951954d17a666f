/// Error types shared by the API clients and controllers
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response (server down, CORS, offline)
    #[error("Connection failed: {0}")]
    Transport(String),

    /// Non-2xx response; `message` is the server's `error` field when present
    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("{0}")]
    Validation(String),
}

impl ApiError {
    /// Build a server error from a non-2xx status and its raw body.
    ///
    /// The body's `error` string is used verbatim; anything else falls back
    /// to a generic status message.
    pub fn from_response(status: u16, body: &str) -> ApiError {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
            .unwrap_or_else(|| format!("Server returned {}", status));

        ApiError::Server { status, message }
    }
}

pub type Result<T, E = ApiError> = std::result::Result<T, E>;

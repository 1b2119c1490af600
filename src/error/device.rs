//! Remote call errors

use thiserror::Error;

/// A single remote operation against one appliance failed.
#[derive(Error, Debug)]
pub enum DeviceError {
    /// The request never produced a response (connect, DNS, TLS, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// The appliance answered with a non-success status.
    #[error("API error: HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// The response body could not be decoded where structured data was expected.
    #[error("malformed response: {0}")]
    Parse(String),

    /// A package-management task finished in a failed state.
    #[error("package task {id} failed: {message}")]
    TaskFailed { id: String, message: String },
}

impl DeviceError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn api(status: u16, body: impl Into<String>) -> Self {
        Self::Api {
            status,
            body: body.into(),
        }
    }

    /// Whether the call completed at the HTTP level.
    pub fn has_response(&self) -> bool {
        !matches!(self, Self::Transport(_))
    }
}

impl From<reqwest::Error> for DeviceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Parse(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

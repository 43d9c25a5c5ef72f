//! Wire DTOs shared by the adapters, the dispatcher and the client.

use serde::{Deserialize, Serialize};

/// Error envelope carried by every non-2xx response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    pub const INTERNAL: &'static str = "Internal Server Error";
    pub const BAD_REQUEST: &'static str = "Bad Request";
    pub const NOT_FOUND: &'static str = "Not Found";

    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn internal() -> Self {
        Self::new(Self::INTERNAL)
    }
}

/// Wrapped procedure input: `{"input": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloInput {
    pub input: String,
}

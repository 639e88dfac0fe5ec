//! Response envelope shared by every facade operation.

use serde::{Deserialize, Serialize};

/// Message attached to every successful envelope.
pub const SUCCESS_MESSAGE: &str = "Success";

/// Uniform response wrapper: `{ data, message, success }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
    pub message: String,
    pub success: bool,
}

impl<T> Envelope<T> {
    /// Wrap a successful payload.
    pub fn ok(data: T) -> Self {
        Self {
            data,
            message: SUCCESS_MESSAGE.to_string(),
            success: true,
        }
    }

    pub fn into_data(self) -> T {
        self.data
    }
}

/// Payload returned by a successful delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deleted {
    pub id: u64,
}

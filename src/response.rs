//! Response envelope helpers.

use serde::Serialize;

/// Error envelope: `{"success": false, "error": "..."}`.
#[derive(Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

/// Success envelope for operations that return no record, e.g. delete.
#[derive(Serialize)]
pub struct SuccessMessage {
    pub success: bool,
    pub message: String,
}

pub fn error_body(error: impl Into<String>) -> ErrorBody {
    ErrorBody {
        success: false,
        error: error.into(),
    }
}

pub fn success_message(message: impl Into<String>) -> SuccessMessage {
    SuccessMessage {
        success: true,
        message: message.into(),
    }
}

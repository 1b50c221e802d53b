//! Error taxonomy for index fetching and validation.
//!
//! Every failure surfaced by the index client carries one of four stable
//! machine-readable codes. Consumers dispatch on [`ErrorCode`], never on
//! message text; messages and details are for humans and logs.

use thiserror::Error;

/// Stable wire codes for [`RulehubError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Non-success HTTP status or transport-level fetch failure.
    IndexHttpError,
    /// Index payload failed the schema contract.
    IndexSchemaInvalid,
    /// The operation was cancelled by the caller.
    IndexAborted,
    /// Unanticipated failure; original message preserved in details.
    IndexUnknown,
}

impl ErrorCode {
    /// The stable string form of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::IndexHttpError => "INDEX_HTTP_ERROR",
            ErrorCode::IndexSchemaInvalid => "INDEX_SCHEMA_INVALID",
            ErrorCode::IndexAborted => "INDEX_ABORTED",
            ErrorCode::IndexUnknown => "INDEX_UNKNOWN",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from the index fetch/validate pipeline.
#[derive(Debug, Error)]
pub enum RulehubError {
    /// Non-success HTTP response or the fetch mechanism itself failing.
    /// `status` is `None` for transport-level failures.
    #[error("{message}")]
    Http {
        /// HTTP status code, when a response was received.
        status: Option<u16>,
        /// Human-readable summary (e.g. `HTTP 404: Not Found`).
        message: String,
        /// Context for logs (e.g. the index URL).
        details: String,
    },

    /// The index payload failed the structural contract.
    #[error("{message}")]
    SchemaInvalid {
        /// Summary with bounded diagnostics (first violations only).
        message: String,
        /// Full bounded diagnostic string, including the overflow suffix.
        details: String,
    },

    /// The fetch was cancelled via the caller-supplied token.
    #[error("request was aborted")]
    Aborted,

    /// Catch-all for unanticipated failures.
    #[error("unknown error: {message}")]
    Unknown {
        /// Original error message.
        message: String,
        /// Original error rendered in full.
        details: String,
    },
}

impl RulehubError {
    /// The stable machine-readable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            RulehubError::Http { .. } => ErrorCode::IndexHttpError,
            RulehubError::SchemaInvalid { .. } => ErrorCode::IndexSchemaInvalid,
            RulehubError::Aborted => ErrorCode::IndexAborted,
            RulehubError::Unknown { .. } => ErrorCode::IndexUnknown,
        }
    }

    /// Supplementary detail string, when the variant carries one.
    pub fn details(&self) -> Option<&str> {
        match self {
            RulehubError::Http { details, .. }
            | RulehubError::SchemaInvalid { details, .. }
            | RulehubError::Unknown { details, .. } => Some(details),
            RulehubError::Aborted => Some("the fetch operation was cancelled"),
        }
    }
}

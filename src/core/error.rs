//! Error classes exposed to callers.
//!
//! Every domain error maps onto one of four classes; the HTTP layer turns a
//! class into a status code and the CLI into an exit message.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// Disallowed name/extension, missing or empty field. Nothing was changed.
    BadRequest,
    /// File or artifact absent. Expected, not a fault.
    NotFound,
    /// The orchestrator ended in `Error`, or refused because it was busy.
    CompileFailure,
    /// Unexpected I/O failure.
    Internal,
}

impl ErrorClass {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BadRequest => "bad_request",
            Self::NotFound => "not_found",
            Self::CompileFailure => "compile_failure",
            Self::Internal => "internal",
        }
    }

    pub const fn status_code(self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::NotFound => 404,
            Self::CompileFailure => 422,
            Self::Internal => 500,
        }
    }
}

/// Implemented by domain errors that cross the API boundary.
pub trait Classify {
    fn class(&self) -> ErrorClass;

    /// HTTP status for this error. Defaults to the class code; a refused
    /// compile overrides it with 409.
    fn status_code(&self) -> u16 {
        self.class().status_code()
    }

    /// Message shown to the user. Internal errors get a generic text so I/O
    /// details stay in the server log.
    fn public_message(&self) -> String
    where
        Self: std::fmt::Display,
    {
        match self.class() {
            ErrorClass::Internal => "internal error, see server log".to_string(),
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_mapping() {
        assert_eq!(ErrorClass::BadRequest.status_code(), 400);
        assert_eq!(ErrorClass::NotFound.as_str(), "not_found");
        assert_eq!(
            serde_json::to_string(&ErrorClass::CompileFailure).unwrap(),
            "\"compile_failure\""
        );
    }
}

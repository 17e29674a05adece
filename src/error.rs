//! Driver-layer error type and fatal-class recognition.
//!
//! Every fallible driver operation (open, close) reports a
//! [`DriverError`]: the driver's own error code string plus a
//! human-readable message. The code is what this crate dispatches on —
//! three codes mark the connection layer as unrecoverable and, when the
//! middleware is configured to, terminate the process.
//!
//! Nothing in a `DriverError` is ever shown to a client. Codes and
//! messages go to the log; clients get the fixed 500 body.

use thiserror::Error;

/// An error reported by the database driver.
///
/// `code` is the driver's machine-readable identifier (e.g.
/// `"ECONNREFUSED"`, `"ER_ACCESS_DENIED_ERROR"`); `message` is whatever
/// prose the driver attached.
#[derive(Clone, Debug, Error)]
#[error("{code}: {message}")]
pub struct DriverError {
    pub code: String,
    pub message: String,
}

impl DriverError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self { code: code.into(), message: message.into() }
    }

    /// Classifies this error's code, or `None` for codes with no fatal
    /// meaning (those never terminate the process).
    pub fn fatal_class(&self) -> Option<FatalClass> {
        match self.code.as_str() {
            "ECONNREFUSED"           => Some(FatalClass::ConnectionRefused),
            "ER_ACCESS_DENIED_ERROR" => Some(FatalClass::AccessDenied),
            "ER_CON_COUNT_ERROR"     => Some(FatalClass::TooManyConnections),
            _                        => None,
        }
    }
}

/// The three driver error classes that make the connection layer
/// unrecoverable: nothing this process can do will make the next open
/// succeed, so fast observable failure beats degraded operation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FatalClass {
    /// The database host refused or dropped the connection.
    ConnectionRefused,
    /// The configured credentials were rejected.
    AccessDenied,
    /// The server is out of connection slots.
    TooManyConnections,
}

impl FatalClass {
    /// Log line emitted just before the process terminates.
    pub(crate) fn log_message(self) -> &'static str {
        match self {
            Self::ConnectionRefused  => "database unreachable, shutting down",
            Self::AccessDenied       => "database rejected credentials, shutting down",
            Self::TooManyConnections => "database connection limit exhausted, shutting down",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_codes_classify() {
        let cases = [
            ("ECONNREFUSED", FatalClass::ConnectionRefused),
            ("ER_ACCESS_DENIED_ERROR", FatalClass::AccessDenied),
            ("ER_CON_COUNT_ERROR", FatalClass::TooManyConnections),
        ];
        for (code, class) in cases {
            let err = DriverError::new(code, "boom");
            assert_eq!(err.fatal_class(), Some(class));
        }
    }

    #[test]
    fn unknown_codes_are_not_fatal() {
        assert!(DriverError::new("ER_PARSE_ERROR", "boom").fatal_class().is_none());
        assert!(DriverError::new("", "").fatal_class().is_none());
    }

    #[test]
    fn display_includes_code_and_message() {
        let err = DriverError::new("ECONNREFUSED", "connect ECONNREFUSED 127.0.0.1:3306");
        assert_eq!(err.to_string(), "ECONNREFUSED: connect ECONNREFUSED 127.0.0.1:3306");
    }
}

//! Middleware configuration.
//!
//! [`Options`] is plain data with a [`Default`]: merge caller overrides
//! with struct-update syntax and every field you do not name keeps its
//! documented default. The merged value is immutable for the lifetime of
//! the middleware instance and shared across every request it handles.
//!
//! ```rust
//! use tether::{Method, Options};
//!
//! // All defaults.
//! let opts = Options::default();
//!
//! // Override one field, keep the rest.
//! let opts = Options {
//!     exit_on_failure: true,
//!     ..Default::default()
//! };
//!
//! // Narrow the intercept set.
//! let opts = Options {
//!     methods: vec![Method::Post, Method::Put],
//!     ..Default::default()
//! };
//! ```
//!
//! No validation happens here. A bad DSN surfaces when a connection is
//! actually opened, not at construction time.

use crate::method::Method;

/// The methods intercepted when none are configured.
pub const DEFAULT_METHODS: [Method; 5] = [
    Method::Get,
    Method::Post,
    Method::Put,
    Method::Patch,
    Method::Delete,
];

/// Configuration for [`DbMiddleware`](crate::DbMiddleware).
///
/// One instance per middleware installation. Constructing several
/// middleware with different `Options` never interferes: nothing here
/// touches process-global state.
#[derive(Clone, Debug)]
pub struct Options {
    /// Requests with a method in this set get a connection; all others
    /// bypass the middleware untouched.
    ///
    /// Default: `GET`, `POST`, `PUT`, `PATCH`, `DELETE`.
    pub methods: Vec<Method>,

    /// Connection string handed verbatim to the [`Driver`](crate::Driver).
    /// Opaque to this crate; the driver owns parsing it.
    ///
    /// Default: `""`.
    pub dsn: String,

    /// When `true`, an open failure whose driver code classifies as a
    /// fatal class (network refusal, credential rejection, capacity
    /// exhaustion) terminates the process after the 500 response is
    /// recorded. Unclassified codes never terminate.
    ///
    /// Default: `false`.
    pub exit_on_failure: bool,
}

impl Options {
    /// Membership test for the intercept set.
    pub(crate) fn intercepts(&self, method: Method) -> bool {
        self.methods.contains(&method)
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            methods: DEFAULT_METHODS.to_vec(),
            dsn: String::new(),
            exit_on_failure: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let opts = Options::default();
        assert_eq!(opts.methods, DEFAULT_METHODS.to_vec());
        assert_eq!(opts.dsn, "");
        assert!(!opts.exit_on_failure);
    }

    #[test]
    fn struct_update_overrides_only_named_fields() {
        let opts = Options {
            exit_on_failure: true,
            ..Default::default()
        };
        assert!(opts.exit_on_failure);
        assert_eq!(opts.methods, DEFAULT_METHODS.to_vec());
        assert_eq!(opts.dsn, "");
    }

    #[test]
    fn intercept_set_is_a_membership_test() {
        let opts = Options {
            methods: vec![Method::Post],
            ..Default::default()
        };
        assert!(opts.intercepts(Method::Post));
        assert!(!opts.intercepts(Method::Get));
    }
}

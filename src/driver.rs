//! The database client, pinned at its interface.
//!
//! tether manages the *lifecycle* of a connection, never its contents.
//! Queries, transactions, pooling and retries all live behind these two
//! traits, implemented by whatever driver crate the application pairs
//! this middleware with.
//!
//! Both traits use native async-fn-in-trait; the middleware stays
//! generic over the driver, so the concrete connection type flows
//! through to downstream handlers with no boxing.

use std::future::Future;

use crate::error::DriverError;

/// Opens database connections from a connection string.
///
/// One `Driver` serves every request the middleware handles; it must be
/// cheap to call `open` on concurrently. Errors carry the driver's own
/// code string — see [`DriverError`] for the codes with fatal meaning.
pub trait Driver: Send + Sync + 'static {
    /// The live-session handle this driver produces.
    type Conn: Connection;

    /// Opens one connection. The DSN is the configured
    /// [`Options::dsn`](crate::Options::dsn), passed through verbatim.
    fn open(&self, dsn: &str) -> impl Future<Output = Result<Self::Conn, DriverError>> + Send;
}

/// One live database session.
///
/// Exclusively owned by the request that opened it. The middleware calls
/// [`close`](Connection::close) exactly once when the response closes,
/// unless the request's keep-alive flag was set — in which case whoever
/// set the flag owns the close.
pub trait Connection: Send + 'static {
    /// Releases the session. Consumes the handle: a closed connection
    /// cannot be reused or closed twice.
    fn close(self) -> impl Future<Output = Result<(), DriverError>> + Send;
}

//! The per-request connection binder — the reason this crate exists.
//!
//! [`DbMiddleware`] decides per request whether to engage (method
//! filter), opens one connection, publishes it into the request's
//! extensions, wires cleanup to the response's close event, and hands
//! control downstream on the next scheduler turn. Three terminal
//! outcomes:
//!
//! 1. **Bypass** — method not intercepted: no connection, no slots,
//!    straight to `next`.
//! 2. **Engage, open succeeded** — slots published and close hook
//!    registered *before* `next` runs, so every downstream stage sees a
//!    fully-initialised handle and cleanup is wired before anything can
//!    close the response.
//! 3. **Engage, open failed** — client gets the fixed 500 body, the
//!    driver error goes to the log, `next` is never called. With
//!    [`Options::exit_on_failure`] set, a fatal-class code additionally
//!    terminates the process — after the 500 is recorded, never before.
//!
//! `next` is always deferred to the next turn of the scheduler, on the
//! bypass path too. Downstream stages never run synchronously inside
//! this stage's call frame, whichever branch executed.
//!
//! # Precondition
//!
//! Apply this middleware at most once per request. What two
//! applications do to one request — two connections, two close hooks —
//! is undefined and not defended against.

use std::sync::Arc;

use tracing::error;

use crate::config::Options;
use crate::context::{DbSlot, KeepOpen};
use crate::driver::{Connection, Driver};
use crate::error::DriverError;
use crate::pipeline::{BoxFuture, Middleware, Next};
use crate::request::Request;
use crate::response::Response;

// ── Public surface ────────────────────────────────────────────────────────────

/// The only error surface a client ever sees from this middleware.
/// Driver codes and messages stay in the log.
pub const CONNECT_FAILURE_BODY: &str =
    r#"{"status":500,"reason":"A problem occurred, please retry"}"#;

/// Per-request database connection lifecycle middleware.
///
/// Construct one per installation; it is stateless across requests and
/// cheap to share. See the [module docs](self) for the lifecycle.
///
/// ```rust,ignore
/// let middleware = DbMiddleware::new(MyDriver::from_env(), Options {
///     dsn: "mysql://app@db/orders".into(),
///     ..Default::default()
/// });
/// ```
pub struct DbMiddleware<D: Driver> {
    driver: Arc<D>,
    options: Options,
    shutdown: Arc<dyn Fn() + Send + Sync>,
}

impl<D: Driver> DbMiddleware<D> {
    /// Creates the middleware from a driver and merged [`Options`].
    /// Nothing is validated here; a bad DSN surfaces on first open.
    pub fn new(driver: D, options: Options) -> Self {
        Self {
            driver: Arc::new(driver),
            options,
            shutdown: Arc::new(raise_sigterm),
        }
    }

    /// Creates the middleware with all-default [`Options`].
    pub fn with_defaults(driver: D) -> Self {
        Self::new(driver, Options::default())
    }

    /// Replaces the process-termination hook invoked on fatal-class open
    /// failures. The default raises SIGTERM against the current process
    /// so a graceful-shutdown loop can drain in-flight work; embedders
    /// with their own shutdown facility wire it here.
    pub fn shutdown_with(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.shutdown = Arc::new(hook);
        self
    }

    async fn run(
        driver: Arc<D>,
        options: Options,
        shutdown: Arc<dyn Fn() + Send + Sync>,
        mut req: Request,
        res: Response,
        next: Next,
    ) {
        if !options.intercepts(req.method()) {
            tokio::task::yield_now().await;
            return next(req).await;
        }

        match driver.open(&options.dsn).await {
            Ok(conn) => {
                let slot = DbSlot::new(conn);
                let keep = KeepOpen::new();
                req.extensions_mut().insert(slot.clone());
                req.extensions_mut().insert(keep.clone());

                // Wired before control passes downstream: no stage can
                // close the response before cleanup is registered.
                res.on_close(move || release(slot, keep));

                tokio::task::yield_now().await;
                next(req).await;
            }
            Err(e) => {
                // Response first: if the error also terminates the
                // process, the 500 must already be recorded.
                res.send_json(500, CONNECT_FAILURE_BODY);
                error!(code = %e.code, message = %e.message, "failed to open database connection");

                if options.exit_on_failure {
                    if let Some(class) = e.fatal_class() {
                        error!(code = %e.code, "{}", class.log_message());
                        shutdown();
                    }
                }
                // Pipeline halts here: next is never invoked.
            }
        }
    }
}

impl<D: Driver> Middleware for DbMiddleware<D> {
    fn handle(&self, req: Request, res: Response, next: Next) -> BoxFuture {
        let driver = Arc::clone(&self.driver);
        let options = self.options.clone();
        let shutdown = Arc::clone(&self.shutdown);
        Box::pin(Self::run(driver, options, shutdown, req, res, next))
    }
}

// ── Cleanup and escalation ────────────────────────────────────────────────────

/// The close hook: honours the keep-alive flag, then closes the
/// connection on a detached task. Runs after the response has already
/// terminated, so a close failure has no one left to report to — it is
/// logged and swallowed, never rethrown.
fn release<C: Connection>(slot: DbSlot<C>, keep: KeepOpen) {
    if keep.get() {
        return;
    }
    let Ok(handle) = tokio::runtime::Handle::try_current() else {
        // No runtime means the process is tearing down; there is
        // nothing left to close against.
        return;
    };
    handle.spawn(async move {
        if let Some(conn) = slot.take().await {
            if let Err(e) = conn.close().await {
                log_close_failure(&e);
            }
        }
    });
}

fn log_close_failure(e: &DriverError) {
    error!(code = %e.code, message = %e.message, "failed to close database connection");
}

/// Default shutdown hook: the host's graceful-termination signal.
fn raise_sigterm() {
    #[cfg(unix)]
    unsafe {
        libc::raise(libc::SIGTERM);
    }
    #[cfg(not(unix))]
    std::process::exit(1);
}

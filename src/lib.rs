//! # tether
//!
//! One database connection per request. Opened before your handlers
//! run, discoverable anywhere downstream, closed when the response
//! closes. Nothing more. Nothing less.
//!
//! ## The contract
//!
//! Your driver crate owns queries, transactions, pooling and retries.
//! Your HTTP framework owns routing, serving and status semantics.
//! tether owns exactly one thing — the *lifecycle* of one connection
//! handle per qualifying request:
//!
//! - **Method filter** — only configured methods get a connection
//! - **Request-scoped publication** — handle + keep-alive flag land in
//!   the request's type-keyed extensions before any downstream code runs
//! - **Deterministic cleanup** — closed exactly once on the response's
//!   close event, unless a handler opts the connection out
//! - **Differentiated failure** — open failures answer a fixed 500 and
//!   halt the pipeline; the three unrecoverable driver classes can,
//!   opt-in, terminate the whole process
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use tether::{DbMiddleware, DbSlot, KeepOpen, Options, Request};
//!
//! let middleware = DbMiddleware::new(
//!     MyDriver::default(),
//!     Options { dsn: "mysql://app@db/orders".into(), ..Default::default() },
//! );
//!
//! // Anywhere downstream of the middleware:
//! async fn create_order(req: Request) {
//!     let Some(slot) = DbSlot::<MyConn>::of(&req) else {
//!         return; // method wasn't intercepted — no connection here
//!     };
//!     let mut guard = slot.lock().await;
//!     // run queries on guard.as_mut() ...
//! }
//! ```
//!
//! A handler that needs the connection to outlive the response sets the
//! [`KeepOpen`] flag and [takes](DbSlot::take) the handle — closing it
//! becomes that handler's job.

mod config;
mod context;
mod driver;
mod error;
mod method;
mod middleware;
mod pipeline;
mod request;
mod response;

pub use config::{DEFAULT_METHODS, Options};
pub use context::{DbSlot, KeepOpen};
pub use driver::{Connection, Driver};
pub use error::{DriverError, FatalClass};
pub use method::Method;
pub use middleware::{CONNECT_FAILURE_BODY, DbMiddleware};
pub use pipeline::{BoxFuture, FnStage, Middleware, Next};
pub use request::Request;
pub use response::{Payload, Response};

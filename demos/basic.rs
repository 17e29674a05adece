//! Minimal tether example — one middleware, one handler, three requests.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! There is no HTTP server here on purpose: tether only manages the
//! connection lifecycle, so this demo drives the pipeline by hand the
//! way a transport adapter would — build a request, hand it to the
//! middleware with a `next`, then fire the response's close event.

use std::sync::atomic::{AtomicUsize, Ordering};

use tether::{
    Connection, DbMiddleware, DbSlot, Driver, DriverError, Method, Middleware, Options, Request,
    Response,
};
use tracing::info;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let middleware = DbMiddleware::new(
        MemoryDriver::default(),
        Options { dsn: "memory://demo".into(), ..Default::default() },
    );

    // GET is in the default intercept set — the handler finds a connection.
    serve(&middleware, Request::new(Method::Get, "/orders/42")).await;

    // OPTIONS is not — the handler sees no slot and says so.
    serve(&middleware, Request::new(Method::Options, "/orders/42")).await;

    // POST engages again; a fresh connection per request.
    serve(&middleware, Request::new(Method::Post, "/orders")).await;
}

/// What a transport adapter does per request: run the pipeline, flush,
/// fire the close event.
async fn serve(middleware: &DbMiddleware<MemoryDriver>, req: Request) {
    let res = Response::new();
    middleware
        .handle(req, res.clone(), Box::new(|req| Box::pin(handle_order(req))))
        .await;

    if let Some(sent) = res.sent() {
        info!(status = sent.status, body = %String::from_utf8_lossy(&sent.body), "responded");
    }
    res.close(); // the middleware's cleanup hook runs here
    tokio::task::yield_now().await;
}

// The downstream handler: reads the connection out of the request, no
// parameter threading required.
async fn handle_order(req: Request) {
    match DbSlot::<MemoryConn>::of(&req) {
        Some(slot) => {
            let guard = slot.lock().await;
            let conn = guard.as_ref().expect("connection still in its slot");
            info!(session = conn.id, path = req.path(), "handled with a connection");
        }
        None => info!(path = req.path(), "handled without a connection"),
    }
}

// ── A toy driver ──────────────────────────────────────────────────────────────

#[derive(Default)]
struct MemoryDriver {
    sessions: AtomicUsize,
}

struct MemoryConn {
    id: usize,
}

impl Driver for MemoryDriver {
    type Conn = MemoryConn;

    async fn open(&self, dsn: &str) -> Result<MemoryConn, DriverError> {
        let id = self.sessions.fetch_add(1, Ordering::Relaxed);
        info!(dsn, session = id, "opened");
        Ok(MemoryConn { id })
    }
}

impl Connection for MemoryConn {
    async fn close(self) -> Result<(), DriverError> {
        info!(session = self.id, "closed");
        Ok(())
    }
}

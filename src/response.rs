//! Outgoing response handle and the close event.
//!
//! A [`Response`] is a cheaply-cloneable shared handle, because two
//! parties hold it at once: the pipeline stages that may write to it,
//! and the transport adapter that flushes it and reports when the
//! underlying stream is done. It records **at most one** payload — the
//! first write wins, later writes are ignored, matching a wire where
//! the status line has already left the building.
//!
//! # The close event
//!
//! [`on_close`](Response::on_close) registers a one-shot hook;
//! [`close`](Response::close) fires every registered hook exactly once.
//! Dropping the last handle without an explicit `close` also fires them,
//! so normal completion, client disconnect and aborted requests all look
//! the same to a hook — there is deliberately no way to tell them apart.
//! Hooks registered after the close event never run.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;

type CloseHook = Box<dyn FnOnce() + Send + 'static>;

// ── Payload ───────────────────────────────────────────────────────────────────

/// What was written to a response: status, content type, body bytes.
#[derive(Clone, Debug)]
pub struct Payload {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Bytes,
}

// ── Response ──────────────────────────────────────────────────────────────────

/// An outgoing HTTP response, shared between pipeline and transport.
#[derive(Clone)]
pub struct Response {
    inner: Arc<Inner>,
}

struct Inner {
    payload: Mutex<Option<Payload>>,
    hooks: Mutex<Vec<CloseHook>>,
    closed: AtomicBool,
}

impl Response {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                payload: Mutex::new(None),
                hooks: Mutex::new(Vec::new()),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Records a JSON payload (`application/json`). First write wins.
    ///
    /// Pass bytes from your serialiser directly — no intermediate
    /// allocation: `serde_json::to_vec(&val)`, or a hand-built literal.
    pub fn send_json(&self, status: u16, body: impl Into<Bytes>) {
        self.send(Payload {
            status,
            content_type: "application/json",
            body: body.into(),
        });
    }

    /// Records a bodyless payload. First write wins.
    pub fn send_status(&self, status: u16) {
        self.send(Payload { status, content_type: "text/plain; charset=utf-8", body: Bytes::new() });
    }

    fn send(&self, payload: Payload) {
        let mut slot = self.inner.payload.lock().expect("response payload lock poisoned");
        if slot.is_none() {
            *slot = Some(payload);
        }
    }

    /// Returns a snapshot of what was written, if anything was.
    pub fn sent(&self) -> Option<Payload> {
        self.inner.payload.lock().expect("response payload lock poisoned").clone()
    }

    /// Registers a one-shot hook on the close event.
    ///
    /// Hooks run synchronously inside [`close`](Response::close) (or the
    /// final drop); long-running cleanup should hand itself off to a
    /// spawned task.
    pub fn on_close(&self, hook: impl FnOnce() + Send + 'static) {
        if self.inner.closed.load(Ordering::Acquire) {
            return;
        }
        self.inner.hooks.lock().expect("response hook lock poisoned").push(Box::new(hook));
    }

    /// Fires the close event. Idempotent: hooks run exactly once no
    /// matter how many handles call this or drop afterwards.
    pub fn close(&self) {
        self.inner.fire();
    }

    /// Whether the close event has fired.
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }
}

impl Default for Response {
    fn default() -> Self { Self::new() }
}

// ── Close event ───────────────────────────────────────────────────────────────

impl Inner {
    fn fire(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let hooks = {
            let mut guard = self.hooks.lock().expect("response hook lock poisoned");
            std::mem::take(&mut *guard)
        };
        for hook in hooks {
            hook();
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.fire();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn first_write_wins() {
        let res = Response::new();
        res.send_json(500, &b"{\"a\":1}"[..]);
        res.send_json(200, &b"{\"a\":2}"[..]);
        let sent = res.sent().unwrap();
        assert_eq!(sent.status, 500);
        assert_eq!(sent.body, Bytes::from_static(b"{\"a\":1}"));
    }

    #[test]
    fn close_fires_hooks_exactly_once() {
        let res = Response::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let f = Arc::clone(&fired);
        res.on_close(move || { f.fetch_add(1, Ordering::SeqCst); });

        res.close();
        res.close();
        drop(res);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dropping_last_handle_fires_hooks() {
        let fired = Arc::new(AtomicUsize::new(0));
        {
            let res = Response::new();
            let clone = res.clone();
            let f = Arc::clone(&fired);
            res.on_close(move || { f.fetch_add(1, Ordering::SeqCst); });
            drop(res);
            // A live clone keeps the event pending.
            assert_eq!(fired.load(Ordering::SeqCst), 0);
            drop(clone);
        }
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn hooks_registered_after_close_never_run() {
        let res = Response::new();
        res.close();
        let fired = Arc::new(AtomicUsize::new(0));
        let f = Arc::clone(&fired);
        res.on_close(move || { f.fetch_add(1, Ordering::SeqCst); });
        drop(res);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn close_does_not_disturb_the_sent_payload() {
        let res = Response::new();
        res.send_status(204);
        res.close();
        assert_eq!(res.sent().unwrap().status, 204);
    }
}

//! The two request-scoped slots.
//!
//! For every qualifying request, [`DbMiddleware`](crate::DbMiddleware)
//! publishes exactly two entries into the request's extensions before
//! any downstream code runs:
//!
//! - [`DbSlot<C>`] — the live connection handle, and
//! - [`KeepOpen`] — a boolean: "skip the automatic close".
//!
//! The extensions map is keyed by *type*, so these slots can never
//! collide with entries from unrelated libraries sharing the same
//! request — the type is the collision-proof key. Both slots are cheap
//! clones of shared state: reading them out of the request and holding
//! them across `.await`s is fine.
//!
//! Requests whose method is not intercepted carry **neither** slot;
//! downstream code must tolerate absence ([`DbSlot::of`] returns
//! `None`).
//!
//! # Opting out of the automatic close
//!
//! A handler that wants the connection to outlive the response sets the
//! flag and takes ownership:
//!
//! ```rust,ignore
//! if let (Some(slot), Some(keep)) = (DbSlot::<MyConn>::of(&req), KeepOpen::of(&req)) {
//!     keep.set(true);
//!     let conn = slot.take().await.expect("connection already taken");
//!     // conn is now yours to close.
//! }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, MutexGuard};

use crate::request::Request;

/// The per-request connection slot.
///
/// Holds the connection the middleware opened for this request. The
/// slot has take semantics: the handle leaves it at most once, which is
/// what makes "close exactly once" hold no matter how the request ends.
pub struct DbSlot<C> {
    inner: Arc<Mutex<Option<C>>>,
}

impl<C: Send + 'static> DbSlot<C> {
    pub(crate) fn new(conn: C) -> Self {
        Self { inner: Arc::new(Mutex::new(Some(conn))) }
    }

    /// Reads this request's connection slot, if the middleware engaged.
    pub fn of(req: &Request) -> Option<Self> {
        req.extensions().get::<Self>().cloned()
    }

    /// Locks the slot for use. The guard dereferences to `Option<C>`;
    /// `None` means someone already took the handle.
    pub async fn lock(&self) -> MutexGuard<'_, Option<C>> {
        self.inner.lock().await
    }

    /// Removes the connection from the slot, if still present.
    pub async fn take(&self) -> Option<C> {
        self.inner.lock().await.take()
    }
}

impl<C> Clone for DbSlot<C> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

/// The per-request keep-alive flag.
///
/// Starts `false`. Set it to `true` before the response closes and the
/// middleware's cleanup hook will leave the connection alone.
#[derive(Clone)]
pub struct KeepOpen {
    flag: Arc<AtomicBool>,
}

impl KeepOpen {
    pub(crate) fn new() -> Self {
        Self { flag: Arc::new(AtomicBool::new(false)) }
    }

    /// Reads this request's keep-alive flag, if the middleware engaged.
    pub fn of(req: &Request) -> Option<Self> {
        req.extensions().get::<Self>().cloned()
    }

    pub fn set(&self, keep: bool) {
        self.flag.store(keep, Ordering::Release);
    }

    pub fn get(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::Method;

    #[tokio::test]
    async fn slot_takes_at_most_once() {
        let slot = DbSlot::new(7u32);
        assert_eq!(slot.take().await, Some(7));
        assert_eq!(slot.take().await, None);
        assert!(slot.lock().await.is_none());
    }

    #[tokio::test]
    async fn clones_share_one_slot() {
        let slot = DbSlot::new("conn");
        let other = slot.clone();
        assert_eq!(other.take().await, Some("conn"));
        assert_eq!(slot.take().await, None);
    }

    #[test]
    fn keep_open_defaults_to_false_and_is_shared() {
        let keep = KeepOpen::new();
        let other = keep.clone();
        assert!(!keep.get());
        other.set(true);
        assert!(keep.get());
    }

    #[test]
    fn absent_on_an_untouched_request() {
        let req = Request::new(Method::Get, "/");
        assert!(DbSlot::<u32>::of(&req).is_none());
        assert!(KeepOpen::of(&req).is_none());
    }

    #[test]
    fn the_two_slots_do_not_collide_with_other_extensions() {
        let mut req = Request::new(Method::Get, "/");
        req.extensions_mut().insert(String::from("unrelated"));
        req.extensions_mut().insert(DbSlot::new(1u8));
        req.extensions_mut().insert(KeepOpen::new());
        assert!(DbSlot::<u8>::of(&req).is_some());
        assert!(KeepOpen::of(&req).is_some());
        assert_eq!(req.extensions().get::<String>().unwrap(), "unrelated");
    }
}

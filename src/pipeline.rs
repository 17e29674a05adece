//! Middleware trait and type erasure.
//!
//! # How async middleware is stored
//!
//! A pipeline holds stages of *different* concrete types, so stages are
//! addressed through a trait object (`dyn Middleware`) returning a
//! boxed future. The shape is the classic three-argument one:
//!
//! ```text
//! stage.handle(request, response, next)
//! ```
//!
//! `next` advances the pipeline and consumes the request; a stage that
//! never calls it halts the pipeline (the response, a shared handle,
//! remains writable). The only runtime cost per stage is one heap
//! allocation for the future plus one virtual call — negligible next to
//! the database round-trip these stages exist to manage.

use std::future::Future;
use std::pin::Pin;

use crate::request::Request;
use crate::response::Response;

/// A heap-allocated, type-erased future.
///
/// `Pin<Box<…>>` because the runtime polls futures in place — they must
/// not move in memory after the first poll. `Send + 'static` lets tokio
/// move the future across worker threads.
pub type BoxFuture<T = ()> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Advances the pipeline to the next stage.
///
/// Consumes the request — exactly one continuation of a request exists
/// at any point, so ownership of the `Request` tracks where in the
/// pipeline it currently is.
pub type Next = Box<dyn FnOnce(Request) -> BoxFuture + Send + 'static>;

/// A pipeline stage.
///
/// Implemented by stateful middleware such as
/// [`DbMiddleware`](crate::DbMiddleware), and by [`FnStage`] for plain
/// functions of the shape:
///
/// ```text
/// async fn stage(req: Request, res: Response, next: Next)
/// ```
pub trait Middleware: Send + Sync + 'static {
    fn handle(&self, req: Request, res: Response, next: Next) -> BoxFuture;
}

/// Newtype that turns a plain async function into a [`Middleware`],
/// bridging the typed world to the trait-object world.
pub struct FnStage<F>(pub F);

impl<F, Fut> Middleware for FnStage<F>
where
    F: Fn(Request, Response, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn handle(&self, req: Request, res: Response, next: Next) -> BoxFuture {
        Box::pin((self.0)(req, res, next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::Method;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn fn_stage_dispatches_through_the_trait_object() {
        let order = Arc::new(AtomicUsize::new(0));

        let seen = Arc::clone(&order);
        let stage: Box<dyn Middleware> =
            Box::new(FnStage(move |req: Request, _res: Response, next: Next| {
                let seen = Arc::clone(&seen);
                async move {
                    seen.fetch_add(1, Ordering::SeqCst);
                    next(req).await;
                }
            }));

        let seen = Arc::clone(&order);
        stage
            .handle(
                Request::new(Method::Get, "/"),
                Response::new(),
                Box::new(move |_req| {
                    seen.fetch_add(10, Ordering::SeqCst);
                    Box::pin(async {})
                }),
            )
            .await;

        assert_eq!(order.load(Ordering::SeqCst), 11, "stage ran, then next ran");
    }
}

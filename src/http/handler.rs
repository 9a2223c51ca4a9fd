//! Handler trait shared by routes, filters and miss handlers.

use std::panic::{self, AssertUnwindSafe};

use crate::error::{HandlerError, HandlerPanic};
use crate::http::context::Context;

pub type HandlerResult = Result<(), HandlerError>;

/// A request handler. Implemented for any matching closure.
pub trait Handler: Send + Sync {
    fn handle(&self, ctx: &mut Context<'_>) -> HandlerResult;
}

impl<F> Handler for F
where
    F: Fn(&mut Context<'_>) -> HandlerResult + Send + Sync,
{
    fn handle(&self, ctx: &mut Context<'_>) -> HandlerResult {
        self(ctx)
    }
}

/// Run a handler, turning a panic into a [`HandlerPanic`] error.
pub(crate) fn run_guarded(handler: &dyn Handler, ctx: &mut Context<'_>) -> HandlerResult {
    match panic::catch_unwind(AssertUnwindSafe(|| handler.handle(ctx))) {
        Ok(result) => result,
        Err(payload) => Err(HandlerError::new(HandlerPanic::from_payload(&*payload))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::method::HttpMethod;
    use crate::http::request::HttpRequest;
    use crate::routing::pattern::PathParams;

    #[test]
    fn test_closure_is_handler() {
        let handler = |ctx: &mut Context<'_>| -> HandlerResult {
            ctx.set_status(204);
            Ok(())
        };
        let req = HttpRequest::new(HttpMethod::Delete, "/items/1");
        let mut ctx = Context::new(&req, None, PathParams::new());

        run_guarded(&handler, &mut ctx).unwrap();
        assert_eq!(ctx.status(), 204);
    }

    #[test]
    fn test_panic_becomes_error() {
        let handler = |_: &mut Context<'_>| -> HandlerResult { panic!("boom") };
        let req = HttpRequest::new(HttpMethod::Get, "/");
        let mut ctx = Context::new(&req, None, PathParams::new());

        let err = run_guarded(&handler, &mut ctx).unwrap_err();
        let panic = err.downcast_ref::<HandlerPanic>().unwrap();
        assert_eq!(panic.message, "boom");
    }
}

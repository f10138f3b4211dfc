//! The resolution handler pipeline.
//!
//! Handlers form a stack: each one receives a [`Next`] pointing at the
//! handler below it and may short-circuit, post-process, or delegate. The
//! bottom of the stack is the context's own terminal resolution, which
//! consults the cache, queries the translator, and notifies hooks.

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::interpreter::{Context, Request, Resolution};

/// Signature of a middleware handler.
pub type HandlerFn = dyn Fn(Next<'_>, &Request<'_>) -> Arc<Resolution> + Send + Sync;

/// Observer called after the terminal handler matched a record.
pub type FoundHook = Arc<dyn Fn(&Request<'_>, &Resolution) + Send + Sync>;

/// Observer called after the terminal handler found no record.
pub type NotFoundHook = Arc<dyn Fn(&Request<'_>) + Send + Sync>;

/// One layer of the handler stack.
pub struct Handler {
    func: Arc<HandlerFn>,
    prev: Option<Arc<Handler>>,
}

impl Handler {
    pub(crate) fn new(func: Arc<HandlerFn>, prev: Option<Arc<Handler>>) -> Self {
        Self { func, prev }
    }

    /// The handler this one delegates to, if it is not the innermost.
    pub fn prev(&self) -> Option<&Handler> {
        self.prev.as_deref()
    }

    pub(crate) fn handle(&self, context: &Context, request: &Request<'_>) -> Arc<Resolution> {
        (self.func)(
            Next {
                context,
                handler: self.prev(),
            },
            request,
        )
    }
}

impl Debug for Handler {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let mut depth = 0;
        let mut current = self.prev();
        while let Some(handler) = current {
            depth += 1;
            current = handler.prev();
        }
        f.debug_struct("Handler").field("below", &depth).finish()
    }
}

/// Continuation to the rest of the handler stack.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    context: &'a Context,
    handler: Option<&'a Handler>,
}

impl<'a> Next<'a> {
    pub(crate) fn new(context: &'a Context, handler: Option<&'a Handler>) -> Self {
        Self { context, handler }
    }

    /// Delegate to the next handler, or to the terminal resolution.
    pub fn run(self, request: &Request<'_>) -> Arc<Resolution> {
        match self.handler {
            Some(handler) => handler.handle(self.context, request),
            None => self.context.resolve(request),
        }
    }

    pub fn context(&self) -> &'a Context {
        self.context
    }
}

//! Middleware composition.
//!
//! A middleware wraps a handler and runs its own logic before or after it.
//! Layers are composed outward-in: the outermost layer's pre-logic runs
//! first and its post-logic runs last.
//!
//! ```text
//! Pipeline::new().layer(a).layer(b).build(h)
//!
//!   a.before -> b.before -> h -> b.after -> a.after
//! ```

use std::fmt;
use std::sync::Arc;

use crate::environ::Environ;
use crate::error::Error;
use crate::handler::{BoxHandler, Handler};
use crate::response::{Body, StartResponse};

/// When a middleware's own logic runs relative to the handler it wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Runs before the wrapped handler and may prevent it from running
    Before,
    /// Runs after the wrapped handler returned successfully
    After,
}

/// A handler decorator.
pub trait Middleware: Send + Sync + 'static {
    /// Declares when this middleware's logic runs.
    fn phase(&self) -> Phase;

    /// Handles a request, delegating to `next` for the wrapped handler.
    fn handle(
        &self,
        next: &dyn Handler,
        environ: &mut Environ,
        start_response: &mut dyn StartResponse,
    ) -> Result<Body, Error>;

    /// Wraps a single handler in this middleware.
    fn wrap(self, inner: BoxHandler) -> BoxHandler
    where
        Self: Sized,
    {
        Arc::new(Layered {
            middleware: Arc::new(self),
            inner,
        })
    }
}

struct Layered {
    middleware: Arc<dyn Middleware>,
    inner: BoxHandler,
}

impl Handler for Layered {
    fn call(
        &self,
        environ: &mut Environ,
        start_response: &mut dyn StartResponse,
    ) -> Result<Body, Error> {
        self.middleware
            .handle(self.inner.as_ref(), environ, start_response)
    }
}

/// Builder for an ordered stack of middleware.
///
/// The first layer added is the outermost.
///
/// # Examples
///
/// ```
/// use tiddlyweb_utils::{
///     do_html, entitle, handler_fn, require_any_user, Body, Environ, Handler, Method, Pipeline,
///     ResponseHead, Usersign,
/// };
///
/// let page = Pipeline::new()
///     .layer(do_html())
///     .layer(entitle("Dashboard"))
///     .layer(require_any_user())
///     .build(handler_fn(|_, _| Ok(Body::from("<h1>hi</h1>"))));
///
/// let mut environ = Environ::new(Method::Get, "/dashboard")
///     .with_usersign(Usersign::named("alice"));
/// let mut head = ResponseHead::default();
///
/// let body = page.call(&mut environ, &mut head).unwrap();
/// assert_eq!(body.into_string(), "<h1>hi</h1>");
/// assert_eq!(environ.title(), Some("Dashboard"));
/// assert_eq!(head.status(), Some("200 OK"));
/// ```
#[derive(Clone, Default)]
pub struct Pipeline {
    layers: Vec<Arc<dyn Middleware>>,
}

impl Pipeline {
    /// Creates an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a layer inside the ones already added.
    pub fn layer(mut self, middleware: impl Middleware) -> Self {
        self.layers.push(Arc::new(middleware));
        self
    }

    /// Returns the number of layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Returns true if no layer was added.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Returns the declared phase of every layer, outermost first.
    pub fn phases(&self) -> Vec<Phase> {
        self.layers.iter().map(|layer| layer.phase()).collect()
    }

    /// Wraps `handler` in every layer.
    ///
    /// The pipeline can be reused to build any number of handlers.
    pub fn build(&self, handler: BoxHandler) -> BoxHandler {
        self.layers.iter().rev().fold(handler, |inner, middleware| {
            Arc::new(Layered {
                middleware: Arc::clone(middleware),
                inner,
            }) as BoxHandler
        })
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("phases", &self.phases())
            .finish()
    }
}

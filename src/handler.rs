//! Request handlers and the closure adapter.

use std::sync::Arc;

use crate::environ::Environ;
use crate::error::Error;
use crate::response::{Body, StartResponse};

/// A request handler.
///
/// Handlers receive the request environment and the response starter and
/// return the response body. Any closure with the matching signature is a
/// handler; [`handler_fn`] boxes one without needing type annotations.
pub trait Handler: Send + Sync {
    /// Handles one request.
    fn call(
        &self,
        environ: &mut Environ,
        start_response: &mut dyn StartResponse,
    ) -> Result<Body, Error>;
}

impl<F> Handler for F
where
    F: Fn(&mut Environ, &mut dyn StartResponse) -> Result<Body, Error> + Send + Sync,
{
    fn call(
        &self,
        environ: &mut Environ,
        start_response: &mut dyn StartResponse,
    ) -> Result<Body, Error> {
        self(environ, start_response)
    }
}

/// A shared, type-erased handler.
pub type BoxHandler = Arc<dyn Handler>;

/// Boxes a closure as a [`BoxHandler`].
///
/// # Examples
///
/// ```
/// use tiddlyweb_utils::{handler_fn, Body, Environ, Handler, Method, ResponseHead, StartResponse};
///
/// let hello = handler_fn(|environ, start_response| {
///     start_response.start("200 OK", Vec::new());
///     Ok(Body::from(format!("hello {}", environ.path_info())))
/// });
///
/// let mut environ = Environ::new(Method::Get, "/world");
/// let mut head = ResponseHead::default();
/// let body = hello.call(&mut environ, &mut head).unwrap();
///
/// assert_eq!(body.into_string(), "hello /world");
/// assert_eq!(head.status(), Some("200 OK"));
/// ```
pub fn handler_fn<F>(f: F) -> BoxHandler
where
    F: Fn(&mut Environ, &mut dyn StartResponse) -> Result<Body, Error> + Send + Sync + 'static,
{
    Arc::new(f)
}

//! Response shaping decorators: page title annotation and the HTML content type.

use crate::environ::Environ;
use crate::error::Error;
use crate::handler::Handler;
use crate::middleware::{Middleware, Phase};
use crate::response::{Body, Header, ResponseHead, StartResponse};

/// Status forced by [`DoHtml`].
pub const OK_STATUS: &str = "200 OK";

/// Content type forced by [`DoHtml`].
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=UTF-8";

const CONTENT_TYPE: &str = "Content-Type";

/// Records a page title on the environment after the wrapped handler ran.
///
/// The handler's output is forced up to its first chunk before the title is
/// set (see [`Body::force_first`]), and returned with every chunk intact.
/// If the handler fails, the error propagates and no title is recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entitle {
    title: String,
}

impl Entitle {
    /// Returns the title this decorator records.
    pub fn title(&self) -> &str {
        &self.title
    }
}

/// Creates an [`Entitle`] decorator.
///
/// # Examples
///
/// ```
/// use tiddlyweb_utils::{entitle, handler_fn, Body, Environ, Handler, Method, Middleware, ResponseHead};
///
/// let app = entitle("monkey").wrap(handler_fn(|_, _| Ok(Body::Empty)));
///
/// let mut environ = Environ::new(Method::Get, "/");
/// assert!(environ.title().is_none());
///
/// app.call(&mut environ, &mut ResponseHead::default()).unwrap();
/// assert_eq!(environ.title(), Some("monkey"));
/// ```
pub fn entitle(title: impl Into<String>) -> Entitle {
    Entitle {
        title: title.into(),
    }
}

impl Middleware for Entitle {
    fn phase(&self) -> Phase {
        Phase::After
    }

    fn handle(
        &self,
        next: &dyn Handler,
        environ: &mut Environ,
        start_response: &mut dyn StartResponse,
    ) -> Result<Body, Error> {
        let output = next.call(environ, start_response)?.force_first();
        environ.set_title(self.title.as_str());
        Ok(output)
    }
}

/// Sends the wrapped handler's output as `200 OK` HTML.
///
/// Headers the handler queued through its response starter are kept, except
/// for any `Content-Type`, which is replaced by [`HTML_CONTENT_TYPE`]. The
/// status the handler asked for is discarded, so this belongs outermost and
/// only around handlers that never answer with another status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DoHtml {
    _private: (),
}

/// Creates a [`DoHtml`] decorator.
///
/// # Examples
///
/// ```
/// use tiddlyweb_utils::{do_html, handler_fn, Body, Environ, Handler, Method, Middleware, ResponseHead};
///
/// let app = do_html().wrap(handler_fn(|_, _| Ok(Body::from("<p>hi</p>"))));
///
/// let mut head = ResponseHead::default();
/// app.call(&mut Environ::new(Method::Get, "/"), &mut head).unwrap();
///
/// assert_eq!(head.status(), Some("200 OK"));
/// assert!(head.contains("Content-Type", "text/html; charset=UTF-8"));
/// ```
pub fn do_html() -> DoHtml {
    DoHtml::default()
}

impl Middleware for DoHtml {
    fn phase(&self) -> Phase {
        Phase::After
    }

    fn handle(
        &self,
        next: &dyn Handler,
        environ: &mut Environ,
        start_response: &mut dyn StartResponse,
    ) -> Result<Body, Error> {
        let mut queued = ResponseHead::default();
        let output = next.call(environ, &mut queued)?;

        let mut headers: Vec<Header> = queued
            .into_headers()
            .into_iter()
            .filter(|(name, _)| !name.eq_ignore_ascii_case(CONTENT_TYPE))
            .collect();
        headers.push((CONTENT_TYPE.to_string(), HTML_CONTENT_TYPE.to_string()));

        start_response.start(OK_STATUS, headers);
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::handler_fn;
    use crate::method::Method;

    fn environ() -> Environ {
        Environ::new(Method::Get, "/")
    }

    #[test]
    fn entitle_sets_title_for_empty_output() {
        let app = entitle("monkey").wrap(handler_fn(|_, _| Ok(Body::Empty)));
        let mut environ = environ();

        let output = app.call(&mut environ, &mut ResponseHead::default()).unwrap();

        assert_eq!(environ.title(), Some("monkey"));
        assert!(matches!(output, Body::Empty));
    }

    #[test]
    fn entitle_keeps_string_output() {
        let app = entitle("page").wrap(handler_fn(|_, _| Ok(Body::from("content"))));
        let mut environ = environ();

        let output = app.call(&mut environ, &mut ResponseHead::default()).unwrap();

        assert_eq!(output.into_chunks(), vec!["content"]);
        assert_eq!(environ.title(), Some("page"));
    }

    #[test]
    fn entitle_keeps_every_lazy_chunk() {
        let app = entitle("stream").wrap(handler_fn(|_, _| {
            Ok(Body::lazy(vec!["a".to_string(), "b".to_string(), "c".to_string()]))
        }));
        let mut environ = environ();

        let output = app.call(&mut environ, &mut ResponseHead::default()).unwrap();

        assert_eq!(environ.title(), Some("stream"));
        assert_eq!(output.into_string(), "abc");
    }

    #[test]
    fn entitle_sets_title_for_empty_lazy_output() {
        let app = entitle("nothing").wrap(handler_fn(|_, _| Ok(Body::lazy(Vec::new()))));
        let mut environ = environ();

        let output = app.call(&mut environ, &mut ResponseHead::default()).unwrap();

        assert_eq!(environ.title(), Some("nothing"));
        assert!(output.into_chunks().is_empty());
    }

    #[test]
    fn entitle_skips_title_when_handler_fails() {
        let app = entitle("never").wrap(handler_fn(|_, _| Err(Error::Handler("down".to_string()))));
        let mut environ = environ();

        assert!(app.call(&mut environ, &mut ResponseHead::default()).is_err());
        assert!(environ.title().is_none());
    }

    #[test]
    fn do_html_forces_status_and_content_type() {
        let app = do_html().wrap(handler_fn(|_, _| Ok(Body::Empty)));
        let mut head = ResponseHead::default();

        app.call(&mut environ(), &mut head).unwrap();

        assert_eq!(head.status(), Some(OK_STATUS));
        assert!(head.contains("Content-Type", HTML_CONTENT_TYPE));
    }

    #[test]
    fn do_html_merges_queued_headers() {
        let app = do_html().wrap(handler_fn(|_, start_response| {
            start_response.start(
                "404 Not Found",
                vec![
                    ("Content-Type".to_string(), "text/plain".to_string()),
                    ("Cache-Control".to_string(), "no-cache".to_string()),
                ],
            );
            Ok(Body::from("<p>missing</p>"))
        }));
        let mut head = ResponseHead::default();

        let output = app.call(&mut environ(), &mut head).unwrap();

        assert_eq!(head.status(), Some("200 OK"));
        assert_eq!(
            head.headers(),
            &[
                ("Cache-Control".to_string(), "no-cache".to_string()),
                ("Content-Type".to_string(), HTML_CONTENT_TYPE.to_string()),
            ]
        );
        assert_eq!(output.into_string(), "<p>missing</p>");
    }

    #[test]
    fn do_html_does_not_start_response_on_error() {
        let app = do_html().wrap(handler_fn(|_, _| Err(Error::Handler("down".to_string()))));
        let mut head = ResponseHead::default();

        assert!(app.call(&mut environ(), &mut head).is_err());
        assert!(head.status().is_none());
    }
}

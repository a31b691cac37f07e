//! The route table: an ordered list of `(pattern, handler)` pairs matched
//! first-match-wins against the request path.

use std::fmt;
use std::sync::Arc;

use regex::{Captures, Regex};

use crate::environ::Environ;
use crate::error::{Error, RouteError};
use crate::handler::{handler_fn, BoxHandler, Handler};
use crate::method::Method;
use crate::response::{Body, StartResponse};

/// One entry of the route table.
#[derive(Clone)]
pub struct Route {
    pattern: Regex,
    handler: BoxHandler,
}

impl Route {
    /// Creates an entry from a compiled pattern.
    pub fn new(pattern: Regex, handler: BoxHandler) -> Self {
        Self { pattern, handler }
    }

    /// Returns the pattern.
    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    /// Returns the handler.
    pub fn handler(&self) -> &BoxHandler {
        &self.handler
    }

    /// Replaces the handler, keeping the pattern.
    pub fn set_handler(&mut self, handler: BoxHandler) {
        self.handler = handler;
    }

    /// Returns true if the pattern matches at the start of `path`.
    ///
    /// This is a prefix match: the pattern does not have to consume the
    /// whole path unless it is anchored at the end, as compiled templates are.
    pub fn matches(&self, path: &str) -> bool {
        captures_at_start(&self.pattern, path).is_some()
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern.as_str())
            .finish_non_exhaustive()
    }
}

fn captures_at_start<'p>(pattern: &Regex, path: &'p str) -> Option<Captures<'p>> {
    // The leftmost match starts at 0 whenever any match does.
    pattern
        .captures(path)
        .filter(|caps| caps.get(0).is_some_and(|m| m.start() == 0))
}

/// Compiles a path template into an anchored pattern.
///
/// `{name}` becomes a named group matching one path segment; everything else
/// is matched literally.
///
/// # Examples
///
/// ```
/// use tiddlyweb_utils::compile_template;
///
/// let pattern = compile_template("/bags/{bag_name}/tiddlers").unwrap();
/// let caps = pattern.captures("/bags/common/tiddlers").unwrap();
/// assert_eq!(&caps["bag_name"], "common");
/// assert!(!pattern.is_match("/bags/common/tiddlers/extra"));
/// ```
pub fn compile_template(template: &str) -> Result<Regex, RouteError> {
    let malformed = |reason| RouteError::Template {
        template: template.to_string(),
        reason,
    };

    let mut pattern = String::from("^");
    let mut rest = template;
    while let Some(open) = rest.find(['{', '}']) {
        if rest[open..].starts_with('}') {
            return Err(malformed("unmatched '}'"));
        }
        pattern.push_str(&regex::escape(&rest[..open]));
        let after = &rest[open + 1..];
        let close = after.find('}').ok_or_else(|| malformed("unclosed '{'"))?;
        let name = &after[..close];
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(malformed("placeholder names are [A-Za-z0-9_]+"));
        }
        pattern.push_str(&format!("(?P<{name}>[^/]+)"));
        rest = &after[close + 1..];
    }
    pattern.push_str(&regex::escape(rest));
    pattern.push('$');

    Ok(Regex::new(&pattern)?)
}

/// Dispatches on the request method to the handlers registered for one route.
struct MethodDispatch {
    methods: Vec<(Method, BoxHandler)>,
    method_not_allowed: BoxHandler,
}

impl Handler for MethodDispatch {
    fn call(
        &self,
        environ: &mut Environ,
        start_response: &mut dyn StartResponse,
    ) -> Result<Body, Error> {
        let handler = self
            .methods
            .iter()
            .find(|(method, _)| method == environ.method())
            .map(|(_, handler)| handler)
            .unwrap_or(&self.method_not_allowed);
        handler.call(environ, start_response)
    }
}

fn plain_text(status: &'static str) -> BoxHandler {
    handler_fn(move |_, start_response| {
        start_response.start(
            status,
            vec![(
                "Content-Type".to_string(),
                "text/plain; charset=UTF-8".to_string(),
            )],
        );
        Ok(Body::from(status))
    })
}

/// The route table.
///
/// # Examples
///
/// ```
/// use tiddlyweb_utils::{handler_fn, Body, Environ, Method, ResponseHead, Selector};
///
/// let mut selector = Selector::new();
/// selector
///     .add(
///         "/bags/{bag_name}",
///         [(Method::Get, handler_fn(|environ, _| {
///             Ok(Body::from(environ.routing_args().get("bag_name").unwrap_or("").to_string()))
///         }))],
///     )
///     .unwrap();
///
/// let mut environ = Environ::new(Method::Get, "/bags/common");
/// let body = selector.dispatch(&mut environ, &mut ResponseHead::default()).unwrap();
/// assert_eq!(body.into_string(), "common");
///
/// let mut head = ResponseHead::default();
/// selector.dispatch(&mut Environ::new(Method::Get, "/nowhere"), &mut head).unwrap();
/// assert_eq!(head.status(), Some("404 Not Found"));
/// ```
#[derive(Clone)]
pub struct Selector {
    mappings: Vec<Route>,
    not_found: BoxHandler,
    method_not_allowed: BoxHandler,
}

impl Selector {
    /// Creates an empty table with plain-text 404 and 405 responses.
    pub fn new() -> Self {
        Self::with_fallbacks(
            plain_text("404 Not Found"),
            plain_text("405 Method Not Allowed"),
        )
    }

    /// Creates an empty table with custom fallback handlers.
    pub fn with_fallbacks(not_found: BoxHandler, method_not_allowed: BoxHandler) -> Self {
        Self {
            mappings: Vec::new(),
            not_found,
            method_not_allowed,
        }
    }

    /// Registers handlers for a path template, one per method.
    ///
    /// Requests for a method without a handler go to the method-not-allowed
    /// fallback.
    pub fn add<I>(&mut self, template: &str, methods: I) -> Result<(), RouteError>
    where
        I: IntoIterator<Item = (Method, BoxHandler)>,
    {
        let pattern = compile_template(template)?;
        self.add_compiled(pattern, methods);
        Ok(())
    }

    pub(crate) fn add_compiled<I>(&mut self, pattern: Regex, methods: I)
    where
        I: IntoIterator<Item = (Method, BoxHandler)>,
    {
        let dispatch = MethodDispatch {
            methods: methods.into_iter().collect(),
            method_not_allowed: Arc::clone(&self.method_not_allowed),
        };
        self.mappings.push(Route::new(pattern, Arc::new(dispatch)));
    }

    /// Appends an entry with a precompiled pattern.
    pub fn push(&mut self, pattern: Regex, handler: BoxHandler) {
        self.mappings.push(Route::new(pattern, handler));
    }

    /// Returns the entries in match order.
    pub fn mappings(&self) -> &[Route] {
        &self.mappings
    }

    /// Returns the entries for direct editing.
    pub fn mappings_mut(&mut self) -> &mut Vec<Route> {
        &mut self.mappings
    }

    /// Returns the index of the first entry matching `path`.
    pub fn position(&self, path: &str) -> Option<usize> {
        self.mappings.iter().position(|route| route.matches(path))
    }

    /// Routes a request.
    ///
    /// The first entry matching the path handles it, after its captures are
    /// added to the routing arguments: named groups by name, unnamed groups
    /// in order as positional arguments. Without a match the not-found
    /// fallback answers.
    pub fn dispatch(
        &self,
        environ: &mut Environ,
        start_response: &mut dyn StartResponse,
    ) -> Result<Body, Error> {
        let path = environ.path_info().to_string();
        let matched = self.mappings.iter().find_map(|route| {
            captures_at_start(&route.pattern, &path).map(|caps| (route, caps))
        });

        let Some((route, caps)) = matched else {
            tracing::debug!(path = %path, "no route matched");
            return self.not_found(environ, start_response);
        };

        let routing_args = environ.routing_args_mut();
        for (group, name) in caps.iter().zip(route.pattern.capture_names()).skip(1) {
            let Some(value) = group else { continue };
            match name {
                Some(name) => routing_args.insert(name, value.as_str()),
                None => routing_args.positional.push(value.as_str().to_string()),
            }
        }
        route.handler.call(environ, start_response)
    }

    /// Answers with the not-found fallback.
    pub fn not_found(
        &self,
        environ: &mut Environ,
        start_response: &mut dyn StartResponse,
    ) -> Result<Body, Error> {
        self.not_found.call(environ, start_response)
    }

    /// Answers with the method-not-allowed fallback.
    pub fn method_not_allowed(
        &self,
        environ: &mut Environ,
        start_response: &mut dyn StartResponse,
    ) -> Result<Body, Error> {
        self.method_not_allowed.call(environ, start_response)
    }

    pub(crate) fn fallbacks(&self) -> (BoxHandler, BoxHandler) {
        (
            Arc::clone(&self.not_found),
            Arc::clone(&self.method_not_allowed),
        )
    }
}

impl Default for Selector {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selector")
            .field("mappings", &self.mappings)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::ResponseHead;

    fn echo(tag: &'static str) -> BoxHandler {
        handler_fn(move |_, _| Ok(Body::from(tag)))
    }

    #[test]
    fn template_escapes_literals() {
        let pattern = compile_template("/a.b/{name}").unwrap();
        assert_eq!(pattern.as_str(), r"^/a\.b/(?P<name>[^/]+)$");
        assert!(!pattern.is_match("/aXb/x"));
    }

    #[test]
    fn template_rejects_malformed_placeholders() {
        assert!(matches!(
            compile_template("/{name"),
            Err(RouteError::Template { .. })
        ));
        assert!(matches!(
            compile_template("/name}"),
            Err(RouteError::Template { .. })
        ));
        assert!(matches!(
            compile_template("/{}"),
            Err(RouteError::Template { .. })
        ));
        assert!(matches!(
            compile_template("/{bad-name}"),
            Err(RouteError::Template { .. })
        ));
    }

    #[test]
    fn dispatch_collects_unnamed_groups_in_order() {
        let mut selector = Selector::new();
        selector.push(
            Regex::new(r"^/files/([^/]+)/(?P<rev>\d+)/([^/]+)$").unwrap(),
            echo("file"),
        );

        let mut environ = Environ::new(Method::Get, "/files/readme/3/raw");
        selector
            .dispatch(&mut environ, &mut ResponseHead::default())
            .unwrap();

        let args = environ.routing_args();
        assert_eq!(args.positional, vec!["readme", "raw"]);
        assert_eq!(args.get("rev"), Some("3"));
    }

    #[test]
    fn dispatch_skips_unmatched_optional_groups() {
        let mut selector = Selector::new();
        selector.push(Regex::new(r"^/files/([^/]+)(\.txt)?$").unwrap(), echo("file"));

        let mut environ = Environ::new(Method::Get, "/files/readme");
        selector
            .dispatch(&mut environ, &mut ResponseHead::default())
            .unwrap();

        assert_eq!(environ.routing_args().positional, vec!["readme"]);
    }

    #[test]
    fn route_matches_at_start_only() {
        let route = Route::new(Regex::new("/bags").unwrap(), echo("bags"));
        assert!(route.matches("/bags/common"));
        assert!(!route.matches("/recipes/bags"));
    }

    #[test]
    fn dispatch_is_first_match_wins() {
        let mut selector = Selector::new();
        selector.add("/{anything}", [(Method::Get, echo("first"))]).unwrap();
        selector.add("/fixed", [(Method::Get, echo("second"))]).unwrap();

        let mut environ = Environ::new(Method::Get, "/fixed");
        let body = selector
            .dispatch(&mut environ, &mut ResponseHead::default())
            .unwrap();

        assert_eq!(body.into_string(), "first");
        assert_eq!(environ.routing_args().get("anything"), Some("fixed"));
    }

    #[test]
    fn unregistered_method_is_not_allowed() {
        let mut selector = Selector::new();
        selector.add("/bags", [(Method::Get, echo("list"))]).unwrap();

        let mut head = ResponseHead::default();
        let body = selector
            .dispatch(&mut Environ::new(Method::Post, "/bags"), &mut head)
            .unwrap();

        assert_eq!(head.status(), Some("405 Method Not Allowed"));
        assert_eq!(body.into_string(), "405 Method Not Allowed");
    }

    #[test]
    fn custom_fallbacks_are_used() {
        let selector = Selector::with_fallbacks(echo("custom 404"), echo("custom 405"));
        let body = selector
            .dispatch(
                &mut Environ::new(Method::Get, "/missing"),
                &mut ResponseHead::default(),
            )
            .unwrap();
        assert_eq!(body.into_string(), "custom 404");
    }

    #[test]
    fn position_finds_first_match() {
        let mut selector = Selector::new();
        selector.push(Regex::new("^/a").unwrap(), echo("a"));
        selector.push(Regex::new("^/b").unwrap(), echo("b1"));
        selector.push(Regex::new("^/b").unwrap(), echo("b2"));

        assert_eq!(selector.position("/b/x"), Some(1));
        assert_eq!(selector.position("/c"), None);
    }
}

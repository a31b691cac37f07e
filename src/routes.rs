//! Setup-time edits of the route table.
//!
//! These run while the application is being assembled, before it serves
//! traffic; nothing here synchronizes with requests being dispatched.

use std::sync::Arc;

use crate::environ::Environ;
use crate::error::{Error, RouteError};
use crate::handler::{BoxHandler, Handler};
use crate::method::Method;
use crate::response::{Body, StartResponse};
use crate::selector::{compile_template, Selector};

/// Replaces the handler of the first entry matching `path`.
///
/// The entry keeps its pattern and position. Returns `false`, leaving the
/// table untouched, when no entry matches.
///
/// # Examples
///
/// ```
/// use tiddlyweb_utils::{handler_fn, replace_handler, Body, Method, Selector};
///
/// let mut selector = Selector::new();
/// selector.add("/", [(Method::Get, handler_fn(|_, _| Ok(Body::from("old"))))]).unwrap();
///
/// assert!(replace_handler(&mut selector, "/", handler_fn(|_, _| Ok(Body::from("new")))));
/// assert!(!replace_handler(&mut selector, "/elsewhere", handler_fn(|_, _| Ok(Body::Empty))));
/// assert_eq!(selector.mappings().len(), 1);
/// ```
pub fn replace_handler(selector: &mut Selector, path: &str, new_handler: BoxHandler) -> bool {
    let Some(index) = selector.position(path) else {
        tracing::debug!(path = %path, "no route to replace");
        return false;
    };
    let route = &mut selector.mappings_mut()[index];
    tracing::debug!(path = %path, pattern = %route.pattern().as_str(), index, "replacing route handler");
    route.set_handler(new_handler);
    true
}

/// Removes the first entry matching `path`.
///
/// Requests that entry used to answer fall through to later entries or to
/// the not-found fallback. Returns `false`, leaving the table untouched, when
/// no entry matches.
pub fn remove_handler(selector: &mut Selector, path: &str) -> bool {
    let Some(index) = selector.position(path) else {
        tracing::debug!(path = %path, "no route to remove");
        return false;
    };
    let route = selector.mappings_mut().remove(index);
    tracing::debug!(path = %path, pattern = %route.pattern().as_str(), index, "removed route");
    true
}

/// The bag or recipe a tiddler mapping reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Container {
    /// Tiddlers come from the named bag
    Bag(String),
    /// Tiddlers come from the named recipe
    Recipe(String),
}

impl Container {
    /// Returns the routing argument naming this container.
    pub fn routing_key(&self) -> &'static str {
        match self {
            Container::Bag(_) => "bag_name",
            Container::Recipe(_) => "recipe_name",
        }
    }

    /// Returns the container name.
    pub fn name(&self) -> &str {
        match self {
            Container::Bag(name) | Container::Recipe(name) => name,
        }
    }
}

/// The host framework's tiddler handlers.
#[derive(Clone)]
pub struct TiddlerHandlers {
    /// Answers `GET`
    pub get: BoxHandler,
    /// Answers `PUT`
    pub put: BoxHandler,
    /// Answers `DELETE`
    pub delete: BoxHandler,
}

struct TiddlerDispatch {
    container: Option<Container>,
    handlers: TiddlerHandlers,
    not_found: BoxHandler,
    method_not_allowed: BoxHandler,
}

impl Handler for TiddlerDispatch {
    fn call(
        &self,
        environ: &mut Environ,
        start_response: &mut dyn StartResponse,
    ) -> Result<Body, Error> {
        let Some(container) = &self.container else {
            return self.not_found.call(environ, start_response);
        };
        environ
            .routing_args_mut()
            .insert(container.routing_key(), container.name());

        let handler = match environ.method() {
            Method::Get => &self.handlers.get,
            Method::Put => &self.handlers.put,
            Method::Delete => &self.handlers.delete,
            _ => &self.method_not_allowed,
        };
        handler.call(environ, start_response)
    }
}

/// Serves single tiddlers from a fixed bag or recipe under `path`.
///
/// `path` is a template with at least one placeholder, usually
/// `{tiddler_name}`:
///
/// ```text
/// /{tiddler_name}
/// /people/{tiddler_name}
/// /{tiddler_name}/something/here
/// ```
///
/// `GET`, `PUT` and `DELETE` are registered. At request time the container
/// name is added to the routing arguments (as `bag_name` or `recipe_name`)
/// before the matching tiddler handler runs; any other method gets the
/// table's method-not-allowed answer. Without a container every request gets
/// the not-found answer.
///
/// # Examples
///
/// ```
/// use tiddlyweb_utils::{
///     handler_fn, map_to_tiddler, Body, Container, Environ, Method, ResponseHead, Selector,
///     TiddlerHandlers,
/// };
///
/// let get = handler_fn(|environ, _| {
///     let args = environ.routing_args();
///     Ok(Body::from(format!(
///         "{} from {}",
///         args.get("tiddler_name").unwrap_or("?"),
///         args.get("bag_name").unwrap_or("?"),
///     )))
/// });
/// let unused = handler_fn(|_, _| Ok(Body::Empty));
///
/// let mut selector = Selector::new();
/// map_to_tiddler(
///     &mut selector,
///     "/{tiddler_name}",
///     Some(Container::Bag("alpha".to_string())),
///     TiddlerHandlers { get, put: unused.clone(), delete: unused },
/// )
/// .unwrap();
///
/// let mut environ = Environ::new(Method::Get, "/foo");
/// let body = selector.dispatch(&mut environ, &mut ResponseHead::default()).unwrap();
/// assert_eq!(body.into_string(), "foo from alpha");
/// ```
pub fn map_to_tiddler(
    selector: &mut Selector,
    path: &str,
    container: Option<Container>,
    handlers: TiddlerHandlers,
) -> Result<(), RouteError> {
    let pattern = compile_template(path)?;
    if pattern.capture_names().flatten().next().is_none() {
        return Err(RouteError::MissingPlaceholder(path.to_string()));
    }

    let (not_found, method_not_allowed) = selector.fallbacks();
    let dispatch: BoxHandler = Arc::new(TiddlerDispatch {
        container: container.clone(),
        handlers,
        not_found,
        method_not_allowed,
    });

    selector.add_compiled(
        pattern,
        [
            (Method::Get, Arc::clone(&dispatch)),
            (Method::Put, Arc::clone(&dispatch)),
            (Method::Delete, dispatch),
        ],
    );
    tracing::debug!(path = %path, container = ?container, "mapped tiddler route");
    Ok(())
}

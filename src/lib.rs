//! Plugin utilities for TiddlyWeb-style wiki servers.
//!
//! This crate supplies the small pieces most plugins end up writing:
//! - **Request decorators**: middleware that titles a page ([`entitle`]),
//!   finalizes an HTML response ([`do_html`]) or gates a handler on the
//!   current identity ([`require_role`], [`require_any_user`])
//! - **Bag provisioning**: [`ensure_bag`] fetches a bag or creates it once
//!   with a description, owner and policy
//! - **Route table editing**: [`replace_handler`], [`remove_handler`] and
//!   [`map_to_tiddler`] change a [`Selector`] during application setup
//! - **Packaging**: [`resource_filename`] locates files shipped with a plugin
//!
//! # Core Types
//!
//! - [`Environ`]: per-request state shared by every layer around a handler
//! - [`Handler`]: anything that answers a request, closures included
//! - [`Middleware`] and [`Pipeline`]: decorators and their composition order
//! - [`Store`]: the persistence interface bags are fetched from and saved to
//! - [`Selector`]: the ordered, first-match-wins route table
//!
//! # Examples
//!
//! ```
//! use tiddlyweb_utils::{
//!     ensure_bag, entitle, handler_fn, require_role, BagOptions, Body, Environ,
//!     MemoryStore, Method, Pipeline, PolicyAttr, ResponseHead, Selector, Usersign,
//! };
//!
//! // Setup: provision the bag the plugin writes to.
//! let store = MemoryStore::new();
//! let bag = ensure_bag(
//!     "drafts",
//!     &store,
//!     BagOptions::new()
//!         .owner("editor")
//!         .policy_attr(PolicyAttr::Write(vec!["R:EDITOR".to_string()])),
//! )
//! .unwrap();
//! assert_eq!(bag.policy.manage, vec!["editor".to_string()]);
//!
//! // Setup: route an editor-only page.
//! let page = Pipeline::new()
//!     .layer(entitle("Drafts"))
//!     .layer(require_role("EDITOR"))
//!     .build(handler_fn(|_, _| Ok(Body::from("draft list"))));
//! let mut selector = Selector::new();
//! selector.add("/drafts", [(Method::Get, page)]).unwrap();
//!
//! // Serving.
//! let mut environ = Environ::new(Method::Get, "/drafts")
//!     .with_usersign(Usersign::named("ed").with_roles(["EDITOR"]));
//! let body = selector.dispatch(&mut environ, &mut ResponseHead::default()).unwrap();
//! assert_eq!(body.into_string(), "draft list");
//! assert_eq!(environ.title(), Some("Drafts"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod bag;
mod config;
mod decorators;
mod ensure;
mod environ;
mod error;
mod guard;
mod handler;
mod method;
mod middleware;
mod resource;
mod response;
mod routes;
mod selector;
mod store;

pub use bag::{Bag, Policy, PolicyAttr};
pub use config::{Config, StoreConfig, DEFAULT_STORE_BACKEND};
pub use decorators::{do_html, entitle, DoHtml, Entitle, HTML_CONTENT_TYPE, OK_STATUS};
pub use ensure::{ensure_bag, BagOptions};
pub use environ::{Environ, RoutingArgs, Usersign, GUEST};
pub use error::{ConfigError, Error, RouteError, StoreError, UserRequired};
pub use guard::{require_any_user, require_role, RequireAnyUser, RequireRole};
pub use handler::{handler_fn, BoxHandler, Handler};
pub use method::Method;
pub use middleware::{Middleware, Phase, Pipeline};
pub use resource::resource_filename;
pub use response::{Body, Header, ResponseHead, StartResponse};
pub use routes::{map_to_tiddler, remove_handler, replace_handler, Container, TiddlerHandlers};
pub use selector::{compile_template, Route, Selector};
pub use store::{get_store, MemoryStore, Store, StoreFactory, StoreRegistry};

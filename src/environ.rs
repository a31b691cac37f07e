//! The request environment shared by every layer handling one request.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::method::Method;

/// Name carried by the anonymous identity.
pub const GUEST: &str = "GUEST";

/// The identity attached to a request.
///
/// Both fields are optional: an identity without a `name` is not a logged-in
/// user, and an identity without `roles` holds no role at all. Neither case is
/// an error on its own; the access guards decide what is sufficient.
///
/// # Examples
///
/// ```
/// use tiddlyweb_utils::Usersign;
///
/// let admin = Usersign::named("cdent").with_roles(["ADMIN"]);
/// assert!(admin.has_role("ADMIN"));
/// assert!(!admin.is_guest());
///
/// assert!(Usersign::guest().is_guest());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usersign {
    /// User name, `GUEST` for anonymous requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Role identifiers held by the user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
}

impl Usersign {
    /// Creates an identity with a name and no roles field.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            roles: None,
        }
    }

    /// The anonymous identity.
    pub fn guest() -> Self {
        Self::named(GUEST)
    }

    /// Sets the role list.
    pub fn with_roles<I, R>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        self.roles = Some(roles.into_iter().map(Into::into).collect());
        self
    }

    /// Returns true when the identity carries the anonymous name.
    pub fn is_guest(&self) -> bool {
        self.name.as_deref() == Some(GUEST)
    }

    /// Returns true when `role` is in the role list.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles
            .as_deref()
            .is_some_and(|roles| roles.iter().any(|r| r == role))
    }
}

/// Routing parameters produced by the route table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingArgs {
    /// Unnamed captures, in order
    pub positional: Vec<String>,
    /// Named captures such as `tiddler_name` or `bag_name`
    pub named: BTreeMap<String, String>,
}

impl RoutingArgs {
    /// Returns a named parameter.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.named.get(name).map(String::as_str)
    }

    /// Sets a named parameter, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.named.insert(name.into(), value.into());
    }
}

/// Request-scoped context passed by `&mut` through every handler layer.
///
/// One `Environ` is built per request. Mutations made by an inner layer are
/// visible to the outer layers that run after it.
///
/// # Examples
///
/// ```
/// use tiddlyweb_utils::{Environ, Method, Usersign};
///
/// let mut environ = Environ::new(Method::Get, "/bags/common")
///     .with_usersign(Usersign::named("alice"));
///
/// assert_eq!(environ.path_info(), "/bags/common");
/// assert!(environ.title().is_none());
///
/// environ.routing_args_mut().insert("bag_name", "common");
/// assert_eq!(environ.routing_args().get("bag_name"), Some("common"));
/// ```
#[derive(Debug, Clone)]
pub struct Environ {
    method: Method,
    path_info: String,
    usersign: Option<Usersign>,
    title: Option<String>,
    config: Arc<Config>,
    routing_args: RoutingArgs,
    extras: BTreeMap<String, serde_json::Value>,
}

impl Environ {
    /// Creates an environment for a request with the default configuration
    /// and no identity.
    pub fn new(method: Method, path_info: impl Into<String>) -> Self {
        Self {
            method,
            path_info: path_info.into(),
            usersign: None,
            title: None,
            config: Arc::new(Config::default()),
            routing_args: RoutingArgs::default(),
            extras: BTreeMap::new(),
        }
    }

    /// Attaches the current identity.
    pub fn with_usersign(mut self, usersign: Usersign) -> Self {
        self.usersign = Some(usersign);
        self
    }

    /// Attaches the application configuration.
    pub fn with_config(mut self, config: Arc<Config>) -> Self {
        self.config = config;
        self
    }

    /// Returns the request method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request path.
    pub fn path_info(&self) -> &str {
        &self.path_info
    }

    /// Returns the current identity, if any.
    pub fn usersign(&self) -> Option<&Usersign> {
        self.usersign.as_ref()
    }

    /// Replaces the current identity.
    pub fn set_usersign(&mut self, usersign: Option<Usersign>) {
        self.usersign = usersign;
    }

    /// Returns the page title recorded for this request.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Records the page title.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Returns the application configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the routing parameters.
    pub fn routing_args(&self) -> &RoutingArgs {
        &self.routing_args
    }

    /// Returns the routing parameters for modification.
    pub fn routing_args_mut(&mut self) -> &mut RoutingArgs {
        &mut self.routing_args
    }

    /// Returns a host-specific value.
    pub fn extra(&self, key: &str) -> Option<&serde_json::Value> {
        self.extras.get(key)
    }

    /// Stores a host-specific value.
    pub fn insert_extra(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.extras.insert(key.into(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usersign_without_roles_has_no_role() {
        let user = Usersign::named("alice");
        assert!(!user.has_role("ADMIN"));
        assert!(!user.is_guest());
    }

    #[test]
    fn usersign_without_name_is_not_guest() {
        let user = Usersign::default().with_roles(["fan"]);
        assert!(!user.is_guest());
        assert!(user.has_role("fan"));
    }

    #[test]
    fn usersign_deserializes_partial_mappings() {
        let user: Usersign = serde_json::from_str(r#"{"roles": []}"#).unwrap();
        assert_eq!(user.name, None);
        assert_eq!(user.roles, Some(Vec::new()));
    }

    #[test]
    fn environ_starts_without_identity_or_title() {
        let environ = Environ::new(Method::Post, "/recipes/default");
        assert_eq!(environ.method(), &Method::Post);
        assert!(environ.usersign().is_none());
        assert!(environ.title().is_none());
        assert!(environ.routing_args().named.is_empty());
    }

    #[test]
    fn environ_extras_hold_arbitrary_values() {
        let mut environ = Environ::new(Method::Get, "/");
        environ.insert_extra("server_host", serde_json::json!({"host": "0.0.0.0"}));
        assert_eq!(
            environ.extra("server_host").and_then(|v| v.get("host")),
            Some(&serde_json::json!("0.0.0.0"))
        );
        assert!(environ.extra("missing").is_none());
    }
}

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Access policy attached to a bag.
///
/// Every constraint is a list of user names or rules (such as `R:ADMIN`);
/// an empty list places no restriction. Attributes this model does not name
/// are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    /// The user owning the bag
    #[serde(default)]
    pub owner: Option<String>,
    /// Who may read tiddlers
    #[serde(default)]
    pub read: Vec<String>,
    /// Who may edit tiddlers
    #[serde(default)]
    pub write: Vec<String>,
    /// Who may create tiddlers
    #[serde(default)]
    pub create: Vec<String>,
    /// Who may delete tiddlers
    #[serde(default)]
    pub delete: Vec<String>,
    /// Who may change the bag itself
    #[serde(default)]
    pub manage: Vec<String>,
    /// Who may put tiddlers that need moderation
    #[serde(default)]
    pub accept: Vec<String>,
    /// Attributes outside the ones above
    #[serde(flatten)]
    pub extra: BTreeMap<String, Vec<String>>,
}

impl Policy {
    /// Sets one attribute, replacing its previous value.
    pub fn apply(&mut self, attr: PolicyAttr) {
        match attr {
            PolicyAttr::Owner(owner) => self.owner = owner,
            PolicyAttr::Read(rules) => self.read = rules,
            PolicyAttr::Write(rules) => self.write = rules,
            PolicyAttr::Create(rules) => self.create = rules,
            PolicyAttr::Delete(rules) => self.delete = rules,
            PolicyAttr::Manage(rules) => self.manage = rules,
            PolicyAttr::Accept(rules) => self.accept = rules,
            PolicyAttr::Other(key, rules) => {
                self.extra.insert(key, rules);
            }
        }
    }
}

/// A single policy attribute assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyAttr {
    /// Sets `owner`
    Owner(Option<String>),
    /// Sets `read`
    Read(Vec<String>),
    /// Sets `write`
    Write(Vec<String>),
    /// Sets `create`
    Create(Vec<String>),
    /// Sets `delete`
    Delete(Vec<String>),
    /// Sets `manage`
    Manage(Vec<String>),
    /// Sets `accept`
    Accept(Vec<String>),
    /// Sets an attribute kept in [`Policy::extra`]
    Other(String, Vec<String>),
}

impl PolicyAttr {
    /// Builds an assignment from an attribute name and its values.
    ///
    /// `owner` takes the first value, or clears the owner when there is none.
    ///
    /// # Examples
    ///
    /// ```
    /// use tiddlyweb_utils::PolicyAttr;
    ///
    /// assert_eq!(
    ///     PolicyAttr::from_pair("read", vec!["R:ADMIN".to_string()]),
    ///     PolicyAttr::Read(vec!["R:ADMIN".to_string()])
    /// );
    /// assert_eq!(
    ///     PolicyAttr::from_pair("owner", vec!["cdent".to_string()]),
    ///     PolicyAttr::Owner(Some("cdent".to_string()))
    /// );
    /// ```
    pub fn from_pair(key: &str, values: Vec<String>) -> Self {
        match key {
            "owner" => PolicyAttr::Owner(values.into_iter().next()),
            "read" => PolicyAttr::Read(values),
            "write" => PolicyAttr::Write(values),
            "create" => PolicyAttr::Create(values),
            "delete" => PolicyAttr::Delete(values),
            "manage" => PolicyAttr::Manage(values),
            "accept" => PolicyAttr::Accept(values),
            other => PolicyAttr::Other(other.to_string(), values),
        }
    }
}

/// A named container of tiddlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bag {
    name: String,
    /// Free-text description
    #[serde(default)]
    pub desc: String,
    /// Access policy
    #[serde(default)]
    pub policy: Policy,
}

impl Bag {
    /// Creates an in-memory bag with an empty description and default policy.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            desc: String::new(),
            policy: Policy::default(),
        }
    }

    /// Returns the bag name, its unique key in a store.
    pub fn name(&self) -> &str {
        &self.name
    }
}

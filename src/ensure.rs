use std::collections::BTreeMap;

use crate::bag::{Bag, PolicyAttr};
use crate::error::{Error, StoreError};
use crate::store::Store;

/// How to populate a bag that [`ensure_bag`] has to create.
///
/// None of this is applied to a bag that already exists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BagOptions {
    /// Policy assignments, applied in order after the owner defaults
    pub policy: Vec<PolicyAttr>,
    /// Description of the new bag
    pub description: String,
    /// Owner of the new bag; also becomes the sole manager
    pub owner: Option<String>,
}

impl BagOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the owner.
    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Adds one policy assignment.
    pub fn policy_attr(mut self, attr: PolicyAttr) -> Self {
        self.policy.push(attr);
        self
    }

    /// Adds policy assignments from attribute names, see [`PolicyAttr::from_pair`].
    pub fn policy_map(mut self, policy: BTreeMap<String, Vec<String>>) -> Self {
        self.policy.extend(
            policy
                .into_iter()
                .map(|(key, values)| PolicyAttr::from_pair(&key, values)),
        );
        self
    }
}

/// Makes sure a bag named `bag_name` exists in `store` and returns it.
///
/// An existing bag is returned exactly as stored: its description, owner and
/// policy are never touched. A missing bag is created from `options`: the
/// description is set; an owner (if given and non-empty) becomes both
/// `policy.owner` and the only entry of `policy.manage`; then every policy
/// assignment is applied, so an explicit `manage` overrides the owner default.
/// The new bag is saved once before it is returned.
///
/// Only [`StoreError::NoBag`] is recovered from. Any other store failure,
/// including a failure to save the new bag, propagates.
///
/// The lookup and the save are two separate store calls; callers provisioning
/// the same bag concurrently can race.
///
/// # Examples
///
/// ```
/// use tiddlyweb_utils::{ensure_bag, BagOptions, MemoryStore, PolicyAttr};
///
/// let store = MemoryStore::new();
/// let options = BagOptions::new()
///     .description("shared notes")
///     .owner("cdent")
///     .policy_attr(PolicyAttr::Read(vec!["R:MEMBER".to_string()]));
///
/// let bag = ensure_bag("notes", &store, options).unwrap();
/// assert_eq!(bag.desc, "shared notes");
/// assert_eq!(bag.policy.manage, vec!["cdent".to_string()]);
///
/// // A second call returns the stored bag and ignores the new options.
/// let again = ensure_bag("notes", &store, BagOptions::new().description("other")).unwrap();
/// assert_eq!(again, bag);
/// ```
pub fn ensure_bag(bag_name: &str, store: &dyn Store, options: BagOptions) -> Result<Bag, Error> {
    let mut bag = Bag::new(bag_name);

    match store.get_bag(bag.name()) {
        Ok(existing) => {
            tracing::debug!(bag = %bag_name, "bag already exists");
            return Ok(existing);
        }
        Err(StoreError::NoBag(_)) => {}
        Err(err) => return Err(err.into()),
    }

    let BagOptions {
        policy,
        description,
        owner,
    } = options;

    bag.desc = description;
    if let Some(owner) = owner.filter(|owner| !owner.is_empty()) {
        bag.policy.manage = vec![owner.clone()];
        bag.policy.owner = Some(owner);
    }
    for attr in policy {
        bag.policy.apply(attr);
    }

    store.put_bag(&bag)?;
    tracing::info!(bag = %bag_name, owner = ?bag.policy.owner, "created bag");

    Ok(bag)
}

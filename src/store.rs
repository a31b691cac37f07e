//! Store collaborator: the persistence interface, an in-memory backend and
//! backend selection from configuration.

use std::collections::BTreeMap;
use std::fmt;

use parking_lot::RwLock;
use serde_json::{Map, Value};

use crate::bag::Bag;
use crate::config::Config;
use crate::error::{Error, StoreError};

/// Persistent storage for bags.
pub trait Store: Send + Sync {
    /// Fetches a bag by name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoBag`] when no bag has that name; any other
    /// error means the backend itself failed.
    fn get_bag(&self, name: &str) -> Result<Bag, StoreError>;

    /// Saves a bag, replacing any bag with the same name.
    fn put_bag(&self, bag: &Bag) -> Result<(), StoreError>;
}

/// A store holding bags in process memory.
///
/// # Examples
///
/// ```
/// use tiddlyweb_utils::{Bag, MemoryStore, Store, StoreError};
///
/// let store = MemoryStore::new();
/// assert_eq!(store.get_bag("common"), Err(StoreError::NoBag("common".to_string())));
///
/// store.put_bag(&Bag::new("common")).unwrap();
/// assert_eq!(store.get_bag("common").unwrap().name(), "common");
/// ```
#[derive(Default)]
pub struct MemoryStore {
    bags: RwLock<BTreeMap<String, Bag>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored bags.
    pub fn len(&self) -> usize {
        self.bags.read().len()
    }

    /// Returns true if no bag is stored.
    pub fn is_empty(&self) -> bool {
        self.bags.read().is_empty()
    }

    /// Returns the names of all stored bags, sorted.
    pub fn bag_names(&self) -> Vec<String> {
        self.bags.read().keys().cloned().collect()
    }
}

impl Store for MemoryStore {
    fn get_bag(&self, name: &str) -> Result<Bag, StoreError> {
        self.bags
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NoBag(name.to_string()))
    }

    fn put_bag(&self, bag: &Bag) -> Result<(), StoreError> {
        self.bags
            .write()
            .insert(bag.name().to_string(), bag.clone());
        Ok(())
    }
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore")
            .field("bags", &self.bag_names())
            .finish()
    }
}

/// Opens a store backend from its configured options.
///
/// The whole application configuration is passed along so a backend can read
/// settings outside `server_store`.
pub type StoreFactory =
    fn(&Map<String, Value>, &Config) -> Result<Box<dyn Store>, StoreError>;

fn open_memory(
    _options: &Map<String, Value>,
    _config: &Config,
) -> Result<Box<dyn Store>, StoreError> {
    Ok(Box::new(MemoryStore::new()))
}

/// Backend name to factory lookup used by [`get_store`].
///
/// A new registry knows the `"memory"` backend; hosts register their own.
#[derive(Clone)]
pub struct StoreRegistry {
    factories: BTreeMap<String, StoreFactory>,
}

impl StoreRegistry {
    /// Creates a registry with the built-in backends.
    pub fn new() -> Self {
        let mut registry = Self {
            factories: BTreeMap::new(),
        };
        registry.register("memory", open_memory);
        registry
    }

    /// Registers a backend, replacing any factory already under that name.
    pub fn register(&mut self, backend: impl Into<String>, factory: StoreFactory) {
        self.factories.insert(backend.into(), factory);
    }

    /// Returns the registered backend names, sorted.
    pub fn backends(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Opens `backend` with `options` on behalf of `config`.
    pub fn open(
        &self,
        backend: &str,
        options: &Map<String, Value>,
        config: &Config,
    ) -> Result<Box<dyn Store>, StoreError> {
        let factory = self
            .factories
            .get(backend)
            .ok_or_else(|| StoreError::UnknownBackend(backend.to_string()))?;
        factory(options, config)
    }
}

impl Default for StoreRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StoreRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreRegistry")
            .field("backends", &self.backends())
            .finish()
    }
}

/// Opens the store named by the configuration's `server_store` setting.
///
/// # Examples
///
/// ```
/// use tiddlyweb_utils::{get_store, Config, Store, StoreRegistry};
///
/// let store = get_store(&Config::default(), &StoreRegistry::new()).unwrap();
/// assert!(store.get_bag("anything").is_err());
/// ```
pub fn get_store(config: &Config, registry: &StoreRegistry) -> Result<Box<dyn Store>, Error> {
    let server_store = &config.server_store;
    tracing::debug!(backend = %server_store.backend, "opening store");
    Ok(registry.open(&server_store.backend, &server_store.options, config)?)
}

//! Item loading: the storage collaborator used to follow relation hops.
//!
//! [`ItemLoader`] is the seam to the storage layer. Provided implementations:
//! - [`MemoryLoader`]: in-memory store for tests and fixtures
//! - [`CachedLoader`](crate::cache::CachedLoader): TTL cache around any loader

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;

use crate::error::LoadError;
use crate::item::{Item, ItemKey};

/// Boxed future returned by [`ItemLoader::load`].
pub type LoadFuture<'a> = Pin<Box<dyn Future<Output = Result<Option<Item>, LoadError>> + Send + 'a>>;

/// Fetch a stored item by resource type and key.
///
/// Returns `Ok(None)` when the item does not exist. `Err` is reserved for
/// failures of the store itself. Implementations must be safe to call
/// concurrently; ownership resolution only ever reads.
pub trait ItemLoader: Send + Sync + 'static {
    fn load(&self, resource: &str, key: ItemKey) -> LoadFuture<'_>;
}

impl<L: ItemLoader + ?Sized> ItemLoader for Arc<L> {
    fn load(&self, resource: &str, key: ItemKey) -> LoadFuture<'_> {
        (**self).load(resource, key)
    }
}

// ── MemoryLoader ───────────────────────────────────────────────────────

/// In-memory item store.
///
/// Clones share the same underlying map.
///
/// # Example
///
/// ```
/// use warden_core::{Item, MemoryLoader};
///
/// let store = MemoryLoader::new();
/// store.insert("forwards", 9, Item::new().with("owner_id", 3));
/// assert_eq!(store.len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct MemoryLoader {
    items: Arc<DashMap<(String, ItemKey), Item>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a JSON fixture of the form
    /// `{ "<resource>": [ { "id": 1, ... }, ... ] }`.
    ///
    /// Items without a readable `id` are rejected.
    pub fn from_json(fixture: Value) -> Result<Self, LoadError> {
        let store = Self::new();
        let resources = match fixture {
            Value::Object(resources) => resources,
            _ => return Err(LoadError::Backend("fixture must be a JSON object".into())),
        };
        for (resource, items) in resources {
            let items = match items {
                Value::Array(items) => items,
                _ => {
                    return Err(LoadError::Backend(format!(
                        "fixture entry '{resource}' must be an array"
                    )))
                }
            };
            for value in items {
                let item = Item::from_json(value).ok_or_else(|| {
                    LoadError::Backend(format!("fixture entry '{resource}' holds a non-object"))
                })?;
                if store.insert_item(&resource, item).is_none() {
                    return Err(LoadError::Backend(format!(
                        "fixture item in '{resource}' has no readable id"
                    )));
                }
            }
        }
        Ok(store)
    }

    /// Store `item` under `(resource, key)`, replacing any previous item.
    pub fn insert(&self, resource: &str, key: ItemKey, item: Item) {
        self.items.insert((resource.to_string(), key), item);
    }

    /// Store `item` under its own `id` field. Returns the key used.
    pub fn insert_item(&self, resource: &str, item: Item) -> Option<ItemKey> {
        let key = item.key()?;
        self.insert(resource, key, item);
        Some(key)
    }

    pub fn remove(&self, resource: &str, key: ItemKey) -> Option<Item> {
        self.items
            .remove(&(resource.to_string(), key))
            .map(|(_, item)| item)
    }

    pub fn get(&self, resource: &str, key: ItemKey) -> Option<Item> {
        self.items
            .get(&(resource.to_string(), key))
            .map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl ItemLoader for MemoryLoader {
    fn load(&self, resource: &str, key: ItemKey) -> LoadFuture<'_> {
        let item = self.get(resource, key);
        Box::pin(async move { Ok(item) })
    }
}

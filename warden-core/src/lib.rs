//! Policy model for Warden.
//!
//! A [`Policy`] pairs a [`DescriptorRegistry`] (per-resource method tiers and
//! ownership paths) with a [`RoleGrantTable`]. Policies are built once, either
//! in code through [`PolicyBuilder`] or from a YAML document through
//! [`PolicyConfig`], and are immutable afterwards. Building validates the
//! whole policy and reports every problem at once:
//!
//! ```
//! use warden_core::{Method, OwnershipPath, Policy, ResourceAccessDescriptor};
//!
//! let policy = Policy::builder()
//!     .resource(ResourceAccessDescriptor::new("events").public([Method::Get]))
//!     .resource(
//!         ResourceAccessDescriptor::new("forwards")
//!             .owner([Method::Get, Method::Delete])
//!             .owner_path(OwnershipPath::field_only("owner_id")),
//!     )
//!     .grant("event-admin", "events", [Method::Post, Method::Delete])
//!     .build()
//!     .unwrap();
//!
//! assert!(policy.roles().is_granted("event-admin", "events", Method::Delete));
//! ```
//!
//! Items are read through the [`ItemLoader`] trait when an ownership path
//! crosses a relation. [`MemoryLoader`] covers tests and fixtures;
//! [`CachedLoader`] puts a TTL cache in front of any loader.

pub mod cache;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod identity;
pub mod item;
pub mod loader;
pub mod method;
pub mod policy;
pub mod roles;

pub use cache::CachedLoader;
pub use config::PolicyConfig;
pub use descriptor::{
    DescriptorRegistry, Hop, OwnershipPath, ResourceAccessDescriptor, DEFAULT_AUTHOR_FIELD,
    MAX_PATH_HOPS,
};
pub use error::{ConfigError, ConfigIssue, LoadError};
pub use identity::{AuthenticatedUser, Identity, RoleAssignment};
pub use item::{Item, ItemKey, UserId, ID_FIELD};
pub use loader::{ItemLoader, LoadFuture, MemoryLoader};
pub use method::{Method, MethodSet, UnknownMethod};
pub use policy::{Policy, PolicyBuilder};
pub use roles::RoleGrantTable;

pub mod prelude {
    //! Re-exports of the most commonly used policy types.
    pub use crate::{
        AuthenticatedUser, Identity, Item, ItemLoader, Method, OwnershipPath, Policy,
        ResourceAccessDescriptor,
    };
}

//! Authorization decisions for Warden policies.
//!
//! [`Authorizer`] combines the method tiers of a resource descriptor, the
//! ownership paths of the targeted item and the caller's active role
//! assignments into a single [`Verdict`].
//!
//! ```ignore
//! use warden_engine::{Authorizer, PolicyHandle};
//! use warden_core::{AuthenticatedUser, Item, MemoryLoader, Method};
//!
//! let policy = PolicyHandle::from_file("policy.yaml")?;
//! let store = MemoryLoader::new();
//! store.insert("forwards", 9, Item::new().with("owner_id", 3));
//!
//! let authorizer = Authorizer::new(policy.clone(), store);
//! let user = AuthenticatedUser::new(3);
//! let item = Item::new().with("user_id", 5).with("forward_id", 9);
//!
//! let verdict = authorizer
//!     .authorize(Some(&user), Method::Delete, "forwardusers", Some(&item))
//!     .await?;
//! assert!(verdict.is_allowed());
//!
//! // Later: swap the whole policy without stopping readers.
//! policy.reload_from_file("policy.yaml")?;
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod handle;
pub mod resolver;
pub mod verdict;

pub use config::EngineConfig;
pub use engine::Authorizer;
pub use error::PolicyError;
pub use handle::PolicyHandle;
pub use resolver::OwnershipResolver;
pub use verdict::{Reason, Verdict};

pub mod prelude {
    //! Re-exports of the most commonly used engine types.
    pub use crate::{Authorizer, EngineConfig, PolicyError, PolicyHandle, Reason, Verdict};
}

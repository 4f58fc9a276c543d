//! Warden: owner-aware, role-based authorization for resource APIs.
//!
//! This facade crate re-exports the policy model and the decision engine
//! through a single dependency:
//!
//! ```ignore
//! use warden::prelude::*;
//!
//! let authorizer = Authorizer::new(PolicyHandle::from_file("policy.yaml")?, store);
//! let verdict = authorizer
//!     .authorize(Some(&user), Method::Get, "forwards", Some(&item))
//!     .await?;
//! ```
//!
//! | Crate           | Contents                                                    |
//! |-----------------|-------------------------------------------------------------|
//! | `warden-core`   | descriptors, ownership paths, role grants, YAML policies, item loaders |
//! | `warden-engine` | ownership resolution, the decision engine, atomic policy reload |

pub extern crate warden_core;
pub extern crate warden_engine;

pub use warden_core::*;
pub use warden_engine::{
    Authorizer, EngineConfig, OwnershipResolver, PolicyError, PolicyHandle, Reason, Verdict,
};

pub mod prelude {
    //! Everything needed to load a policy and authorize requests.
    pub use warden_core::prelude::*;
    pub use warden_core::{MemoryLoader, PolicyConfig};
    pub use warden_engine::prelude::*;
}

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::json;
use warden_core::{
    AuthenticatedUser, Item, ItemKey, ItemLoader, LoadError, LoadFuture, MemoryLoader, Method,
    OwnershipPath, Policy, ResourceAccessDescriptor,
};
use warden_engine::{Authorizer, EngineConfig, PolicyError, Reason};

/// Delegates to a memory store but fails every load of one resource type.
struct FailingLoader {
    inner: MemoryLoader,
    broken: &'static str,
}

impl ItemLoader for FailingLoader {
    fn load(&self, resource: &str, key: ItemKey) -> LoadFuture<'_> {
        if resource == self.broken {
            return Box::pin(async { Err(LoadError::Backend("connection reset".into())) });
        }
        self.inner.load(resource, key)
    }
}

/// Counts how often the backing store is hit.
#[derive(Clone)]
struct CountingLoader {
    inner: MemoryLoader,
    calls: Arc<AtomicUsize>,
}

impl ItemLoader for CountingLoader {
    fn load(&self, resource: &str, key: ItemKey) -> LoadFuture<'_> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.load(resource, key)
    }
}

fn policy() -> Policy {
    Policy::builder()
        .resource(
            ResourceAccessDescriptor::new("forwards")
                .owner([Method::Get, Method::Delete])
                .owner_path(OwnershipPath::field_only("owner_id")),
        )
        .resource(
            ResourceAccessDescriptor::new("forwardusers")
                .owner([Method::Delete])
                .owner_path(OwnershipPath::field_only("user_id"))
                .owner_path(
                    OwnershipPath::new()
                        .relation("forward", "forwards")
                        .field("owner_id"),
                ),
        )
        .resource(
            ResourceAccessDescriptor::new("events")
                .owner([Method::Patch])
                .owner_path(OwnershipPath::field_only("organizer_id")),
        )
        .resource(
            ResourceAccessDescriptor::new("signupnotes")
                .owner([Method::Get])
                .owner_path(
                    OwnershipPath::new()
                        .relation_via("signup", "forwardusers", "signup")
                        .relation("forward", "forwards")
                        .field("owner_id"),
                ),
        )
        .build()
        .unwrap()
}

fn store() -> MemoryLoader {
    MemoryLoader::from_json(json!({
        "forwards": [
            { "id": 9, "owner_id": 3 },
            { "id": 10, "owner_id": null }
        ],
        "forwardusers": [
            { "id": 40, "user_id": 5, "forward_id": 9 }
        ]
    }))
    .unwrap()
}

#[tokio::test]
async fn test_dangling_relation_fails_closed() {
    let authorizer = Authorizer::new(policy(), store());
    let item = Item::new().with("user_id", 5).with("forward_id", 77);
    let user = AuthenticatedUser::new(3);

    let verdict = authorizer
        .authorize(Some(&user), Method::Delete, "forwardusers", Some(&item))
        .await
        .unwrap();
    assert_eq!(verdict.reason, Reason::Forbidden);
}

#[tokio::test]
async fn test_null_owner_on_related_item_is_a_miss() {
    let authorizer = Authorizer::new(policy(), store());
    let item = Item::new().with("forward_id", 10);
    let user = AuthenticatedUser::new(3);

    let verdict = authorizer
        .authorize(Some(&user), Method::Delete, "forwardusers", Some(&item))
        .await
        .unwrap();
    assert!(!verdict.is_allowed());
}

#[tokio::test]
async fn test_two_relation_hops() {
    let authorizer = Authorizer::new(policy(), store());
    let note = Item::new().with("id", 1).with("signup", 40);

    let verdict = authorizer
        .authorize(Some(&AuthenticatedUser::new(3)), Method::Get, "signupnotes", Some(&note))
        .await
        .unwrap();
    assert_eq!(verdict.reason, Reason::Owner);

    // The subscriber owns the signup but not the forward behind it.
    let verdict = authorizer
        .authorize(Some(&AuthenticatedUser::new(5)), Method::Get, "signupnotes", Some(&note))
        .await
        .unwrap();
    assert_eq!(verdict.reason, Reason::Forbidden);
}

#[tokio::test]
async fn test_optional_owner_field_absent() {
    // External signups carry no user.
    let authorizer = Authorizer::new(policy(), store());
    let event = Item::new().with("id", 1);
    let verdict = authorizer
        .authorize(Some(&AuthenticatedUser::new(3)), Method::Patch, "events", Some(&event))
        .await
        .unwrap();
    assert_eq!(verdict.reason, Reason::Forbidden);
}

#[tokio::test]
async fn test_store_failure_surfaces_as_lookup_error() {
    let loader = FailingLoader {
        inner: store(),
        broken: "forwards",
    };
    let authorizer = Authorizer::new(policy(), loader);
    let item = Item::new().with("user_id", 5).with("forward_id", 9);

    let err = authorizer
        .authorize(Some(&AuthenticatedUser::new(3)), Method::Delete, "forwardusers", Some(&item))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        PolicyError::Lookup(LoadError::Backend("connection reset".into()))
    );
}

#[tokio::test]
async fn test_store_failure_does_not_hide_other_path() {
    let loader = FailingLoader {
        inner: store(),
        broken: "forwards",
    };
    let authorizer = Authorizer::new(policy(), loader);
    let item = Item::new().with("user_id", 5).with("forward_id", 9);

    let verdict = authorizer
        .authorize(Some(&AuthenticatedUser::new(5)), Method::Delete, "forwardusers", Some(&item))
        .await
        .unwrap();
    assert_eq!(verdict.reason, Reason::Owner);
}

#[tokio::test]
async fn test_fanout_bound_fails_closed() {
    let loader = store();
    for key in 100..140 {
        loader.insert("forwards", key, Item::new().with("id", key).with("owner_id", 100));
    }
    let keys: Vec<i64> = (100..140).collect();
    let item = Item::new().with("forward_id", keys);
    let user = AuthenticatedUser::new(100);

    let bounded = Authorizer::new(policy(), loader.clone());
    let verdict = bounded
        .authorize(Some(&user), Method::Delete, "forwardusers", Some(&item))
        .await
        .unwrap();
    assert_eq!(verdict.reason, Reason::Forbidden);

    let relaxed = Authorizer::with_config(
        policy(),
        loader,
        EngineConfig::default().with_max_fanout(64),
    )
    .unwrap();
    let verdict = relaxed
        .authorize(Some(&user), Method::Delete, "forwardusers", Some(&item))
        .await
        .unwrap();
    assert_eq!(verdict.reason, Reason::Owner);
}

#[tokio::test]
async fn test_public_and_registered_never_load() {
    let calls = Arc::new(AtomicUsize::new(0));
    let loader = CountingLoader {
        inner: store(),
        calls: calls.clone(),
    };
    let policy = Policy::builder()
        .resource(
            ResourceAccessDescriptor::new("forwardusers")
                .public([Method::Get])
                .registered([Method::Patch])
                .owner([Method::Get, Method::Patch, Method::Delete])
                .owner_path(
                    OwnershipPath::new()
                        .relation("forward", "forwards")
                        .field("owner_id"),
                ),
        )
        .resource(ResourceAccessDescriptor::new("forwards"))
        .build()
        .unwrap();
    let authorizer = Authorizer::new(policy, loader);
    let item = Item::new().with("forward_id", 9);
    let user = AuthenticatedUser::new(3);

    authorizer
        .authorize(None, Method::Get, "forwardusers", Some(&item))
        .await
        .unwrap();
    authorizer
        .authorize(Some(&user), Method::Patch, "forwardusers", Some(&item))
        .await
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    authorizer
        .authorize(Some(&user), Method::Delete, "forwardusers", Some(&item))
        .await
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_item_cache_serves_repeat_lookups() {
    let calls = Arc::new(AtomicUsize::new(0));
    let loader = CountingLoader {
        inner: store(),
        calls: calls.clone(),
    };
    let authorizer = Authorizer::with_config(
        policy(),
        loader,
        EngineConfig::default().with_cache(true, 60),
    )
    .unwrap();
    let item = Item::new().with("forward_id", 9);
    let user = AuthenticatedUser::new(3);

    for _ in 0..3 {
        let verdict = authorizer
            .authorize(Some(&user), Method::Delete, "forwardusers", Some(&item))
            .await
            .unwrap();
        assert_eq!(verdict.reason, Reason::Owner);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_invalid_engine_config_is_rejected() {
    let result = Authorizer::with_config(policy(), store(), EngineConfig::default().with_max_hops(0));
    assert!(matches!(result, Err(PolicyError::InvalidConfig(_))));
}

#[tokio::test]
async fn test_store_failure_does_not_block_role_grant() {
    let policy = Policy::builder()
        .resource(
            ResourceAccessDescriptor::new("forwardusers")
                .owner([Method::Delete])
                .owner_path(
                    OwnershipPath::new()
                        .relation("forward", "forwards")
                        .field("owner_id"),
                ),
        )
        .resource(ResourceAccessDescriptor::new("forwards"))
        .grant("mail-admin", "forwardusers", [Method::Delete])
        .build()
        .unwrap();
    let loader = FailingLoader {
        inner: store(),
        broken: "forwards",
    };
    let authorizer = Authorizer::new(policy, loader);
    let item = Item::new().with("forward_id", 9);

    let admin = AuthenticatedUser::new(8).with_role("mail-admin");
    let verdict = authorizer
        .authorize(Some(&admin), Method::Delete, "forwardusers", Some(&item))
        .await
        .unwrap();
    assert_eq!(verdict.reason, Reason::RoleGrant("mail-admin".into()));

    // Without a granting role the store failure is still reported.
    let err = authorizer
        .authorize(Some(&AuthenticatedUser::new(8)), Method::Delete, "forwardusers", Some(&item))
        .await
        .unwrap_err();
    assert!(matches!(err, PolicyError::Lookup(_)));
}

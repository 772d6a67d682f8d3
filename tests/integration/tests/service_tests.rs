//! Entity service integration tests
//!
//! Exercise the service contract end to end through the service context,
//! with in-memory sources capturing every state change.
//!
//! Run with: cargo test -p integration-tests --test service_tests

use std::collections::HashSet;
use std::time::Duration;

use chrono::Utc;
use integration_tests::{fixtures::*, TestHarness};
use social_core::{
    Consumer, Counts, Entity, Lifecycle, ReactionQuery, ReactionService, ReactionType, Service,
    UserQuery, UserService,
};

// ============================================================================
// Entity & Filter Tests
// ============================================================================

#[test]
fn test_reaction_validation_rules() {
    for kind in ReactionType::ALL {
        assert!(reaction(1, 1, kind).validate().is_ok());
        assert!(reaction(0, 1, kind).validate().is_err());
        assert!(reaction(1, 0, kind).validate().is_err());
    }

    // Types outside the closed set cannot be represented
    assert!(ReactionType::try_from(0u8).is_err());
    assert!(ReactionType::try_from(7u8).is_err());
    let decoded = serde_json::from_str::<social_core::Reaction>(
        r#"{"object_id":1,"owner_id":1,"type":"meh"}"#,
    );
    assert!(decoded.is_err());
}

#[test]
fn test_empty_options_match_everything() {
    for r in reaction_batch() {
        assert!(r.matches(&ReactionQuery::default()));
    }
    assert!(unique_user().matches(&UserQuery::default()));
}

#[test]
fn test_single_type_option() {
    for r in reaction_batch() {
        for t in ReactionType::ALL {
            let opts = ReactionQuery {
                types: vec![t],
                ..ReactionQuery::default()
            };
            assert_eq!(r.matches(&opts), r.kind == t);
        }
    }
}

// ============================================================================
// Put / Query Tests
// ============================================================================

#[tokio::test]
async fn test_put_then_query_round_trip() {
    let harness = TestHarness::new().unwrap();
    let ns = unique_namespace();
    let input = reaction(42, 7, ReactionType::Love);

    let stored = harness.ctx.reactions().put(&ns, input.clone()).await.unwrap();

    let opts = ReactionQuery {
        ids: vec![stored.id],
        ..ReactionQuery::default()
    };
    let found = harness.ctx.reactions().query(&ns, &opts).await.unwrap();

    assert_eq!(found.len(), 1);
    let found = &found[0];
    assert_ne!(found.id, 0);
    assert!(found.created_at.is_some());
    assert!(found.updated_at.is_some());
    assert_eq!(
        social_core::Reaction {
            id: 0,
            created_at: None,
            updated_at: None,
            ..found.clone()
        },
        input
    );
}

#[tokio::test]
async fn test_user_round_trip() {
    let harness = TestHarness::with_logging().unwrap();
    let ns = unique_namespace();
    let input = user("alice").with_social_id("twitter", "tw-1");

    let stored = harness.ctx.users().put(&ns, input).await.unwrap();

    let opts = UserQuery {
        social_ids: [("twitter".to_string(), vec!["tw-1".to_string()])].into(),
        ..UserQuery::default()
    };
    let found = harness.ctx.users().query(&ns, &opts).await.unwrap();
    assert_eq!(found, vec![stored]);
}

#[tokio::test]
async fn test_update_preserves_created_at() {
    let harness = TestHarness::new().unwrap();
    let ns = unique_namespace();
    let reactions = harness.ctx.reactions();

    let created = reactions
        .put(&ns, reaction(1, 2, ReactionType::Like))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;

    let mut changed = created.clone();
    changed.kind = ReactionType::Haha;
    changed.created_at = Some(Utc::now() - chrono::Duration::days(30));
    let updated = reactions.put(&ns, changed).await.unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at > created.updated_at);
    assert_eq!(updated.kind, ReactionType::Haha);
}

#[tokio::test]
async fn test_update_of_unknown_id_is_not_found() {
    let harness = TestHarness::new().unwrap();
    let ns = unique_namespace();

    let ghost = social_core::Reaction {
        id: 123_456,
        ..reaction(1, 2, ReactionType::Like)
    };
    let err = harness.ctx.reactions().put(&ns, ghost).await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(harness.reaction_source.pending(), 0);
}

#[tokio::test]
async fn test_query_is_ordered_by_recency() {
    let harness = TestHarness::new().unwrap();
    let ns = unique_namespace();
    let reactions = harness.ctx.reactions();

    let mut stored = Vec::new();
    for r in reaction_batch() {
        stored.push(reactions.put(&ns, r).await.unwrap());
    }
    // Touch an early one so it becomes the most recent
    let mut touched = stored[0].clone();
    touched.mark_deleted();
    let touched = reactions.put(&ns, touched).await.unwrap();

    let found = reactions.query(&ns, &ReactionQuery::default()).await.unwrap();

    assert_eq!(found.len(), stored.len());
    assert_eq!(found[0].id, touched.id);
    assert!(found
        .windows(2)
        .all(|pair| pair[0].updated_at >= pair[1].updated_at));
}

#[tokio::test]
async fn test_returned_entities_are_copies() {
    let harness = TestHarness::new().unwrap();
    let ns = unique_namespace();
    let reactions = harness.ctx.reactions();

    let mut stored = reactions
        .put(&ns, reaction(1, 2, ReactionType::Like))
        .await
        .unwrap();
    stored.mark_deleted();

    let found = reactions.query(&ns, &ReactionQuery::default()).await.unwrap();
    assert!(!found[0].deleted);
}

// ============================================================================
// Count / CountMulti Tests
// ============================================================================

#[tokio::test]
async fn test_count_multi_sums_to_count() {
    let harness = TestHarness::new().unwrap();
    let ns = unique_namespace();
    let reactions = harness.ctx.reactions();

    let mut stored = Vec::new();
    for r in reaction_batch() {
        stored.push(reactions.put(&ns, r).await.unwrap());
    }
    let mut deleted = stored[1].clone();
    deleted.mark_deleted();
    reactions.put(&ns, deleted).await.unwrap();

    let filters = [
        ReactionQuery::default(),
        ReactionQuery::active_on(vec![1, 2, 3]),
        ReactionQuery {
            deleted: Some(true),
            ..ReactionQuery::default()
        },
        ReactionQuery {
            types: vec![ReactionType::Like, ReactionType::Wow],
            ..ReactionQuery::default()
        },
        ReactionQuery {
            owner_ids: vec![10, 11],
            object_ids: vec![2],
            ..ReactionQuery::default()
        },
    ];

    for opts in filters {
        let counts = reactions.count_multi(&ns, &opts).await.unwrap();
        let count = reactions.count(&ns, &opts).await.unwrap();
        let sum: u64 = counts.values().map(Counts::total).sum();
        assert_eq!(sum, count as u64, "{opts:?}");
    }
}

#[tokio::test]
async fn test_count_multi_tallies_by_type() {
    let harness = TestHarness::new().unwrap();
    let ns = unique_namespace();
    let reactions = harness.ctx.reactions();

    for (owner_id, kind) in [
        (1, ReactionType::Like),
        (2, ReactionType::Like),
        (3, ReactionType::Angry),
    ] {
        reactions.put(&ns, reaction(500, owner_id, kind)).await.unwrap();
    }

    let counts = reactions
        .count_multi(&ns, &ReactionQuery::active_on(vec![500]))
        .await
        .unwrap();

    assert_eq!(counts.len(), 1);
    assert_eq!(counts[&500].like, 2);
    assert_eq!(counts[&500].angry, 1);
    assert_eq!(counts[&500].total(), 3);
}

// ============================================================================
// Search Tests
// ============================================================================

async fn seed_users(harness: &TestHarness, ns: &str, names: &[&str]) {
    for name in names {
        harness.ctx.users().put(ns, user(name)).await.unwrap();
    }
}

#[tokio::test]
async fn test_search_ranks_by_edit_distance() {
    let harness = TestHarness::new().unwrap();

    for order in [
        ["alice", "alicia", "bob"],
        ["bob", "alice", "alicia"],
        ["alicia", "bob", "alice"],
    ] {
        let ns = unique_namespace();
        seed_users(&harness, &ns, &order).await;

        let found = harness
            .ctx
            .users()
            .search(&ns, &UserQuery::search("ali"))
            .await
            .unwrap();

        let names: Vec<&str> = found.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["alice", "alicia", "bob"], "seeded as {order:?}");
    }
}

#[tokio::test]
async fn test_search_equal_rank_keeps_recency_order() {
    let harness = TestHarness::new().unwrap();
    let ns = unique_namespace();
    seed_users(&harness, &ns, &["bob", "tom"]).await;

    let found = harness
        .ctx
        .users()
        .search(&ns, &UserQuery::search("ali"))
        .await
        .unwrap();

    let names: Vec<&str> = found.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, vec!["tom", "bob"]);
}

#[tokio::test]
async fn test_search_applies_no_distance_threshold() {
    let harness = TestHarness::new().unwrap();
    let ns = unique_namespace();
    seed_users(&harness, &ns, &["alice", "zyxwvutsrqponm"]).await;

    let found = harness
        .ctx
        .users()
        .search(&ns, &UserQuery::search("ali"))
        .await
        .unwrap();

    assert_eq!(found.len(), 2);
    assert_eq!(found[1].username, "zyxwvutsrqponm");
}

#[tokio::test]
async fn test_search_pagination() {
    let harness = TestHarness::new().unwrap();
    let ns = unique_namespace();
    seed_users(&harness, &ns, &["bob", "alice", "alicia"]).await;
    let users = harness.ctx.users();

    let page = users
        .search(
            &ns,
            &UserQuery {
                offset: 1,
                limit: Some(2),
                ..UserQuery::search("ali")
            },
        )
        .await
        .unwrap();
    let names: Vec<&str> = page.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, vec!["alicia", "bob"]);

    let past_end = users
        .search(
            &ns,
            &UserQuery {
                offset: 4,
                limit: Some(10),
                ..UserQuery::search("ali")
            },
        )
        .await
        .unwrap();
    assert!(past_end.is_empty());

    let err = users
        .search(
            &ns,
            &UserQuery {
                offset: 2,
                limit: Some(5),
                ..UserQuery::search("ali")
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_QUERY");
}

#[tokio::test]
async fn test_search_rejects_empty_text() {
    let harness = TestHarness::new().unwrap();
    let err = harness
        .ctx
        .users()
        .search(&unique_namespace(), &UserQuery::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_QUERY");
}

// ============================================================================
// Lifecycle Tests
// ============================================================================

#[tokio::test]
async fn test_teardown_then_setup_is_empty() {
    let harness = TestHarness::new().unwrap();
    let ns = unique_namespace();
    let reactions = harness.ctx.reactions();

    reactions
        .put(&ns, reaction(1, 2, ReactionType::Like))
        .await
        .unwrap();

    reactions.teardown(&ns).await.unwrap();
    reactions.setup(&ns).await.unwrap();

    assert_eq!(reactions.count(&ns, &ReactionQuery::default()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_lifecycle_is_idempotent() {
    let harness = TestHarness::new().unwrap();
    let ns = unique_namespace();

    harness.ctx.teardown(&ns).await.unwrap();
    harness.ctx.setup(&ns).await.unwrap();
    harness.ctx.setup(&ns).await.unwrap();
    harness.ctx.teardown(&ns).await.unwrap();
    harness.ctx.teardown(&ns).await.unwrap();
}

// ============================================================================
// Concurrency Tests
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_puts_assign_distinct_ids() {
    const N: u64 = 200;

    let harness = TestHarness::new().unwrap();
    let ns = unique_namespace();

    let mut handles = Vec::new();
    for i in 0..N {
        let reactions = harness.ctx.reactions();
        let ns = ns.clone();
        handles.push(tokio::spawn(async move {
            reactions
                .put(&ns, reaction(i + 1, 1, ReactionType::Like))
                .await
                .map(|r| r.id)
        }));
    }

    let mut ids = HashSet::new();
    for handle in handles {
        ids.insert(handle.await.unwrap().unwrap());
    }

    assert_eq!(ids.len(), N as usize);
    let count = harness
        .ctx
        .reactions()
        .count(&ns, &ReactionQuery::default())
        .await
        .unwrap();
    assert_eq!(count, N as usize);
    assert_eq!(harness.reaction_source.pending(), N as usize);
}

// ============================================================================
// Change Notification Tests
// ============================================================================

#[tokio::test]
async fn test_every_write_is_one_state_change() {
    let harness = TestHarness::new().unwrap();
    let ns = unique_namespace();
    let reactions = harness.ctx.reactions();

    let created = reactions
        .put(&ns, reaction(1, 2, ReactionType::Like))
        .await
        .unwrap();
    let mut deleted = created.clone();
    deleted.mark_deleted();
    let deleted = reactions.put(&ns, deleted).await.unwrap();

    let first = harness.reaction_source.consume().await.unwrap();
    assert!(first.is_creation());
    assert_eq!(first.new, created);

    let second = harness.reaction_source.consume().await.unwrap();
    assert_eq!(second.old.as_ref(), Some(&created));
    assert_eq!(second.new, deleted);
    assert!(second.new.deleted);

    assert_eq!(harness.reaction_source.pending(), 0);
}

#[tokio::test]
async fn test_put_fails_when_source_closed_but_write_persists() {
    let harness = TestHarness::new().unwrap();
    let ns = unique_namespace();
    harness.user_source.close();

    let err = harness.ctx.users().put(&ns, user("carol")).await.unwrap_err();
    assert!(err.is_transport());

    let stored = harness
        .ctx
        .users()
        .query(
            &ns,
            &UserQuery {
                usernames: vec!["carol".to_string()],
                ..UserQuery::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
}

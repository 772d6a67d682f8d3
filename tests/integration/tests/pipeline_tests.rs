//! Change notification pipeline tests
//!
//! Writes go through the services, the worker consumes the resulting state
//! changes, and its projection must agree with the service's own counts.
//!
//! The Redis test requires a running Redis instance and `REDIS_URL`.
//!
//! Run with: cargo test -p integration-tests --test pipeline_tests

use std::sync::Arc;
use std::time::Duration;

use integration_tests::{fixtures::*, redis_url, TestHarness};
use social_cache::{RedisPool, RedisPoolConfig, RedisStreamSource};
use social_common::StreamConfig;
use social_core::{
    Consumer, Producer, Reaction, ReactionQuery, ReactionService, ReactionType, Service, Source,
};
use social_service::{chain, source_logging};
use social_worker::{CountsProjection, Worker};

async fn drain(worker: &Worker, harness: &TestHarness) {
    while harness.reaction_source.pending() > 0 {
        worker.process_one().await.unwrap();
    }
}

#[tokio::test]
async fn test_projection_matches_count_multi() {
    let harness = TestHarness::new().unwrap();
    let ns = unique_namespace();
    let reactions = harness.ctx.reactions();
    let worker = Worker::new(
        Arc::new(harness.reaction_source.clone()),
        Arc::new(CountsProjection::new()),
    );

    let mut stored = Vec::new();
    for r in reaction_batch() {
        stored.push(reactions.put(&ns, r).await.unwrap());
    }
    let mut deleted = stored[0].clone();
    deleted.mark_deleted();
    reactions.put(&ns, deleted).await.unwrap();
    let mut retyped = stored[1].clone();
    retyped.kind = ReactionType::Angry;
    reactions.put(&ns, retyped).await.unwrap();

    drain(&worker, &harness).await;

    let expected = reactions
        .count_multi(
            &ns,
            &ReactionQuery {
                deleted: Some(false),
                ..ReactionQuery::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(worker.projection().namespace(&ns), expected);
    assert_eq!(harness.reaction_source.in_flight(), 0);
}

#[tokio::test]
async fn test_redelivery_does_not_double_count() {
    let harness = TestHarness::new().unwrap();
    let ns = unique_namespace();
    let worker = Worker::new(
        Arc::new(harness.reaction_source.clone()),
        Arc::new(CountsProjection::new()),
    );

    harness
        .ctx
        .reactions()
        .put(&ns, reaction(77, 1, ReactionType::Love))
        .await
        .unwrap();

    // Taken but never acknowledged, as if the consumer crashed
    let lost = harness.reaction_source.consume().await.unwrap();
    worker.projection().apply(&lost);
    assert_eq!(harness.reaction_source.requeue_unacked(), 1);

    drain(&worker, &harness).await;

    assert_eq!(worker.projection().get(&ns, 77).love, 1);
    assert_eq!(harness.reaction_source.in_flight(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_workers_share_one_projection() {
    let harness = TestHarness::new().unwrap();
    let ns = unique_namespace();
    let projection = Arc::new(CountsProjection::new());
    let source: Arc<dyn Source<Reaction>> = chain(
        Arc::new(harness.reaction_source.clone()) as Arc<dyn Source<Reaction>>,
        [source_logging::<Reaction>()],
    );

    for owner_id in 1..=50 {
        harness
            .ctx
            .reactions()
            .put(&ns, reaction(9, owner_id, ReactionType::Like))
            .await
            .unwrap();
    }

    let mut handles = Vec::new();
    for _ in 0..3 {
        let worker = Worker::new(Arc::clone(&source), Arc::clone(&projection));
        let done = harness.reaction_source.clone();
        handles.push(tokio::spawn(async move {
            worker
                .run(async move {
                    while done.pending() > 0 || done.in_flight() > 0 {
                        tokio::time::sleep(Duration::from_millis(5)).await;
                    }
                })
                .await;
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(projection.get(&ns, 9).like, 50);
}

#[tokio::test]
async fn test_redis_stream_pipeline() {
    let Some(url) = redis_url() else {
        return;
    };

    let pool = RedisPool::new(RedisPoolConfig {
        url,
        max_connections: 4,
    })
    .unwrap();
    let config = StreamConfig {
        prefix: format!("it-{}", uuid::Uuid::new_v4()),
        block_ms: 100,
        ..StreamConfig::default()
    };
    let stream = Arc::new(RedisStreamSource::<Reaction>::new(pool, &config));
    stream.ensure_group().await.unwrap();

    let ns = unique_namespace();
    let created = Reaction {
        id: 1,
        updated_at: Some(chrono::Utc::now()),
        ..reaction(3, 4, ReactionType::Wow)
    };
    stream.propagate(&ns, None, &created).await.unwrap();

    let worker = Worker::new(stream.clone(), Arc::new(CountsProjection::new()));
    tokio::time::timeout(Duration::from_secs(5), worker.process_one())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(worker.projection().get(&ns, 3).wow, 1);

    // Nothing left pending for this consumer
    let next = tokio::time::timeout(Duration::from_millis(300), stream.consume()).await;
    assert!(next.is_err());
}

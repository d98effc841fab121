//! Unit tests for the bounded worker pool

use std::sync::Arc;
use std::time::Duration;

use flora_application::pool::{
    PoolShutdownGuard, WorkerPool, WorkerPoolConfig, global_pool, global_pool_with,
};
use flora_domain::error::Error;
use tokio::sync::oneshot;

#[test]
fn test_size_is_clamped() {
    assert_eq!(WorkerPoolConfig::with_size(0).size, 1);
    assert_eq!(WorkerPoolConfig::with_size(1000).size, 32);
    assert_eq!(WorkerPoolConfig::with_size(6).size, 6);

    let default_size = WorkerPoolConfig::default_size();
    assert!((1..=32).contains(&default_size));
}

#[tokio::test]
async fn test_submit_and_join() {
    let pool = WorkerPool::new(WorkerPoolConfig::with_size(2));
    let handle = pool.submit(async { 21 * 2 }).expect("slot free");
    assert_eq!(handle.join().await.expect("task completes"), 42);

    let stats = pool.stats();
    assert_eq!(stats.submitted, 1);
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.in_flight, 0);
}

#[tokio::test]
async fn test_full_pool_rejects_without_waiting() {
    let pool = WorkerPool::new(WorkerPoolConfig::with_size(2));
    let (release_tx, release_rx) = oneshot::channel::<()>();
    let (second_tx, second_rx) = oneshot::channel::<()>();

    let first = pool
        .submit(async move {
            let _ = release_rx.await;
        })
        .expect("first slot");
    let second = pool
        .submit(async move {
            let _ = second_rx.await;
        })
        .expect("second slot");

    let rejected = pool.submit(async {}).expect_err("pool is full");
    assert!(matches!(rejected, Error::PoolExhausted { capacity: 2 }));
    assert_eq!(pool.stats().in_flight, 2);
    assert_eq!(pool.stats().rejected, 1);

    let _ = release_tx.send(());
    let _ = second_tx.send(());
    first.join().await.expect("first completes");
    second.join().await.expect("second completes");

    assert!(pool.submit(async {}).is_ok(), "slots are returned");
}

#[tokio::test]
async fn test_panicking_task_resolves_to_error() {
    let pool = WorkerPool::new(WorkerPoolConfig::with_size(1));
    let handle = pool
        .submit(async {
            panic!("boom");
        })
        .expect("slot");
    assert!(handle.join().await.is_err());
    // the slot was freed by the unwinding task
    assert!(pool.submit(async {}).is_ok());
}

#[tokio::test]
async fn test_draining_shutdown_waits_for_running_tasks() {
    let pool = WorkerPool::new(WorkerPoolConfig::with_size(4));
    let handle = pool
        .submit(async {
            tokio::time::sleep(Duration::from_millis(30)).await;
            "done"
        })
        .expect("slot");

    assert!(pool.shutdown(true).await);
    assert_eq!(handle.join().await.expect("drained"), "done");
    assert!(pool.is_shutting_down());
    assert!(pool.submit(async {}).is_err());
}

#[tokio::test(start_paused = true)]
async fn test_drain_timeout_cancels_stragglers() {
    let pool = WorkerPool::new(
        WorkerPoolConfig::with_size(2).with_drain_timeout(Duration::from_secs(1)),
    );
    let handle = pool
        .submit(std::future::pending::<()>())
        .expect("slot");

    assert!(!pool.shutdown(true).await);
    assert!(handle.join().await.is_err(), "cancelled task reports an error");
}

#[tokio::test]
async fn test_immediate_shutdown_cancels() {
    let pool = WorkerPool::new(WorkerPoolConfig::with_size(2));
    let handle = pool
        .submit(std::future::pending::<()>())
        .expect("slot");

    assert!(!pool.shutdown(false).await);
    assert!(handle.join().await.is_err());
    assert!(pool.stats().shutting_down);
}

#[tokio::test]
async fn test_shutdown_guard_cancels_on_drop() {
    let pool = WorkerPool::new_shared(WorkerPoolConfig::with_size(1));
    let handle = pool
        .submit(std::future::pending::<()>())
        .expect("slot");

    {
        let guard = PoolShutdownGuard::new(Arc::clone(&pool));
        assert_eq!(guard.pool().capacity(), 1);
    }

    assert!(handle.join().await.is_err());
    assert!(pool.is_shutting_down());
}

#[tokio::test]
async fn test_global_pool_is_created_once() {
    let configured = global_pool_with(WorkerPoolConfig::with_size(3));
    let again = global_pool();
    assert!(Arc::ptr_eq(&configured, &again));
}

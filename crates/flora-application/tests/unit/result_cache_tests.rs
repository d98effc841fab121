//! Unit tests for the result cache fill protocol

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use flora_application::cache::{CacheSource, ResultCache, StampedeConfig};
use flora_domain::error::Error;
use flora_domain::ports::{CacheEntryConfig, CacheProvider, LockProvider};
use flora_providers::cache::MokaCacheProvider;
use flora_providers::lock::MemoryLockProvider;

use crate::test_utils::{
    ContendedLockProvider, CountingCacheProvider, FailingCacheProvider, FailingLockProvider,
    fast_stampede,
};

const KEY: &str = "flora:v1:abc";
const TTL: Duration = Duration::from_secs(60);

fn cache_over(store: Arc<dyn CacheProvider>, locks: Arc<dyn LockProvider>) -> ResultCache {
    ResultCache::new(store, locks, fast_stampede())
}

fn memory_cache() -> ResultCache {
    cache_over(
        Arc::new(MokaCacheProvider::new()),
        Arc::new(MemoryLockProvider::new()),
    )
}

#[tokio::test]
async fn test_miss_fills_and_caches() {
    let cache = memory_cache();
    let fills = AtomicUsize::new(0);

    let first = cache
        .get_or_fill(KEY, || async {
            fills.fetch_add(1, Ordering::SeqCst);
            Ok::<_, Error>(("rose".to_string(), Some(TTL)))
        })
        .await
        .expect("fill succeeds");
    assert_eq!(first.value, "rose");
    assert_eq!(first.source, CacheSource::Filled);

    let second = cache
        .get_or_fill(KEY, || async {
            fills.fetch_add(1, Ordering::SeqCst);
            Ok::<_, Error>(("tulip".to_string(), Some(TTL)))
        })
        .await
        .expect("hit");
    assert_eq!(second.value, "rose");
    assert_eq!(second.source, CacheSource::Hit);
    assert!(second.source.is_hit());

    assert_eq!(fills.load(Ordering::SeqCst), 1);
    let stats = cache.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.fills, 1);
}

#[tokio::test]
async fn test_fill_without_ttl_is_not_cached() {
    let store = CountingCacheProvider::new();
    let cache = cache_over(store.clone(), Arc::new(MemoryLockProvider::new()));

    for _ in 0..2 {
        let lookup = cache
            .get_or_fill(KEY, || async { Ok::<_, Error>((1u32, None)) })
            .await
            .expect("fill");
        assert_eq!(lookup.source, CacheSource::Filled);
    }
    assert_eq!(store.writes(), 0);
}

#[tokio::test]
async fn test_fill_error_is_returned_and_lock_released() {
    let store = CountingCacheProvider::new();
    let locks = Arc::new(MemoryLockProvider::new());
    let cache = cache_over(store.clone(), locks.clone());

    let err = cache
        .get_or_fill(KEY, || async {
            Err::<(String, Option<Duration>), _>(Error::internal("providers down"))
        })
        .await
        .expect_err("fill error surfaces");
    assert!(matches!(err, Error::Internal { .. }));
    assert_eq!(store.writes(), 0);
    assert_eq!(locks.held(), 0);
}

#[tokio::test]
async fn test_cache_store_outage_reads_as_miss() {
    let cache = cache_over(
        Arc::new(FailingCacheProvider),
        Arc::new(MemoryLockProvider::new()),
    );

    let lookup = cache
        .get_or_fill(KEY, || async { Ok::<_, Error>(("rose".to_string(), Some(TTL))) })
        .await
        .expect("outage is absorbed");
    assert_eq!(lookup.value, "rose");
    assert!(cache.stats().store_errors >= 2, "read and write both failed");

    assert!(cache.get::<String>(KEY).await.is_none());
    cache.set(KEY, &"ignored", TTL).await;
}

#[tokio::test]
async fn test_lock_store_outage_fills_directly() {
    let store = CountingCacheProvider::new();
    let cache = cache_over(store.clone(), Arc::new(FailingLockProvider));

    let lookup = cache
        .get_or_fill(KEY, || async { Ok::<_, Error>(("rose".to_string(), Some(TTL))) })
        .await
        .expect("direct fill");
    assert_eq!(lookup.source, CacheSource::Direct);
    assert_eq!(store.writes(), 1);
    assert_eq!(cache.stats().direct_fills, 1);
}

#[tokio::test]
async fn test_contended_lock_falls_back_after_poll_timeout() {
    let config = StampedeConfig {
        poll_timeout: Duration::from_millis(50),
        ..fast_stampede()
    };
    let cache = ResultCache::new(
        Arc::new(MokaCacheProvider::new()),
        Arc::new(ContendedLockProvider),
        config,
    );

    let lookup = cache
        .get_or_fill(KEY, || async { Ok::<_, Error>(("rose".to_string(), Some(TTL))) })
        .await
        .expect("direct fill");
    assert_eq!(lookup.source, CacheSource::Direct);
    assert_eq!(cache.stats().lock_contended, 1);
}

#[tokio::test]
async fn test_waiter_sees_value_published_by_holder() {
    let store: Arc<dyn CacheProvider> = Arc::new(MokaCacheProvider::new());
    let locks = Arc::new(MemoryLockProvider::new());
    let cache = cache_over(Arc::clone(&store), locks.clone());

    // someone else holds the lock and publishes shortly
    let held = locks
        .try_acquire(&format!("{KEY}:lock"), Duration::from_secs(10))
        .await
        .expect("store ok")
        .expect("lock free");
    let publisher = {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(150)).await;
            store
                .set_json(KEY, "\"rose\"", CacheEntryConfig::default())
                .await
        })
    };

    let lookup = cache
        .get_or_fill(KEY, || async {
            Ok::<_, Error>(("should not run".to_string(), Some(TTL)))
        })
        .await
        .expect("polled");
    assert_eq!(lookup.value, "rose");
    assert_eq!(lookup.source, CacheSource::HitAfterPoll);

    publisher.await.expect("join").expect("publish");
    locks.release(&held).await.expect("release");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_misses_fill_once() {
    let cache = Arc::new(memory_cache());
    let fills = Arc::new(AtomicUsize::new(0));

    let mut tasks = Vec::new();
    for _ in 0..20 {
        let cache = Arc::clone(&cache);
        let fills = Arc::clone(&fills);
        tasks.push(tokio::spawn(async move {
            cache
                .get_or_fill(KEY, || async move {
                    fills.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Ok::<_, Error>(("rose".to_string(), Some(TTL)))
                })
                .await
        }));
    }

    for task in tasks {
        let lookup = task.await.expect("join").expect("lookup");
        assert_eq!(lookup.value, "rose");
    }
    assert_eq!(fills.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_undecodable_entry_is_a_miss() {
    let store: Arc<dyn CacheProvider> = Arc::new(MokaCacheProvider::new());
    store
        .set_json(KEY, "not json", CacheEntryConfig::default())
        .await
        .expect("set");
    let cache = cache_over(store, Arc::new(MemoryLockProvider::new()));

    assert!(cache.get::<String>(KEY).await.is_none());
    assert_eq!(cache.store_name(), "moka");
    assert_eq!(cache.lock_name(), "memory");
}

#[tokio::test]
async fn test_namespace_prefixes_store_keys() {
    let store: Arc<dyn CacheProvider> = Arc::new(MokaCacheProvider::new());
    let cache = cache_over(Arc::clone(&store), Arc::new(MemoryLockProvider::new()))
        .with_namespace("staging");

    cache.set(KEY, &"rose", TTL).await;

    assert!(store.exists(&format!("staging:{KEY}")).await.expect("exists"));
    assert!(!store.exists(KEY).await.expect("exists"));
    assert_eq!(cache.get::<String>(KEY).await.as_deref(), Some("rose"));
}

/// Start a fill that holds the lock for `hold` and then yields `outcome`
fn slow_holder(
    cache: &Arc<ResultCache>,
    hold: Duration,
    outcome: Result<(String, Option<Duration>), Error>,
) -> tokio::task::JoinHandle<Result<String, Error>> {
    let cache = Arc::clone(cache);
    tokio::spawn(async move {
        cache
            .get_or_fill(KEY, || async move {
                tokio::time::sleep(hold).await;
                outcome
            })
            .await
            .map(|lookup| lookup.value)
    })
}

#[tokio::test(start_paused = true)]
async fn test_waiter_takes_over_after_failed_slow_fill() {
    let config = StampedeConfig::default();
    let cache = Arc::new(ResultCache::new(
        Arc::new(MokaCacheProvider::new()),
        Arc::new(MemoryLockProvider::new()),
        config,
    ));

    // the holder outlasts acquire_timeout and then fails
    let hold = config.acquire_timeout * 2 + Duration::from_millis(500);
    let holder = slow_holder(&cache, hold, Err(Error::internal("both providers failed")));
    tokio::time::sleep(Duration::from_millis(10)).await;

    let started = tokio::time::Instant::now();
    let lookup = cache
        .get_or_fill(KEY, || async { Ok::<_, Error>(("rose".to_string(), Some(TTL))) })
        .await
        .expect("waiter fills");
    let waited = started.elapsed();

    assert!(holder.await.expect("join").is_err());
    assert_eq!(lookup.value, "rose");
    assert_eq!(lookup.source, CacheSource::Filled);
    assert!(
        waited < hold + config.poll_interval * 2,
        "waiter took {waited:?} for a {hold:?} hold"
    );
    assert!(waited < config.poll_timeout);
    assert_eq!(cache.stats().direct_fills, 0);
}

#[tokio::test(start_paused = true)]
async fn test_waiter_takes_over_after_uncached_slow_fill() {
    let config = StampedeConfig::default();
    let cache = Arc::new(ResultCache::new(
        Arc::new(MokaCacheProvider::new()),
        Arc::new(MemoryLockProvider::new()),
        config,
    ));

    let hold = config.acquire_timeout + Duration::from_secs(1);
    let holder = slow_holder(&cache, hold, Ok(("uncached".to_string(), None)));
    tokio::time::sleep(Duration::from_millis(10)).await;

    let started = tokio::time::Instant::now();
    let lookup = cache
        .get_or_fill(KEY, || async { Ok::<_, Error>(("rose".to_string(), None)) })
        .await
        .expect("waiter fills");

    assert_eq!(holder.await.expect("join").expect("holder value"), "uncached");
    assert_eq!(lookup.source, CacheSource::Filled);
    assert!(started.elapsed() < hold + config.poll_interval * 2);
}

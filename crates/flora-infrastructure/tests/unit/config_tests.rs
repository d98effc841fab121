//! Configuration loading and validation tests

use std::io::Write;

use flora_infrastructure::config::{
    AppConfig, CacheBackend, ConfigLoader, LockBackend, ProviderKind, validate_app_config,
};
use tempfile::NamedTempFile;

fn toml_file(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("temp file");
    file.write_all(contents.as_bytes()).expect("write config");
    file
}

#[test]
fn test_defaults_are_valid() {
    let config = AppConfig::default();
    validate_app_config(&config).expect("defaults validate");

    assert_eq!(config.providers.primary.kind, ProviderKind::PlantId);
    assert_eq!(config.providers.secondary.kind, ProviderKind::PlantNet);
    assert_eq!(config.providers.primary.circuit.failure_threshold, 3);
    assert_eq!(config.providers.secondary.circuit.reset_timeout_secs, 30);
    assert_eq!(config.cache.provider, CacheBackend::Moka);
    assert_eq!(config.cache.ttl_secs, 86_400);
    assert_eq!(config.lock.provider, LockBackend::Memory);
    assert!(config.lock.ttl_ms > config.providers.primary.timeout_ms);
}

#[test]
fn test_partial_toml_overrides_defaults() {
    let file = toml_file(
        r#"
[providers.primary]
kind = "plant_id"
api_key = "abc"
timeout_ms = 4000

[providers.primary.circuit]
failure_threshold = 5
reset_timeout_secs = 90
success_threshold = 1

[cache]
ttl_secs = 600

[pool]
size = 12
"#,
    );

    let config = ConfigLoader::new()
        .with_config_path(file.path())
        .load()
        .expect("loads");

    assert_eq!(config.providers.primary.api_key.as_deref(), Some("abc"));
    assert_eq!(config.providers.primary.timeout_ms, 4000);
    assert_eq!(config.providers.primary.circuit.failure_threshold, 5);
    assert_eq!(config.cache.ttl_secs, 600);
    // untouched keys keep their defaults
    assert_eq!(config.cache.partial_ttl_secs, 10 * 60);
    assert_eq!(config.providers.secondary.kind, ProviderKind::PlantNet);
    assert_eq!(config.pool.to_worker_pool_config().size, 12);
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let result = ConfigLoader::new()
        .with_config_path("/nonexistent/flora.toml")
        .load();
    assert!(result.is_err());
}

#[test]
fn test_invalid_toml_is_an_error() {
    let file = toml_file("[cache\nttl_secs = ");
    assert!(ConfigLoader::new().with_config_path(file.path()).load().is_err());
}

#[test]
fn test_unknown_provider_kind_is_rejected() {
    let file = toml_file("[providers.primary]\nkind = \"inaturalist\"\n");
    assert!(ConfigLoader::new().with_config_path(file.path()).load().is_err());
}

#[test]
fn test_both_providers_disabled_is_rejected() {
    let mut config = AppConfig::default();
    config.providers.primary.kind = ProviderKind::Disabled;
    config.providers.secondary.kind = ProviderKind::Disabled;
    assert!(validate_app_config(&config).is_err());

    config.providers.secondary.kind = ProviderKind::PlantNet;
    assert!(validate_app_config(&config).is_ok());
}

#[test]
fn test_lock_ttl_must_outlast_provider_timeouts() {
    let mut config = AppConfig::default();
    config.providers.primary.timeout_ms = 40_000;
    let err = validate_app_config(&config).expect_err("30s lock < 40s timeout");
    assert!(err.to_string().contains("lock.ttl_ms"));

    // a disabled slot's timeout does not count
    config.providers.primary.kind = ProviderKind::Disabled;
    assert!(validate_app_config(&config).is_ok());
}

#[test]
fn test_zero_values_are_rejected() {
    let mut config = AppConfig::default();
    config.providers.secondary.timeout_ms = 0;
    assert!(validate_app_config(&config).is_err());

    let mut config = AppConfig::default();
    config.providers.primary.circuit.failure_threshold = 0;
    assert!(validate_app_config(&config).is_err());

    let mut config = AppConfig::default();
    config.pool.size = Some(0);
    assert!(validate_app_config(&config).is_err());

    let mut config = AppConfig::default();
    config.lock.poll_interval_ms = 0;
    assert!(validate_app_config(&config).is_err());

    let mut config = AppConfig::default();
    config.cache.ttl_secs = 0;
    assert!(validate_app_config(&config).is_err());
    config.cache.enabled = false;
    assert!(validate_app_config(&config).is_ok());
}

#[test]
fn test_redis_backends_need_a_url() {
    let mut config = AppConfig::default();
    config.cache.provider = CacheBackend::Redis;
    assert!(validate_app_config(&config).is_err());

    config.cache.redis_url = Some("redis://127.0.0.1:6379".to_string());
    config.lock.provider = LockBackend::Redis;
    // the lock shares the cache URL
    assert!(validate_app_config(&config).is_ok());

    config.cache.provider = CacheBackend::Moka;
    config.cache.redis_url = None;
    assert!(validate_app_config(&config).is_err());
}

#[test]
fn test_save_then_load() {
    let mut config = AppConfig::default();
    config.providers.secondary.api_key = Some("net-key".to_string());
    config.lock.direct_fill_permits = 4;

    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("flora.toml");
    let loader = ConfigLoader::new().with_config_path(&path);
    loader.save_to_file(&config, &path).expect("save");

    let loaded = loader.load().expect("load");
    assert_eq!(loaded, config);
    assert_eq!(loader.config_path(), Some(path.as_path()));
}

#[test]
fn test_breaker_and_stampede_conversions() {
    let config = AppConfig::default();
    let breaker = config.providers.primary.circuit.to_breaker_config();
    assert_eq!(breaker.failure_threshold, 3);
    assert_eq!(breaker.half_open_max_calls, breaker.success_threshold);

    let stampede = config.lock.to_stampede_config();
    assert_eq!(stampede.lock_ttl, config.lock.ttl());

    let policy = config.cache.to_policy();
    assert!(policy.enabled);
    assert!(policy.partial_ttl < policy.ttl);
}

#[test]
#[ignore = "mutates process environment; run with --test-threads=1"]
fn test_environment_overrides_file() {
    let file = toml_file("[cache]\nttl_secs = 600\n");
    // SAFETY: no other thread reads the environment in this ignored test
    unsafe {
        std::env::set_var("FLORA__CACHE__TTL_SECS", "120");
        std::env::set_var("FLORA__PROVIDERS__PRIMARY__API_KEY", "from-env");
    }

    let config = ConfigLoader::new()
        .with_config_path(file.path())
        .load()
        .expect("loads");

    unsafe {
        std::env::remove_var("FLORA__CACHE__TTL_SECS");
        std::env::remove_var("FLORA__PROVIDERS__PRIMARY__API_KEY");
    }

    assert_eq!(config.cache.ttl_secs, 120);
    assert_eq!(config.providers.primary.api_key.as_deref(), Some("from-env"));
}

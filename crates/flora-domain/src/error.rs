//! Error handling types

use std::time::Duration;

use thiserror::Error;

use crate::value_objects::ProviderFailureReport;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Flora
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (simple form)
    #[error("I/O error: {source}")]
    IoSimple {
        /// The underlying I/O error
        #[from]
        source: std::io::Error,
    },

    /// I/O operation error (with context)
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// JSON parsing or serialization error
    #[error("JSON parsing error: {source}")]
    Json {
        /// The underlying JSON error
        #[from]
        source: serde_json::Error,
    },

    /// Generic string-based error
    #[error("String error: {0}")]
    String(String),

    /// Invalid argument provided to a function
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument
        message: String,
    },

    /// Configuration-related error (simple form)
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error
        message: String,
    },

    /// Configuration-related error (with source)
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Network-related error
    #[error("Network error: {message}")]
    Network {
        /// Description of the network error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error
        message: String,
    },

    /// Cache backend operation error
    #[error("Cache error: {message}")]
    Cache {
        /// Description of the cache error
        message: String,
    },

    /// Infrastructure operation error
    #[error("Infrastructure error: {message}")]
    Infrastructure {
        /// Description of the infrastructure error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The provider's circuit breaker rejected the call without contacting it
    #[error("Circuit open for provider {provider} (retry in {retry_in:?})")]
    CircuitOpen {
        /// Provider whose circuit is open
        provider: String,
        /// Time left until the circuit admits a trial call
        retry_in: Duration,
    },

    /// The worker pool had no free slot for the task
    #[error("Worker pool exhausted ({capacity} slots in use)")]
    PoolExhausted {
        /// Number of slots in the pool
        capacity: usize,
    },

    /// The shared cache store could not be reached
    #[error("Cache store unavailable: {message}")]
    CacheUnavailable {
        /// Description of the store failure
        message: String,
    },

    /// The stampede lock store could not be reached
    #[error("Lock store unavailable: {message}")]
    LockUnavailable {
        /// Description of the store failure
        message: String,
    },

    /// No identification data could be produced by any provider
    #[error("Identification service unavailable: {} provider(s) failed", .failures.len())]
    TotalFailure {
        /// One report per provider describing why it produced nothing
        failures: Vec<ProviderFailureReport>,
    },
}

// Basic error creation methods
impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create a cache error
    pub fn cache<S: Into<String>>(message: S) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }
}

// I/O error creation methods
impl Error {
    /// Create an I/O error with source
    pub fn io_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Configuration error creation methods
impl Error {
    /// Create a configuration error (simple)
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a configuration error with source
    pub fn configuration_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Network and infrastructure error creation methods
impl Error {
    /// Create a network error with source
    pub fn network_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Network {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an infrastructure error
    pub fn infrastructure<S: Into<String>>(message: S) -> Self {
        Self::Infrastructure {
            message: message.into(),
            source: None,
        }
    }

    /// Create an infrastructure error with source
    pub fn infrastructure_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Infrastructure {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Orchestration error creation methods
impl Error {
    /// Create a circuit-open rejection
    pub fn circuit_open<S: Into<String>>(provider: S, retry_in: Duration) -> Self {
        Self::CircuitOpen {
            provider: provider.into(),
            retry_in,
        }
    }

    /// Create a pool exhaustion error
    pub fn pool_exhausted(capacity: usize) -> Self {
        Self::PoolExhausted { capacity }
    }

    /// Create a cache store outage error
    pub fn cache_unavailable<S: Into<String>>(message: S) -> Self {
        Self::CacheUnavailable {
            message: message.into(),
        }
    }

    /// Create a lock store outage error
    pub fn lock_unavailable<S: Into<String>>(message: S) -> Self {
        Self::LockUnavailable {
            message: message.into(),
        }
    }

    /// Create a total failure from the per-provider reports
    pub fn total_failure(failures: Vec<ProviderFailureReport>) -> Self {
        Self::TotalFailure { failures }
    }

    /// Whether the caller should see this as "service unavailable"
    ///
    /// Distinct from a successful outcome in which no plant was detected.
    pub fn is_service_unavailable(&self) -> bool {
        matches!(self, Self::TotalFailure { .. })
    }

    /// Whether this error comes from the cache or lock store and must be absorbed
    pub fn is_store_outage(&self) -> bool {
        matches!(
            self,
            Self::CacheUnavailable { .. } | Self::LockUnavailable { .. } | Self::Cache { .. }
        )
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

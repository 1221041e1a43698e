//! Environment-driven configuration for the task store.
//!
//! | Variable                      | Default | Meaning                              |
//! |-------------------------------|---------|--------------------------------------|
//! | `TASKLIST_DATABASE_URL`       | none    | `PostgreSQL` connection URL          |
//! | `TASKLIST_DB_POOL_SIZE`       | `10`    | Maximum pooled connections           |
//! | `TASKLIST_MOVE_OFFSET`        | `1000`  | Temporary offset for adjacent moves  |
//! | `TASKLIST_REORDER_MULTIPLIER` | `1000`  | Identifier multiplier for reorders   |

use crate::task::domain::{OrderingPolicy, TaskDomainError};
use std::env;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Variable holding the database URL.
pub const DATABASE_URL_VAR: &str = "TASKLIST_DATABASE_URL";
/// Variable holding the connection pool size.
pub const POOL_SIZE_VAR: &str = "TASKLIST_DB_POOL_SIZE";
/// Variable holding the adjacent-move offset.
pub const MOVE_OFFSET_VAR: &str = "TASKLIST_MOVE_OFFSET";
/// Variable holding the bulk-reorder multiplier.
pub const REORDER_MULTIPLIER_VAR: &str = "TASKLIST_REORDER_MULTIPLIER";

const DEFAULT_POOL_SIZE: u32 = 10;

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset.
    #[error("environment variable '{0}' is required but not set")]
    MissingVar(&'static str),

    /// A variable holds text that does not parse.
    #[error("failed to parse environment variable '{key}': {details}")]
    Parse {
        /// Variable name.
        key: &'static str,
        /// Parser message.
        details: String,
    },

    /// The pool size is zero.
    #[error("environment variable 'TASKLIST_DB_POOL_SIZE' must be at least 1")]
    EmptyPool,

    /// An ordering constant is out of range.
    #[error(transparent)]
    Ordering(#[from] TaskDomainError),
}

/// Connection and ordering settings for the task store.
#[derive(Clone, PartialEq, Eq)]
pub struct StoreConfig {
    database_url: String,
    pool_size: u32,
    ordering: OrderingPolicy,
}

impl StoreConfig {
    /// Creates a configuration with default pool size and ordering policy.
    #[must_use]
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            pool_size: DEFAULT_POOL_SIZE,
            ordering: OrderingPolicy::default(),
        }
    }

    /// Loads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is missing, malformed or out
    /// of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads the configuration through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is missing, malformed or out
    /// of range.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup(DATABASE_URL_VAR)
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::MissingVar(DATABASE_URL_VAR))?;
        let pool_size = parse_or(&lookup, POOL_SIZE_VAR, DEFAULT_POOL_SIZE)?;
        if pool_size == 0 {
            return Err(ConfigError::EmptyPool);
        }
        let move_offset = parse_or(
            &lookup,
            MOVE_OFFSET_VAR,
            OrderingPolicy::DEFAULT_MOVE_OFFSET,
        )?;
        let reorder_multiplier = parse_or(
            &lookup,
            REORDER_MULTIPLIER_VAR,
            OrderingPolicy::DEFAULT_REORDER_MULTIPLIER,
        )?;

        Ok(Self {
            database_url,
            pool_size,
            ordering: OrderingPolicy::new(move_offset, reorder_multiplier)?,
        })
    }

    /// Overrides the pool size.
    #[must_use]
    pub const fn with_pool_size(mut self, pool_size: u32) -> Self {
        self.pool_size = pool_size;
        self
    }

    /// Overrides the ordering policy.
    #[must_use]
    pub const fn with_ordering(mut self, ordering: OrderingPolicy) -> Self {
        self.ordering = ordering;
        self
    }

    /// Returns the database URL.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    /// Returns the maximum number of pooled connections.
    #[must_use]
    pub const fn pool_size(&self) -> u32 {
        self.pool_size
    }

    /// Returns the ordering policy.
    #[must_use]
    pub const fn ordering(&self) -> OrderingPolicy {
        self.ordering
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("database_url", &"<redacted>")
            .field("pool_size", &self.pool_size)
            .field("ordering", &self.ordering)
            .finish()
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    lookup(key).map_or(Ok(default), |raw| {
        raw.trim().parse().map_err(|err: T::Err| ConfigError::Parse {
            key,
            details: err.to_string(),
        })
    })
}

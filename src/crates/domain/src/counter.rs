use crate::value::CounterId;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CounterError {
    #[error("Database error: {0}")]
    DbErr(String),
    #[error("Counter not found: {0}")]
    NotFound(CounterId),
}

/// The single shared counter.
#[derive(Debug, Clone, PartialEq)]
pub struct Counter {
    pub id: CounterId,
    pub count: i64,
    /// Last mutation time, UTC.
    pub updated_at: NaiveDateTime,
}

/// Persistence primitives for the counter table.
///
/// Every method returns the affected row as stored, including the timestamp
/// the store recorded.
#[async_trait]
pub trait CounterRepository: Send + Sync {
    /// First row in identity order, if any.
    async fn find_first(&self) -> Result<Option<Counter>, CounterError>;

    /// Insert the canonical row with `count` unless it already exists.
    /// Returns `None` when another writer created it first.
    async fn insert_if_absent(&self, count: i64) -> Result<Option<Counter>, CounterError>;

    /// `count = count + delta` as a single store-level update.
    async fn add_delta(&self, id: CounterId, delta: i64) -> Result<Counter, CounterError>;

    /// `count = value`.
    async fn set_value(&self, id: CounterId, value: i64) -> Result<Counter, CounterError>;
}

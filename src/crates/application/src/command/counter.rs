use std::sync::Arc;

use crate::error::AppError;
use domain::counter::{Counter, CounterError, CounterRepository};
use domain::value::CounterId;
use log::error;

/// Increment command, `amount` may be negative
#[derive(Debug, Clone)]
pub struct IncrementCounterCmd {
    pub amount: i64,
}

impl Default for IncrementCounterCmd {
    fn default() -> Self {
        Self { amount: 1 }
    }
}

/// Decrement command, `amount` is subtracted as given
#[derive(Debug, Clone)]
pub struct DecrementCounterCmd {
    pub amount: i64,
}

impl Default for DecrementCounterCmd {
    fn default() -> Self {
        Self { amount: 1 }
    }
}

/// Reset command, sets the count to exactly `value`
#[derive(Debug, Clone, Default)]
pub struct ResetCounterCmd {
    pub value: i64,
}

/// Counter application service
///
/// Every operation creates the counter on first use. Creation goes through
/// `insert_if_absent` on the canonical identity, so a writer that loses the
/// creation race falls back to updating the row the winner inserted.
pub struct CounterAppService {
    counter_repository: Arc<dyn CounterRepository>,
}

impl CounterAppService {
    pub fn new(counter_repository: Arc<dyn CounterRepository>) -> Self {
        Self { counter_repository }
    }

    /// Read-or-create
    pub async fn get_counter(&self) -> Result<Counter, AppError> {
        self.read_or_create()
            .await
            .map_err(|e| log_failure("Get counter", e))
    }

    pub async fn increment_counter(&self, cmd: IncrementCounterCmd) -> Result<Counter, AppError> {
        self.apply_delta(cmd.amount)
            .await
            .map_err(|e| log_failure("Counter increment", e))
    }

    pub async fn decrement_counter(&self, cmd: DecrementCounterCmd) -> Result<Counter, AppError> {
        let delta = cmd.amount.checked_neg().ok_or_else(|| {
            AppError::InvalidInput(format!("amount {} cannot be subtracted", cmd.amount))
        })?;
        self.apply_delta(delta)
            .await
            .map_err(|e| log_failure("Counter decrement", e))
    }

    pub async fn reset_counter(&self, cmd: ResetCounterCmd) -> Result<Counter, AppError> {
        self.apply_value(cmd.value)
            .await
            .map_err(|e| log_failure("Counter reset", e))
    }

    async fn read_or_create(&self) -> Result<Counter, CounterError> {
        if let Some(counter) = self.counter_repository.find_first().await? {
            return Ok(counter);
        }
        if let Some(counter) = self.counter_repository.insert_if_absent(0).await? {
            return Ok(counter);
        }
        // another writer created it between the two calls
        self.counter_repository
            .find_first()
            .await?
            .ok_or(CounterError::NotFound(CounterId::CANONICAL))
    }

    async fn apply_delta(&self, delta: i64) -> Result<Counter, CounterError> {
        if let Some(counter) = self.counter_repository.find_first().await? {
            return self.counter_repository.add_delta(counter.id, delta).await;
        }
        match self.counter_repository.insert_if_absent(delta).await? {
            Some(counter) => Ok(counter),
            None => {
                self.counter_repository
                    .add_delta(CounterId::CANONICAL, delta)
                    .await
            }
        }
    }

    async fn apply_value(&self, value: i64) -> Result<Counter, CounterError> {
        if let Some(counter) = self.counter_repository.find_first().await? {
            return self.counter_repository.set_value(counter.id, value).await;
        }
        match self.counter_repository.insert_if_absent(value).await? {
            Some(counter) => Ok(counter),
            None => {
                self.counter_repository
                    .set_value(CounterId::CANONICAL, value)
                    .await
            }
        }
    }
}

fn log_failure(operation: &str, e: CounterError) -> AppError {
    error!("{} failed: {}", operation, e);
    e.into()
}

impl From<CounterError> for AppError {
    fn from(e: CounterError) -> Self {
        match e {
            CounterError::DbErr(msg) => AppError::RepositoryError("Counter".to_string(), msg),
            CounterError::NotFound(id) => {
                AppError::AggregateNotFound("Counter".to_string(), id.to_string())
            }
        }
    }
}

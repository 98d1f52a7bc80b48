use super::db_data::counter::{ActiveModel, Column, Entity};
use async_trait::async_trait;
use chrono::SubsecRound;
use domain::counter::{Counter, CounterError, CounterRepository};
use domain::value::CounterId;
use log::debug;
use sea_orm::sea_query::{Expr, OnConflict, SimpleExpr};
use sea_orm::*;

#[derive(Clone)]
pub struct CounterRepositoryImpl {
    db: DbConn,
}

impl CounterRepositoryImpl {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    /// Applies `count = <expr>` to one row and reads it back in the same
    /// transaction, so the returned row is the one this update produced.
    ///
    /// The row is locked before the timestamp is chosen. A writer that waited
    /// on the lock sees the previous stamp and moves past it, so `updated_at`
    /// never goes backwards even when the clock lags the stored value.
    async fn update_count(&self, id: CounterId, expr: SimpleExpr) -> Result<Counter, CounterError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| CounterError::DbErr(e.to_string()))?;

        let current = Entity::find_by_id(id.as_i64())
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(|e| CounterError::DbErr(e.to_string()))?
            .ok_or(CounterError::NotFound(id))?;

        let result = Entity::update_many()
            .col_expr(Column::Count, expr)
            .col_expr(Column::UpdatedAt, Expr::value(next_stamp(current.updated_at)))
            .filter(Column::Id.eq(id.as_i64()))
            .exec(&txn)
            .await
            .map_err(|e| CounterError::DbErr(e.to_string()))?;
        if result.rows_affected == 0 {
            return Err(CounterError::NotFound(id));
        }

        let model = Entity::find_by_id(id.as_i64())
            .one(&txn)
            .await
            .map_err(|e| CounterError::DbErr(e.to_string()))?
            .ok_or(CounterError::NotFound(id))?;

        txn.commit()
            .await
            .map_err(|e| CounterError::DbErr(e.to_string()))?;

        Ok(model.into())
    }
}

/// Microsecond precision, the finest both Postgres and SQLite round-trip.
fn now() -> chrono::NaiveDateTime {
    chrono::Utc::now().naive_utc().trunc_subsecs(6)
}

/// Strictly after `previous`, otherwise the current time.
fn next_stamp(previous: chrono::NaiveDateTime) -> chrono::NaiveDateTime {
    now().max(previous + chrono::Duration::microseconds(1))
}

#[async_trait]
impl CounterRepository for CounterRepositoryImpl {
    async fn find_first(&self) -> Result<Option<Counter>, CounterError> {
        let result = Entity::find()
            .order_by_asc(Column::Id)
            .one(&self.db)
            .await
            .map_err(|e| CounterError::DbErr(e.to_string()))?;
        Ok(result.map(Counter::from))
    }

    async fn insert_if_absent(&self, count: i64) -> Result<Option<Counter>, CounterError> {
        let counter = Counter {
            id: CounterId::CANONICAL,
            count,
            updated_at: now(),
        };
        let active_model = ActiveModel {
            id: Set(counter.id.as_i64()),
            count: Set(counter.count),
            updated_at: Set(counter.updated_at),
        };

        let inserted = Entity::insert(active_model)
            .on_conflict(OnConflict::column(Column::Id).do_nothing().to_owned())
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| CounterError::DbErr(e.to_string()))?;

        if inserted == 0 {
            debug!("counter {} already exists, insert skipped", counter.id);
            return Ok(None);
        }
        Ok(Some(counter))
    }

    async fn add_delta(&self, id: CounterId, delta: i64) -> Result<Counter, CounterError> {
        self.update_count(id, Expr::col(Column::Count).add(delta))
            .await
    }

    async fn set_value(&self, id: CounterId, value: i64) -> Result<Counter, CounterError> {
        self.update_count(id, Expr::value(value)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use application::command::counter::{
        CounterAppService, DecrementCounterCmd, IncrementCounterCmd, ResetCounterCmd,
    };
    use migration::{Migrator, MigratorTrait};
    use std::sync::Arc;
    use std::time::Duration;

    async fn setup() -> CounterRepositoryImpl {
        let mut opt = ConnectOptions::new("sqlite::memory:".to_owned());
        // one connection, otherwise every connection sees its own empty database
        opt.max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);
        let db = Database::connect(opt).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        CounterRepositoryImpl::new(db)
    }

    async fn seed(repo: &CounterRepositoryImpl, id: i64, count: i64) {
        seed_at(repo, id, count, now()).await;
    }

    async fn seed_at(
        repo: &CounterRepositoryImpl,
        id: i64,
        count: i64,
        updated_at: chrono::NaiveDateTime,
    ) {
        let active_model = ActiveModel {
            id: Set(id),
            count: Set(count),
            updated_at: Set(updated_at),
        };
        Entity::insert(active_model)
            .exec_without_returning(&repo.db)
            .await
            .unwrap();
    }

    async fn row_count(repo: &CounterRepositoryImpl) -> u64 {
        Entity::find().count(&repo.db).await.unwrap()
    }

    async fn tick() {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    #[tokio::test]
    async fn test_find_first_on_empty_table() {
        let repo = setup().await;
        assert!(repo.find_first().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_if_absent_only_inserts_once() {
        let repo = setup().await;

        let created = repo.insert_if_absent(5).await.unwrap().unwrap();
        assert_eq!(created.id, CounterId::CANONICAL);
        assert_eq!(created.count, 5);

        assert!(repo.insert_if_absent(9).await.unwrap().is_none());
        assert_eq!(row_count(&repo).await, 1);

        let stored = repo.find_first().await.unwrap().unwrap();
        assert_eq!(stored, created);
    }

    #[tokio::test]
    async fn test_add_delta_and_set_value() {
        let repo = setup().await;
        let created = repo.insert_if_absent(10).await.unwrap().unwrap();

        tick().await;
        let added = repo.add_delta(created.id, 3).await.unwrap();
        assert_eq!(added.count, 13);
        assert!(added.updated_at > created.updated_at);

        tick().await;
        let subtracted = repo.add_delta(created.id, -20).await.unwrap();
        assert_eq!(subtracted.count, -7);
        assert!(subtracted.updated_at > added.updated_at);

        tick().await;
        let set = repo.set_value(created.id, 42).await.unwrap();
        assert_eq!(set.count, 42);
        assert!(set.updated_at > subtracted.updated_at);

        assert_eq!(repo.find_first().await.unwrap().unwrap(), set);
    }

    #[tokio::test]
    async fn test_back_to_back_updates_strictly_increase_updated_at() {
        let repo = setup().await;
        let mut last = repo.insert_if_absent(0).await.unwrap().unwrap();

        for i in 0..50 {
            let next = if i % 5 == 0 {
                repo.set_value(last.id, i).await.unwrap()
            } else {
                repo.add_delta(last.id, 1).await.unwrap()
            };
            assert!(
                next.updated_at > last.updated_at,
                "{} not after {}",
                next.updated_at,
                last.updated_at
            );
            last = next;
        }
    }

    #[tokio::test]
    async fn test_update_moves_past_stored_timestamp_ahead_of_clock() {
        let repo = setup().await;
        let ahead = now() + chrono::Duration::hours(1);
        seed_at(&repo, 1, 10, ahead).await;

        let added = repo.add_delta(CounterId::CANONICAL, 1).await.unwrap();
        assert_eq!(added.count, 11);
        assert_eq!(added.updated_at, ahead + chrono::Duration::microseconds(1));

        let set = repo.set_value(CounterId::CANONICAL, 0).await.unwrap();
        assert_eq!(set.count, 0);
        assert!(set.updated_at > added.updated_at);
    }

    #[tokio::test]
    async fn test_update_missing_row_is_not_found() {
        let repo = setup().await;
        let err = repo.add_delta(CounterId::from(8), 1).await.unwrap_err();
        assert!(matches!(err, CounterError::NotFound(id) if id.as_i64() == 8));
        let err = repo.set_value(CounterId::from(8), 1).await.unwrap_err();
        assert!(matches!(err, CounterError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_find_first_picks_lowest_identity() {
        let repo = setup().await;
        seed(&repo, 7, 20).await;
        seed(&repo, 3, 10).await;

        for _ in 0..3 {
            let first = repo.find_first().await.unwrap().unwrap();
            assert_eq!(first.id, CounterId::from(3));
            assert_eq!(first.count, 10);
        }
    }

    #[tokio::test]
    async fn test_service_scenario_against_store() {
        let repo = setup().await;
        let svc = CounterAppService::new(Arc::new(repo.clone()));

        let c = svc
            .increment_counter(IncrementCounterCmd { amount: 5 })
            .await
            .unwrap();
        assert_eq!(c.count, 5);
        tick().await;
        let c = svc
            .decrement_counter(DecrementCounterCmd { amount: 3 })
            .await
            .unwrap();
        assert_eq!(c.count, 2);
        tick().await;
        let c = svc
            .reset_counter(ResetCounterCmd { value: 0 })
            .await
            .unwrap();
        assert_eq!(c.count, 0);
        tick().await;
        let c = svc
            .decrement_counter(DecrementCounterCmd { amount: 1 })
            .await
            .unwrap();
        assert_eq!(c.count, -1);
        tick().await;
        let c = svc
            .increment_counter(IncrementCounterCmd { amount: -4 })
            .await
            .unwrap();
        assert_eq!(c.count, -5);

        let got = svc.get_counter().await.unwrap();
        let again = svc.get_counter().await.unwrap();
        assert_eq!(got, c);
        assert_eq!(again, got);
        assert_eq!(row_count(&repo).await, 1);
    }

    #[tokio::test]
    async fn test_service_on_seeded_duplicates_mutates_first_row_only() {
        let repo = setup().await;
        seed(&repo, 2, 10).await;
        seed(&repo, 5, 20).await;
        let svc = CounterAppService::new(Arc::new(repo.clone()));

        let c = svc
            .reset_counter(ResetCounterCmd { value: 1 })
            .await
            .unwrap();
        assert_eq!(c.id, CounterId::from(2));
        let c = svc
            .increment_counter(IncrementCounterCmd::default())
            .await
            .unwrap();
        assert_eq!(c.id, CounterId::from(2));
        assert_eq!(c.count, 2);

        let untouched = Entity::find_by_id(5).one(&repo.db).await.unwrap().unwrap();
        assert_eq!(untouched.count, 20);
        assert_eq!(row_count(&repo).await, 2);
    }

    #[tokio::test]
    async fn test_concurrent_increments_are_not_lost() {
        let repo = setup().await;
        let svc = Arc::new(CounterAppService::new(Arc::new(repo.clone())));

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..20 {
            let svc = svc.clone();
            tasks.spawn(async move {
                svc.increment_counter(IncrementCounterCmd { amount: 2 })
                    .await
                    .unwrap();
            });
        }
        while let Some(joined) = tasks.join_next().await {
            joined.unwrap();
        }

        let c = svc.get_counter().await.unwrap();
        assert_eq!(c.count, 40);
        assert_eq!(row_count(&repo).await, 1);
    }
}

pub mod consts;
pub mod middleware;
pub mod rpc;

use infra::config::AppConfigImpl;
use log::info;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};
use std::time::Duration;

pub struct AppState {
    pub app_cfg: AppConfigImpl,
    pub db: DatabaseConnection,
}

impl AppState {
    /// Opens the pool, checks it with `SELECT 1` and, when configured,
    /// brings the schema up to date.
    pub async fn init_db(app_cfg: &AppConfigImpl) -> Result<DatabaseConnection, DbErr> {
        let db_cfg = app_cfg.database();

        let mut opt = ConnectOptions::new(app_cfg.database_url());
        opt.max_connections(db_cfg.max_connections)
            .min_connections(db_cfg.min_connections)
            .connect_timeout(Duration::from_secs(db_cfg.connect_timeout_secs))
            .acquire_timeout(Duration::from_secs(db_cfg.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(60))
            .max_lifetime(Duration::from_secs(300))
            .sqlx_logging(false)
            .sqlx_logging_level(log::LevelFilter::Info);

        let db = Database::connect(opt).await?;

        let backend = db.get_database_backend();
        db.execute(Statement::from_string(backend, "SELECT 1".to_owned()))
            .await?;

        if db_cfg.auto_migrate {
            Migrator::up(&db, None).await?;
            info!("Database schema is up to date");
        }

        info!("Database connection pool initialized successfully");
        Ok(db)
    }

    pub fn new(db: DatabaseConnection, app_cfg: AppConfigImpl) -> Self {
        Self { app_cfg, db }
    }
}

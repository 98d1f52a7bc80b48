use env_logger::Env;
use sea_orm_migration::prelude::*;

/// Standalone migrator, reads `DATABASE_URL` (or `-u`) like the sea-orm CLI.
#[async_std::main]
async fn main() {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    log::info!("running counter schema migrations");
    cli::run_cli(migration::Migrator).await;
}

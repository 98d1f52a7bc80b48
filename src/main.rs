use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use std::io::{Error, ErrorKind};

use infra::config::AppConfigImpl;
use log::info;
use log4rs::{
    append::{console::ConsoleAppender, file::FileAppender},
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
};

use server::middleware::other;

const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {m}{n}";

/// 配置日志同时输出到控制台和文件
fn init_logging(log_file: &str) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build(log_file)?;
    let stdout_appender = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build();

    let config = Config::builder()
        .appender(Appender::builder().build("file", Box::new(file_appender)))
        .appender(Appender::builder().build("stdout", Box::new(stdout_appender)))
        .build(
            Root::builder()
                .appender("file")
                .appender("stdout")
                .build(log_level.parse().unwrap_or(log::LevelFilter::Info)),
        )?;

    log4rs::init_config(config)?;
    Ok(())
}

fn startup_error(context: &str, err: impl std::fmt::Display) -> Error {
    Error::new(ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let cfg = AppConfigImpl::load().map_err(|e| startup_error("load config", e))?;
    init_logging(&cfg.log_file()).map_err(|e| startup_error("init logging", e))?;

    if cfg.database_url().is_empty() {
        return Err(startup_error(
            "load config",
            "database_url is not set (config.toml, APP__DATABASE_URL or DATABASE_URL)",
        ));
    }

    let server_cfg = cfg.server();
    let db = server::AppState::init_db(&cfg)
        .await
        .map_err(|e| startup_error("connect database", e))?;

    let app_state = web::Data::new(server::AppState::new(db, cfg));

    info!(
        "tally listening on {}:{}",
        server_cfg.host, server_cfg.port
    );
    let result = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(Logger::default())
            .configure(server::rpc::configure_service)
            .wrap(other::cors())
    })
    .bind((server_cfg.host.as_str(), server_cfg.port))?
    .run()
    .await;

    // the pool is closed when the last AppState handle drops
    info!("tally stopped");
    result
}

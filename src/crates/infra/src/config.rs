use config::{Config, Environment, File};
use dotenvy::dotenv;
use serde::Deserialize;
use std::error::Error;

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawConfig {
    database_url: String,
    /// log4rs 文件输出路径
    log_file: String,
    /// 连接池配置
    database: RawDatabaseConfig,
    /// 服务器配置
    server: RawServerConfig,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            database_url: "".to_string(),
            log_file: "app.log".to_string(),
            database: RawDatabaseConfig::default(),
            server: RawServerConfig::default(),
        }
    }
}

/// 连接池配置（原始配置）
#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawDatabaseConfig {
    max_connections: u32,
    min_connections: u32,
    connect_timeout_secs: u64,
    acquire_timeout_secs: u64,
    /// 启动时执行迁移
    auto_migrate: bool,
}

impl Default for RawDatabaseConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 3,
            acquire_timeout_secs: 8,
            auto_migrate: true,
        }
    }
}

/// 服务器配置（原始配置）
#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawServerConfig {
    /// 监听地址
    host: String,
    /// 监听端口
    port: u16,
}

impl Default for RawServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5533,
        }
    }
}

/// 连接池配置
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub acquire_timeout_secs: u64,
    pub auto_migrate: bool,
}

/// 服务器配置
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// 监听地址
    pub host: String,
    /// 监听端口
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct AppConfigImpl {
    database_url: String,
    log_file: String,
    database: DatabaseConfig,
    server: ServerConfig,
}

impl Default for AppConfigImpl {
    fn default() -> Self {
        Self::new(RawConfig::default())
    }
}

impl AppConfigImpl {
    fn new(data: RawConfig) -> Self {
        let database_config = DatabaseConfig {
            max_connections: data.database.max_connections,
            min_connections: data.database.min_connections,
            connect_timeout_secs: data.database.connect_timeout_secs,
            acquire_timeout_secs: data.database.acquire_timeout_secs,
            auto_migrate: data.database.auto_migrate,
        };
        let server_config = ServerConfig {
            host: data.server.host,
            port: data.server.port,
        };
        AppConfigImpl {
            database_url: data.database_url,
            log_file: data.log_file,
            database: database_config,
            server: server_config,
        }
    }

    /// `config.*` in the working directory, then `APP__*` environment
    /// variables, then `.env`.
    pub fn load() -> Result<AppConfigImpl, Box<dyn Error>> {
        dotenv().ok();
        Self::load_from("config")
    }

    pub fn load_from(file: &str) -> Result<AppConfigImpl, Box<dyn Error>> {
        let config = Config::builder()
            .add_source(File::with_name(file).required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        let mut raw: RawConfig = config.try_deserialize()?; // serde 自动填充默认值
        if raw.database_url.is_empty() {
            // sea-orm 工具链的约定
            if let Ok(url) = std::env::var("DATABASE_URL") {
                raw.database_url = url;
            }
        }
        Ok(AppConfigImpl::new(raw))
    }

    pub fn database_url(&self) -> String {
        self.database_url.clone()
    }

    pub fn log_file(&self) -> String {
        self.log_file.clone()
    }

    pub fn database(&self) -> DatabaseConfig {
        self.database.clone()
    }

    pub fn server(&self) -> ServerConfig {
        self.server.clone()
    }
}

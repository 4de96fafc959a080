use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub import: ImportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 单次上传请求体上限 (字节)
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    /// 获取连接的等待上限 (秒)
    pub acquire_timeout_secs: u64,
    /// 超过该耗时的语句记 warn 日志 (秒)
    pub slow_statement_secs: u64,
    pub backend: StoreBackend,
}

/// 文件位置: 上传暂存目录、导出目录、发票模板
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
    pub export_dir: PathBuf,
    pub template_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// 非数据行标记 (小计、结转余额等)
    pub non_data_markers: Vec<String>,
    /// 两位年份的世纪分界: None 表示一律 20YY; Some(p) 时 YY > p 视为 19YY
    pub century_pivot: Option<u8>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            non_data_markers: vec!["소계".to_string(), "이월잔액".to_string()],
            century_pivot: None,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                max_upload_bytes: 50 * 1024 * 1024,
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgres://localhost/medsupply".to_string()),
                max_connections: 20,
                acquire_timeout_secs: 10,
                slow_statement_secs: 5,
                backend: StoreBackend::Postgres,
            },
            storage: StorageConfig {
                upload_dir: PathBuf::from("uploads"),
                export_dir: PathBuf::from("exports"),
                template_path: PathBuf::from("templates/invoice_template.pdf"),
            },
            import: ImportConfig::default(),
        }
    }
}

impl AppConfig {
    /// 加载配置: 默认值 -> 配置文件 (可选) -> APP__ 前缀环境变量 -> 兼容旧环境变量
    pub fn load() -> Result<Self, config::ConfigError> {
        let defaults = config::Config::try_from(&AppConfig::default())?;
        let file = std::env::var("APP_CONFIG").unwrap_or_else(|_| "config/default".to_string());

        let mut loaded: AppConfig = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name(&file).required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("import.non_data_markers")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        loaded.apply_legacy_env();
        Ok(loaded)
    }

    /// 从环境变量加载配置 (不读取配置文件)
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_legacy_env();
        config
    }

    fn apply_legacy_env(&mut self) {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.database.url = url;
        }
    }
}

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;
use std::time::Duration;

use crate::config::DatabaseConfig;

/// 连接池参数, 全部来自 `[database]` 配置段
fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
}

/// 创建数据库连接池
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    // 慢查询日志阈值
    let connect_options = PgConnectOptions::from_str(&config.url)?.log_slow_statements(
        tracing::log::LevelFilter::Warn,
        Duration::from_secs(config.slow_statement_secs),
    );

    tracing::debug!(
        "连接池: 最大连接 {}, 获取超时 {}秒, 慢查询阈值 {}秒",
        config.max_connections,
        config.acquire_timeout_secs,
        config.slow_statement_secs
    );
    pool_options(config).connect_with(connect_options).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn pool_limits_follow_database_config() {
        let mut config = AppConfig::default().database;
        config.max_connections = 4;
        config.acquire_timeout_secs = 3;

        let options = pool_options(&config);
        assert_eq!(options.get_max_connections(), 4);
        assert_eq!(options.get_acquire_timeout(), Duration::from_secs(3));
    }
}

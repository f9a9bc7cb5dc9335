use shared::models::DEFAULT_LOW_STOCK_THRESHOLD;
use std::path::PathBuf;
use std::time::Duration;

/// 数据库文件名 (位于 WORK_DIR 下)
const DB_FILE_NAME: &str = "ledger.redb";

/// 服务器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (数据库文件) |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | REQUEST_TIMEOUT_MS | 5000 | 单次账本操作超时(毫秒) |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | - | 日志目录 (未设置则只输出到控制台) |
/// | ENVIRONMENT | development | 运行环境 |
/// | KNOWN_CATEGORIES | Beer,Cocktail,Snack,Other | 产品分类 (逗号分隔) |
/// | LOW_STOCK_THRESHOLD | 5 | 默认低库存阈值 |
/// | EVENT_CHANNEL_CAPACITY | 1024 | 订单事件广播容量 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/bar HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存放 ledger.redb
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 请求超时时间 (毫秒)
    pub request_timeout_ms: u64,
    pub log_level: String,
    pub log_dir: Option<String>,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 已知产品分类
    pub known_categories: Vec<String>,
    /// 新产品默认低库存阈值
    pub low_stock_threshold: i64,
    /// 事件广播通道容量
    pub event_channel_capacity: usize,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置或无法解析，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            http_port: env_parse("HTTP_PORT", 3000),
            request_timeout_ms: env_parse("REQUEST_TIMEOUT_MS", 5000),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.trim().is_empty()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            known_categories: std::env::var("KNOWN_CATEGORIES")
                .map(|v| parse_categories(&v))
                .ok()
                .filter(|c| !c.is_empty())
                .unwrap_or_else(default_categories),
            low_stock_threshold: env_parse("LOW_STOCK_THRESHOLD", DEFAULT_LOW_STOCK_THRESHOLD),
            event_channel_capacity: env_parse("EVENT_CHANNEL_CAPACITY", 1024),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// 数据库文件路径
    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join(DB_FILE_NAME)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn default_categories() -> Vec<String> {
    ["Beer", "Cocktail", "Snack", "Other"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// "Beer, Wine,,Snack" → ["Beer", "Wine", "Snack"]
fn parse_categories(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_categories() {
        assert_eq!(parse_categories("Beer, Wine,,Snack "), vec!["Beer", "Wine", "Snack"]);
        assert!(parse_categories(" , ").is_empty());
    }

    #[test]
    fn test_db_path_under_work_dir() {
        let config = Config::with_overrides("/tmp/bar", 0);
        assert_eq!(config.db_path(), PathBuf::from("/tmp/bar/ledger.redb"));
        assert_eq!(config.http_port, 0);
    }
}

use serde::{Deserialize, Serialize};

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "linkvault.toml";

/// 静态配置（从 TOML 加载，启动时使用）
///
/// - database: 链接元数据存储
/// - links: 短链接生成与过期策略
/// - sweeper: 过期清扫任务
/// - blob: 文件内容存储
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub links: LinkConfig,
    #[serde(default)]
    pub sweeper: SweeperConfig,
    #[serde(default)]
    pub blob: BlobConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > 配置文件 > 默认值
    /// ENV 前缀：LV，分隔符：__
    /// 示例：LV__SWEEPER__INTERVAL_SECS=30
    pub fn load(path: Option<&str>) -> Self {
        use config::{Config, Environment, File};

        let path = path.unwrap_or(DEFAULT_CONFIG_PATH);

        let builder = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("LV")
                    .separator("__")
                    .try_parsing(true),
            );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<StaticConfig>() {
                Ok(config) => {
                    if std::path::Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        }
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 数据库连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// `sqlite://`, `mysql://`, `postgres://` or `memory://`
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_database_timeout")]
    pub timeout: u64,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

/// 链接创建策略
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkConfig {
    #[serde(default = "default_id_length")]
    pub id_length: usize,
    #[serde(default = "default_expiry_minutes")]
    pub default_expiry_minutes: i64,
    /// Id collision retries before giving up
    #[serde(default = "default_max_id_attempts")]
    pub max_id_attempts: u32,
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: usize,
}

/// 过期清扫配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweeperConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_sweep_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_sweep_batch_size")]
    pub batch_size: u64,
    #[serde(default = "default_max_batches_per_cycle")]
    pub max_batches_per_cycle: u32,
    #[serde(default = "default_blob_delete_timeout_secs")]
    pub blob_delete_timeout_secs: u64,
}

/// 文件内容存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobConfig {
    /// "fs" | "memory"
    #[serde(default = "default_blob_backend")]
    pub backend: String,
    #[serde(default = "default_blob_root")]
    pub root: String,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_true")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions
// ============================================================

fn default_true() -> bool {
    true
}

fn default_database_url() -> String {
    "linkvault.db".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_database_timeout() -> u64 {
    30
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    100
}

fn default_retry_max_delay_ms() -> u64 {
    2000
}

fn default_id_length() -> usize {
    6
}

fn default_expiry_minutes() -> i64 {
    10
}

fn default_max_id_attempts() -> u32 {
    5
}

fn default_max_file_bytes() -> usize {
    5 * 1024 * 1024
}

fn default_sweep_interval_secs() -> u64 {
    60
}

fn default_sweep_batch_size() -> u64 {
    500
}

fn default_max_batches_per_cycle() -> u32 {
    20
}

fn default_blob_delete_timeout_secs() -> u64 {
    10
}

fn default_blob_backend() -> String {
    "fs".to_string()
}

fn default_blob_root() -> String {
    "./data/blobs".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

// ============================================================
// Default implementations
// ============================================================

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            pool_size: default_database_pool_size(),
            timeout: default_database_timeout(),
            retry_count: default_retry_count(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            id_length: default_id_length(),
            default_expiry_minutes: default_expiry_minutes(),
            max_id_attempts: default_max_id_attempts(),
            max_file_bytes: default_max_file_bytes(),
        }
    }
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: default_sweep_interval_secs(),
            batch_size: default_sweep_batch_size(),
            max_batches_per_cycle: default_max_batches_per_cycle(),
            blob_delete_timeout_secs: default_blob_delete_timeout_secs(),
        }
    }
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            backend: default_blob_backend(),
            root: default_blob_root(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: true,
        }
    }
}

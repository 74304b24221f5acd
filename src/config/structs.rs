use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::{HolderError, Result};

/// 环境变量前缀，分隔符为 `__`，例如 `OH__LOGGING__LEVEL=debug`
pub const ENV_PREFIX: &str = "OH";

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 静态配置（从 TOML 加载，启动时使用）
///
/// 包含：
/// - logging: 日志配置
/// - payload: 构造载荷校验策略
/// - race: 竞争演示的默认参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub payload: PayloadConfig,
    #[serde(default)]
    pub race: RaceConfig,
}

impl StaticConfig {
    /// 从 `config.toml` 和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值。`config.toml` 可以不存在；
    /// 加载失败时回退到默认值。
    pub fn load() -> Self {
        match Self::load_with_env(DEFAULT_CONFIG_PATH, false, None) {
            Ok(config) => {
                if Path::new(DEFAULT_CONFIG_PATH).exists() {
                    eprintln!("[INFO] Configuration loaded from: {}", DEFAULT_CONFIG_PATH);
                }
                config
            }
            Err(e) => {
                eprintln!("[ERROR] {}", e);
                Self::default()
            }
        }
    }

    /// 从用户指定的文件和进程环境变量加载配置
    ///
    /// 文件必须存在，否则返回 `HolderError::FileOperation`。
    pub fn load_from(path: &str) -> Result<Self> {
        Self::load_with_env(path, true, None)
    }

    /// 从指定文件加载，并用给定的变量表代替进程环境
    ///
    /// `required` 为 `true` 时文件不存在即报错；`env` 为 `None` 时读取真实的进程环境。
    pub fn load_with_env(
        path: &str,
        required: bool,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self> {
        use config::{Config, Environment, File};

        if required && !Path::new(path).is_file() {
            return Err(HolderError::file_operation(format!(
                "Config file not found: {}",
                path
            )));
        }

        let settings = Config::builder()
            .add_source(File::with_name(path).required(required))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?;

        Ok(settings.try_deserialize::<StaticConfig>()?)
    }

    /// 生成示例 TOML 配置
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
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

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `text` 或 `json`
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub enable_rotation: bool,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            enable_rotation: false,
            max_backups: default_max_backups(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadConfig {
    #[serde(default)]
    pub allow_empty: bool,
    /// 0 表示不限制
    #[serde(default = "default_payload_max_len")]
    pub max_len: usize,
}

impl Default for PayloadConfig {
    fn default() -> Self {
        Self {
            allow_empty: false,
            max_len: default_payload_max_len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceConfig {
    #[serde(default = "default_race_threads")]
    pub threads: usize,
    #[serde(default = "default_race_prefix")]
    pub prefix: String,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            threads: default_race_threads(),
            prefix: default_race_prefix(),
        }
    }
}

// ============================================================
// Default value functions
// ============================================================

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_payload_max_len() -> usize {
    4096
}

fn default_race_threads() -> usize {
    100
}

fn default_race_prefix() -> String {
    "thread-".to_string()
}

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HolderError {
    Construction(String),
    Config(String),
    FileOperation(String),
    Serialization(String),
    Thread(String),
}

impl HolderError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            HolderError::Construction(_) => "E001",
            HolderError::Config(_) => "E002",
            HolderError::FileOperation(_) => "E003",
            HolderError::Serialization(_) => "E004",
            HolderError::Thread(_) => "E005",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            HolderError::Construction(_) => "Construction Error",
            HolderError::Config(_) => "Configuration Error",
            HolderError::FileOperation(_) => "File Operation Error",
            HolderError::Serialization(_) => "Serialization Error",
            HolderError::Thread(_) => "Thread Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            HolderError::Construction(msg) => msg,
            HolderError::Config(msg) => msg,
            HolderError::FileOperation(msg) => msg,
            HolderError::Serialization(msg) => msg,
            HolderError::Thread(msg) => msg,
        }
    }

    /// 格式化为彩色输出（用于终端）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for HolderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for HolderError {}

// 便捷的构造函数
impl HolderError {
    pub fn construction<T: Into<String>>(msg: T) -> Self {
        HolderError::Construction(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        HolderError::Config(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        HolderError::FileOperation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        HolderError::Serialization(msg.into())
    }

    pub fn thread<T: Into<String>>(msg: T) -> Self {
        HolderError::Thread(msg.into())
    }
}

impl From<std::io::Error> for HolderError {
    fn from(err: std::io::Error) -> Self {
        HolderError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for HolderError {
    fn from(err: serde_json::Error) -> Self {
        HolderError::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for HolderError {
    fn from(err: toml::ser::Error) -> Self {
        HolderError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for HolderError {
    fn from(err: config::ConfigError) -> Self {
        HolderError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, HolderError>;

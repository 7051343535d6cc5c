use std::fmt;

#[derive(Debug, Clone)]
pub enum LinkVaultError {
    Validation(String),
    InvalidExpiry(String),
    DuplicateId(String),
    GenerationExhausted(String),
    NotFound(String),
    Forbidden(String),
    PasswordHash(String),
    BlobStorage(String),
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    FileOperation(String),
    Serialization(String),
    Config(String),
}

impl LinkVaultError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            LinkVaultError::Validation(_) => "E001",
            LinkVaultError::InvalidExpiry(_) => "E002",
            LinkVaultError::DuplicateId(_) => "E003",
            LinkVaultError::GenerationExhausted(_) => "E004",
            LinkVaultError::NotFound(_) => "E005",
            LinkVaultError::Forbidden(_) => "E006",
            LinkVaultError::PasswordHash(_) => "E007",
            LinkVaultError::BlobStorage(_) => "E008",
            LinkVaultError::DatabaseConfig(_) => "E009",
            LinkVaultError::DatabaseConnection(_) => "E010",
            LinkVaultError::DatabaseOperation(_) => "E011",
            LinkVaultError::FileOperation(_) => "E012",
            LinkVaultError::Serialization(_) => "E013",
            LinkVaultError::Config(_) => "E014",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            LinkVaultError::Validation(_) => "Validation Error",
            LinkVaultError::InvalidExpiry(_) => "Invalid Expiry",
            LinkVaultError::DuplicateId(_) => "Duplicate Link Id",
            LinkVaultError::GenerationExhausted(_) => "Id Generation Exhausted",
            LinkVaultError::NotFound(_) => "Resource Not Found",
            LinkVaultError::Forbidden(_) => "Forbidden",
            LinkVaultError::PasswordHash(_) => "Password Hash Error",
            LinkVaultError::BlobStorage(_) => "Blob Storage Error",
            LinkVaultError::DatabaseConfig(_) => "Database Configuration Error",
            LinkVaultError::DatabaseConnection(_) => "Database Connection Error",
            LinkVaultError::DatabaseOperation(_) => "Database Operation Error",
            LinkVaultError::FileOperation(_) => "File Operation Error",
            LinkVaultError::Serialization(_) => "Serialization Error",
            LinkVaultError::Config(_) => "Configuration Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            LinkVaultError::Validation(msg)
            | LinkVaultError::InvalidExpiry(msg)
            | LinkVaultError::DuplicateId(msg)
            | LinkVaultError::GenerationExhausted(msg)
            | LinkVaultError::NotFound(msg)
            | LinkVaultError::Forbidden(msg)
            | LinkVaultError::PasswordHash(msg)
            | LinkVaultError::BlobStorage(msg)
            | LinkVaultError::DatabaseConfig(msg)
            | LinkVaultError::DatabaseConnection(msg)
            | LinkVaultError::DatabaseOperation(msg)
            | LinkVaultError::FileOperation(msg)
            | LinkVaultError::Serialization(msg)
            | LinkVaultError::Config(msg) => msg,
        }
    }

    /// Store / blob backend unavailability. Callers surface these as a
    /// transient server error; request paths never retry them on their own.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LinkVaultError::DatabaseConnection(_)
                | LinkVaultError::DatabaseOperation(_)
                | LinkVaultError::BlobStorage(_)
        )
    }

    /// Errors the caller can fix by changing the request.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            LinkVaultError::Validation(_) | LinkVaultError::InvalidExpiry(_)
        )
    }

    /// 格式化为彩色输出
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

impl fmt::Display for LinkVaultError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for LinkVaultError {}

// 便捷的构造函数
impl LinkVaultError {
    pub fn validation<T: Into<String>>(msg: T) -> Self {
        LinkVaultError::Validation(msg.into())
    }

    pub fn invalid_expiry<T: Into<String>>(msg: T) -> Self {
        LinkVaultError::InvalidExpiry(msg.into())
    }

    pub fn duplicate_id<T: Into<String>>(msg: T) -> Self {
        LinkVaultError::DuplicateId(msg.into())
    }

    pub fn generation_exhausted<T: Into<String>>(msg: T) -> Self {
        LinkVaultError::GenerationExhausted(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        LinkVaultError::NotFound(msg.into())
    }

    pub fn forbidden<T: Into<String>>(msg: T) -> Self {
        LinkVaultError::Forbidden(msg.into())
    }

    pub fn password_hash<T: Into<String>>(msg: T) -> Self {
        LinkVaultError::PasswordHash(msg.into())
    }

    pub fn blob_storage<T: Into<String>>(msg: T) -> Self {
        LinkVaultError::BlobStorage(msg.into())
    }

    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        LinkVaultError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        LinkVaultError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        LinkVaultError::DatabaseOperation(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        LinkVaultError::FileOperation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        LinkVaultError::Serialization(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        LinkVaultError::Config(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for LinkVaultError {
    fn from(err: sea_orm::DbErr) -> Self {
        LinkVaultError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for LinkVaultError {
    fn from(err: std::io::Error) -> Self {
        LinkVaultError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for LinkVaultError {
    fn from(err: serde_json::Error) -> Self {
        LinkVaultError::Serialization(err.to_string())
    }
}

impl From<tokio::task::JoinError> for LinkVaultError {
    fn from(err: tokio::task::JoinError) -> Self {
        LinkVaultError::PasswordHash(format!("blocking task failed: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, LinkVaultError>;

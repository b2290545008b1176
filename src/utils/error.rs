use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrawlerError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV export error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Upstream API error: {message}")]
    ApiError { message: String },

    #[error("Upstream returned HTTP {status}")]
    HttpStatusError { status: u16 },

    #[error("No ranking data could be fetched")]
    EmptyDataError,

    #[error("{operation} timed out after {seconds}s")]
    TimeoutError { operation: String, seconds: u64 },

    #[error("Invalid portfolio id: '{0}'")]
    InvalidPortfolioId(String),

    #[error("Cache error: {message}")]
    CacheError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("git executable '{program}' is not available")]
    GitUnavailableError { program: String },

    #[error("git command failed: {message}")]
    GitError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Upstream,
    Storage,
    Data,
    Configuration,
    Deployment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// CLI 退出碼
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl CrawlerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CrawlerError::HttpError(_) | CrawlerError::TimeoutError { .. } => ErrorCategory::Network,
            CrawlerError::ApiError { .. }
            | CrawlerError::HttpStatusError { .. }
            | CrawlerError::EmptyDataError => ErrorCategory::Upstream,
            CrawlerError::IoError(_) | CrawlerError::CacheError { .. } => ErrorCategory::Storage,
            CrawlerError::SerializationError(_)
            | CrawlerError::CsvError(_)
            | CrawlerError::InvalidPortfolioId(_) => ErrorCategory::Data,
            CrawlerError::ConfigError { .. }
            | CrawlerError::InvalidConfigValueError { .. }
            | CrawlerError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            CrawlerError::GitUnavailableError { .. } | CrawlerError::GitError { .. } => {
                ErrorCategory::Deployment
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network | ErrorCategory::Upstream => ErrorSeverity::Medium,
            ErrorCategory::Data => ErrorSeverity::Low,
            ErrorCategory::Storage | ErrorCategory::Deployment => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    /// 可重試的錯誤：網路與上游暫時性失敗
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Network | ErrorCategory::Upstream
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CrawlerError::IoError(e) if e.kind() == std::io::ErrorKind::NotFound)
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check network connectivity and retry later",
            ErrorCategory::Upstream => {
                "The ranking API may be throttling or down; wait for the next refresh"
            }
            ErrorCategory::Storage => "Verify the cache directory exists and is writable",
            ErrorCategory::Data => "Check the request parameters and upstream payload format",
            ErrorCategory::Configuration => "Review the configuration file and CLI arguments",
            ErrorCategory::Deployment => "Install git and make sure it is on PATH",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            CrawlerError::EmptyDataError => "未获取到任何排行榜数据".to_string(),
            CrawlerError::TimeoutError { operation, seconds } => {
                format!("{} 超时 ({}秒)", operation, seconds)
            }
            CrawlerError::InvalidPortfolioId(_) => "无效的组合ID格式".to_string(),
            CrawlerError::GitUnavailableError { .. } => "未找到 git，请先安装 git".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CrawlerError>;

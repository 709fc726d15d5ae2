//! 统一错误类型模块
//!
//! 提供 dragrace-auth 中所有操作的错误类型定义。
//!
//! 注意：登录时的验证失败（未知格式、格式损坏、密码错误）不会以错误形式返回，
//! 而是统一折叠为 [`VerifyOutcome::Rejected`](crate::password::VerifyOutcome::Rejected)。
//! 这里的错误只出现在生成哈希和启动期配置校验中。

use std::fmt;

/// dragrace-auth 的统一结果类型
pub type Result<T> = std::result::Result<T, Error>;

/// dragrace-auth 的错误类型
#[derive(Debug)]
pub enum Error {
    /// 密码哈希错误
    PasswordHash(PasswordHashError),

    /// 配置错误（启动期致命错误）
    Config(ConfigError),

    /// 加密错误
    Crypto(CryptoError),
}

impl Error {
    /// 是否为配置错误
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}

/// 密码哈希相关错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordHashError {
    /// 哈希生成失败
    HashFailed(String),
    /// 算法不支持
    UnsupportedAlgorithm(String),
}

/// 配置相关错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// 无效的配置值
    InvalidValue { key: String, message: String },
    /// 两个策略的识别器对同一个值都返回 true
    AmbiguousRecognizers {
        /// 错误地认领了该值的策略
        claimed_by: String,
        /// 产生该样例值的策略
        sample_of: String,
    },
    /// 同名策略被注册了两次
    DuplicateStrategy(String),
    /// 配置文件解析失败
    Parse(String),
}

/// 加密相关错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// 随机数生成失败
    RngFailed(String),
}

// ============================================================================
// Display 实现
// ============================================================================

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::PasswordHash(e) => write!(f, "Password hash error: {}", e),
            Error::Config(e) => write!(f, "Config error: {}", e),
            Error::Crypto(e) => write!(f, "Crypto error: {}", e),
        }
    }
}

impl fmt::Display for PasswordHashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PasswordHashError::HashFailed(msg) => write!(f, "hash generation failed: {}", msg),
            PasswordHashError::UnsupportedAlgorithm(alg) => {
                write!(f, "unsupported algorithm: {}", alg)
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidValue { key, message } => {
                write!(f, "invalid configuration value for '{}': {}", key, message)
            }
            ConfigError::AmbiguousRecognizers {
                claimed_by,
                sample_of,
            } => write!(
                f,
                "ambiguous hash recognizers: '{}' recognizes values produced by '{}'",
                claimed_by, sample_of
            ),
            ConfigError::DuplicateStrategy(name) => {
                write!(f, "hash strategy '{}' registered more than once", name)
            }
            ConfigError::Parse(msg) => write!(f, "failed to parse configuration: {}", msg),
        }
    }
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CryptoError::RngFailed(msg) => write!(f, "random number generation failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}
impl std::error::Error for PasswordHashError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for CryptoError {}

// ============================================================================
// From 实现
// ============================================================================

impl From<PasswordHashError> for Error {
    fn from(err: PasswordHashError) -> Self {
        Error::PasswordHash(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

impl From<CryptoError> for Error {
    fn from(err: CryptoError) -> Self {
        Error::Crypto(err)
    }
}

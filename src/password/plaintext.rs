//! 明文兼容策略
//!
//! 只用于迁移更早期系统遗留的凭据：存储值以哨兵前缀开头，其余部分就是原始密码。
//! 这种值永远不是"最新"的，验证通过后一定会被重新哈希。

use crate::error::{ConfigError, Error, Result};
use crate::random::constant_time_compare;

use super::strategy::HashStrategy;

/// 默认哨兵前缀
pub const DEFAULT_PLAINTEXT_PREFIX: &str = "{";

/// 明文策略
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaintextStrategy {
    prefix: String,
}

impl Default for PlaintextStrategy {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PLAINTEXT_PREFIX.to_string(),
        }
    }
}

impl PlaintextStrategy {
    /// 使用默认前缀 `{` 创建
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用自定义前缀创建，前缀不能为空
    pub fn with_prefix(prefix: impl Into<String>) -> Result<Self> {
        let prefix = prefix.into();
        if prefix.is_empty() {
            return Err(Error::Config(ConfigError::InvalidValue {
                key: "prefix".to_string(),
                message: "plaintext prefix cannot be empty".to_string(),
            }));
        }
        Ok(Self { prefix })
    }

    /// 哨兵前缀
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl HashStrategy for PlaintextStrategy {
    fn name(&self) -> &'static str {
        "plaintext"
    }

    fn recognize(&self, stored: &str) -> bool {
        stored.starts_with(&self.prefix)
    }

    fn hash(&self, password: &str) -> Result<String> {
        Ok(format!("{}{}", self.prefix, password))
    }

    fn verify(&self, stored: &str, password: &str) -> bool {
        match stored.strip_prefix(&self.prefix) {
            Some(secret) => constant_time_compare(secret.as_bytes(), password.as_bytes()),
            None => false,
        }
    }

    fn is_current(&self, _stored: &str) -> bool {
        false
    }

    fn samples(&self) -> Vec<String> {
        vec![self.prefix.clone(), format!("{}hunter2", self.prefix)]
    }

    fn claimed_prefix(&self) -> Option<&str> {
        Some(&self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognize_prefix() {
        let strategy = PlaintextStrategy::new();

        assert!(strategy.recognize("{hunter2"));
        assert!(strategy.recognize("{"));
        assert!(!strategy.recognize("hunter2"));
        assert!(!strategy.recognize(""));
        assert!(!strategy.recognize("$2b$12$abc"));
    }

    #[test]
    fn test_verify() {
        let strategy = PlaintextStrategy::new();

        assert!(strategy.verify("{hunter2", "hunter2"));
        assert!(!strategy.verify("{hunter2", "hunter3"));
        assert!(!strategy.verify("{hunter2", "{hunter2"));
        assert!(!strategy.verify("hunter2", "hunter2"));
        // 空密码
        assert!(strategy.verify("{", ""));
    }

    #[test]
    fn test_never_current() {
        let strategy = PlaintextStrategy::new();
        let stored = strategy.hash("hunter2").unwrap();

        assert_eq!(stored, "{hunter2");
        assert!(!strategy.is_current(&stored));
    }

    #[test]
    fn test_custom_prefix() {
        let strategy = PlaintextStrategy::with_prefix("plain:").unwrap();

        assert_eq!(strategy.hash("pw").unwrap(), "plain:pw");
        assert!(strategy.verify("plain:pw", "pw"));
        assert!(!strategy.recognize("{pw"));
    }

    #[test]
    fn test_claimed_prefix() {
        let strategy = PlaintextStrategy::with_prefix("plain:").unwrap();
        assert_eq!(strategy.claimed_prefix(), Some("plain:"));
    }

    #[test]
    fn test_empty_prefix_rejected() {
        assert!(PlaintextStrategy::with_prefix("").is_err());
    }
}

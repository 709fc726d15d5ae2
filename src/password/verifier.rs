//! 凭据验证器
//!
//! 登录时验证密码，并在存储值过期（非首选策略，或首选策略参数已变更）时
//! 顺便用首选策略重新哈希。验证器只计算新值，不负责持久化。

use std::sync::Arc;

use crate::error::{Error, PasswordHashError, Result};

use super::registry::HasherRegistry;

/// 密码验证结果
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// 验证失败：密码错误、格式未知或格式损坏，调用方不应区分
    Rejected,
    /// 验证通过，存储值已是最新
    Accepted,
    /// 验证通过，调用方需要用新值替换存储值
    Rehashed(String),
}

impl VerifyOutcome {
    /// 是否验证通过
    pub fn is_accepted(&self) -> bool {
        !matches!(self, VerifyOutcome::Rejected)
    }

    /// 需要持久化的新哈希值
    pub fn rehashed(&self) -> Option<&str> {
        match self {
            VerifyOutcome::Rehashed(hash) => Some(hash.as_str()),
            _ => None,
        }
    }

    /// 取出需要持久化的新哈希值
    pub fn into_rehashed(self) -> Option<String> {
        match self {
            VerifyOutcome::Rehashed(hash) => Some(hash),
            _ => None,
        }
    }
}

/// 凭据验证器
///
/// 内部持有共享的只读注册表，克隆开销很小，可以在请求之间自由传递。
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use dragrace_auth::password::{
///     BcryptStrategy, CredentialVerifier, HasherRegistry, PlaintextStrategy, VerifyOutcome,
/// };
///
/// let registry = HasherRegistry::builder(BcryptStrategy::new().with_cost(4))
///     .with_legacy(PlaintextStrategy::new())
///     .build()
///     .unwrap();
/// let verifier = CredentialVerifier::new(Arc::new(registry));
///
/// let stored = verifier.set_password("hunter2").unwrap();
/// assert_eq!(verifier.verify_password(&stored, "hunter2"), VerifyOutcome::Accepted);
/// assert_eq!(verifier.verify_password(&stored, "hunter3"), VerifyOutcome::Rejected);
///
/// // 旧格式验证通过后给出新的哈希值
/// let outcome = verifier.verify_password("{hunter2", "hunter2");
/// assert!(outcome.rehashed().unwrap().starts_with("$2b$04$"));
/// ```
#[derive(Debug, Clone)]
pub struct CredentialVerifier {
    registry: Arc<HasherRegistry>,
}

impl Default for CredentialVerifier {
    fn default() -> Self {
        Self::new(Arc::new(HasherRegistry::default()))
    }
}

impl CredentialVerifier {
    /// 使用给定注册表创建验证器
    pub fn new(registry: Arc<HasherRegistry>) -> Self {
        Self { registry }
    }

    /// 底层注册表
    pub fn registry(&self) -> &HasherRegistry {
        &self.registry
    }

    /// 设置新密码，总是使用首选策略
    pub fn set_password(&self, password: &str) -> Result<String> {
        self.registry.preferred().hash(password)
    }

    /// 管理员重置：使用指定名称的策略生成存储值
    ///
    /// 这是唯一可以用遗留策略生成新值的入口。
    pub fn reset_password_with(&self, strategy: &str, password: &str) -> Result<String> {
        let hasher = self.registry.get(strategy).ok_or_else(|| {
            Error::PasswordHash(PasswordHashError::UnsupportedAlgorithm(
                strategy.to_string(),
            ))
        })?;

        tracing::info!(strategy = hasher.name(), "password reset by administrator");
        hasher.hash(password)
    }

    /// 验证密码
    ///
    /// 所有失败情况都折叠为 [`VerifyOutcome::Rejected`]，不会返回错误或 panic。
    pub fn verify_password(&self, stored: &str, password: &str) -> VerifyOutcome {
        let Some(resolution) = self.registry.resolve(stored) else {
            tracing::debug!(reason = "unrecognized", "credential rejected");
            return VerifyOutcome::Rejected;
        };

        let strategy = resolution.strategy();
        tracing::debug!(strategy = strategy.name(), "resolved hash strategy");

        if !strategy.verify(stored, password) {
            tracing::debug!(
                strategy = strategy.name(),
                reason = "mismatch",
                "credential rejected"
            );
            return VerifyOutcome::Rejected;
        }

        let stale = !resolution.is_preferred() || !strategy.is_current(stored);
        if !stale {
            return VerifyOutcome::Accepted;
        }

        let preferred = self.registry.preferred();
        match preferred.hash(password) {
            Ok(rehashed) => {
                tracing::info!(
                    from = strategy.name(),
                    to = preferred.name(),
                    "credential upgraded"
                );
                VerifyOutcome::Rehashed(rehashed)
            }
            Err(e) => {
                // 旧值依然有效，下次登录再升级
                tracing::warn!(
                    from = strategy.name(),
                    to = preferred.name(),
                    error = %e,
                    "rehash failed, keeping stored credential"
                );
                VerifyOutcome::Accepted
            }
        }
    }

    /// 验证以字节形式存储的值，非 UTF-8 内容直接拒绝
    pub fn verify_password_bytes(&self, stored: &[u8], password: &str) -> VerifyOutcome {
        match std::str::from_utf8(stored) {
            Ok(stored) => self.verify_password(stored, password),
            Err(_) => {
                tracing::debug!(reason = "unrecognized", "credential rejected");
                VerifyOutcome::Rejected
            }
        }
    }

    /// 存储值是否需要重新哈希（不验证密码）
    ///
    /// 无法识别的值也返回 `true`。
    pub fn needs_rehash(&self, stored: &str) -> bool {
        match self.registry.resolve(stored) {
            Some(resolution) => {
                !resolution.is_preferred() || !resolution.strategy().is_current(stored)
            }
            None => true,
        }
    }

    /// 识别存储值所属的策略名称
    pub fn identify(&self, stored: &str) -> Option<&'static str> {
        self.registry.resolve(stored).map(|r| r.strategy().name())
    }
}

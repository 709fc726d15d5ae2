//! 哈希策略注册表
//!
//! 首选策略在前，遗留策略按注册顺序在后。注册表在启动时构建一次，之后只读，
//! 可以通过 `Arc` 在任意多个并发请求之间共享。

use std::collections::HashSet;

use crate::config::HashingConfig;
use crate::error::{ConfigError, Error, Result};

use super::bcrypt_hasher::BcryptStrategy;
use super::plaintext::PlaintextStrategy;
use super::strategy::HashStrategy;

/// 存储值的策略解析结果
#[derive(Debug, Clone, Copy)]
pub enum Resolution<'a> {
    /// 由首选策略识别
    Preferred(&'a dyn HashStrategy),
    /// 由某个遗留策略识别
    Legacy(&'a dyn HashStrategy),
}

impl<'a> Resolution<'a> {
    /// 负责该值的策略
    pub fn strategy(&self) -> &'a dyn HashStrategy {
        match self {
            Resolution::Preferred(s) | Resolution::Legacy(s) => *s,
        }
    }

    /// 是否为首选策略
    pub fn is_preferred(&self) -> bool {
        matches!(self, Resolution::Preferred(_))
    }
}

/// 哈希策略注册表
#[derive(Debug)]
pub struct HasherRegistry {
    preferred: Box<dyn HashStrategy>,
    legacy: Vec<Box<dyn HashStrategy>>,
}

impl Default for HasherRegistry {
    /// bcrypt (cost 12, 2b) 为首选，`{` 前缀的明文为遗留
    fn default() -> Self {
        Self {
            preferred: Box::new(BcryptStrategy::default()),
            legacy: vec![Box::new(PlaintextStrategy::default())],
        }
    }
}

impl HasherRegistry {
    /// 以给定首选策略开始构建注册表
    ///
    /// # Example
    ///
    /// ```rust
    /// use dragrace_auth::password::{BcryptStrategy, HasherRegistry, PlaintextStrategy};
    ///
    /// let registry = HasherRegistry::builder(BcryptStrategy::new().with_cost(10))
    ///     .with_legacy(PlaintextStrategy::new())
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(registry.preferred().name(), "bcrypt");
    /// ```
    pub fn builder(preferred: impl HashStrategy + 'static) -> HasherRegistryBuilder {
        HasherRegistryBuilder {
            preferred: Box::new(preferred),
            legacy: Vec::new(),
        }
    }

    /// 从配置构建注册表，配置无效或识别器有歧义时返回错误
    pub fn from_config(config: &HashingConfig) -> Result<Self> {
        let mut builder = HasherRegistryBuilder {
            preferred: config.preferred.to_strategy()?,
            legacy: Vec::new(),
        };
        for entry in &config.legacy {
            builder = builder.with_legacy_boxed(entry.to_strategy()?);
        }
        builder.build()
    }

    /// 首选策略
    pub fn preferred(&self) -> &dyn HashStrategy {
        self.preferred.as_ref()
    }

    /// 遗留策略（按注册顺序）
    pub fn legacy(&self) -> impl Iterator<Item = &dyn HashStrategy> {
        self.legacy.iter().map(|s| s.as_ref())
    }

    /// 按名称查找策略
    pub fn get(&self, name: &str) -> Option<&dyn HashStrategy> {
        std::iter::once(self.preferred())
            .chain(self.legacy())
            .find(|s| s.name() == name)
    }

    /// 根据存储值的格式找出负责的策略
    ///
    /// 先检查首选策略，再按顺序检查遗留策略；都不识别时返回 `None`。
    pub fn resolve(&self, stored: &str) -> Option<Resolution<'_>> {
        if self.preferred.recognize(stored) {
            return Some(Resolution::Preferred(self.preferred()));
        }

        self.legacy()
            .find(|s| s.recognize(stored))
            .map(Resolution::Legacy)
    }
}

/// 注册表构建器
#[derive(Debug)]
pub struct HasherRegistryBuilder {
    preferred: Box<dyn HashStrategy>,
    legacy: Vec<Box<dyn HashStrategy>>,
}

impl HasherRegistryBuilder {
    /// 追加一个遗留策略
    pub fn with_legacy(self, strategy: impl HashStrategy + 'static) -> Self {
        self.with_legacy_boxed(Box::new(strategy))
    }

    /// 追加一个已装箱的遗留策略
    pub fn with_legacy_boxed(mut self, strategy: Box<dyn HashStrategy>) -> Self {
        self.legacy.push(strategy);
        self
    }

    /// 校验并完成构建
    ///
    /// 策略重名或识别器存在重叠时返回 [`ConfigError`]，这类错误只会在启动时出现。
    pub fn build(self) -> Result<HasherRegistry> {
        let all: Vec<&dyn HashStrategy> = std::iter::once(self.preferred.as_ref())
            .chain(self.legacy.iter().map(|s| s.as_ref()))
            .collect();
        validate(&all)?;

        let legacy: Vec<&str> = all[1..].iter().map(|s| s.name()).collect();
        tracing::info!(
            preferred = self.preferred.name(),
            legacy = ?legacy,
            "hash strategy registry initialized"
        );

        Ok(HasherRegistry {
            preferred: self.preferred,
            legacy: self.legacy,
        })
    }
}

fn validate(strategies: &[&dyn HashStrategy]) -> Result<()> {
    let mut names = HashSet::new();
    for strategy in strategies {
        if !names.insert(strategy.name()) {
            return Err(Error::Config(ConfigError::DuplicateStrategy(
                strategy.name().to_string(),
            )));
        }
    }

    for (i, owner) in strategies.iter().enumerate() {
        for sample in owner.samples() {
            if !owner.recognize(&sample) {
                return Err(Error::Config(ConfigError::InvalidValue {
                    key: owner.name().to_string(),
                    message: "strategy does not recognize its own sample values".to_string(),
                }));
            }

            for (j, other) in strategies.iter().enumerate() {
                if i != j && other.recognize(&sample) {
                    return Err(Error::Config(ConfigError::AmbiguousRecognizers {
                        claimed_by: other.name().to_string(),
                        sample_of: owner.name().to_string(),
                    }));
                }
            }
        }
    }

    for (i, owner) in strategies.iter().enumerate() {
        let Some(prefix) = owner.claimed_prefix() else {
            continue;
        };
        for (j, other) in strategies.iter().enumerate() {
            if i != j && prefix_reaches(prefix, *other) {
                return Err(Error::Config(ConfigError::AmbiguousRecognizers {
                    claimed_by: owner.name().to_string(),
                    sample_of: other.name().to_string(),
                }));
            }
        }
    }

    Ok(())
}

/// `prefix` 后接某个样例值的任意后缀后，是否会被 `other` 识别
///
/// 例如前缀 `$2b$10$` 与 cost 12 的 bcrypt 样例拼接后得到一个合法的 cost 10 哈希。
fn prefix_reaches(prefix: &str, other: &dyn HashStrategy) -> bool {
    if other.recognize(prefix) {
        return true;
    }

    other.samples().iter().any(|sample| {
        sample
            .char_indices()
            .map(|(k, _)| k)
            .chain(std::iter::once(sample.len()))
            .any(|k| other.recognize(&format!("{}{}", prefix, &sample[k..])))
    })
}

//! 哈希策略配置
//!
//! 使用 TOML 描述注册表：一个首选策略加若干遗留策略。
//!
//! ```toml
//! [preferred]
//! algorithm = "bcrypt"
//! cost = 12
//! version = "2b"
//!
//! [[legacy]]
//! algorithm = "plaintext"
//! prefix = "{"
//! ```
//!
//! 未写出的字段取默认值；省略 `legacy` 时保留默认的明文兼容策略，
//! 需要禁用时写 `legacy = []`。

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Error, Result};
use crate::password::{
    BcryptStrategy, BcryptVersion, DEFAULT_BCRYPT_COST, DEFAULT_PLAINTEXT_PREFIX, HashStrategy,
    PlaintextStrategy,
};

#[cfg(feature = "argon2")]
use crate::password::{
    Argon2Strategy, DEFAULT_ARGON2_ITERATIONS, DEFAULT_ARGON2_MEMORY_KIB,
    DEFAULT_ARGON2_PARALLELISM,
};

/// 注册表配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashingConfig {
    /// 首选策略，新密码都用它生成
    pub preferred: StrategyConfig,
    /// 遗留策略，按顺序检查
    pub legacy: Vec<StrategyConfig>,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            preferred: StrategyConfig::default(),
            legacy: vec![StrategyConfig::plaintext(DEFAULT_PLAINTEXT_PREFIX)],
        }
    }
}

impl HashingConfig {
    /// 创建默认配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置首选策略
    pub fn with_preferred(mut self, preferred: StrategyConfig) -> Self {
        self.preferred = preferred;
        self
    }

    /// 追加遗留策略
    pub fn with_legacy(mut self, legacy: StrategyConfig) -> Self {
        self.legacy.push(legacy);
        self
    }

    /// 清空遗留策略
    pub fn without_legacy(mut self) -> Self {
        self.legacy.clear();
        self
    }

    /// 从 TOML 字符串解析
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| Error::Config(ConfigError::Parse(e.to_string())))
    }

    /// 从 TOML 文件加载
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(ConfigError::Parse(format!(
                "failed to read {}: {}",
                path.display(),
                e
            )))
        })?;
        Self::from_toml_str(&content)
    }

    /// 序列化为 TOML 字符串
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::Config(ConfigError::Parse(e.to_string())))
    }
}

/// 单个策略的配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "lowercase")]
pub enum StrategyConfig {
    /// bcrypt
    Bcrypt {
        #[serde(default = "default_bcrypt_cost")]
        cost: u32,
        #[serde(default = "default_bcrypt_version")]
        version: String,
    },

    /// Argon2id
    #[cfg(feature = "argon2")]
    Argon2 {
        #[serde(default = "default_argon2_memory_kib")]
        memory_kib: u32,
        #[serde(default = "default_argon2_iterations")]
        iterations: u32,
        #[serde(default = "default_argon2_parallelism")]
        parallelism: u32,
    },

    /// 带哨兵前缀的明文
    Plaintext {
        #[serde(default = "default_plaintext_prefix")]
        prefix: String,
    },
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig::bcrypt(DEFAULT_BCRYPT_COST)
    }
}

impl StrategyConfig {
    /// 指定 cost 的 bcrypt（版本 2b）
    pub fn bcrypt(cost: u32) -> Self {
        StrategyConfig::Bcrypt {
            cost,
            version: default_bcrypt_version(),
        }
    }

    /// 指定前缀的明文
    pub fn plaintext(prefix: impl Into<String>) -> Self {
        StrategyConfig::Plaintext {
            prefix: prefix.into(),
        }
    }

    /// 指定参数的 Argon2id
    #[cfg(feature = "argon2")]
    pub fn argon2(memory_kib: u32, iterations: u32, parallelism: u32) -> Self {
        StrategyConfig::Argon2 {
            memory_kib,
            iterations,
            parallelism,
        }
    }

    /// 校验参数并创建对应的策略
    pub fn to_strategy(&self) -> Result<Box<dyn HashStrategy>> {
        match self {
            StrategyConfig::Bcrypt { cost, version } => {
                let version = BcryptVersion::parse(version).ok_or_else(|| {
                    Error::Config(ConfigError::InvalidValue {
                        key: "version".to_string(),
                        message: format!(
                            "unknown bcrypt version '{}', expected one of 2a, 2b, 2x, 2y",
                            version
                        ),
                    })
                })?;
                Ok(Box::new(BcryptStrategy::try_new(*cost, version)?))
            }
            #[cfg(feature = "argon2")]
            StrategyConfig::Argon2 {
                memory_kib,
                iterations,
                parallelism,
            } => Ok(Box::new(Argon2Strategy::try_new(
                *memory_kib,
                *iterations,
                *parallelism,
            )?)),
            StrategyConfig::Plaintext { prefix } => {
                Ok(Box::new(PlaintextStrategy::with_prefix(prefix.clone())?))
            }
        }
    }
}

fn default_bcrypt_cost() -> u32 {
    DEFAULT_BCRYPT_COST
}

fn default_bcrypt_version() -> String {
    BcryptVersion::default().as_str().to_string()
}

fn default_plaintext_prefix() -> String {
    DEFAULT_PLAINTEXT_PREFIX.to_string()
}

#[cfg(feature = "argon2")]
fn default_argon2_memory_kib() -> u32 {
    DEFAULT_ARGON2_MEMORY_KIB
}

#[cfg(feature = "argon2")]
fn default_argon2_iterations() -> u32 {
    DEFAULT_ARGON2_ITERATIONS
}

#[cfg(feature = "argon2")]
fn default_argon2_parallelism() -> u32 {
    DEFAULT_ARGON2_PARALLELISM
}

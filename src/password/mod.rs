//! 密码哈希模块
//!
//! 可插拔的哈希策略、基于存储格式的策略识别、参数过期检测，以及登录时的透明重新哈希。
//!
//! ## 支持的策略
//!
//! - **bcrypt** (默认首选): 可配置 cost 和版本标记
//! - **Argon2id**: 内存硬哈希算法（需启用 `argon2` feature），可作为首选或遗留策略
//! - **plaintext**: 带哨兵前缀的明文，只用于迁移旧凭据，永远视为过期
//!
//! ## 示例
//!
//! ### 使用默认注册表
//!
//! ```rust
//! use dragrace_auth::password::{CredentialVerifier, VerifyOutcome};
//!
//! let verifier = CredentialVerifier::default();
//!
//! // 旧系统遗留的明文凭据，验证通过后得到新的 bcrypt 哈希
//! match verifier.verify_password("{hunter2", "hunter2") {
//!     VerifyOutcome::Rehashed(new_hash) => assert!(new_hash.starts_with("$2b$12$")),
//!     other => panic!("unexpected outcome: {:?}", other),
//! }
//! ```
//!
//! ### 从配置构建
//!
//! ```rust
//! use std::sync::Arc;
//! use dragrace_auth::config::{HashingConfig, StrategyConfig};
//! use dragrace_auth::password::{CredentialVerifier, HasherRegistry};
//!
//! let config = HashingConfig::new().with_preferred(StrategyConfig::bcrypt(4));
//! let registry = HasherRegistry::from_config(&config).unwrap();
//! let verifier = CredentialVerifier::new(Arc::new(registry));
//!
//! let hash = verifier.set_password("my_password").unwrap();
//! assert!(verifier.verify_password(&hash, "my_password").is_accepted());
//! ```

#[cfg(feature = "argon2")]
mod argon2_hasher;
mod bcrypt_hasher;
mod plaintext;
mod registry;
mod strategy;
mod verifier;

#[cfg(feature = "argon2")]
pub use argon2_hasher::{
    Argon2Params, Argon2Strategy, DEFAULT_ARGON2_ITERATIONS, DEFAULT_ARGON2_MEMORY_KIB,
    DEFAULT_ARGON2_PARALLELISM, MAX_ARGON2_ITERATIONS, MAX_ARGON2_MEMORY_KIB,
    MAX_ARGON2_PARALLELISM,
};
pub use bcrypt_hasher::{
    BcryptParams, BcryptStrategy, BcryptVersion, DEFAULT_BCRYPT_COST, MAX_BCRYPT_COST,
    MAX_VERIFY_BCRYPT_COST, MIN_BCRYPT_COST,
};
pub use plaintext::{DEFAULT_PLAINTEXT_PREFIX, PlaintextStrategy};
pub use registry::{HasherRegistry, HasherRegistryBuilder, Resolution};
pub use strategy::HashStrategy;
pub use verifier::{CredentialVerifier, VerifyOutcome};

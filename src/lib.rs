//! # dragrace-auth
//!
//! Dragrace 测试结果汇总服务的凭据核心。
//!
//! ## 功能特性
//!
//! - **可插拔哈希策略**: bcrypt、Argon2id 与用于迁移的明文兼容策略
//! - **格式识别**: 仅凭存储值本身判断由哪个策略生成
//! - **透明重新哈希**: 登录成功时，过期的凭据自动升级到首选策略
//! - **启动期校验**: 识别器存在歧义的配置在启动时即报错
//! - **客户端 token**: 测试机 bearer token 的生成与常量时间比较
//!
//! ## Features
//!
//! - `argon2` - 启用 Argon2id 策略（默认启用）
//!
//! ## 示例
//!
//! ```rust
//! use std::sync::Arc;
//! use dragrace_auth::{CredentialVerifier, HasherRegistry, VerifyOutcome};
//! use dragrace_auth::password::{BcryptStrategy, PlaintextStrategy};
//!
//! let registry = HasherRegistry::builder(BcryptStrategy::new().with_cost(4))
//!     .with_legacy(PlaintextStrategy::new())
//!     .build()
//!     .unwrap();
//! let verifier = CredentialVerifier::new(Arc::new(registry));
//!
//! let mut stored = "{hunter2".to_string();
//! match verifier.verify_password(&stored, "hunter2") {
//!     VerifyOutcome::Rejected => panic!("invalid credentials"),
//!     VerifyOutcome::Accepted => {}
//!     VerifyOutcome::Rehashed(new_hash) => stored = new_hash,
//! }
//!
//! assert_eq!(verifier.verify_password(&stored, "hunter2"), VerifyOutcome::Accepted);
//! ```

pub mod config;
pub mod error;
pub mod password;
pub mod random;

pub use error::{Error, Result};

// ============================================================================
// 密码相关导出
// ============================================================================

pub use config::{HashingConfig, StrategyConfig};
pub use password::{CredentialVerifier, HashStrategy, HasherRegistry, VerifyOutcome};

// ============================================================================
// 随机数生成函数导出
// ============================================================================

pub use random::{constant_time_compare, constant_time_compare_str, generate_client_token};

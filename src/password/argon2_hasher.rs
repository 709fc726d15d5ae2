//! Argon2id 哈希策略（需启用 `argon2` feature）
//!
//! 存储格式为 PHC 字符串：`$argon2id$v=19$m=<KiB>,t=<迭代>,p=<并行度>$<盐>$<摘要>`。
//! 既可以作为首选策略，也可以作为遗留策略，方便在 bcrypt 和 Argon2 之间迁移。

use argon2::{Algorithm, Argon2, Params, Version};
use password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString};

use crate::error::{ConfigError, Error, PasswordHashError, Result};
use crate::random::generate_salt;

use super::strategy::HashStrategy;

/// 默认内存开销（KiB）
pub const DEFAULT_ARGON2_MEMORY_KIB: u32 = 19 * 1024;

/// 默认迭代次数
pub const DEFAULT_ARGON2_ITERATIONS: u32 = 2;

/// 默认并行度
pub const DEFAULT_ARGON2_PARALLELISM: u32 = 1;

/// 可接受的最大内存开销（KiB，即 1 GiB）
pub const MAX_ARGON2_MEMORY_KIB: u32 = 1 << 20;

/// 可接受的最大迭代次数
pub const MAX_ARGON2_ITERATIONS: u32 = 64;

/// 可接受的最大并行度
pub const MAX_ARGON2_PARALLELISM: u32 = 16;

const CURRENT_VERSION: u32 = 0x13;
const LEGACY_VERSION: u32 = 0x10;

const SAMPLE_SALT: &str = "c29tZXNhbHRzb21lc2FsdA";
const SAMPLE_DIGEST: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// 从存储值中解析出的 Argon2id 参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Params {
    /// 算法版本（16 或 19）
    pub version: u32,
    /// 内存开销（KiB）
    pub memory_kib: u32,
    /// 迭代次数
    pub iterations: u32,
    /// 并行度
    pub parallelism: u32,
}

impl Argon2Params {
    /// 按精确格式解析 PHC 字符串，不符合格式返回 `None`
    pub fn parse(stored: &str) -> Option<Self> {
        let mut segments = stored.split('$');
        if !segments.next()?.is_empty() || segments.next()? != "argon2id" {
            return None;
        }

        let version = parse_decimal(segments.next()?.strip_prefix("v=")?)?;
        if version != CURRENT_VERSION && version != LEGACY_VERSION {
            return None;
        }

        let mut params = segments.next()?.split(',');
        let memory_kib = parse_decimal(params.next()?.strip_prefix("m=")?)?;
        let iterations = parse_decimal(params.next()?.strip_prefix("t=")?)?;
        let parallelism = parse_decimal(params.next()?.strip_prefix("p=")?)?;
        if params.next().is_some() {
            return None;
        }

        let salt = segments.next()?;
        let digest = segments.next()?;
        if segments.next().is_some() {
            return None;
        }
        if !is_b64(salt, 11, 64) || !is_b64(digest, 22, 86) {
            return None;
        }

        Some(Self {
            version,
            memory_kib,
            iterations,
            parallelism,
        })
    }

    /// 参数是否在本 crate 愿意计算的范围内
    pub fn within_limits(&self) -> bool {
        self.memory_kib <= MAX_ARGON2_MEMORY_KIB
            && self.iterations <= MAX_ARGON2_ITERATIONS
            && self.parallelism <= MAX_ARGON2_PARALLELISM
    }
}

fn parse_decimal(s: &str) -> Option<u32> {
    if s.is_empty() || s.len() > 10 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if s.len() > 1 && s.starts_with('0') {
        return None;
    }
    s.parse().ok()
}

fn is_b64(s: &str, min: usize, max: usize) -> bool {
    (min..=max).contains(&s.len())
        && s
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/')
}

/// Argon2id 策略
#[derive(Debug, Clone)]
pub struct Argon2Strategy {
    params: Params,
}

impl Default for Argon2Strategy {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

impl Argon2Strategy {
    /// 使用默认参数创建（m=19456, t=2, p=1）
    pub fn new() -> Self {
        Self::default()
    }

    /// 校验参数后创建
    pub fn try_new(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self> {
        if memory_kib > MAX_ARGON2_MEMORY_KIB
            || iterations > MAX_ARGON2_ITERATIONS
            || parallelism > MAX_ARGON2_PARALLELISM
        {
            return Err(Error::Config(ConfigError::InvalidValue {
                key: "argon2".to_string(),
                message: format!(
                    "Argon2 parameters exceed limits (m <= {}, t <= {}, p <= {})",
                    MAX_ARGON2_MEMORY_KIB, MAX_ARGON2_ITERATIONS, MAX_ARGON2_PARALLELISM
                ),
            }));
        }

        let params = Params::new(memory_kib, iterations, parallelism, None).map_err(|e| {
            Error::Config(ConfigError::InvalidValue {
                key: "argon2".to_string(),
                message: format!("invalid Argon2 parameters: {}", e),
            })
        })?;
        Ok(Self { params })
    }

    /// 内存开销（KiB）
    pub fn memory_kib(&self) -> u32 {
        self.params.m_cost()
    }

    /// 迭代次数
    pub fn iterations(&self) -> u32 {
        self.params.t_cost()
    }

    /// 并行度
    pub fn parallelism(&self) -> u32 {
        self.params.p_cost()
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl HashStrategy for Argon2Strategy {
    fn name(&self) -> &'static str {
        "argon2"
    }

    fn recognize(&self, stored: &str) -> bool {
        Argon2Params::parse(stored).is_some()
    }

    fn hash(&self, password: &str) -> Result<String> {
        let salt_bytes: [u8; 16] = generate_salt()?;
        let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| {
            Error::PasswordHash(PasswordHashError::HashFailed(format!(
                "Failed to encode salt: {}",
                e
            )))
        })?;

        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| {
                Error::PasswordHash(PasswordHashError::HashFailed(format!(
                    "Argon2 hash failed: {}",
                    e
                )))
            })
    }

    fn verify(&self, stored: &str, password: &str) -> bool {
        let Some(params) = Argon2Params::parse(stored) else {
            return false;
        };

        // 存储值中的参数决定计算量，超出上限时不分配内存
        if !params.within_limits() {
            tracing::warn!(
                strategy = self.name(),
                memory_kib = params.memory_kib,
                iterations = params.iterations,
                parallelism = params.parallelism,
                "Argon2 parameters exceed verification limits"
            );
            return false;
        }

        let parsed = match PasswordHash::new(stored) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(strategy = self.name(), error = %e, "malformed Argon2 hash");
                return false;
            }
        };

        // 使用存储值自带的参数重新计算
        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => true,
            Err(password_hash::Error::Password) => false,
            Err(e) => {
                tracing::warn!(strategy = self.name(), error = %e, "malformed Argon2 hash");
                false
            }
        }
    }

    fn is_current(&self, stored: &str) -> bool {
        match Argon2Params::parse(stored) {
            Some(p) => {
                p.version == CURRENT_VERSION
                    && p.memory_kib == self.memory_kib()
                    && p.iterations == self.iterations()
                    && p.parallelism == self.parallelism()
            }
            None => false,
        }
    }

    fn samples(&self) -> Vec<String> {
        [CURRENT_VERSION, LEGACY_VERSION]
            .iter()
            .map(|version| {
                format!(
                    "$argon2id$v={}$m={},t={},p={}${}${}",
                    version,
                    self.memory_kib(),
                    self.iterations(),
                    self.parallelism(),
                    SAMPLE_SALT,
                    SAMPLE_DIGEST
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use tracing_test::traced_test;

    use super::*;

    fn fast() -> Argon2Strategy {
        Argon2Strategy::try_new(64, 1, 1).unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let strategy = fast();
        let hash = strategy.hash("test_password_123").unwrap();

        assert!(hash.starts_with("$argon2id$v=19$m=64,t=1,p=1$"));
        assert!(strategy.recognize(&hash));
        assert!(strategy.verify(&hash, "test_password_123"));
        assert!(!strategy.verify(&hash, "wrong_password"));
    }

    #[test]
    fn test_default_params() {
        let strategy = Argon2Strategy::default();
        assert_eq!(strategy.memory_kib(), DEFAULT_ARGON2_MEMORY_KIB);
        assert_eq!(strategy.iterations(), DEFAULT_ARGON2_ITERATIONS);
        assert_eq!(strategy.parallelism(), DEFAULT_ARGON2_PARALLELISM);
    }

    #[test]
    fn test_parse_params() {
        let stored = format!("$argon2id$v=19$m=19456,t=2,p=1${}${}", SAMPLE_SALT, SAMPLE_DIGEST);
        let params = Argon2Params::parse(&stored).unwrap();

        assert_eq!(params.version, 19);
        assert_eq!(params.memory_kib, 19456);
        assert_eq!(params.iterations, 2);
        assert_eq!(params.parallelism, 1);
    }

    #[test]
    fn test_recognize_rejects_malformed() {
        let strategy = fast();

        assert!(!strategy.recognize(""));
        assert!(!strategy.recognize("$argon2id$"));
        assert!(!strategy.recognize(&format!(
            "$argon2i$v=19$m=64,t=1,p=1${}${}",
            SAMPLE_SALT, SAMPLE_DIGEST
        )));
        assert!(!strategy.recognize(&format!(
            "$argon2id$v=20$m=64,t=1,p=1${}${}",
            SAMPLE_SALT, SAMPLE_DIGEST
        )));
        assert!(!strategy.recognize(&format!(
            "$argon2id$v=19$t=1,m=64,p=1${}${}",
            SAMPLE_SALT, SAMPLE_DIGEST
        )));
        assert!(!strategy.recognize(&format!(
            "$argon2id$v=19$m=064,t=1,p=1${}${}",
            SAMPLE_SALT, SAMPLE_DIGEST
        )));
        assert!(!strategy.recognize(&format!(
            "$argon2id$v=19$m=64,t=1,p=1${}${}$extra",
            SAMPLE_SALT, SAMPLE_DIGEST
        )));
        assert!(!strategy.recognize(&format!(
            "$argon2id$v=19$m=64,t=1,p=1$bad salt!${}",
            SAMPLE_DIGEST
        )));
    }

    #[test]
    fn test_is_current() {
        let strategy = fast();
        let current = strategy.hash("pw").unwrap();
        let older = Argon2Strategy::try_new(32, 1, 1).unwrap().hash("pw").unwrap();

        assert!(strategy.is_current(&current));
        assert!(!strategy.is_current(&older));
        // 参数不同但仍然可以验证
        assert!(strategy.verify(&older, "pw"));
    }

    #[test]
    fn test_different_hashes_same_password() {
        let strategy = fast();
        let hash1 = strategy.hash("same").unwrap();
        let hash2 = strategy.hash("same").unwrap();

        assert_ne!(hash1, hash2);
        assert!(strategy.verify(&hash1, "same"));
        assert!(strategy.verify(&hash2, "same"));
    }

    #[test]
    fn test_samples_are_recognized() {
        let strategy = Argon2Strategy::default();
        for sample in strategy.samples() {
            assert!(strategy.recognize(&sample), "sample {} not recognized", sample);
        }
    }

    #[test]
    fn test_sample_digest_fails_closed() {
        let strategy = fast();
        for sample in strategy.samples() {
            assert!(!strategy.verify(&sample, "anything"));
        }
    }

    #[test]
    fn test_invalid_params() {
        assert!(Argon2Strategy::try_new(0, 1, 1).is_err());
        assert!(Argon2Strategy::try_new(64, 0, 1).is_err());
        assert!(Argon2Strategy::try_new(MAX_ARGON2_MEMORY_KIB + 1, 1, 1).is_err());
        assert!(Argon2Strategy::try_new(64, MAX_ARGON2_ITERATIONS + 1, 1).is_err());
        assert!(Argon2Strategy::try_new(64, 1, MAX_ARGON2_PARALLELISM + 1).is_err());
    }

    #[test]
    #[traced_test]
    fn test_oversized_params_fail_closed() {
        let strategy = fast();
        for params in ["m=4294967295,t=1,p=1", "m=64,t=4294967295,p=1", "m=64,t=1,p=255"] {
            let stored = format!("$argon2id$v=19${}${}${}", params, SAMPLE_SALT, SAMPLE_DIGEST);

            assert!(strategy.recognize(&stored));
            assert!(!strategy.verify(&stored, "anything"));
        }
        assert!(logs_contain("Argon2 parameters exceed verification limits"));
    }
}

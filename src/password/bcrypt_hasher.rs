//! bcrypt 哈希策略
//!
//! 存储格式：`$<版本>$<cost>$<22 位盐><31 位摘要>`，盐和摘要使用 bcrypt 的
//! base64 字母表 `./0-9A-Za-z`。

use crate::error::{ConfigError, Error, PasswordHashError, Result};
use crate::random::generate_salt;

use super::strategy::HashStrategy;

/// 默认 cost
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// cost 下限
pub const MIN_BCRYPT_COST: u32 = 4;

/// cost 上限
pub const MAX_BCRYPT_COST: u32 = 31;

/// 验证时愿意计算的最大 cost（配置的 cost 更高时以配置为准）
pub const MAX_VERIFY_BCRYPT_COST: u32 = 20;

const SALT_CHARS: usize = 22;
const DIGEST_CHARS: usize = 31;

// 能识别的版本标记；裸 "2" 只识别不生成
const RECOGNIZED_VERSIONS: [&str; 5] = ["2", "2a", "2b", "2x", "2y"];

// 任意格式合法的 salt + 摘要，仅用于歧义检查
const SAMPLE_PAYLOAD: &str = "R9h/cIPz0gi.URNNX3kh2OPST9/PgBkqquzi.Ss7KIUgO2t0jWMUW";

/// 可生成的 bcrypt 版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BcryptVersion {
    /// `$2a$`
    TwoA,
    /// `$2b$` - 当前推荐版本
    #[default]
    TwoB,
    /// `$2x$`
    TwoX,
    /// `$2y$`
    TwoY,
}

impl BcryptVersion {
    /// 版本标记字符串
    pub fn as_str(&self) -> &'static str {
        match self {
            BcryptVersion::TwoA => "2a",
            BcryptVersion::TwoB => "2b",
            BcryptVersion::TwoX => "2x",
            BcryptVersion::TwoY => "2y",
        }
    }

    /// 从版本标记解析
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "2a" => Some(BcryptVersion::TwoA),
            "2b" => Some(BcryptVersion::TwoB),
            "2x" => Some(BcryptVersion::TwoX),
            "2y" => Some(BcryptVersion::TwoY),
            _ => None,
        }
    }
}

impl From<BcryptVersion> for bcrypt::Version {
    fn from(version: BcryptVersion) -> Self {
        match version {
            BcryptVersion::TwoA => bcrypt::Version::TwoA,
            BcryptVersion::TwoB => bcrypt::Version::TwoB,
            BcryptVersion::TwoX => bcrypt::Version::TwoX,
            BcryptVersion::TwoY => bcrypt::Version::TwoY,
        }
    }
}

/// 从存储值中解析出的 bcrypt 参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BcryptParams<'a> {
    /// 版本标记（不含 `$`）
    pub version: &'a str,
    /// cost
    pub cost: u32,
}

impl<'a> BcryptParams<'a> {
    /// 按精确格式解析存储值，不符合格式返回 `None`
    pub fn parse(stored: &'a str) -> Option<Self> {
        let rest = stored.strip_prefix('$')?;
        let (version, rest) = rest.split_once('$')?;
        if !RECOGNIZED_VERSIONS.contains(&version) {
            return None;
        }

        let (cost, payload) = rest.split_once('$')?;
        if cost.len() != 2 || !cost.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let cost: u32 = cost.parse().ok()?;
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
            return None;
        }

        if payload.len() != SALT_CHARS + DIGEST_CHARS || !payload.bytes().all(is_bcrypt_char) {
            return None;
        }

        Some(Self { version, cost })
    }
}

fn is_bcrypt_char(b: u8) -> bool {
    b == b'.' || b == b'/' || b.is_ascii_alphanumeric()
}

/// bcrypt 策略
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BcryptStrategy {
    cost: u32,
    version: BcryptVersion,
}

impl Default for BcryptStrategy {
    fn default() -> Self {
        Self {
            cost: DEFAULT_BCRYPT_COST,
            version: BcryptVersion::default(),
        }
    }
}

impl BcryptStrategy {
    /// 使用默认参数创建（cost 12，版本 2b）
    pub fn new() -> Self {
        Self::default()
    }

    /// 校验参数后创建，供配置加载使用
    pub fn try_new(cost: u32, version: BcryptVersion) -> Result<Self> {
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
            return Err(Error::Config(ConfigError::InvalidValue {
                key: "cost".to_string(),
                message: format!(
                    "bcrypt cost must be between {} and {}, got {}",
                    MIN_BCRYPT_COST, MAX_BCRYPT_COST, cost
                ),
            }));
        }
        Ok(Self { cost, version })
    }

    /// 设置 cost 参数
    ///
    /// # Panics
    ///
    /// 如果 cost 不在 4-31 范围内会 panic
    pub fn with_cost(mut self, cost: u32) -> Self {
        assert!(
            (MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost),
            "bcrypt cost must be between 4 and 31"
        );
        self.cost = cost;
        self
    }

    /// 设置生成哈希时使用的版本标记
    pub fn with_version(mut self, version: BcryptVersion) -> Self {
        self.version = version;
        self
    }

    /// 当前配置的 cost
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// 当前配置的版本
    pub fn version(&self) -> BcryptVersion {
        self.version
    }
}

impl HashStrategy for BcryptStrategy {
    fn name(&self) -> &'static str {
        "bcrypt"
    }

    fn recognize(&self, stored: &str) -> bool {
        BcryptParams::parse(stored).is_some()
    }

    fn hash(&self, password: &str) -> Result<String> {
        let salt: [u8; 16] = generate_salt()?;
        // 超过 72 字节（含结尾 NUL）的密码报错，不做截断
        let parts = bcrypt::non_truncating_hash_with_salt(password, self.cost, salt).map_err(|e| {
            Error::PasswordHash(PasswordHashError::HashFailed(format!(
                "bcrypt hash failed: {}",
                e
            )))
        })?;
        Ok(parts.format_for_version(self.version.into()))
    }

    fn verify(&self, stored: &str, password: &str) -> bool {
        let Some(params) = BcryptParams::parse(stored) else {
            return false;
        };

        let limit = self.cost.max(MAX_VERIFY_BCRYPT_COST);
        if params.cost > limit {
            tracing::warn!(
                strategy = self.name(),
                cost = params.cost,
                limit,
                "bcrypt cost exceeds verification limit"
            );
            return false;
        }

        match bcrypt::non_truncating_verify(password, stored) {
            Ok(valid) => valid,
            Err(bcrypt::BcryptError::Truncation(_)) => {
                tracing::debug!(strategy = self.name(), "password exceeds bcrypt input limit");
                false
            }
            Err(e) => {
                tracing::warn!(strategy = self.name(), error = %e, "malformed bcrypt hash");
                false
            }
        }
    }

    fn is_current(&self, stored: &str) -> bool {
        match BcryptParams::parse(stored) {
            Some(params) => params.cost == self.cost && params.version == self.version.as_str(),
            None => false,
        }
    }

    fn samples(&self) -> Vec<String> {
        // 覆盖所有可识别的版本和 cost，而不仅是当前配置
        RECOGNIZED_VERSIONS
            .iter()
            .flat_map(|version| {
                (MIN_BCRYPT_COST..=MAX_BCRYPT_COST)
                    .map(move |cost| format!("${}${:02}${}", version, cost, SAMPLE_PAYLOAD))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use tracing_test::traced_test;

    use super::*;

    fn fast() -> BcryptStrategy {
        BcryptStrategy::new().with_cost(4)
    }

    #[test]
    fn test_hash_and_verify() {
        let strategy = fast();
        let hash = strategy.hash("test_password_123").unwrap();

        assert!(hash.starts_with("$2b$04$"));
        assert_eq!(hash.len(), 60);
        assert!(strategy.recognize(&hash));
        assert!(strategy.verify(&hash, "test_password_123"));
        assert!(!strategy.verify(&hash, "wrong_password"));
    }

    #[test]
    fn test_parse_params() {
        let stored = format!("$2a$10${}", SAMPLE_PAYLOAD);
        let params = BcryptParams::parse(&stored).unwrap();
        assert_eq!(params.version, "2a");
        assert_eq!(params.cost, 10);
    }

    #[test]
    fn test_recognize_rejects_malformed() {
        let strategy = fast();

        assert!(!strategy.recognize(""));
        assert!(!strategy.recognize("{hunter2"));
        assert!(!strategy.recognize("$2b$12$tooshort"));
        // cost 越界
        assert!(!strategy.recognize(&format!("$2b$03${}", SAMPLE_PAYLOAD)));
        assert!(!strategy.recognize(&format!("$2b$32${}", SAMPLE_PAYLOAD)));
        // cost 必须是两位数字
        assert!(!strategy.recognize(&format!("$2b$5${}", SAMPLE_PAYLOAD)));
        // 未知版本
        assert!(!strategy.recognize(&format!("$2c$12${}", SAMPLE_PAYLOAD)));
        // 非法字符
        let bad_payload = SAMPLE_PAYLOAD.replacen('R', "+", 1);
        assert!(!strategy.recognize(&format!("$2b$12${}", bad_payload)));
        // 多余的尾部
        assert!(!strategy.recognize(&format!("$2b$12${}x", SAMPLE_PAYLOAD)));
    }

    #[test]
    fn test_bare_version_recognized_but_fails_closed() {
        let strategy = fast();
        let stored = format!("$2$04${}", SAMPLE_PAYLOAD);

        assert!(strategy.recognize(&stored));
        assert!(!strategy.verify(&stored, "anything"));
        assert!(!strategy.is_current(&stored));
    }

    #[test]
    fn test_is_current_compares_cost() {
        let strategy = fast();
        let current = strategy.hash("pw").unwrap();
        let older = BcryptStrategy::new().with_cost(5).hash("pw").unwrap();

        assert!(strategy.is_current(&current));
        assert!(!strategy.is_current(&older));
    }

    #[test]
    fn test_is_current_compares_version() {
        let two_b = fast();
        let two_a = fast().with_version(BcryptVersion::TwoA);
        let hash = two_a.hash("pw").unwrap();

        assert!(hash.starts_with("$2a$04$"));
        assert!(two_a.is_current(&hash));
        assert!(!two_b.is_current(&hash));
        // 不同版本标记仍然可以验证
        assert!(two_b.verify(&hash, "pw"));
    }

    #[test]
    fn test_different_hashes_same_password() {
        let strategy = fast();

        let hash1 = strategy.hash("same_password").unwrap();
        let hash2 = strategy.hash("same_password").unwrap();

        // 由于 salt 不同，同一密码每次生成的哈希应该不同
        assert_ne!(hash1, hash2);
        assert!(strategy.verify(&hash1, "same_password"));
        assert!(strategy.verify(&hash2, "same_password"));
    }

    #[test]
    fn test_unicode_and_empty_password() {
        let strategy = fast();

        let hash = strategy.hash("密码测试🔐émoji").unwrap();
        assert!(strategy.verify(&hash, "密码测试🔐émoji"));

        let hash = strategy.hash("").unwrap();
        assert!(strategy.verify(&hash, ""));
        assert!(!strategy.verify(&hash, "not_empty"));
    }

    #[test]
    fn test_samples_are_recognized() {
        let strategy = BcryptStrategy::default();
        for sample in strategy.samples() {
            assert!(strategy.recognize(&sample), "sample {} not recognized", sample);
        }
    }

    #[test]
    fn test_samples_cover_every_version_and_cost() {
        let samples = BcryptStrategy::default().samples();

        assert_eq!(samples.len(), 5 * 28);
        assert!(samples.iter().any(|p| p.starts_with("$2b$10$")));
        assert!(samples.iter().any(|p| p.starts_with("$2y$31$")));
        assert!(samples.iter().any(|p| p.starts_with("$2$04$")));
    }

    #[test]
    fn test_long_password_is_not_truncated() {
        let strategy = fast();
        let too_long = format!("{}X", "a".repeat(72));

        assert!(matches!(
            strategy.hash(&too_long),
            Err(Error::PasswordHash(PasswordHashError::HashFailed(_)))
        ));

        // 71 字节是不截断时的上限
        let longest = "a".repeat(71);
        let hash = strategy.hash(&longest).unwrap();
        assert!(strategy.verify(&hash, &longest));
        assert!(!strategy.verify(&hash, &format!("{}X", longest)));
        assert!(!strategy.verify(&hash, &too_long));
    }

    #[test]
    #[traced_test]
    fn test_excessive_cost_fails_closed() {
        let strategy = fast();
        let stored = format!("$2b$31${}", SAMPLE_PAYLOAD);

        assert!(strategy.recognize(&stored));
        assert!(!strategy.verify(&stored, "anything"));
        assert!(logs_contain("bcrypt cost exceeds verification limit"));
    }

    #[test]
    fn test_try_new_validates_cost() {
        assert!(BcryptStrategy::try_new(12, BcryptVersion::TwoB).is_ok());
        assert!(BcryptStrategy::try_new(3, BcryptVersion::TwoB).is_err());
        assert!(BcryptStrategy::try_new(32, BcryptVersion::TwoB).is_err());
    }

    #[test]
    #[should_panic(expected = "bcrypt cost must be between 4 and 31")]
    fn test_invalid_cost_panics() {
        let _ = BcryptStrategy::new().with_cost(3);
    }

    #[test]
    fn test_version_parse() {
        assert_eq!(BcryptVersion::parse("2b"), Some(BcryptVersion::TwoB));
        assert_eq!(BcryptVersion::parse("2y"), Some(BcryptVersion::TwoY));
        assert_eq!(BcryptVersion::parse("2"), None);
        assert_eq!(BcryptVersion::TwoX.as_str(), "2x");
    }
}

//! 安全随机数生成模块
//!
//! 提供密码学安全的随机数生成功能，用于生成哈希盐值和客户端 token。

use rand::{TryRngCore, rngs::OsRng};

use crate::error::{CryptoError, Error, Result};

/// 客户端 token 的随机字节数（编码后为 128 个十六进制字符）
pub const CLIENT_TOKEN_BYTES: usize = 64;

/// 生成指定长度的随机字节数组
///
/// 使用操作系统提供的密码学安全随机数生成器 (CSPRNG)
///
/// # Example
///
/// ```rust
/// use dragrace_auth::random::generate_random_bytes;
///
/// let bytes = generate_random_bytes(32).unwrap();
/// assert_eq!(bytes.len(), 32);
/// ```
pub fn generate_random_bytes(length: usize) -> Result<Vec<u8>> {
    let mut bytes = vec![0u8; length];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| Error::Crypto(CryptoError::RngFailed(format!("{:?}", e))))?;
    Ok(bytes)
}

/// 生成指定长度的十六进制随机字符串
///
/// # Arguments
///
/// * `byte_length` - 要生成的字节数（最终字符串长度为字节数的两倍）
pub fn generate_random_hex(byte_length: usize) -> Result<String> {
    let bytes = generate_random_bytes(byte_length)?;
    Ok(hex_encode(&bytes))
}

/// 生成固定长度的盐值
///
/// 每次调用都会从 CSPRNG 取新的随机数据，盐值永不复用。
pub fn generate_salt<const N: usize>() -> Result<[u8; N]> {
    let mut salt = [0u8; N];
    getrandom::fill(&mut salt).map_err(|e| {
        Error::Crypto(CryptoError::RngFailed(format!(
            "Failed to generate random salt: {}",
            e
        )))
    })?;
    Ok(salt)
}

/// 生成测试机客户端的 bearer token
///
/// token 只生成一次，之后按原样比较，不做哈希。
///
/// # Example
///
/// ```rust
/// use dragrace_auth::random::generate_client_token;
///
/// let token = generate_client_token().unwrap();
/// assert_eq!(token.len(), 128);
/// ```
pub fn generate_client_token() -> Result<String> {
    generate_random_hex(CLIENT_TOKEN_BYTES)
}

// ============================================================================
// 辅助函数
// ============================================================================

/// 将字节数组编码为十六进制字符串
fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// 常量时间比较两个字节切片
///
/// 用于防止时序攻击
///
/// # Example
///
/// ```rust
/// use dragrace_auth::random::constant_time_compare;
///
/// assert!(constant_time_compare(b"secret_token", b"secret_token"));
/// assert!(!constant_time_compare(b"secret_token", b"other_token"));
/// ```
pub fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    use subtle::ConstantTimeEq;

    if a.len() != b.len() {
        return false;
    }

    a.ct_eq(b).into()
}

/// 常量时间比较两个字符串
///
/// 用于比较客户端提交的 bearer token 与存储的 token
pub fn constant_time_compare_str(a: &str, b: &str) -> bool {
    constant_time_compare(a.as_bytes(), b.as_bytes())
}

//! 哈希策略接口
//!
//! 每个策略负责一种存储格式：识别、生成、验证、判断参数是否为最新。

use std::fmt;

use crate::error::Result;

/// 密码哈希策略
///
/// 存储的哈希值是自描述的：只看值本身就能判断由哪个策略生成。
/// 同一注册表内所有策略的 [`recognize`](HashStrategy::recognize) 必须互斥，
/// 注册表在构建时会用 [`samples`](HashStrategy::samples) 检查这一点。
pub trait HashStrategy: fmt::Debug + Send + Sync {
    /// 策略名称，用于日志、配置和管理员重置
    fn name(&self) -> &'static str;

    /// 判断存储值的结构是否属于本策略的格式
    ///
    /// 必须是精确的格式匹配，不能依赖"尝试解码再捕获失败"。
    fn recognize(&self, stored: &str) -> bool;

    /// 生成新的哈希值
    ///
    /// 返回值包含以后识别和验证所需的一切（算法标记、参数、随机盐、摘要）。
    fn hash(&self, password: &str) -> Result<String>;

    /// 验证明文密码
    ///
    /// 格式损坏时返回 `false`，不返回错误，也不 panic。
    fn verify(&self, stored: &str, password: &str) -> bool;

    /// 存储值中的参数是否与本策略当前配置一致
    fn is_current(&self, stored: &str) -> bool;

    /// 本策略格式的代表性样例值
    ///
    /// 只用于启动时的歧义检查，不需要是可验证的哈希。
    fn samples(&self) -> Vec<String>;

    /// 本策略整体占用的前缀
    ///
    /// 以该前缀开头的任何值都被本策略识别时返回它，
    /// 注册表据此检查其他策略的格式是否可能落入该前缀。
    fn claimed_prefix(&self) -> Option<&str> {
        None
    }
}

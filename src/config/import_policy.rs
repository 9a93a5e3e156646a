// ==========================================
// 教务管理系统 - 导入策略配置
// ==========================================
// 职责: 默认值补齐策略（宽松/严格）与上传超时
// 说明: 原始行为为静默补默认值；此处将其显式化为可配置项，
//       严格模式下缺失字段升级为阻断级违规
// ==========================================

use crate::domain::types::ImportMode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 密码缺失时的固定占位密码
pub const DEFAULT_PLACEHOLDER_PASSWORD: &str = "Portal@123";

/// 上传超时默认值（秒）
pub const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 30;

// ==========================================
// ImportPolicy - 导入策略
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportPolicy {
    /// 缺失字段处理模式
    pub mode: ImportMode,

    /// 密码缺失时的占位密码
    pub placeholder_password: String,

    /// 上传超时（秒）
    pub upload_timeout_secs: u64,
}

impl ImportPolicy {
    /// 宽松策略（生产默认）: 缺失字段静默补默认值，仅记 INFO 级提示
    pub fn lenient() -> Self {
        Self {
            mode: ImportMode::Lenient,
            placeholder_password: DEFAULT_PLACEHOLDER_PASSWORD.to_string(),
            upload_timeout_secs: DEFAULT_UPLOAD_TIMEOUT_SECS,
        }
    }

    /// 严格策略: 缺失的 password/date_of_birth/email 记 Error 级违规并阻断上传
    pub fn strict() -> Self {
        Self {
            mode: ImportMode::Strict,
            ..Self::lenient()
        }
    }

    pub fn is_strict(&self) -> bool {
        self.mode == ImportMode::Strict
    }

    /// 上传超时
    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }
}

impl Default for ImportPolicy {
    fn default() -> Self {
        Self::lenient()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_is_lenient() {
        let policy = ImportPolicy::default();
        assert!(!policy.is_strict());
        assert_eq!(policy.placeholder_password, DEFAULT_PLACEHOLDER_PASSWORD);
    }

    #[test]
    fn test_strict_keeps_other_defaults() {
        let policy = ImportPolicy::strict();
        assert!(policy.is_strict());
        assert_eq!(policy.upload_timeout(), Duration::from_secs(30));
    }
}

// ==========================================
// 教务管理系统 - 批量数据导入引擎
// ==========================================
// 技术栈: Rust + calamine/csv + tokio
// 定位: 门户批量导入的核心管道（HTTP 传输/界面由宿主应用承担）
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 配置层 - 表头注册表与导入策略
pub mod config;

// 导入层 - 管道各阶段
pub mod importer;

// API 层 - 业务接口
pub mod api;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{AccountRole, DqLevel, ImportMode, RecordType, UploadState};

// 领域实体
pub use domain::{
    AccountRecord, Batch, DqSummary, DqViolation, ImportBatch, MappedRecord, RawSheet,
    RoleProfile, TransformedRecord,
};

// 配置
pub use config::{HeaderConfig, HeaderConfigRegistry, ImportPolicy};

// 导入管道
pub use importer::{
    BatchUploader, ImportError, ImportResult, ImportSession, InspectionOutcome, NoopUploader,
    RowMapper, Transformer, TypeIdentifier, UploadReport,
};

// API
pub use api::{ApiError, ApiResult, ImportApi, InspectApiResponse};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "教务管理系统 - 批量数据导入引擎";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}

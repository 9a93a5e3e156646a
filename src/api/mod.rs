// ==========================================
// 教务管理系统 - API 层
// ==========================================
// 职责: 面向宿主应用/前端的业务接口
// ==========================================

// 模块声明
pub mod error;
pub mod import_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use import_api::{ImportApi, InspectApiResponse};

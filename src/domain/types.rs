// ==========================================
// 教务管理系统 - 领域类型定义
// ==========================================
// 职责: 导入引擎共享的枚举类型
// 序列化格式: SCREAMING_SNAKE_CASE (与前端/后端契约一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 记录类型 (Record Type)
// ==========================================
// 闭合的导入类型集合: 新增类型 = 新增枚举变体 + 表头配置
// 账号类: Student/Staff/Manager/Advisor/Admin
// 实体类: Subject/Program/Curriculum/Combo/Assessment/Material/Session/Outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordType {
    Student,    // 学生账号
    Staff,      // 教职工账号
    Manager,    // 管理人员账号
    Advisor,    // 导师账号
    Admin,      // 系统管理员账号
    Subject,    // 课程科目
    Program,    // 专业项目
    Curriculum, // 培养方案
    Combo,      // 课程组合
    Assessment, // 考核项
    Material,   // 教学资料
    Session,    // 教学场次
    Outcome,    // 学习成果
}

impl RecordType {
    /// 按配置表中的类型名解析（如 "STUDENT"）
    ///
    /// # 返回
    /// - Some(RecordType): 已注册的内置类型
    /// - None: 未知类型名（外部扩展类型仅参与识别/映射，不参与变换）
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_uppercase().as_str() {
            "STUDENT" => Some(RecordType::Student),
            "STAFF" => Some(RecordType::Staff),
            "MANAGER" => Some(RecordType::Manager),
            "ADVISOR" => Some(RecordType::Advisor),
            "ADMIN" => Some(RecordType::Admin),
            "SUBJECT" => Some(RecordType::Subject),
            "PROGRAM" => Some(RecordType::Program),
            "CURRICULUM" => Some(RecordType::Curriculum),
            "COMBO" => Some(RecordType::Combo),
            "ASSESSMENT" => Some(RecordType::Assessment),
            "MATERIAL" => Some(RecordType::Material),
            "SESSION" => Some(RecordType::Session),
            "OUTCOME" => Some(RecordType::Outcome),
            _ => None,
        }
    }

    /// 类型名（配置表主键）
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Student => "STUDENT",
            RecordType::Staff => "STAFF",
            RecordType::Manager => "MANAGER",
            RecordType::Advisor => "ADVISOR",
            RecordType::Admin => "ADMIN",
            RecordType::Subject => "SUBJECT",
            RecordType::Program => "PROGRAM",
            RecordType::Curriculum => "CURRICULUM",
            RecordType::Combo => "COMBO",
            RecordType::Assessment => "ASSESSMENT",
            RecordType::Material => "MATERIAL",
            RecordType::Session => "SESSION",
            RecordType::Outcome => "OUTCOME",
        }
    }

    /// 是否为账号类类型（产生嵌套账号结构）
    pub fn is_account(&self) -> bool {
        matches!(
            self,
            RecordType::Student
                | RecordType::Staff
                | RecordType::Manager
                | RecordType::Advisor
                | RecordType::Admin
        )
    }

    /// 对应的账号角色（仅账号类类型）
    pub fn account_role(&self) -> Option<AccountRole> {
        match self {
            RecordType::Student => Some(AccountRole::Student),
            RecordType::Staff => Some(AccountRole::Staff),
            RecordType::Manager => Some(AccountRole::Manager),
            RecordType::Advisor => Some(AccountRole::Advisor),
            RecordType::Admin => Some(AccountRole::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 账号角色 (Account Role)
// ==========================================
// 账号类导入记录的角色标识
// ADMIN 不携带角色档案（profile 为空）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountRole {
    Student,
    Staff,
    Manager,
    Advisor,
    Admin,
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountRole::Student => write!(f, "STUDENT"),
            AccountRole::Staff => write!(f, "STAFF"),
            AccountRole::Manager => write!(f, "MANAGER"),
            AccountRole::Advisor => write!(f, "ADVISOR"),
            AccountRole::Admin => write!(f, "ADMIN"),
        }
    }
}

// ==========================================
// 数据质量违规级别 (DQ Level)
// ==========================================
// Error: 阻断（严格模式下拒绝上传）
// Conflict: 批内冲突（重复主键）
// Warning: 提示但不阻断
// Info: 默认值已补齐等可观测提示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DqLevel {
    Error,
    Conflict,
    Warning,
    Info,
}

impl fmt::Display for DqLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DqLevel::Error => write!(f, "ERROR"),
            DqLevel::Conflict => write!(f, "CONFLICT"),
            DqLevel::Warning => write!(f, "WARNING"),
            DqLevel::Info => write!(f, "INFO"),
        }
    }
}

// ==========================================
// 上传状态 (Upload State)
// ==========================================
// 状态机: Idle → Uploading → {Success, Error}
// Error 停留在预览步骤，保留已编辑数据供重试
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UploadState {
    Idle,
    Uploading,
    Success,
    Error,
}

impl fmt::Display for UploadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadState::Idle => write!(f, "IDLE"),
            UploadState::Uploading => write!(f, "UPLOADING"),
            UploadState::Success => write!(f, "SUCCESS"),
            UploadState::Error => write!(f, "ERROR"),
        }
    }
}

// ==========================================
// 导入策略模式 (Import Mode)
// ==========================================
// Lenient: 缺失字段静默补默认值（生产默认，与原始行为一致）
// Strict: 缺失字段记为 Error 级违规，阻断上传
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportMode {
    Lenient,
    Strict,
}

impl Default for ImportMode {
    fn default() -> Self {
        ImportMode::Lenient
    }
}

impl fmt::Display for ImportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportMode::Lenient => write!(f, "LENIENT"),
            ImportMode::Strict => write!(f, "STRICT"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_type_roundtrip() {
        for t in [
            RecordType::Student,
            RecordType::Staff,
            RecordType::Manager,
            RecordType::Advisor,
            RecordType::Admin,
            RecordType::Subject,
            RecordType::Program,
            RecordType::Curriculum,
            RecordType::Combo,
            RecordType::Assessment,
            RecordType::Material,
            RecordType::Session,
            RecordType::Outcome,
        ] {
            assert_eq!(RecordType::from_name(t.as_str()), Some(t));
        }
    }

    #[test]
    fn test_record_type_from_name_case_insensitive() {
        assert_eq!(RecordType::from_name(" student "), Some(RecordType::Student));
        assert_eq!(RecordType::from_name("UNKNOWN"), None);
    }

    #[test]
    fn test_account_role_mapping() {
        assert!(RecordType::Student.is_account());
        assert!(!RecordType::Subject.is_account());
        assert_eq!(RecordType::Admin.account_role(), Some(AccountRole::Admin));
        assert_eq!(RecordType::Subject.account_role(), None);
    }
}

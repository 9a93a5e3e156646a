// ==========================================
// 教务管理系统 - 导入记录领域模型
// ==========================================
// 职责: 映射记录 / 变换记录 / 批次 / 数据质量结构
// 生命周期: MappedRecord 在预览编辑期间可变，变换阶段只读消费；
//           Batch 上传调用结束后即丢弃，不保留历史
// ==========================================

use crate::domain::types::{AccountRole, DqLevel};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// MappedRecord - 扁平映射记录
// ==========================================
// 不变量: 值均为去除首尾空白后的非空字符串；零字段记录不保留
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappedRecord {
    // 标准字段名 → 单元格值
    pub fields: HashMap<String, String>,

    // 原始文件行号（表头为第 1 行，数据从第 2 行起）
    pub row_number: usize,
}

impl MappedRecord {
    pub fn new(row_number: usize) -> Self {
        Self {
            fields: HashMap::new(),
            row_number,
        }
    }

    /// 读取标准字段值
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// 写入字段值（预览编辑入口）；空白值等价于删除该字段
    pub fn set(&mut self, field: &str, value: &str) {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.fields.remove(field);
        } else {
            self.fields.insert(field.to_string(), trimmed.to_string());
        }
    }

    /// 是否零字段（此类记录不得进入映射输出）
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// ==========================================
// 角色档案 (Role Profile)
// ==========================================
// 不变量: 账号记录恰好填充一个角色档案变体（ADMIN 为空）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    pub address: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffProfile {
    pub department: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerProfile {
    pub department: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisorProfile {
    pub department: Option<String>,
    pub specialization: Option<String>,
    pub phone: Option<String>,
}

/// 角色档案变体（内部表示，上传时展开为显式四槽结构）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RoleProfile {
    Student(StudentProfile),
    Staff(StaffProfile),
    Manager(ManagerProfile),
    Advisor(AdvisorProfile),
}

// ==========================================
// ProfilePayload - 角色档案上传载荷
// ==========================================
// 后端契约: 四个角色槽全部显式出现，未选中的槽为 null
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePayload {
    pub student_profile: Option<StudentProfile>,
    pub staff_profile: Option<StaffProfile>,
    pub manager_profile: Option<ManagerProfile>,
    pub advisor_profile: Option<AdvisorProfile>,
}

impl From<&RoleProfile> for ProfilePayload {
    fn from(profile: &RoleProfile) -> Self {
        let mut payload = ProfilePayload {
            student_profile: None,
            staff_profile: None,
            manager_profile: None,
            advisor_profile: None,
        };
        match profile {
            RoleProfile::Student(p) => payload.student_profile = Some(p.clone()),
            RoleProfile::Staff(p) => payload.staff_profile = Some(p.clone()),
            RoleProfile::Manager(p) => payload.manager_profile = Some(p.clone()),
            RoleProfile::Advisor(p) => payload.advisor_profile = Some(p.clone()),
        }
        payload
    }
}

// ==========================================
// AccountRecord - 账号类变换记录
// ==========================================
// 默认规则（宽松模式）:
// - password 缺失 → 固定占位密码
// - username 缺失 → email 的 @ 前本地部分
// - date_of_birth 缺失/非法 → 导入时刻的"当前日期"（由调用方注入）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub role: AccountRole,
    pub email: String,
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub profile: Option<RoleProfile>,
}

impl AccountRecord {
    /// 生成后端账号创建载荷（camelCase，角色槽显式 null）
    pub fn to_upload_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "email": self.email,
            "username": self.username,
            "password": self.password,
            "firstName": self.first_name,
            "lastName": self.last_name,
            "dateOfBirth": self.date_of_birth.format("%Y-%m-%d").to_string(),
            "role": self.role,
            "profileData": self.profile.as_ref().map(ProfilePayload::from),
        })
    }
}

// ==========================================
// 实体类变换记录
// ==========================================
// 数值字段解析失败/缺失时采用字段注释中的回退默认值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectRecord {
    pub code: String,
    pub name: String,
    pub credits: u32, // 回退默认 0
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramRecord {
    pub code: String,
    pub name: String,
    pub duration_years: u32, // 回退默认 0
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurriculumRecord {
    pub code: String,
    pub name: String,
    pub academic_year: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComboRecord {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentRecord {
    pub name: String,
    pub subject_code: Option<String>,
    pub weight: f64,    // 回退默认 0.0（百分比权重）
    pub max_score: f64, // 回退默认 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialRecord {
    pub name: String,
    pub material_type: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub name: String,
    pub subject_code: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeRecord {
    pub code: String,
    pub name: String,
    pub subject_code: Option<String>,
    pub description: Option<String>,
}

// ==========================================
// TransformedRecord - 变换记录（闭合标签联合）
// ==========================================
// 新增导入类型 = 新增变体 + transformer 中对应的构造分支
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransformedRecord {
    Account(AccountRecord),
    Subject(SubjectRecord),
    Program(ProgramRecord),
    Curriculum(CurriculumRecord),
    Combo(ComboRecord),
    Assessment(AssessmentRecord),
    Material(MaterialRecord),
    Session(SessionRecord),
    Outcome(OutcomeRecord),
}

impl TransformedRecord {
    /// 生成上传载荷（账号类走专用嵌套形状，实体类直接序列化）
    pub fn to_upload_payload(&self) -> serde_json::Value {
        match self {
            TransformedRecord::Account(r) => r.to_upload_payload(),
            TransformedRecord::Subject(r) => serde_json::to_value(r).unwrap_or_default(),
            TransformedRecord::Program(r) => serde_json::to_value(r).unwrap_or_default(),
            TransformedRecord::Curriculum(r) => serde_json::to_value(r).unwrap_or_default(),
            TransformedRecord::Combo(r) => serde_json::to_value(r).unwrap_or_default(),
            TransformedRecord::Assessment(r) => serde_json::to_value(r).unwrap_or_default(),
            TransformedRecord::Material(r) => serde_json::to_value(r).unwrap_or_default(),
            TransformedRecord::Session(r) => serde_json::to_value(r).unwrap_or_default(),
            TransformedRecord::Outcome(r) => serde_json::to_value(r).unwrap_or_default(),
        }
    }
}

// ==========================================
// Batch - 上传批次
// ==========================================
// 用途: 类型名 → 有序变换记录；上传调用前装配，调用返回后丢弃
#[derive(Debug, Clone, Default)]
pub struct Batch {
    pub groups: HashMap<String, Vec<TransformedRecord>>,
}

impl Batch {
    pub fn record_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.values().all(Vec::is_empty)
    }
}

// ==========================================
// ImportBatch - 导入批次元信息
// ==========================================
// 用途: 每次导入尝试的统计快照（仅日志/返回值，不落库）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportBatch {
    pub batch_id: String,              // 批次 ID（UUID）
    pub file_name: Option<String>,     // 源文件名
    pub type_name: Option<String>,     // 识别出的类型名
    pub total_rows: usize,             // 数据总行数（不含表头）
    pub mapped_rows: usize,            // 映射保留行数
    pub imported_at: DateTime<Utc>,    // 导入时间
    pub elapsed_ms: u64,               // 耗时（毫秒）
}

// ==========================================
// DqViolation - 数据质量违规记录
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DqViolation {
    pub row_number: usize,   // 原始文件行号
    pub level: DqLevel,      // 违规级别
    pub field: String,       // 违规字段
    pub message: String,     // 违规描述
}

// ==========================================
// DqSummary - 数据质量汇总
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DqSummary {
    pub total_rows: usize, // 映射保留行数
    pub blocked: usize,    // Error 级
    pub conflict: usize,   // Conflict 级
    pub warning: usize,    // Warning 级
    pub info: usize,       // Info 级
}

impl DqSummary {
    pub fn from_violations(total_rows: usize, violations: &[DqViolation]) -> Self {
        let count = |level: DqLevel| violations.iter().filter(|v| v.level == level).count();
        Self {
            total_rows,
            blocked: count(DqLevel::Error),
            conflict: count(DqLevel::Conflict),
            warning: count(DqLevel::Warning),
            info: count(DqLevel::Info),
        }
    }

    /// 是否存在阻断级违规（严格模式拒绝上传的依据）
    pub fn has_blocking(&self) -> bool {
        self.blocked > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapped_record_set_blank_removes() {
        let mut record = MappedRecord::new(2);
        record.set("email", "a@b.edu");
        record.set("email", "   ");
        assert!(record.is_empty());
    }

    #[test]
    fn test_profile_payload_single_slot() {
        let profile = RoleProfile::Staff(StaffProfile {
            department: Some("CS".to_string()),
            phone: None,
        });
        let payload = ProfilePayload::from(&profile);
        assert!(payload.staff_profile.is_some());
        assert!(payload.student_profile.is_none());
        assert!(payload.manager_profile.is_none());
        assert!(payload.advisor_profile.is_none());
    }

    #[test]
    fn test_account_upload_payload_explicit_null_slots() {
        let record = AccountRecord {
            role: AccountRole::Student,
            email: "sv001@campus.edu".to_string(),
            username: "sv001".to_string(),
            password: "pw".to_string(),
            first_name: "An".to_string(),
            last_name: "Nguyen".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(2004, 5, 20).unwrap(),
            profile: Some(RoleProfile::Student(StudentProfile {
                address: Some("12 Elm St".to_string()),
                phone: None,
            })),
        };

        let payload = record.to_upload_payload();
        assert_eq!(payload["email"], "sv001@campus.edu");
        assert_eq!(payload["dateOfBirth"], "2004-05-20");
        // 选中槽有值，其余槽显式为 null
        assert!(payload["profileData"]["studentProfile"].is_object());
        assert!(payload["profileData"]["staffProfile"].is_null());
        assert!(payload["profileData"]["managerProfile"].is_null());
        assert!(payload["profileData"]["advisorProfile"].is_null());
    }

    #[test]
    fn test_admin_upload_payload_no_profile() {
        let record = AccountRecord {
            role: AccountRole::Admin,
            email: "root@campus.edu".to_string(),
            username: "root".to_string(),
            password: "pw".to_string(),
            first_name: "Root".to_string(),
            last_name: "Admin".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            profile: None,
        };
        let payload = record.to_upload_payload();
        assert!(payload["profileData"].is_null());
    }

    #[test]
    fn test_dq_summary_counts() {
        let violations = vec![
            DqViolation {
                row_number: 2,
                level: DqLevel::Error,
                field: "email".to_string(),
                message: "缺失".to_string(),
            },
            DqViolation {
                row_number: 3,
                level: DqLevel::Info,
                field: "password".to_string(),
                message: "已补默认".to_string(),
            },
        ];
        let summary = DqSummary::from_violations(5, &violations);
        assert_eq!(summary.blocked, 1);
        assert_eq!(summary.info, 1);
        assert!(summary.has_blocking());
    }
}

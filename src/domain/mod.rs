// ==========================================
// 教务管理系统 - 领域层
// ==========================================
// 职责: 导入引擎的实体与类型定义
// 红线: 领域层不依赖导入管道，保持纯数据（表头配置描述符除外）
// ==========================================

// 模块声明
pub mod record;
pub mod sheet;
pub mod types;

// 重导出核心类型
pub use record::{
    AccountRecord, AdvisorProfile, AssessmentRecord, Batch, ComboRecord, CurriculumRecord,
    DqSummary, DqViolation, ImportBatch, ManagerProfile, MappedRecord, MaterialRecord,
    OutcomeRecord, ProfilePayload, ProgramRecord, RoleProfile, SessionRecord, StaffProfile,
    StudentProfile, SubjectRecord, TransformedRecord,
};
pub use sheet::{CandidateExpectation, IdentifiedType, RawSheet};
pub use types::{AccountRole, DqLevel, ImportMode, RecordType, UploadState};

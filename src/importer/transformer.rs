// ==========================================
// 教务管理系统 - 记录变换器实现
// ==========================================
// 职责: 阶段 3 - 扁平映射记录 → 上传所需的类型化嵌套结构
// 分派: 按 RecordType 闭合枚举逐变体构造（新增类型 = 新增分支）
// 对称投影: preview 将嵌套档案字段摊平回单层记录供展示/编辑，
//           编辑结果经同一变换再次收拢后上传
// 纯函数: 输出仅由输入与静态分派表决定
// ==========================================

use crate::config::ImportPolicy;
use crate::domain::record::{
    AccountRecord, AdvisorProfile, AssessmentRecord, ComboRecord, CurriculumRecord,
    ManagerProfile, MappedRecord, MaterialRecord, OutcomeRecord, ProgramRecord, RoleProfile,
    SessionRecord, StaffProfile, StudentProfile, SubjectRecord, TransformedRecord,
};
use crate::domain::types::{AccountRole, RecordType};
use crate::importer::date_parser;
use chrono::NaiveDate;

pub struct Transformer;

impl Transformer {
    /// 批量变换（顺序保持）
    pub fn transform(
        records: &[MappedRecord],
        record_type: RecordType,
        policy: &ImportPolicy,
        today: NaiveDate,
    ) -> Vec<TransformedRecord> {
        records
            .iter()
            .map(|r| Self::transform_one(r, record_type, policy, today))
            .collect()
    }

    /// 单条变换
    ///
    /// # 参数
    /// - record: 扁平映射记录（只读消费）
    /// - record_type: 识别出的记录类型
    /// - policy: 默认值策略（占位密码）
    /// - today: 日期回退用的"当前日期"（注入，保证可测）
    pub fn transform_one(
        record: &MappedRecord,
        record_type: RecordType,
        policy: &ImportPolicy,
        today: NaiveDate,
    ) -> TransformedRecord {
        match record_type {
            RecordType::Student => TransformedRecord::Account(Self::build_account(
                record,
                AccountRole::Student,
                policy,
                today,
            )),
            RecordType::Staff => TransformedRecord::Account(Self::build_account(
                record,
                AccountRole::Staff,
                policy,
                today,
            )),
            RecordType::Manager => TransformedRecord::Account(Self::build_account(
                record,
                AccountRole::Manager,
                policy,
                today,
            )),
            RecordType::Advisor => TransformedRecord::Account(Self::build_account(
                record,
                AccountRole::Advisor,
                policy,
                today,
            )),
            RecordType::Admin => TransformedRecord::Account(Self::build_account(
                record,
                AccountRole::Admin,
                policy,
                today,
            )),
            RecordType::Subject => TransformedRecord::Subject(SubjectRecord {
                code: owned(record, "code"),
                name: owned(record, "name"),
                credits: parse_u32_or(record, "credits", 0),
                description: optional(record, "description"),
            }),
            RecordType::Program => TransformedRecord::Program(ProgramRecord {
                code: owned(record, "code"),
                name: owned(record, "name"),
                duration_years: parse_u32_or(record, "duration_years", 0),
                description: optional(record, "description"),
            }),
            RecordType::Curriculum => TransformedRecord::Curriculum(CurriculumRecord {
                code: owned(record, "code"),
                name: owned(record, "name"),
                academic_year: optional(record, "academic_year"),
                description: optional(record, "description"),
            }),
            RecordType::Combo => TransformedRecord::Combo(ComboRecord {
                name: owned(record, "name"),
                description: optional(record, "description"),
            }),
            RecordType::Assessment => TransformedRecord::Assessment(AssessmentRecord {
                name: owned(record, "name"),
                subject_code: optional(record, "subject_code"),
                weight: parse_f64_or(record, "weight", 0.0),
                max_score: parse_f64_or(record, "max_score", 100.0),
            }),
            RecordType::Material => TransformedRecord::Material(MaterialRecord {
                name: owned(record, "name"),
                material_type: optional(record, "material_type"),
                url: optional(record, "url"),
                description: optional(record, "description"),
            }),
            RecordType::Session => TransformedRecord::Session(SessionRecord {
                name: owned(record, "name"),
                subject_code: optional(record, "subject_code"),
                start_date: record.get("start_date").and_then(date_parser::try_parse_date),
                end_date: record.get("end_date").and_then(date_parser::try_parse_date),
            }),
            RecordType::Outcome => TransformedRecord::Outcome(OutcomeRecord {
                code: owned(record, "code"),
                name: owned(record, "name"),
                subject_code: optional(record, "subject_code"),
                description: optional(record, "description"),
            }),
        }
    }

    /// 账号类构造
    ///
    /// # 默认规则（宽松模式静默补齐；严格模式由校验层在上传前拦截）
    /// - password 缺失 → 占位密码
    /// - username 缺失 → email 的 @ 前本地部分
    /// - date_of_birth 缺失/非法 → today
    fn build_account(
        record: &MappedRecord,
        role: AccountRole,
        policy: &ImportPolicy,
        today: NaiveDate,
    ) -> AccountRecord {
        let email = owned(record, "email");
        let username = record
            .get("username")
            .map(str::to_string)
            .unwrap_or_else(|| email_local_part(&email));
        let password = record
            .get("password")
            .map(str::to_string)
            .unwrap_or_else(|| policy.placeholder_password.clone());
        let date_of_birth =
            date_parser::parse_date_or_today(record.get("date_of_birth"), today);

        let profile = match role {
            AccountRole::Student => Some(RoleProfile::Student(StudentProfile {
                address: optional(record, "address"),
                phone: optional(record, "phone"),
            })),
            AccountRole::Staff => Some(RoleProfile::Staff(StaffProfile {
                department: optional(record, "department"),
                phone: optional(record, "phone"),
            })),
            AccountRole::Manager => Some(RoleProfile::Manager(ManagerProfile {
                department: optional(record, "department"),
                phone: optional(record, "phone"),
            })),
            AccountRole::Advisor => Some(RoleProfile::Advisor(AdvisorProfile {
                department: optional(record, "department"),
                specialization: optional(record, "specialization"),
                phone: optional(record, "phone"),
            })),
            // 系统管理员无角色档案
            AccountRole::Admin => None,
        };

        AccountRecord {
            role,
            email,
            username,
            password,
            first_name: owned(record, "first_name"),
            last_name: owned(record, "last_name"),
            date_of_birth,
            profile,
        }
    }

    /// 批量预览投影（与 transform 同序）
    pub fn preview(records: &[TransformedRecord], row_numbers: &[usize]) -> Vec<MappedRecord> {
        records
            .iter()
            .enumerate()
            .map(|(idx, r)| {
                let row_number = row_numbers.get(idx).copied().unwrap_or(idx + 2);
                Self::preview_one(r, row_number)
            })
            .collect()
    }

    /// 单条预览投影: 嵌套结构 → 单层可编辑记录
    pub fn preview_one(record: &TransformedRecord, row_number: usize) -> MappedRecord {
        let mut preview = MappedRecord::new(row_number);

        match record {
            TransformedRecord::Account(r) => {
                preview.set("email", &r.email);
                preview.set("username", &r.username);
                preview.set("password", &r.password);
                preview.set("first_name", &r.first_name);
                preview.set("last_name", &r.last_name);
                preview.set(
                    "date_of_birth",
                    &r.date_of_birth.format("%Y-%m-%d").to_string(),
                );
                match &r.profile {
                    Some(RoleProfile::Student(p)) => {
                        set_opt(&mut preview, "address", &p.address);
                        set_opt(&mut preview, "phone", &p.phone);
                    }
                    Some(RoleProfile::Staff(p)) => {
                        set_opt(&mut preview, "department", &p.department);
                        set_opt(&mut preview, "phone", &p.phone);
                    }
                    Some(RoleProfile::Manager(p)) => {
                        set_opt(&mut preview, "department", &p.department);
                        set_opt(&mut preview, "phone", &p.phone);
                    }
                    Some(RoleProfile::Advisor(p)) => {
                        set_opt(&mut preview, "department", &p.department);
                        set_opt(&mut preview, "specialization", &p.specialization);
                        set_opt(&mut preview, "phone", &p.phone);
                    }
                    None => {}
                }
            }
            TransformedRecord::Subject(r) => {
                preview.set("code", &r.code);
                preview.set("name", &r.name);
                preview.set("credits", &r.credits.to_string());
                set_opt(&mut preview, "description", &r.description);
            }
            TransformedRecord::Program(r) => {
                preview.set("code", &r.code);
                preview.set("name", &r.name);
                preview.set("duration_years", &r.duration_years.to_string());
                set_opt(&mut preview, "description", &r.description);
            }
            TransformedRecord::Curriculum(r) => {
                preview.set("code", &r.code);
                preview.set("name", &r.name);
                set_opt(&mut preview, "academic_year", &r.academic_year);
                set_opt(&mut preview, "description", &r.description);
            }
            TransformedRecord::Combo(r) => {
                preview.set("name", &r.name);
                set_opt(&mut preview, "description", &r.description);
            }
            TransformedRecord::Assessment(r) => {
                preview.set("name", &r.name);
                set_opt(&mut preview, "subject_code", &r.subject_code);
                preview.set("weight", &r.weight.to_string());
                preview.set("max_score", &r.max_score.to_string());
            }
            TransformedRecord::Material(r) => {
                preview.set("name", &r.name);
                set_opt(&mut preview, "material_type", &r.material_type);
                set_opt(&mut preview, "url", &r.url);
                set_opt(&mut preview, "description", &r.description);
            }
            TransformedRecord::Session(r) => {
                preview.set("name", &r.name);
                set_opt(&mut preview, "subject_code", &r.subject_code);
                if let Some(d) = r.start_date {
                    preview.set("start_date", &d.format("%Y-%m-%d").to_string());
                }
                if let Some(d) = r.end_date {
                    preview.set("end_date", &d.format("%Y-%m-%d").to_string());
                }
            }
            TransformedRecord::Outcome(r) => {
                preview.set("code", &r.code);
                preview.set("name", &r.name);
                set_opt(&mut preview, "subject_code", &r.subject_code);
                set_opt(&mut preview, "description", &r.description);
            }
        }
        preview
    }
}

/// email 的 @ 前本地部分（无 @ 时取整串）
fn email_local_part(email: &str) -> String {
    email.split('@').next().unwrap_or("").to_string()
}

fn owned(record: &MappedRecord, field: &str) -> String {
    record.get(field).unwrap_or_default().to_string()
}

fn optional(record: &MappedRecord, field: &str) -> Option<String> {
    record.get(field).map(str::to_string)
}

fn set_opt(preview: &mut MappedRecord, field: &str, value: &Option<String>) {
    if let Some(v) = value {
        preview.set(field, v);
    }
}

/// 数值解析: 缺失或非数值时回退默认值
fn parse_u32_or(record: &MappedRecord, field: &str, default: u32) -> u32 {
    record
        .get(field)
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(default)
}

fn parse_f64_or(record: &MappedRecord, field: &str, default: f64) -> f64 {
    record
        .get(field)
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or(default)
}

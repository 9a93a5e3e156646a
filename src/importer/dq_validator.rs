// ==========================================
// 教务管理系统 - 数据质量校验器实现
// ==========================================
// 职责: 映射记录的字段完整性 / 批内重复检查
// 级别: Error 阻断（严格模式拒绝上传）、Conflict 批内重复、
//       Warning 提示、Info 默认值补齐可观测记录
// 说明: 宽松模式下缺失 password/date_of_birth 仅记 Info，
//       变换阶段照常补默认值；严格模式升级为 Error
// ==========================================

use crate::domain::record::{DqViolation, MappedRecord};
use crate::domain::types::{DqLevel, ImportMode, RecordType};
use crate::importer::date_parser;
use std::collections::HashSet;

pub struct DqValidator {
    mode: ImportMode,
}

impl DqValidator {
    pub fn new(mode: ImportMode) -> Self {
        Self { mode }
    }

    /// 校验整批映射记录
    pub fn validate(
        &self,
        records: &[MappedRecord],
        record_type: RecordType,
    ) -> Vec<DqViolation> {
        if record_type.is_account() {
            let mut violations = self.validate_account_emails(records);
            for record in records {
                violations.extend(self.validate_account_defaults(record));
            }
            violations
        } else {
            records
                .iter()
                .flat_map(|r| self.validate_entity_required(r, record_type))
                .collect()
        }
    }

    /// 账号主键（email）非空且批内唯一
    fn validate_account_emails(&self, records: &[MappedRecord]) -> Vec<DqViolation> {
        let mut violations = Vec::new();
        let mut seen = HashSet::new();

        for record in records {
            let email = match record.get("email") {
                None => {
                    violations.push(DqViolation {
                        row_number: record.row_number,
                        level: DqLevel::Error,
                        field: "email".to_string(),
                        message: "邮箱缺失（账号主键，用户名默认由其派生）".to_string(),
                    });
                    continue;
                }
                Some(email) => email.to_lowercase(),
            };

            if !seen.insert(email.clone()) {
                violations.push(DqViolation {
                    row_number: record.row_number,
                    level: DqLevel::Conflict,
                    field: "email".to_string(),
                    message: format!("批内重复邮箱: {}", email),
                });
            }
        }
        violations
    }

    /// 将被默认值补齐的账号字段（级别随策略模式升降）
    fn validate_account_defaults(&self, record: &MappedRecord) -> Vec<DqViolation> {
        let level = match self.mode {
            ImportMode::Strict => DqLevel::Error,
            ImportMode::Lenient => DqLevel::Info,
        };
        let mut violations = Vec::new();

        if record.get("password").is_none() {
            violations.push(DqViolation {
                row_number: record.row_number,
                level,
                field: "password".to_string(),
                message: "密码缺失，将补占位密码".to_string(),
            });
        }

        match record.get("date_of_birth") {
            None => violations.push(DqViolation {
                row_number: record.row_number,
                level,
                field: "date_of_birth".to_string(),
                message: "出生日期缺失，将按导入日补齐".to_string(),
            }),
            Some(value) if date_parser::try_parse_date(value).is_none() => {
                violations.push(DqViolation {
                    row_number: record.row_number,
                    level,
                    field: "date_of_birth".to_string(),
                    message: format!("出生日期无法解析: {}，将按导入日补齐", value),
                })
            }
            Some(_) => {}
        }

        violations
    }

    /// 实体类必填字段（非阻断提示）
    fn validate_entity_required(
        &self,
        record: &MappedRecord,
        record_type: RecordType,
    ) -> Vec<DqViolation> {
        let required: &[&str] = match record_type {
            RecordType::Subject
            | RecordType::Program
            | RecordType::Curriculum
            | RecordType::Outcome => &["code", "name"],
            RecordType::Combo
            | RecordType::Assessment
            | RecordType::Material
            | RecordType::Session => &["name"],
            // 账号类不在此路径
            _ => &[],
        };

        required
            .iter()
            .filter(|field| record.get(field).is_none())
            .map(|field| DqViolation {
                row_number: record.row_number,
                level: DqLevel::Warning,
                field: field.to_string(),
                message: format!("必填字段 {} 缺失", field),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with(row: usize, fields: &[(&str, &str)]) -> MappedRecord {
        let mut record = MappedRecord::new(row);
        for (field, value) in fields {
            record.set(field, value);
        }
        record
    }

    #[test]
    fn test_missing_email_is_error_in_both_modes() {
        for mode in [ImportMode::Lenient, ImportMode::Strict] {
            let validator = DqValidator::new(mode);
            let records = vec![record_with(2, &[("first_name", "An")])];

            let violations = validator.validate(&records, RecordType::Student);

            assert!(violations
                .iter()
                .any(|v| v.field == "email" && v.level == DqLevel::Error));
        }
    }

    #[test]
    fn test_duplicate_email_case_insensitive() {
        let validator = DqValidator::new(ImportMode::Lenient);
        let records = vec![
            record_with(2, &[("email", "an@campus.edu"), ("password", "x"), ("date_of_birth", "2004-05-20")]),
            record_with(3, &[("email", "AN@campus.edu"), ("password", "x"), ("date_of_birth", "2004-05-20")]),
        ];

        let violations = validator.validate(&records, RecordType::Student);

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].level, DqLevel::Conflict);
        assert_eq!(violations[0].row_number, 3);
    }

    #[test]
    fn test_missing_password_level_follows_mode() {
        let records = vec![record_with(
            2,
            &[("email", "an@campus.edu"), ("date_of_birth", "2004-05-20")],
        )];

        let lenient = DqValidator::new(ImportMode::Lenient).validate(&records, RecordType::Student);
        assert!(lenient
            .iter()
            .any(|v| v.field == "password" && v.level == DqLevel::Info));

        let strict = DqValidator::new(ImportMode::Strict).validate(&records, RecordType::Student);
        assert!(strict
            .iter()
            .any(|v| v.field == "password" && v.level == DqLevel::Error));
    }

    #[test]
    fn test_unparseable_dob_flagged() {
        let validator = DqValidator::new(ImportMode::Lenient);
        let records = vec![record_with(
            2,
            &[
                ("email", "an@campus.edu"),
                ("password", "x"),
                ("date_of_birth", "生日未知"),
            ],
        )];

        let violations = validator.validate(&records, RecordType::Student);

        assert!(violations
            .iter()
            .any(|v| v.field == "date_of_birth" && v.level == DqLevel::Info));
    }

    #[test]
    fn test_entity_missing_code_is_warning() {
        let validator = DqValidator::new(ImportMode::Strict);
        let records = vec![record_with(2, &[("name", "数据结构")])];

        let violations = validator.validate(&records, RecordType::Subject);

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].level, DqLevel::Warning);
        assert_eq!(violations[0].field, "code");
    }

    #[test]
    fn test_clean_batch_no_violations() {
        let validator = DqValidator::new(ImportMode::Strict);
        let records = vec![record_with(
            2,
            &[
                ("email", "an@campus.edu"),
                ("password", "x"),
                ("date_of_birth", "2004-05-20"),
            ],
        )];

        assert!(validator.validate(&records, RecordType::Student).is_empty());
    }
}

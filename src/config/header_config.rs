// ==========================================
// 教务管理系统 - 表头配置注册表
// ==========================================
// 职责: 记录类型描述符（标准表头 + 表头变体映射）
// 红线: 注册表作为显式值注入识别器/映射器，不做进程级全局可变状态
// 扩展: 新部署可通过 JSON 配置文件追加类型，无需改动识别/映射代码
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// 表头归一化: 去首尾空白 + 小写
///
/// 识别与映射共用同一规则: 归一化后做精确相等比较，不做模糊/容错匹配
pub fn normalize_header(value: &str) -> String {
    value.trim().to_lowercase()
}

// ==========================================
// 配置层错误类型
// ==========================================
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败: {0}")]
    FileReadError(String),

    #[error("配置文件解析失败: {0}")]
    JsonParseError(String),

    #[error("表头配置非法 (类型 {type_name}): 标准表头 {header} 在字段映射中无任何变体")]
    UnmappedCanonicalHeader { type_name: String, header: String },

    #[error("表头配置非法 (类型 {0}): 标准表头列表为空")]
    EmptyCanonicalHeaders(String),

    #[error("类型名重复: {0}")]
    DuplicateTypeName(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::FileReadError(err.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::JsonParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;

// ==========================================
// HeaderConfig - 记录类型描述符
// ==========================================
// 不变量: 每个标准表头在 field_map 中至少有一个变体（含其自身）
// 生命周期: 进程启动时装配，此后不可变
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderConfig {
    /// 类型名（如 "STUDENT"），注册表主键
    pub type_name: String,

    /// 标准表头（声明顺序即预览列顺序）
    pub canonical_headers: Vec<String>,

    /// 表头变体（原样书写）→ 标准字段名
    pub field_map: HashMap<String, String>,

    /// 归一化变体 → 标准字段名（构造时生成，不参与序列化）
    #[serde(skip)]
    normalized_map: HashMap<String, String>,
}

impl HeaderConfig {
    /// 构造并校验配置
    ///
    /// # 参数
    /// - type_name: 类型名
    /// - canonical_headers: 标准表头列表
    /// - field_map: 表头变体 → 标准字段名
    ///
    /// # 返回
    /// - Ok(HeaderConfig): 校验通过（每个标准表头可通过 field_map 解析）
    /// - Err(ConfigError): 不变量被破坏
    pub fn new(
        type_name: impl Into<String>,
        canonical_headers: Vec<String>,
        field_map: HashMap<String, String>,
    ) -> ConfigResult<Self> {
        let mut config = Self {
            type_name: type_name.into(),
            canonical_headers,
            field_map,
            normalized_map: HashMap::new(),
        };
        config.finalize()?;
        Ok(config)
    }

    /// 生成归一化查找表并校验不变量（反序列化后也需调用）
    fn finalize(&mut self) -> ConfigResult<()> {
        if self.canonical_headers.is_empty() {
            return Err(ConfigError::EmptyCanonicalHeaders(self.type_name.clone()));
        }

        self.normalized_map = self
            .field_map
            .iter()
            .map(|(variant, field)| (normalize_header(variant), field.clone()))
            .collect();

        for header in &self.canonical_headers {
            if !self.normalized_map.contains_key(&normalize_header(header)) {
                return Err(ConfigError::UnmappedCanonicalHeader {
                    type_name: self.type_name.clone(),
                    header: header.clone(),
                });
            }
        }
        Ok(())
    }

    /// 将表格表头解析为标准字段名
    ///
    /// # 匹配规则
    /// - 归一化（TRIM + 小写）后精确相等
    pub fn resolve_field(&self, sheet_header: &str) -> Option<&str> {
        self.normalized_map
            .get(&normalize_header(sheet_header))
            .map(String::as_str)
    }

    /// 表格表头中是否存在该标准表头的任一变体
    pub fn canonical_header_matched(&self, canonical: &str, sheet_headers: &[String]) -> bool {
        let target_field = match self.resolve_field(canonical) {
            Some(field) => field,
            None => return false,
        };
        sheet_headers
            .iter()
            .any(|h| self.resolve_field(h) == Some(target_field))
    }
}

// ==========================================
// HeaderConfigRegistry - 表头配置注册表
// ==========================================
// 声明顺序即识别并列时的优先顺序（先声明者胜出）
#[derive(Debug, Clone)]
pub struct HeaderConfigRegistry {
    configs: Vec<HeaderConfig>,
}

impl HeaderConfigRegistry {
    /// 空注册表（测试用）
    pub fn empty() -> Self {
        Self { configs: Vec::new() }
    }

    /// 内置注册表: 门户全部 13 个导入类型
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for config in builtin_configs() {
            // 内置表在编译期保证合法
            registry
                .push(config)
                .expect("内置表头配置必须合法");
        }
        registry
    }

    /// 从 JSON 文本装配注册表（部署方自定义类型集合）
    ///
    /// # 格式
    /// `[{ "typeName", "canonicalHeaders", "fieldMap" }, ...]`
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let raw: Vec<HeaderConfig> = serde_json::from_str(json)?;
        let mut registry = Self::empty();
        for mut config in raw {
            config.finalize()?;
            registry.push(config)?;
        }
        Ok(registry)
    }

    /// 从 JSON 文件装配注册表
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// 在现有注册表（通常为内置表）末尾追加 JSON 扩展类型
    pub fn extend_from_json_str(&mut self, json: &str) -> ConfigResult<()> {
        let raw: Vec<HeaderConfig> = serde_json::from_str(json)?;
        for mut config in raw {
            config.finalize()?;
            self.push(config)?;
        }
        Ok(())
    }

    /// 追加单个配置（类型名唯一）
    pub fn push(&mut self, config: HeaderConfig) -> ConfigResult<()> {
        if self
            .configs
            .iter()
            .any(|c| c.type_name == config.type_name)
        {
            return Err(ConfigError::DuplicateTypeName(config.type_name));
        }
        self.configs.push(config);
        Ok(())
    }

    /// 全部候选配置（声明顺序）
    pub fn all(&self) -> &[HeaderConfig] {
        &self.configs
    }

    /// 按类型名查找
    pub fn get(&self, type_name: &str) -> Option<&HeaderConfig> {
        self.configs.iter().find(|c| c.type_name == type_name)
    }

    /// 限定候选集合（类型锁定导入页使用）；未注册的类型名被忽略
    pub fn subset(&self, type_names: &[&str]) -> Vec<HeaderConfig> {
        type_names
            .iter()
            .filter_map(|name| self.get(name).cloned())
            .collect()
    }
}

impl Default for HeaderConfigRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

// ==========================================
// 内置表头配置表
// ==========================================

/// 构造单个内置配置
/// entries: (标准表头, 标准字段名, 其余变体)
fn build_config(type_name: &str, entries: &[(&str, &str, &[&str])]) -> HeaderConfig {
    let canonical_headers = entries
        .iter()
        .map(|(header, _, _)| header.to_string())
        .collect();

    let mut field_map = HashMap::new();
    for (header, field, aliases) in entries {
        field_map.insert(header.to_string(), field.to_string());
        for alias in *aliases {
            field_map.insert(alias.to_string(), field.to_string());
        }
    }

    HeaderConfig::new(type_name, canonical_headers, field_map)
        .expect("内置表头配置必须合法")
}

/// 账号类公共表头（姓名/邮箱/密码/出生日期）
const NAME_EMAIL_ENTRIES: [(&str, &str, &[&str]); 4] = [
    ("First Name", "first_name", &["FirstName", "Given Name"]),
    ("Last Name", "last_name", &["LastName", "Surname", "Family Name"]),
    ("Email", "email", &["E-mail", "Email Address", "Mail"]),
    ("Password", "password", &["Pass"]),
];

const DOB_ENTRY: (&str, &str, &[&str]) = (
    "Date of Birth",
    "date_of_birth",
    &["DateOfBirth", "DOB", "Birthday", "Birth Date"],
);

const PHONE_ENTRY: (&str, &str, &[&str]) =
    ("Phone", "phone", &["Phone Number", "Mobile", "Telephone"]);

const DEPARTMENT_ENTRY: (&str, &str, &[&str]) =
    ("Department", "department", &["Dept", "Department Name"]);

fn account_config(type_name: &str, extra: &[(&str, &str, &[&str])]) -> HeaderConfig {
    let mut entries: Vec<(&str, &str, &[&str])> = NAME_EMAIL_ENTRIES.to_vec();
    entries.extend_from_slice(extra);
    entries.push(DOB_ENTRY);
    build_config(type_name, &entries)
}

fn builtin_configs() -> Vec<HeaderConfig> {
    vec![
        // ===== 账号类 =====
        account_config(
            "STUDENT",
            &[
                ("Address", "address", &["Home Address"]),
                PHONE_ENTRY,
            ],
        ),
        account_config("STAFF", &[DEPARTMENT_ENTRY, PHONE_ENTRY]),
        account_config("MANAGER", &[DEPARTMENT_ENTRY, PHONE_ENTRY]),
        account_config(
            "ADVISOR",
            &[
                DEPARTMENT_ENTRY,
                ("Specialization", "specialization", &["Specialty"]),
                PHONE_ENTRY,
            ],
        ),
        account_config("ADMIN", &[]),
        // ===== 实体类 =====
        build_config(
            "SUBJECT",
            &[
                ("Subject Code", "code", &["Code", "Course Code"]),
                ("Subject Name", "name", &["Name", "Course Name"]),
                ("Credits", "credits", &["Credit", "Credit Hours"]),
                ("Description", "description", &["Desc"]),
            ],
        ),
        build_config(
            "PROGRAM",
            &[
                ("Program Code", "code", &["Code"]),
                ("Program Name", "name", &["Name"]),
                ("Duration (Years)", "duration_years", &["Duration", "Years"]),
                ("Description", "description", &["Desc"]),
            ],
        ),
        build_config(
            "CURRICULUM",
            &[
                ("Curriculum Code", "code", &["Code"]),
                ("Curriculum Name", "name", &["Name"]),
                ("Academic Year", "academic_year", &["Year", "School Year"]),
                ("Description", "description", &["Desc"]),
            ],
        ),
        build_config(
            "COMBO",
            &[
                ("Combo Name", "name", &["Name"]),
                ("Description", "description", &["Desc"]),
            ],
        ),
        build_config(
            "ASSESSMENT",
            &[
                ("Assessment Name", "name", &["Name", "Title"]),
                ("Subject Code", "subject_code", &["Course Code"]),
                ("Weight (%)", "weight", &["Weight", "Percentage"]),
                ("Max Score", "max_score", &["Maximum Score", "Total Score"]),
            ],
        ),
        build_config(
            "MATERIAL",
            &[
                ("Material Name", "name", &["Name", "Title"]),
                ("Material Type", "material_type", &["Type"]),
                ("URL", "url", &["Link"]),
                ("Description", "description", &["Desc"]),
            ],
        ),
        build_config(
            "SESSION",
            &[
                ("Session Name", "name", &["Name", "Title"]),
                ("Subject Code", "subject_code", &["Course Code"]),
                ("Start Date", "start_date", &["Begin Date", "From"]),
                ("End Date", "end_date", &["Finish Date", "To"]),
            ],
        ),
        build_config(
            "OUTCOME",
            &[
                ("Outcome Code", "code", &["Code"]),
                ("Outcome Name", "name", &["Name", "Title"]),
                ("Subject Code", "subject_code", &["Course Code"]),
                ("Description", "description", &["Desc"]),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("  First Name  "), "first name");
        assert_eq!(normalize_header("EMAIL"), "email");
    }

    #[test]
    fn test_builtin_registry_complete() {
        let registry = HeaderConfigRegistry::builtin();
        for name in [
            "STUDENT",
            "STAFF",
            "MANAGER",
            "ADVISOR",
            "ADMIN",
            "SUBJECT",
            "PROGRAM",
            "CURRICULUM",
            "COMBO",
            "ASSESSMENT",
            "MATERIAL",
            "SESSION",
            "OUTCOME",
        ] {
            assert!(registry.get(name).is_some(), "缺少内置类型 {}", name);
        }
    }

    #[test]
    fn test_resolve_field_case_and_whitespace_insensitive() {
        let registry = HeaderConfigRegistry::builtin();
        let student = registry.get("STUDENT").unwrap();

        assert_eq!(student.resolve_field("  first name "), Some("first_name"));
        assert_eq!(student.resolve_field("DOB"), Some("date_of_birth"));
        assert_eq!(student.resolve_field("不存在的列"), None);
    }

    #[test]
    fn test_invariant_unmapped_canonical_header() {
        let result = HeaderConfig::new(
            "BROKEN",
            vec!["Email".to_string()],
            HashMap::new(), // Email 无任何变体
        );
        assert!(matches!(
            result,
            Err(ConfigError::UnmappedCanonicalHeader { .. })
        ));
    }

    #[test]
    fn test_registry_from_json_extends_identifier_without_code_change() {
        let json = r#"[
            {
                "typeName": "CLASSROOM",
                "canonicalHeaders": ["Room Code", "Capacity"],
                "fieldMap": {
                    "Room Code": "code",
                    "Room": "code",
                    "Capacity": "capacity"
                }
            }
        ]"#;

        let mut registry = HeaderConfigRegistry::builtin();
        registry.extend_from_json_str(json).unwrap();

        let classroom = registry.get("CLASSROOM").unwrap();
        assert_eq!(classroom.resolve_field("room"), Some("code"));
    }

    #[test]
    fn test_registry_rejects_duplicate_type() {
        let mut registry = HeaderConfigRegistry::builtin();
        let duplicate = registry.get("STUDENT").unwrap().clone();
        assert!(matches!(
            registry.push(duplicate),
            Err(ConfigError::DuplicateTypeName(_))
        ));
    }

    #[test]
    fn test_subset_preserves_declaration_order() {
        let registry = HeaderConfigRegistry::builtin();
        let subset = registry.subset(&["SUBJECT", "STUDENT"]);
        assert_eq!(subset.len(), 2);
        assert_eq!(subset[0].type_name, "SUBJECT");
    }
}

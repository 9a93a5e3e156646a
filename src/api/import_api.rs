// ==========================================
// 教务管理系统 - 导入API
// ==========================================
// 职责: 封装导入检视/上传流程，产出前端可直接消费的响应结构
// 输出: 识别类型名、可编辑记录集、行数统计、识别失败诊断文本
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{HeaderConfigRegistry, ImportPolicy};
use crate::domain::record::{DqSummary, DqViolation, MappedRecord};
use crate::i18n::{t, t_with_args};
use crate::importer::{BatchUploader, ImportSession, NoopUploader};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// 检视API响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectApiResponse {
    /// 批次ID（日志追溯）
    pub batch_id: String,
    /// 识别出的类型名
    pub type_name: String,
    /// 识别得分（命中的标准表头数）
    pub score: usize,
    /// 数据总行数（不含表头）
    pub total_rows: usize,
    /// 映射保留行数
    pub mapped_rows: usize,
    /// 可编辑记录集
    pub records: Vec<MappedRecord>,
    /// DQ 汇总统计
    pub dq_summary: DqSummary,
    /// DQ 违规明细（前端定位问题）
    pub dq_violations: Vec<DqViolation>,
    /// 检视耗时（毫秒）
    pub elapsed_ms: u64,
}

/// 导入API
pub struct ImportApi {
    registry: HeaderConfigRegistry,
    policy: ImportPolicy,
}

impl ImportApi {
    /// 创建新的ImportApi实例
    pub fn new(registry: HeaderConfigRegistry, policy: ImportPolicy) -> Self {
        Self { registry, policy }
    }

    /// 以内置注册表与宽松策略创建
    pub fn with_defaults() -> Self {
        Self::new(HeaderConfigRegistry::builtin(), ImportPolicy::lenient())
    }

    /// 创建导入会话（上传器由宿主应用注入）
    pub fn session(&self, uploader: Arc<dyn BatchUploader>) -> ImportSession {
        ImportSession::new(self.registry.clone(), self.policy.clone(), uploader)
    }

    /// 一次性检视文件（演练/预览，不涉及上传）
    ///
    /// # 参数
    /// - path: 表格文件路径
    /// - allowed: 候选类型白名单（类型锁定页传单元素，None = 全量）
    ///
    /// # 返回
    /// - Ok(InspectApiResponse): 检视结果
    /// - Err(ApiError): 用户友好错误（可经 user_message 转诊断文本）
    pub fn inspect_file(
        &self,
        path: &Path,
        allowed: Option<&[&str]>,
    ) -> ApiResult<InspectApiResponse> {
        let mut session = self.session(Arc::new(NoopUploader));
        let outcome = session.inspect_path(path, allowed)?;

        Ok(InspectApiResponse {
            batch_id: outcome.batch.batch_id,
            type_name: outcome.type_name,
            score: outcome.score,
            total_rows: outcome.batch.total_rows,
            mapped_rows: outcome.batch.mapped_rows,
            records: outcome.records,
            dq_summary: outcome.summary,
            dq_violations: outcome.violations,
            elapsed_ms: outcome.batch.elapsed_ms,
        })
    }

    /// 生成面向用户的诊断文本
    ///
    /// 识别失败时逐候选列出期望表头；类型不匹配时同时点名期望与检测类型
    pub fn user_message(err: &ApiError) -> String {
        match err {
            ApiError::TypeNotIdentified { candidates } => {
                let mut lines = vec![t("import.no_type_identified")];
                for candidate in candidates {
                    lines.push(t_with_args(
                        "import.expected_headers_line",
                        &[
                            ("type", candidate.type_name.as_str()),
                            ("headers", candidate.expected_headers.join(", ").as_str()),
                        ],
                    ));
                }
                lines.join("\n")
            }
            ApiError::TypeMismatch { expected, detected } => t_with_args(
                "import.type_mismatch",
                &[("expected", expected.as_str()), ("detected", detected.as_str())],
            ),
            ApiError::EmptyResult => t("import.empty_result"),
            ApiError::FileError(reason) => {
                t_with_args("import.decode_error", &[("reason", reason.as_str())])
            }
            ApiError::UploadError(reason) => {
                t_with_args("import.upload_failure", &[("reason", reason.as_str())])
            }
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sheet::CandidateExpectation;
    use std::io::Write;

    #[test]
    fn test_inspect_file_student_roster() {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .unwrap();
        writeln!(file, "First Name,Last Name,Email,Password,Address,Phone,Date of Birth").unwrap();
        writeln!(file, "An,Nguyen,an@campus.edu,s3cret,12 Elm St,0901,2004-05-20").unwrap();

        let api = ImportApi::with_defaults();
        let response = api.inspect_file(file.path(), None).unwrap();

        assert_eq!(response.type_name, "STUDENT");
        assert_eq!(response.total_rows, 1);
        assert_eq!(response.mapped_rows, 1);
        assert_eq!(response.records.len(), 1);
    }

    #[test]
    fn test_user_message_lists_expected_headers() {
        crate::i18n::set_locale("zh-CN");
        let err = ApiError::TypeNotIdentified {
            candidates: vec![CandidateExpectation {
                type_name: "STUDENT".to_string(),
                expected_headers: vec!["Email".to_string(), "First Name".to_string()],
            }],
        };

        let message = ImportApi::user_message(&err);

        assert!(message.contains("STUDENT"));
        assert!(message.contains("Email, First Name"));
    }

    #[test]
    fn test_user_message_type_mismatch_names_both() {
        crate::i18n::set_locale("zh-CN");
        let err = ApiError::TypeMismatch {
            expected: "STUDENT".to_string(),
            detected: "SUBJECT".to_string(),
        };

        let message = ImportApi::user_message(&err);

        assert!(message.contains("STUDENT"));
        assert!(message.contains("SUBJECT"));
    }
}

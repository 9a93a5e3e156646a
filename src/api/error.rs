// ==========================================
// 教务管理系统 - API层错误类型
// ==========================================
// 职责: 将导入层/配置层错误转换为用户友好的错误消息
// 原则: 所有错误信息包含显式原因，供前端直接展示
// ==========================================

use crate::config::ConfigError;
use crate::domain::sheet::CandidateExpectation;
use crate::importer::error::ImportError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 文件与解码错误
    // ==========================================
    #[error("文件错误: {0}")]
    FileError(String),

    // ==========================================
    // 识别与映射错误
    // ==========================================
    #[error("无法识别表格类型")]
    TypeNotIdentified { candidates: Vec<CandidateExpectation> },

    #[error("表格类型不匹配: 期望 {expected}, 检测到 {detected}")]
    TypeMismatch { expected: String, detected: String },

    #[error("未发现有效数据")]
    EmptyResult,

    // ==========================================
    // 上传与校验错误
    // ==========================================
    #[error("上传失败: {0}")]
    UploadError(String),

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    // ==========================================
    // 配置错误
    // ==========================================
    #[error("配置错误: {0}")]
    ConfigError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),
}

// ==========================================
// 从 ImportError 转换
// 目的: 将导入层的技术错误归入面向用户的类别
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::FileNotFound(_)
            | ImportError::UnsupportedFormat(_)
            | ImportError::EmptyFile
            | ImportError::DecodeError(_) => ApiError::FileError(err.to_string()),

            ImportError::NoTypeIdentified { candidates } => {
                ApiError::TypeNotIdentified { candidates }
            }
            ImportError::TypeMismatch { expected, detected } => {
                ApiError::TypeMismatch { expected, detected }
            }
            ImportError::EmptyResult => ApiError::EmptyResult,

            ImportError::UploadFailure { .. }
            | ImportError::UploadTimeout { .. }
            | ImportError::UploadAborted
            | ImportError::UploadInProgress => ApiError::UploadError(err.to_string()),

            ImportError::ValidationBlocked { .. } => {
                ApiError::ValidationError(err.to_string())
            }

            ImportError::InternalError(msg) => ApiError::InternalError(msg),
            ImportError::Other(e) => ApiError::InternalError(e.to_string()),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_error_categories() {
        let err: ApiError = ImportError::EmptyFile.into();
        assert!(matches!(err, ApiError::FileError(_)));

        let err: ApiError = ImportError::EmptyResult.into();
        assert!(matches!(err, ApiError::EmptyResult));

        let err: ApiError = ImportError::UploadFailure {
            message: "500".to_string(),
        }
        .into();
        assert!(matches!(err, ApiError::UploadError(_)));
    }

    #[test]
    fn test_mismatch_carries_both_names() {
        let err: ApiError = ImportError::TypeMismatch {
            expected: "STUDENT".to_string(),
            detected: "SUBJECT".to_string(),
        }
        .into();
        match err {
            ApiError::TypeMismatch { expected, detected } => {
                assert_eq!(expected, "STUDENT");
                assert_eq!(detected, "SUBJECT");
            }
            other => panic!("期望 TypeMismatch, 实际 {:?}", other),
        }
    }
}

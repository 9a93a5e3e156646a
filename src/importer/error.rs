// ==========================================
// 教务管理系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 传播策略: 上传前四类错误均可本地恢复（回到文件选择步骤），
//           UploadFailure 回到预览步骤重试；无致命错误
// ==========================================

use crate::domain::sheet::CandidateExpectation;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件解码错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xls/.csv）")]
    UnsupportedFormat(String),

    #[error("文件为空")]
    EmptyFile,

    #[error("文件解码失败: {0}")]
    DecodeError(String),

    // ===== 类型识别错误 =====
    #[error("无法识别表格类型（所有候选类型得分均为零）")]
    NoTypeIdentified {
        // 各候选类型的期望表头，供用户诊断
        candidates: Vec<CandidateExpectation>,
    },

    #[error("表格类型不匹配: 本页面仅允许 {expected}，检测到 {detected}")]
    TypeMismatch { expected: String, detected: String },

    // ===== 映射结果错误 =====
    #[error("未映射出任何有效数据行")]
    EmptyResult,

    // ===== 上传错误 =====
    #[error("批次上传失败: {message}")]
    UploadFailure { message: String },

    #[error("批次上传超时（{timeout_secs} 秒）")]
    UploadTimeout { timeout_secs: u64 },

    #[error("批次上传已取消")]
    UploadAborted,

    #[error("上传被拒绝: 当前会话已有进行中的上传")]
    UploadInProgress,

    #[error("上传被拒绝: 存在 {blocked} 条阻断级数据质量违规")]
    ValidationBlocked { blocked: usize },

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImportError {
    /// 是否应回到预览步骤（而非文件选择步骤）恢复
    pub fn recoverable_at_preview(&self) -> bool {
        matches!(
            self,
            ImportError::UploadFailure { .. }
                | ImportError::UploadTimeout { .. }
                | ImportError::UploadAborted
                | ImportError::UploadInProgress
                | ImportError::ValidationBlocked { .. }
        )
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::DecodeError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::DecodeError(err.to_string())
    }
}

// 实现 From<calamine::XlsxError>
impl From<calamine::XlsxError> for ImportError {
    fn from(err: calamine::XlsxError) -> Self {
        ImportError::DecodeError(err.to_string())
    }
}

// 实现 From<calamine::XlsError>
impl From<calamine::XlsError> for ImportError {
    fn from(err: calamine::XlsError) -> Self {
        ImportError::DecodeError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

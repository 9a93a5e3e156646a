// ==========================================
// 教务管理系统 - 批次上传接口
// ==========================================
// 职责: 定义上传 seam（HTTP 传输属外部协作方，不在本库内实现）
// 契约: 每个记录类型一次调用；不假设批次原子性，
//       每个分组的成败独立记录并上报
// ==========================================

use crate::domain::record::TransformedRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

// ==========================================
// BatchUploader Trait
// ==========================================
// 用途: 上传接口（阶段 5）
// 实现者: 宿主应用的 HTTP 客户端适配器；测试用 Mock；演练用 NoopUploader
#[async_trait]
pub trait BatchUploader: Send + Sync {
    /// 上传单个类型分组
    ///
    /// # 参数
    /// - type_name: 记录类型名
    /// - records: 该类型的有序变换记录
    ///
    /// # 返回
    /// - Ok(()): 后端接受该分组
    /// - Err(String): 后端拒绝原因（服务端消息，原样透传给用户）
    async fn upload_group(
        &self,
        type_name: &str,
        records: &[TransformedRecord],
    ) -> Result<(), String>;
}

// ==========================================
// NoopUploader - 演练用上传器
// ==========================================
// 用途: CLI 干跑模式；只记日志，恒成功
pub struct NoopUploader;

#[async_trait]
impl BatchUploader for NoopUploader {
    async fn upload_group(
        &self,
        type_name: &str,
        records: &[TransformedRecord],
    ) -> Result<(), String> {
        // 序列化与真实上传同一载荷形状，便于演练时核对
        let payload = serde_json::Value::Array(
            records
                .iter()
                .map(TransformedRecord::to_upload_payload)
                .collect(),
        );
        debug!(type_name = %type_name, payload = %payload, "演练载荷");
        info!(
            type_name = %type_name,
            count = records.len(),
            "演练模式: 跳过实际上传"
        );
        Ok(())
    }
}

// ==========================================
// GroupOutcome / UploadReport - 分组上传结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupOutcome {
    pub type_name: String,
    pub record_count: usize,
    /// None = 成功；Some = 服务端拒绝原因
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadReport {
    pub groups: Vec<GroupOutcome>,
}

impl UploadReport {
    pub fn all_succeeded(&self) -> bool {
        self.groups.iter().all(|g| g.error.is_none())
    }

    /// 汇总失败分组的服务端消息
    pub fn failure_message(&self) -> Option<String> {
        let failures: Vec<String> = self
            .groups
            .iter()
            .filter_map(|g| {
                g.error
                    .as_ref()
                    .map(|e| format!("{}: {}", g.type_name, e))
            })
            .collect();
        if failures.is_empty() {
            None
        } else {
            Some(failures.join("; "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_failure_message() {
        let report = UploadReport {
            groups: vec![
                GroupOutcome {
                    type_name: "STUDENT".to_string(),
                    record_count: 3,
                    error: None,
                },
                GroupOutcome {
                    type_name: "STAFF".to_string(),
                    record_count: 1,
                    error: Some("邮箱已存在".to_string()),
                },
            ],
        };

        assert!(!report.all_succeeded());
        let message = report.failure_message().unwrap();
        assert!(message.contains("STAFF"));
        assert!(message.contains("邮箱已存在"));
    }

    #[tokio::test]
    async fn test_noop_uploader_accepts_everything() {
        let result = NoopUploader.upload_group("STUDENT", &[]).await;
        assert!(result.is_ok());
    }
}

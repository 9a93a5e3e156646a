// ==========================================
// 教务管理系统 - 表格领域模型
// ==========================================
// 职责: 导入管道的表格中间产物
// 生命周期: RawSheet 每次导入产生一次，映射完成后即丢弃
// ==========================================

use crate::config::HeaderConfig;
use serde::{Deserialize, Serialize};

// ==========================================
// RawSheet - 原始表格
// ==========================================
// 用途: 文件解码产物（首个工作表）
// headers: 首行（字符串化）
// rows: 其余数据行（单元格已字符串化，空单元格为空串）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawSheet {
    /// 数据行数（不含表头）
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// 是否只有表头（零数据行合法，下游按"无记录"处理）
    pub fn is_data_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ==========================================
// IdentifiedType - 识别结果
// ==========================================
// 不变量: score >= 1 且为所有候选中的严格最大值
// 并列时取声明顺序靠前者
#[derive(Debug, Clone)]
pub struct IdentifiedType {
    pub config: HeaderConfig,
    pub score: usize,
}

impl IdentifiedType {
    pub fn type_name(&self) -> &str {
        &self.config.type_name
    }
}

// ==========================================
// CandidateExpectation - 候选类型期望表头
// ==========================================
// 用途: 识别失败时的用户诊断（列出每个候选期望的表头）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateExpectation {
    pub type_name: String,
    pub expected_headers: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_sheet_headers_only() {
        let sheet = RawSheet {
            headers: vec!["Email".to_string()],
            rows: vec![],
        };
        assert!(sheet.is_data_empty());
        assert_eq!(sheet.row_count(), 0);
    }
}

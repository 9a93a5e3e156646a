// ==========================================
// 教务管理系统 - 行映射器实现
// ==========================================
// 职责: 阶段 2 - 按识别出的配置将数据行映射为 MappedRecord
// 规则: 列→字段解析与识别器共用归一化精确匹配；
//       去首尾空白后非空的单元格才写入；零字段行静默丢弃
//       （表格尾部常见连片空行，不构成错误）
// ==========================================

use crate::config::HeaderConfig;
use crate::domain::record::MappedRecord;
use crate::domain::sheet::RawSheet;
use tracing::{debug, trace};

pub struct RowMapper;

impl RowMapper {
    /// 将整张表映射为有序记录集合
    ///
    /// # 参数
    /// - sheet: 原始表格（表头用于列对齐）
    /// - config: 识别出的表头配置
    ///
    /// # 返回
    /// - Vec<MappedRecord>: 保留行的有序集合（源行相对顺序不变）
    ///
    /// # 说明
    /// - 零保留行不是异常，由调用方决定是否作为"无有效数据"上报
    pub fn map_rows(sheet: &RawSheet, config: &HeaderConfig) -> Vec<MappedRecord> {
        // 每列预解析一次标准字段名（None = 未知列，整列忽略）
        let column_fields: Vec<Option<&str>> = sheet
            .headers
            .iter()
            .map(|header| config.resolve_field(header))
            .collect();

        let mut records = Vec::new();
        for (row_idx, row) in sheet.rows.iter().enumerate() {
            // 表头为第 1 行，数据行号从 2 起
            let row_number = row_idx + 2;
            let mut record = MappedRecord::new(row_number);

            for (col_idx, cell) in row.iter().enumerate() {
                let field = match column_fields.get(col_idx) {
                    Some(Some(field)) => *field,
                    _ => continue,
                };

                let trimmed = cell.trim();
                if trimmed.is_empty() {
                    continue;
                }
                record
                    .fields
                    .insert(field.to_string(), trimmed.to_string());
            }

            if record.is_empty() {
                trace!(row_number = row_number, "丢弃零字段行");
                continue;
            }
            records.push(record);
        }

        debug!(
            type_name = %config.type_name,
            total_rows = sheet.rows.len(),
            mapped_rows = records.len(),
            "行映射完成"
        );
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HeaderConfigRegistry;

    fn student_sheet(rows: Vec<Vec<&str>>) -> RawSheet {
        RawSheet {
            headers: vec![
                "First Name".to_string(),
                "Last Name".to_string(),
                "Email".to_string(),
                "Phone".to_string(),
            ],
            rows: rows
                .into_iter()
                .map(|r| r.into_iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    fn student_config() -> crate::config::HeaderConfig {
        HeaderConfigRegistry::builtin()
            .get("STUDENT")
            .unwrap()
            .clone()
    }

    #[test]
    fn test_map_rows_basic() {
        let sheet = student_sheet(vec![vec!["An", "Nguyen", "an@campus.edu", "0901"]]);

        let records = RowMapper::map_rows(&sheet, &student_config());

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].row_number, 2);
        assert_eq!(records[0].get("first_name"), Some("An"));
        assert_eq!(records[0].get("email"), Some("an@campus.edu"));
    }

    #[test]
    fn test_blank_row_dropped_silently() {
        // 5 行数据，第 3 行整行空白 → 恰好 4 条记录
        let sheet = student_sheet(vec![
            vec!["A", "1", "a@x.edu", ""],
            vec!["B", "2", "b@x.edu", ""],
            vec!["", "", "", ""],
            vec!["D", "4", "d@x.edu", ""],
            vec!["E", "5", "e@x.edu", ""],
        ]);

        let records = RowMapper::map_rows(&sheet, &student_config());

        assert_eq!(records.len(), 4);
    }

    #[test]
    fn test_order_preserved_after_filter() {
        let sheet = student_sheet(vec![
            vec!["A", "", "", ""],
            vec!["", "", "", ""],
            vec!["C", "", "", ""],
        ]);

        let records = RowMapper::map_rows(&sheet, &student_config());

        let names: Vec<&str> = records
            .iter()
            .map(|r| r.get("first_name").unwrap())
            .collect();
        assert_eq!(names, vec!["A", "C"]);
        assert_eq!(records[0].row_number, 2);
        assert_eq!(records[1].row_number, 4);
    }

    #[test]
    fn test_whitespace_only_cell_not_mapped() {
        let sheet = student_sheet(vec![vec!["  An  ", "   ", "an@campus.edu", ""]]);

        let records = RowMapper::map_rows(&sheet, &student_config());

        assert_eq!(records[0].get("first_name"), Some("An"));
        assert_eq!(records[0].get("last_name"), None);
    }

    #[test]
    fn test_unknown_column_ignored() {
        let mut sheet = student_sheet(vec![vec!["An", "Nguyen", "an@campus.edu", "0901"]]);
        sheet.headers.push("内部备注".to_string());
        sheet.rows[0].push("不应出现".to_string());

        let records = RowMapper::map_rows(&sheet, &student_config());

        assert_eq!(records[0].fields.len(), 4);
    }

    #[test]
    fn test_row_with_only_unmapped_cells_dropped() {
        let mut sheet = student_sheet(vec![vec!["", "", "", ""]]);
        sheet.headers.push("内部备注".to_string());
        sheet.rows[0].push("孤立值".to_string());

        let records = RowMapper::map_rows(&sheet, &student_config());

        assert!(records.is_empty());
    }

    #[test]
    fn test_short_row_tolerated() {
        // 行长度短于表头数（CSV flexible 模式产物）
        let sheet = student_sheet(vec![vec!["An"]]);

        let records = RowMapper::map_rows(&sheet, &student_config());

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].fields.len(), 1);
    }

    #[test]
    fn test_synonym_header_resolves_to_canonical_field() {
        let sheet = RawSheet {
            headers: vec!["E-mail".to_string(), "DOB".to_string()],
            rows: vec![vec!["an@campus.edu".to_string(), "2004-05-20".to_string()]],
        };

        let records = RowMapper::map_rows(&sheet, &student_config());

        assert_eq!(records[0].get("email"), Some("an@campus.edu"));
        assert_eq!(records[0].get("date_of_birth"), Some("2004-05-20"));
    }
}

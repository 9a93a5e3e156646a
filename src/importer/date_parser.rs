// ==========================================
// 教务管理系统 - 日期解析策略
// ==========================================
// 职责: 单元格值 → 具体日历日期（变换阶段共用）
// 解析顺序: ISO-8601 → 常见区域格式 → 紧凑格式 → Excel 日序号
// 回退: 全部失败及空输入 → 调用方注入的"当前日期"
//       （回退日期必须由参数注入，解析器内部不读系统时钟）
// ==========================================

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Excel 日序号起点（序号 1 对应该日）
const EXCEL_EPOCH_YMD: (i32, u32, u32) = (1900, 1, 1);

/// Excel 日序号上限（9999-12-31），超出视为非日序号数值
const EXCEL_SERIAL_MAX: f64 = 2_958_465.0;

/// 字符串日期格式（按声明顺序尝试）
const DATE_FORMATS: [&str; 5] = [
    "%Y-%m-%d", // ISO / YYYY-MM-DD
    "%m/%d/%Y", // MM/DD/YYYY
    "%m-%d-%Y", // MM-DD-YYYY
    "%Y/%m/%d", // YYYY/MM/DD
    "%Y%m%d",   // 紧凑格式（历史模板）
];

/// Excel 日序号 → 日历日期
///
/// # 规则
/// - date = 起点 + (serial - 1) 天，小数部分（时刻）舍弃
/// - serial < 1 或超出上限 → None
pub fn from_excel_serial(serial: f64) -> Option<NaiveDate> {
    if !(1.0..=EXCEL_SERIAL_MAX).contains(&serial) {
        return None;
    }
    let (y, m, d) = EXCEL_EPOCH_YMD;
    let epoch = NaiveDate::from_ymd_opt(y, m, d)?;
    epoch.checked_add_days(chrono::Days::new(serial.trunc() as u64 - 1))
}

/// 尽力解析日期字符串（无回退；失败返回 None）
///
/// 日期时间值（如单元格序列化出的 ISO 时间戳）取其日期部分
pub fn try_parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    // ISO-8601 日期时间（含时区 / 无时区）
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }

    // 纯日期格式
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }

    // Excel 日序号（数值单元格字符串化产物）
    if let Ok(serial) = trimmed.parse::<f64>() {
        return from_excel_serial(serial);
    }

    None
}

/// 解析日期，失败与空输入回退为注入的"当前日期"
///
/// # 参数
/// - value: 单元格值（可缺失）
/// - today: 导入时刻的当前日期（测试中固定注入以保证确定性）
pub fn parse_date_or_today(value: Option<&str>, today: NaiveDate) -> NaiveDate {
    value.and_then(try_parse_date).unwrap_or(today)
}

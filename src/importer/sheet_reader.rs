// ==========================================
// 教务管理系统 - 表格读取器实现
// ==========================================
// 职责: 阶段 0 - 将电子表格解码为 RawSheet（仅取首个工作表）
// 支持: Excel (.xlsx/.xls) / CSV (.csv)
// 纯解码，无副作用；空白数据行保留，由映射阶段统一丢弃
// ==========================================

use crate::domain::sheet::RawSheet;
use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook, Data, Range, Reader, Xls, Xlsx};
use csv::ReaderBuilder;
use std::io::Cursor;
use std::path::Path;

// ==========================================
// SheetReader Trait
// ==========================================
// 用途: 文件解码接口（阶段 0）
// 实现者: ExcelReader, CsvReader, UniversalReader
pub trait SheetReader: Send + Sync {
    /// 从文件路径解码
    fn read_path(&self, path: &Path) -> ImportResult<RawSheet>;

    /// 从原始字节解码
    fn read_bytes(&self, bytes: &[u8]) -> ImportResult<RawSheet>;
}

/// 将单元格区域切分为表头行 + 数据行
///
/// 表头: 首行，字符串化并去首尾空白
/// 数据行: 其余行，单元格字符串化（空单元格为空串）
/// 仅有表头（零数据行）合法，下游按"无记录"处理
fn split_range(range: &Range<Data>) -> ImportResult<RawSheet> {
    let mut rows = range.rows();

    let header_row = rows.next().ok_or(ImportError::EmptyFile)?;
    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| cell.to_string().trim().to_string())
        .collect();

    let data_rows: Vec<Vec<String>> = rows
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect();

    Ok(RawSheet {
        headers,
        rows: data_rows,
    })
}

/// 读取工作簿首个工作表（xlsx/xls 共用）
fn first_sheet<RS, R>(workbook: &mut R) -> ImportResult<RawSheet>
where
    RS: std::io::Read + std::io::Seek,
    R: Reader<RS>,
    ImportError: From<R::Error>,
{
    let sheet_names = workbook.sheet_names();
    if sheet_names.is_empty() {
        return Err(ImportError::DecodeError("工作簿无工作表".to_string()));
    }

    let sheet_name = sheet_names[0].clone();
    let range = workbook.worksheet_range(&sheet_name)?;
    split_range(&range)
}

/// 文件存在性检查
fn ensure_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

// ==========================================
// ExcelReader 实现
// ==========================================
pub struct ExcelReader;

impl SheetReader for ExcelReader {
    fn read_path(&self, path: &Path) -> ImportResult<RawSheet> {
        ensure_exists(path)?;

        if std::fs::metadata(path)?.len() == 0 {
            return Err(ImportError::EmptyFile);
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "xlsx" => {
                let mut workbook: Xlsx<_> = open_workbook(path)?;
                first_sheet(&mut workbook)
            }
            "xls" => {
                let mut workbook: Xls<_> = open_workbook(path)?;
                first_sheet(&mut workbook)
            }
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }

    fn read_bytes(&self, bytes: &[u8]) -> ImportResult<RawSheet> {
        if bytes.is_empty() {
            return Err(ImportError::EmptyFile);
        }

        // 容器魔数嗅探: ZIP (xlsx) / OLE2 (xls)
        if bytes.starts_with(b"PK") {
            let mut workbook = Xlsx::new(Cursor::new(bytes.to_vec()))?;
            first_sheet(&mut workbook)
        } else if bytes.starts_with(&[0xD0, 0xCF, 0x11, 0xE0]) {
            let mut workbook = Xls::new(Cursor::new(bytes.to_vec()))?;
            first_sheet(&mut workbook)
        } else {
            Err(ImportError::DecodeError(
                "无法识别的电子表格容器".to_string(),
            ))
        }
    }
}

// ==========================================
// CsvReader 实现
// ==========================================
pub struct CsvReader;

impl CsvReader {
    fn read_from<R: std::io::Read>(&self, reader: R) -> ImportResult<RawSheet> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(RawSheet { headers, rows })
    }
}

impl SheetReader for CsvReader {
    fn read_path(&self, path: &Path) -> ImportResult<RawSheet> {
        ensure_exists(path)?;

        if std::fs::metadata(path)?.len() == 0 {
            return Err(ImportError::EmptyFile);
        }

        let file = std::fs::File::open(path)?;
        self.read_from(file)
    }

    fn read_bytes(&self, bytes: &[u8]) -> ImportResult<RawSheet> {
        if bytes.is_empty() {
            return Err(ImportError::EmptyFile);
        }
        self.read_from(Cursor::new(bytes.to_vec()))
    }
}

// ==========================================
// UniversalReader - 按扩展名/魔数自动分派
// ==========================================
pub struct UniversalReader;

impl SheetReader for UniversalReader {
    fn read_path(&self, path: &Path) -> ImportResult<RawSheet> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => CsvReader.read_path(path),
            "xlsx" | "xls" => ExcelReader.read_path(path),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }

    fn read_bytes(&self, bytes: &[u8]) -> ImportResult<RawSheet> {
        if bytes.is_empty() {
            return Err(ImportError::EmptyFile);
        }

        // 二进制容器优先；非容器字节按 CSV 文本解析
        if bytes.starts_with(b"PK") || bytes.starts_with(&[0xD0, 0xCF, 0x11, 0xE0]) {
            ExcelReader.read_bytes(bytes)
        } else {
            CsvReader.read_bytes(bytes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_csv_reader_headers_and_rows() {
        let file = write_csv("Email,First Name\na@campus.edu,An\nb@campus.edu,Binh\n");

        let sheet = CsvReader.read_path(file.path()).unwrap();

        assert_eq!(sheet.headers, vec!["Email", "First Name"]);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0][0], "a@campus.edu");
    }

    #[test]
    fn test_csv_reader_keeps_blank_rows_for_mapper() {
        let file = write_csv("Email,First Name\na@campus.edu,An\n,\nb@campus.edu,Binh\n");

        let sheet = CsvReader.read_path(file.path()).unwrap();

        // 空白行由映射阶段丢弃，读取阶段保留
        assert_eq!(sheet.rows.len(), 3);
    }

    #[test]
    fn test_csv_reader_headers_only() {
        let file = write_csv("Email,First Name\n");

        let sheet = CsvReader.read_path(file.path()).unwrap();

        assert!(sheet.is_data_empty());
    }

    #[test]
    fn test_empty_file_is_decode_error() {
        let file = write_csv("");
        let result = CsvReader.read_path(file.path());
        assert!(matches!(result, Err(ImportError::EmptyFile)));
    }

    #[test]
    fn test_file_not_found() {
        let result = UniversalReader.read_path(Path::new("missing_roster.xlsx"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        let result = UniversalReader.read_path(file.path());
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_corrupt_container_bytes() {
        // ZIP 魔数但内容损坏
        let result = ExcelReader.read_bytes(b"PK\x03\x04not-a-real-workbook");
        assert!(matches!(result, Err(ImportError::DecodeError(_))));
    }

    #[test]
    fn test_empty_bytes() {
        let result = UniversalReader.read_bytes(b"");
        assert!(matches!(result, Err(ImportError::EmptyFile)));
    }
}

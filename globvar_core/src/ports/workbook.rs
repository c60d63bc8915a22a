use anyhow::Result;
use thiserror::Error;

use crate::domain::ReadError;

#[derive(Debug, Error)]
pub enum WorkbookError {
    #[error("failed to open workbook {path}: {message}")]
    Open { path: String, message: String },

    #[error("sheet not found: '{sheet}', available: {detected:?}")]
    MissingSheet { sheet: String, detected: Vec<String> },

    #[error("failed to read sheet '{sheet}': {message}")]
    ReadSheet { sheet: String, message: String },
}

/// 输入端口：按 sheet 名读取原始表格
/// 说明：核心不关心 xlsx 的解析细节，只消费“表头 + 字符串单元格”。
pub trait WorkbookSource {
    /// 工作簿中可见的 sheet 名（用于诊断）
    fn sheet_names(&self) -> Vec<String>;
    /// 读取一张 sheet；第一行为表头
    fn read_sheet(&mut self, name: &str) -> Result<RawSheet>;
}

/// 原始表格：表头 + 数据行，空单元格为 ""
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawSheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawSheet {
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows,
        }
    }

    /// 测试 / 程序化构造用的便捷入口
    pub fn from_strs(name: &str, headers: &[&str], rows: &[&[&str]]) -> Self {
        Self::new(
            name,
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == column)
    }

    pub fn require_column(&self, column: &str) -> Result<usize, ReadError> {
        self.column_index(column)
            .ok_or_else(|| ReadError::MissingColumn {
                sheet: self.name.clone(),
                column: column.to_string(),
            })
    }

    /// 越界（行比表头短）视为空单元格
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(|s| s.trim())
            .unwrap_or("")
    }
}

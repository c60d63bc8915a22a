//! xlsx 工作簿读取（calamine）。
//!
//! - 第一行为表头，之后为数据行
//! - 数值单元格：整数值的浮点数去掉 `.0`（Excel 中的 `100` 读出来是 100.0）
//! - 错误单元格（`#N/A` 等）与空单元格一样读为 ""
//! - 日期格式的单元格按 Excel 序列值读取（地址、偏移被误设为日期格式时仍能还原数值）

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Result;
use calamine::{open_workbook_auto, Data, Reader, Sheets};
use log::debug;

use crate::ports::{RawSheet, WorkbookError, WorkbookSource};

pub struct XlsxWorkbook {
    workbook: Sheets<BufReader<File>>,
}

impl XlsxWorkbook {
    pub fn open(path: &Path) -> Result<Self, WorkbookError> {
        let workbook = open_workbook_auto(path).map_err(|e| WorkbookError::Open {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        debug!("opened workbook {}", path.display());
        Ok(Self { workbook })
    }
}

impl WorkbookSource for XlsxWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names()
    }

    fn read_sheet(&mut self, name: &str) -> Result<RawSheet> {
        let detected = self.workbook.sheet_names();
        if !detected.iter().any(|s| s == name) {
            return Err(WorkbookError::MissingSheet {
                sheet: name.to_string(),
                detected,
            }
            .into());
        }

        let range = self
            .workbook
            .worksheet_range(name)
            .map_err(|e| WorkbookError::ReadSheet {
                sheet: name.to_string(),
                message: e.to_string(),
            })?;

        let mut rows = range.rows();
        let headers: Vec<String> = rows
            .next()
            .map(|r| r.iter().map(cell_string).collect())
            .unwrap_or_default();
        let data: Vec<Vec<String>> = rows.map(|r| r.iter().map(cell_string).collect()).collect();

        debug!("sheet '{}': {} columns, {} rows", name, headers.len(), data.len());
        Ok(RawSheet::new(name, headers, data))
    }
}

fn cell_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(v) => float_text(*v),
        Data::Int(v) => format!("{v}"),
        Data::Bool(v) => (if *v { "1" } else { "0" }).to_string(),
        Data::DateTime(dt) => float_text(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
        Data::Error(e) => {
            debug!("error cell {e} read as empty");
            String::new()
        }
    }
}

fn float_text(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

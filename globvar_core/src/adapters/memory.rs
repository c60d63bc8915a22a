use anyhow::Result;
use indexmap::IndexMap;

use crate::ports::{RawSheet, WorkbookError, WorkbookSource};

/// 内存工作簿：测试与程序化调用使用
#[derive(Clone, Debug, Default)]
pub struct MemoryWorkbook {
    sheets: IndexMap<String, RawSheet>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(mut self, sheet: RawSheet) -> Self {
        self.insert(sheet);
        self
    }

    pub fn insert(&mut self, sheet: RawSheet) {
        self.sheets.insert(sheet.name.clone(), sheet);
    }
}

impl WorkbookSource for MemoryWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.keys().cloned().collect()
    }

    fn read_sheet(&mut self, name: &str) -> Result<RawSheet> {
        self.sheets.get(name).cloned().ok_or_else(|| {
            WorkbookError::MissingSheet {
                sheet: name.to_string(),
                detected: self.sheet_names(),
            }
            .into()
        })
    }
}

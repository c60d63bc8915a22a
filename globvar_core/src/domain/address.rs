//! PLC 地址游标。
//!
//! 位地址写作 `字.位`（如 `D100.3`），字地址为整数（如 `D100`）。
//! 游标内部以“十分之一字”为单位的定点整数保存，`0.1` 步进不会产生浮点误差。

use super::types::ScalarType;

pub const TENTHS_PER_WORD: u64 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AddressCursor {
    tenths: u64,
}

impl AddressCursor {
    /// 超出 u64 可表示的范围时返回 None
    pub fn from_word(word: u64) -> Option<Self> {
        word.checked_mul(TENTHS_PER_WORD).map(|tenths| Self { tenths })
    }

    pub fn from_tenths(tenths: u64) -> Self {
        Self { tenths }
    }

    pub fn tenths(&self) -> u64 {
        self.tenths
    }

    /// 当前游标所在的字地址（截断小数部分）
    pub fn word(&self) -> u64 {
        self.tenths / TENTHS_PER_WORD
    }

    pub fn checked_advance(self, tenths: u64) -> Option<Self> {
        self.tenths.checked_add(tenths).map(|tenths| Self { tenths })
    }

    /// 按类型取当前地址：位类型保留一位小数，字类型截断为整数。
    pub fn address(&self, form: ScalarType) -> PlcAddress {
        PlcAddress {
            tenths: self.tenths,
            form,
        }
    }
}

/// 已分配的 PLC 地址（不含存储区前缀）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlcAddress {
    tenths: u64,
    form: ScalarType,
}

impl PlcAddress {
    pub fn word(word: u64) -> Option<Self> {
        word.checked_mul(TENTHS_PER_WORD).map(|tenths| Self {
            tenths,
            form: ScalarType::Word,
        })
    }

    pub fn form(&self) -> ScalarType {
        self.form
    }

    /// 渲染为不带存储区前缀的文本：`100` / `100.3`
    pub fn offset_text(&self) -> String {
        match self.form {
            ScalarType::Bool => format!(
                "{}.{}",
                self.tenths / TENTHS_PER_WORD,
                self.tenths % TENTHS_PER_WORD
            ),
            ScalarType::Word => format!("{}", self.tenths / TENTHS_PER_WORD),
        }
    }

    /// 渲染为带存储区前缀的文本：`D100` / `D100.3`
    pub fn render(&self, area: &str) -> String {
        format!("{area}{}", self.offset_text())
    }
}

//! 变量类型：读取时一次性解析为封闭枚举，后续分配逻辑只做穷尽匹配。
//!
//! 表格中的类型文本：
//! - `BOOL` / `WORD`
//! - `ARRAY [n] OF BOOL` / `ARRAY [n] OF WORD`

use std::fmt;

use serde::{Deserialize, Serialize};

/// 基础类型（位 / 字）
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Bool,
    Word,
}

impl ScalarType {
    pub fn parse(raw: &str) -> Option<Self> {
        match normalize(raw).as_str() {
            "BOOL" => Some(ScalarType::Bool),
            "WORD" => Some(ScalarType::Word),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarType::Bool => "BOOL",
            ScalarType::Word => "WORD",
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum VarType {
    Scalar(ScalarType),
    Array { len: u32, elem: ScalarType },
}

impl VarType {
    pub const BOOL: VarType = VarType::Scalar(ScalarType::Bool);
    pub const WORD: VarType = VarType::Scalar(ScalarType::Word);

    /// 解析声明类型；无法识别返回 None（由调用方转换为 InvalidType）。
    pub fn parse(raw: &str) -> Option<Self> {
        let norm = normalize(raw);
        if let Some(scalar) = ScalarType::parse(&norm) {
            return Some(VarType::Scalar(scalar));
        }

        let rest = norm.strip_prefix("ARRAY")?.trim_start();
        let rest = rest.strip_prefix('[')?;
        let (len_text, rest) = rest.split_once(']')?;
        let len: u32 = len_text.trim().parse().ok()?;
        if len == 0 {
            return None;
        }
        let elem_text = rest.trim_start().strip_prefix("OF")?;
        // "OFBOOL" 不合法：OF 与元素类型之间必须有空白
        if !elem_text.starts_with(char::is_whitespace) {
            return None;
        }
        let elem = ScalarType::parse(elem_text)?;
        Some(VarType::Array { len, elem })
    }

    /// 地址格式/HMI 类型由基础类型决定（数组取元素类型）。
    pub fn base(&self) -> ScalarType {
        match self {
            VarType::Scalar(s) => *s,
            VarType::Array { elem, .. } => *elem,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, VarType::Array { .. })
    }
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarType::Scalar(s) => f.write_str(s.as_str()),
            VarType::Array { len, elem } => write!(f, "ARRAY [{len}] OF {}", elem.as_str()),
        }
    }
}

/// HMI 内部变量只允许 BIT / WORD。
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum HmiInternalType {
    Bit,
    Word,
}

impl HmiInternalType {
    pub fn parse(raw: &str) -> Option<Self> {
        match normalize(raw).as_str() {
            "BIT" => Some(HmiInternalType::Bit),
            "WORD" => Some(HmiInternalType::Word),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> ScalarType {
        match self {
            HmiInternalType::Bit => ScalarType::Bool,
            HmiInternalType::Word => ScalarType::Word,
        }
    }
}

fn normalize(raw: &str) -> String {
    raw.trim().to_uppercase()
}

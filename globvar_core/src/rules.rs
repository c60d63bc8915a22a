//! 类型 / 偏移规则（纯函数，无副作用）。
//!
//! | 类型 | 数组元素 | 地址增量 | HMI 类型 |
//! |---|---|---|---|
//! | BOOL | 否 | 声明偏移（按小数位增量） | BIT |
//! | BOOL | 是 | 固定 0.1（下一位） | BIT |
//! | WORD | 否 | 声明偏移（截断为整字） | WORD |
//! | WORD | 是 | 固定 1（下一字） | WORD |
//!
//! 增量单位均为 0.1 字（见 `domain::address`）。

use crate::domain::address::TENTHS_PER_WORD;
use crate::domain::{ScalarType, VarType};

pub const HMI_TYPE_BIT: &str = "BIT";
pub const HMI_TYPE_WORD: &str = "WORD";

/// 单个变量（或数组元素）分配后游标的前进量
pub fn address_increment(scalar: ScalarType, is_element: bool, declared_offset: u64) -> u64 {
    match (scalar, is_element) {
        (ScalarType::Bool, false) => declared_offset,
        (ScalarType::Bool, true) => 1,
        (ScalarType::Word, false) => declared_offset / TENTHS_PER_WORD * TENTHS_PER_WORD,
        (ScalarType::Word, true) => TENTHS_PER_WORD,
    }
}

/// 整条声明占用的地址跨度：数组按元素类型解释声明偏移，而不是元素个数。
pub fn declaration_increment(var_type: VarType, declared_offset: u64) -> u64 {
    address_increment(var_type.base(), false, declared_offset)
}

pub fn hmi_type_tag(scalar: ScalarType) -> &'static str {
    match scalar {
        ScalarType::Bool => HMI_TYPE_BIT,
        ScalarType::Word => HMI_TYPE_WORD,
    }
}

/// 浮点读数（`0.3 * 10` 之类）与整数十分位之间允许的误差
const TENTHS_TOLERANCE: f64 = 1e-6;

/// 解析表格中的偏移 / 地址数值，返回 0.1 字单位。
/// 负数、非数字、超出 u64 范围、比 0.1 更细的小数（如 `0.15`）返回 None。
pub fn parse_tenths(raw: &str) -> Option<u64> {
    let value: f64 = raw.trim().parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }

    let scaled = value * TENTHS_PER_WORD as f64;
    let tenths = scaled.round();
    if (scaled - tenths).abs() > TENTHS_TOLERANCE * tenths.max(1.0) {
        return None;
    }
    if tenths >= u64::MAX as f64 {
        return None;
    }
    Some(tenths as u64)
}

/// 解析整字地址 / 计数（允许 `100.0` 这类 Excel 数值写法，拒绝真正的小数）
pub fn parse_whole(raw: &str) -> Option<u64> {
    let tenths = parse_tenths(raw)?;
    if tenths % TENTHS_PER_WORD != 0 {
        return None;
    }
    Some(tenths / TENTHS_PER_WORD)
}

//! 分区读取 / 地址分配的结构化错误。

use thiserror::Error;

use super::table::TableKind;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReadError {
    #[error("sheet '{sheet}' is missing column '{column}'")]
    MissingColumn { sheet: String, column: String },

    #[error("sheet '{sheet}' row {row}: invalid type '{raw}' for '{name}'")]
    InvalidType {
        sheet: String,
        row: usize,
        name: String,
        raw: String,
    },

    #[error("sheet '{sheet}' row {row} column '{column}': invalid number '{raw}'")]
    InvalidNumber {
        sheet: String,
        row: usize,
        column: String,
        raw: String,
    },

    #[error("sheet '{sheet}' row {row}: invalid address offset '{raw}' for '{name}'")]
    InvalidOffset {
        sheet: String,
        row: usize,
        name: String,
        raw: String,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AllocError {
    #[error("constant '{name}' is not defined in the constants section")]
    MissingConstant { name: String },

    #[error("constant '{name}' must be a non-negative integer, got '{raw}'")]
    InvalidConstant { name: String, raw: String },

    #[error("duplicate variable name '{name}' in {table}")]
    DuplicateName { table: TableKind, name: String },

    #[error("sensor data field '{name}' has array type {var_type}; sensor fields must be scalar")]
    UnsupportedSensorField { name: String, var_type: String },

    #[error("section '{section}': address of '{name}' is out of range")]
    AddressOverflow { section: String, name: String },
}

//! 分区读取：原始表格 → 各分区声明。
//!
//! 约定：
//! - 第一行数据的 `base_addr` 作为分区基地址；列缺失、空白或 `-` 时为 0
//! - 名称为空的行（常见于表尾空行）直接跳过
//! - 类型在这里一次性解析，无法识别即 InvalidType（致命）
//! - 错误中的行号为 Excel 行号（表头为第 1 行）

use log::debug;

use crate::domain::{
    HmiInternalDecl, HmiInternalSection, HmiInternalType, IoMappingDecl, ReadError, SectionDecls,
    SensorList, VarType, VariableDeclaration,
};
use crate::ports::RawSheet;
use crate::rules::{parse_tenths, parse_whole};

pub const COL_BASE_ADDR: &str = "base_addr";
pub const COL_VARIABLE_NAME: &str = "variable_name";
pub const COL_ADDR_OFFSET: &str = "addr_offset";
pub const COL_TYPE: &str = "type";
pub const COL_INIT_VALUE: &str = "init_value";
pub const COL_HMI_TAG: &str = "hmi_tag";
pub const COL_SHELF_SENSOR: &str = "shelf_sensor";
pub const COL_GENERAL_SENSOR: &str = "general_sensor";
pub const COL_ADDR: &str = "addr";
pub const COL_VAR_NAME: &str = "var_name";
pub const COL_VAR_TYPE: &str = "var_type";

/// 未设置基地址的占位符
pub const UNSET_MARKER: &str = "-";

fn excel_row(index: usize) -> usize {
    index + 2
}

fn read_base_addr(sheet: &RawSheet) -> Result<u64, ReadError> {
    let Some(col) = sheet.column_index(COL_BASE_ADDR) else {
        debug!("sheet '{}': no base_addr column, base defaults to 0", sheet.name);
        return Ok(0);
    };

    let raw = sheet.cell(0, col);
    if raw.is_empty() || raw == UNSET_MARKER {
        debug!("sheet '{}': base_addr unset, base defaults to 0", sheet.name);
        return Ok(0);
    }

    parse_whole(raw).ok_or_else(|| ReadError::InvalidNumber {
        sheet: sheet.name.clone(),
        row: excel_row(0),
        column: COL_BASE_ADDR.to_string(),
        raw: raw.to_string(),
    })
}

fn read_offset(sheet: &RawSheet, row: usize, col: usize, name: &str) -> Result<u64, ReadError> {
    let raw = sheet.cell(row, col);
    parse_tenths(raw).ok_or_else(|| ReadError::InvalidOffset {
        sheet: sheet.name.clone(),
        row: excel_row(row),
        name: name.to_string(),
        raw: raw.to_string(),
    })
}

fn read_var_type(sheet: &RawSheet, row: usize, col: usize, name: &str) -> Result<VarType, ReadError> {
    let raw = sheet.cell(row, col);
    VarType::parse(raw).ok_or_else(|| ReadError::InvalidType {
        sheet: sheet.name.clone(),
        row: excel_row(row),
        name: name.to_string(),
        raw: raw.to_string(),
    })
}

/// Constants / Shelf / Sensor Data / Pump
pub fn read_var_section(sheet: &RawSheet) -> Result<SectionDecls, ReadError> {
    let base_addr = read_base_addr(sheet)?;
    let idx_name = sheet.require_column(COL_VARIABLE_NAME)?;
    let idx_offset = sheet.require_column(COL_ADDR_OFFSET)?;
    let idx_type = sheet.require_column(COL_TYPE)?;
    let idx_init = sheet.require_column(COL_INIT_VALUE)?;
    let idx_hmi = sheet.require_column(COL_HMI_TAG)?;

    let mut decls = Vec::new();
    for row in 0..sheet.rows.len() {
        let name = sheet.cell(row, idx_name);
        if name.is_empty() {
            continue;
        }

        decls.push(VariableDeclaration {
            name: name.to_string(),
            addr_offset: read_offset(sheet, row, idx_offset, name)?,
            var_type: read_var_type(sheet, row, idx_type, name)?,
            init_value: sheet.cell(row, idx_init).to_string(),
            hmi_visible: !sheet.cell(row, idx_hmi).is_empty(),
        });
    }

    debug!(
        "sheet '{}': base={} declarations={}",
        sheet.name,
        base_addr,
        decls.len()
    );

    Ok(SectionDecls {
        sheet: sheet.name.clone(),
        base_addr,
        decls,
    })
}

pub fn read_sensor_list(sheet: &RawSheet) -> Result<SensorList, ReadError> {
    let base_addr = read_base_addr(sheet)?;
    let idx_shelf = sheet.require_column(COL_SHELF_SENSOR)?;
    let idx_general = sheet.require_column(COL_GENERAL_SENSOR)?;

    let collect = |col: usize| -> Vec<String> {
        (0..sheet.rows.len())
            .map(|row| sheet.cell(row, col))
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect()
    };

    Ok(SensorList {
        base_addr,
        shelf_sensors: collect(idx_shelf),
        other_sensors: collect(idx_general),
    })
}

pub fn read_io_mapping(sheet: &RawSheet) -> Result<Vec<IoMappingDecl>, ReadError> {
    let idx_name = sheet.require_column(COL_VARIABLE_NAME)?;
    let idx_addr = sheet.require_column(COL_ADDR)?;
    let idx_type = sheet.require_column(COL_TYPE)?;
    let idx_init = sheet.require_column(COL_INIT_VALUE)?;
    let idx_hmi = sheet.require_column(COL_HMI_TAG)?;

    let mut out = Vec::new();
    for row in 0..sheet.rows.len() {
        let name = sheet.cell(row, idx_name);
        if name.is_empty() {
            continue;
        }
        out.push(IoMappingDecl {
            name: name.to_string(),
            addr: sheet.cell(row, idx_addr).to_string(),
            var_type: read_var_type(sheet, row, idx_type, name)?,
            init_value: sheet.cell(row, idx_init).to_string(),
            hmi_visible: !sheet.cell(row, idx_hmi).is_empty(),
        });
    }
    Ok(out)
}

pub fn read_hmi_internal(sheet: &RawSheet) -> Result<HmiInternalSection, ReadError> {
    let base_addr = read_base_addr(sheet)?;
    let idx_name = sheet.require_column(COL_VAR_NAME)?;
    let idx_offset = sheet.require_column(COL_ADDR_OFFSET)?;
    let idx_type = sheet.require_column(COL_VAR_TYPE)?;

    let mut decls = Vec::new();
    for row in 0..sheet.rows.len() {
        let name = sheet.cell(row, idx_name);
        if name.is_empty() {
            continue;
        }
        let raw_type = sheet.cell(row, idx_type);
        let var_type = HmiInternalType::parse(raw_type).ok_or_else(|| ReadError::InvalidType {
            sheet: sheet.name.clone(),
            row: excel_row(row),
            name: name.to_string(),
            raw: raw_type.to_string(),
        })?;
        decls.push(HmiInternalDecl {
            name: name.to_string(),
            addr_offset: read_offset(sheet, row, idx_offset, name)?,
            var_type,
        });
    }

    Ok(HmiInternalSection { base_addr, decls })
}

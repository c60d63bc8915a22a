//! 各配置分区读取后的声明（只读）。

use serde::{Deserialize, Serialize};

use super::types::{HmiInternalType, VarType};

/// 普通分区（Constants / Shelf / Sensor Data / Pump）中的一行
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct VariableDeclaration {
    pub name: String,
    /// 地址偏移，单位为 0.1 字（`1` 字 = 10，`0.1` = 1）
    pub addr_offset: u64,
    pub var_type: VarType,
    /// 原样保留的初始值文本；空单元格为 ""
    #[serde(default)]
    pub init_value: String,
    pub hmi_visible: bool,
}

/// 普通分区：基地址 + 按表格顺序排列的声明
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SectionDecls {
    pub sheet: String,
    /// 字地址；未填写或为 `-` 时为 0
    pub base_addr: u64,
    pub decls: Vec<VariableDeclaration>,
}

impl SectionDecls {
    pub fn find(&self, name: &str) -> Option<&VariableDeclaration> {
        self.decls.iter().find(|d| d.name == name)
    }
}

/// Sensor List：货架传感器与公共传感器两组编号
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SensorList {
    pub base_addr: u64,
    pub shelf_sensors: Vec<String>,
    pub other_sensors: Vec<String>,
}

/// IO Mapping：地址为表格中直接给出的字面值，不做游标运算
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct IoMappingDecl {
    pub name: String,
    pub addr: String,
    pub var_type: VarType,
    #[serde(default)]
    pub init_value: String,
    pub hmi_visible: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HmiInternalDecl {
    pub name: String,
    pub addr_offset: u64,
    pub var_type: HmiInternalType,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct HmiInternalSection {
    pub base_addr: u64,
    pub decls: Vec<HmiInternalDecl>,
}

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

pub use crate::domain::DuplicatePolicy;

/// 工作簿中各分区对应的 sheet 名
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct SheetNames {
    pub constants: String,
    pub shelf: String,
    pub sensor_list: String,
    pub sensor_data: String,
    pub pump: String,
    pub io_mapping: String,
    pub hmi_internal: String,
}

impl Default for SheetNames {
    fn default() -> Self {
        Self {
            constants: "Constants".to_string(),
            shelf: "Shelf".to_string(),
            sensor_list: "Sensor List".to_string(),
            sensor_data: "Sensor Data".to_string(),
            pump: "Pump".to_string(),
            io_mapping: "IO Mapping".to_string(),
            hmi_internal: "HMI Internal".to_string(),
        }
    }
}

/// 生成器配置
/// 说明：集中管理“规则参数”，JSON 文件中未出现的字段取默认值。
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratorConfig {
    pub sheets: SheetNames,
    /// PLC 存储区前缀（Delta 数据寄存器为 D）
    pub memory_area: String,
    /// HMI 标签地址前缀（PLC 通讯链接标识）
    pub hmi_link_prefix: String,
    /// HMI 内部变量地址前缀
    pub hmi_internal_prefix: String,
    /// Constants 中表示货架数量 / 每个货架寄存器跨度的常量名
    pub shelf_count_constant: String,
    pub shelf_stride_constant: String,
    /// 传感器区第一个字段相对基地址的偏移
    pub sensor_offset_start: u64,
    /// true 时 PLC 表也按元素展开数组；默认保留一行 `ARRAY [n] OF T`
    pub expand_arrays_in_global_table: bool,
    pub duplicate_policy: DuplicatePolicy,
    pub global_table_file: String,
    pub hmi_table_file: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            sheets: SheetNames::default(),
            memory_area: "D".to_string(),
            hmi_link_prefix: "{EtherLink1}1@".to_string(),
            hmi_internal_prefix: "$".to_string(),
            shelf_count_constant: "shelf_no".to_string(),
            shelf_stride_constant: "shelf_reg_size".to_string(),
            sensor_offset_start: 1,
            expand_arrays_in_global_table: false,
            duplicate_policy: DuplicatePolicy::Reject,
            global_table_file: "global_variable_table.csv".to_string(),
            hmi_table_file: "hmi_tag.csv".to_string(),
        }
    }
}

impl GeneratorConfig {
    /// 文件不存在时返回默认配置
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read generator config from: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse generator config JSON from: {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: GeneratorConfig =
            serde_json::from_str(r#"{"memoryArea":"M","duplicatePolicy":"overwrite","sheets":{"pump":"Pumps"}}"#)
                .unwrap();
        assert_eq!(config.memory_area, "M");
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Overwrite);
        assert_eq!(config.sheets.pump, "Pumps");
        assert_eq!(config.sheets.shelf, "Shelf");
        assert_eq!(config.hmi_link_prefix, "{EtherLink1}1@");
        assert_eq!(config.sensor_offset_start, 1);
    }

    #[test]
    fn missing_file_gives_default() {
        let path = std::env::temp_dir().join("globvar_core_missing_config_does_not_exist.json");
        assert_eq!(GeneratorConfig::load_from_file(&path).unwrap(), GeneratorConfig::default());
    }
}

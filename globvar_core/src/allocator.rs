//! 地址分配：按固定分区顺序遍历声明，生成 PLC 全局变量表与 HMI 标签表。
//!
//! 约束：
//! - 游标是分配函数的局部变量；每个分区、每一遍（PLC 表 / HMI 表）都从分区基地址重新开始
//! - 两遍共用同一个 `layout_declarations`，同名变量在两张表中的地址必然一致
//! - HMI 遍只输出 hmi_tag 非空的声明，但隐藏声明仍然推进游标
//! - 插入顺序：Constants → Pump → Shelf（先货架号、后声明）→ 传感器 → IO → HMI 内部变量

use log::{debug, info};

use crate::config::GeneratorConfig;
use crate::domain::{
    AddressCursor, AllocError, GlobalVarRecord, GlobalVarTable, HmiInternalSection, HmiTagRecord,
    HmiTagTable, IoMappingDecl, PlcAddress, SectionDecls, SensorList, VarType,
    VariableDeclaration,
};
use crate::rules::{address_increment, declaration_increment, hmi_type_tag, parse_whole};

/// 读取完成的全部分区
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorkbookSections {
    pub constants: SectionDecls,
    pub shelf: SectionDecls,
    pub sensor_list: SensorList,
    pub sensor_data: SectionDecls,
    pub pump: SectionDecls,
    pub io_mapping: Vec<IoMappingDecl>,
    pub hmi_internal: HmiInternalSection,
}

/// 一次生成的结果
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedTables {
    pub global: GlobalVarTable,
    pub hmi: HmiTagTable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShelfLayout {
    pub count: u64,
    /// 每个货架占用的寄存器（字）数
    pub stride: u64,
}

/// 一条声明在游标上的落位
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacedVar<'a> {
    pub decl: &'a VariableDeclaration,
    pub name: String,
    pub address: PlcAddress,
    /// 数组元素（标量为空）
    pub elements: Vec<PlacedElement>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacedElement {
    pub name: String,
    pub address: PlcAddress,
}

fn overflow(section: &str, name: &str) -> AllocError {
    AllocError::AddressOverflow {
        section: section.to_string(),
        name: name.to_string(),
    }
}

fn section_start(section: &str, base_addr: u64) -> Result<AddressCursor, AllocError> {
    AddressCursor::from_word(base_addr).ok_or_else(|| overflow(section, "base_addr"))
}

/// 从 `start` 开始顺序摆放声明；`prefix` 用于货架实例的 `s{i}_` 前缀。
/// 地址超出 u64 范围时返回 `AddressOverflow`。
pub fn layout_declarations<'a>(
    section: &str,
    decls: &'a [VariableDeclaration],
    start: AddressCursor,
    prefix: &str,
) -> Result<Vec<PlacedVar<'a>>, AllocError> {
    let mut cursor = start;
    let mut placed = Vec::with_capacity(decls.len());

    for decl in decls {
        let name = format!("{prefix}{}", decl.name);
        let address = cursor.address(decl.var_type.base());

        let mut elements = Vec::new();
        if let VarType::Array { len, elem } = decl.var_type {
            let step = address_increment(elem, true, decl.addr_offset);
            let mut elem_cursor = cursor;
            for j in 0..len {
                let elem_name = format!("{name}{j}");
                if j > 0 {
                    elem_cursor = elem_cursor
                        .checked_advance(step)
                        .ok_or_else(|| overflow(section, &elem_name))?;
                }
                elements.push(PlacedElement {
                    name: elem_name,
                    address: elem_cursor.address(elem),
                });
            }
        }

        cursor = cursor
            .checked_advance(declaration_increment(decl.var_type, decl.addr_offset))
            .ok_or_else(|| overflow(section, &name))?;
        placed.push(PlacedVar {
            decl,
            name,
            address,
            elements,
        });
    }

    Ok(placed)
}

fn emit_global(
    placed: &[PlacedVar<'_>],
    config: &GeneratorConfig,
    table: &mut GlobalVarTable,
) -> Result<(), AllocError> {
    for var in placed {
        if config.expand_arrays_in_global_table && !var.elements.is_empty() {
            let elem_type = var.decl.var_type.base();
            for element in &var.elements {
                table.insert(GlobalVarRecord {
                    name: element.name.clone(),
                    address: element.address.render(&config.memory_area),
                    var_type: elem_type.as_str().to_string(),
                    init_value: var.decl.init_value.clone(),
                })?;
            }
            continue;
        }

        table.insert(GlobalVarRecord {
            name: var.name.clone(),
            address: var.address.render(&config.memory_area),
            var_type: var.decl.var_type.to_string(),
            init_value: var.decl.init_value.clone(),
        })?;
    }
    Ok(())
}

fn emit_hmi(
    placed: &[PlacedVar<'_>],
    config: &GeneratorConfig,
    table: &mut HmiTagTable,
) -> Result<(), AllocError> {
    for var in placed.iter().filter(|v| v.decl.hmi_visible) {
        let tag_type = hmi_type_tag(var.decl.var_type.base());
        if var.elements.is_empty() {
            table.insert(HmiTagRecord {
                name: var.name.clone(),
                tag_type: tag_type.to_string(),
                address: hmi_link_address(config, &var.address),
            })?;
            continue;
        }

        for element in &var.elements {
            table.insert(HmiTagRecord {
                name: element.name.clone(),
                tag_type: tag_type.to_string(),
                address: hmi_link_address(config, &element.address),
            })?;
        }
    }
    Ok(())
}

fn hmi_link_address(config: &GeneratorConfig, address: &PlcAddress) -> String {
    format!(
        "{}{}",
        config.hmi_link_prefix,
        address.render(&config.memory_area)
    )
}

/// 单一基地址的分区（Constants / Pump）：PLC 遍 + HMI 遍
pub fn allocate_section(
    section: &SectionDecls,
    config: &GeneratorConfig,
    global: &mut GlobalVarTable,
    hmi: &mut HmiTagTable,
) -> Result<(), AllocError> {
    let start = section_start(&section.sheet, section.base_addr)?;

    let placed = layout_declarations(&section.sheet, &section.decls, start, "")?;
    emit_global(&placed, config, global)?;

    let placed = layout_declarations(&section.sheet, &section.decls, start, "")?;
    emit_hmi(&placed, config, hmi)?;

    debug!(
        "section '{}': {} declarations from base {}",
        section.sheet,
        section.decls.len(),
        section.base_addr
    );
    Ok(())
}

fn constant_whole(constants: &SectionDecls, name: &str) -> Result<u64, AllocError> {
    let decl = constants
        .find(name)
        .ok_or_else(|| AllocError::MissingConstant {
            name: name.to_string(),
        })?;
    parse_whole(&decl.init_value).ok_or_else(|| AllocError::InvalidConstant {
        name: name.to_string(),
        raw: decl.init_value.clone(),
    })
}

/// 从 Constants 中取货架数量与寄存器跨度
pub fn resolve_shelf_layout(
    constants: &SectionDecls,
    config: &GeneratorConfig,
) -> Result<ShelfLayout, AllocError> {
    Ok(ShelfLayout {
        count: constant_whole(constants, &config.shelf_count_constant)?,
        stride: constant_whole(constants, &config.shelf_stride_constant)?,
    })
}

/// 货架分区：每个货架实例从 `base + i * stride` 开始，变量名加 `s{i}_` 前缀
pub fn allocate_shelves(
    shelf: &SectionDecls,
    layout: ShelfLayout,
    config: &GeneratorConfig,
    global: &mut GlobalVarTable,
    hmi: &mut HmiTagTable,
) -> Result<(), AllocError> {
    let unit_start = |unit: u64| -> Result<AddressCursor, AllocError> {
        unit.checked_mul(layout.stride)
            .and_then(|span| span.checked_add(shelf.base_addr))
            .and_then(AddressCursor::from_word)
            .ok_or_else(|| overflow(&shelf.sheet, &format!("s{unit}_")))
    };

    for unit in 0..layout.count {
        let prefix = format!("s{unit}_");
        let placed = layout_declarations(&shelf.sheet, &shelf.decls, unit_start(unit)?, &prefix)?;
        emit_global(&placed, config, global)?;
    }

    for unit in 0..layout.count {
        let prefix = format!("s{unit}_");
        let placed = layout_declarations(&shelf.sheet, &shelf.decls, unit_start(unit)?, &prefix)?;
        emit_hmi(&placed, config, hmi)?;
    }

    debug!(
        "shelf: {} units x {} declarations, base {} stride {}",
        layout.count,
        shelf.decls.len(),
        shelf.base_addr,
        layout.stride
    );
    Ok(())
}

/// 传感器分区：所有字段共用一个递增偏移，每个字段占 1 字
pub fn allocate_sensors(
    sensors: &SensorList,
    sensor_data: &SectionDecls,
    shelf_count: u64,
    config: &GeneratorConfig,
    global: &mut GlobalVarTable,
    hmi: &mut HmiTagTable,
) -> Result<(), AllocError> {
    if let Some(field) = sensor_data.decls.iter().find(|d| d.var_type.is_array()) {
        return Err(AllocError::UnsupportedSensorField {
            name: field.name.clone(),
            var_type: field.var_type.to_string(),
        });
    }

    let mut instances: Vec<String> = Vec::new();
    for unit in 0..shelf_count {
        for sensor in &sensors.shelf_sensors {
            instances.push(format!("snsr_s{unit}_{sensor}"));
        }
    }
    for sensor in &sensors.other_sensors {
        instances.push(format!("snsr_{sensor}"));
    }

    let mut offset = config.sensor_offset_start;
    for instance in &instances {
        for field in &sensor_data.decls {
            let name = format!("{instance}_{}", field.name);
            let address = sensors
                .base_addr
                .checked_add(offset)
                .and_then(PlcAddress::word)
                .ok_or_else(|| overflow(&config.sheets.sensor_list, &name))?;

            global.insert(GlobalVarRecord {
                name: name.clone(),
                address: address.render(&config.memory_area),
                var_type: field.var_type.to_string(),
                init_value: field.init_value.clone(),
            })?;
            hmi.insert(HmiTagRecord {
                name,
                tag_type: hmi_type_tag(field.var_type.base()).to_string(),
                address: hmi_link_address(config, &address),
            })?;

            offset = offset
                .checked_add(1)
                .ok_or_else(|| overflow(&config.sheets.sensor_list, instance))?;
        }
    }

    debug!(
        "sensors: {} instances x {} fields from base {}",
        instances.len(),
        sensor_data.decls.len(),
        sensors.base_addr
    );
    Ok(())
}

/// IO 映射：地址原样写入，不做游标运算
pub fn allocate_io(
    io: &[IoMappingDecl],
    config: &GeneratorConfig,
    global: &mut GlobalVarTable,
    hmi: &mut HmiTagTable,
) -> Result<(), AllocError> {
    for item in io {
        global.insert(GlobalVarRecord {
            name: item.name.clone(),
            address: item.addr.clone(),
            var_type: item.var_type.to_string(),
            init_value: item.init_value.clone(),
        })?;

        if item.hmi_visible {
            hmi.insert(HmiTagRecord {
                name: item.name.clone(),
                tag_type: hmi_type_tag(item.var_type.base()).to_string(),
                address: format!("{}{}", config.hmi_link_prefix, item.addr),
            })?;
        }
    }
    Ok(())
}

/// HMI 内部变量：只进 HMI 表，地址前缀为 `$`
pub fn allocate_hmi_internal(
    section: &HmiInternalSection,
    config: &GeneratorConfig,
    hmi: &mut HmiTagTable,
) -> Result<(), AllocError> {
    let mut cursor = section_start(&config.sheets.hmi_internal, section.base_addr)?;
    for decl in &section.decls {
        let scalar = decl.var_type.as_scalar();
        hmi.insert(HmiTagRecord {
            name: decl.name.clone(),
            tag_type: hmi_type_tag(scalar).to_string(),
            address: format!(
                "{}{}",
                config.hmi_internal_prefix,
                cursor.address(scalar).offset_text()
            ),
        })?;
        cursor = cursor
            .checked_advance(address_increment(scalar, false, decl.addr_offset))
            .ok_or_else(|| overflow(&config.sheets.hmi_internal, &decl.name))?;
    }
    Ok(())
}

/// 完整生成：两张表从空表开始构建
pub fn build_tables(
    sections: &WorkbookSections,
    config: &GeneratorConfig,
) -> Result<GeneratedTables, AllocError> {
    let layout = resolve_shelf_layout(&sections.constants, config)?;

    let mut global = GlobalVarTable::new(config.duplicate_policy);
    let mut hmi = HmiTagTable::new(config.duplicate_policy);

    allocate_section(&sections.constants, config, &mut global, &mut hmi)?;
    allocate_section(&sections.pump, config, &mut global, &mut hmi)?;
    allocate_shelves(&sections.shelf, layout, config, &mut global, &mut hmi)?;
    allocate_sensors(
        &sections.sensor_list,
        &sections.sensor_data,
        layout.count,
        config,
        &mut global,
        &mut hmi,
    )?;
    allocate_io(&sections.io_mapping, config, &mut global, &mut hmi)?;
    allocate_hmi_internal(&sections.hmi_internal, config, &mut hmi)?;

    info!(
        "generated {} global variables and {} HMI tags ({} shelves)",
        global.len(),
        hmi.len(),
        layout.count
    );

    Ok(GeneratedTables { global, hmi })
}

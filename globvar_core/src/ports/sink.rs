use anyhow::Result;

use crate::domain::{GlobalVarTable, HmiTagTable};

/// 输出端口：把两张表交给外部（CSV 文件、内存等）
/// 说明：核心只负责建表，落盘格式由适配器决定。
///
/// 调用顺序：`write_global` → `write_hmi` → `commit`；任一写入失败时调用 `discard`，
/// 已有的输出保持不变。
pub trait TableSink {
    /// 写出 PLC 全局变量表
    fn write_global(&mut self, table: &GlobalVarTable) -> Result<()>;
    /// 写出 HMI 标签表
    fn write_hmi(&mut self, table: &HmiTagTable) -> Result<()>;
    /// 两张表都写入成功后生效
    fn commit(&mut self) -> Result<()> {
        Ok(())
    }
    /// 放弃尚未生效的写入
    fn discard(&mut self) {}
}

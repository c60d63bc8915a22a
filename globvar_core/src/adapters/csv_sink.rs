//! CSV 输出（ISPSoft 全局变量表 / HMI 标签表）。
//!
//! 列名与顺序固定：
//! - 全局变量表：Class, Identifiers, Address, Type, Initial Value, Comment
//! - HMI 标签表：Define Name, Type, Address, Description
//!
//! 两张表先分别完整写入同目录下的 `.tmp` 文件，都成功后再 rename 覆盖目标文件。

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use log::{debug, info};
use thiserror::Error;

use crate::config::GeneratorConfig;
use crate::domain::{GlobalVarTable, HmiTagTable};
use crate::ports::TableSink;

pub const HEADERS_GLOBAL: [&str; 6] = [
    "Class",
    "Identifiers",
    "Address",
    "Type",
    "Initial Value",
    "Comment",
];

pub const HEADERS_HMI: [&str; 4] = ["Define Name", "Type", "Address", "Description"];

pub const GLOBAL_CLASS_VAR: &str = "VAR";

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

fn csv_writer<W: Write>(inner: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(inner)
}

pub fn write_global_csv<W: Write>(inner: W, table: &GlobalVarTable) -> Result<(), EmitError> {
    let mut writer = csv_writer(inner);
    writer.write_record(HEADERS_GLOBAL)?;
    for rec in table.records() {
        writer.write_record([
            GLOBAL_CLASS_VAR,
            rec.name.as_str(),
            rec.address.as_str(),
            rec.var_type.as_str(),
            rec.init_value.as_str(),
            "",
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_hmi_csv<W: Write>(inner: W, table: &HmiTagTable) -> Result<(), EmitError> {
    let mut writer = csv_writer(inner);
    writer.write_record(HEADERS_HMI)?;
    for rec in table.records() {
        writer.write_record([
            rec.name.as_str(),
            rec.tag_type.as_str(),
            rec.address.as_str(),
            "",
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    tmp_name.push(".tmp");
    path.with_file_name(tmp_name)
}

/// 待生效的写入：(临时文件, 目标文件)
#[derive(Debug, Clone)]
struct Staged {
    tmp: PathBuf,
    target: PathBuf,
}

/// 把两张表写到输出目录
#[derive(Debug, Clone)]
pub struct CsvTableSink {
    global_path: PathBuf,
    hmi_path: PathBuf,
    staged: Vec<Staged>,
}

impl CsvTableSink {
    pub fn new(global_path: PathBuf, hmi_path: PathBuf) -> Self {
        Self {
            global_path,
            hmi_path,
            staged: Vec::new(),
        }
    }

    /// 按配置中的文件名在 `out_dir` 下输出
    pub fn in_dir(out_dir: &Path, config: &GeneratorConfig) -> Self {
        Self::new(
            out_dir.join(&config.global_table_file),
            out_dir.join(&config.hmi_table_file),
        )
    }

    /// 同一目录下加前缀输出（old_ / new_），用于两次生成结果对比
    pub fn in_dir_with_prefix(out_dir: &Path, config: &GeneratorConfig, prefix: &str) -> Self {
        Self::new(
            out_dir.join(format!("{prefix}{}", config.global_table_file)),
            out_dir.join(format!("{prefix}{}", config.hmi_table_file)),
        )
    }

    pub fn global_path(&self) -> &Path {
        &self.global_path
    }

    pub fn hmi_path(&self) -> &Path {
        &self.hmi_path
    }

    fn stage(&mut self, target: PathBuf, bytes: &[u8]) -> Result<(), EmitError> {
        let tmp = tmp_path_for(&target);
        fs::write(&tmp, bytes)?;
        self.staged.push(Staged { tmp, target });
        Ok(())
    }
}

impl TableSink for CsvTableSink {
    fn write_global(&mut self, table: &GlobalVarTable) -> Result<()> {
        let mut buf = Vec::new();
        write_global_csv(&mut buf, table)?;
        self.stage(self.global_path.clone(), &buf)?;
        debug!("staged {} ({} rows)", self.global_path.display(), table.len());
        Ok(())
    }

    fn write_hmi(&mut self, table: &HmiTagTable) -> Result<()> {
        let mut buf = Vec::new();
        write_hmi_csv(&mut buf, table)?;
        self.stage(self.hmi_path.clone(), &buf)?;
        debug!("staged {} ({} rows)", self.hmi_path.display(), table.len());
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        for staged in std::mem::take(&mut self.staged) {
            fs::rename(&staged.tmp, &staged.target).map_err(EmitError::from)?;
            info!("completed: {}", staged.target.display());
        }
        Ok(())
    }

    fn discard(&mut self) {
        for staged in std::mem::take(&mut self.staged) {
            if let Err(e) = fs::remove_file(&staged.tmp) {
                debug!("failed to remove {}: {e}", staged.tmp.display());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DuplicatePolicy, GlobalVarRecord, HmiTagRecord};

    #[test]
    fn global_csv_has_fixed_header_and_empty_comment() {
        let mut table = GlobalVarTable::new(DuplicatePolicy::Reject);
        table
            .insert(GlobalVarRecord {
                name: "s0_temp".to_string(),
                address: "D100".to_string(),
                var_type: "WORD".to_string(),
                init_value: "0".to_string(),
            })
            .unwrap();

        let mut buf = Vec::new();
        write_global_csv(&mut buf, &table).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "Class,Identifiers,Address,Type,Initial Value,Comment\r\nVAR,s0_temp,D100,WORD,0,\r\n"
        );
    }

    #[test]
    fn nothing_replaced_before_commit() {
        let dir = std::env::temp_dir().join(format!("globvar_sink_{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        let config = GeneratorConfig::default();
        let mut sink = CsvTableSink::in_dir(&dir, &config);
        fs::write(sink.global_path(), "previous").unwrap();

        sink.write_global(&GlobalVarTable::new(DuplicatePolicy::Reject)).unwrap();
        sink.write_hmi(&HmiTagTable::new(DuplicatePolicy::Reject)).unwrap();
        assert_eq!(fs::read_to_string(sink.global_path()).unwrap(), "previous");
        assert!(!sink.hmi_path().exists());

        sink.commit().unwrap();
        assert_eq!(
            fs::read_to_string(sink.global_path()).unwrap(),
            "Class,Identifiers,Address,Type,Initial Value,Comment\r\n"
        );
        assert!(sink.hmi_path().exists());
        assert!(!tmp_path_for(sink.global_path()).exists());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn hmi_csv_keeps_link_prefix_unquoted() {
        let mut table = HmiTagTable::new(DuplicatePolicy::Reject);
        table
            .insert(HmiTagRecord {
                name: "s0_temp".to_string(),
                tag_type: "WORD".to_string(),
                address: "{EtherLink1}1@D100".to_string(),
            })
            .unwrap();

        let mut buf = Vec::new();
        write_hmi_csv(&mut buf, &table).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "Define Name,Type,Address,Description\r\ns0_temp,WORD,{EtherLink1}1@D100,\r\n"
        );
    }
}

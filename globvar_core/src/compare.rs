//! 生成结果一致性检查：对比两次生成得到的表（old / new）。
//!
//! - 纯函数：输入是已经生成好的表（文件或内存），不负责运行生成器
//! - 全外连接：按整行或只按名称列比较，输出只出现在一侧的行，并带合并标记
//!   `left_only`（只在 old）/ `right_only`（只在 new）
//! - 逐字比较，不做数值格式归一化
//! - 不一致是正常结果，不是错误；只有输入无法读取/列缺失才返回 Err

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::adapters::csv_sink::{GLOBAL_CLASS_VAR, HEADERS_GLOBAL, HEADERS_HMI};
use crate::domain::{GlobalVarTable, HmiTagTable};

/// PLC 表名称列
pub const PLC_NAME_COLUMN: &str = "Identifiers";
/// HMI 表名称列
pub const HMI_NAME_COLUMN: &str = "Define Name";
pub const MERGE_INDICATOR_COLUMN: &str = "_merge";

#[derive(Debug, Error)]
pub enum CompareError {
    #[error("failed to read table {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("table is missing column '{column}'")]
    MissingColumn { column: String },

    #[error("tables have different columns: old={old:?} new={new:?}")]
    HeaderMismatch { old: Vec<String>, new: Vec<String> },
}

/// 通用的表格数据（表头 + 字符串行）
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    /// 读取 CSV；数据行比表头短时用空串补齐（有的表不写 Comment 列）
    pub fn load(path: &Path) -> Result<Self, CompareError> {
        let read_err = |e: csv::Error| CompareError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        };

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(read_err)?;

        let headers: Vec<String> = reader
            .headers()
            .map_err(read_err)?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(read_err)?;
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            if row.len() < headers.len() {
                row.resize(headers.len(), String::new());
            }
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    pub fn from_global(table: &GlobalVarTable) -> Self {
        Self {
            headers: HEADERS_GLOBAL.iter().map(|h| h.to_string()).collect(),
            rows: table
                .records()
                .map(|r| {
                    vec![
                        GLOBAL_CLASS_VAR.to_string(),
                        r.name.clone(),
                        r.address.clone(),
                        r.var_type.clone(),
                        r.init_value.clone(),
                        String::new(),
                    ]
                })
                .collect(),
        }
    }

    pub fn from_hmi(table: &HmiTagTable) -> Self {
        Self {
            headers: HEADERS_HMI.iter().map(|h| h.to_string()).collect(),
            rows: table
                .records()
                .map(|r| {
                    vec![
                        r.name.clone(),
                        r.tag_type.clone(),
                        r.address.clone(),
                        String::new(),
                    ]
                })
                .collect(),
        }
    }

    fn column_index(&self, column: &str) -> Result<usize, CompareError> {
        self.headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| CompareError::MissingColumn {
                column: column.to_string(),
            })
    }

    /// 只保留一列
    pub fn project(&self, column: &str) -> Result<CsvTable, CompareError> {
        let idx = self.column_index(column)?;
        Ok(CsvTable {
            headers: vec![column.to_string()],
            rows: self
                .rows
                .iter()
                .map(|r| vec![r.get(idx).cloned().unwrap_or_default()])
                .collect(),
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum MergeSide {
    LeftOnly,
    RightOnly,
}

impl fmt::Display for MergeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeSide::LeftOnly => f.write_str("left_only"),
            MergeSide::RightOnly => f.write_str("right_only"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiffRow {
    pub values: Vec<String>,
    pub side: MergeSide,
}

/// 两张表的差集（按合并键字典序排列）
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableDiff {
    pub columns: Vec<String>,
    pub rows: Vec<DiffRow>,
}

impl TableDiff {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

impl fmt::Display for TableDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut header: Vec<String> = self.columns.clone();
        header.push(MERGE_INDICATOR_COLUMN.to_string());

        let lines: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|r| {
                let mut line = r.values.clone();
                line.push(r.side.to_string());
                line
            })
            .collect();

        let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
        for line in &lines {
            for (i, cell) in line.iter().enumerate() {
                if let Some(w) = widths.get_mut(i) {
                    *w = (*w).max(cell.chars().count());
                }
            }
        }

        let write_line = |f: &mut fmt::Formatter<'_>, cells: &[String]| -> fmt::Result {
            let padded: Vec<String> = cells
                .iter()
                .zip(&widths)
                .map(|(c, w)| format!("{c:<width$}", width = *w))
                .collect();
            writeln!(f, "{}", padded.join("  ").trim_end())
        };

        write_line(f, &header)?;
        for line in &lines {
            write_line(f, line)?;
        }
        Ok(())
    }
}

/// 全外连接后取只出现在一侧的行（按整行比较，两表列必须一致）
pub fn table_difference(old: &CsvTable, new: &CsvTable) -> Result<TableDiff, CompareError> {
    if old.headers != new.headers {
        return Err(CompareError::HeaderMismatch {
            old: old.headers.clone(),
            new: new.headers.clone(),
        });
    }

    let old_rows: BTreeSet<&Vec<String>> = old.rows.iter().collect();
    let new_rows: BTreeSet<&Vec<String>> = new.rows.iter().collect();

    let mut rows: Vec<DiffRow> = old_rows
        .difference(&new_rows)
        .map(|r| DiffRow {
            values: (*r).clone(),
            side: MergeSide::LeftOnly,
        })
        .chain(new_rows.difference(&old_rows).map(|r| DiffRow {
            values: (*r).clone(),
            side: MergeSide::RightOnly,
        }))
        .collect();
    rows.sort_by(|a, b| a.values.cmp(&b.values).then(a.side.cmp(&b.side)));

    Ok(TableDiff {
        columns: old.headers.clone(),
        rows,
    })
}

/// 比较粒度
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CompareKey {
    /// 整行比较（地址、类型变化都会被发现）
    #[default]
    WholeRow,
    /// 只比较名称列
    NameOnly,
}

/// HMI 分支的比较对象
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum HmiDiffSource {
    #[default]
    HmiTables,
    /// HMI 结果直接沿用 PLC 表的比较结果
    PlcTables,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct CompareOptions {
    pub key: CompareKey,
    pub hmi_source: HmiDiffSource,
}

/// 一次生成的两张表
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TablePair {
    pub plc: CsvTable,
    pub hmi: CsvTable,
}

impl TablePair {
    pub fn load(plc_path: &Path, hmi_path: &Path) -> Result<Self, CompareError> {
        Ok(Self {
            plc: CsvTable::load(plc_path)?,
            hmi: CsvTable::load(hmi_path)?,
        })
    }

    pub fn from_tables(global: &GlobalVarTable, hmi: &HmiTagTable) -> Self {
        Self {
            plc: CsvTable::from_global(global),
            hmi: CsvTable::from_hmi(hmi),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConsistencyReport {
    pub plc: TableDiff,
    pub hmi: TableDiff,
}

impl ConsistencyReport {
    pub fn is_consistent(&self) -> bool {
        self.plc.is_empty() && self.hmi.is_empty()
    }
}

impl fmt::Display for ConsistencyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.plc.is_empty() {
            writeln!(f, "Global Variable Tables are consistent")?;
        } else {
            writeln!(f, "Global Variable Tables are inconsistent")?;
            writeln!(f)?;
            write!(f, "{}", self.plc)?;
        }
        writeln!(f)?;

        if self.hmi.is_empty() {
            writeln!(f, "HMI Tag tables are consistent")?;
        } else {
            writeln!(f, "HMI Tag tables are inconsistent")?;
            writeln!(f)?;
            write!(f, "{}", self.hmi)?;
        }
        Ok(())
    }
}

fn keyed(table: &CsvTable, key: CompareKey, name_column: &str) -> Result<CsvTable, CompareError> {
    match key {
        CompareKey::WholeRow => Ok(table.clone()),
        CompareKey::NameOnly => table.project(name_column),
    }
}

pub fn check_consistency(
    old: &TablePair,
    new: &TablePair,
    options: CompareOptions,
) -> Result<ConsistencyReport, CompareError> {
    let plc = table_difference(
        &keyed(&old.plc, options.key, PLC_NAME_COLUMN)?,
        &keyed(&new.plc, options.key, PLC_NAME_COLUMN)?,
    )?;

    let hmi = match options.hmi_source {
        HmiDiffSource::HmiTables => table_difference(
            &keyed(&old.hmi, options.key, HMI_NAME_COLUMN)?,
            &keyed(&new.hmi, options.key, HMI_NAME_COLUMN)?,
        )?,
        HmiDiffSource::PlcTables => plc.clone(),
    };

    Ok(ConsistencyReport { plc, hmi })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plc(rows: &[[&str; 6]]) -> CsvTable {
        CsvTable {
            headers: HEADERS_GLOBAL.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    fn hmi(rows: &[[&str; 4]]) -> CsvTable {
        CsvTable {
            headers: HEADERS_HMI.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    fn base_pair() -> TablePair {
        TablePair {
            plc: plc(&[
                ["VAR", "s0_temp", "D100", "WORD", "", ""],
                ["VAR", "s1_temp", "D110", "WORD", "", ""],
            ]),
            hmi: hmi(&[
                ["s0_temp", "WORD", "{EtherLink1}1@D100", ""],
                ["s1_temp", "WORD", "{EtherLink1}1@D110", ""],
            ]),
        }
    }

    #[test]
    fn identical_pairs_are_consistent() {
        let report = check_consistency(&base_pair(), &base_pair(), CompareOptions::default()).unwrap();
        assert!(report.is_consistent());
        let text = report.to_string();
        assert!(text.contains("Global Variable Tables are consistent"));
        assert!(text.contains("HMI Tag tables are consistent"));
    }

    #[test]
    fn added_row_is_reported_right_only() {
        let old = base_pair();
        let mut new = base_pair();
        new.plc.rows.push(
            ["VAR", "s2_temp", "D120", "WORD", "", ""]
                .iter()
                .map(|c| c.to_string())
                .collect(),
        );

        let report = check_consistency(&old, &new, CompareOptions::default()).unwrap();
        assert!(!report.is_consistent());
        assert_eq!(report.plc.len(), 1);
        assert_eq!(report.plc.rows[0].side, MergeSide::RightOnly);
        assert_eq!(report.plc.rows[0].values[1], "s2_temp");
        assert!(report.hmi.is_empty());

        let text = report.to_string();
        assert!(text.contains("Global Variable Tables are inconsistent"));
        assert!(text.contains("right_only"));
        assert!(text.contains("HMI Tag tables are consistent"));
    }

    #[test]
    fn address_change_shows_both_sides_for_whole_row_only() {
        let old = base_pair();
        let mut new = base_pair();
        new.hmi.rows[1][2] = "{EtherLink1}1@D111".to_string();

        let report = check_consistency(&old, &new, CompareOptions::default()).unwrap();
        assert_eq!(report.hmi.len(), 2);
        assert_eq!(report.hmi.rows[0].side, MergeSide::LeftOnly);
        assert_eq!(report.hmi.rows[1].side, MergeSide::RightOnly);

        let by_name = CompareOptions {
            key: CompareKey::NameOnly,
            ..CompareOptions::default()
        };
        let report = check_consistency(&old, &new, by_name).unwrap();
        assert!(report.is_consistent());
    }

    #[test]
    fn name_only_diff_has_single_column() {
        let old = base_pair();
        let mut new = base_pair();
        new.hmi.rows.remove(0);

        let options = CompareOptions {
            key: CompareKey::NameOnly,
            ..CompareOptions::default()
        };
        let report = check_consistency(&old, &new, options).unwrap();
        assert_eq!(report.hmi.columns, vec!["Define Name"]);
        assert_eq!(
            report.hmi.rows,
            vec![DiffRow {
                values: vec!["s0_temp".to_string()],
                side: MergeSide::LeftOnly
            }]
        );
    }

    #[test]
    fn hmi_branch_can_reuse_plc_tables() {
        let old = base_pair();
        let mut new = base_pair();
        new.hmi.rows.clear();

        let options = CompareOptions {
            key: CompareKey::NameOnly,
            hmi_source: HmiDiffSource::PlcTables,
        };
        let report = check_consistency(&old, &new, options).unwrap();
        assert!(report.hmi.is_empty());
    }

    #[test]
    fn header_mismatch_is_an_error() {
        let old = base_pair();
        let mut new = base_pair();
        new.plc.headers.pop();
        let err = check_consistency(&old, &new, CompareOptions::default()).unwrap_err();
        assert!(matches!(err, CompareError::HeaderMismatch { .. }));
    }

    #[test]
    fn short_rows_are_padded_to_header_width() {
        let dir = std::env::temp_dir().join(format!("globvar_compare_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("global_variable_table.csv");
        // 数据行只有 5 列，表头 6 列
        std::fs::write(
            &path,
            "Class,Identifiers,Address,Type,Initial Value,Comment\nVAR,s0_temp,D100,WORD,\nVAR,s1_temp,D110,WORD,\n",
        )
        .unwrap();

        let loaded = CsvTable::load(&path).unwrap();
        assert_eq!(loaded.headers.len(), 6);
        assert!(loaded.rows.iter().all(|r| r.len() == 6));
        assert_eq!(loaded.rows[0][5], "");

        let old = TablePair {
            plc: loaded,
            hmi: base_pair().hmi,
        };
        let report = check_consistency(&old, &base_pair(), CompareOptions::default()).unwrap();
        assert!(report.is_consistent());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn unreadable_table_is_a_read_error() {
        let path = std::env::temp_dir().join(format!("globvar_missing_{}.csv", uuid::Uuid::new_v4()));
        let err = CsvTable::load(&path).unwrap_err();
        assert!(matches!(err, CompareError::Read { .. }));
    }
}

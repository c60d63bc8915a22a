//! 两张输出表：PLC 全局变量表 / HMI 标签表。
//!
//! - 以变量名为键，保持插入顺序
//! - 重名处理由 `DuplicatePolicy` 决定：默认直接失败；`Overwrite` 为后写覆盖（保留首次出现的位置）

use std::fmt;

use indexmap::map::Entry;
use indexmap::IndexMap;
use log::warn;
use serde::{Deserialize, Serialize};

use super::error::AllocError;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    #[default]
    Reject,
    Overwrite,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableKind {
    GlobalVariables,
    HmiTags,
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKind::GlobalVariables => f.write_str("global variable table"),
            TableKind::HmiTags => f.write_str("HMI tag table"),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GlobalVarRecord {
    pub name: String,
    pub address: String,
    pub var_type: String,
    pub init_value: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HmiTagRecord {
    pub name: String,
    pub tag_type: String,
    pub address: String,
}

/// 按名称去重、保持插入顺序的记录表
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordTable<R> {
    kind: TableKind,
    policy: DuplicatePolicy,
    rows: IndexMap<String, R>,
}

pub type GlobalVarTable = RecordTable<GlobalVarRecord>;
pub type HmiTagTable = RecordTable<HmiTagRecord>;

impl<R> RecordTable<R> {
    fn with_kind(kind: TableKind, policy: DuplicatePolicy) -> Self {
        Self {
            kind,
            policy,
            rows: IndexMap::new(),
        }
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&R> {
        self.rows.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rows.contains_key(name)
    }

    pub fn records(&self) -> impl Iterator<Item = &R> {
        self.rows.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    fn insert_keyed(&mut self, name: String, record: R) -> Result<(), AllocError> {
        match self.rows.entry(name) {
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
            Entry::Occupied(mut slot) => match self.policy {
                DuplicatePolicy::Reject => Err(AllocError::DuplicateName {
                    table: self.kind,
                    name: slot.key().clone(),
                }),
                DuplicatePolicy::Overwrite => {
                    warn!("{}: '{}' overwritten by a later section", self.kind, slot.key());
                    slot.insert(record);
                    Ok(())
                }
            },
        }
    }
}

impl GlobalVarTable {
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self::with_kind(TableKind::GlobalVariables, policy)
    }

    pub fn insert(&mut self, record: GlobalVarRecord) -> Result<(), AllocError> {
        self.insert_keyed(record.name.clone(), record)
    }
}

impl HmiTagTable {
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self::with_kind(TableKind::HmiTags, policy)
    }

    pub fn insert(&mut self, record: HmiTagRecord) -> Result<(), AllocError> {
        self.insert_keyed(record.name.clone(), record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(name: &str, address: &str) -> GlobalVarRecord {
        GlobalVarRecord {
            name: name.to_string(),
            address: address.to_string(),
            var_type: "WORD".to_string(),
            init_value: String::new(),
        }
    }

    #[test]
    fn keeps_insertion_order() {
        let mut table = GlobalVarTable::new(DuplicatePolicy::Reject);
        table.insert(rec("b", "D1")).unwrap();
        table.insert(rec("a", "D2")).unwrap();
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn reject_policy_fails_on_duplicate() {
        let mut table = GlobalVarTable::new(DuplicatePolicy::Reject);
        table.insert(rec("x", "D1")).unwrap();
        let err = table.insert(rec("x", "D2")).unwrap_err();
        assert_eq!(
            err,
            AllocError::DuplicateName {
                table: TableKind::GlobalVariables,
                name: "x".to_string()
            }
        );
        assert_eq!(table.get("x").unwrap().address, "D1");
    }

    #[test]
    fn overwrite_policy_keeps_first_position_with_last_value() {
        let mut table = GlobalVarTable::new(DuplicatePolicy::Overwrite);
        table.insert(rec("x", "D1")).unwrap();
        table.insert(rec("y", "D2")).unwrap();
        table.insert(rec("x", "D9")).unwrap();
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["x", "y"]);
        assert_eq!(table.get("x").unwrap().address, "D9");
    }
}

//! Core crate for the shelf global-variable generator.
//! Responsibilities: read configuration sections, allocate PLC addresses, build the
//! global-variable table and the HMI tag table, compare generated tables.
//! Non-goals: CLI / process orchestration (handled by `globvar_cli`).

pub mod domain;
pub mod rules;
pub mod readers;
pub mod allocator;
pub mod compare;
pub mod config;
pub mod ports;
pub mod adapters;
pub mod application;

pub use adapters::csv_sink::CsvTableSink;
pub use adapters::memory::MemoryWorkbook;
pub use adapters::xlsx::XlsxWorkbook;
pub use application::service::{GeneratedTables, GeneratorService};
pub use config::{DuplicatePolicy, GeneratorConfig};
pub use domain::table::{GlobalVarTable, HmiTagTable};
pub use ports::{TableSink, WorkbookSource};

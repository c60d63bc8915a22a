use anyhow::{Context, Result};
use log::debug;

pub use crate::allocator::GeneratedTables;
use crate::allocator::{build_tables, WorkbookSections};
use crate::config::GeneratorConfig;
use crate::ports::{RawSheet, TableSink, WorkbookSource};
use crate::readers;

/// Application layer use case: workbook source → sections → tables → sink.
/// Keeps orchestration (sheet lookup, error context) away from the allocator.
pub struct GeneratorService<S: WorkbookSource> {
    source: S,
    config: GeneratorConfig,
}

impl<S: WorkbookSource> GeneratorService<S> {
    /// Create a new service with the given workbook source and config.
    pub fn new(source: S, config: GeneratorConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    fn sheet(&mut self, name: &str) -> Result<RawSheet> {
        self.source
            .read_sheet(name)
            .with_context(|| format!("failed to load sheet '{name}'"))
    }

    /// Read every configuration section in a fixed order.
    pub fn read_sections(&mut self) -> Result<WorkbookSections> {
        let sheets = self.config.sheets.clone();
        debug!("workbook sheets: {:?}", self.source.sheet_names());

        let constants = readers::read_var_section(&self.sheet(&sheets.constants)?)?;
        let shelf = readers::read_var_section(&self.sheet(&sheets.shelf)?)?;
        let sensor_list = readers::read_sensor_list(&self.sheet(&sheets.sensor_list)?)?;
        let sensor_data = readers::read_var_section(&self.sheet(&sheets.sensor_data)?)?;
        let pump = readers::read_var_section(&self.sheet(&sheets.pump)?)?;
        let io_mapping = readers::read_io_mapping(&self.sheet(&sheets.io_mapping)?)?;
        let hmi_internal = readers::read_hmi_internal(&self.sheet(&sheets.hmi_internal)?)?;

        Ok(WorkbookSections {
            constants,
            shelf,
            sensor_list,
            sensor_data,
            pump,
            io_mapping,
            hmi_internal,
        })
    }

    /// Build both tables from scratch.
    pub fn generate(&mut self) -> Result<GeneratedTables> {
        let sections = self.read_sections()?;
        let tables = build_tables(&sections, &self.config).context("address allocation failed")?;
        Ok(tables)
    }

    /// Generate and hand both tables to the sink. Nothing is written if generation fails,
    /// and nothing is committed unless both tables were written.
    pub fn generate_into<K: TableSink>(&mut self, sink: &mut K) -> Result<GeneratedTables> {
        let tables = self.generate()?;
        let written = sink
            .write_global(&tables.global)
            .and_then(|_| sink.write_hmi(&tables.hmi));
        if let Err(e) = written {
            sink.discard();
            return Err(e);
        }
        sink.commit()?;
        Ok(tables)
    }
}

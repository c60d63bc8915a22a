pub mod sink;
pub mod workbook;

pub use sink::TableSink;
pub use workbook::{RawSheet, WorkbookError, WorkbookSource};

pub mod csv_sink;
pub mod memory;
pub mod xlsx;

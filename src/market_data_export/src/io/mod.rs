pub mod csv_sink;
pub mod csv_source;
pub mod sink;
pub mod symbols;

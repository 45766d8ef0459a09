//! MTL-READERS: concrete sources behind the `Reader` contract
//!
//! - [`CsvReader`]: tabular text, filtered with `col=value&...` queries
//! - [`JsonReader`]: a JSON document, queried with JSON pointers
//! - [`MemoryReader`]: a fixed dataframe, same filters as CSV
//!
//! [`ReaderSet`] builds named readers from [`ReaderConfig`] entries.

pub mod config;
pub mod csv;
pub mod filter;
pub mod json;
pub mod memory;
mod state;

pub use config::{ReaderConfig, ReaderSet};
pub use csv::{parse_records, parse_table, Cell, CsvReader};
pub use filter::RowFilter;
pub use json::JsonReader;
pub use memory::MemoryReader;

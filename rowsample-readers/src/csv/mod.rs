//! CSV row source
//!
//! Reads delimited text against a declared [`RowSchema`](rowsample_core::RowSchema),
//! turning each cell into a raw field value of the column's declared kind.

mod parser;
mod reader;

pub use parser::{parse_cell, CsvParser};
pub use reader::{CsvReaderOptions, CsvRowSource};

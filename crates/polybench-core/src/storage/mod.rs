pub mod raw_table;

pub use raw_table::{RawTable, RawTableWriter, RAW_HEADER};

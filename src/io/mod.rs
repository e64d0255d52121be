//! File input and output.

mod records;
mod report;

pub use records::{LoadReport, load_fragments, parse_fragments};
pub use report::write_json;

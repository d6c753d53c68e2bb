pub mod grid;
pub mod parser;
pub mod scan;

pub use grid::GridGeometry;
pub use parser::{parse_table, ScanSample};
pub use scan::ScanData;

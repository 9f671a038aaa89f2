pub mod cell;
pub mod loader;

pub use cell::{CellValue, Dataset, RowRecord};

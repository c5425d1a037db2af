// Adapters layer: concrete implementations for external systems (spreadsheet readers, storage).

pub mod spreadsheet;
pub mod storage;

pub use spreadsheet::{read_grid, SourceFormat};
pub use storage::LocalStorage;

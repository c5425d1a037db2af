pub mod differ;
pub mod engine;
pub mod report;
pub mod scanner;
pub mod signature;
pub mod standard;

pub use crate::domain::model::{Grid, Venue};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;

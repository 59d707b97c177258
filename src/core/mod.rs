pub mod batch;
pub mod engine;
pub mod pipeline;

pub use crate::domain::model::{MigrationJob, ParseResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;

pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod render;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{IrDocumentParser, RuleValidator};
pub use config::{cli::LocalStorage, toml_config::MigrationConfig};
pub use core::{
    batch::{BatchMigrator, BatchReport, BatchSettings, FileOutcome},
    engine::{MigrationEngine, MigrationOutcome, PipelineState},
    pipeline::MigrationPipeline,
};
pub use render::{KotlinRenderer, RenderConfig, Renderer};
pub use utils::error::{FailureKind, MigrationError, Result};

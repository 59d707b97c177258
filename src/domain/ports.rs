use crate::domain::model::{DomainModel, MigrationJob, ParseResult, Port};
use crate::domain::report::{ParseError, ValidationResult, ValidationWarning};
use crate::render::RenderConfig;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Turns the text of one source file into IR declarations.
pub trait SourceParser: Send + Sync {
    fn parse(&self, path: &str, content: &str) -> std::result::Result<ParseResult, ParseError>;
}

/// Checks architecture rules over parsed declarations. Errors block a
/// migration; warnings only block it when the configuration says so.
pub trait ArchitectureValidator: Send + Sync {
    fn validate(&self, domain_models: &[DomainModel], ports: &[Port]) -> ValidationResult;
}

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn skip_validation(&self) -> bool;
    fn fail_on_warnings(&self) -> bool;
    fn render_config(&self) -> &RenderConfig;
}

/// The four steps of migrating one file. [`crate::core::engine::MigrationEngine`]
/// drives them in order and stops at the first failure.
#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn parse(&self, job: &MigrationJob) -> Result<ParseResult>;

    /// `false` when the validating step is skipped entirely.
    fn validation_enabled(&self) -> bool;

    /// Returns the warnings that did not block the migration.
    async fn validate(&self, unit: &ParseResult) -> Result<Vec<ValidationWarning>>;

    async fn render(&self, unit: &ParseResult) -> Result<String>;

    /// Commits the rendered code and returns the path written.
    async fn write(&self, job: &MigrationJob, code: &str) -> Result<String>;
}

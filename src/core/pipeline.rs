use crate::adapters::{IrDocumentParser, RuleValidator};
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::model::{MigrationJob, ParseResult};
use crate::domain::ports::{ArchitectureValidator, SourceParser};
use crate::domain::report::{SourceLocation, ValidationResult, ValidationWarning};
use crate::render::{ensure_renderable, KotlinRenderer, Renderer};
use crate::utils::error::{MigrationError, Result};
use std::sync::Arc;

/// Decides whether a validation result lets the migration continue.
/// Errors always block; warnings block only when `fail_on_warnings` is set.
pub fn gate_validation(result: ValidationResult, fail_on_warnings: bool) -> Result<Vec<ValidationWarning>> {
    let blocked = !result.is_valid || (fail_on_warnings && result.has_warnings());
    if blocked {
        Err(MigrationError::Validation {
            errors: result.errors,
            warnings: result.warnings,
        })
    } else {
        Ok(result.warnings)
    }
}

pub struct MigrationPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    parser: Arc<dyn SourceParser>,
    validator: Arc<dyn ArchitectureValidator>,
    renderer: Arc<dyn Renderer>,
}

impl<S: Storage, C: ConfigProvider> MigrationPipeline<S, C> {
    /// IR documents in, Kotlin out, checked by the default rule set.
    pub fn new(storage: S, config: C) -> Result<Self> {
        let renderer = KotlinRenderer::new(config.render_config().clone());
        Ok(Self {
            storage,
            config,
            parser: Arc::new(IrDocumentParser::new()),
            validator: Arc::new(RuleValidator::new()?),
            renderer: Arc::new(renderer),
        })
    }

    pub fn with_parser(mut self, parser: impl SourceParser + 'static) -> Self {
        self.parser = Arc::new(parser);
        self
    }

    pub fn with_validator(mut self, validator: impl ArchitectureValidator + 'static) -> Self {
        self.validator = Arc::new(validator);
        self
    }

    pub fn with_renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderer = Arc::new(renderer);
        self
    }

    pub fn renderer(&self) -> &dyn Renderer {
        self.renderer.as_ref()
    }

    pub fn config(&self) -> &C {
        &self.config
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for MigrationPipeline<S, C> {
    async fn parse(&self, job: &MigrationJob) -> Result<ParseResult> {
        let bytes = self.storage.read_file(&job.source).await?;
        let content = String::from_utf8(bytes).map_err(|e| MigrationError::Parse {
            message: format!("source is not valid UTF-8: {}", e),
            location: Some(SourceLocation::start_of(job.source.as_str())),
        })?;
        let unit = self.parser.parse(&job.source, &content)?;
        Ok(unit)
    }

    fn validation_enabled(&self) -> bool {
        !self.config.skip_validation()
    }

    async fn validate(&self, unit: &ParseResult) -> Result<Vec<ValidationWarning>> {
        let result = self.validator.validate(&unit.domain_models, &unit.ports);
        gate_validation(result, self.config.fail_on_warnings())
    }

    async fn render(&self, unit: &ParseResult) -> Result<String> {
        ensure_renderable(unit)?;
        Ok(self.renderer.render_unit(unit))
    }

    async fn write(&self, job: &MigrationJob, code: &str) -> Result<String> {
        tracing::debug!("💾 Writing {} bytes to {}", code.len(), job.destination);
        self.storage.write_file(&job.destination, code.as_bytes()).await?;
        Ok(job.destination.clone())
    }
}

use crate::core::Pipeline;
use crate::domain::model::{MigrationJob, ParseResult};
use crate::domain::report::ValidationWarning;
use crate::utils::error::{FailureKind, MigrationError, Result};
use serde::Serialize;

/// Where a migration is, or where it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PipelineState {
    Parsing,
    Validating,
    Rendering,
    Writing,
    Done,
    Failed(FailureKind),
}

impl PipelineState {
    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed(_))
    }
}

/// Result of migrating one file. `trace` lists every state visited, ending
/// in `Done` or `Failed`.
#[derive(Debug)]
pub struct MigrationOutcome {
    pub job: MigrationJob,
    pub trace: Vec<PipelineState>,
    pub unit: Option<ParseResult>,
    pub warnings: Vec<ValidationWarning>,
    pub written: Option<String>,
    pub error: Option<MigrationError>,
}

impl MigrationOutcome {
    fn started(job: MigrationJob) -> Self {
        Self {
            job,
            trace: Vec::new(),
            unit: None,
            warnings: Vec::new(),
            written: None,
            error: None,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.trace.last().copied().unwrap_or(PipelineState::Parsing)
    }

    pub fn is_success(&self) -> bool {
        self.state() == PipelineState::Done
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.error.as_ref().map(MigrationError::kind)
    }

    /// The written path, or the error that stopped the migration.
    pub fn into_result(self) -> Result<String> {
        match (self.error, self.written) {
            (Some(e), _) => Err(e),
            (None, Some(path)) => Ok(path),
            (None, None) => Err(MigrationError::Storage {
                path: self.job.destination,
                message: "migration did not write any output".to_string(),
            }),
        }
    }
}

pub struct MigrationEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> MigrationEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    /// Runs parse, validate, render and write in order, stopping at the
    /// first failure. Never returns early without a terminal state.
    pub async fn run(&self, job: MigrationJob) -> MigrationOutcome {
        tracing::debug!("🚀 Migrating {} -> {}", job.source, job.destination);
        let mut outcome = MigrationOutcome::started(job);

        match self.execute(&mut outcome).await {
            Ok(path) => {
                tracing::info!("✅ {} -> {}", outcome.job.source, path);
                outcome.written = Some(path);
                outcome.trace.push(PipelineState::Done);
            }
            Err(e) => {
                tracing::error!("❌ {}: {}", outcome.job.source, e.user_friendly_message());
                outcome.trace.push(PipelineState::Failed(e.kind()));
                outcome.error = Some(e);
            }
        }
        outcome
    }

    async fn execute(&self, outcome: &mut MigrationOutcome) -> Result<String> {
        outcome.trace.push(PipelineState::Parsing);
        let unit = self.pipeline.parse(&outcome.job).await?;
        tracing::debug!("📥 Parsed {} declaration(s)", unit.declaration_count());

        if self.pipeline.validation_enabled() {
            outcome.trace.push(PipelineState::Validating);
            outcome.warnings = self.pipeline.validate(&unit).await?;
            for warning in &outcome.warnings {
                tracing::warn!("🔶 {}: {}", outcome.job.source, warning);
            }
        }

        outcome.trace.push(PipelineState::Rendering);
        let code = self.pipeline.render(&unit).await?;
        tracing::debug!("🔄 Rendered {} bytes", code.len());

        outcome.trace.push(PipelineState::Writing);
        let path = self.pipeline.write(&outcome.job, &code).await?;
        outcome.unit = Some(unit);
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::report::ValidationIssue;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Pipeline that fails at a chosen step and records the steps it ran.
    struct ScriptedPipeline {
        fail_at: Option<PipelineState>,
        validate: bool,
        calls: Mutex<Vec<&'static str>>,
    }

    impl ScriptedPipeline {
        fn new(fail_at: Option<PipelineState>, validate: bool) -> Self {
            Self {
                fail_at,
                validate,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn record(&self, step: &'static str) {
            self.calls.lock().unwrap().push(step);
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Pipeline for ScriptedPipeline {
        async fn parse(&self, job: &MigrationJob) -> Result<ParseResult> {
            self.record("parse");
            if self.fail_at == Some(PipelineState::Parsing) {
                return Err(MigrationError::Parse {
                    message: "unexpected token".to_string(),
                    location: None,
                });
            }
            Ok(ParseResult::new(job.source.trim_end_matches(".toml")))
        }

        fn validation_enabled(&self) -> bool {
            self.validate
        }

        async fn validate(&self, _unit: &ParseResult) -> Result<Vec<ValidationWarning>> {
            self.record("validate");
            if self.fail_at == Some(PipelineState::Validating) {
                return Err(MigrationError::Validation {
                    errors: vec![ValidationIssue::new("non-empty-enum", "Enum Role has no values")],
                    warnings: vec![],
                });
            }
            Ok(vec![ValidationWarning::new("Port Empty has no methods")])
        }

        async fn render(&self, _unit: &ParseResult) -> Result<String> {
            self.record("render");
            if self.fail_at == Some(PipelineState::Rendering) {
                return Err(MigrationError::Render {
                    message: "duplicate property".to_string(),
                });
            }
            Ok("class User()\n".to_string())
        }

        async fn write(&self, job: &MigrationJob, _code: &str) -> Result<String> {
            self.record("write");
            if self.fail_at == Some(PipelineState::Writing) {
                return Err(MigrationError::Io(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "read-only",
                )));
            }
            Ok(job.destination.clone())
        }
    }

    fn job() -> MigrationJob {
        MigrationJob::new("user.toml", "out/user.kt")
    }

    #[tokio::test]
    async fn test_successful_run_visits_every_state() {
        let engine = MigrationEngine::new(ScriptedPipeline::new(None, true));
        let outcome = engine.run(job()).await;

        assert!(outcome.is_success());
        assert_eq!(
            outcome.trace,
            vec![
                PipelineState::Parsing,
                PipelineState::Validating,
                PipelineState::Rendering,
                PipelineState::Writing,
                PipelineState::Done,
            ]
        );
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.unit.as_ref().map(|u| u.package.as_str()), Some("user"));
        assert_eq!(outcome.into_result().unwrap(), "out/user.kt");
    }

    #[tokio::test]
    async fn test_skipping_validation() {
        let engine = MigrationEngine::new(ScriptedPipeline::new(None, false));
        let outcome = engine.run(job()).await;
        assert!(outcome.is_success());
        assert!(!outcome.trace.contains(&PipelineState::Validating));
        assert_eq!(engine.pipeline().calls(), vec!["parse", "render", "write"]);
    }

    #[tokio::test]
    async fn test_failure_short_circuits() {
        let cases = [
            (PipelineState::Parsing, FailureKind::ParseFailure, vec!["parse"]),
            (
                PipelineState::Validating,
                FailureKind::ValidationFailure,
                vec!["parse", "validate"],
            ),
            (
                PipelineState::Rendering,
                FailureKind::RenderFailure,
                vec!["parse", "validate", "render"],
            ),
            (
                PipelineState::Writing,
                FailureKind::IoFailure,
                vec!["parse", "validate", "render", "write"],
            ),
        ];
        for (step, kind, calls) in cases {
            let engine = MigrationEngine::new(ScriptedPipeline::new(Some(step), true));
            let outcome = engine.run(job()).await;

            assert!(!outcome.is_success());
            assert_eq!(outcome.state(), PipelineState::Failed(kind));
            assert!(outcome.state().is_terminal());
            assert_eq!(outcome.failure_kind(), Some(kind));
            assert_eq!(outcome.trace[outcome.trace.len() - 2], step);
            assert!(outcome.written.is_none());
            assert_eq!(engine.pipeline().calls(), calls);
        }
    }
}

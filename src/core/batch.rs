//! Directory-wide migration: discover every source file under a root,
//! migrate each one on its own, then tally.

use crate::core::engine::{MigrationEngine, MigrationOutcome, PipelineState};
use crate::core::Pipeline;
use crate::domain::model::{MigrationJob, Project};
use crate::utils::error::{FailureKind, MigrationError, Result};
use crate::utils::validation::{validate_extension, validate_path, validate_positive_number, Validate};
use chrono::Utc;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct BatchSettings {
    pub source_dir: PathBuf,
    pub dest_dir: PathBuf,
    pub source_extension: String,
    pub target_extension: String,
    pub parallel: bool,
    pub max_concurrency: usize,
}

impl BatchSettings {
    pub fn new(source_dir: impl Into<PathBuf>, dest_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            dest_dir: dest_dir.into(),
            source_extension: "toml".to_string(),
            target_extension: "kt".to_string(),
            parallel: true,
            max_concurrency: 8,
        }
    }
}

impl Validate for BatchSettings {
    fn validate(&self) -> Result<()> {
        validate_path("batch.source_dir", &self.source_dir.to_string_lossy())?;
        validate_path("batch.dest_dir", &self.dest_dir.to_string_lossy())?;
        validate_extension("batch.source_extension", &self.source_extension)?;
        validate_extension("batch.target_extension", &self.target_extension)?;
        validate_positive_number("batch.max_concurrency", self.max_concurrency, 1)?;
        if !self.source_dir.is_dir() {
            return Err(MigrationError::InvalidConfigValue {
                field: "batch.source_dir".to_string(),
                value: self.source_dir.display().to_string(),
                reason: "Source directory does not exist".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub kind: FailureKind,
    pub message: String,
}

/// What happened to one file of a batch.
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub source: String,
    pub destination: String,
    pub trace: Vec<PipelineState>,
    pub declarations: usize,
    pub warnings: Vec<String>,
    pub failure: Option<FileFailure>,
}

impl FileOutcome {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    fn from_outcome(outcome: &MigrationOutcome) -> Self {
        Self {
            source: outcome.job.source.clone(),
            destination: outcome.job.destination.clone(),
            trace: outcome.trace.clone(),
            declarations: outcome.unit.as_ref().map_or(0, |u| u.declaration_count()),
            warnings: outcome.warnings.iter().map(ToString::to_string).collect(),
            failure: outcome.error.as_ref().map(|e| FileFailure {
                kind: e.kind(),
                message: e.user_friendly_message(),
            }),
        }
    }

    fn aborted(job: &MigrationJob, message: String) -> Self {
        let kind = FailureKind::IoFailure;
        Self {
            source: job.source.clone(),
            destination: job.destination.clone(),
            trace: vec![PipelineState::Failed(kind)],
            declarations: 0,
            warnings: Vec::new(),
            failure: Some(FileFailure { kind, message }),
        }
    }

    /// One line for terminal output.
    pub fn summary_line(&self) -> String {
        match &self.failure {
            None if self.warnings.is_empty() => format!("✅ {} -> {}", self.source, self.destination),
            None => format!(
                "✅ {} -> {} ({} warning(s))",
                self.source,
                self.destination,
                self.warnings.len()
            ),
            Some(failure) => format!("❌ {} [{:?}] {}", self.source, failure.kind, failure.message),
        }
    }
}

#[derive(Debug)]
pub struct BatchReport {
    pub run_id: String,
    pub success_count: usize,
    pub failure_count: usize,
    /// Sorted by source path.
    pub outcomes: Vec<FileOutcome>,
    /// Every successfully migrated unit, one module per file.
    pub project: Project,
}

impl BatchReport {
    pub fn has_failures(&self) -> bool {
        self.failure_count > 0
    }

    pub fn to_json(&self) -> Result<String> {
        let summary = serde_json::json!({
            "run_id": self.run_id,
            "success_count": self.success_count,
            "failure_count": self.failure_count,
            "project": {
                "name": self.project.name,
                "root_package": self.project.root_package,
                "modules": self.project.all_modules().len(),
                "metadata": self.project.metadata,
            },
            "outcomes": self.outcomes,
        });
        Ok(serde_json::to_string_pretty(&summary)?)
    }
}

/// `run_20240131_094500`.
pub fn run_id() -> String {
    Utc::now().format("run_%Y%m%d_%H%M%S").to_string()
}

/// Files under `root` with the given extension, sorted.
pub fn discover_sources(root: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut sources = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|e| MigrationError::Storage {
            path: root.display().to_string(),
            message: e.to_string(),
        })?;
        let matches = entry.file_type().is_file()
            && entry.path().extension().is_some_and(|ext| ext == extension);
        if matches {
            sources.push(entry.into_path());
        }
    }
    sources.sort();
    Ok(sources)
}

/// Destination of `source`: same path relative to the source root, under
/// the destination root, with the target extension.
pub fn destination_for(source: &Path, settings: &BatchSettings) -> PathBuf {
    let relative = source.strip_prefix(&settings.source_dir).unwrap_or(source);
    settings
        .dest_dir
        .join(relative)
        .with_extension(&settings.target_extension)
}

/// Dotted module name from a path relative to the source root.
fn module_name(source: &Path, settings: &BatchSettings) -> String {
    let relative = source.strip_prefix(&settings.source_dir).unwrap_or(source);
    let without_extension = relative.with_extension("");
    without_extension
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(".")
}

/// Longest dotted prefix shared by every package.
fn common_package<'a>(packages: impl IntoIterator<Item = &'a str>) -> String {
    let mut common: Option<Vec<&str>> = None;
    for package in packages {
        let segments: Vec<&str> = package.split('.').filter(|s| !s.is_empty()).collect();
        common = Some(match common {
            None => segments,
            Some(prefix) => prefix
                .iter()
                .zip(segments.iter())
                .take_while(|(a, b)| a == b)
                .map(|(a, _)| *a)
                .collect(),
        });
    }
    common.unwrap_or_default().join(".")
}

/// A finished migration, or the record of a task that died before finishing.
type Completed = std::result::Result<MigrationOutcome, FileOutcome>;

pub struct BatchMigrator<P: Pipeline + 'static> {
    engine: Arc<MigrationEngine<P>>,
    settings: BatchSettings,
}

impl<P: Pipeline + 'static> BatchMigrator<P> {
    pub fn new(engine: MigrationEngine<P>, settings: BatchSettings) -> Self {
        Self {
            engine: Arc::new(engine),
            settings,
        }
    }

    pub fn settings(&self) -> &BatchSettings {
        &self.settings
    }

    pub fn jobs(&self) -> Result<Vec<MigrationJob>> {
        let sources = discover_sources(&self.settings.source_dir, &self.settings.source_extension)?;
        Ok(sources
            .iter()
            .map(|source| {
                MigrationJob::new(
                    source.to_string_lossy(),
                    destination_for(source, &self.settings).to_string_lossy(),
                )
            })
            .collect())
    }

    /// Migrates every discovered file. A failing file never stops the
    /// others; only discovery errors fail the whole batch.
    pub async fn run(&self) -> Result<BatchReport> {
        let run_id = run_id();
        let jobs = self.jobs()?;
        tracing::info!(
            "🚀 {}: migrating {} file(s) from {}",
            run_id,
            jobs.len(),
            self.settings.source_dir.display()
        );

        let completed = if self.settings.parallel {
            self.run_parallel(jobs).await
        } else {
            self.run_sequential(jobs).await
        };

        let report = self.report(run_id, completed);
        tracing::info!(
            "📊 {}: {} succeeded, {} failed",
            report.run_id,
            report.success_count,
            report.failure_count
        );
        Ok(report)
    }

    async fn run_sequential(&self, jobs: Vec<MigrationJob>) -> Vec<Completed> {
        let mut completed = Vec::with_capacity(jobs.len());
        for job in jobs {
            completed.push(Ok(self.engine.run(job).await));
        }
        completed
    }

    async fn run_parallel(&self, jobs: Vec<MigrationJob>) -> Vec<Completed> {
        let semaphore = Arc::new(Semaphore::new(self.settings.max_concurrency.max(1)));
        let mut tasks = JoinSet::new();
        for (index, job) in jobs.iter().cloned().enumerate() {
            let engine = Arc::clone(&self.engine);
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                // The semaphore is never closed, so acquiring only waits.
                let _permit = semaphore.acquire_owned().await.ok();
                (index, engine.run(job).await)
            });
        }

        let mut slots: Vec<Option<MigrationOutcome>> = jobs.iter().map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => slots[index] = Some(outcome),
                Err(e) => tracing::error!("❌ Migration task aborted: {}", e),
            }
        }
        jobs.iter()
            .zip(slots)
            .map(|(job, slot)| slot.ok_or_else(|| FileOutcome::aborted(job, "migration task aborted".to_string())))
            .collect()
    }

    fn report(&self, run_id: String, completed: Vec<Completed>) -> BatchReport {
        let mut files: Vec<FileOutcome> = completed
            .iter()
            .map(|c| match c {
                Ok(outcome) => FileOutcome::from_outcome(outcome),
                Err(aborted) => aborted.clone(),
            })
            .collect();
        files.sort_by(|a, b| a.source.cmp(&b.source));

        let mut successes: Vec<MigrationOutcome> = completed
            .into_iter()
            .filter_map(|c| c.ok())
            .filter(MigrationOutcome::is_success)
            .collect();
        successes.sort_by(|a, b| a.job.source.cmp(&b.job.source));

        let root_package = common_package(
            successes
                .iter()
                .filter_map(|o| o.unit.as_ref())
                .map(|u| u.package.as_str()),
        );
        let project_name = self
            .settings
            .source_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string());
        let mut project = Project::new(project_name, root_package);
        project.metadata.insert("run_id".to_string(), run_id.clone());
        project
            .metadata
            .insert("source_dir".to_string(), self.settings.source_dir.display().to_string());
        project
            .metadata
            .insert("target_extension".to_string(), self.settings.target_extension.clone());
        for outcome in successes {
            let name = module_name(Path::new(&outcome.job.source), &self.settings);
            if let Some(unit) = outcome.unit {
                project.modules.push(unit.into_module(name));
            }
        }

        let success_count = files.iter().filter(|f| f.is_success()).count();
        BatchReport {
            run_id,
            success_count,
            failure_count: files.len() - success_count,
            outcomes: files,
            project,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_rewrites_extension_and_keeps_directories() {
        let settings = BatchSettings::new("src/arch", "out");
        assert_eq!(
            destination_for(Path::new("src/arch/users/user.toml"), &settings),
            PathBuf::from("out/users/user.kt")
        );
        assert_eq!(module_name(Path::new("src/arch/users/user.toml"), &settings), "users.user");
    }

    #[test]
    fn test_common_package() {
        assert_eq!(common_package(["com.acme.users", "com.acme.billing"]), "com.acme");
        assert_eq!(common_package(["com.acme.users"]), "com.acme.users");
        assert_eq!(common_package(["com.acme", "org.other"]), "");
        assert_eq!(common_package(Vec::<&str>::new()), "");
    }

    #[test]
    fn test_run_id_format() {
        let id = run_id();
        assert!(id.starts_with("run_"));
        assert_eq!(id.len(), "run_20240131_094500".len());
    }

    #[test]
    fn test_discover_sources_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("b/nested")).unwrap();
        std::fs::write(dir.path().join("b/nested/z.toml"), "").unwrap();
        std::fs::write(dir.path().join("a.toml"), "").unwrap();
        std::fs::write(dir.path().join("notes.md"), "").unwrap();

        let found = discover_sources(dir.path(), "toml").unwrap();
        let relative: Vec<PathBuf> = found
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(relative, vec![PathBuf::from("a.toml"), PathBuf::from("b/nested/z.toml")]);
    }

    #[test]
    fn test_settings_validation() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = BatchSettings::new(dir.path(), dir.path().join("out"));
        assert!(settings.validate().is_ok());

        settings.max_concurrency = 0;
        assert!(settings.validate().is_err());

        let missing = BatchSettings::new(dir.path().join("missing"), "out");
        assert!(missing.validate().is_err());

        let mut dotted = BatchSettings::new(dir.path(), "out");
        dotted.target_extension = ".kt".to_string();
        assert!(dotted.validate().is_err());
    }
}

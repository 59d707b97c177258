use anyhow::Context;
use arch_migrate::config::toml_config::MigrationConfig;
use arch_migrate::utils::{logger, validation::Validate};
use arch_migrate::{BatchMigrator, LocalStorage, MigrationEngine, MigrationPipeline, RuleValidator};
use clap::Parser;

#[derive(Parser)]
#[command(name = "batch-migrate")]
#[command(about = "Migrate every architecture document under a directory into Kotlin")]
struct Args {
    /// Directory holding the source documents (overrides batch.source_dir)
    source_dir: Option<String>,

    /// Directory the generated files are written to (overrides batch.dest_dir)
    dest_dir: Option<String>,

    /// Path to TOML settings file
    #[arg(short, long)]
    config: Option<String>,

    /// Migrate one file at a time
    #[arg(long)]
    sequential: bool,

    #[arg(long)]
    max_concurrency: Option<usize>,

    #[arg(long)]
    source_extension: Option<String>,

    #[arg(long)]
    target_extension: Option<String>,

    #[arg(long)]
    skip_validation: bool,

    #[arg(long)]
    fail_on_warnings: bool,

    /// Write a JSON summary of the run to this file
    #[arg(long)]
    report: Option<String>,

    /// List the files that would be migrated without migrating them
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[arg(long)]
    log_json: bool,
}

impl Args {
    fn apply(&self, config: &mut MigrationConfig) {
        if let Some(dir) = &self.source_dir {
            config.batch.source_dir = Some(dir.clone());
        }
        if let Some(dir) = &self.dest_dir {
            config.batch.dest_dir = Some(dir.clone());
        }
        if let Some(ext) = &self.source_extension {
            config.batch.source_extension = ext.clone();
        }
        if let Some(ext) = &self.target_extension {
            config.batch.target_extension = ext.clone();
        }
        if let Some(max) = self.max_concurrency {
            config.batch.max_concurrency = max;
        }
        if self.sequential {
            config.batch.parallel = false;
        }
        config.pipeline.skip_validation |= self.skip_validation;
        config.pipeline.fail_on_warnings |= self.fail_on_warnings;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.log_json {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting batch migration");

    let mut config = match &args.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            match MigrationConfig::from_file(path) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("❌ Failed to load config file '{}': {}", path, e);
                    eprintln!("💡 Make sure the file exists and is valid TOML format");
                    std::process::exit(1);
                }
            }
        }
        None => MigrationConfig::default(),
    };
    args.apply(&mut config);

    let settings = match config.validate().and_then(|_| config.batch_settings()) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };
    if let Err(e) = settings.validate() {
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let identifier_pattern = config.pipeline.identifier_pattern.clone();
    let mut pipeline = MigrationPipeline::new(LocalStorage::default(), config)
        .context("failed to set up the migration pipeline")?;
    if let Some(pattern) = identifier_pattern {
        pipeline = pipeline.with_validator(
            RuleValidator::with_identifier_pattern(&pattern).context("invalid identifier pattern")?,
        );
    }
    let migrator = BatchMigrator::new(MigrationEngine::new(pipeline), settings);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No files will be written");
        for job in migrator.jobs().context("failed to list source files")? {
            println!("{} -> {}", job.source, job.destination);
        }
        return Ok(());
    }

    let report = migrator.run().await.context("batch migration failed")?;

    for outcome in &report.outcomes {
        println!("{}", outcome.summary_line());
    }
    println!(
        "📊 {}: {} succeeded, {} failed",
        report.run_id, report.success_count, report.failure_count
    );

    if let Some(path) = &args.report {
        let json = report.to_json().context("failed to serialize the run report")?;
        std::fs::write(path, json).with_context(|| format!("failed to write report to {}", path))?;
        tracing::info!("📝 Report written to {}", path);
    }

    if report.has_failures() {
        std::process::exit(1);
    }
    Ok(())
}

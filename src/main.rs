use anyhow::Context;
use arch_migrate::domain::model::MigrationJob;
use arch_migrate::utils::error::{FailureKind, MigrationError};
use arch_migrate::utils::{logger, validation::Validate};
use arch_migrate::{CliConfig, LocalStorage, MigrationEngine, MigrationPipeline, RuleValidator};

fn exit_code(kind: FailureKind) -> i32 {
    match kind {
        FailureKind::ConfigFailure => 1,
        FailureKind::ParseFailure => 2,
        FailureKind::ValidationFailure => 3,
        FailureKind::RenderFailure => 4,
        FailureKind::IoFailure => 5,
    }
}

fn fail(e: &MigrationError) -> ! {
    tracing::error!(
        "❌ Migration failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
    std::process::exit(exit_code(e.kind()));
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match CliConfig::from_args() {
        Ok(config) => config,
        Err(e) => fail(&e),
    };

    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("🚀 Starting arch-migrate");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        fail(&e);
    }

    let job = MigrationJob::new(config.input.clone(), config.output_path().to_string_lossy());
    let identifier_pattern = config.identifier_pattern.clone();

    let mut pipeline = MigrationPipeline::new(LocalStorage::default(), config)
        .context("failed to set up the migration pipeline")?;
    if let Some(pattern) = identifier_pattern {
        let validator = match RuleValidator::with_identifier_pattern(&pattern) {
            Ok(validator) => validator,
            Err(e) => fail(&e),
        };
        pipeline = pipeline.with_validator(validator);
    }

    let engine = MigrationEngine::new(pipeline);
    let outcome = engine.run(job).await;

    for warning in &outcome.warnings {
        println!("⚠️  {}", warning);
    }

    match outcome.into_result() {
        Ok(path) => {
            println!("✅ Migration completed successfully!");
            println!("📁 Output saved to: {}", path);
            Ok(())
        }
        Err(e) => fail(&e),
    }
}

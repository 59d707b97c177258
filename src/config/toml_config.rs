use crate::core::batch::BatchSettings;
use crate::core::ConfigProvider;
use crate::render::RenderConfig;
use crate::utils::error::{MigrationError, Result};
use crate::utils::validation::{
    validate_extension, validate_path, validate_positive_number, validate_range, validate_required_field,
    Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Migration settings file:
///
/// ```toml
/// [pipeline]
/// skip_validation = false
/// fail_on_warnings = false
///
/// [render]
/// indent_width = 4
/// trailing_commas = true
///
/// [batch]
/// source_dir = "${ARCH_SRC}"
/// dest_dir = "./generated"
/// parallel = true
/// max_concurrency = 8
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
    pub pipeline: PipelineSection,
    pub render: RenderConfig,
    pub batch: BatchSection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSection {
    pub skip_validation: bool,
    /// Treat validation warnings like errors.
    pub fail_on_warnings: bool,
    /// Overrides the identifier regex of the rule validator.
    pub identifier_pattern: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSection {
    pub source_dir: Option<String>,
    pub dest_dir: Option<String>,
    pub source_extension: String,
    pub target_extension: String,
    pub parallel: bool,
    pub max_concurrency: usize,
}

impl Default for BatchSection {
    fn default() -> Self {
        Self {
            source_dir: None,
            dest_dir: None,
            source_extension: "toml".to_string(),
            target_extension: "kt".to_string(),
            parallel: true,
            max_concurrency: 8,
        }
    }
}

impl MigrationConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(MigrationError::Io)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| MigrationError::Config {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the value of the environment variable. Unset
    /// variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| MigrationError::Config {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_range("render.indent_width", self.render.indent_width, 1, 16)?;
        validate_extension("batch.source_extension", &self.batch.source_extension)?;
        validate_extension("batch.target_extension", &self.batch.target_extension)?;
        validate_positive_number("batch.max_concurrency", self.batch.max_concurrency, 1)?;
        if let Some(dir) = &self.batch.source_dir {
            validate_path("batch.source_dir", dir)?;
        }
        if let Some(dir) = &self.batch.dest_dir {
            validate_path("batch.dest_dir", dir)?;
        }
        if let Some(pattern) = &self.pipeline.identifier_pattern {
            Regex::new(pattern).map_err(|e| MigrationError::InvalidConfigValue {
                field: "pipeline.identifier_pattern".to_string(),
                value: pattern.clone(),
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }

    /// Batch settings; both directories must be configured.
    pub fn batch_settings(&self) -> Result<BatchSettings> {
        let source_dir = validate_required_field("batch.source_dir", &self.batch.source_dir)?;
        let dest_dir = validate_required_field("batch.dest_dir", &self.batch.dest_dir)?;
        Ok(BatchSettings {
            source_dir: source_dir.into(),
            dest_dir: dest_dir.into(),
            source_extension: self.batch.source_extension.clone(),
            target_extension: self.batch.target_extension.clone(),
            parallel: self.batch.parallel,
            max_concurrency: self.batch.max_concurrency,
        })
    }
}

impl ConfigProvider for MigrationConfig {
    fn skip_validation(&self) -> bool {
        self.pipeline.skip_validation
    }

    fn fail_on_warnings(&self) -> bool {
        self.pipeline.fail_on_warnings
    }

    fn render_config(&self) -> &RenderConfig {
        &self.render
    }
}

impl Validate for MigrationConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[pipeline]
skip_validation = true
fail_on_warnings = true

[render]
indent_width = 2
trailing_commas = false

[batch]
source_dir = "./arch"
dest_dir = "./generated"
parallel = false
max_concurrency = 2
"#;

        let config = MigrationConfig::from_toml_str(toml_content).unwrap();

        assert!(config.skip_validation());
        assert!(config.fail_on_warnings());
        assert_eq!(config.render.indent_width, 2);
        assert!(!config.render.trailing_commas);
        assert!(config.render.inline_value_classes);
        let settings = config.batch_settings().unwrap();
        assert!(!settings.parallel);
        assert_eq!(settings.target_extension, "kt");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = MigrationConfig::from_toml_str("").unwrap();
        assert_eq!(config, MigrationConfig::default());
        assert_eq!(config.render, RenderConfig::default());
        assert_eq!(config.batch.max_concurrency, 8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("ARCH_MIGRATE_TEST_SRC", "/tmp/arch");

        let toml_content = r#"
[batch]
source_dir = "${ARCH_MIGRATE_TEST_SRC}"
dest_dir = "${ARCH_MIGRATE_TEST_UNSET}"
"#;

        let config = MigrationConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.batch.source_dir.as_deref(), Some("/tmp/arch"));
        assert_eq!(config.batch.dest_dir.as_deref(), Some("${ARCH_MIGRATE_TEST_UNSET}"));

        std::env::remove_var("ARCH_MIGRATE_TEST_SRC");
    }

    #[test]
    fn test_config_validation() {
        let config = MigrationConfig::from_toml_str("[batch]\ntarget_extension = \".kt\"\n").unwrap();
        assert!(config.validate().is_err());

        let config = MigrationConfig::from_toml_str("[render]\nindent_width = 0\n").unwrap();
        assert!(config.validate().is_err());

        let config = MigrationConfig::from_toml_str("[pipeline]\nidentifier_pattern = \"(\"\n").unwrap();
        assert!(config.validate().is_err());

        assert!(MigrationConfig::from_toml_str("[batch]\nparallel = \"yes\"\n").is_err());
    }

    #[test]
    fn test_batch_settings_require_directories() {
        let config = MigrationConfig::from_toml_str("[batch]\nsource_dir = \"./arch\"\n").unwrap();
        let err = config.batch_settings().unwrap_err();
        assert!(err.to_string().contains("batch.dest_dir"));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[pipeline]\nfail_on_warnings = true\n")
            .unwrap();

        let config = MigrationConfig::from_file(temp_file.path()).unwrap();
        assert!(config.pipeline.fail_on_warnings);
    }
}

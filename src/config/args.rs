use crate::config::toml_config::MigrationConfig;
use crate::core::ConfigProvider;
use crate::render::RenderConfig;
use crate::utils::error::Result;
use crate::utils::validation::{validate_extension, validate_path, validate_range, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "arch-migrate")]
#[command(about = "Migrate one architecture document into Kotlin")]
pub struct CliConfig {
    /// Source document to migrate
    pub input: String,

    /// Output file; defaults to the input path with the target extension
    #[arg(short, long)]
    pub output: Option<String>,

    /// TOML settings file ([pipeline] and [render] sections)
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(long, help = "Do not run architecture validation")]
    pub skip_validation: bool,

    #[arg(long, help = "Treat validation warnings as errors")]
    pub fail_on_warnings: bool,

    #[arg(long)]
    pub indent_width: Option<usize>,

    #[arg(long)]
    pub no_trailing_commas: bool,

    #[arg(long, help = "Render single-field wrappers as data classes")]
    pub no_inline_value_classes: bool,

    #[arg(long, help = "Omit the package line and imports")]
    pub no_file_header: bool,

    #[arg(long, default_value = "kt")]
    pub target_extension: String,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log JSON lines to stderr")]
    pub log_json: bool,

    /// Identifier regex from the settings file, if any.
    #[arg(skip)]
    pub identifier_pattern: Option<String>,

    #[arg(skip)]
    #[serde(default)]
    render: RenderConfig,
}

impl CliConfig {
    /// Parses the command line and resolves it against the settings file.
    pub fn from_args() -> Result<Self> {
        Self::parse().resolve()
    }

    /// Folds the settings file (if any) and the layout flags into the final
    /// configuration. Flags only ever switch features on or off relative to
    /// the file.
    pub fn resolve(mut self) -> Result<Self> {
        let base = match &self.config {
            Some(path) => MigrationConfig::from_file(path)?,
            None => MigrationConfig::default(),
        };
        self.skip_validation |= base.pipeline.skip_validation;
        self.fail_on_warnings |= base.pipeline.fail_on_warnings;
        self.identifier_pattern = base.pipeline.identifier_pattern.clone();

        let mut render = base.render;
        if let Some(width) = self.indent_width {
            render.indent_width = width;
        }
        render.trailing_commas &= !self.no_trailing_commas;
        render.inline_value_classes &= !self.no_inline_value_classes;
        render.file_header &= !self.no_file_header;
        self.render = render;
        Ok(self)
    }

    /// Where the migrated file goes.
    pub fn output_path(&self) -> PathBuf {
        match &self.output {
            Some(output) => PathBuf::from(output),
            None => Path::new(&self.input).with_extension(&self.target_extension),
        }
    }
}

impl ConfigProvider for CliConfig {
    fn skip_validation(&self) -> bool {
        self.skip_validation
    }

    fn fail_on_warnings(&self) -> bool {
        self.fail_on_warnings
    }

    fn render_config(&self) -> &RenderConfig {
        &self.render
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("input", &self.input)?;
        if let Some(output) = &self.output {
            validate_path("output", output)?;
        }
        validate_extension("target_extension", &self.target_extension)?;
        validate_range("indent_width", self.render.indent_width, 1, 16)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(args: &[&str]) -> CliConfig {
        let mut argv = vec!["arch-migrate"];
        argv.extend_from_slice(args);
        CliConfig::try_parse_from(argv).unwrap().resolve().unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["arch/user.toml"]);
        assert!(!config.skip_validation());
        assert_eq!(config.render_config(), &RenderConfig::default());
        assert_eq!(config.output_path(), PathBuf::from("arch/user.kt"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_flags_override_layout() {
        let config = parse(&[
            "user.toml",
            "--output",
            "out/User.kt",
            "--indent-width",
            "2",
            "--no-trailing-commas",
            "--no-file-header",
            "--skip-validation",
        ]);
        assert!(config.skip_validation());
        assert_eq!(config.output_path(), PathBuf::from("out/User.kt"));
        let render = config.render_config();
        assert_eq!(render.indent_width, 2);
        assert!(!render.trailing_commas);
        assert!(!render.file_header);
        assert!(render.inline_value_classes);
    }

    #[test]
    fn test_settings_file_is_merged() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[pipeline]\nfail_on_warnings = true\nidentifier_pattern = \"^[a-zA-Z]+$\"\n[render]\nindent_width = 3\n")
            .unwrap();
        let path = file.path().to_string_lossy().into_owned();
        let config = parse(&["user.toml", "--config", &path]);
        assert!(config.fail_on_warnings());
        assert_eq!(config.render_config().indent_width, 3);
        assert_eq!(config.identifier_pattern.as_deref(), Some("^[a-zA-Z]+$"));
    }

    #[test]
    fn test_invalid_values() {
        assert!(parse(&["user.toml", "--indent-width", "0"]).validate().is_err());
        assert!(parse(&["user.toml", "--target-extension", ".kt"]).validate().is_err());
        assert!(CliConfig::try_parse_from(["arch-migrate"]).is_err());
    }
}

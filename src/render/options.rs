use serde::{Deserialize, Serialize};

fn default_indent_width() -> usize {
    4
}

fn default_true() -> bool {
    true
}

/// Layout switches for generated Kotlin. None of them change what the
/// generated code means.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    #[serde(default = "default_indent_width")]
    pub indent_width: usize,
    /// Put a comma after the last entry of multi-line parameter and enum lists.
    #[serde(default = "default_true")]
    pub trailing_commas: bool,
    /// Render single-field wrappers as `@JvmInline value class`.
    #[serde(default = "default_true")]
    pub inline_value_classes: bool,
    /// Emit the `package` line and imports at the top of a file.
    #[serde(default = "default_true")]
    pub file_header: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            indent_width: default_indent_width(),
            trailing_commas: true,
            inline_value_classes: true,
            file_header: true,
        }
    }
}

use crate::utils::error::{MigrationError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(MigrationError::InvalidConfigValue {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(MigrationError::InvalidConfigValue {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(MigrationError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

/// A file extension without the leading dot, e.g. `kt`.
pub fn validate_extension(field_name: &str, extension: &str) -> Result<()> {
    if extension.trim().is_empty() {
        return Err(MigrationError::InvalidConfigValue {
            field: field_name.to_string(),
            value: extension.to_string(),
            reason: "Extension cannot be empty".to_string(),
        });
    }

    if extension.starts_with('.') || extension.contains(['/', '\\']) {
        return Err(MigrationError::InvalidConfigValue {
            field: field_name.to_string(),
            value: extension.to_string(),
            reason: "Extension must be given without a leading dot or path separators".to_string(),
        });
    }

    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| MigrationError::MissingConfig {
        field: field_name.to_string(),
    })
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(MigrationError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("output", "./out").is_ok());
        assert!(validate_path("output", "").is_err());
        assert!(validate_path("output", "a\0b").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("batch.max_concurrency", 4, 1).is_ok());
        assert!(validate_positive_number("batch.max_concurrency", 0, 1).is_err());
    }

    #[test]
    fn test_validate_extension() {
        assert!(validate_extension("batch.target_extension", "kt").is_ok());
        assert!(validate_extension("batch.target_extension", ".kt").is_err());
        assert!(validate_extension("batch.target_extension", "").is_err());
        assert!(validate_extension("batch.target_extension", "a/b").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("render.indent_width", 4, 1, 8).is_ok());
        assert!(validate_range("render.indent_width", 0, 1, 8).is_err());
    }

    #[test]
    fn test_validate_required_field() {
        let present = Some("src".to_string());
        let missing: Option<String> = None;
        assert_eq!(validate_required_field("batch.source_dir", &present).unwrap(), "src");
        assert!(matches!(
            validate_required_field("batch.source_dir", &missing),
            Err(MigrationError::MissingConfig { .. })
        ));
    }
}

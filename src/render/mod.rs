//! Rendering engine: turns IR declarations into Kotlin source text.
//!
//! Rendering is pure and total over validated input. The same unit and
//! configuration always produce byte-identical output.

pub mod imports;
pub mod kotlin;
pub mod names;
pub mod options;
pub mod types;

pub use kotlin::{
    render_adapter, render_domain_model, render_port, render_service, render_unit, top_level_names,
    KotlinWriter, NOT_MIGRATED,
};
pub use options::RenderConfig;
pub use types::render_type;

use crate::domain::model::{DomainModel, ParseResult, Property};
use crate::utils::error::{MigrationError, Result};
use std::collections::HashSet;

/// A target-language backend.
pub trait Renderer: Send + Sync {
    /// Target language (e.g. "kotlin").
    fn language(&self) -> &'static str;

    /// File extension for generated code, without the dot.
    fn extension(&self) -> &'static str;

    /// Renders every declaration of a parsed unit into one source file.
    fn render_unit(&self, unit: &ParseResult) -> String;
}

#[derive(Debug, Clone, Default)]
pub struct KotlinRenderer {
    config: RenderConfig,
}

impl KotlinRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }
}

impl Renderer for KotlinRenderer {
    fn language(&self) -> &'static str {
        "kotlin"
    }

    fn extension(&self) -> &'static str {
        "kt"
    }

    fn render_unit(&self, unit: &ParseResult) -> String {
        kotlin::render_unit(unit, &self.config)
    }
}

fn first_duplicate<'a>(names: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    let mut seen = HashSet::new();
    names.into_iter().find(|name| !seen.insert(*name))
}

fn property_names(properties: &[Property]) -> impl Iterator<Item = &str> {
    properties.iter().map(|p| p.name.as_str())
}

fn broken(owner: &str, what: &str, name: &str) -> MigrationError {
    MigrationError::Render {
        message: format!("{} declares {} '{}' more than once", owner, what, name),
    }
}

/// Checks the invariants the writer assumes of its input. Validated units
/// always pass; a unit that skipped validation may not.
pub fn ensure_renderable(unit: &ParseResult) -> Result<()> {
    if let Some(name) = first_duplicate(top_level_names(unit)) {
        let owner = if unit.package.is_empty() {
            "the default package"
        } else {
            unit.package.as_str()
        };
        return Err(broken(owner, "top-level class", name));
    }
    for model in &unit.domain_models {
        let owner = model.qualified_name();
        match model {
            DomainModel::ValueObject { properties, .. } | DomainModel::Entity { properties, .. } => {
                if let Some(name) = first_duplicate(property_names(properties)) {
                    return Err(broken(&owner, "property", name));
                }
            }
            DomainModel::SealedHierarchy { subtypes, .. } => {
                for subtype in subtypes {
                    if let Some(name) = first_duplicate(property_names(&subtype.properties)) {
                        return Err(broken(&format!("{}.{}", owner, subtype.name), "property", name));
                    }
                }
            }
            DomainModel::Enum { values, .. } => {
                if let Some(name) = first_duplicate(values.iter().map(String::as_str)) {
                    return Err(broken(&owner, "value", name));
                }
            }
        }
    }
    for adapter in &unit.adapters {
        let params = adapter.constructor_parameters();
        if let Some(name) = first_duplicate(params.iter().map(|p| p.name.as_str())) {
            return Err(broken(&adapter.qualified_name(), "constructor parameter", name));
        }
    }
    for service in &unit.services {
        let params = service.constructor_parameters();
        if let Some(name) = first_duplicate(params.iter().map(|p| p.name.as_str())) {
            return Err(broken(&service.qualified_name(), "constructor parameter", name));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Parameter, PortDependency, Service, Subtype};
    use crate::domain::types::Type;
    use crate::utils::error::FailureKind;

    #[test]
    fn test_ensure_renderable_accepts_valid_unit() {
        let mut unit = ParseResult::new("com.acme");
        unit.domain_models.push(DomainModel::Entity {
            name: "User".to_string(),
            package: "com.acme".to_string(),
            type_params: vec![],
            properties: vec![
                Property::new("id", Type::string()),
                Property::new("name", Type::string()),
            ],
        });
        assert!(ensure_renderable(&unit).is_ok());
    }

    #[test]
    fn test_duplicate_property_is_render_failure() {
        let mut unit = ParseResult::new("com.acme");
        unit.domain_models.push(DomainModel::ValueObject {
            name: "Money".to_string(),
            package: "com.acme".to_string(),
            type_params: vec![],
            properties: vec![
                Property::new("amount", Type::string()),
                Property::new("amount", Type::string()),
            ],
            inline: false,
        });
        let err = ensure_renderable(&unit).unwrap_err();
        assert_eq!(err.kind(), FailureKind::RenderFailure);
        assert!(err.to_string().contains("com.acme.Money declares property 'amount'"));
    }

    #[test]
    fn test_duplicate_subtype_property_is_reported_with_path() {
        let mut unit = ParseResult::new("com.acme");
        unit.domain_models.push(DomainModel::SealedHierarchy {
            name: "Shape".to_string(),
            package: "com.acme".to_string(),
            type_params: vec![],
            subtypes: vec![Subtype::new(
                "Rect",
                vec![Property::new("w", Type::string()), Property::new("w", Type::string())],
            )],
        });
        let err = ensure_renderable(&unit).unwrap_err();
        assert!(err.to_string().contains("com.acme.Shape.Rect"));
    }

    #[test]
    fn test_service_parameter_clash_is_render_failure() {
        let mut unit = ParseResult::new("com.acme");
        unit.services.push(Service {
            name: "UserService".to_string(),
            package: "com.acme".to_string(),
            port_dependencies: vec![PortDependency::new(Type::named("UserRepository"), "users")],
            other_dependencies: vec![Parameter::new("users", Type::named("Cache"))],
            methods: vec![],
            annotations: vec![],
        });
        assert!(ensure_renderable(&unit).is_err());
    }

    #[test]
    fn test_kotlin_renderer_metadata() {
        let renderer = KotlinRenderer::default();
        assert_eq!(renderer.language(), "kotlin");
        assert_eq!(renderer.extension(), "kt");
        assert_eq!(renderer.config().indent_width, 4);
    }

    #[test]
    fn test_subtype_clashing_with_declaration_is_render_failure() {
        let mut unit = ParseResult::new("com.acme");
        unit.domain_models.push(DomainModel::Entity {
            name: "Success".to_string(),
            package: "com.acme".to_string(),
            type_params: vec![],
            properties: vec![],
        });
        unit.domain_models.push(DomainModel::SealedHierarchy {
            name: "Result".to_string(),
            package: "com.acme".to_string(),
            type_params: vec![],
            subtypes: vec![Subtype::new("Success", vec![])],
        });
        let err = ensure_renderable(&unit).unwrap_err();
        assert_eq!(err.kind(), FailureKind::RenderFailure);
        assert!(err
            .to_string()
            .contains("com.acme declares top-level class 'Success' more than once"));
    }

    #[test]
    fn test_duplicate_services_are_render_failure() {
        let service = Service {
            name: "S".to_string(),
            package: "com.acme".to_string(),
            port_dependencies: vec![],
            other_dependencies: vec![],
            methods: vec![],
            annotations: vec![],
        };
        let mut unit = ParseResult::new("");
        unit.services = vec![service.clone(), service];
        let err = ensure_renderable(&unit).unwrap_err();
        assert!(err.to_string().contains("the default package declares top-level class 'S'"));
    }
}

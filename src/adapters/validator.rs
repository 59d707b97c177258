use crate::domain::model::{DomainModel, Port, Property};
use crate::domain::ports::ArchitectureValidator;
use crate::domain::report::{ValidationIssue, ValidationResult, ValidationWarning};
use crate::utils::error::{MigrationError, Result};
use regex::Regex;
use std::collections::HashSet;

pub const DEFAULT_IDENTIFIER_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]*$";

pub const RULE_UNIQUE_PROPERTY_NAMES: &str = "unique-property-names";
pub const RULE_UNIQUE_DECLARATION_NAMES: &str = "unique-declaration-names";
pub const RULE_VALID_IDENTIFIER: &str = "valid-identifier";
pub const RULE_NON_EMPTY_ENUM: &str = "non-empty-enum";
pub const RULE_UNIQUE_ENUM_VALUES: &str = "unique-enum-values";
pub const RULE_UNIQUE_METHOD_SIGNATURE: &str = "unique-method-signature";

/// Structural rules every migrated unit has to satisfy.
#[derive(Debug, Clone)]
pub struct RuleValidator {
    identifier: Regex,
}

impl RuleValidator {
    pub fn new() -> Result<Self> {
        Self::with_identifier_pattern(DEFAULT_IDENTIFIER_PATTERN)
    }

    pub fn with_identifier_pattern(pattern: &str) -> Result<Self> {
        let identifier = Regex::new(pattern).map_err(|e| MigrationError::InvalidConfigValue {
            field: "identifier_pattern".to_string(),
            value: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { identifier })
    }
}

#[derive(Default)]
struct Findings {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationWarning>,
}

impl Findings {
    fn error(&mut self, rule: &str, message: String) {
        self.errors.push(ValidationIssue::new(rule, message));
    }

    fn warn(&mut self, message: String, suggestion: &str) {
        self.warnings
            .push(ValidationWarning::new(message).with_suggestion(suggestion));
    }
}

impl RuleValidator {
    fn check_identifier(&self, findings: &mut Findings, owner: &str, what: &str, name: &str) {
        if !self.identifier.is_match(name) {
            findings.error(
                RULE_VALID_IDENTIFIER,
                format!("{}: {} '{}' is not a valid identifier", owner, what, name),
            );
        }
    }

    fn check_properties(&self, findings: &mut Findings, owner: &str, properties: &[Property]) {
        let mut seen = HashSet::new();
        for property in properties {
            self.check_identifier(findings, owner, "property", &property.name);
            if !seen.insert(property.name.as_str()) {
                findings.error(
                    RULE_UNIQUE_PROPERTY_NAMES,
                    format!("{} declares property '{}' more than once", owner, property.name),
                );
            }
        }
    }

    fn check_model(&self, findings: &mut Findings, model: &DomainModel) {
        let owner = model.qualified_name();
        self.check_identifier(findings, &owner, model.kind(), model.name());
        match model {
            DomainModel::ValueObject {
                properties, inline, ..
            } => {
                self.check_properties(findings, &owner, properties);
                if *inline && properties.len() != 1 {
                    findings.warn(
                        format!(
                            "{} is marked inline but has {} properties",
                            owner,
                            properties.len()
                        ),
                        "Inline wrappers need exactly one property; it will render as a data class",
                    );
                } else if *inline && properties.iter().any(|p| !p.is_val) {
                    findings.warn(
                        format!("{} is marked inline but its property is mutable", owner),
                        "Value classes hold a read-only property; it will render as a data class",
                    );
                }
            }
            DomainModel::Entity { properties, .. } => self.check_properties(findings, &owner, properties),
            DomainModel::SealedHierarchy { subtypes, .. } => {
                if subtypes.is_empty() {
                    findings.warn(
                        format!("Sealed hierarchy {} has no subtypes", owner),
                        "Add at least one subtype or model it as a plain type",
                    );
                }
                for subtype in subtypes {
                    let path = format!("{}.{}", owner, subtype.name);
                    self.check_identifier(findings, &owner, "subtype", &subtype.name);
                    self.check_properties(findings, &path, &subtype.properties);
                }
            }
            DomainModel::Enum { values, .. } => {
                if values.is_empty() {
                    findings.error(RULE_NON_EMPTY_ENUM, format!("Enum {} has no values", owner));
                }
                let mut seen = HashSet::new();
                for value in values {
                    self.check_identifier(findings, &owner, "enum value", value);
                    if !seen.insert(value.as_str()) {
                        findings.error(
                            RULE_UNIQUE_ENUM_VALUES,
                            format!("Enum {} lists '{}' more than once", owner, value),
                        );
                    }
                }
            }
        }
    }

    fn check_port(&self, findings: &mut Findings, port: &Port) {
        let owner = port.qualified_name();
        self.check_identifier(findings, &owner, "port", &port.name);
        if port.methods.is_empty() {
            findings.warn(
                format!("Port {} has no methods", owner),
                "Add the operations the port exposes, or remove it",
            );
        }
        let mut signatures = HashSet::new();
        for method in &port.methods {
            self.check_identifier(findings, &owner, "method", &method.name);
            for param in &method.params {
                self.check_identifier(findings, &format!("{}.{}", owner, method.name), "parameter", &param.name);
            }
            let param_types: Vec<String> = method.params.iter().map(|p| p.ty.to_string()).collect();
            let signature = format!("{}({})", method.name, param_types.join(", "));
            if !signatures.insert(signature.clone()) {
                findings.error(
                    RULE_UNIQUE_METHOD_SIGNATURE,
                    format!("{} declares {} more than once", owner, signature),
                );
            }
        }
    }
}

impl ArchitectureValidator for RuleValidator {
    fn validate(&self, domain_models: &[DomainModel], ports: &[Port]) -> ValidationResult {
        let mut findings = Findings::default();
        // Sealed subtypes are top-level classes in the output, so they share
        // the namespace of every other declaration.
        let mut declared = HashSet::new();
        let names = domain_models
            .iter()
            .flat_map(DomainModel::declared_names)
            .chain(ports.iter().map(Port::qualified_name));
        for name in names {
            if !declared.insert(name.clone()) {
                findings.error(
                    RULE_UNIQUE_DECLARATION_NAMES,
                    format!("{} is declared more than once", name),
                );
            }
        }
        for model in domain_models {
            self.check_model(&mut findings, model);
        }
        for port in ports {
            self.check_port(&mut findings, port);
        }
        tracing::debug!(
            "🔍 Validation finished: {} error(s), {} warning(s)",
            findings.errors.len(),
            findings.warnings.len()
        );
        ValidationResult::from_findings(findings.errors, findings.warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Method, Parameter, PortType, Subtype};
    use crate::domain::types::Type;

    fn validator() -> RuleValidator {
        RuleValidator::new().unwrap()
    }

    fn rules(result: &ValidationResult) -> Vec<&str> {
        result.errors.iter().map(|e| e.rule.as_str()).collect()
    }

    fn entity(name: &str, properties: Vec<Property>) -> DomainModel {
        DomainModel::Entity {
            name: name.to_string(),
            package: "com.acme".to_string(),
            type_params: vec![],
            properties,
        }
    }

    fn find_by_id() -> Method {
        Method::new(
            "findById",
            vec![Parameter::new("id", Type::string())],
            Type::named("User").make_nullable(),
        )
    }

    #[test]
    fn test_clean_unit_is_valid() {
        let models = vec![entity("User", vec![Property::new("id", Type::string())])];
        let ports = vec![Port::new("UserRepository", "com.acme", PortType::Repository).with_method(find_by_id())];
        let result = validator().validate(&models, &ports);
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        assert!(!result.has_warnings());
    }

    #[test]
    fn test_duplicate_property() {
        let models = vec![entity(
            "User",
            vec![Property::new("id", Type::string()), Property::new("id", Type::string())],
        )];
        let result = validator().validate(&models, &[]);
        assert!(!result.is_valid);
        assert_eq!(rules(&result), vec![RULE_UNIQUE_PROPERTY_NAMES]);
    }

    #[test]
    fn test_duplicate_declarations_and_identifiers() {
        let models = vec![
            entity("User", vec![]),
            entity("User", vec![Property::new("first-name", Type::string())]),
        ];
        let result = validator().validate(&models, &[]);
        assert_eq!(
            rules(&result),
            vec![RULE_UNIQUE_DECLARATION_NAMES, RULE_VALID_IDENTIFIER]
        );
    }

    #[test]
    fn test_enum_rules() {
        let models = vec![
            DomainModel::Enum {
                name: "Empty".to_string(),
                package: "com.acme".to_string(),
                values: vec![],
            },
            DomainModel::Enum {
                name: "Role".to_string(),
                package: "com.acme".to_string(),
                values: vec!["Admin".to_string(), "Admin".to_string()],
            },
        ];
        let result = validator().validate(&models, &[]);
        assert_eq!(rules(&result), vec![RULE_NON_EMPTY_ENUM, RULE_UNIQUE_ENUM_VALUES]);
    }

    #[test]
    fn test_overloads_are_allowed_but_duplicates_are_not() {
        let overload = Method::new(
            "findById",
            vec![Parameter::new("id", Type::named("UUID"))],
            Type::named("User").make_nullable(),
        );
        let ports = vec![Port::new("UserRepository", "com.acme", PortType::Repository)
            .with_method(find_by_id())
            .with_method(overload)];
        assert!(validator().validate(&[], &ports).is_valid);

        let ports = vec![Port::new("UserRepository", "com.acme", PortType::Repository)
            .with_method(find_by_id())
            .with_method(find_by_id())];
        let result = validator().validate(&[], &ports);
        assert_eq!(rules(&result), vec![RULE_UNIQUE_METHOD_SIGNATURE]);
        assert!(result.errors[0].message.contains("findById(String)"));
    }

    #[test]
    fn test_warnings_do_not_invalidate() {
        let models = vec![
            DomainModel::SealedHierarchy {
                name: "Shape".to_string(),
                package: "com.acme".to_string(),
                type_params: vec![],
                subtypes: vec![],
            },
            DomainModel::ValueObject {
                name: "Money".to_string(),
                package: "com.acme".to_string(),
                type_params: vec![],
                properties: vec![
                    Property::new("amount", Type::named("BigDecimal")),
                    Property::new("currency", Type::named("Currency")),
                ],
                inline: true,
            },
        ];
        let ports = vec![Port::new("Empty", "com.acme", PortType::Generic)];
        let result = validator().validate(&models, &ports);
        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 3);
        assert!(result.warnings.iter().all(|w| w.suggestion.is_some()));
        assert!(result.warnings[2].message.contains("Port com.acme.Empty has no methods"));
    }

    #[test]
    fn test_duplicate_subtypes() {
        let models = vec![DomainModel::SealedHierarchy {
            name: "Shape".to_string(),
            package: "com.acme".to_string(),
            type_params: vec![],
            subtypes: vec![Subtype::new("Circle", vec![]), Subtype::new("Circle", vec![])],
        }];
        let result = validator().validate(&models, &[]);
        assert_eq!(rules(&result), vec![RULE_UNIQUE_DECLARATION_NAMES]);
    }

    #[test]
    fn test_custom_identifier_pattern() {
        let strict = RuleValidator::with_identifier_pattern(r"^[A-Z][A-Za-z0-9]*$").unwrap();
        let models = vec![entity("user", vec![])];
        let result = strict.validate(&models, &[]);
        assert_eq!(rules(&result), vec![RULE_VALID_IDENTIFIER]);

        assert!(RuleValidator::with_identifier_pattern("(").is_err());
    }

    #[test]
    fn test_subtype_clashing_with_declaration() {
        let models = vec![
            entity("Success", vec![]),
            DomainModel::SealedHierarchy {
                name: "Result".to_string(),
                package: "com.acme".to_string(),
                type_params: vec![],
                subtypes: vec![Subtype::new("Success", vec![])],
            },
        ];
        let result = validator().validate(&models, &[]);
        assert!(!result.is_valid);
        assert_eq!(rules(&result), vec![RULE_UNIQUE_DECLARATION_NAMES]);
        assert!(result.errors[0].message.contains("com.acme.Success is declared more than once"));
    }

    #[test]
    fn test_mutable_inline_wrapper_warns() {
        let models = vec![DomainModel::ValueObject {
            name: "Counter".to_string(),
            package: "com.acme".to_string(),
            type_params: vec![],
            properties: vec![Property::new("n", Type::string()).mutable()],
            inline: true,
        }];
        let result = validator().validate(&models, &[]);
        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].message.contains("property is mutable"));
    }
}

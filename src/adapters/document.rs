//! IR documents: one TOML file per source unit, listing its declarations.
//! Type fields are written in source-language syntax and parsed by
//! [`crate::adapters::type_syntax`].

use crate::adapters::type_syntax::{declared_names, parse_type, parse_type_parameter, TypeSyntaxError};
use crate::domain::model::{
    AdapterType, DomainModel, InfrastructureCategory, InfrastructureDependency, Method, Parameter,
    ParseResult, Port, PortDependency, PortImplementation, PortType, Property, Service, Subtype,
    Visibility,
};
use crate::domain::ports::SourceParser;
use crate::domain::report::{ParseError, SourceLocation};
use crate::domain::types::{Type, TypeParameter};
use serde::Deserialize;
use toml::Spanned;

type TypeText = Spanned<String>;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DocumentDto {
    #[serde(default)]
    package: String,
    #[serde(default)]
    value_objects: Vec<RecordDto>,
    #[serde(default)]
    entities: Vec<RecordDto>,
    #[serde(default)]
    sealed: Vec<SealedDto>,
    #[serde(default)]
    enums: Vec<EnumDto>,
    #[serde(default)]
    ports: Vec<PortDto>,
    #[serde(default)]
    adapters: Vec<AdapterDto>,
    #[serde(default)]
    services: Vec<ServiceDto>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PropertyDto {
    name: String,
    #[serde(rename = "type")]
    ty: TypeText,
    #[serde(default)]
    mutable: bool,
    default: Option<String>,
    doc: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RecordDto {
    name: String,
    package: Option<String>,
    #[serde(default)]
    type_params: Vec<TypeText>,
    #[serde(default)]
    properties: Vec<PropertyDto>,
    #[serde(default)]
    inline: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SubtypeDto {
    name: String,
    #[serde(default)]
    properties: Vec<PropertyDto>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SealedDto {
    name: String,
    package: Option<String>,
    #[serde(default)]
    type_params: Vec<TypeText>,
    #[serde(default)]
    subtypes: Vec<SubtypeDto>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EnumDto {
    name: String,
    package: Option<String>,
    #[serde(default)]
    values: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ParamDto {
    name: String,
    #[serde(rename = "type")]
    ty: TypeText,
    default: Option<String>,
}

#[derive(Debug, Default, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum VisibilityDto {
    #[default]
    Public,
    Protected,
    Private,
    Internal,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MethodDto {
    name: String,
    #[serde(default)]
    type_params: Vec<TypeText>,
    #[serde(default)]
    params: Vec<ParamDto>,
    returns: Option<TypeText>,
    #[serde(default)]
    visibility: VisibilityDto,
    #[serde(rename = "abstract", default = "default_abstract")]
    is_abstract: bool,
    #[serde(default)]
    suspend: bool,
    #[serde(default)]
    annotations: Vec<String>,
    doc: Option<String>,
    body: Option<String>,
}

fn default_abstract() -> bool {
    true
}

#[derive(Debug, Default, Clone, Copy, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum PortKindDto {
    Repository,
    Service,
    UseCase,
    EventHandler,
    #[default]
    Generic,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PortDto {
    name: String,
    package: Option<String>,
    #[serde(default)]
    kind: PortKindDto,
    #[serde(default)]
    type_params: Vec<TypeText>,
    #[serde(default)]
    extends: Vec<TypeText>,
    #[serde(default)]
    methods: Vec<MethodDto>,
}

#[derive(Debug, Default, Clone, Copy, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum CategoryDto {
    Database,
    MessageQueue,
    Http,
    #[default]
    Generic,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct InfrastructureDto {
    name: String,
    #[serde(rename = "type")]
    ty: TypeText,
    #[serde(default)]
    category: CategoryDto,
}

#[derive(Debug, Default, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum AdapterKindDto {
    Persistence,
    Messaging,
    Rest,
    Event,
    #[default]
    Generic,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AdapterDto {
    name: String,
    package: Option<String>,
    implements: TypeText,
    #[serde(default)]
    kind: AdapterKindDto,
    #[serde(default)]
    infrastructure: Vec<InfrastructureDto>,
    #[serde(default)]
    dependencies: Vec<ParamDto>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PortDependencyDto {
    name: String,
    #[serde(rename = "type")]
    ty: TypeText,
    doc: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ServiceDto {
    name: String,
    package: Option<String>,
    #[serde(default)]
    ports: Vec<PortDependencyDto>,
    #[serde(default)]
    dependencies: Vec<ParamDto>,
    #[serde(default)]
    methods: Vec<MethodDto>,
    #[serde(default)]
    annotations: Vec<String>,
}

impl From<VisibilityDto> for Visibility {
    fn from(v: VisibilityDto) -> Self {
        match v {
            VisibilityDto::Public => Visibility::Public,
            VisibilityDto::Protected => Visibility::Protected,
            VisibilityDto::Private => Visibility::Private,
            VisibilityDto::Internal => Visibility::Internal,
        }
    }
}

impl From<PortKindDto> for PortType {
    fn from(k: PortKindDto) -> Self {
        match k {
            PortKindDto::Repository => PortType::Repository,
            PortKindDto::Service => PortType::Service,
            PortKindDto::UseCase => PortType::UseCase,
            PortKindDto::EventHandler => PortType::EventHandler,
            PortKindDto::Generic => PortType::Generic,
        }
    }
}

impl From<CategoryDto> for InfrastructureCategory {
    fn from(c: CategoryDto) -> Self {
        match c {
            CategoryDto::Database => InfrastructureCategory::Database,
            CategoryDto::MessageQueue => InfrastructureCategory::MessageQueue,
            CategoryDto::Http => InfrastructureCategory::Http,
            CategoryDto::Generic => InfrastructureCategory::Generic,
        }
    }
}

impl From<AdapterKindDto> for AdapterType {
    fn from(k: AdapterKindDto) -> Self {
        match k {
            AdapterKindDto::Persistence => AdapterType::Persistence,
            AdapterKindDto::Messaging => AdapterType::Messaging,
            AdapterKindDto::Rest => AdapterType::Rest,
            AdapterKindDto::Event => AdapterType::Event,
            AdapterKindDto::Generic => AdapterType::Generic,
        }
    }
}

/// 1-based line and column of a byte offset.
fn line_column(content: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(content.len());
    let before = content.get(..offset).unwrap_or(content);
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

/// Byte offset within a raw TOML string token of the 1-based character
/// `column` of its decoded value. Handles every quoting style and the
/// escapes of basic strings.
fn value_offset(raw: &str, column: usize) -> usize {
    let target = column.saturating_sub(1);
    let triple = raw.starts_with("\"\"\"") || raw.starts_with("'''");
    let literal = raw.starts_with('\'');
    let delimiter = if triple { 3 } else { 1 };
    let mut start = delimiter.min(raw.len());
    if triple {
        let rest = raw.get(start..).unwrap_or("");
        if rest.starts_with("\r\n") {
            start += 2;
        } else if rest.starts_with('\n') {
            start += 1;
        }
    }
    let body = raw.get(start..).unwrap_or("");

    let mut i = 0;
    let mut decoded = 0;
    while let Some(rest) = body.get(i..).filter(|r| !r.is_empty()) {
        if decoded == target {
            return start + i;
        }
        let mut produces_char = true;
        let step = match rest.strip_prefix('\\') {
            Some(escaped) if !literal => match escaped.chars().next() {
                Some('u') => 6,
                Some('U') => 10,
                Some(c) if c.is_whitespace() => {
                    // Line-ending backslash: trims through the next non-blank.
                    produces_char = false;
                    1 + escaped.len() - escaped.trim_start().len()
                }
                _ => 2,
            },
            _ => rest.chars().next().map_or(1, char::len_utf8),
        };
        i += step.min(rest.len());
        if produces_char {
            decoded += 1;
        }
    }
    start + body.len()
}

/// Converts deserialized DTOs into IR declarations, resolving type text
/// and reporting errors at their position in the document.
struct Converter<'a> {
    file: &'a str,
    content: &'a str,
    package: &'a str,
}

impl<'a> Converter<'a> {
    fn location(&self, offset: usize) -> SourceLocation {
        let (line, column) = line_column(self.content, offset);
        SourceLocation::new(self.file, line, column)
    }

    fn syntax_error(&self, text: &TypeText, path: &str, err: TypeSyntaxError) -> ParseError {
        let span = text.span();
        let raw = self.content.get(span.start..span.end).unwrap_or("");
        let offset = span.start + value_offset(raw, err.column);
        ParseError::new(format!("{}: {}", path, err)).at(self.location(offset))
    }

    fn package(&self, own: &Option<String>) -> String {
        own.clone().unwrap_or_else(|| self.package.to_string())
    }

    fn ty(&self, text: &TypeText, scope: &[String], path: &str) -> Result<Type, ParseError> {
        parse_type(text.get_ref(), scope).map_err(|e| self.syntax_error(text, path, e))
    }

    fn type_params(
        &self,
        declarations: &[TypeText],
        outer: &[String],
        path: &str,
    ) -> Result<(Vec<TypeParameter>, Vec<String>), ParseError> {
        let texts: Vec<String> = declarations.iter().map(|d| d.get_ref().clone()).collect();
        let mut scope = outer.to_vec();
        scope.extend(declared_names(&texts));
        let params = declarations
            .iter()
            .enumerate()
            .map(|(i, d)| {
                parse_type_parameter(d.get_ref(), &scope)
                    .map_err(|e| self.syntax_error(d, &format!("{}.type_params[{}]", path, i), e))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok((params, scope))
    }

    fn properties(
        &self,
        dtos: &[PropertyDto],
        scope: &[String],
        path: &str,
    ) -> Result<Vec<Property>, ParseError> {
        dtos.iter()
            .enumerate()
            .map(|(i, p)| {
                let ty = self.ty(&p.ty, scope, &format!("{}.properties[{}].type", path, i))?;
                Ok(Property {
                    name: p.name.clone(),
                    ty,
                    is_val: !p.mutable,
                    default: p.default.clone(),
                    documentation: p.doc.clone(),
                })
            })
            .collect()
    }

    fn parameters(&self, dtos: &[ParamDto], scope: &[String], path: &str) -> Result<Vec<Parameter>, ParseError> {
        dtos.iter()
            .enumerate()
            .map(|(i, p)| {
                let ty = self.ty(&p.ty, scope, &format!("{}[{}].type", path, i))?;
                Ok(Parameter {
                    name: p.name.clone(),
                    ty,
                    default: p.default.clone(),
                })
            })
            .collect()
    }

    fn methods(&self, dtos: &[MethodDto], outer: &[String], path: &str) -> Result<Vec<Method>, ParseError> {
        dtos.iter()
            .enumerate()
            .map(|(i, m)| {
                let path = format!("{}.methods[{}]", path, i);
                let (type_params, scope) = self.type_params(&m.type_params, outer, &path)?;
                let params = self.parameters(&m.params, &scope, &format!("{}.params", path))?;
                let return_type = match &m.returns {
                    Some(text) => self.ty(text, &scope, &format!("{}.returns", path))?,
                    None => Type::unit(),
                };
                Ok(Method {
                    name: m.name.clone(),
                    type_params,
                    params,
                    return_type,
                    visibility: m.visibility.into(),
                    is_abstract: m.is_abstract,
                    is_suspend: m.suspend,
                    annotations: m.annotations.clone(),
                    documentation: m.doc.clone(),
                    body: m.body.clone(),
                })
            })
            .collect()
    }

    fn record(&self, dto: &RecordDto, path: &str, value_object: bool) -> Result<DomainModel, ParseError> {
        let (type_params, scope) = self.type_params(&dto.type_params, &[], path)?;
        let properties = self.properties(&dto.properties, &scope, path)?;
        let name = dto.name.clone();
        let package = self.package(&dto.package);
        Ok(if value_object {
            DomainModel::ValueObject {
                name,
                package,
                type_params,
                properties,
                inline: dto.inline,
            }
        } else {
            DomainModel::Entity {
                name,
                package,
                type_params,
                properties,
            }
        })
    }

    fn sealed(&self, dto: &SealedDto, path: &str) -> Result<DomainModel, ParseError> {
        let (type_params, scope) = self.type_params(&dto.type_params, &[], path)?;
        let subtypes = dto
            .subtypes
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let properties = self.properties(&s.properties, &scope, &format!("{}.subtypes[{}]", path, i))?;
                Ok(Subtype::new(s.name.clone(), properties))
            })
            .collect::<Result<Vec<_>, ParseError>>()?;
        Ok(DomainModel::SealedHierarchy {
            name: dto.name.clone(),
            package: self.package(&dto.package),
            type_params,
            subtypes,
        })
    }

    fn port(&self, dto: &PortDto, path: &str) -> Result<Port, ParseError> {
        let (type_params, scope) = self.type_params(&dto.type_params, &[], path)?;
        let super_types = dto
            .extends
            .iter()
            .enumerate()
            .map(|(i, t)| self.ty(t, &scope, &format!("{}.extends[{}]", path, i)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Port {
            name: dto.name.clone(),
            package: self.package(&dto.package),
            type_params,
            methods: self.methods(&dto.methods, &scope, path)?,
            super_types,
            port_type: dto.kind.into(),
        })
    }

    fn adapter(&self, dto: &AdapterDto, path: &str) -> Result<PortImplementation, ParseError> {
        let implements = self.ty(&dto.implements, &[], &format!("{}.implements", path))?;
        let infrastructure = dto
            .infrastructure
            .iter()
            .enumerate()
            .map(|(i, d)| {
                let ty = self.ty(&d.ty, &[], &format!("{}.infrastructure[{}].type", path, i))?;
                Ok(InfrastructureDependency::new(d.category.into(), d.name.clone(), ty))
            })
            .collect::<Result<Vec<_>, ParseError>>()?;
        Ok(PortImplementation {
            name: dto.name.clone(),
            package: self.package(&dto.package),
            implements,
            infrastructure,
            other_dependencies: self.parameters(&dto.dependencies, &[], &format!("{}.dependencies", path))?,
            adapter_type: dto.kind.into(),
        })
    }

    fn service(&self, dto: &ServiceDto, path: &str) -> Result<Service, ParseError> {
        let port_dependencies = dto
            .ports
            .iter()
            .enumerate()
            .map(|(i, d)| {
                let port = self.ty(&d.ty, &[], &format!("{}.ports[{}].type", path, i))?;
                Ok(PortDependency {
                    port,
                    parameter_name: d.name.clone(),
                    documentation: d.doc.clone(),
                })
            })
            .collect::<Result<Vec<_>, ParseError>>()?;
        Ok(Service {
            name: dto.name.clone(),
            package: self.package(&dto.package),
            port_dependencies,
            other_dependencies: self.parameters(&dto.dependencies, &[], &format!("{}.dependencies", path))?,
            methods: self.methods(&dto.methods, &[], path)?,
            annotations: dto.annotations.clone(),
        })
    }

    fn convert(&self, doc: &DocumentDto) -> Result<ParseResult, ParseError> {
        let mut unit = ParseResult::new(self.package);
        for (i, dto) in doc.value_objects.iter().enumerate() {
            unit.domain_models
                .push(self.record(dto, &format!("value_objects[{}]", i), true)?);
        }
        for (i, dto) in doc.entities.iter().enumerate() {
            unit.domain_models
                .push(self.record(dto, &format!("entities[{}]", i), false)?);
        }
        for (i, dto) in doc.sealed.iter().enumerate() {
            unit.domain_models.push(self.sealed(dto, &format!("sealed[{}]", i))?);
        }
        for dto in &doc.enums {
            unit.domain_models.push(DomainModel::Enum {
                name: dto.name.clone(),
                package: self.package(&dto.package),
                values: dto.values.clone(),
            });
        }
        for (i, dto) in doc.ports.iter().enumerate() {
            unit.ports.push(self.port(dto, &format!("ports[{}]", i))?);
        }
        for (i, dto) in doc.adapters.iter().enumerate() {
            unit.adapters.push(self.adapter(dto, &format!("adapters[{}]", i))?);
        }
        for (i, dto) in doc.services.iter().enumerate() {
            unit.services.push(self.service(dto, &format!("services[{}]", i))?);
        }
        Ok(unit)
    }
}

/// Reads IR documents. Declarations come out grouped by kind in document
/// order: value objects, entities, sealed hierarchies, enums, then ports,
/// adapters and services.
#[derive(Debug, Clone, Copy, Default)]
pub struct IrDocumentParser;

impl IrDocumentParser {
    pub fn new() -> Self {
        Self
    }
}

impl SourceParser for IrDocumentParser {
    fn parse(&self, path: &str, content: &str) -> Result<ParseResult, ParseError> {
        let doc: DocumentDto = toml::from_str(content).map_err(|e| {
            let error = ParseError::new(e.message().trim().to_string());
            match e.span() {
                Some(span) => {
                    let (line, column) = line_column(content, span.start);
                    error.at(SourceLocation::new(path, line, column))
                }
                None => error.at(SourceLocation::start_of(path)),
            }
        })?;
        let converter = Converter {
            file: path,
            content,
            package: &doc.package,
        };
        let unit = converter.convert(&doc)?;
        tracing::debug!(
            "📄 Parsed {} declaration(s) from {}",
            unit.declaration_count(),
            path
        );
        Ok(unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::PrimitiveType;

    const USERS: &str = r#"
package = "com.acme.users"

[[value_objects]]
name = "UserId"
inline = true
properties = [{ name = "value", type = "UUID" }]

[[entities]]
name = "User"
properties = [
  { name = "id", type = "UserId" },
  { name = "email", type = "Option[String]", mutable = true, doc = "Primary address" },
]

[[sealed]]
name = "LoginResult"
[[sealed.subtypes]]
name = "Success"
properties = [{ name = "user", type = "User" }]
[[sealed.subtypes]]
name = "Locked"

[[enums]]
name = "Role"
values = ["Admin", "Member"]

[[ports]]
name = "UserRepository"
kind = "repository"
[[ports.methods]]
name = "findById"
params = [{ name = "id", type = "String" }]
returns = "IO[Option[User]]"
[[ports.methods]]
name = "delete"
params = [{ name = "id", type = "UserId" }]
returns = "IO[Unit]"

[[adapters]]
name = "SqlUserRepository"
implements = "UserRepository"
kind = "persistence"
infrastructure = [{ name = "dataSource", type = "javax.sql.DataSource", category = "database" }]

[[services]]
name = "UserService"
ports = [{ name = "users", type = "UserRepository" }]
dependencies = [{ name = "clock", type = "java.time.Clock" }]
[[services.methods]]
name = "register"
params = [{ name = "email", type = "String" }]
returns = "Task[User]"
"#;

    #[test]
    fn test_parse_full_document() {
        let unit = IrDocumentParser::new().parse("users.toml", USERS).unwrap();
        assert_eq!(unit.package, "com.acme.users");
        assert_eq!(unit.declaration_count(), 7);

        let names: Vec<&str> = unit.domain_models.iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["UserId", "User", "LoginResult", "Role"]);
        match &unit.domain_models[1] {
            DomainModel::Entity { properties, .. } => {
                assert_eq!(properties[1].ty, Type::string().make_nullable());
                assert!(!properties[1].is_val);
                assert_eq!(properties[1].documentation.as_deref(), Some("Primary address"));
            }
            other => panic!("expected entity, got {:?}", other),
        }

        let port = &unit.ports[0];
        assert_eq!(port.port_type, PortType::Repository);
        assert_eq!(
            port.methods[0].return_type,
            Type::generic("IO", vec![Type::named("User").make_nullable()])
        );
        assert_eq!(unit.adapters[0].infrastructure[0].category, InfrastructureCategory::Database);
        assert_eq!(unit.services[0].constructor_parameters()[1].name, "clock");
    }

    #[test]
    fn test_generic_declarations_resolve_type_parameters() {
        let doc = r#"
package = "com.acme"

[[ports]]
name = "Repository"
type_params = ["T <: Entity", "ID"]
[[ports.methods]]
name = "save"
params = [{ name = "entity", type = "T" }]
returns = "IO[ID]"
[[ports.methods]]
name = "max"
type_params = ["R <: Comparable[R]"]
params = [{ name = "items", type = "List[R]" }]
returns = "Option[R]"
"#;
        let unit = IrDocumentParser::new().parse("repo.toml", doc).unwrap();
        let port = &unit.ports[0];
        assert_eq!(port.type_params[0].bounds, vec![Type::named("Entity")]);
        assert_eq!(port.methods[0].params[0].ty, Type::parameter("T"));
        assert_eq!(
            port.methods[0].return_type,
            Type::generic("IO", vec![Type::parameter("ID")])
        );
        assert_eq!(port.methods[1].return_type, Type::parameter("R").make_nullable());
    }

    #[test]
    fn test_missing_returns_is_unit_and_defaults_apply() {
        let doc = r#"
[[ports]]
name = "Audit"
[[ports.methods]]
name = "record"
visibility = "internal"
abstract = false
params = [{ name = "count", type = "Int", default = "0" }]
"#;
        let unit = IrDocumentParser::new().parse("audit.toml", doc).unwrap();
        let method = &unit.ports[0].methods[0];
        assert_eq!(method.return_type, Type::unit());
        assert_eq!(method.visibility, Visibility::Internal);
        assert!(!method.is_abstract);
        assert_eq!(method.params[0].ty, Type::primitive(PrimitiveType::Int));
        assert_eq!(method.params[0].default.as_deref(), Some("0"));
        assert_eq!(unit.ports[0].port_type, PortType::Generic);
    }

    #[test]
    fn test_toml_error_has_location() {
        let doc = "package = \"com.acme\"\n[[entities]]\nname = \n";
        let err = IrDocumentParser::new().parse("broken.toml", doc).unwrap_err();
        let location = err.location.unwrap();
        assert_eq!(location.file, "broken.toml");
        assert_eq!(location.line, 3);
    }

    #[test]
    fn test_type_syntax_error_points_into_value() {
        let doc = "package = \"com.acme\"\n[[entities]]\nname = \"User\"\nproperties = [{ name = \"id\", type = \"List[UUID\" }]\n";
        let err = IrDocumentParser::new().parse("user.toml", doc).unwrap_err();
        assert!(err.message.starts_with("entities[0].properties[0].type:"));
        let location = err.location.unwrap();
        assert_eq!(location.line, 4);
        // Column of the end of the value, where ']' was expected.
        let value_start = doc.lines().nth(3).unwrap().find("List").unwrap() + 1;
        assert_eq!(location.column, value_start + "List[UUID".len());
    }

    #[test]
    fn test_type_syntax_error_after_multibyte_text() {
        let doc = "[[entities]]\nname = \"Box\"\nproperties = [{ name = \"size\", type = \"Größe#x\" }]\n";
        let err = IrDocumentParser::new().parse("box.toml", doc).unwrap_err();
        let location = err.location.unwrap();
        let line = doc.lines().nth(2).unwrap();
        // Columns count characters, so the byte index of the value is converted first.
        let value_start = line[..line.find("Größe").unwrap()].chars().count() + 1;
        assert_eq!(location.line, 3);
        assert_eq!(location.column, value_start + "Größe".chars().count());
    }

    #[test]
    fn test_type_syntax_error_after_escape() {
        let doc = r#"[[entities]]
name = "User"
properties = [{ name = "ids", type = "List[\u0055ser" }]
"#;
        let err = IrDocumentParser::new().parse("user.toml", doc).unwrap_err();
        let location = err.location.unwrap();
        let line = doc.lines().nth(2).unwrap();
        assert_eq!(location.line, 3);
        assert_eq!(location.column, line.find("List").unwrap() + 1 + r"List[\u0055ser".len());
    }

    #[test]
    fn test_type_syntax_error_in_triple_quoted_value() {
        let doc = "[[entities]]\nname = \"User\"\nproperties = [{ name = \"ids\", type = \"\"\"List[UUID\"\"\" }]\n";
        let err = IrDocumentParser::new().parse("user.toml", doc).unwrap_err();
        let location = err.location.unwrap();
        let line = doc.lines().nth(2).unwrap();
        assert_eq!(location.column, line.find("List").unwrap() + 1 + "List[UUID".len());
    }

    #[test]
    fn test_value_offset() {
        assert_eq!(value_offset("\"ab\"", 1), 1);
        assert_eq!(value_offset("\"éb\"", 2), 3);
        assert_eq!(value_offset(r#""\tb""#, 2), 3);
        assert_eq!(value_offset("'''\nab'''", 2), 5);
        assert_eq!(value_offset(r"'\tb'", 2), 2);
        assert_eq!(value_offset("\"ab\"", 9), 4);
        assert_eq!(value_offset("", 3), 0);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let doc = "[[entities]]\nname = \"User\"\ncolour = \"blue\"\n";
        assert!(IrDocumentParser::new().parse("user.toml", doc).is_err());
    }

    #[test]
    fn test_line_column() {
        let text = "ab\ncdé\nf";
        assert_eq!(line_column(text, 0), (1, 1));
        assert_eq!(line_column(text, 3), (2, 1));
        assert_eq!(line_column(text, 5), (2, 3));
        assert_eq!(line_column(text, text.len()), (3, 2));
    }
}

use crate::domain::types::{Type, TypeParameter};
use std::collections::BTreeMap;

fn qualify(package: &str, name: &str) -> String {
    if package.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", package, name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub ty: Type,
    /// `true` for read-only (`val`) properties.
    pub is_val: bool,
    pub default: Option<String>,
    pub documentation: Option<String>,
}

impl Property {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            is_val: true,
            default: None,
            documentation: None,
        }
    }

    pub fn mutable(mut self) -> Self {
        self.is_val = false;
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub ty: Type,
    pub default: Option<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub name: String,
    pub type_params: Vec<TypeParameter>,
    pub params: Vec<Parameter>,
    pub return_type: Type,
    pub visibility: Visibility,
    pub is_abstract: bool,
    pub is_suspend: bool,
    pub annotations: Vec<String>,
    pub documentation: Option<String>,
    /// Target-language body supplied by the parser, if any.
    pub body: Option<String>,
}

impl Method {
    pub fn new(name: impl Into<String>, params: Vec<Parameter>, return_type: Type) -> Self {
        Self {
            name: name.into(),
            type_params: Vec::new(),
            params,
            return_type,
            visibility: Visibility::Public,
            is_abstract: true,
            is_suspend: false,
            annotations: Vec::new(),
            documentation: None,
            body: None,
        }
    }

    pub fn suspending(mut self) -> Self {
        self.is_suspend = true;
        self
    }

    /// Every type appearing in the signature, in declaration order.
    pub fn signature_types(&self) -> Vec<&Type> {
        let mut types: Vec<&Type> = self
            .type_params
            .iter()
            .flat_map(|tp| tp.bounds.iter())
            .collect();
        types.extend(self.params.iter().map(|p| &p.ty));
        types.push(&self.return_type);
        types
    }
}

/// One named alternative of a sealed hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subtype {
    pub name: String,
    pub properties: Vec<Property>,
}

impl Subtype {
    pub fn new(name: impl Into<String>, properties: Vec<Property>) -> Self {
        Self {
            name: name.into(),
            properties,
        }
    }
}

/// The closed set of domain model declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainModel {
    ValueObject {
        name: String,
        package: String,
        type_params: Vec<TypeParameter>,
        properties: Vec<Property>,
        /// Marked in the source as a single-field wrapper.
        inline: bool,
    },
    Entity {
        name: String,
        package: String,
        type_params: Vec<TypeParameter>,
        properties: Vec<Property>,
    },
    SealedHierarchy {
        name: String,
        package: String,
        type_params: Vec<TypeParameter>,
        subtypes: Vec<Subtype>,
    },
    Enum {
        name: String,
        package: String,
        values: Vec<String>,
    },
}

impl DomainModel {
    pub fn name(&self) -> &str {
        match self {
            DomainModel::ValueObject { name, .. }
            | DomainModel::Entity { name, .. }
            | DomainModel::SealedHierarchy { name, .. }
            | DomainModel::Enum { name, .. } => name,
        }
    }

    pub fn package(&self) -> &str {
        match self {
            DomainModel::ValueObject { package, .. }
            | DomainModel::Entity { package, .. }
            | DomainModel::SealedHierarchy { package, .. }
            | DomainModel::Enum { package, .. } => package,
        }
    }

    pub fn qualified_name(&self) -> String {
        qualify(self.package(), self.name())
    }

    /// Qualified names this model puts at the top level of its file; a
    /// sealed hierarchy contributes its subtypes too.
    pub fn declared_names(&self) -> Vec<String> {
        let mut names = vec![self.qualified_name()];
        if let DomainModel::SealedHierarchy {
            package, subtypes, ..
        } = self
        {
            names.extend(subtypes.iter().map(|s| qualify(package, &s.name)));
        }
        names
    }

    pub fn type_params(&self) -> &[TypeParameter] {
        match self {
            DomainModel::ValueObject { type_params, .. }
            | DomainModel::Entity { type_params, .. }
            | DomainModel::SealedHierarchy { type_params, .. } => type_params,
            DomainModel::Enum { .. } => &[],
        }
    }

    /// Short label for logs and diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            DomainModel::ValueObject { .. } => "value object",
            DomainModel::Entity { .. } => "entity",
            DomainModel::SealedHierarchy { .. } => "sealed hierarchy",
            DomainModel::Enum { .. } => "enum",
        }
    }

    /// Every property type the declaration mentions, subtypes included.
    pub fn referenced_types(&self) -> Vec<&Type> {
        let bounds = self.type_params().iter().flat_map(|tp| tp.bounds.iter());
        match self {
            DomainModel::ValueObject { properties, .. } | DomainModel::Entity { properties, .. } => {
                bounds.chain(properties.iter().map(|p| &p.ty)).collect()
            }
            DomainModel::SealedHierarchy { subtypes, .. } => bounds
                .chain(
                    subtypes
                        .iter()
                        .flat_map(|s| s.properties.iter().map(|p| &p.ty)),
                )
                .collect(),
            DomainModel::Enum { .. } => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PortType {
    Repository,
    Service,
    UseCase,
    EventHandler,
    #[default]
    Generic,
}

/// An architectural boundary contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
    pub name: String,
    pub package: String,
    pub type_params: Vec<TypeParameter>,
    pub methods: Vec<Method>,
    pub super_types: Vec<Type>,
    pub port_type: PortType,
}

impl Port {
    pub fn new(name: impl Into<String>, package: impl Into<String>, port_type: PortType) -> Self {
        Self {
            name: name.into(),
            package: package.into(),
            type_params: Vec::new(),
            methods: Vec::new(),
            super_types: Vec::new(),
            port_type,
        }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    pub fn qualified_name(&self) -> String {
        qualify(&self.package, &self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InfrastructureCategory {
    Database,
    MessageQueue,
    Http,
    #[default]
    Generic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfrastructureDependency {
    pub category: InfrastructureCategory,
    pub parameter_name: String,
    pub ty: Type,
}

impl InfrastructureDependency {
    pub fn new(category: InfrastructureCategory, parameter_name: impl Into<String>, ty: Type) -> Self {
        Self {
            category,
            parameter_name: parameter_name.into(),
            ty,
        }
    }

    pub fn as_parameter(&self) -> Parameter {
        Parameter::new(self.parameter_name.clone(), self.ty.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdapterType {
    Persistence,
    Messaging,
    Rest,
    Event,
    #[default]
    Generic,
}

/// A concrete binding of a port to infrastructure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortImplementation {
    pub name: String,
    pub package: String,
    pub implements: Type,
    pub infrastructure: Vec<InfrastructureDependency>,
    pub other_dependencies: Vec<Parameter>,
    pub adapter_type: AdapterType,
}

impl PortImplementation {
    pub fn qualified_name(&self) -> String {
        qualify(&self.package, &self.name)
    }

    /// Infrastructure dependencies first, then the other dependencies.
    pub fn constructor_parameters(&self) -> Vec<Parameter> {
        order_constructor_parameters(
            self.infrastructure.iter().map(InfrastructureDependency::as_parameter),
            &self.other_dependencies,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortDependency {
    pub port: Type,
    pub parameter_name: String,
    pub documentation: Option<String>,
}

impl PortDependency {
    pub fn new(port: Type, parameter_name: impl Into<String>) -> Self {
        Self {
            port,
            parameter_name: parameter_name.into(),
            documentation: None,
        }
    }

    pub fn as_parameter(&self) -> Parameter {
        Parameter::new(self.parameter_name.clone(), self.port.clone())
    }
}

/// Application logic depending on ports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
    pub name: String,
    pub package: String,
    pub port_dependencies: Vec<PortDependency>,
    pub other_dependencies: Vec<Parameter>,
    pub methods: Vec<Method>,
    pub annotations: Vec<String>,
}

impl Service {
    pub fn qualified_name(&self) -> String {
        qualify(&self.package, &self.name)
    }

    /// Port dependencies first, then the other dependencies.
    pub fn constructor_parameters(&self) -> Vec<Parameter> {
        order_constructor_parameters(
            self.port_dependencies.iter().map(PortDependency::as_parameter),
            &self.other_dependencies,
        )
    }
}

/// Builds a constructor parameter list: every primary dependency in its
/// declaration order, followed by every other dependency in its declaration
/// order. Adapters and services both rely on this order.
pub fn order_constructor_parameters(
    primary: impl IntoIterator<Item = Parameter>,
    other: &[Parameter],
) -> Vec<Parameter> {
    let mut ordered: Vec<Parameter> = primary.into_iter().collect();
    ordered.extend(other.iter().cloned());
    ordered
}

/// Declarations produced from one source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseResult {
    pub package: String,
    pub domain_models: Vec<DomainModel>,
    pub ports: Vec<Port>,
    pub adapters: Vec<PortImplementation>,
    pub services: Vec<Service>,
}

impl ParseResult {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            ..Self::default()
        }
    }

    pub fn declaration_count(&self) -> usize {
        self.domain_models.len() + self.ports.len() + self.adapters.len() + self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declaration_count() == 0
    }

    /// Looks up a port declared in this unit by simple or qualified name.
    pub fn find_port(&self, name: &str) -> Option<&Port> {
        self.ports
            .iter()
            .find(|p| p.name == name || p.qualified_name() == name)
    }

    pub fn into_module(self, name: impl Into<String>) -> Module {
        Module {
            name: name.into(),
            package: self.package,
            domain_models: self.domain_models,
            ports: self.ports,
            port_implementations: self.adapters,
            services: self.services,
            sub_modules: Vec::new(),
        }
    }
}

/// A tree of declarations grouped by package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Module {
    pub name: String,
    pub package: String,
    pub domain_models: Vec<DomainModel>,
    pub ports: Vec<Port>,
    pub port_implementations: Vec<PortImplementation>,
    pub services: Vec<Service>,
    pub sub_modules: Vec<Module>,
}

impl Module {
    pub fn new(name: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: package.into(),
            ..Self::default()
        }
    }

    /// Direct children only.
    pub fn find_domain_model(&self, name: &str) -> Option<&DomainModel> {
        self.domain_models.iter().find(|m| m.name() == name)
    }

    /// Direct children only.
    pub fn find_port(&self, name: &str) -> Option<&Port> {
        self.ports.iter().find(|p| p.name == name)
    }

    /// Qualified names of every declaration in this module and its descendants,
    /// sealed subtypes included.
    pub fn all_types(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_types(&mut names);
        names
    }

    fn collect_types(&self, names: &mut Vec<String>) {
        for model in &self.domain_models {
            names.extend(model.declared_names());
        }
        names.extend(self.ports.iter().map(Port::qualified_name));
        names.extend(
            self.port_implementations
                .iter()
                .map(PortImplementation::qualified_name),
        );
        names.extend(self.services.iter().map(Service::qualified_name));
        for sub in &self.sub_modules {
            sub.collect_types(names);
        }
    }

    fn collect_modules<'a>(&'a self, out: &mut Vec<&'a Module>) {
        out.push(self);
        for sub in &self.sub_modules {
            sub.collect_modules(out);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Project {
    pub name: String,
    pub root_package: String,
    pub modules: Vec<Module>,
    pub metadata: BTreeMap<String, String>,
}

impl Project {
    pub fn new(name: impl Into<String>, root_package: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root_package: root_package.into(),
            ..Self::default()
        }
    }

    /// Every module in the tree, parents before their children.
    pub fn all_modules(&self) -> Vec<&Module> {
        let mut out = Vec::new();
        for module in &self.modules {
            module.collect_modules(&mut out);
        }
        out
    }

    pub fn all_domain_models(&self) -> Vec<&DomainModel> {
        self.all_modules()
            .into_iter()
            .flat_map(|m| m.domain_models.iter())
            .collect()
    }

    pub fn all_ports(&self) -> Vec<&Port> {
        self.all_modules()
            .into_iter()
            .flat_map(|m| m.ports.iter())
            .collect()
    }

    pub fn all_port_implementations(&self) -> Vec<&PortImplementation> {
        self.all_modules()
            .into_iter()
            .flat_map(|m| m.port_implementations.iter())
            .collect()
    }

    pub fn all_services(&self) -> Vec<&Service> {
        self.all_modules()
            .into_iter()
            .flat_map(|m| m.services.iter())
            .collect()
    }
}

/// One source file to migrate and where its output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationJob {
    pub source: String,
    pub destination: String,
}

impl MigrationJob {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }
}

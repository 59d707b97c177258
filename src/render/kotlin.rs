//! Kotlin writer for the architecture IR.
//!
//! Emits one declaration (or one whole source unit) at a time into an
//! owned buffer. Output depends only on the input values and the
//! [`RenderConfig`]: every collection is walked in declaration order and
//! imports come out of a sorted set.

use crate::domain::model::{
    DomainModel, Method, Parameter, ParseResult, Port, PortImplementation, Property, Service, Subtype,
    Visibility,
};
use crate::domain::types::{Type, TypeParameter};
use crate::render::imports::ImportPlan;
use crate::render::names::{escape_identifier, escape_path};
use crate::render::options::RenderConfig;
use crate::render::types::{erase_return, render_type_with, substitute};
use std::collections::BTreeMap;

/// Body emitted for methods the parser supplied no implementation for.
pub const NOT_MIGRATED: &str = "TODO(\"Not yet migrated\")";

/// Which keyword introduces a record-like class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordStyle {
    Data,
    Value,
}

/// Type-parameter clause and, when some parameter has several bounds, the
/// matching `where` clause.
struct Generics {
    declaration: String,
    where_clause: String,
}

fn generics(params: &[TypeParameter], names: &ImportPlan) -> Generics {
    if params.is_empty() {
        return Generics {
            declaration: String::new(),
            where_clause: String::new(),
        };
    }
    let multi_bound = params.iter().any(|p| p.bounds.len() > 1);
    let declared: Vec<String> = params
        .iter()
        .map(|p| {
            let name = escape_identifier(&p.name);
            match p.bounds.as_slice() {
                [single] if !multi_bound => format!("{} : {}", name, render_type_with(single, names)),
                _ => name.into_owned(),
            }
        })
        .collect();
    let where_clause = if multi_bound {
        let constraints: Vec<String> = params
            .iter()
            .flat_map(|p| {
                p.bounds.iter().map(move |b| {
                    format!("{} : {}", escape_identifier(&p.name), render_type_with(b, names))
                })
            })
            .collect();
        format!(" where {}", constraints.join(", "))
    } else {
        String::new()
    };
    Generics {
        declaration: format!("<{}>", declared.join(", ")),
        where_clause,
    }
}

/// Type arguments that forward declared parameters, e.g. `<T, U>`.
fn forwarded_args(params: &[TypeParameter]) -> String {
    if params.is_empty() {
        String::new()
    } else {
        let names: Vec<String> = params
            .iter()
            .map(|p| escape_identifier(&p.name).into_owned())
            .collect();
        format!("<{}>", names.join(", "))
    }
}

fn visibility_modifier(visibility: Visibility) -> &'static str {
    match visibility {
        Visibility::Public => "",
        Visibility::Protected => "protected ",
        Visibility::Private => "private ",
        Visibility::Internal => "internal ",
    }
}

fn annotation(text: &str) -> String {
    if text.starts_with('@') {
        text.to_string()
    } else {
        format!("@{}", text)
    }
}

fn property_decl(property: &Property, names: &ImportPlan) -> String {
    let keyword = if property.is_val { "val" } else { "var" };
    let mut decl = format!(
        "{} {}: {}",
        keyword,
        escape_identifier(&property.name),
        render_type_with(&property.ty, names)
    );
    if let Some(default) = &property.default {
        decl.push_str(" = ");
        decl.push_str(default);
    }
    decl
}

fn parameter_decl(parameter: &Parameter, names: &ImportPlan) -> String {
    let mut decl = format!(
        "{}: {}",
        escape_identifier(&parameter.name),
        render_type_with(&parameter.ty, names)
    );
    if let Some(default) = &parameter.default {
        decl.push_str(" = ");
        decl.push_str(default);
    }
    decl
}

pub struct KotlinWriter<'a> {
    config: &'a RenderConfig,
    names: ImportPlan,
    output: String,
    indent: usize,
}

impl<'a> KotlinWriter<'a> {
    pub fn new(config: &'a RenderConfig) -> Self {
        Self {
            config,
            names: ImportPlan::default(),
            output: String::new(),
            indent: 0,
        }
    }

    pub fn finish(self) -> String {
        self.output
    }

    fn line(&mut self, text: &str) {
        if !text.is_empty() {
            for _ in 0..self.indent * self.config.indent_width {
                self.output.push(' ');
            }
            self.output.push_str(text);
        }
        self.output.push('\n');
    }

    fn blank_line(&mut self) {
        self.output.push('\n');
    }

    fn write_doc(&mut self, text: &str) {
        let escaped = escape_comment(text);
        let lines: Vec<&str> = escaped.trim().lines().map(str::trim_end).collect();
        match lines.as_slice() {
            [] => {}
            [single] => self.line(&format!("/** {} */", single)),
            _ => {
                self.line("/**");
                for l in &lines {
                    if l.is_empty() {
                        self.line(" *");
                    } else {
                        self.line(&format!(" * {}", l));
                    }
                }
                self.line(" */");
            }
        }
    }

    /// Class-level KDoc listing documented properties.
    fn write_property_docs<'p>(&mut self, docs: impl IntoIterator<Item = (&'p str, &'p str)>) {
        let tags: Vec<String> = docs
            .into_iter()
            .map(|(name, doc)| format!("@property {} {}", name, doc.trim()))
            .collect();
        if !tags.is_empty() {
            self.write_doc(&tags.join("\n"));
        }
    }

    /// Writes `head(entries)tail` on one line, or one entry per line when
    /// there are two or more entries.
    fn write_parameter_list(&mut self, head: &str, entries: &[String], tail: &str) {
        if entries.len() < 2 {
            self.line(&format!("{}({}){}", head, entries.join(""), tail));
            return;
        }
        self.line(&format!("{}(", head));
        self.indent += 1;
        let last = entries.len() - 1;
        for (i, entry) in entries.iter().enumerate() {
            if i < last || self.config.trailing_commas {
                self.line(&format!("{},", entry));
            } else {
                self.line(entry);
            }
        }
        self.indent -= 1;
        self.line(&format!("){}", tail));
    }

    fn write_record(
        &mut self,
        style: RecordStyle,
        name: &str,
        type_params: &[TypeParameter],
        properties: &[Property],
        conformance: &str,
    ) {
        let g = generics(type_params, &self.names);
        let name = escape_identifier(name);
        self.write_property_docs(
            properties
                .iter()
                .filter_map(|p| p.documentation.as_deref().map(|d| (p.name.as_str(), d))),
        );
        let tail = format!("{}{}", conformance, g.where_clause);
        if properties.is_empty() {
            self.line(&format!("class {}{}(){}", name, g.declaration, tail));
            return;
        }
        let keyword = match style {
            RecordStyle::Data => "data class",
            RecordStyle::Value => "@JvmInline value class",
        };
        let entries: Vec<String> = properties.iter().map(|p| property_decl(p, &self.names)).collect();
        self.write_parameter_list(&format!("{} {}{}", keyword, name, g.declaration), &entries, &tail);
    }

    pub fn write_domain_model(&mut self, model: &DomainModel) {
        match model {
            DomainModel::ValueObject {
                name,
                type_params,
                properties,
                inline,
                ..
            } => {
                let wraps_one_val = matches!(properties.as_slice(), [only] if only.is_val);
                let style = if *inline && wraps_one_val && self.config.inline_value_classes {
                    RecordStyle::Value
                } else {
                    RecordStyle::Data
                };
                self.write_record(style, name, type_params, properties, "");
            }
            DomainModel::Entity {
                name,
                type_params,
                properties,
                ..
            } => self.write_record(RecordStyle::Data, name, type_params, properties, ""),
            DomainModel::SealedHierarchy {
                name,
                type_params,
                subtypes,
                ..
            } => self.write_sealed(name, type_params, subtypes),
            DomainModel::Enum { name, values, .. } => self.write_enum(name, values),
        }
    }

    fn write_sealed(&mut self, name: &str, type_params: &[TypeParameter], subtypes: &[Subtype]) {
        let g = generics(type_params, &self.names);
        let name = escape_identifier(name);
        self.line(&format!("sealed interface {}{}{}", name, g.declaration, g.where_clause));
        let conformance = format!(" : {}{}", name, forwarded_args(type_params));
        for subtype in subtypes {
            self.blank_line();
            if subtype.properties.is_empty() && type_params.is_empty() {
                self.line(&format!("data object {}{}", escape_identifier(&subtype.name), conformance));
            } else {
                self.write_record(
                    RecordStyle::Data,
                    &subtype.name,
                    type_params,
                    &subtype.properties,
                    &conformance,
                );
            }
        }
    }

    fn write_enum(&mut self, name: &str, values: &[String]) {
        let name = escape_identifier(name);
        if values.is_empty() {
            self.line(&format!("enum class {}", name));
            return;
        }
        self.line(&format!("enum class {} {{", name));
        self.indent += 1;
        let last = values.len() - 1;
        for (i, value) in values.iter().enumerate() {
            let value = escape_identifier(value);
            if i < last || self.config.trailing_commas {
                self.line(&format!("{},", value));
            } else {
                self.line(&value);
            }
        }
        self.indent -= 1;
        self.line("}");
    }

    fn method_signature(&self, method: &Method, is_override: bool) -> String {
        let shape = erase_return(&method.return_type);
        let g = generics(&method.type_params, &self.names);
        let mut signature = String::new();
        if is_override {
            signature.push_str("override ");
        } else {
            signature.push_str(visibility_modifier(method.visibility));
        }
        if shape.is_suspend || method.is_suspend {
            signature.push_str("suspend ");
        }
        signature.push_str("fun ");
        if !g.declaration.is_empty() {
            signature.push_str(&g.declaration);
            signature.push(' ');
        }
        let params: Vec<String> = method.params.iter().map(|p| parameter_decl(p, &self.names)).collect();
        signature.push_str(&format!("{}({})", escape_identifier(&method.name), params.join(", ")));
        if let Some(value) = shape.value {
            signature.push_str(": ");
            signature.push_str(&render_type_with(value, &self.names));
        }
        signature.push_str(&g.where_clause);
        signature
    }

    fn write_method_header(&mut self, method: &Method) {
        if let Some(doc) = &method.documentation {
            self.write_doc(doc);
        }
        for a in &method.annotations {
            self.line(&annotation(a));
        }
    }

    fn write_method_body(&mut self, signature: &str, body: Option<&str>) {
        self.line(&format!("{} {{", signature));
        self.indent += 1;
        match body {
            Some(body) if !body.trim().is_empty() => {
                for l in body.trim_end().lines() {
                    self.line(l.trim_end());
                }
            }
            _ => self.line(NOT_MIGRATED),
        }
        self.indent -= 1;
        self.line("}");
    }

    /// Writes the methods of a class or interface body, one blank line apart.
    fn write_members(&mut self, methods: &[Method], mode: MemberMode) {
        self.indent += 1;
        for (i, method) in methods.iter().enumerate() {
            if i > 0 {
                self.blank_line();
            }
            self.write_method_header(method);
            match mode {
                MemberMode::Interface if method.is_abstract => {
                    let signature = self.method_signature(method, false);
                    self.line(&signature);
                }
                MemberMode::Interface | MemberMode::Class => {
                    let signature = self.method_signature(method, false);
                    self.write_method_body(&signature, method.body.as_deref());
                }
                MemberMode::Override => {
                    let signature = self.method_signature(method, true);
                    self.write_method_body(&signature, method.body.as_deref());
                }
            }
        }
        self.indent -= 1;
    }

    pub fn write_port(&mut self, port: &Port) {
        let g = generics(&port.type_params, &self.names);
        let supers = if port.super_types.is_empty() {
            String::new()
        } else {
            let rendered: Vec<String> = port
                .super_types
                .iter()
                .map(|t| render_type_with(t, &self.names))
                .collect();
            format!(" : {}", rendered.join(", "))
        };
        let head = format!(
            "interface {}{}{}{}",
            escape_identifier(&port.name),
            g.declaration,
            supers,
            g.where_clause
        );
        if port.methods.is_empty() {
            self.line(&head);
            return;
        }
        self.line(&format!("{} {{", head));
        self.write_members(&port.methods, MemberMode::Interface);
        self.line("}");
    }

    /// `port` is the implemented port when it is declared in the same unit;
    /// its methods become `override` placeholders.
    pub fn write_adapter(&mut self, adapter: &PortImplementation, port: Option<&Port>) {
        let entries: Vec<String> = adapter
            .constructor_parameters()
            .iter()
            .map(|p| format!("private val {}", parameter_decl(p, &self.names)))
            .collect();
        let overrides = port.map(|p| port_overrides(p, &adapter.implements)).unwrap_or_default();
        let tail = format!(
            " : {}{}",
            render_type_with(&adapter.implements, &self.names),
            if overrides.is_empty() { "" } else { " {" }
        );
        let head = format!("class {}", escape_identifier(&adapter.name));
        if entries.is_empty() {
            self.line(&format!("{}{}", head, tail));
        } else {
            self.write_parameter_list(&head, &entries, &tail);
        }
        if !overrides.is_empty() {
            self.write_members(&overrides, MemberMode::Override);
            self.line("}");
        }
    }

    pub fn write_service(&mut self, service: &Service) {
        self.write_property_docs(service.port_dependencies.iter().filter_map(|d| {
            d.documentation
                .as_deref()
                .map(|doc| (d.parameter_name.as_str(), doc))
        }));
        for a in &service.annotations {
            self.line(&annotation(a));
        }
        let entries: Vec<String> = service
            .constructor_parameters()
            .iter()
            .map(|p| format!("val {}", parameter_decl(p, &self.names)))
            .collect();
        let tail = if service.methods.is_empty() { "" } else { " {" };
        self.write_parameter_list(&format!("class {}", escape_identifier(&service.name)), &entries, tail);
        if !service.methods.is_empty() {
            self.write_members(&service.methods, MemberMode::Class);
            self.line("}");
        }
    }

    /// A whole file: package line, imports, then every declaration in
    /// declaration order, one blank line apart.
    pub fn write_unit(&mut self, unit: &ParseResult) {
        self.names = unit_names(unit);
        let mut first = true;
        if self.config.file_header {
            if !unit.package.is_empty() {
                self.line(&format!("package {}", escape_path(&unit.package)));
                first = false;
            }
            let imports: Vec<String> = self.names.imports().iter().map(|i| escape_path(i)).collect();
            if !imports.is_empty() {
                if !first {
                    self.blank_line();
                }
                for import in &imports {
                    self.line(&format!("import {}", import));
                }
                first = false;
            }
        }

        let mut separate = |writer: &mut Self| {
            if !first {
                writer.blank_line();
            }
            first = false;
        };
        for model in &unit.domain_models {
            separate(self);
            self.write_domain_model(model);
        }
        for port in &unit.ports {
            separate(self);
            self.write_port(port);
        }
        for adapter in &unit.adapters {
            separate(self);
            let port = adapter
                .implements
                .simple_name()
                .and_then(|name| unit.find_port(name));
            self.write_adapter(adapter, port);
        }
        for service in &unit.services {
            separate(self);
            self.write_service(service);
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum MemberMode {
    Interface,
    Class,
    Override,
}

/// The port's methods as seen from an implementation of `implemented`:
/// port type parameters are bound to the implementation's type arguments
/// and every method gets a placeholder body.
fn port_overrides(port: &Port, implemented: &Type) -> Vec<Method> {
    let args: &[Type] = match implemented {
        Type::Named { args, .. } => args,
        _ => &[],
    };
    let bindings: BTreeMap<String, Type> = port
        .type_params
        .iter()
        .zip(args.iter())
        .map(|(param, arg)| (param.name.clone(), arg.clone()))
        .collect();
    port.methods
        .iter()
        .map(|method| Method {
            params: method
                .params
                .iter()
                .map(|p| Parameter {
                    name: p.name.clone(),
                    ty: substitute(&p.ty, &bindings),
                    // Kotlin forbids default values on overriding parameters.
                    default: None,
                })
                .collect(),
            return_type: substitute(&method.return_type, &bindings),
            annotations: Vec::new(),
            documentation: None,
            is_abstract: false,
            ..method.clone()
        })
        .collect()
}

/// Every type a unit's declarations mention, in declaration order.
fn unit_types(unit: &ParseResult) -> Vec<Type> {
    let mut types: Vec<Type> = Vec::new();
    for model in &unit.domain_models {
        types.extend(model.referenced_types().into_iter().cloned());
    }
    for port in &unit.ports {
        types.extend(port.type_params.iter().flat_map(|tp| tp.bounds.iter()).cloned());
        types.extend(port.super_types.iter().cloned());
        for method in &port.methods {
            types.extend(method.signature_types().into_iter().cloned());
        }
    }
    for adapter in &unit.adapters {
        types.push(adapter.implements.clone());
        types.extend(adapter.constructor_parameters().into_iter().map(|p| p.ty));
        let port = adapter
            .implements
            .simple_name()
            .and_then(|name| unit.find_port(name));
        if let Some(port) = port {
            for method in port_overrides(port, &adapter.implements) {
                types.extend(method.signature_types().into_iter().cloned());
            }
        }
    }
    for service in &unit.services {
        types.extend(service.constructor_parameters().into_iter().map(|p| p.ty));
        for method in &service.methods {
            types.extend(method.signature_types().into_iter().cloned());
        }
    }
    types
}

pub fn render_domain_model(model: &DomainModel, config: &RenderConfig) -> String {
    let mut writer = KotlinWriter::new(config);
    writer.write_domain_model(model);
    writer.finish()
}

pub fn render_port(port: &Port, config: &RenderConfig) -> String {
    let mut writer = KotlinWriter::new(config);
    writer.write_port(port);
    writer.finish()
}

pub fn render_adapter(adapter: &PortImplementation, port: Option<&Port>, config: &RenderConfig) -> String {
    let mut writer = KotlinWriter::new(config);
    writer.write_adapter(adapter, port);
    writer.finish()
}

pub fn render_service(service: &Service, config: &RenderConfig) -> String {
    let mut writer = KotlinWriter::new(config);
    writer.write_service(service);
    writer.finish()
}

pub fn render_unit(unit: &ParseResult, config: &RenderConfig) -> String {
    let mut writer = KotlinWriter::new(config);
    writer.write_unit(unit);
    writer.finish()
}

/// Simple names of the classes a unit declares at the top level of its
/// file, sealed subtypes included, in declaration order.
pub fn top_level_names(unit: &ParseResult) -> Vec<&str> {
    let mut names = Vec::new();
    for model in &unit.domain_models {
        names.push(model.name());
        if let DomainModel::SealedHierarchy { subtypes, .. } = model {
            names.extend(subtypes.iter().map(|s| s.name.as_str()));
        }
    }
    names.extend(unit.ports.iter().map(|p| p.name.as_str()));
    names.extend(unit.adapters.iter().map(|a| a.name.as_str()));
    names.extend(unit.services.iter().map(|s| s.name.as_str()));
    names
}

fn unit_names(unit: &ParseResult) -> ImportPlan {
    let declared = top_level_names(unit).into_iter().map(str::to_string);
    ImportPlan::new(unit_types(unit).iter(), &unit.package, declared)
}

/// Imports a unit needs, sorted.
pub fn unit_imports(unit: &ParseResult) -> Vec<String> {
    unit_names(unit).imports().iter().cloned().collect()
}

/// Keeps documentation text from closing or opening a block comment.
/// Kotlin block comments nest, so both delimiters are neutralised.
fn escape_comment(text: &str) -> String {
    text.replace("*/", "*&#47;").replace("/*", "/&#42;")
}

//! Type-level translation rules: Kotlin type names, effect erasure and
//! option collapsing.

use crate::domain::types::{simple_name_of, Type};
use crate::render::imports::ImportPlan;
use crate::render::names::escape_identifier;
use std::collections::BTreeMap;

/// Source-language effect constructors. The wrapped value is the last type
/// argument (`ZIO[R, E, A]` wraps `A`).
pub const EFFECT_WRAPPERS: &[&str] = &["Effect", "F", "Future", "IO", "RIO", "Task", "UIO", "URIO", "ZIO"];

/// Source-language optional wrappers that collapse into Kotlin nullability.
pub const OPTION_WRAPPERS: &[&str] = &["Maybe", "Option", "Optional"];

/// The value type of an effect-wrapped type.
pub fn effect_value(ty: &Type) -> Option<&Type> {
    match ty {
        Type::Named { name, args } if EFFECT_WRAPPERS.contains(&simple_name_of(name)) => args.last(),
        _ => None,
    }
}

/// The value type of an option-like named wrapper.
pub fn option_value(ty: &Type) -> Option<&Type> {
    match ty {
        Type::Named { name, args } if args.len() == 1 && OPTION_WRAPPERS.contains(&simple_name_of(name)) => {
            args.first()
        }
        _ => None,
    }
}

/// Whether the Kotlin rendering of `ty` already ends in `?`.
fn renders_nullable(ty: &Type) -> bool {
    ty.is_nullable() || option_value(ty).is_some()
}

/// How a method's declared return type shows up in a Kotlin signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnShape<'a> {
    /// The method needs the `suspend` modifier.
    pub is_suspend: bool,
    /// Return type to print after the parameter list; `None` prints nothing.
    pub value: Option<&'a Type>,
}

/// Strips an effect wrapper from a return type. An effect-wrapped `Unit`
/// and a plain `Unit` both produce a signature without a return type.
pub fn erase_return(ty: &Type) -> ReturnShape<'_> {
    match effect_value(ty) {
        Some(inner) => ReturnShape {
            is_suspend: true,
            value: (!inner.is_unit()).then_some(inner),
        },
        None => ReturnShape {
            is_suspend: false,
            value: (!ty.is_unit()).then_some(ty),
        },
    }
}

fn render_list(types: &[Type], names: &ImportPlan) -> String {
    types
        .iter()
        .map(|t| render_type_with(t, names))
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_nullable(inner: &Type, names: &ImportPlan) -> String {
    let rendered = render_type_with(inner, names);
    if renders_nullable(inner) {
        return rendered;
    }
    let needs_parens = matches!(inner, Type::Function { .. }) || effect_value(inner).is_some();
    if needs_parens {
        format!("({})?", rendered)
    } else {
        format!("{}?", rendered)
    }
}

/// Kotlin spelling of a type on its own, every named type by its simple name.
pub fn render_type(ty: &Type) -> String {
    render_type_with(ty, &ImportPlan::default())
}

/// Kotlin spelling of a type inside a file whose names follow `names`.
pub fn render_type_with(ty: &Type, names: &ImportPlan) -> String {
    match ty {
        Type::Primitive(p) => p.name().to_string(),
        Type::Named { name, args } => {
            if let Some(inner) = option_value(ty) {
                return render_nullable(inner, names);
            }
            if let Some(inner) = effect_value(ty) {
                return format!("suspend () -> {}", render_type_with(inner, names));
            }
            let spelled = names.spelling(name);
            if args.is_empty() {
                spelled
            } else {
                format!("{}<{}>", spelled, render_list(args, names))
            }
        }
        Type::Parameter { name, .. } => escape_identifier(name).into_owned(),
        Type::Nullable(inner) => render_nullable(inner, names),
        Type::List(element) => format!("List<{}>", render_type_with(element, names)),
        Type::Set(element) => format!("Set<{}>", render_type_with(element, names)),
        Type::Map { key, value } => format!(
            "Map<{}, {}>",
            render_type_with(key, names),
            render_type_with(value, names)
        ),
        Type::Function { params, ret } => format!(
            "({}) -> {}",
            render_list(params, names),
            render_type_with(ret, names)
        ),
    }
}

/// Replaces type parameters by name. Used when an adapter implements a
/// generic port with concrete type arguments.
pub fn substitute(ty: &Type, bindings: &BTreeMap<String, Type>) -> Type {
    let sub_all = |types: &[Type]| types.iter().map(|t| substitute(t, bindings)).collect::<Vec<_>>();
    match ty {
        Type::Primitive(_) => ty.clone(),
        Type::Parameter { name, bounds } => match bindings.get(name) {
            Some(bound) => bound.clone(),
            None => Type::Parameter {
                name: name.clone(),
                bounds: sub_all(bounds),
            },
        },
        Type::Named { name, args } => Type::Named {
            name: name.clone(),
            args: sub_all(args),
        },
        Type::Nullable(inner) => substitute(inner, bindings).make_nullable(),
        Type::List(element) => Type::List(Box::new(substitute(element, bindings))),
        Type::Set(element) => Type::Set(Box::new(substitute(element, bindings))),
        Type::Map { key, value } => Type::Map {
            key: Box::new(substitute(key, bindings)),
            value: Box::new(substitute(value, bindings)),
        },
        Type::Function { params, ret } => Type::Function {
            params: sub_all(params),
            ret: Box::new(substitute(ret, bindings)),
        },
    }
}

//! Type algebra shared by the parser, the validator and the renderer.
//!
//! Types are plain immutable values. Children are owned by value, so a type
//! tree can never contain a cycle, and equality is purely structural.

use std::fmt;

/// Built-in scalar types of the source language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveType {
    /// 32-bit integer.
    Int,
    /// 64-bit integer.
    Long,
    Double,
    Float,
    Boolean,
    String,
    Unit,
}

impl PrimitiveType {
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveType::Int => "Int",
            PrimitiveType::Long => "Long",
            PrimitiveType::Double => "Double",
            PrimitiveType::Float => "Float",
            PrimitiveType::Boolean => "Boolean",
            PrimitiveType::String => "String",
            PrimitiveType::Unit => "Unit",
        }
    }

    /// Looks up a primitive by its source-language spelling.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Int" => Some(PrimitiveType::Int),
            "Long" => Some(PrimitiveType::Long),
            "Double" => Some(PrimitiveType::Double),
            "Float" => Some(PrimitiveType::Float),
            "Boolean" => Some(PrimitiveType::Boolean),
            "String" => Some(PrimitiveType::String),
            "Unit" => Some(PrimitiveType::Unit),
            _ => None,
        }
    }
}

/// A type expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Primitive(PrimitiveType),
    /// A nominal type: fully qualified (or simple) name plus type arguments.
    Named { name: String, args: Vec<Type> },
    /// A type variable with its upper bounds (empty means unbounded).
    Parameter { name: String, bounds: Vec<Type> },
    Nullable(Box<Type>),
    List(Box<Type>),
    Set(Box<Type>),
    Map { key: Box<Type>, value: Box<Type> },
    Function { params: Vec<Type>, ret: Box<Type> },
}

impl Type {
    pub fn primitive(primitive: PrimitiveType) -> Self {
        Type::Primitive(primitive)
    }

    pub fn string() -> Self {
        Type::Primitive(PrimitiveType::String)
    }

    pub fn unit() -> Self {
        Type::Primitive(PrimitiveType::Unit)
    }

    /// A named type without type arguments.
    pub fn named(name: impl Into<String>) -> Self {
        Type::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn generic(name: impl Into<String>, args: Vec<Type>) -> Self {
        Type::Named {
            name: name.into(),
            args,
        }
    }

    pub fn parameter(name: impl Into<String>) -> Self {
        Type::Parameter {
            name: name.into(),
            bounds: Vec::new(),
        }
    }

    pub fn bounded_parameter(name: impl Into<String>, bounds: Vec<Type>) -> Self {
        Type::Parameter {
            name: name.into(),
            bounds,
        }
    }

    pub fn list(element: Type) -> Self {
        Type::List(Box::new(element))
    }

    pub fn set(element: Type) -> Self {
        Type::Set(Box::new(element))
    }

    pub fn map(key: Type, value: Type) -> Self {
        Type::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn function(params: Vec<Type>, ret: Type) -> Self {
        Type::Function {
            params,
            ret: Box::new(ret),
        }
    }

    /// True only for the `Nullable` variant.
    pub fn is_nullable(&self) -> bool {
        matches!(self, Type::Nullable(_))
    }

    /// Wraps the type in `Nullable` unless it already is nullable.
    pub fn make_nullable(&self) -> Type {
        if self.is_nullable() {
            self.clone()
        } else {
            Type::Nullable(Box::new(self.clone()))
        }
    }

    /// Removes one level of `Nullable`; a no-op on non-nullable types.
    pub fn make_non_nullable(&self) -> Type {
        match self {
            Type::Nullable(inner) => inner.as_ref().clone(),
            other => other.clone(),
        }
    }

    pub fn is_unit(&self) -> bool {
        matches!(self, Type::Primitive(PrimitiveType::Unit))
    }

    /// Last dotted segment of a named type or type parameter.
    pub fn simple_name(&self) -> Option<&str> {
        match self {
            Type::Named { name, .. } => Some(simple_name_of(name)),
            Type::Parameter { name, .. } => Some(name.as_str()),
            _ => None,
        }
    }
}

/// Last segment of a dotted name (`java.util.UUID` -> `UUID`).
pub fn simple_name_of(qualified: &str) -> &str {
    qualified.rsplit('.').next().unwrap_or(qualified)
}

/// Package part of a dotted name, if it has one.
pub fn package_of(qualified: &str) -> Option<&str> {
    qualified.rsplit_once('.').map(|(package, _)| package)
}

fn write_joined(f: &mut fmt::Formatter<'_>, types: &[Type]) -> fmt::Result {
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", ty)?;
    }
    Ok(())
}

/// Source-language spelling, used in diagnostics.
impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(p) => f.write_str(p.name()),
            Type::Named { name, args } => {
                f.write_str(name)?;
                if !args.is_empty() {
                    f.write_str("[")?;
                    write_joined(f, args)?;
                    f.write_str("]")?;
                }
                Ok(())
            }
            Type::Parameter { name, .. } => f.write_str(name),
            Type::Nullable(inner) => write!(f, "Option[{}]", inner),
            Type::List(element) => write!(f, "List[{}]", element),
            Type::Set(element) => write!(f, "Set[{}]", element),
            Type::Map { key, value } => write!(f, "Map[{}, {}]", key, value),
            Type::Function { params, ret } => {
                f.write_str("(")?;
                write_joined(f, params)?;
                write!(f, ") => {}", ret)
            }
        }
    }
}

/// A declared type parameter of a class, interface or method.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeParameter {
    pub name: String,
    pub bounds: Vec<Type>,
}

impl TypeParameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bounds: Vec::new(),
        }
    }

    pub fn with_bounds(name: impl Into<String>, bounds: Vec<Type>) -> Self {
        Self {
            name: name.into(),
            bounds,
        }
    }

    /// The type used when this parameter is referenced.
    pub fn as_type(&self) -> Type {
        Type::Parameter {
            name: self.name.clone(),
            bounds: self.bounds.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples() -> Vec<Type> {
        vec![
            Type::string(),
            Type::named("com.acme.User"),
            Type::parameter("T"),
            Type::list(Type::named("UUID")),
            Type::map(Type::string(), Type::list(Type::primitive(PrimitiveType::Int))),
            Type::function(vec![Type::string()], Type::unit()),
            Type::named("User").make_nullable(),
        ]
    }

    #[test]
    fn test_make_nullable_is_idempotent() {
        for ty in samples() {
            let once = ty.make_nullable();
            assert!(once.is_nullable());
            assert_eq!(once.make_nullable(), once);
        }
    }

    #[test]
    fn test_make_non_nullable_is_idempotent() {
        for ty in samples() {
            let once = ty.make_non_nullable();
            assert!(!once.is_nullable());
            assert_eq!(once.make_non_nullable(), once);
        }
    }

    #[test]
    fn test_make_non_nullable_unwraps_one_level() {
        let user = Type::named("User");
        assert_eq!(user.make_nullable().make_non_nullable(), user);
        assert_eq!(user.make_non_nullable(), user);
    }

    #[test]
    fn test_only_nullable_variant_is_nullable() {
        assert!(!Type::list(Type::named("User").make_nullable()).is_nullable());
        assert!(Type::Nullable(Box::new(Type::string())).is_nullable());
    }

    #[test]
    fn test_structural_equality() {
        let a = Type::generic("Page", vec![Type::named("User")]);
        let b = Type::generic("Page", vec![Type::named("User")]);
        let c = Type::generic("Page", vec![Type::named("Order")]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_simple_name() {
        assert_eq!(Type::named("java.util.UUID").simple_name(), Some("UUID"));
        assert_eq!(Type::named("User").simple_name(), Some("User"));
        assert_eq!(Type::string().simple_name(), None);
        assert_eq!(package_of("java.time.Instant"), Some("java.time"));
        assert_eq!(package_of("Instant"), None);
    }

    #[test]
    fn test_display_uses_source_syntax() {
        let ty = Type::map(
            Type::string(),
            Type::generic("IO", vec![Type::named("User").make_nullable()]),
        );
        assert_eq!(ty.to_string(), "Map[String, IO[Option[User]]]");
        let f = Type::function(vec![Type::string(), Type::primitive(PrimitiveType::Int)], Type::unit());
        assert_eq!(f.to_string(), "(String, Int) => Unit");
    }
}

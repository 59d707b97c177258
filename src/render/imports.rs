use crate::domain::types::{package_of, simple_name_of, Type};
use crate::render::names::{escape_identifier, escape_path};
use crate::render::types::{effect_value, option_value};
use std::collections::{BTreeMap, BTreeSet};

/// Well-known foreign types and where Kotlin finds them, looked up by bare
/// simple name only. Any other bare name is assumed to resolve locally.
const KNOWN_IMPORTS: &[(&str, &str)] = &[
    ("BigDecimal", "java.math.BigDecimal"),
    ("BigInteger", "java.math.BigInteger"),
    ("Currency", "java.util.Currency"),
    ("Duration", "java.time.Duration"),
    ("Instant", "java.time.Instant"),
    ("LocalDate", "java.time.LocalDate"),
    ("LocalDateTime", "java.time.LocalDateTime"),
    ("LocalTime", "java.time.LocalTime"),
    ("Locale", "java.util.Locale"),
    ("OffsetDateTime", "java.time.OffsetDateTime"),
    ("URI", "java.net.URI"),
    ("UUID", "java.util.UUID"),
    ("ZoneId", "java.time.ZoneId"),
    ("ZonedDateTime", "java.time.ZonedDateTime"),
];

pub fn known_import(simple_name: &str) -> Option<&'static str> {
    KNOWN_IMPORTS
        .binary_search_by(|(name, _)| name.cmp(&simple_name))
        .ok()
        .map(|index| KNOWN_IMPORTS[index].1)
}

fn qualify(package: &str, name: &str) -> String {
    if package.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", package, name)
    }
}

/// The full path a written name refers to. A dotted name is already a
/// path. A bare name is local when the unit declares it, otherwise the
/// table's canonical path when it has one, otherwise local.
fn resolve(name: &str, package: &str, declared: &BTreeSet<String>) -> String {
    if package_of(name).is_some() {
        return name.to_string();
    }
    if !declared.contains(name) {
        if let Some(path) = known_import(name) {
            return path.to_string();
        }
    }
    qualify(package, name)
}

/// How the named types of one file are imported and spelled.
///
/// Each simple name is claimed by one path: the unit's own declaration if
/// there is one, else the first path in sorted order. The claiming path is
/// imported when it lives in another package. Every other path sharing
/// that simple name is written out in full and not imported.
#[derive(Debug, Clone, Default)]
pub struct ImportPlan {
    package: String,
    declared: BTreeSet<String>,
    imports: BTreeSet<String>,
    spelled_in_full: BTreeSet<String>,
}

impl ImportPlan {
    /// `declared` holds the simple names of the unit's own top-level
    /// declarations.
    pub fn new<'a>(
        types: impl IntoIterator<Item = &'a Type>,
        package: &str,
        declared: impl IntoIterator<Item = String>,
    ) -> Self {
        let declared: BTreeSet<String> = declared.into_iter().collect();
        let mut written = BTreeSet::new();
        for ty in types {
            collect_names(ty, &mut written);
        }

        let mut claims: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let paths = declared
            .iter()
            .map(|name| qualify(package, name))
            .chain(written.iter().map(|name| resolve(name, package, &declared)));
        for path in paths {
            claims
                .entry(simple_name_of(&path).to_string())
                .or_default()
                .insert(path);
        }

        let mut imports = BTreeSet::new();
        let mut spelled_in_full = BTreeSet::new();
        for (simple, paths) in claims {
            let local = qualify(package, &simple);
            let owner = if paths.contains(&local) {
                local
            } else {
                match paths.iter().next() {
                    Some(first) => first.clone(),
                    None => continue,
                }
            };
            if package_of(&owner).is_some_and(|p| p != package) {
                imports.insert(owner.clone());
            }
            spelled_in_full.extend(paths.into_iter().filter(|p| *p != owner));
        }

        Self {
            package: package.to_string(),
            declared,
            imports,
            spelled_in_full,
        }
    }

    /// Import lines the file needs, sorted.
    pub fn imports(&self) -> &BTreeSet<String> {
        &self.imports
    }

    /// Kotlin spelling of a named type: its simple name, or its full path
    /// when another type in the file claims that simple name.
    pub fn spelling(&self, name: &str) -> String {
        let path = resolve(name, &self.package, &self.declared);
        if self.spelled_in_full.contains(&path) {
            escape_path(&path)
        } else {
            escape_identifier(simple_name_of(name)).into_owned()
        }
    }
}

/// Collects the imports needed by a set of types rendered into `package`.
pub fn collect_imports<'a>(types: impl IntoIterator<Item = &'a Type>, package: &str) -> BTreeSet<String> {
    ImportPlan::new(types, package, Vec::new()).imports
}

/// Every named type written in `ty`. Effect and option wrappers are erased
/// during rendering, so only their value types are visited.
fn collect_names(ty: &Type, names: &mut BTreeSet<String>) {
    match ty {
        Type::Primitive(_) => {}
        Type::Named { name, args } => {
            if let Some(inner) = effect_value(ty).or_else(|| option_value(ty)) {
                collect_names(inner, names);
                return;
            }
            names.insert(name.clone());
            for arg in args {
                collect_names(arg, names);
            }
        }
        Type::Parameter { bounds, .. } => {
            for bound in bounds {
                collect_names(bound, names);
            }
        }
        Type::Nullable(inner) | Type::List(inner) | Type::Set(inner) => collect_names(inner, names),
        Type::Map { key, value } => {
            collect_names(key, names);
            collect_names(value, names);
        }
        Type::Function { params, ret } => {
            for param in params {
                collect_names(param, names);
            }
            collect_names(ret, names);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_import_table_is_sorted() {
        assert!(KNOWN_IMPORTS.windows(2).all(|w| w[0].0 < w[1].0));
        assert_eq!(known_import("UUID"), Some("java.util.UUID"));
        assert_eq!(known_import("Locale"), Some("java.util.Locale"));
        assert_eq!(known_import("User"), None);
    }

    #[test]
    fn test_nested_known_names_are_imported_once() {
        let uuid = Type::named("UUID");
        let types = vec![
            Type::map(uuid.clone(), Type::list(uuid.make_nullable())),
            uuid.make_nullable(),
            Type::list(Type::map(Type::string(), Type::named("Instant"))),
        ];
        let imports = collect_imports(&types, "com.acme");
        let expected: BTreeSet<String> = ["java.time.Instant", "java.util.UUID"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(imports, expected);
    }

    #[test]
    fn test_local_and_primitive_types_need_no_import() {
        let types = vec![Type::named("User").make_nullable(), Type::string()];
        assert!(collect_imports(&types, "com.acme").is_empty());
    }

    #[test]
    fn test_traverses_functions_bounds_and_wrappers() {
        let types = vec![
            Type::function(vec![Type::named("Locale")], Type::named("Duration")),
            Type::bounded_parameter("T", vec![Type::generic("Comparable", vec![Type::named("LocalDate")])]),
            Type::generic("cats.effect.IO", vec![Type::generic("Option", vec![Type::named("ZoneId")])]),
        ];
        let imports: Vec<String> = collect_imports(&types, "com.acme").into_iter().collect();
        assert_eq!(
            imports,
            vec![
                "java.time.Duration",
                "java.time.LocalDate",
                "java.time.ZoneId",
                "java.util.Locale",
            ]
        );
    }

    #[test]
    fn test_qualified_names_from_other_packages() {
        let types = vec![
            Type::named("com.acme.billing.Invoice"),
            Type::named("com.acme.users.User"),
        ];
        let imports: Vec<String> = collect_imports(&types, "com.acme.users").into_iter().collect();
        assert_eq!(imports, vec!["com.acme.billing.Invoice"]);
    }

    #[test]
    fn test_qualified_name_is_not_mistaken_for_table_entry() {
        let types = vec![Type::named("com.acme.time.Duration")];
        let plan = ImportPlan::new(&types, "com.acme.billing", Vec::new());
        let imports: Vec<&str> = plan.imports().iter().map(String::as_str).collect();
        assert_eq!(imports, vec!["com.acme.time.Duration"]);
        assert_eq!(plan.spelling("com.acme.time.Duration"), "Duration");

        let canonical = vec![Type::named("java.time.Duration")];
        let imports: Vec<String> = collect_imports(&canonical, "com.acme").into_iter().collect();
        assert_eq!(imports, vec!["java.time.Duration"]);
    }

    #[test]
    fn test_clashing_simple_names_spell_the_loser_in_full() {
        let types = vec![Type::named("com.acme.users.User"), Type::named("com.acme.admin.User")];
        let plan = ImportPlan::new(&types, "com.acme.billing", Vec::new());
        let imports: Vec<&str> = plan.imports().iter().map(String::as_str).collect();
        assert_eq!(imports, vec!["com.acme.admin.User"]);
        assert_eq!(plan.spelling("com.acme.admin.User"), "User");
        assert_eq!(plan.spelling("com.acme.users.User"), "com.acme.users.User");
    }

    #[test]
    fn test_local_declaration_keeps_its_simple_name() {
        let types = vec![Type::named("Duration"), Type::named("java.time.Duration")];
        let plan = ImportPlan::new(&types, "com.acme", vec!["Duration".to_string()]);
        assert!(plan.imports().is_empty());
        assert_eq!(plan.spelling("Duration"), "Duration");
        assert_eq!(plan.spelling("java.time.Duration"), "java.time.Duration");
    }

    #[test]
    fn test_spelling_escapes_keywords() {
        let types = vec![Type::named("com.acme.in.User"), Type::named("com.acme.out.User")];
        let plan = ImportPlan::new(&types, "com.acme", Vec::new());
        assert_eq!(plan.spelling("com.acme.in.User"), "User");
        assert_eq!(plan.spelling("com.acme.out.User"), "com.acme.out.User");
        assert_eq!(ImportPlan::default().spelling("object"), "`object`");
    }
}

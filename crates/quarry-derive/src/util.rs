use convert_case::{Case, Casing};
use syn::{GenericArgument, PathArguments, Type};

/// Inner type of `Option<T>`, if `ty` is one.
pub fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }

    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}

/// True when `rename_all` names a supported case.
pub fn is_known_case(rule: &str) -> bool {
    matches!(
        rule,
        "camelCase" | "PascalCase" | "snake_case" | "kebab-case" | "SCREAMING_SNAKE_CASE"
    )
}

/// Apply a serde-style `rename_all` rule to a field name.
pub fn apply_case(name: &str, rule: Option<&str>) -> String {
    match rule {
        Some("camelCase") => name.to_case(Case::Camel),
        Some("PascalCase") => name.to_case(Case::UpperCamel),
        Some("snake_case") => name.to_case(Case::Snake),
        Some("kebab-case") => name.to_case(Case::Kebab),
        Some("SCREAMING_SNAKE_CASE") => name.to_case(Case::UpperSnake),
        _ => name.to_string(),
    }
}

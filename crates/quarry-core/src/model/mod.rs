mod kind;
mod validate;


use crate::expr::{Path, Step};
use std::hash::{Hash, Hasher};

// re-exports
pub use kind::Kind;
pub use validate::ValidateError;

///
/// RecordModel
///
/// Static runtime description of a record type: its name, its identity
/// attribute, and its attributes in declaration order.
/// Models are built once per type by `#[derive(Record)]`.
///

#[derive(Debug)]
pub struct RecordModel {
    pub name: &'static str,
    pub identity: Option<&'static str>,
    pub fields: Vec<FieldModel>,
}

impl RecordModel {
    #[must_use]
    pub const fn new(
        name: &'static str,
        identity: Option<&'static str>,
        fields: Vec<FieldModel>,
    ) -> Self {
        Self {
            name,
            identity,
            fields,
        }
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldModel> {
        self.fields.iter().find(|field| field.name == name)
    }

    #[must_use]
    pub fn identity_field(&self) -> Option<&FieldModel> {
        self.identity.and_then(|name| self.field(name))
    }

    /// Resolve the static kind at `path`, walking nested records and lists.
    /// Returns `None` when the path is not rooted here or names an undefined
    /// attribute.
    #[must_use]
    pub fn resolve(&self, path: &Path) -> Option<Kind> {
        let root = path.root_model()?;
        if root.name != self.name {
            return None;
        }

        let mut current = Kind::Record(root);
        for segment in path.segments() {
            current = match (segment.step(), current.scalar()) {
                (Step::Field(name), Kind::Record(model)) => model.field(name)?.kind.clone(),
                (Step::Index(_), Kind::List(element)) => (**element).clone(),
                _ => return None,
            };
        }

        Some(current)
    }
}

impl Eq for RecordModel {}

impl PartialEq for RecordModel {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Hash for RecordModel {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

///
/// FieldModel
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct FieldModel {
    pub name: &'static str,
    pub kind: Kind,
}

impl FieldModel {
    #[must_use]
    pub const fn new(name: &'static str, kind: Kind) -> Self {
        Self { name, kind }
    }
}

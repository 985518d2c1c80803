use crate::{
    expr::Path,
    model::{Kind, RecordModel},
    value::Document,
};
use thiserror::Error as ThisError;

///
/// ValidateError
///
/// Raised before any backend work when a write would store an incomplete or
/// ill-typed document, or an update targets an attribute the record lacks.
///

#[derive(Debug, ThisError)]
pub enum ValidateError {
    #[error("record {entity} is missing required attribute '{field}'")]
    MissingField {
        entity: &'static str,
        field: &'static str,
    },

    #[error("attribute '{field}' of {entity} expects {expected}, found {found}")]
    KindMismatch {
        entity: &'static str,
        field: &'static str,
        expected: Kind,
        found: &'static str,
    },

    #[error("record {entity} has no attribute '{field}'")]
    UnknownField { entity: &'static str, field: String },

    #[error("path '{path}' is not an assignable attribute of {entity}")]
    UnknownPath { entity: &'static str, path: String },

    #[error("value for '{path}' expects {expected}, found {found}")]
    AssignmentMismatch {
        path: String,
        expected: Kind,
        found: &'static str,
    },

    #[error("record {entity} declares no identity attribute")]
    MissingIdentity { entity: &'static str },

    #[error("update of {entity} mixes attribute assignments with a full replacement")]
    MixedUpdate { entity: &'static str },

    #[error("update of {entity} has no assignments")]
    EmptyUpdate { entity: &'static str },
}

impl RecordModel {
    /// Check that `doc` holds every non-optional attribute with a matching
    /// kind and nothing else.
    pub fn validate_document(&self, doc: &Document) -> Result<(), ValidateError> {
        for field in &self.fields {
            match doc.get(field.name) {
                None if field.kind.is_optional() => {}
                None => {
                    return Err(ValidateError::MissingField {
                        entity: self.name,
                        field: field.name,
                    });
                }
                Some(value) if !field.kind.accepts(value) => {
                    return Err(ValidateError::KindMismatch {
                        entity: self.name,
                        field: field.name,
                        expected: field.kind.clone(),
                        found: value.label(),
                    });
                }
                Some(_) => {}
            }
        }

        if let Some(key) = doc.keys().find(|key| self.field(key).is_none()) {
            return Err(ValidateError::UnknownField {
                entity: self.name,
                field: key.clone(),
            });
        }

        Ok(())
    }

    /// Resolve an assignment target, rejecting paths not defined on this
    /// record.
    pub fn validate_path(&self, path: &Path) -> Result<Kind, ValidateError> {
        if path.is_empty() {
            return Err(ValidateError::UnknownPath {
                entity: self.name,
                path: path.to_string(),
            });
        }

        self.resolve(path).ok_or_else(|| ValidateError::UnknownPath {
            entity: self.name,
            path: path.to_string(),
        })
    }
}

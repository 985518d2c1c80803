use super::{
    Collection,
    eval::Program,
    select::{self, Deadline},
};
use crate::{
    Error,
    backend::{Assignment, BackendError, Change, ChangeEvent, ChangeKind, WriteResult},
    expr::{Segment, Step},
    model::RecordModel,
    query::Query,
    value::{Document, Value},
};
use std::collections::HashSet;

/// Insert every document or none: identities must be new and unique within
/// the batch.
pub(super) fn insert(
    collection: &Collection,
    model: &'static RecordModel,
    documents: Vec<Document>,
) -> Result<WriteResult, Error> {
    let identity = identity(model)?;
    let mut rows = collection.rows.write();

    let mut batch = HashSet::with_capacity(documents.len());
    let mut keys = Vec::with_capacity(documents.len());
    for document in &documents {
        let key = document
            .get(identity)
            .filter(|value| !value.is_null())
            .cloned()
            .ok_or_else(|| {
                BackendError::constraint(format!("{} document has no '{identity}'", model.name))
            })?;

        if rows.contains_key(&key) || !batch.insert(key.clone()) {
            return Err(
                BackendError::constraint(format!("duplicate {} identity {key}", model.name)).into(),
            );
        }
        keys.push(key);
    }

    let inserted = u64::try_from(documents.len()).unwrap_or(u64::MAX);
    for (key, document) in keys.into_iter().zip(documents) {
        rows.insert(key.clone(), document.clone());
        collection.publish(ChangeEvent {
            kind: ChangeKind::Insert,
            key,
            new_value: Some(document),
            old_value: None,
        });
    }

    Ok(WriteResult::inserted(inserted))
}

/// Apply `change` to every target of `query`; all targets succeed or none
/// is written.
pub(super) fn update(
    collection: &Collection,
    model: &'static RecordModel,
    query: &Query,
    program: &Program,
    change: &Change,
    deadline: Deadline,
) -> Result<WriteResult, Error> {
    let identity = identity(model)?;
    let mut rows = collection.rows.write();

    let mut updates = Vec::new();
    for (key, old) in select::targets(&rows, query, program, deadline)? {
        let new = match change {
            Change::Assign(assignments) => assign(model, identity, old.clone(), assignments)?,
            Change::Replace(document) => {
                if document.get(identity) != Some(key) {
                    return Err(BackendError::constraint(format!(
                        "replacement would change the identity of {} {key}",
                        model.name
                    ))
                    .into());
                }
                document.clone()
            }
        };
        updates.push((key.clone(), old.clone(), new));
    }

    let updated = u64::try_from(updates.len()).unwrap_or(u64::MAX);
    for (key, old, new) in updates {
        rows.insert(key.clone(), new.clone());
        collection.publish(ChangeEvent {
            kind: ChangeKind::Update,
            key,
            new_value: Some(new),
            old_value: Some(old),
        });
    }

    Ok(WriteResult::updated(updated))
}

pub(super) fn delete(
    collection: &Collection,
    query: &Query,
    program: &Program,
    deadline: Deadline,
) -> Result<WriteResult, Error> {
    let mut rows = collection.rows.write();
    let keys: Vec<Value> = select::targets(&rows, query, program, deadline)?
        .into_iter()
        .map(|(key, _)| key.clone())
        .collect();

    let mut deleted = 0;
    for key in keys {
        if let Some(old) = rows.remove(&key) {
            deleted += 1;
            collection.publish(ChangeEvent {
                kind: ChangeKind::Delete,
                key,
                new_value: None,
                old_value: Some(old),
            });
        }
    }

    Ok(WriteResult::deleted(deleted))
}

fn identity(model: &RecordModel) -> Result<&'static str, BackendError> {
    model.identity.ok_or_else(|| {
        BackendError::constraint(format!("{} declares no identity attribute", model.name))
    })
}

fn assign(
    model: &RecordModel,
    identity: &str,
    mut document: Document,
    assignments: &[Assignment],
) -> Result<Document, Error> {
    for assignment in assignments {
        let path = &assignment.path;
        let Some((first, rest)) = path.segments().split_first() else {
            let err = BackendError::constraint(format!("empty assignment path on {}", model.name));
            return Err(err.into());
        };

        if matches!(first.step(), Step::Field(name) if *name == identity) {
            return Err(BackendError::constraint(format!(
                "identity attribute '{identity}' of {} cannot be assigned",
                model.name
            ))
            .into());
        }

        let Step::Field(name) = first.step() else {
            let err = BackendError::constraint(format!("'{path}' does not start at a field"));
            return Err(err.into());
        };

        set_field(&mut document, name, rest, assignment.value.clone()).ok_or_else(|| {
            BackendError::constraint(format!("'{path}' does not reach a stored value"))
        })?;
    }

    Ok(document)
}

// `None` when an intermediate step is absent or has the wrong shape.
fn set_field(
    document: &mut Document,
    name: &str,
    rest: &[Segment],
    value: Option<Value>,
) -> Option<()> {
    match rest.split_first() {
        None => {
            match value {
                Some(value) => document.insert(name.to_string(), value),
                None => document.remove(name),
            };
            Some(())
        }
        Some((next, tail)) => set_value(document.get_mut(name)?, next, tail, value),
    }
}

fn set_value(
    target: &mut Value,
    segment: &Segment,
    rest: &[Segment],
    value: Option<Value>,
) -> Option<()> {
    match (segment.step(), target) {
        (Step::Field(name), Value::Record(document)) => set_field(document, name, rest, value),
        (Step::Index(index), Value::List(items)) => {
            let slot = items.get_mut(*index)?;
            match rest.split_first() {
                None => {
                    *slot = value?;
                    Some(())
                }
                Some((next, tail)) => set_value(slot, next, tail, value),
            }
        }
        _ => None,
    }
}

mod config;
mod eval;
mod select;
mod watch;
mod write;

#[cfg(test)]
mod tests;

use crate::{
    Error,
    backend::{Backend, ChangeEvent, Operation, Reply, ResultSequence, Session, WriteResult},
    model::RecordModel,
    query::Query,
};
use eval::Program;
use futures::{StreamExt, TryStreamExt, future, stream};
use parking_lot::{Mutex, RwLock};
use select::{Deadline, Rows};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::broadcast;

// re-exports
pub use config::{ConfigError, MemoryConfig};

///
/// InMemoryBackend
///
/// Reference adapter holding one collection per record type. Supports the
/// whole operator set and every operation, including Watch. Clones share
/// the same collections.
///

#[derive(Clone, Debug)]
pub struct InMemoryBackend {
    config: Arc<MemoryConfig>,
    collections: Arc<Mutex<HashMap<&'static str, Arc<Collection>>>>,
}

impl InMemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MemoryConfig::default())
    }

    #[must_use]
    pub fn with_config(config: MemoryConfig) -> Self {
        Self {
            config: Arc::new(config),
            collections: Arc::default(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    /// Number of records stored for `model`.
    #[must_use]
    pub fn stored(&self, model: &'static RecordModel) -> usize {
        self.collection(model).rows.read().len()
    }

    fn collection(&self, model: &'static RecordModel) -> Arc<Collection> {
        let mut collections = self.collections.lock();
        let collection = collections
            .entry(model.name)
            .or_insert_with(|| Arc::new(Collection::new(self.config.watch_capacity)));

        Arc::clone(collection)
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for InMemoryBackend {
    fn open(&self, model: &'static RecordModel) -> Arc<dyn Session> {
        tracing::debug!(entity = model.name, "open memory session");

        Arc::new(MemorySession {
            model,
            collection: self.collection(model),
            config: Arc::clone(&self.config),
        })
    }
}

///
/// Collection
///
/// Documents of one record type keyed by identity, plus the change feed
/// watch subscribers read from.
///

#[derive(Debug)]
struct Collection {
    rows: RwLock<Rows>,
    changes: broadcast::Sender<ChangeEvent>,
}

impl Collection {
    fn new(watch_capacity: usize) -> Self {
        let (changes, _) = broadcast::channel(watch_capacity.max(1));

        Self {
            rows: RwLock::new(Rows::new()),
            changes,
        }
    }

    // Sent under the write lock so subscribers see commit order; having no
    // subscriber is not an error.
    fn publish(&self, event: ChangeEvent) {
        self.changes.send(event).ok();
    }
}

///
/// MemorySession
///

#[derive(Clone)]
struct MemorySession {
    model: &'static RecordModel,
    collection: Arc<Collection>,
    config: Arc<MemoryConfig>,
}

impl MemorySession {
    fn deadline(&self, query: Option<&Query>) -> Deadline {
        let budget = query
            .and_then(Query::deadline)
            .or_else(|| self.config.default_timeout());

        Deadline::start(budget)
    }

    fn prepare(&self, query: &Query) -> Result<Program, Error> {
        query.validate()?;
        let program = Program::compile(query)?;

        if self.config.debug {
            tracing::debug!(
                entity = self.model.name,
                plan = %query,
                fingerprint = %query.fingerprint(),
                "memory plan"
            );
        } else {
            tracing::trace!(
                entity = self.model.name,
                plan = %query,
                fingerprint = %query.fingerprint(),
                "memory plan"
            );
        }

        Ok(program)
    }

    fn run(&self, operation: Operation) -> Result<ResultSequence, Error> {
        let deadline = self.deadline(operation.query());
        deadline.check()?;

        match operation {
            Operation::Select(query) => {
                let program = self.prepare(&query)?;
                let replies =
                    select::select(&self.collection.rows.read(), &query, &program, deadline)?;

                Ok(paced(replies, deadline))
            }
            Operation::Insert { documents } => {
                let result = write::insert(&self.collection, self.model, documents)?;

                Ok(self.written(result))
            }
            Operation::Update { query, change } => {
                let program = self.prepare(&query)?;
                let result = write::update(
                    &self.collection,
                    self.model,
                    &query,
                    &program,
                    &change,
                    deadline,
                )?;

                Ok(self.written(result))
            }
            Operation::Delete { query } => {
                let program = self.prepare(&query)?;
                let result = write::delete(&self.collection, &query, &program, deadline)?;

                Ok(self.written(result))
            }
            Operation::Watch(query) => {
                let program = self.prepare(&query)?;

                watch::subscribe(&self.collection, query, program)
            }
        }
    }

    fn written(&self, result: WriteResult) -> ResultSequence {
        tracing::trace!(
            entity = self.model.name,
            inserted = result.inserted,
            updated = result.updated,
            deleted = result.deleted,
            "memory write"
        );

        stream::iter([Ok(Reply::Written(result))]).boxed()
    }
}

impl Session for MemorySession {
    fn model(&self) -> &'static RecordModel {
        self.model
    }

    fn execute(&self, operation: Operation) -> ResultSequence {
        tracing::debug!(
            entity = self.model.name,
            operation = %operation.kind(),
            query = operation.query().map(ToString::to_string),
            "execute"
        );

        // nothing runs until the first poll
        let session = self.clone();
        stream::once(future::lazy(move |_| session.run(operation)))
            .try_flatten()
            .boxed()
    }
}

// Emit replies one at a time, checking the deadline before each.
fn paced(replies: Vec<Reply>, deadline: Deadline) -> ResultSequence {
    stream::unfold(Some(replies.into_iter()), move |rows| async move {
        let mut rows = rows?;
        let reply = rows.next()?;

        match deadline.check() {
            Ok(()) => Some((Ok(reply), Some(rows))),
            Err(err) => Some((Err(err), None)),
        }
    })
    .boxed()
}

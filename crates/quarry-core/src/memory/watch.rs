use super::{Collection, eval::Program};
use crate::{
    Error,
    backend::{BackendError, ChangeEvent, Reply, ResultSequence},
    query::Query,
};
use futures::{StreamExt, stream};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

///
/// Watcher
/// Filter applied to the change feed of one subscription.
///

struct Watcher {
    query: Query,
    program: Program,
}

impl Watcher {
    // An event belongs to the match set when either side of it matches.
    fn admits(&self, event: &ChangeEvent) -> bool {
        [&event.new_value, &event.old_value]
            .into_iter()
            .flatten()
            .any(|document| self.program.matches(self.query.predicate(), document))
    }
}

/// Subscribe to `collection` now and stream matching changes until the feed
/// closes. A subscriber that falls behind the buffer ends with a connection
/// error.
pub(super) fn subscribe(
    collection: &Collection,
    query: Query,
    program: Program,
) -> Result<ResultSequence, Error> {
    if query.is_projected() || query.is_grouped() || query.is_count() {
        return Err(BackendError::not_supported(format!(
            "watch over {} supports filters only",
            query.model().name
        ))
        .into());
    }

    let receiver = collection.changes.subscribe();
    let watcher = Arc::new(Watcher { query, program });

    let events = stream::unfold(Some(receiver), move |receiver| {
        let watcher = Arc::clone(&watcher);

        async move {
            let mut receiver = receiver?;
            loop {
                match receiver.recv().await {
                    Ok(event) if watcher.admits(&event) => {
                        return Some((Ok(Reply::Change(event)), Some(receiver)));
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(missed)) => {
                        let err = BackendError::connection(format!(
                            "watch subscriber lagged behind by {missed} events"
                        ));
                        return Some((Err(Error::from(err)), None));
                    }
                    Err(RecvError::Closed) => return None,
                }
            }
        }
    });

    Ok(events.boxed())
}

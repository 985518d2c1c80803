use crate::{
    Error,
    fetch::{Promise, Publisher},
    mapper::ProjectionError,
};
use futures::{
    StreamExt, TryStreamExt,
    executor::{self, BlockingStream},
};

///
/// Discipline
///
/// Decides only the terminal shape of a publisher; all query semantics live
/// in the shared reactive core.
///

pub trait Discipline: Send + Sync + 'static {
    /// Shape of a many-valued terminal.
    type Many<T: Send + 'static>;

    /// Shape of a single-valued terminal.
    type One<T: Send + 'static>;

    /// Shape of an unbounded stream such as a watch.
    type Stream<T: Send + 'static>;

    fn many<T: Send + 'static>(publisher: Publisher<T>) -> Self::Many<T>;

    fn one<T: Send + 'static>(publisher: Publisher<T>) -> Self::One<T>;

    fn stream<T: Send + 'static>(publisher: Publisher<T>) -> Self::Stream<T>;
}

// A single-valued publisher must yield exactly one element.
async fn single<T>(mut publisher: Publisher<T>) -> Result<T, Error> {
    match publisher.try_next().await? {
        Some(value) => Ok(value),
        None => Err(ProjectionError::UnexpectedReply {
            expected: "one element",
            found: "end of sequence",
        }
        .into()),
    }
}

///
/// Synchronous
/// Blocks the calling thread until the result is available.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct Synchronous;

impl Discipline for Synchronous {
    type Many<T: Send + 'static> = Result<Vec<T>, Error>;
    type One<T: Send + 'static> = Result<T, Error>;
    type Stream<T: Send + 'static> = BlockingStream<Publisher<T>>;

    fn many<T: Send + 'static>(publisher: Publisher<T>) -> Self::Many<T> {
        executor::block_on(publisher.try_collect())
    }

    fn one<T: Send + 'static>(publisher: Publisher<T>) -> Self::One<T> {
        executor::block_on(single(publisher))
    }

    fn stream<T: Send + 'static>(publisher: Publisher<T>) -> Self::Stream<T> {
        executor::block_on_stream(publisher)
    }
}

///
/// Asynchronous
/// Returns cancellable promises.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct Asynchronous;

impl Discipline for Asynchronous {
    type Many<T: Send + 'static> = Promise<Vec<T>>;
    type One<T: Send + 'static> = Promise<T>;
    type Stream<T: Send + 'static> = Publisher<T>;

    fn many<T: Send + 'static>(publisher: Publisher<T>) -> Self::Many<T> {
        Promise::from_publisher(publisher, |rows: Publisher<T>| rows.try_collect())
    }

    fn one<T: Send + 'static>(publisher: Publisher<T>) -> Self::One<T> {
        Promise::from_publisher(publisher, single)
    }

    fn stream<T: Send + 'static>(publisher: Publisher<T>) -> Self::Stream<T> {
        publisher
    }
}

///
/// Reactive
/// Hands back the publisher itself.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct Reactive;

impl Discipline for Reactive {
    type Many<T: Send + 'static> = Publisher<T>;
    type One<T: Send + 'static> = Publisher<T>;
    type Stream<T: Send + 'static> = Publisher<T>;

    fn many<T: Send + 'static>(publisher: Publisher<T>) -> Self::Many<T> {
        publisher
    }

    fn one<T: Send + 'static>(publisher: Publisher<T>) -> Self::One<T> {
        // at most one element reaches the subscriber
        publisher.take(1).boxed()
    }

    fn stream<T: Send + 'static>(publisher: Publisher<T>) -> Self::Stream<T> {
        publisher
    }
}

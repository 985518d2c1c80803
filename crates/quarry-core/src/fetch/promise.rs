use crate::{
    Error,
    fetch::{Interrupt, Interruptible, Publisher},
};
use futures::{FutureExt, StreamExt, future::BoxFuture};
use std::{
    fmt,
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

///
/// Promise
///
/// Cancellable future returned by the asynchronous discipline. Nothing runs
/// until it is first polled.
///

pub struct Promise<T> {
    future: BoxFuture<'static, Result<T, Error>>,
    interrupt: Interrupt,
}

impl<T: Send + 'static> Promise<T> {
    /// Guard `publisher` with a fresh interrupt and reduce it with `finish`.
    pub(crate) fn from_publisher<U, F, Fut>(publisher: Publisher<U>, finish: F) -> Self
    where
        U: Send + 'static,
        F: FnOnce(Publisher<U>) -> Fut,
        Fut: Future<Output = Result<T, Error>> + Send + 'static,
    {
        let interrupt = Interrupt::new();
        let guarded = Interruptible::new(publisher, interrupt.clone()).boxed();

        Self {
            future: finish(guarded).boxed(),
            interrupt,
        }
    }

    /// Cancel the promise; a pending or later poll resolves to `Interrupted`.
    pub fn cancel(&self) {
        self.interrupt.trigger();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.interrupt.is_triggered()
    }

    /// Handle for cancelling from elsewhere.
    #[must_use]
    pub fn interrupt(&self) -> Interrupt {
        self.interrupt.clone()
    }
}

impl<T> Future for Promise<T> {
    type Output = Result<T, Error>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.future.poll_unpin(cx)
    }
}

impl<T> fmt::Debug for Promise<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise")
            .field("interrupt", &self.interrupt)
            .finish_non_exhaustive()
    }
}

use crate::Error;
use futures::{Stream, StreamExt, task::AtomicWaker};
use parking_lot::Mutex;
use std::{
    fmt,
    pin::Pin,
    sync::{
        Arc, Weak,
        atomic::{AtomicBool, Ordering},
    },
    task::{Context, Poll},
};

///
/// Interrupt
///
/// Cloneable cancellation handle. Triggering it ends every stream guarded by
/// it with `Error::Interrupted` and drops the underlying backend sequence.
///

#[derive(Clone, Default)]
pub struct Interrupt {
    state: Arc<InterruptState>,
}

#[derive(Default)]
struct InterruptState {
    triggered: AtomicBool,
    wakers: Mutex<Vec<Weak<AtomicWaker>>>,
}

impl Interrupt {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Trigger the interrupt; idempotent.
    pub fn trigger(&self) {
        if self.state.triggered.swap(true, Ordering::SeqCst) {
            return;
        }

        let wakers = std::mem::take(&mut *self.state.wakers.lock());
        for waker in wakers.iter().filter_map(Weak::upgrade) {
            waker.wake();
        }
    }

    #[must_use]
    pub fn is_triggered(&self) -> bool {
        self.state.triggered.load(Ordering::SeqCst)
    }

    fn subscribe(&self) -> Arc<AtomicWaker> {
        let waker = Arc::new(AtomicWaker::new());

        let mut wakers = self.state.wakers.lock();
        wakers.retain(|weak| weak.strong_count() > 0);
        wakers.push(Arc::downgrade(&waker));

        waker
    }
}

impl fmt::Debug for Interrupt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interrupt")
            .field("triggered", &self.is_triggered())
            .finish()
    }
}

///
/// Interruptible
///
/// Stream adapter that observes an `Interrupt` between elements.
///

pub struct Interruptible<S> {
    inner: Option<S>,
    interrupt: Interrupt,
    waker: Arc<AtomicWaker>,
}

impl<S> Interruptible<S> {
    pub fn new(inner: S, interrupt: Interrupt) -> Self {
        let waker = interrupt.subscribe();

        Self {
            inner: Some(inner),
            interrupt,
            waker,
        }
    }
}

impl<S, T> Stream for Interruptible<S>
where
    S: Stream<Item = Result<T, Error>> + Unpin,
{
    type Item = Result<T, Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        let Some(inner) = this.inner.as_mut() else {
            return Poll::Ready(None);
        };

        this.waker.register(cx.waker());
        if this.interrupt.is_triggered() {
            // release the backend cursor now
            this.inner = None;
            return Poll::Ready(Some(Err(Error::Interrupted)));
        }

        match inner.poll_next_unpin(cx) {
            Poll::Ready(None) => {
                this.inner = None;
                Poll::Ready(None)
            }
            other => other,
        }
    }
}

//! Per-call cancellation
//!
//! The first argument of every provider, resource and data source method.
//! Clones share one done channel; [`Context::with_timeout`] derives a child
//! that is done at its deadline or as soon as the parent is.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::time;

#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    deadline: Option<Instant>,
    done: watch::Receiver<bool>,
    done_tx: watch::Sender<bool>,
}

impl Context {
    pub fn new() -> Self {
        let (done_tx, done) = watch::channel(false);

        Self {
            inner: Arc::new(ContextInner {
                deadline: None,
                done,
                done_tx,
            }),
        }
    }

    /// Child that is done `timeout` from now or when `self` is done.
    /// An earlier parent deadline wins. Needs a running tokio runtime.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        let requested = Instant::now() + timeout;
        let deadline = self.inner.deadline.map_or(requested, |d| d.min(requested));
        let (done_tx, done) = watch::channel(self.is_cancelled());

        let tx = done_tx.clone();
        let parent = self;
        tokio::spawn(async move {
            tokio::select! {
                _ = time::sleep_until(deadline.into()) => {}
                _ = parent.cancelled() => {}
                // every child handle is gone
                _ = tx.closed() => return,
            }
            let _ = tx.send(true);
        });

        Self {
            inner: Arc::new(ContextInner {
                deadline: Some(deadline),
                done,
                done_tx,
            }),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    /// Flips to true once work for this context should stop; meant for
    /// callers that `select!` on it themselves
    pub fn done(&self) -> watch::Receiver<bool> {
        self.inner.done.clone()
    }

    pub fn cancel(&self) {
        let _ = self.inner.done_tx.send(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.done.borrow() || self.inner.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Resolves once the context is done
    pub async fn cancelled(&self) {
        let mut done = self.done();
        if done.wait_for(|d| *d).await.is_err() {
            // sender gone without ever cancelling
            std::future::pending::<()>().await;
        }
    }

    /// Drives `fut` unless the context is done first, in which case `fut`
    /// is dropped mid-flight and None comes back
    pub async fn run<F: Future>(&self, fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            _ = self.cancelled() => None,
            out = fut => Some(out),
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use tokio::time::{sleep, timeout};

    #[tokio::test]
    async fn manual_cancel_is_seen_by_clones() {
        let ctx = Context::new();
        let clone = ctx.clone();

        assert!(!clone.is_cancelled());
        ctx.cancel();
        assert!(clone.is_cancelled());
    }

    #[tokio::test]
    async fn timeout_cancels() {
        let ctx = Context::new().with_timeout(Duration::from_millis(50));
        assert!(!ctx.is_cancelled());

        timeout(Duration::from_secs(2), ctx.cancelled())
            .await
            .expect("deadline should fire");
        assert!(ctx.is_cancelled());
    }

    #[tokio::test]
    async fn parent_cancel_reaches_child() {
        let parent = Context::new();
        let child = parent.clone().with_timeout(Duration::from_secs(60));
        let mut done = child.done();

        parent.cancel();

        timeout(Duration::from_secs(2), done.wait_for(|d| *d))
            .await
            .expect("child should follow parent")
            .unwrap();
        assert!(child.is_cancelled());
    }

    #[tokio::test]
    async fn nested_timeout_keeps_earliest_deadline() {
        let outer = Context::new().with_timeout(Duration::from_secs(1));
        let first = outer.deadline();
        let inner = outer.with_timeout(Duration::from_secs(30));

        assert_eq!(inner.deadline(), first);
    }

    #[tokio::test]
    async fn run_drops_work_once_cancelled() {
        let ctx = Context::new();
        assert_eq!(ctx.run(async { 5 }).await, Some(5));

        let canceller = ctx.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let out = timeout(Duration::from_secs(2), ctx.run(std::future::pending::<()>()))
            .await
            .expect("run should return after cancel");
        assert_eq!(out, None);
    }
}

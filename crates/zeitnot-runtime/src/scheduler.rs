//! One-shot wake scheduling on a tokio LocalSet

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use tokio::task::JoinHandle;
use zeitnot_clock::{WakeCallback, WakeScheduler, WakeToken};

struct Inner {
    next_token: u64,
    tasks: HashMap<u64, JoinHandle<()>>,
}

/// [`WakeScheduler`] backed by `tokio::task::spawn_local` + `tokio::time::sleep`.
///
/// Each wake is its own task: it sleeps, deregisters itself, then runs the
/// callback. Cancellation aborts the sleeping task, so a cancelled wake never
/// invokes its callback; cancelling a token that already fired finds no task
/// and is a no-op. All of this happens on one thread, so there is no window
/// between deregistration and the callback running.
pub struct TokioScheduler {
    inner: Rc<RefCell<Inner>>,
}

impl TokioScheduler {
    pub fn new() -> Rc<Self> {
        Rc::new(TokioScheduler {
            inner: Rc::new(RefCell::new(Inner {
                next_token: 0,
                tasks: HashMap::new(),
            })),
        })
    }

    /// Number of wakes currently sleeping
    pub fn pending_count(&self) -> usize {
        self.inner.borrow().tasks.len()
    }
}

impl WakeScheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, callback: WakeCallback) -> WakeToken {
        let token = {
            let mut inner = self.inner.borrow_mut();
            inner.next_token += 1;
            WakeToken(inner.next_token)
        };

        tracing::debug!(token = token.0, ?delay, "wake scheduled");
        let registry = Rc::downgrade(&self.inner);
        let handle = tokio::task::spawn_local(async move {
            tokio::time::sleep(delay).await;
            if let Some(registry) = registry.upgrade() {
                registry.borrow_mut().tasks.remove(&token.0);
            }
            tracing::debug!(token = token.0, "wake fired");
            callback();
        });

        self.inner.borrow_mut().tasks.insert(token.0, handle);
        token
    }

    fn cancel(&self, token: WakeToken) {
        if let Some(handle) = self.inner.borrow_mut().tasks.remove(&token.0) {
            tracing::debug!(token = token.0, "wake cancelled");
            handle.abort();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, handle) in self.inner.borrow_mut().tasks.drain() {
            handle.abort();
        }
    }
}

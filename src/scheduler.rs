//! Background task scheduler for page prefetches.
//!
//! Every spawned task holds a clone of the scheduler's drain sender. Closing
//! drops the scheduler's own sender and waits on the receiver, which only
//! yields once the last task has finished and dropped its clone.

use crate::{Error, Result};
use std::future::Future;
use std::sync::{Mutex, PoisonError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub(crate) struct Scheduler {
    sender: Mutex<Option<mpsc::Sender<()>>>,
    drained: tokio::sync::Mutex<mpsc::Receiver<()>>,
}

impl Scheduler {
    pub(crate) fn new() -> Self {
        let (sender, receiver) = mpsc::channel(1);
        Self {
            sender: Mutex::new(Some(sender)),
            drained: tokio::sync::Mutex::new(receiver),
        }
    }

    /// Spawns `task` on the current runtime.
    ///
    /// Fails with [`Error::ClientClosed`] once [`close`](Self::close) was called.
    pub(crate) fn spawn<F>(&self, task: F) -> Result<JoinHandle<F::Output>>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let guard = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(Error::ClientClosed)?;

        Ok(tokio::spawn(async move {
            let _guard = guard;
            task.await
        }))
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    /// Stops accepting tasks and waits for the running ones to finish.
    pub(crate) async fn close(&self) {
        drop(
            self.sender
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take(),
        );
        // Only returns `None`: nothing is ever sent.
        let _ = self.drained.lock().await.recv().await;
    }
}

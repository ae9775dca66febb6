//! # Dispatch
//!
//! Work queue between the watchers and the reconcilers.
//!
//! Each controller owns one queue of [`ObjectKey`]s. Watch events push keys
//! in; a dispatcher pulls them out and runs the reconciler with bounded
//! concurrency. Failed keys are pushed back after the error policy's delay.
//!
//! A key is held at most once. What happens to a new request depends on where
//! the key already is:
//!
//! | Key state  | New request                                         |
//! |------------|-----------------------------------------------------|
//! | unknown    | queued                                              |
//! | queued     | dropped, the queued entry covers it                 |
//! | running    | remembered, the key is queued again when it finishes |
//! | scheduled  | queued now, the pending retry is discarded          |
//!
//! A key is therefore never reconciled by two workers at once and never has
//! more than one retry pending.

use crate::controller::backoff::BackoffRegistry;
use crate::controller::reconciler::{Reconcile, ReconcileOutcome};
use crate::observability;
use crate::runtime::error_policy::handle_reconciliation_error;
use crate::store::ObjectKey;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch, Semaphore};
use tracing::{debug, info, Instrument};

/// Why a key is being reconciled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerSource {
    /// A watch event for the object
    Watch,
    /// A retry scheduled by a previous pass
    Requeue,
}

impl TriggerSource {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerSource::Watch => "watch",
            TriggerSource::Requeue => "requeue",
        }
    }
}

/// A queued reconciliation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub key: ObjectKey,
    pub trigger: TriggerSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyState {
    Queued,
    /// `dirty` is set when a request arrives mid-pass
    Running { dirty: bool },
    /// Only the timer carrying the same generation may queue the key
    Scheduled { generation: u64 },
}

#[derive(Debug, Default)]
struct PendingKeys {
    states: HashMap<ObjectKey, KeyState>,
    next_generation: u64,
}

/// What to do with a key once its pass is over
enum AfterPass {
    Idle,
    QueueNow,
    Retry { delay: Duration, generation: u64 },
}

/// Producer side of a controller's queue
#[derive(Debug, Clone)]
pub struct RequestSender {
    tx: mpsc::Sender<Request>,
    pending: Arc<Mutex<PendingKeys>>,
}

/// Create a controller queue holding at most `capacity` pending requests
#[must_use]
pub fn request_queue(capacity: usize) -> (RequestSender, mpsc::Receiver<Request>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let sender = RequestSender {
        tx,
        pending: Arc::new(Mutex::new(PendingKeys::default())),
    };
    (sender, rx)
}

impl RequestSender {
    fn lock(&self) -> MutexGuard<'_, PendingKeys> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue `key` for reconciliation unless it is already queued or running.
    /// Returns false once the dispatcher is gone.
    pub async fn enqueue(&self, key: ObjectKey, trigger: TriggerSource) -> bool {
        let admitted = {
            let mut pending = self.lock();
            match pending.states.get(&key).copied() {
                Some(KeyState::Queued) => false,
                Some(KeyState::Running { .. }) => {
                    pending
                        .states
                        .insert(key.clone(), KeyState::Running { dirty: true });
                    false
                }
                Some(KeyState::Scheduled { .. }) | None => {
                    pending.states.insert(key.clone(), KeyState::Queued);
                    true
                }
            }
        };

        if admitted {
            self.send(key, trigger).await
        } else {
            debug!(resource = %key, trigger = trigger.as_str(), "Key already pending, request merged");
            !self.tx.is_closed()
        }
    }

    /// Number of keys queued, running or waiting for a retry
    #[must_use]
    pub fn pending_keys(&self) -> usize {
        self.lock().states.len()
    }

    async fn send(&self, key: ObjectKey, trigger: TriggerSource) -> bool {
        let request = Request {
            key: key.clone(),
            trigger,
        };
        if self.tx.send(request).await.is_err() {
            self.lock().states.remove(&key);
            return false;
        }
        true
    }

    fn mark_running(&self, key: &ObjectKey) {
        self.lock()
            .states
            .insert(key.clone(), KeyState::Running { dirty: false });
    }

    /// Settle `key` after a pass that asked for `retry` (if any)
    async fn finish(&self, key: ObjectKey, retry: Option<Duration>) {
        let next = {
            let mut pending = self.lock();
            let dirty = pending.states.get(&key) == Some(&KeyState::Running { dirty: true });
            if dirty {
                pending.states.insert(key.clone(), KeyState::Queued);
                AfterPass::QueueNow
            } else if let Some(delay) = retry {
                let generation = pending.next_generation;
                pending.next_generation = pending.next_generation.wrapping_add(1);
                pending
                    .states
                    .insert(key.clone(), KeyState::Scheduled { generation });
                AfterPass::Retry { delay, generation }
            } else {
                pending.states.remove(&key);
                AfterPass::Idle
            }
        };

        match next {
            AfterPass::Idle => {}
            AfterPass::QueueNow => {
                self.send(key, TriggerSource::Watch).await;
            }
            AfterPass::Retry { delay, generation } => self.schedule(key, delay, generation),
        }
    }

    fn schedule(&self, key: ObjectKey, delay: Duration, generation: u64) {
        let sender = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let due = {
                let mut pending = sender.lock();
                let due = pending.states.get(&key) == Some(&KeyState::Scheduled { generation });
                if due {
                    pending.states.insert(key.clone(), KeyState::Queued);
                }
                due
            };
            if due && !sender.send(key.clone(), TriggerSource::Requeue).await {
                debug!(resource = %key, "Queue closed, dropping requeue");
            }
        });
    }
}

/// Run one reconciliation and return the requeue delay, if any
///
/// Success resets the key's backoff. Errors are routed through the error
/// policy, which picks either the error's fixed delay or the next backoff step.
pub async fn process_request(
    reconciler: &dyn Reconcile,
    request: &Request,
    backoff: &BackoffRegistry,
) -> Option<Duration> {
    let controller = reconciler.name();
    let key = &request.key;
    let span = tracing::info_span!(
        "controller.reconcile",
        controller,
        resource = %key,
        trigger = request.trigger.as_str()
    );

    async {
        observability::metrics::increment_reconciliations(controller);
        let started = Instant::now();
        let result = reconciler.reconcile(key).await;
        observability::metrics::observe_reconciliation_duration(
            controller,
            started.elapsed().as_secs_f64(),
        );

        match result {
            Ok(ReconcileOutcome::Done) => {
                backoff.reset(key);
                debug!("Reconciliation complete");
                None
            }
            Err(e) => Some(handle_reconciliation_error(controller, key, &e, backoff)),
        }
    }
    .instrument(span)
    .await
}

/// Pull requests off `requests` until shutdown or until every sender is dropped
pub async fn run_dispatcher(
    reconciler: Arc<dyn Reconcile>,
    mut requests: mpsc::Receiver<Request>,
    sender: RequestSender,
    backoff: Arc<BackoffRegistry>,
    max_concurrent: usize,
    mut shutdown: watch::Receiver<bool>,
) {
    let controller = reconciler.name();
    let permits = Arc::new(Semaphore::new(max_concurrent.max(1)));
    info!(controller, max_concurrent, "Dispatcher started");

    loop {
        let request = tokio::select! {
            _ = shutdown.changed() => break,
            request = requests.recv() => match request {
                Some(request) => request,
                None => break,
            },
        };

        let Ok(permit) = Arc::clone(&permits).acquire_owned().await else {
            break;
        };
        sender.mark_running(&request.key);
        let reconciler = Arc::clone(&reconciler);
        let backoff = Arc::clone(&backoff);
        let sender = sender.clone();
        tokio::spawn(async move {
            let retry = process_request(reconciler.as_ref(), &request, &backoff).await;
            // Release before requeueing so a full queue cannot stall the dispatcher
            drop(permit);
            sender.finish(request.key, retry).await;
        });
    }

    info!(controller, "Dispatcher stopped");
}

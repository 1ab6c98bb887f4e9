//! Mode scheduler with a FIFO queue, cancellation and restore-to-base.
//!
//! Provides [`Scheduler`], which runs queued [`Mode`]s one at a time against a
//! shared [`Light`]. When the queue runs dry the scheduler returns the fixture
//! to the base color and goes idle.
//!
//! Each mode instance runs as its own tokio task. Cancelling aborts that task,
//! which takes effect at its next timed wait; whatever it wrote last stays on
//! the fixture until the next mode or the restore overwrites it.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use heapless::Deque;
use log::{debug, error, info, warn};
use palette::Srgb;
use tokio::sync::{Notify, oneshot, watch};
use tokio::task::{AbortHandle, JoinError};

use crate::light::Light;
use crate::mode::Mode;
use crate::pwm::PwmError;
use crate::transition::DEFAULT_DURATION;
use crate::types::RestoreStyle;

/// Maximum number of modes waiting to run.
pub const QUEUE_CAPACITY: usize = 32;

/// The current state of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Nothing queued, nothing running. The fixture shows the base color.
    Idle,
    /// Consumer loop active, running queued modes one at a time.
    Draining,
    /// Queue exhausted, returning the fixture to the base color.
    Restoring,
}

/// How a mode instance ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeOutcome {
    /// Ran to its natural end.
    Completed,
    /// Stopped by [`Scheduler::cancel`] or [`Scheduler::close`].
    Cancelled,
    /// Aborted by a hardware write failure.
    Failed(String),
}

impl fmt::Display for ModeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModeOutcome::Completed => write!(f, "completed"),
            ModeOutcome::Cancelled => write!(f, "cancelled"),
            ModeOutcome::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Errors that can occur when queueing a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SchedulerError {
    /// The queue already holds [`QUEUE_CAPACITY`] modes.
    #[error("mode queue is full ({capacity} pending)")]
    QueueFull { capacity: usize },

    /// The scheduler has been closed for shutdown.
    #[error("scheduler is closed")]
    Closed,
}

/// Handle resolving when a queued mode instance ends.
#[derive(Debug)]
pub struct Completion {
    id: u64,
    done: oneshot::Receiver<ModeOutcome>,
}

impl Completion {
    /// Sequence number of the mode instance.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Waits for the mode to end.
    ///
    /// A mode dropped from the queue before it started counts as cancelled.
    pub async fn wait(self) -> ModeOutcome {
        self.done.await.unwrap_or(ModeOutcome::Cancelled)
    }
}

struct Pending {
    id: u64,
    mode: Mode,
    done: oneshot::Sender<ModeOutcome>,
}

struct Running {
    id: u64,
    name: &'static str,
    abort: AbortHandle,
}

struct Queue {
    state: SchedulerState,
    pending: Deque<Pending, QUEUE_CAPACITY>,
    running: Option<Running>,
    next_id: u64,
    closed: bool,
}

struct Shared {
    light: Light,
    restore: RestoreStyle,
    queue: Mutex<Queue>,
    wake: Notify,
    state_tx: watch::Sender<SchedulerState>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Queue> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, queue: &mut Queue, state: SchedulerState) {
        queue.state = state;
        self.state_tx.send_replace(state);
    }

    async fn restore_base(&self) -> Result<(), PwmError> {
        let base = self.light.base();
        match self.restore {
            RestoreStyle::Snap => self.light.write(base),
            RestoreStyle::Smooth => {
                let observed = self.light.output();
                self.light.transition(base, Some(observed), DEFAULT_DURATION).await
            }
        }
    }
}

/// Runs animation modes one at a time against a single fixture.
///
/// Cloning yields another handle to the same scheduler.
#[derive(Clone)]
pub struct Scheduler {
    shared: Arc<Shared>,
}

impl Scheduler {
    /// Creates an idle scheduler. Nothing is written to the fixture.
    pub fn new(light: Light, restore: RestoreStyle) -> Self {
        let (state_tx, _) = watch::channel(SchedulerState::Idle);
        Self {
            shared: Arc::new(Shared {
                light,
                restore,
                queue: Mutex::new(Queue {
                    state: SchedulerState::Idle,
                    pending: Deque::new(),
                    running: None,
                    next_id: 1,
                    closed: false,
                }),
                wake: Notify::new(),
                state_tx,
            }),
        }
    }

    /// Appends `mode` to the queue, starting the consumer loop if idle.
    ///
    /// Must be called from within a tokio runtime.
    pub fn enqueue(&self, mode: Mode) -> Result<Completion, SchedulerError> {
        let name = mode.name();
        let (done, rx) = oneshot::channel();

        let mut queue = self.shared.lock();
        if queue.closed {
            return Err(SchedulerError::Closed);
        }

        let id = queue.next_id;
        queue
            .pending
            .push_back(Pending { id, mode, done })
            .map_err(|_| SchedulerError::QueueFull {
                capacity: QUEUE_CAPACITY,
            })?;
        queue.next_id += 1;
        info!("queued mode #{} ({}), {} pending", id, name, queue.pending.len());

        match queue.state {
            SchedulerState::Idle => {
                self.shared.set_state(&mut queue, SchedulerState::Draining);
                tokio::spawn(drain(Arc::clone(&self.shared)));
            }
            SchedulerState::Restoring => self.shared.wake.notify_waiters(),
            SchedulerState::Draining => debug!("modes are already running"),
        }

        Ok(Completion { id, done: rx })
    }

    /// Cancels the running mode instance, if any.
    ///
    /// Queued modes are kept and start next. Returns false when nothing was
    /// running.
    pub fn cancel(&self) -> bool {
        let queue = self.shared.lock();
        // A finished task still occupies the slot until the consumer loop
        // collects its outcome.
        match queue.running.as_ref().filter(|r| !r.abort.is_finished()) {
            Some(running) => {
                info!("cancelling mode #{} ({})", running.id, running.name);
                running.abort.abort();
                true
            }
            None => {
                warn!("nothing to cancel");
                false
            }
        }
    }

    /// Writes `color` and commits it as the base color, bypassing the queue.
    pub fn set_immediate(&self, color: Srgb) -> Result<(), PwmError> {
        self.shared.light.commit(color)
    }

    /// Stops accepting modes, drops the queue and cancels the running mode.
    ///
    /// The consumer loop exits without restoring.
    pub fn close(&self) {
        let mut queue = self.shared.lock();
        queue.closed = true;
        queue.pending.clear();
        if let Some(running) = &queue.running {
            running.abort.abort();
        }
        self.shared.wake.notify_waiters();
    }

    /// Waits until the scheduler is idle.
    pub async fn wait_idle(&self) {
        let mut state = self.shared.state_tx.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = state.wait_for(|s| *s == SchedulerState::Idle).await;
    }

    /// Returns the current state of the scheduler.
    pub fn state(&self) -> SchedulerState {
        self.shared.lock().state
    }

    /// Number of modes waiting to run.
    pub fn pending(&self) -> usize {
        self.shared.lock().pending.len()
    }

    /// Name of the running mode instance, if any.
    pub fn running(&self) -> Option<&'static str> {
        self.shared.lock().running.as_ref().map(|r| r.name)
    }

    /// Returns true if a mode instance is executing.
    pub fn is_running(&self) -> bool {
        self.running().is_some()
    }

    /// The last committed base color.
    pub fn base(&self) -> Srgb {
        self.shared.light.base()
    }

    /// The fixture handle the scheduler writes to.
    pub fn light(&self) -> &Light {
        &self.shared.light
    }
}

fn outcome_of(result: Result<Result<(), PwmError>, JoinError>) -> ModeOutcome {
    match result {
        Ok(Ok(())) => ModeOutcome::Completed,
        Ok(Err(err)) => ModeOutcome::Failed(err.to_string()),
        Err(err) if err.is_cancelled() => ModeOutcome::Cancelled,
        Err(err) => ModeOutcome::Failed(err.to_string()),
    }
}

/// Consumer loop: pops and runs queued modes until the queue is empty, then
/// restores the base color.
async fn drain(shared: Arc<Shared>) {
    info!("running modes");
    loop {
        let notified = shared.wake.notified();
        tokio::pin!(notified);

        let next = {
            let mut queue = shared.lock();
            match queue.pending.pop_front() {
                Some(Pending { id, mode, done }) => {
                    let name = mode.name();
                    let task = tokio::spawn(mode.run(shared.light.clone()));
                    queue.running = Some(Running {
                        id,
                        name,
                        abort: task.abort_handle(),
                    });
                    Some((id, name, done, task))
                }
                None if queue.closed => {
                    shared.set_state(&mut queue, SchedulerState::Idle);
                    info!("scheduler closed");
                    return;
                }
                None => {
                    // Registered before the state flips so an enqueue racing
                    // with the restore always wakes it.
                    notified.as_mut().enable();
                    shared.set_state(&mut queue, SchedulerState::Restoring);
                    None
                }
            }
        };

        match next {
            Some((id, name, done, task)) => {
                info!("mode #{} ({}) started", id, name);
                let outcome = outcome_of(task.await);
                shared.lock().running = None;

                match &outcome {
                    ModeOutcome::Failed(reason) => error!("mode #{} ({}) failed: {}", id, name, reason),
                    outcome => info!("mode #{} ({}) {}", id, name, outcome),
                }
                // The requester may have hung up.
                let _ = done.send(outcome);
            }
            None => {
                info!("all modes finished, restoring");
                tokio::select! {
                    biased;
                    () = notified.as_mut() => debug!("restore interrupted"),
                    result = shared.restore_base() => {
                        if let Err(err) = result {
                            error!("restore failed: {}", err);
                        }
                    }
                }

                let mut queue = shared.lock();
                if queue.pending.is_empty() && !queue.closed {
                    shared.set_state(&mut queue, SchedulerState::Idle);
                    debug!("scheduler idle");
                    return;
                }
                shared.set_state(&mut queue, SchedulerState::Draining);
            }
        }
    }
}

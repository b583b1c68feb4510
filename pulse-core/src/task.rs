//! Periodic producer loops
//!
//! A [`PeriodicTask`] repeatedly invokes one [`StatusSource`] and writes the
//! outcome to the connection's [`PushChannel`]:
//!
//! ```text
//!   ┌──── sleep interval (or cancelled → exit) ◄──┐
//!   ▼                                             │
//! collect ──Ok──► write {key, data} ──────────────┤
//!   │                                             │
//!   └─Err─► write {error_key, msg} ─ repeats? ─yes┘
//!                                        │
//!                                        no → exit
//! ```
//!
//! The rest period starts after each write, so a source slower than its
//! interval still gets a full interval of quiet between collections.
//! A zero interval makes the task one-shot: it collects exactly once.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::channel::PushChannel;
use crate::event::Event;
use crate::source::StatusSource;

/// When a repeating task performs its first collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirstRun {
    /// Right after the task is spawned
    Immediate,
    /// One interval after the task is spawned
    AfterInterval,
}

/// One roster entry: a source plus its schedule and failure policy
#[derive(Clone)]
pub struct TaskSpec {
    /// Name used in logs
    pub name: String,
    /// Event key for successful collections
    pub key: String,
    /// Event key for failed collections
    pub error_key: String,
    /// Delay between collections; zero means one-shot
    pub interval: Duration,
    pub first_run: FirstRun,
    /// Keep looping after a failed collection
    pub repeats_on_failure: bool,
    pub source: Arc<dyn StatusSource>,
}

impl TaskSpec {
    /// Repeating task that keeps going through failures
    pub fn repeating(
        name: impl Into<String>,
        key: impl Into<String>,
        error_key: impl Into<String>,
        interval: Duration,
        source: Arc<dyn StatusSource>,
    ) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
            error_key: error_key.into(),
            interval,
            first_run: FirstRun::Immediate,
            repeats_on_failure: true,
            source,
        }
    }

    /// Task that collects exactly once
    pub fn one_shot(
        name: impl Into<String>,
        key: impl Into<String>,
        error_key: impl Into<String>,
        source: Arc<dyn StatusSource>,
    ) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
            error_key: error_key.into(),
            interval: Duration::ZERO,
            first_run: FirstRun::Immediate,
            repeats_on_failure: false,
            source,
        }
    }

    #[must_use]
    pub fn with_first_run(mut self, first_run: FirstRun) -> Self {
        self.first_run = first_run;
        self
    }

    #[must_use]
    pub fn with_repeats_on_failure(mut self, repeats: bool) -> Self {
        self.repeats_on_failure = repeats;
        self
    }

    pub fn is_one_shot(&self) -> bool {
        self.interval.is_zero()
    }
}

impl std::fmt::Debug for TaskSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskSpec")
            .field("name", &self.name)
            .field("key", &self.key)
            .field("error_key", &self.error_key)
            .field("interval", &self.interval)
            .field("first_run", &self.first_run)
            .field("repeats_on_failure", &self.repeats_on_failure)
            .finish_non_exhaustive()
    }
}

/// Why a task stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskExit {
    /// The connection's cancellation signal fired
    Cancelled,
    /// A one-shot task finished its single collection
    Completed,
    /// A task that does not repeat on failure reported its error and stopped
    Failed,
}

enum Step {
    Continue,
    Stop(TaskExit),
}

/// A cancellable repeat-with-delay loop around one source
pub struct PeriodicTask {
    spec: TaskSpec,
    channel: PushChannel,
    cancel: CancellationToken,
}

impl PeriodicTask {
    pub fn new(spec: TaskSpec, channel: PushChannel, cancel: CancellationToken) -> Self {
        Self {
            spec,
            channel,
            cancel,
        }
    }

    /// Run on the tokio runtime
    pub fn spawn(self) -> JoinHandle<TaskExit> {
        tokio::spawn(self.run())
    }

    /// Run until cancelled, completed, or stopped by a non-repeating failure
    pub async fn run(self) -> TaskExit {
        debug!(task = %self.spec.name, "Task started");

        let exit = if self.cancel.is_cancelled() {
            TaskExit::Cancelled
        } else if self.spec.is_one_shot() {
            match self.collect_and_emit().await {
                Step::Continue => TaskExit::Completed,
                Step::Stop(exit) => exit,
            }
        } else {
            self.run_repeating().await
        };

        debug!(task = %self.spec.name, exit = ?exit, "Task stopped");
        exit
    }

    async fn run_repeating(&self) -> TaskExit {
        if self.spec.first_run == FirstRun::AfterInterval
            && let Step::Stop(exit) = self.rest().await
        {
            return exit;
        }

        loop {
            if let Step::Stop(exit) = self.collect_and_emit().await {
                return exit;
            }
            if let Step::Stop(exit) = self.rest().await {
                return exit;
            }
        }
    }

    /// Wait one full interval, waking early only on cancellation
    async fn rest(&self) -> Step {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Step::Stop(TaskExit::Cancelled),
            _ = tokio::time::sleep(self.spec.interval) => Step::Continue,
        }
    }

    async fn collect_and_emit(&self) -> Step {
        let outcome = self.spec.source.collect().await;

        // The connection may have gone away while the source was running
        if self.cancel.is_cancelled() {
            return Step::Stop(TaskExit::Cancelled);
        }

        match outcome {
            Ok(data) => {
                trace!(task = %self.spec.name, key = %self.spec.key, "Emitting event");
                self.channel.write(Event::new(self.spec.key.as_str(), data));
                Step::Continue
            }
            Err(e) if self.spec.repeats_on_failure => {
                debug!(task = %self.spec.name, error = %e, "Collection failed, will retry");
                self.channel.write(Event::error(self.spec.error_key.as_str(), &e));
                Step::Continue
            }
            Err(e) => {
                warn!(task = %self.spec.name, error = %e, "Collection failed");
                // Last event this task sends, so wait for queue room rather than drop it
                let event = Event::error(self.spec.error_key.as_str(), &e);
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => return Step::Stop(TaskExit::Cancelled),
                    _ = self.channel.deliver(event) => {}
                }
                Step::Stop(TaskExit::Failed)
            }
        }
    }
}

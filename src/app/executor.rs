//! Bounded background executor with an overflow thread.
//!
//! Tasks go to a fixed pool of worker threads through a bounded queue. When
//! the queue is full, the task is handed to a single fallback thread instead
//! of being rejected. Panicking tasks are caught and logged; their handles
//! report [`ExecutorError::TaskFailed`].

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError, TrySendError};

use crate::config::{ConfigStore, EXECUTOR_POOLSIZE, EXECUTOR_QUEUE};
use crate::errors::ExecutorError;
use crate::log::{debug, trace, warn};

use super::UiHandle;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Pool and queue sizes of a [`TaskExecutor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorConfig {
    pub poolsize: usize,
    pub queue: usize,
}

impl ExecutorConfig {
    pub const DEFAULT_POOLSIZE: usize = 2;
    pub const DEFAULT_QUEUE: usize = 64;

    /// Sizes from `rcore.executor.poolsize` and `rcore.executor.queue`.
    /// Missing, malformed or zero values fall back to the defaults.
    pub fn from_config(config: &ConfigStore) -> Self {
        let size = |key: &str, default: usize| match config.get_typed::<usize>(key) {
            Some(0) => {
                warn!(key, default, "executor size must be positive, using default");
                default
            }
            Some(n) => n,
            None => default,
        };
        Self {
            poolsize: size(EXECUTOR_POOLSIZE, Self::DEFAULT_POOLSIZE),
            queue: size(EXECUTOR_QUEUE, Self::DEFAULT_QUEUE),
        }
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            poolsize: Self::DEFAULT_POOLSIZE,
            queue: Self::DEFAULT_QUEUE,
        }
    }
}

/// The eventual result of a task submitted to a [`TaskExecutor`].
///
/// Dropping the handle discards the result; the task still runs.
pub struct TaskHandle<T> {
    rx: Receiver<T>,
}

impl<T> fmt::Debug for TaskHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle").field("ready", &!self.rx.is_empty()).finish()
    }
}

impl<T> TaskHandle<T> {
    /// Block until the task finishes.
    pub fn wait(self) -> Result<T, ExecutorError> {
        self.rx.recv().map_err(|_| ExecutorError::TaskFailed)
    }

    /// Block for at most `timeout`; `None` if the task is still running.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Result<T, ExecutorError>> {
        match self.rx.recv_timeout(timeout) {
            Ok(value) => Some(Ok(value)),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Err(ExecutorError::TaskFailed)),
        }
    }

    /// The result, if the task has finished.
    pub fn try_take(&self) -> Option<Result<T, ExecutorError>> {
        match self.rx.try_recv() {
            Ok(value) => Some(Ok(value)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(ExecutorError::TaskFailed)),
        }
    }
}

/// Fixed-size worker pool fed by a bounded queue.
pub struct TaskExecutor {
    queue: Option<Sender<Job>>,
    fallback: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
    config: ExecutorConfig,
    ui: UiHandle,
}

impl fmt::Debug for TaskExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskExecutor")
            .field("config", &self.config)
            .field("running", &self.is_running())
            .finish()
    }
}

impl TaskExecutor {
    /// Spawn the workers and the fallback thread. Completion callbacks of
    /// [`TaskExecutor::run_task_then`] are posted to `ui`.
    pub fn new(config: ExecutorConfig, ui: UiHandle) -> Result<Self, ExecutorError> {
        let (queue_tx, queue_rx) = crossbeam_channel::bounded::<Job>(config.queue);
        let (fallback_tx, fallback_rx) = crossbeam_channel::unbounded::<Job>();

        let mut workers = Vec::with_capacity(config.poolsize + 1);
        for index in 0..config.poolsize {
            workers.push(spawn_worker(format!("rcore-worker-{index}"), queue_rx.clone())?);
        }
        workers.push(spawn_worker("rcore-fallback".to_owned(), fallback_rx)?);
        debug!(poolsize = config.poolsize, queue = config.queue, "executor started");

        Ok(Self {
            queue: Some(queue_tx),
            fallback: Some(fallback_tx),
            workers,
            config,
            ui,
        })
    }

    pub fn config(&self) -> ExecutorConfig {
        self.config
    }

    pub fn is_running(&self) -> bool {
        self.queue.is_some()
    }

    /// Run `task` in the background.
    pub fn run_task<T, F>(&self, task: F) -> Result<TaskHandle<T>, ExecutorError>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (tx, rx) = crossbeam_channel::bounded(1);
        self.submit(Box::new(move || {
            if let Some(value) = run_guarded(task) {
                // the handle may already be gone
                let _ = tx.send(value);
            }
        }))?;
        Ok(TaskHandle { rx })
    }

    /// Run `task` in the background, then `on_ui` with its result on the UI
    /// thread. A panicking task skips the callback.
    pub fn run_task_then<T, F, C>(&self, task: F, on_ui: C) -> Result<(), ExecutorError>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
        C: FnOnce(T) + Send + 'static,
    {
        let ui = self.ui.clone();
        self.submit(Box::new(move || {
            if let Some(value) = run_guarded(task) {
                ui.post(move || on_ui(value));
            }
        }))
    }

    fn submit(&self, job: Job) -> Result<(), ExecutorError> {
        let queue = self.queue.as_ref().ok_or(ExecutorError::ShutDown)?;
        match queue.try_send(job) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(job)) => {
                debug!(capacity = self.config.queue, "task queue full, using fallback thread");
                let fallback = self.fallback.as_ref().ok_or(ExecutorError::ShutDown)?;
                fallback.send(job).map_err(|_| ExecutorError::ShutDown)
            }
            Err(TrySendError::Disconnected(_)) => Err(ExecutorError::ShutDown),
        }
    }

    /// Stop accepting tasks, let queued tasks finish and join every thread.
    pub fn shutdown(&mut self) {
        if self.queue.take().is_none() {
            return;
        }
        self.fallback = None;
        for worker in self.workers.drain(..) {
            let name = worker.thread().name().unwrap_or("rcore-worker").to_owned();
            if worker.join().is_err() {
                warn!(thread = %name, "executor thread ended abnormally");
            }
        }
        debug!("executor shut down");
    }
}

impl Drop for TaskExecutor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn spawn_worker(name: String, jobs: Receiver<Job>) -> Result<JoinHandle<()>, ExecutorError> {
    trace!(thread = %name, "spawning executor thread");
    thread::Builder::new()
        .name(name.clone())
        .spawn(move || {
            while let Ok(job) = jobs.recv() {
                job();
            }
        })
        .map_err(|source| ExecutorError::Spawn { name, source })
}

/// Run `task`, turning a panic into a log line.
fn run_guarded<T>(task: impl FnOnce() -> T) -> Option<T> {
    match panic::catch_unwind(AssertUnwindSafe(task)) {
        Ok(value) => Some(value),
        Err(payload) => {
            let thread = thread::current();
            warn!(
                thread = thread.name().unwrap_or("unnamed"),
                message = panic_message(payload.as_ref()),
                "background task panicked"
            );
            None
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::UiDispatcher;

    fn executor(poolsize: usize, queue: usize, ui: &UiDispatcher) -> TaskExecutor {
        TaskExecutor::new(ExecutorConfig { poolsize, queue }, ui.handle()).unwrap()
    }

    #[test]
    fn sizes_from_config() {
        let mut config = ConfigStore::new();
        assert_eq!(ExecutorConfig::from_config(&config), ExecutorConfig::default());

        config.set(EXECUTOR_POOLSIZE, "4");
        config.set(EXECUTOR_QUEUE, "lots");
        assert_eq!(
            ExecutorConfig::from_config(&config),
            ExecutorConfig { poolsize: 4, queue: 64 }
        );

        config.set(EXECUTOR_POOLSIZE, "0");
        assert_eq!(ExecutorConfig::from_config(&config).poolsize, 2);
    }

    #[test]
    fn tasks_return_results() {
        let ui = UiDispatcher::new();
        let pool = executor(2, 4, &ui);
        let handles: Vec<_> = (0..8).map(|i| pool.run_task(move || i * i).unwrap()).collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.wait().unwrap()).collect();
        assert_eq!(results, [0, 1, 4, 9, 16, 25, 36, 49]);
    }

    #[test]
    fn panicking_task_reports_failure() {
        let ui = UiDispatcher::new();
        let pool = executor(1, 4, &ui);
        let handle = pool.run_task(|| -> u32 { panic!("boom") }).unwrap();
        assert!(matches!(handle.wait(), Err(ExecutorError::TaskFailed)));

        // the worker survives
        assert_eq!(pool.run_task(|| 5).unwrap().wait().unwrap(), 5);
    }

    #[test]
    fn overflow_runs_on_fallback_thread() {
        let ui = UiDispatcher::new();
        let pool = executor(1, 1, &ui);
        let (started_tx, started_rx) = crossbeam_channel::bounded(1);
        let (gate_tx, gate_rx) = crossbeam_channel::bounded::<()>(1);

        let blocker = pool
            .run_task(move || {
                started_tx.send(()).unwrap();
                gate_rx.recv().unwrap();
            })
            .unwrap();
        started_rx.recv().unwrap();

        let queued = pool.run_task(|| thread::current().name().map(str::to_owned)).unwrap();
        let overflow = pool.run_task(|| thread::current().name().map(str::to_owned)).unwrap();
        assert_eq!(overflow.wait().unwrap().as_deref(), Some("rcore-fallback"));

        gate_tx.send(()).unwrap();
        blocker.wait().unwrap();
        assert_eq!(queued.wait().unwrap().as_deref(), Some("rcore-worker-0"));
    }

    #[test]
    fn callbacks_marshalled_to_ui_thread() {
        let ui = UiDispatcher::new();
        let pool = executor(2, 4, &ui);
        let (tx, rx) = crossbeam_channel::unbounded();
        let ui_thread = thread::current().id();

        pool.run_task_then(
            || 20 + 22,
            move |answer| tx.send((answer, thread::current().id())).unwrap(),
        )
        .unwrap();

        assert_eq!(ui.pump_timeout(Duration::from_secs(5)), 1);
        assert_eq!(rx.try_recv().unwrap(), (42, ui_thread));
    }

    #[test]
    fn shutdown_drains_queue_then_refuses() {
        let ui = UiDispatcher::new();
        let mut pool = executor(1, 8, &ui);
        let handles: Vec<_> = (0..4).map(|i| pool.run_task(move || i).unwrap()).collect();
        pool.shutdown();
        assert!(!pool.is_running());
        assert_eq!(handles.into_iter().filter_map(|h| h.try_take()).count(), 4);
        assert!(matches!(pool.run_task(|| ()), Err(ExecutorError::ShutDown)));
    }
}

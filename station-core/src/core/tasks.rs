//! Background task management
//!
//! Central registry for the engine's background tasks: registration,
//! panic-catching execution and graceful shutdown through a shared
//! cancellation token. A teardown (navigation away, process exit) must
//! cancel every timer and in-flight refresh, so the token handed to each
//! task is also checked before any state-publishing step.

use futures::FutureExt;
use std::fmt;
use std::panic::AssertUnwindSafe;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Task kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// One-shot startup task
    Warmup,
    /// Long-running worker
    Worker,
    /// Fixed-interval timer task
    Periodic,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Warmup => write!(f, "Warmup"),
            TaskKind::Worker => write!(f, "Worker"),
            TaskKind::Periodic => write!(f, "Periodic"),
        }
    }
}

/// A registered background task
struct RegisteredTask {
    name: &'static str,
    kind: TaskKind,
    handle: JoinHandle<()>,
}

/// Background task supervisor
pub struct BackgroundTasks {
    tasks: Vec<RegisteredTask>,
    shutdown: CancellationToken,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            shutdown: CancellationToken::new(),
        }
    }

    /// Token handed to tasks so they can observe shutdown
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Register and start a background task
    ///
    /// The future is wrapped to catch panics; an abnormal exit is logged
    /// instead of tearing down the process.
    pub fn spawn<F>(&mut self, name: &'static str, kind: TaskKind, future: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let wrapped_future = async move {
            let result: Result<(), Box<dyn std::any::Any + Send>> =
                AssertUnwindSafe(future).catch_unwind().await;
            match result {
                Ok(()) => {
                    if kind != TaskKind::Warmup {
                        tracing::warn!(task = %name, kind = %kind, "Background task completed unexpectedly");
                    }
                }
                Err(panic_info) => {
                    let panic_msg: String = if let Some(s) = panic_info.downcast_ref::<&str>() {
                        (*s).to_string()
                    } else if let Some(s) = panic_info.downcast_ref::<String>() {
                        s.clone()
                    } else {
                        "Unknown panic".to_string()
                    };
                    tracing::error!(
                        task = %name,
                        kind = %kind,
                        panic = %panic_msg,
                        "Background task panicked! This is a bug that should be reported."
                    );
                }
            }
        };

        let handle = tokio::spawn(wrapped_future);
        tracing::debug!(task = %name, kind = %kind, "Registered background task");
        self.tasks.push(RegisteredTask { name, kind, handle });
    }

    /// Number of registered tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether no tasks are registered
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Graceful shutdown: cancel every task and wait for completion
    pub async fn shutdown(self) {
        tracing::info!("Shutting down {} background tasks...", self.tasks.len());

        self.shutdown.cancel();

        for task in self.tasks {
            match task.handle.await {
                Ok(()) => {
                    tracing::debug!(task = %task.name, "Task completed");
                }
                Err(e) if e.is_cancelled() => {
                    tracing::debug!(task = %task.name, "Task cancelled");
                }
                Err(e) => {
                    tracing::error!(task = %task.name, error = ?e, "Task panicked");
                }
            }
        }

        tracing::info!("All background tasks stopped");
    }
}

impl Default for BackgroundTasks {
    fn default() -> Self {
        Self::new()
    }
}

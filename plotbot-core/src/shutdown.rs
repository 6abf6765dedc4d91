//! Cooperative shutdown.
//!
//! `Shutdown` is a cloneable process-wide signal. Long-running loops
//! check it at every wait point; nothing is interrupted preemptively,
//! so an in-flight device round trip always completes first.
//! `Coordinator` tracks the spawned loops and awaits them on exit.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

// ── Shutdown ─────────────────────────────────────────────────────

/// Process-wide shutdown flag. Initially unset; once set it stays set.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    token: CancellationToken,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag. Idempotent.
    pub fn trigger(&self) {
        self.token.cancel();
    }

    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the flag is set.
    pub async fn wait(&self) {
        self.token.cancelled().await;
    }

    /// Sleep for `period` unless shutdown arrives first.
    ///
    /// Returns `false` if the sleep was cut short by shutdown.
    pub async fn sleep(&self, period: Duration) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(period) => !self.is_triggered(),
            _ = self.token.cancelled() => false,
        }
    }
}

// ── Coordinator ──────────────────────────────────────────────────

/// Owns the shutdown signal and the handles of every long-running task.
#[derive(Debug, Default)]
pub struct Coordinator {
    shutdown: Shutdown,
    tasks: Vec<(&'static str, JoinHandle<()>)>,
}

impl Coordinator {
    pub fn new(shutdown: Shutdown) -> Self {
        Self {
            shutdown,
            tasks: Vec::new(),
        }
    }

    /// A handle to the shared signal.
    pub fn shutdown(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Spawn a named task on the runtime and keep its handle.
    pub fn spawn<Fut>(&mut self, name: &'static str, fut: Fut)
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.tasks.push((name, tokio::spawn(fut)));
    }

    /// Set the signal and wait for every tracked task to finish.
    pub async fn shutdown_and_join(self) {
        self.shutdown.trigger();
        self.join().await;
    }

    /// Wait for every tracked task to finish, in spawn order.
    async fn join(self) {
        for (name, handle) in self.tasks {
            match handle.await {
                Ok(()) => debug!("{name} stopped"),
                Err(e) => error!("{name} terminated abnormally: {e}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn sleep_is_cut_short() {
        let shutdown = Shutdown::new();
        let trigger = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.trigger();
        });

        let completed = tokio::time::timeout(
            Duration::from_secs(2),
            shutdown.sleep(Duration::from_secs(60)),
        )
        .await
        .expect("sleep ignored shutdown");
        assert!(!completed);
        assert!(shutdown.is_triggered());
    }

    #[tokio::test]
    async fn sleep_completes_without_signal() {
        let shutdown = Shutdown::new();
        assert!(shutdown.sleep(Duration::from_millis(5)).await);
    }

    #[tokio::test]
    async fn coordinator_joins_all_tasks() {
        let mut coordinator = Coordinator::new(Shutdown::new());
        let stopped = Arc::new(AtomicUsize::new(0));

        for name in ["a", "b", "c"] {
            let shutdown = coordinator.shutdown();
            let stopped = Arc::clone(&stopped);
            coordinator.spawn(name, async move {
                shutdown.wait().await;
                stopped.fetch_add(1, Ordering::SeqCst);
            });
        }

        tokio::time::timeout(Duration::from_secs(2), coordinator.shutdown_and_join())
            .await
            .expect("join hung");
        assert_eq!(stopped.load(Ordering::SeqCst), 3);
    }
}

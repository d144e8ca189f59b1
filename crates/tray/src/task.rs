use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use anyhow::{Error as AnyhowErr, Result};
use thiserror::Error;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Failure classes reported by supervised tasks.
#[derive(Error, Debug)]
pub enum SupervisorErr {
    /// Task should be respawned after a delay.
    #[error("Recoverable error: {0}")]
    Recover(AnyhowErr),
    /// Unrecoverable failure, the whole supervisor exits.
    #[error("Hard failure: {0}")]
    Fault(AnyhowErr),
}

pub type RetryRes = Pin<Box<dyn Future<Output = Result<(), SupervisorErr>> + Send + 'static>>;

/// A long-running service that the supervisor can respawn after recoverable
/// failures. Implementations exit cleanly when the token is cancelled.
pub trait RetryTask {
    fn spawn(&self, cancel: CancellationToken) -> RetryRes;
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Delay before the first respawn.
    pub delay: Duration,
    /// Multiplier applied to the delay on each consecutive failure.
    pub backoff_multiplier: f64,
    /// Upper bound on the respawn delay.
    pub max_delay: Duration,
    /// Consecutive failures tolerated before giving up; `None` retries forever.
    pub max_retries: Option<usize>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(500),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_secs(60),
            max_retries: None,
        }
    }
}

/// Spawns a [`RetryTask`] and respawns it with exponential backoff whenever
/// it reports a recoverable error.
pub struct Supervisor<T: RetryTask> {
    task: Arc<T>,
    cancel: CancellationToken,
    policy: RetryPolicy,
}

impl<T> Supervisor<T>
where
    T: RetryTask + Send,
{
    pub fn new(task: Arc<T>, cancel: CancellationToken) -> Self {
        Self { task, cancel, policy: RetryPolicy::default() }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn retry_delay(&self, consecutive_failures: usize) -> Duration {
        if consecutive_failures == 0 {
            return self.policy.delay;
        }
        let backoff = self.policy.delay.as_millis() as f64
            * self.policy.backoff_multiplier.powi(consecutive_failures as i32);
        Duration::from_millis(backoff.min(self.policy.max_delay.as_millis() as f64) as u64)
    }

    /// Run until the task exits cleanly, faults, or exhausts its retries.
    pub async fn run(self) -> Result<()> {
        let mut tasks = JoinSet::new();
        let mut failures = 0usize;

        tasks.spawn(self.task.spawn(self.cancel.clone()));

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(())) => tracing::debug!("Supervised task exited cleanly"),
                Ok(Err(SupervisorErr::Recover(err))) => {
                    if let Some(max) = self.policy.max_retries {
                        if failures >= max {
                            anyhow::bail!("task exceeded maximum retries ({max}): {err}");
                        }
                    }
                    let delay = self.retry_delay(failures);
                    failures += 1;
                    tracing::warn!(
                        "Recoverable task failure: {err:?}, respawning in {delay:?} (attempt {failures})"
                    );
                    let respawn = self.task.spawn(self.cancel.clone());
                    tasks.spawn(async move {
                        tokio::time::sleep(delay).await;
                        respawn.await
                    });
                }
                Ok(Err(SupervisorErr::Fault(err))) => {
                    tracing::error!("Hard task failure: {err:?}");
                    anyhow::bail!(err);
                }
                Err(join_err) if join_err.is_cancelled() => {
                    tracing::warn!("Supervised task was cancelled, treating as clean exit");
                }
                Err(join_err) => anyhow::bail!("supervisor join failed: {join_err}"),
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_channel::Receiver;
    use tracing_test::traced_test;

    struct ScriptedTask {
        rx: Receiver<u32>,
    }

    impl ScriptedTask {
        async fn drive(rx: Receiver<u32>) -> Result<(), SupervisorErr> {
            while let Ok(step) = rx.recv().await {
                match step {
                    0 => tokio::time::sleep(Duration::from_millis(10)).await,
                    1 => return Err(SupervisorErr::Recover(anyhow::anyhow!("soft"))),
                    _ => return Err(SupervisorErr::Fault(anyhow::anyhow!("hard"))),
                }
            }
            Ok(())
        }
    }

    impl RetryTask for ScriptedTask {
        fn spawn(&self, _cancel: CancellationToken) -> RetryRes {
            let rx = self.rx.clone();
            Box::pin(Self::drive(rx))
        }
    }

    #[tokio::test]
    #[traced_test]
    async fn recovers_from_soft_failures() {
        let (tx, rx) = async_channel::bounded(16);
        let supervisor = Supervisor::new(
            Arc::new(ScriptedTask { rx }),
            CancellationToken::new(),
        )
        .with_retry_policy(RetryPolicy {
            delay: Duration::from_millis(5),
            ..RetryPolicy::default()
        });

        tx.send(0).await.unwrap();
        tx.send(1).await.unwrap();
        tx.send(0).await.unwrap();
        tx.close();

        supervisor.run().await.unwrap();
    }

    #[tokio::test]
    #[traced_test]
    async fn fault_stops_the_supervisor() {
        let (tx, rx) = async_channel::bounded(16);
        let supervisor =
            Supervisor::new(Arc::new(ScriptedTask { rx }), CancellationToken::new());

        tx.send(2).await.unwrap();
        tx.close();

        assert!(supervisor.run().await.is_err());
    }

    #[tokio::test]
    #[traced_test]
    async fn retries_are_bounded() {
        let (tx, rx) = async_channel::bounded(16);
        let supervisor =
            Supervisor::new(Arc::new(ScriptedTask { rx }), CancellationToken::new())
                .with_retry_policy(RetryPolicy {
                    delay: Duration::from_millis(1),
                    backoff_multiplier: 2.0,
                    max_delay: Duration::from_millis(10),
                    max_retries: Some(2),
                });

        tx.send(1).await.unwrap();
        tx.send(1).await.unwrap();
        tx.send(1).await.unwrap();
        tx.close();

        let err = supervisor.run().await.unwrap_err();
        assert!(err.to_string().contains("maximum retries"));
    }
}

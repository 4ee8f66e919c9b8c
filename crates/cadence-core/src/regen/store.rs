//! Single-writer plan store.
//!
//! All plan mutation flows through one task that owns the [`Plan`] and
//! drains a command channel, so concurrent regenerations serialize
//! instead of racing on shared state. A generation number (epoch) guards
//! late writes: `reset` replaces the plan and bumps the epoch, and any
//! write tagged with an older epoch is rejected as stale. This is what
//! makes a reset safe while regenerations are in flight.

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::plan::model::Plan;

use super::target::RegenTarget;

/// Result of applying a single-field write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The write landed.
    Applied,
    /// The write carried an outdated epoch and was discarded.
    Stale,
    /// The target does not exist in the current plan's geometry.
    UnknownTarget,
}

/// Errors talking to the plan store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store task has shut down and can no longer serve commands.
    #[error("plan store is closed")]
    Closed,
}

enum Command {
    Snapshot {
        reply: oneshot::Sender<Plan>,
    },
    ReadTarget {
        target: RegenTarget,
        reply: oneshot::Sender<Option<String>>,
    },
    Apply {
        epoch: u64,
        target: RegenTarget,
        value: String,
        reply: oneshot::Sender<WriteOutcome>,
    },
    Reset {
        plan: Plan,
        reply: oneshot::Sender<u64>,
    },
    Generation {
        reply: oneshot::Sender<u64>,
    },
}

/// Owner of the store task. Hand out [`PlanHandle`]s with
/// [`PlanStore::handle`]; the task stops when `shutdown` is called or
/// every handle (and the store itself) is gone.
pub struct PlanStore {
    handle: PlanHandle,
    task: JoinHandle<()>,
}

impl PlanStore {
    /// Spawn the store task owning `plan`, starting at epoch 0.
    pub fn spawn(plan: Plan) -> Self {
        let (tx, rx) = mpsc::channel(32);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run(Uuid::new_v4(), plan, rx, cancel.clone()));
        Self {
            handle: PlanHandle { tx, cancel },
            task,
        }
    }

    /// A cloneable handle for issuing commands.
    pub fn handle(&self) -> PlanHandle {
        self.handle.clone()
    }

    /// Stop the task and wait for it to finish.
    pub async fn shutdown(self) {
        self.handle.cancel.cancel();
        let _ = self.task.await;
    }
}

/// Command-channel handle to a running [`PlanStore`].
#[derive(Clone)]
pub struct PlanHandle {
    tx: mpsc::Sender<Command>,
    cancel: CancellationToken,
}

impl PlanHandle {
    /// Full clone of the current plan.
    pub async fn snapshot(&self) -> Result<Plan, StoreError> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    /// Current text of one target, `None` for unknown targets.
    pub async fn read_target(&self, target: &RegenTarget) -> Result<Option<String>, StoreError> {
        let target = target.clone();
        self.request(|reply| Command::ReadTarget { target, reply })
            .await
    }

    /// Apply a single-field write tagged with the epoch it was read
    /// under.
    pub async fn apply(
        &self,
        epoch: u64,
        target: RegenTarget,
        value: String,
    ) -> Result<WriteOutcome, StoreError> {
        self.request(|reply| Command::Apply {
            epoch,
            target,
            value,
            reply,
        })
        .await
    }

    /// Replace the plan wholesale and invalidate in-flight writes.
    /// Returns the new epoch.
    pub async fn reset(&self, plan: Plan) -> Result<u64, StoreError> {
        self.request(|reply| Command::Reset { plan, reply }).await
    }

    /// Current epoch.
    pub async fn generation(&self) -> Result<u64, StoreError> {
        self.request(|reply| Command::Generation { reply }).await
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, StoreError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(build(reply))
            .await
            .map_err(|_| StoreError::Closed)?;
        rx.await.map_err(|_| StoreError::Closed)
    }
}

async fn run(
    store_id: Uuid,
    mut plan: Plan,
    mut rx: mpsc::Receiver<Command>,
    cancel: CancellationToken,
) {
    let mut generation: u64 = 0;
    debug!(store = %store_id, "plan store started");
    loop {
        let command = tokio::select! {
            _ = cancel.cancelled() => break,
            cmd = rx.recv() => match cmd {
                Some(cmd) => cmd,
                None => break,
            },
        };
        match command {
            Command::Snapshot { reply } => {
                let _ = reply.send(plan.clone());
            }
            Command::ReadTarget { target, reply } => {
                let _ = reply.send(target.seed(&plan).map(str::to_owned));
            }
            Command::Apply {
                epoch,
                target,
                value,
                reply,
            } => {
                let outcome = if epoch != generation {
                    warn!(
                        store = %store_id,
                        target = %target,
                        epoch,
                        generation,
                        "rejecting stale write"
                    );
                    WriteOutcome::Stale
                } else if target.write(&mut plan, value) {
                    debug!(store = %store_id, target = %target, epoch, "write applied");
                    WriteOutcome::Applied
                } else {
                    warn!(store = %store_id, target = %target, "write for unknown target");
                    WriteOutcome::UnknownTarget
                };
                let _ = reply.send(outcome);
            }
            Command::Reset { plan: next, reply } => {
                plan = next;
                generation += 1;
                debug!(store = %store_id, generation, "plan replaced");
                let _ = reply.send(generation);
            }
            Command::Generation { reply } => {
                let _ = reply.send(generation);
            }
        }
    }
    debug!(store = %store_id, "plan store stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::model::PlanSettings;

    fn plan() -> Plan {
        Plan::new(&PlanSettings {
            weeks: 1,
            days: vec!["Monday".to_owned()],
            platforms: vec!["instagram".to_owned()],
            posts_per_day: 1,
        })
    }

    fn main_target() -> RegenTarget {
        RegenTarget::Main { week: 1 }
    }

    #[tokio::test]
    async fn apply_with_current_epoch_lands() {
        let store = PlanStore::spawn(plan());
        let handle = store.handle();

        let epoch = handle.generation().await.expect("generation");
        let outcome = handle
            .apply(epoch, main_target(), "Espresso week".to_owned())
            .await
            .expect("apply");
        assert_eq!(outcome, WriteOutcome::Applied);

        let snapshot = handle.snapshot().await.expect("snapshot");
        assert_eq!(snapshot.weeks[0].main_idea, "Espresso week");
        store.shutdown().await;
    }

    #[tokio::test]
    async fn reset_bumps_epoch_and_stales_old_writes() {
        let store = PlanStore::spawn(plan());
        let handle = store.handle();

        let old_epoch = handle.generation().await.expect("generation");
        let new_epoch = handle.reset(plan()).await.expect("reset");
        assert_eq!(new_epoch, old_epoch + 1);

        let outcome = handle
            .apply(old_epoch, main_target(), "late".to_owned())
            .await
            .expect("apply");
        assert_eq!(outcome, WriteOutcome::Stale);

        let snapshot = handle.snapshot().await.expect("snapshot");
        assert_eq!(snapshot.weeks[0].main_idea, "");
        store.shutdown().await;
    }

    #[tokio::test]
    async fn unknown_target_is_reported() {
        let store = PlanStore::spawn(plan());
        let handle = store.handle();

        let outcome = handle
            .apply(0, RegenTarget::Main { week: 4 }, "nowhere".to_owned())
            .await
            .expect("apply");
        assert_eq!(outcome, WriteOutcome::UnknownTarget);
        store.shutdown().await;
    }

    #[tokio::test]
    async fn read_target_returns_current_text() {
        let store = PlanStore::spawn(plan());
        let handle = store.handle();

        handle
            .apply(0, main_target(), "Latte art".to_owned())
            .await
            .expect("apply");
        let text = handle.read_target(&main_target()).await.expect("read");
        assert_eq!(text.as_deref(), Some("Latte art"));

        let missing = handle
            .read_target(&RegenTarget::Main { week: 9 })
            .await
            .expect("read");
        assert!(missing.is_none());
        store.shutdown().await;
    }

    #[tokio::test]
    async fn commands_after_shutdown_fail_closed() {
        let store = PlanStore::spawn(plan());
        let handle = store.handle();
        store.shutdown().await;

        let result = handle.snapshot().await;
        assert!(matches!(result, Err(StoreError::Closed)));
    }
}

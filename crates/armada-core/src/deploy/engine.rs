//! The concurrent multi-target apply engine.
//!
//! One task per target, all dispatched before any result is awaited, joined
//! as a unit. Failures never cross the task boundary as panics or early
//! returns; they fan in through the [`JoinSet`] and are merged after the
//! join barrier.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::client::ClientFactory;
use crate::error::{AggregatedError, DeployError, FailureKind, TargetFailure};
use crate::status::Status;
use crate::types::{Operation, TargetConfig};

/// Applies one [`Operation`] to a set of targets concurrently.
///
/// Stateless across calls; every `run` is an independent one-shot fan-out.
#[derive(Debug)]
pub struct Deployer<F> {
    factory: Arc<F>,
    target_timeout: Option<Duration>,
}

impl<F: ClientFactory> Deployer<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory: Arc::new(factory),
            target_timeout: None,
        }
    }

    /// Enforce a deadline on each target's construct-and-apply.
    ///
    /// Off by default: without it a hung client hangs the whole join, the
    /// same way the caller would block on any unbounded remote call.
    pub fn with_target_timeout(mut self, timeout: Duration) -> Self {
        self.target_timeout = Some(timeout);
        self
    }

    /// Apply `op` to every target and report the aggregated outcome.
    ///
    /// Every target runs to completion regardless of sibling failures; the
    /// call returns only after all of them have finished. With zero targets
    /// the run is a no-op success. On success the terminal status is
    /// returned; on any failure the error carries the in-flight status
    /// together with one entry per failing target.
    pub async fn run(
        &self,
        op: Operation,
        targets: Vec<TargetConfig>,
    ) -> Result<Status, DeployError> {
        let is_delete = op.is_delete();
        let in_flight = Status::in_flight(is_delete);
        debug!(op = op.kind(), targets = targets.len(), status = %in_flight, "dispatching");

        let op = Arc::new(op);
        let mut tasks = JoinSet::new();
        for (index, target) in targets.into_iter().enumerate() {
            let factory = Arc::clone(&self.factory);
            let op = Arc::clone(&op);
            let timeout = self.target_timeout;
            tasks.spawn(async move { apply_to_target(factory, op, target, index, timeout).await });
        }

        let mut failures = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(failure)) => {
                    warn!(target = %failure.target, error = %failure.kind, "target failed");
                    failures.push(failure);
                }
                // A panicking client surfaces here; siblings keep running.
                Err(join_err) => {
                    warn!(error = %join_err, "apply task aborted");
                    failures.push(TargetFailure::new(
                        "<unknown target>",
                        FailureKind::Apply(join_err.to_string()),
                    ));
                }
            }
        }

        match AggregatedError::from_failures(failures) {
            None => {
                let terminal = Status::terminal(is_delete);
                info!(op = op.kind(), status = %terminal, "all targets applied");
                Ok(terminal)
            }
            Some(error) => Err(DeployError {
                status: in_flight,
                error,
            }),
        }
    }
}

/// One target's whole unit of work: construct a client, perform exactly one
/// operation, map any failure to an attributed [`TargetFailure`].
async fn apply_to_target<F: ClientFactory>(
    factory: Arc<F>,
    op: Arc<Operation>,
    target: TargetConfig,
    index: usize,
    timeout: Option<Duration>,
) -> Result<(), TargetFailure> {
    let label = target
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("target {index}"));

    let work = async {
        let client = factory
            .connect(&target)
            .await
            .map_err(|e| FailureKind::ClientConstruction(format!("{e:#}")))?;

        let result = match op.as_ref() {
            Operation::InstallChart(spec) => client.install_chart(spec).await,
            Operation::UninstallChart(spec) => client.uninstall_chart(spec).await,
            Operation::ApplyManifest(payload) => {
                client
                    .apply_manifest(&payload.contents, payload.options(false))
                    .await
            }
            Operation::DeleteManifest(payload) => {
                client
                    .apply_manifest(&payload.contents, payload.options(true))
                    .await
            }
        };
        result.map_err(|e| FailureKind::Apply(format!("{e:#}")))
    };

    let outcome = match timeout {
        Some(limit) => match tokio::time::timeout(limit, work).await {
            Ok(outcome) => outcome,
            Err(_) => Err(FailureKind::TimedOut(limit)),
        },
        None => work.await,
    };

    outcome.map_err(|kind| TargetFailure::new(label, kind))
}

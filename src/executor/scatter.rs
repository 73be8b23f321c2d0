//! Scatter/Gather Dispatch
//!
//! Fans a dispatch plan out to the shard executor, one task per plan entry, and
//! gathers exactly one [`ShardResult`] per entry.
//!
//! ## Responsibilities
//! - **Back-pressure**: at most `max_in_flight` entries run at once; the rest wait for
//!   a free permit instead of all being started together.
//! - **Deadlines**: each entry gets its own deadline, starting when it acquires a
//!   permit. An expired entry settles as `Timeout` without affecting its siblings.
//! - **Cancellation**: the caller's signal, or dropping the gather future, settles
//!   every outstanding entry as `Cancelled`.

use super::cancel::{CancelSignal, cancel_pair};
use super::types::*;
use crate::routing::types::{DispatchPlan, PlanEntry};

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::Instant;

pub struct ScatterGatherExecutor {
    executor: Arc<dyn ShardQueryExecutor>,
    max_in_flight: usize,
}

impl ScatterGatherExecutor {
    pub fn new(executor: Arc<dyn ShardQueryExecutor>, max_in_flight: usize) -> Self {
        Self {
            executor,
            max_in_flight: max_in_flight.max(1),
        }
    }

    /// Executes every entry of `plan` and returns their results in plan order.
    pub async fn execute(
        &self,
        plan: &DispatchPlan,
        window: usize,
        fields: Option<&[String]>,
        timeout: Duration,
        cancel: &CancelSignal,
    ) -> Vec<ShardResult> {
        tracing::debug!(
            "Dispatching {} shard requests (max in flight {}, timeout {:?})",
            plan.len(),
            self.max_in_flight,
            timeout
        );

        let permits = Arc::new(Semaphore::new(self.max_in_flight));
        // Dropping this future mid-gather cancels the workers it spawned
        let (abort, abort_signal) = cancel_pair();
        let _abort_on_drop = abort.cancel_on_drop();

        let mut handles = Vec::with_capacity(plan.len());
        for entry in plan.entries() {
            let worker = ShardWorker {
                executor: self.executor.clone(),
                permits: permits.clone(),
                entry: entry.clone(),
                request: ShardRequest {
                    query: entry.query.clone(),
                    window,
                    fields: fields.map(|f| f.to_vec()),
                },
                timeout,
            };
            let external = cancel.clone();
            let aborted = abort_signal.clone();
            handles.push(tokio::spawn(worker.run(external, aborted)));
        }

        let mut results = Vec::with_capacity(handles.len());
        for (handle, entry) in handles.into_iter().zip(plan.entries()) {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => {
                    tracing::warn!("Shard worker for {} failed: {}", entry.shard, e);
                    ShardResult {
                        shard: entry.shard.clone(),
                        node: entry.replica.as_ref().map(|r| r.node.clone()),
                        outcome: Err(ShardFailure::execution(format!("worker failed: {}", e))),
                    }
                }
            };
            results.push(result);
        }

        let failed = results.iter().filter(|r| !r.is_success()).count();
        tracing::debug!(
            "Gathered {} shard results ({} failed)",
            results.len(),
            failed
        );
        results
    }
}

/// Everything one worker task needs; owns its inputs so it shares nothing mutable.
struct ShardWorker {
    executor: Arc<dyn ShardQueryExecutor>,
    permits: Arc<Semaphore>,
    entry: PlanEntry,
    request: ShardRequest,
    timeout: Duration,
}

impl ShardWorker {
    async fn run(self, mut external: CancelSignal, mut aborted: CancelSignal) -> ShardResult {
        let shard = self.entry.shard.clone();
        let node = self.entry.replica.as_ref().map(|r| r.node.clone());

        let outcome = tokio::select! {
            biased;
            _ = external.cancelled() => Err(ShardFailure::cancelled()),
            _ = aborted.cancelled() => Err(ShardFailure::cancelled()),
            outcome = self.dispatch() => outcome,
        };

        if let Err(failure) = &outcome {
            tracing::warn!("Shard {} failed: {}", shard, failure);
        }
        ShardResult {
            shard,
            node,
            outcome,
        }
    }

    async fn dispatch(&self) -> Result<ShardHits, ShardFailure> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| ShardFailure::execution(e.to_string()))?;

        let Some(replica) = &self.entry.replica else {
            return Err(ShardFailure::unavailable(format!(
                "no available copy of shard {}",
                self.entry.shard
            )));
        };

        let deadline = Instant::now() + self.timeout;
        tracing::trace!("Sending {} to node {}", self.entry.shard, replica.node);

        match tokio::time::timeout_at(
            deadline,
            self.executor.execute(replica, &self.request, deadline),
        )
        .await
        {
            Ok(outcome) => outcome,
            Err(_) => Err(ShardFailure::timeout(format!(
                "shard {} did not answer within {:?}",
                self.entry.shard, self.timeout
            ))),
        }
    }
}

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::warn;

use ai_client::ChatModel;
use parlex_common::MemberRecord;

use crate::summarise::{attach_summary, summarise_member};

/// Ceiling on in-flight model calls. Requests beyond this queue FIFO on
/// the admission gate.
pub const MAX_CONCURRENT_MODEL_CALLS: usize = 20;

/// Wall-clock deadline per member, covering queue wait plus the model
/// call. An expired task's result is discarded; the provider-side call is
/// not forcibly cancelled.
pub const MEMBER_SUMMARY_TIMEOUT: Duration = Duration::from_secs(10);

/// Fan-out/fan-in controller for member summarisation: one task per
/// member, semaphore-gated, results harvested in completion order so fast
/// members surface immediately.
pub struct Orchestrator {
    model: Arc<dyn ChatModel>,
    max_concurrent: usize,
    task_timeout: Duration,
}

impl Orchestrator {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self {
            model,
            max_concurrent: MAX_CONCURRENT_MODEL_CALLS,
            task_timeout: MEMBER_SUMMARY_TIMEOUT,
        }
    }

    pub fn with_limits(mut self, max_concurrent: usize, task_timeout: Duration) -> Self {
        self.max_concurrent = max_concurrent;
        self.task_timeout = task_timeout;
        self
    }

    /// Schedule one summarisation task per record. Drain the returned set
    /// with `join_next` to receive results in completion order; a slot is
    /// `None` when that member timed out or failed. A single member's
    /// failure never aborts its siblings.
    pub fn spawn_all(&self, records: Vec<MemberRecord>, topic: &str) -> JoinSet<Option<MemberRecord>> {
        let gate = Arc::new(Semaphore::new(self.max_concurrent));
        let mut tasks = JoinSet::new();

        for record in records {
            let model = Arc::clone(&self.model);
            let gate = Arc::clone(&gate);
            let topic = topic.to_string();
            let deadline = self.task_timeout;

            tasks.spawn(async move {
                let member_id = record.member_id.clone();

                let outcome = tokio::time::timeout(deadline, async {
                    let _permit = gate.acquire().await.context("admission gate closed")?;
                    let summary = summarise_member(model.as_ref(), &record, &topic).await?;
                    Ok::<_, anyhow::Error>(attach_summary(record, summary))
                })
                .await;

                match outcome {
                    Ok(Ok(record)) => Some(record),
                    Ok(Err(e)) => {
                        warn!(member = %member_id, error = %e, "Member summarisation failed");
                        None
                    }
                    Err(_) => {
                        warn!(
                            member = %member_id,
                            timeout_secs = deadline.as_secs(),
                            "Member summarisation timed out"
                        );
                        None
                    }
                }
            });
        }

        tasks
    }
}

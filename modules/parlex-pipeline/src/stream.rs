use std::sync::Arc;

use anyhow::Result;
use async_stream::stream;
use chrono::NaiveDate;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::warn;

use parlex_common::MemberRecord;
use parlex_search::SearchAggregator;

use crate::orchestrator::Orchestrator;

/// One self-describing unit of the line-delimited result stream.
///
/// `summary` is emitted exactly once, before any model call resolves;
/// `contribution` follows once per member whose summarisation completed,
/// in completion order. There is no end-of-stream sentinel — the sequence
/// simply closes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "message_type", rename_all = "snake_case")]
pub enum StreamFrame {
    Summary {
        number_results: usize,
        max_contributions: usize,
    },
    Contribution {
        contribution: MemberRecord,
    },
}

impl StreamFrame {
    /// Encode as one line of output.
    pub fn to_ndjson(&self) -> Result<String> {
        Ok(serde_json::to_string(self)? + "\n")
    }
}

/// The raw frame sequence: a summary frame, then one slot per member in
/// completion order. A slot is `None` when that member's task timed out or
/// errored; a search backend failure surfaces as a hard `Err` item and
/// terminates the sequence.
///
/// Single-pass and non-restartable — re-invoke the whole pipeline to
/// retry.
pub fn raw_topic_search(
    aggregator: Arc<SearchAggregator>,
    orchestrator: Arc<Orchestrator>,
    query: String,
    month_range: (NaiveDate, NaiveDate),
    doc_limit: usize,
) -> impl Stream<Item = Result<Option<StreamFrame>>> + Send {
    stream! {
        let records = match aggregator.gather(&query, month_range, doc_limit).await {
            Ok(records) => records,
            Err(e) => {
                yield Err(e);
                return;
            }
        };

        let number_results = records.len();
        let max_contributions = records
            .iter()
            .map(|r| r.contributions.len())
            .max()
            .unwrap_or(0);

        yield Ok(Some(StreamFrame::Summary {
            number_results,
            max_contributions,
        }));

        let mut tasks = orchestrator.spawn_all(records, &query);
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Some(record)) => {
                    yield Ok(Some(StreamFrame::Contribution { contribution: record }));
                }
                // Timed out or failed — already logged at the task boundary.
                Ok(None) => yield Ok(None),
                Err(e) => {
                    warn!(error = %e, "Summarisation task panicked");
                    yield Ok(None);
                }
            }
        }
    }
}

/// Filter transform that removes the empty slots failed members leave
/// behind. Composable over any producer of optional frames.
pub fn drop_empty<S>(frames: S) -> impl Stream<Item = Result<StreamFrame>> + Send
where
    S: Stream<Item = Result<Option<StreamFrame>>> + Send,
{
    frames.filter_map(|slot| async move { slot.transpose() })
}

/// Wire-ready topic search: raw sequence with empty slots dropped.
pub fn run_topic_search(
    aggregator: Arc<SearchAggregator>,
    orchestrator: Arc<Orchestrator>,
    query: String,
    month_range: (NaiveDate, NaiveDate),
    doc_limit: usize,
) -> impl Stream<Item = Result<StreamFrame>> + Send {
    drop_empty(raw_topic_search(
        aggregator,
        orchestrator,
        query,
        month_range,
        doc_limit,
    ))
}

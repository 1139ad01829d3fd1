//! Orchestrator contract tests with a scripted model fake: admission gate
//! ceiling, per-task timeout, completion-order delivery, and failure
//! isolation. No ordering across members is assumed beyond what the
//! scripted delays force.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::json;

use ai_client::{ChatModel, Message};
use parlex_common::{Contribution, MemberRecord};
use parlex_pipeline::Orchestrator;

/// Model fake scripted per member. The member id is recovered from the
/// user prompt's background section.
#[derive(Default)]
struct ScriptedModel {
    delays: HashMap<String, Duration>,
    default_delay: Duration,
    failing: Vec<String>,
    bad_sentiment: Vec<String>,
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl ScriptedModel {
    fn member_of(messages: &[Message]) -> String {
        let user = &messages[1].content;
        user.split("## Member Background")
            .nth(1)
            .and_then(|rest| rest.split("## Relevant Contributions").next())
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    }

    fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn structured(
        &self,
        messages: &[Message],
        _schema: serde_json::Value,
    ) -> Result<serde_json::Value> {
        let member = Self::member_of(messages);

        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let delay = self.delays.get(&member).copied().unwrap_or(self.default_delay);
        tokio::time::sleep(delay).await;

        self.current.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(&member) {
            bail!("provider exploded for {member}");
        }

        let sentiment = if self.bad_sentiment.contains(&member) { 0 } else { 7 };
        Ok(json!({
            "summary": format!("**Position** of {member}"),
            "headline": format!("{member} leans in favour"),
            "bill_sentiment": sentiment,
            "indicative_quotes": ["We must act."],
        }))
    }

    async fn chat(&self, _messages: &[Message]) -> Result<String> {
        Ok(String::new())
    }
}

fn record(member_id: &str) -> MemberRecord {
    let contribution = Contribution {
        member_id: member_id.to_string(),
        member_name: member_id.to_string(),
        member_party_name: "Unknown".to_string(),
        member_party_abbreviation: "Unknown".to_string(),
        member_party_foreground_colour: "0022CC".to_string(),
        member_party_background_colour: "0022CC".to_string(),
        member_house_background_colour: "b50938".to_string(),
        member_url: "NA".to_string(),
        member_contribution_count: 1,
        member_avg_score: 1,
        text: "We must act.".to_string(),
        attributed_to: member_id.to_string(),
        house: "EU Parliament".to_string(),
        date: "2025-03-01".to_string(),
        score: 1,
        contribution_url: "NA".to_string(),
        debate_url: "NA".to_string(),
        debate_title: "Climate Bill".to_string(),
        chamber_date_url: "NA".to_string(),
    };
    MemberRecord {
        member_id: member_id.to_string(),
        member_contribution_count: 1,
        member_avg_score: 1,
        contributions: vec![contribution],
        summary: None,
        headline: None,
        bill_sentiment: None,
        indicative_quotes: None,
    }
}

async fn drain(mut tasks: tokio::task::JoinSet<Option<MemberRecord>>) -> Vec<Option<MemberRecord>> {
    let mut slots = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        slots.push(joined.expect("task must not panic"));
    }
    slots
}

#[tokio::test(start_paused = true)]
async fn admission_gate_caps_in_flight_calls() {
    let model = Arc::new(ScriptedModel {
        default_delay: Duration::from_secs(1),
        ..Default::default()
    });
    let orchestrator =
        Orchestrator::new(model.clone()).with_limits(20, Duration::from_secs(60));

    let records: Vec<_> = (0..50).map(|i| record(&format!("Member {i:02}"))).collect();
    let slots = drain(orchestrator.spawn_all(records, "carbon border tax")).await;

    assert_eq!(slots.len(), 50);
    assert!(slots.iter().all(|s| s.is_some()));
    assert!(
        model.peak_concurrency() <= 20,
        "peak concurrency {} exceeded the gate",
        model.peak_concurrency()
    );
}

#[tokio::test(start_paused = true)]
async fn timed_out_member_is_dropped_without_blocking_siblings() {
    let mut delays = HashMap::new();
    delays.insert("Fast A".to_string(), Duration::from_secs(1));
    delays.insert("Slow".to_string(), Duration::from_secs(30));
    delays.insert("Fast B".to_string(), Duration::from_secs(2));

    let model = Arc::new(ScriptedModel {
        delays,
        ..Default::default()
    });
    let orchestrator =
        Orchestrator::new(model).with_limits(20, Duration::from_secs(10));

    let records = vec![record("Fast A"), record("Slow"), record("Fast B")];
    let slots = drain(orchestrator.spawn_all(records, "topic")).await;

    assert_eq!(slots.len(), 3);

    // Completion order: the fast members arrive first, the timed-out slot
    // closes the sequence at the 10s deadline.
    let ids: Vec<Option<String>> = slots
        .iter()
        .map(|s| s.as_ref().map(|r| r.member_id.clone()))
        .collect();
    assert_eq!(
        ids,
        vec![
            Some("Fast A".to_string()),
            Some("Fast B".to_string()),
            None
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn provider_failure_is_isolated_to_its_member() {
    let model = Arc::new(ScriptedModel {
        default_delay: Duration::from_millis(10),
        failing: vec!["Broken".to_string()],
        ..Default::default()
    });
    let orchestrator = Orchestrator::new(model);

    let records = vec![record("Alice"), record("Broken"), record("Bob")];
    let slots = drain(orchestrator.spawn_all(records, "topic")).await;

    let delivered: Vec<&MemberRecord> = slots.iter().flatten().collect();
    assert_eq!(delivered.len(), 2);
    assert!(delivered.iter().all(|r| r.member_id != "Broken"));
    assert_eq!(slots.iter().filter(|s| s.is_none()).count(), 1);
}

#[tokio::test(start_paused = true)]
async fn summary_fields_are_attached_once() {
    let model = Arc::new(ScriptedModel::default());
    let orchestrator = Orchestrator::new(model);

    let slots = drain(orchestrator.spawn_all(vec![record("Alice")], "topic")).await;

    let record = slots[0].as_ref().expect("summarisation succeeds");
    assert_eq!(record.bill_sentiment, Some(7));
    assert_eq!(
        record.headline.as_deref(),
        Some("Alice leans in favour")
    );
    assert_eq!(
        record.indicative_quotes.as_deref(),
        Some(&["We must act.".to_string()][..])
    );
    // The search-time fields are untouched.
    assert_eq!(record.contributions.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn out_of_scale_sentiment_fails_that_task() {
    let model = Arc::new(ScriptedModel {
        bad_sentiment: vec!["Weird".to_string()],
        ..Default::default()
    });
    let orchestrator = Orchestrator::new(model);

    let slots = drain(orchestrator.spawn_all(vec![record("Weird"), record("Alice")], "topic")).await;

    let delivered: Vec<String> = slots
        .iter()
        .flatten()
        .map(|r| r.member_id.clone())
        .collect();
    assert_eq!(delivered, vec!["Alice".to_string()]);
}

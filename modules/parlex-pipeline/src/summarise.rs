use anyhow::{bail, Result};
use chrono::Utc;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use ai_client::{extract, ChatModel, Message};
use parlex_common::{Contribution, MemberRecord};

/// Structured result of one member summarisation call.
///
/// Field doc comments become schema descriptions the model is steered by,
/// so they are written as instructions.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MemberSummary {
    /// A summary of the member's position on the bill using the headings
    /// provided. Use markdown, but use bold text instead of heading tags
    /// for the headings.
    pub summary: String,
    /// A single line headline summarising the member's position on the new
    /// bill.
    pub headline: String,
    /// Infer how the member may feel towards the new bill, on a scale of 1
    /// to 10, where 1 is strongly against, 5 is neutral or not applicable,
    /// and 10 is strongly for. Return this value as a single number.
    pub bill_sentiment: u8,
    /// Indicative quotes from the member's contributions that best capture
    /// their position and how it aligns with the new bill. Quote the
    /// relevant text exactly, retain capitalisation and do not add
    /// quotation marks.
    pub indicative_quotes: Vec<String>,
}

fn system_prompt(topic_query: &str) -> String {
    let date_today = Utc::now().format("%Y-%m-%d");
    format!(
        "You are an expert in analysing contributions to the EU parliament and using that to \
make an informed judgement about a members likely sentiment towards a topic.

You will be provided with a topic, bill, or policy and a list of contributions that a member \
of parliament has made related to this topic. Given this information, your task is to make an \
informed judgement of how this member may respond to the new topic, bill, or policy.

The user is most interested in recent information about the Member of Parliament. The date \
today is {date_today}. You should use this to make an informed judgement about which \
information is most relevant. For example if the user is interested in a topic that a member \
has spoken about in the last few months and four years ago, then the recent information is \
much more useful.

You will use the following framework to analyse the contributions:

- 1. **Key Themes and Concerns**: Identify key themes and concerns raised by the member in \
their relevant contributions that overlap or align with the new bill.
- 2. **Background Alignment**: Evaluate how the members background is aligned with or diverge \
from the topic's objectives.
- 3. **Tone and Sentiment**: Analyse the tone and sentiment of their contributions and how it \
might reflect their position on the new bill.
---

## Start of Topic, Bill, or Policy

{topic_query}
---"
    )
}

fn user_prompt(member_background: &str, contributions: &[Contribution]) -> String {
    format!(
        "## Member Background\n\n{member_background}\n\n## Relevant Contributions\n{}",
        combined_contributions(contributions)
    )
}

/// Each excerpt is prefixed with its date, house, and debate context so the
/// model can weigh recency and provenance.
fn combined_contributions(contributions: &[Contribution]) -> String {
    let mut text = String::new();
    for c in contributions {
        text.push_str(&format!("\n\nContribution Date: {}", c.date));
        text.push_str(&format!("\nContribution House: {}", c.house));
        text.push_str(&format!("\nContribution part of debate: {}", c.debate_title));
        text.push_str(&format!("\nContribution:\n{}", c.text));
    }
    text
}

/// One structured model call for one member. Malformed output or a
/// sentiment outside [1,10] is a hard error for this task; the caller
/// decides what failure isolation looks like.
pub async fn summarise_member(
    model: &dyn ChatModel,
    record: &MemberRecord,
    topic_query: &str,
) -> Result<MemberSummary> {
    let messages = [
        Message::system(system_prompt(topic_query)),
        Message::user(user_prompt(&record.member_id, &record.contributions)),
    ];

    let summary: MemberSummary = extract(model, &messages).await?;

    if !(1..=10).contains(&summary.bill_sentiment) {
        bail!(
            "bill_sentiment {} outside the 1-10 scale for member '{}'",
            summary.bill_sentiment,
            record.member_id
        );
    }

    Ok(summary)
}

/// Attach the summary fields to the record. Called exactly once per record,
/// by the background task that produced the summary.
pub fn attach_summary(mut record: MemberRecord, summary: MemberSummary) -> MemberRecord {
    record.summary = Some(summary.summary);
    record.headline = Some(summary.headline);
    record.bill_sentiment = Some(summary.bill_sentiment);
    record.indicative_quotes = Some(summary.indicative_quotes);
    record
}

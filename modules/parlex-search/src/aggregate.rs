use std::sync::Arc;

use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use tracing::info;

use parlex_common::{Contribution, MemberRecord, SpeechHit};

use crate::index::SpeechIndex;

// Static display metadata. Party colours are not ingested yet, so every
// member gets the same placeholder palette and "NA" URLs.
const PARTY_FOREGROUND_COLOUR: &str = "0022CC";
const PARTY_BACKGROUND_COLOUR: &str = "0022CC";
const HOUSE_BACKGROUND_COLOUR: &str = "b50938";
const PLACEHOLDER_URL: &str = "NA";

/// Relevance scoring is a placeholder; swap in a real scorer via
/// [`SearchAggregator::with_score_fn`].
pub type ScoreFn = fn(&SpeechHit) -> u32;

fn placeholder_score(_hit: &SpeechHit) -> u32 {
    1
}

/// One searchable index and the legislative body label attached to its
/// hits after the search returns.
#[derive(Debug, Clone)]
pub struct IndexSource {
    pub index: String,
    pub house: String,
}

fn default_sources() -> Vec<IndexSource> {
    vec![
        IndexSource {
            index: "markd-paris-hack-eu-speeches".to_string(),
            house: "EU Parliament".to_string(),
        },
        IndexSource {
            index: "livlivesey_paris_hack_fr_debates_0602".to_string(),
            house: "French National Assembly".to_string(),
        },
    ]
}

/// Queries every configured index for a topic and groups the combined hits
/// into one [`MemberRecord`] per distinct speaker.
pub struct SearchAggregator {
    index: Arc<dyn SpeechIndex>,
    sources: Vec<IndexSource>,
    score: ScoreFn,
}

impl SearchAggregator {
    pub fn new(index: Arc<dyn SpeechIndex>) -> Self {
        Self {
            index,
            sources: default_sources(),
            score: placeholder_score,
        }
    }

    pub fn with_sources(mut self, sources: Vec<IndexSource>) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_score_fn(mut self, score: ScoreFn) -> Self {
        self.score = score;
        self
    }

    /// Search every configured index (each capped at `doc_limit`), label
    /// hits with their house, and group by speaker. A backend error on any
    /// index fails the whole call.
    pub async fn gather(
        &self,
        query: &str,
        month_range: (NaiveDate, NaiveDate),
        doc_limit: usize,
    ) -> Result<Vec<MemberRecord>> {
        let date_range = expand_month_range(month_range);

        let mut hits = Vec::new();
        for source in &self.sources {
            let mut batch = self
                .index
                .search(&source.index, query, doc_limit, date_range)
                .await?;
            for hit in &mut batch {
                hit.house = Some(source.house.clone());
            }
            info!(index = %source.index, hits = batch.len(), "Index search complete");
            hits.extend(batch);
        }

        Ok(group_by_speaker(hits, self.score))
    }
}

/// Expand a "Month Year" granularity range to calendar days: the first day
/// of the start month through the last day of the end month.
pub fn expand_month_range(range: (NaiveDate, NaiveDate)) -> (NaiveDate, NaiveDate) {
    let (start, end) = range;
    let first = start.with_day(1).expect("day 1 exists in every month");
    let next_month = if end.month() == 12 {
        NaiveDate::from_ymd_opt(end.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(end.year(), end.month() + 1, 1)
    }
    .expect("first of month is always valid");
    let last = next_month
        .pred_opt()
        .expect("a day precedes the first of any month");
    (first, last)
}

/// Grouping is by adjacency, so the hits are sorted on speaker name
/// immediately beforehand. `sort_by` is stable; within a speaker the
/// per-index result order is preserved.
fn group_by_speaker(mut hits: Vec<SpeechHit>, score: ScoreFn) -> Vec<MemberRecord> {
    hits.sort_by(|a, b| a.speaker_name.cmp(&b.speaker_name));
    hits.chunk_by(|a, b| a.speaker_name == b.speaker_name)
        .map(|group| build_member_record(group, score))
        .collect()
}

/// The per-member average score is computed once from the scorer and
/// carried on both the record and every contribution in it.
fn build_member_record(group: &[SpeechHit], score: ScoreFn) -> MemberRecord {
    let speaker_name = group[0].speaker_name.clone();
    let count = group.len();

    let scores: Vec<u32> = group.iter().map(score).collect();
    let avg_score = scores.iter().sum::<u32>() / count as u32;

    let contributions: Vec<Contribution> = group
        .iter()
        .zip(&scores)
        .map(|(hit, &hit_score)| Contribution {
            member_id: speaker_name.clone(),
            member_name: hit.speaker_name.clone(),
            member_party_name: hit
                .speaker_party
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            member_party_abbreviation: hit
                .speaker_role
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            member_party_foreground_colour: PARTY_FOREGROUND_COLOUR.to_string(),
            member_party_background_colour: PARTY_BACKGROUND_COLOUR.to_string(),
            member_house_background_colour: HOUSE_BACKGROUND_COLOUR.to_string(),
            member_url: PLACEHOLDER_URL.to_string(),
            member_contribution_count: count,
            member_avg_score: avg_score,
            text: hit.speech_text.clone(),
            attributed_to: hit.speaker_name.clone(),
            house: hit.house.clone().unwrap_or_else(|| "Unknown".to_string()),
            date: hit.date.clone(),
            score: hit_score,
            contribution_url: PLACEHOLDER_URL.to_string(),
            debate_url: PLACEHOLDER_URL.to_string(),
            debate_title: hit.debate_title.clone(),
            chamber_date_url: PLACEHOLDER_URL.to_string(),
        })
        .collect();

    MemberRecord {
        member_id: speaker_name,
        member_contribution_count: count,
        member_avg_score: avg_score,
        contributions,
        summary: None,
        headline: None,
        bill_sentiment: None,
        indicative_quotes: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(speaker: &str, text: &str) -> SpeechHit {
        SpeechHit {
            speech_text: text.to_string(),
            speaker_name: speaker.to_string(),
            speaker_party: None,
            speaker_role: None,
            debate_title: "Budget Debate".to_string(),
            date: "2025-03-01".to_string(),
            house: Some("EU Parliament".to_string()),
        }
    }

    #[test]
    fn groups_interleaved_speakers() {
        let hits = vec![hit("A", "first"), hit("B", "second"), hit("A", "third")];
        let records = group_by_speaker(hits, placeholder_score);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].member_id, "A");
        assert_eq!(records[0].contributions.len(), 2);
        assert_eq!(records[0].member_contribution_count, 2);
        assert_eq!(records[1].member_id, "B");
        assert_eq!(records[1].contributions.len(), 1);
    }

    #[test]
    fn grouping_preserves_within_speaker_order() {
        let hits = vec![hit("A", "first"), hit("B", "x"), hit("A", "third")];
        let records = group_by_speaker(hits, placeholder_score);
        assert_eq!(records[0].contributions[0].text, "first");
        assert_eq!(records[0].contributions[1].text, "third");
    }

    #[test]
    fn record_carries_placeholder_metadata() {
        let records = group_by_speaker(vec![hit("A", "text")], placeholder_score);
        let c = &records[0].contributions[0];
        assert_eq!(c.score, 1);
        assert_eq!(c.member_url, "NA");
        assert_eq!(c.member_party_name, "Unknown");
        assert_eq!(c.house, "EU Parliament");
        assert_eq!(records[0].member_avg_score, 1);
    }

    #[test]
    fn month_range_expands_to_calendar_days() {
        let start = NaiveDate::from_ymd_opt(2025, 2, 14).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 4, 9).unwrap();
        let (first, last) = expand_month_range((start, end));
        assert_eq!(first, NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
        assert_eq!(last, NaiveDate::from_ymd_opt(2025, 4, 30).unwrap());
    }

    #[test]
    fn month_range_handles_december() {
        let d = NaiveDate::from_ymd_opt(2024, 12, 5).unwrap();
        let (first, last) = expand_month_range((d, d));
        assert_eq!(first, NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
        assert_eq!(last, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
    }

    #[test]
    fn custom_score_fn_is_applied() {
        fn by_length(hit: &SpeechHit) -> u32 {
            hit.speech_text.len() as u32
        }
        let records = group_by_speaker(vec![hit("A", "12345")], by_length);
        assert_eq!(records[0].contributions[0].score, 5);
    }

    #[test]
    fn avg_score_agrees_between_record_and_contributions() {
        fn by_length(hit: &SpeechHit) -> u32 {
            hit.speech_text.len() as u32
        }
        let records = group_by_speaker(vec![hit("A", "1234"), hit("A", "12")], by_length);

        assert_eq!(records[0].member_avg_score, 3);
        assert!(records[0]
            .contributions
            .iter()
            .all(|c| c.member_avg_score == records[0].member_avg_score));
    }
}

use serde::{Deserialize, Serialize};

/// One ranked document returned by a speech index.
///
/// This is the whole field contract the pipeline depends on; any backend
/// that can produce these fields can serve as a speech index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechHit {
    pub speech_text: String,
    pub speaker_name: String,
    #[serde(default)]
    pub speaker_party: Option<String>,
    #[serde(default)]
    pub speaker_role: Option<String>,
    pub debate_title: String,
    pub date: String,
    /// Attached after the search returns, naming the legislative body the
    /// index covers. Never part of the stored document.
    #[serde(default)]
    pub house: Option<String>,
}

/// One speech excerpt inside a member record, carrying the static display
/// metadata the frontend cards expect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contribution {
    pub member_id: String,
    pub member_name: String,
    pub member_party_name: String,
    pub member_party_abbreviation: String,
    pub member_party_foreground_colour: String,
    pub member_party_background_colour: String,
    pub member_house_background_colour: String,
    pub member_url: String,
    pub member_contribution_count: usize,
    pub member_avg_score: u32,
    pub text: String,
    pub attributed_to: String,
    pub house: String,
    pub date: String,
    pub score: u32,
    pub contribution_url: String,
    pub debate_url: String,
    pub debate_title: String,
    pub chamber_date_url: String,
}

/// Aggregated per-speaker search results plus, once this member's
/// summarisation task completes, the sentiment summary fields.
///
/// A record only exists when at least one speech matched, so
/// `contributions` is never empty. The summary fields are attached exactly
/// once by the orchestrator; after emission the record is owned by the
/// stream consumer and never revisited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberRecord {
    pub member_id: String,
    pub member_contribution_count: usize,
    pub member_avg_score: u32,
    pub contributions: Vec<Contribution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    /// 1 is strongly against, 5 is neutral or not applicable, 10 is
    /// strongly for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bill_sentiment: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indicative_quotes: Option<Vec<String>>,
}

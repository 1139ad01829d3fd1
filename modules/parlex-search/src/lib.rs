pub mod aggregate;
pub mod index;

pub use aggregate::{expand_month_range, IndexSource, SearchAggregator};
pub use index::{EsSpeechIndex, SpeechIndex};

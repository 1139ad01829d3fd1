pub mod orchestrator;
pub mod stream;
pub mod summarise;

pub use orchestrator::Orchestrator;
pub use stream::{drop_empty, raw_topic_search, run_topic_search, StreamFrame};
pub use summarise::{summarise_member, MemberSummary};

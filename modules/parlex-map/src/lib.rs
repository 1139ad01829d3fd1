pub mod chat;
pub mod decision;
pub mod map;
pub mod render;
pub mod resolver;

pub use chat::{summarise_documents, Language, MapChat};
pub use decision::{apply_decision, ChatDecision, DecisionOutcome, MapAction};
pub use map::{EditOutcome, ProcessEdge, ProcessMap, ProcessNode};
pub use render::{format_for_prompt, to_mermaid};
pub use resolver::validate_edge;

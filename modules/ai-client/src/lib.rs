mod client;
mod schema;
mod traits;

pub use client::OpenAi;
pub use schema::StructuredOutput;
pub use traits::{extract, ChatModel, Message, Role};

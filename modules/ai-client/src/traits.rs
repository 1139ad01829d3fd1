use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::schema::StructuredOutput;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// The seam between the pipeline and the model provider. Handlers take this
/// as a shared, stateless handle; tests swap in fakes.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Complete with a target schema. Returns the parsed JSON value or an
    /// error on connectivity failure or non-conforming output.
    async fn structured(
        &self,
        messages: &[Message],
        schema: serde_json::Value,
    ) -> Result<serde_json::Value>;

    /// Plain chat completion.
    async fn chat(&self, messages: &[Message]) -> Result<String>;
}

/// Typed structured-output extraction over any [`ChatModel`].
///
/// A response that does not deserialize into `T` is a hard error, not a
/// soft fallback.
pub async fn extract<T: StructuredOutput>(
    model: &dyn ChatModel,
    messages: &[Message],
) -> Result<T> {
    let value = model.structured(messages, T::strict_schema()).await?;
    serde_json::from_value(value)
        .map_err(|e| anyhow!("Response does not match {} schema: {}", T::type_name(), e))
}

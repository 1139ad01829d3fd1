use anyhow::Result;
use tracing::debug;

use ai_client::{extract, ChatModel, Message};

use crate::decision::{apply_decision, ChatDecision, DecisionOutcome, MapAction};
use crate::map::ProcessMap;
use crate::render::format_for_prompt;

const MAPPING_GUIDELINES: &str = "You are an expert process mapping assistant. \
Your role is to help users understand their document, visualise and question their processes. \
You should guide users to break down complex processes into clear, discrete steps and provide \
a separate message in a natural, conversational tone.

Your output is a decision: a list of actions (add_node, add_edge, or message) applied to the \
process map in order, plus an optional closing message for the user.

INTERACTION GUIDELINES:
1. Focus on one part of the process at a time
2. Maintain clarity by using the user's own terminology
3. Seek clarification when something is ambiguous
4. Help identify missing steps or gaps in the process

PROCESS MAPPING RULES:
1. Each node should represent a single, clear step in the process
2. Node names should be concise but descriptive
3. Node descriptions should provide clear context about what happens in that step
4. Connections should clearly describe how one step leads to another
5. Avoid creating cycles unless explicitly part of the process
6. Ensure all steps are connected appropriately";

fn mapping_prompt(map: &ProcessMap) -> String {
    let state = if map.nodes.is_empty() && map.edges.is_empty() {
        "The process map is currently empty. Start by helping the user identify the initial \
steps of their process."
            .to_string()
    } else {
        format!(
            "CURRENT PROCESS MAP STATE:\n{}\n\nUse this current state to:\n\
1. Reference existing nodes when adding connections\n\
2. Identify gaps in the process\n\
3. Ensure consistency with existing steps\n\
4. Avoid duplicate nodes or connections\n\
5. Build upon the existing structure systematically",
            format_for_prompt(map)
        )
    };

    format!("{MAPPING_GUIDELINES}\n\n{state}")
}

/// One chat session over one process map. The conversation history lives
/// here; the map is owned by the caller and mutated only through
/// [`apply_decision`].
pub struct MapChat {
    model: std::sync::Arc<dyn ChatModel>,
    conversation: Vec<Message>,
}

impl MapChat {
    pub fn new(model: std::sync::Arc<dyn ChatModel>) -> Self {
        Self {
            model,
            conversation: Vec::new(),
        }
    }

    /// Ask the model for a decision about the user's input, apply it to
    /// the map, and return the feedback lines. Structural edits are
    /// recorded into the history in plaintext so later turns see what the
    /// assistant actually did.
    pub async fn respond(
        &mut self,
        user_input: &str,
        map: &mut ProcessMap,
    ) -> Result<DecisionOutcome> {
        self.conversation.push(Message::user(user_input));

        let mut messages = vec![Message::system(mapping_prompt(map))];
        messages.extend(self.conversation.iter().cloned());

        let decision: ChatDecision = extract(self.model.as_ref(), &messages).await?;
        debug!(actions = decision.actions.len(), "Chat decision received");

        for action in &decision.actions {
            let note = match action {
                MapAction::Message { content } => content.clone(),
                MapAction::AddNode { node } => {
                    format!("Added node '{}': {}", node.unique_name, node.description)
                }
                MapAction::AddEdge { edge } => {
                    format!("Added edge from '{}' to '{}'", edge.source, edge.target)
                }
            };
            self.conversation.push(Message::assistant(note));
        }
        if let Some(content) = &decision.message {
            self.conversation.push(Message::assistant(content.clone()));
        }

        Ok(apply_decision(map, &decision))
    }

    /// Build an initial map from an uploaded document in one structured
    /// call, before the interactive session starts.
    pub async fn bootstrap_map(&self, document: &str) -> Result<ProcessMap> {
        let messages = [
            Message::system(
                "Build a process map from the user's document, adding nodes for each step \
and edges for each transition until the process is fully covered.",
            ),
            Message::user(document),
        ];
        extract(self.model.as_ref(), &messages).await
    }
}

/// Output language for the document summariser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    French,
}

/// Summarise a batch of uploaded documents in under 100 words, optionally
/// translating to French.
pub async fn summarise_documents(
    model: &dyn ChatModel,
    documents: &str,
    number_of_documents: usize,
    language: Language,
) -> Result<String> {
    let instruction = match language {
        Language::English => {
            "The following is a set of documents uploaded by a user. Please read each \
document in turn and summarise the key points in under 100 words."
        }
        Language::French => {
            "You are a helpful English to French translator and summariser. The following \
is a set of documents uploaded by a user, each in English. Please read each document in \
turn and summarise the key points in under 100 words in French."
        }
    };

    let messages = [
        Message::system(instruction),
        Message::system(format!("Number of documents: {number_of_documents}")),
        Message::user(documents),
    ];

    model.chat(&messages).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::ProcessNode;

    #[test]
    fn empty_map_prompt_invites_first_steps() {
        let prompt = mapping_prompt(&ProcessMap::new());
        assert!(prompt.contains("currently empty"));
        assert!(!prompt.contains("CURRENT PROCESS MAP STATE"));
    }

    #[test]
    fn seeded_map_prompt_embeds_the_listing() {
        let mut map = ProcessMap::new();
        map.add_node(ProcessNode {
            unique_name: "Intake".to_string(),
            description: "Receive the request".to_string(),
        });
        let prompt = mapping_prompt(&map);
        assert!(prompt.contains("CURRENT PROCESS MAP STATE"));
        assert!(prompt.contains("- Intake: Receive the request"));
    }
}

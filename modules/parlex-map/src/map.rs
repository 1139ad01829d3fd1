use std::collections::HashSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Outcome of a graph edit attempt. Validation failures are data, not
/// faults; the caller turns the message into user-facing feedback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditOutcome {
    pub accepted: bool,
    pub message: String,
}

impl EditOutcome {
    pub fn accepted(message: impl Into<String>) -> Self {
        Self {
            accepted: true,
            message: message.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            accepted: false,
            message: message.into(),
        }
    }
}

/// One step in a process. `unique_name` is the identity; `description` is
/// free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ProcessNode {
    pub unique_name: String,
    pub description: String,
}

/// A described transition between two existing steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ProcessEdge {
    pub source: String,
    pub target: String,
    pub description: String,
}

/// A small directed graph of named steps, built interactively over one
/// chat session. Mutated only through the add operations; there is no
/// removal.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ProcessMap {
    pub nodes: Vec<ProcessNode>,
    pub edges: Vec<ProcessEdge>,
}

impl ProcessMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current node identities. Computed from live state on every call —
    /// validation must never see a stale view.
    pub fn node_set(&self) -> HashSet<&str> {
        self.nodes.iter().map(|n| n.unique_name.as_str()).collect()
    }

    /// Current (source, target) pairs.
    pub fn edge_set(&self) -> HashSet<(&str, &str)> {
        self.edges
            .iter()
            .map(|e| (e.source.as_str(), e.target.as_str()))
            .collect()
    }

    /// Append a node unless its name is already taken. Rejection has no
    /// side effect.
    pub fn add_node(&mut self, node: ProcessNode) -> EditOutcome {
        if self.node_set().contains(node.unique_name.as_str()) {
            return EditOutcome::rejected(format!(
                "Node with name '{}' already exists",
                node.unique_name
            ));
        }

        let message = format!("Successfully added node '{}'", node.unique_name);
        self.nodes.push(node);
        EditOutcome::accepted(message)
    }
}

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::map::{EditOutcome, ProcessEdge, ProcessMap, ProcessNode};
use crate::resolver::validate_edge;

/// Closed set of actions the model may propose. Handled exhaustively in
/// [`apply_decision`]; an unknown action shape fails structured-output
/// parsing upstream rather than reaching here.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MapAction {
    AddNode { node: ProcessNode },
    AddEdge { edge: ProcessEdge },
    Message { content: String },
}

/// One model response unit, consumed exactly once by [`apply_decision`].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ChatDecision {
    /// Conversational reply shown to the user after any map edits.
    pub message: Option<String>,
    /// Ordered map edits and inline remarks.
    pub actions: Vec<MapAction>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionOutcome {
    /// One feedback line per structural action, then the conversational
    /// content, in that order.
    pub messages: Vec<String>,
    /// True only if every structural action was accepted.
    pub all_successful: bool,
}

/// Apply a decision's actions to the map.
///
/// Node additions are applied before any edge is validated, so an edge may
/// reference a node added earlier in the same batch — including one whose
/// add was rejected as a duplicate, since that name legitimately exists.
/// Conversational content is appended last, unvalidated.
pub fn apply_decision(map: &mut ProcessMap, decision: &ChatDecision) -> DecisionOutcome {
    let mut messages = Vec::new();
    let mut all_successful = true;

    for action in &decision.actions {
        if let MapAction::AddNode { node } = action {
            let outcome = map.add_node(node.clone());
            all_successful &= outcome.accepted;
            messages.push(outcome.message);
        }
    }

    for action in &decision.actions {
        if let MapAction::AddEdge { edge } = action {
            let outcome = add_edge(map, edge);
            all_successful &= outcome.accepted;
            messages.push(outcome.message);
        }
    }

    for action in &decision.actions {
        match action {
            MapAction::Message { content } => messages.push(content.clone()),
            MapAction::AddNode { .. } | MapAction::AddEdge { .. } => {}
        }
    }

    if let Some(content) = &decision.message {
        messages.push(content.clone());
    }

    DecisionOutcome {
        messages,
        all_successful,
    }
}

/// Resolve then commit one edge: endpoints must exist and the
/// (source, target) pair must be new. Multiplicity by description is not
/// permitted.
fn add_edge(map: &mut ProcessMap, edge: &ProcessEdge) -> EditOutcome {
    let resolved = validate_edge(edge, map);
    if !resolved.accepted {
        return resolved;
    }

    if map
        .edge_set()
        .contains(&(edge.source.as_str(), edge.target.as_str()))
    {
        return EditOutcome::rejected(format!(
            "Edge from '{}' to '{}' already exists",
            edge.source, edge.target
        ));
    }

    map.edges.push(edge.clone());
    EditOutcome::accepted(format!(
        "Successfully added edge from '{}' to '{}'",
        edge.source, edge.target
    ))
}

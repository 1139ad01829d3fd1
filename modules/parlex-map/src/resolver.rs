use crate::map::{EditOutcome, ProcessEdge, ProcessMap};

/// Speculative validation of a candidate edge against the current map:
/// both endpoints must already be nodes. Performs no mutation, so it is
/// safe to call before committing.
pub fn validate_edge(edge: &ProcessEdge, map: &ProcessMap) -> EditOutcome {
    let nodes = map.node_set();

    if !nodes.contains(edge.source.as_str()) {
        return EditOutcome::rejected(format!(
            "Source node '{}' does not exist",
            edge.source
        ));
    }

    if !nodes.contains(edge.target.as_str()) {
        return EditOutcome::rejected(format!(
            "Target node '{}' does not exist",
            edge.target
        ));
    }

    EditOutcome::accepted("")
}

use crate::map::ProcessMap;

/// Render the map as a Mermaid `flowchart TD` diagram for display.
pub fn to_mermaid(map: &ProcessMap) -> String {
    let mut lines = vec!["flowchart TD".to_string()];

    for node in &map.nodes {
        let description = node.description.replace('"', "\\\"");
        lines.push(format!("    {}[\"{}\"]", node.unique_name, description));
    }

    for edge in &map.edges {
        let description = edge.description.replace('"', "\\\"");
        lines.push(format!(
            "    {} -->|\"{}\"| {}",
            edge.source, description, edge.target
        ));
    }

    lines.join("\n")
}

/// Serialise the map as the node/edge listing embedded in chatbot prompts.
/// Sections are sorted so the listing is deterministic regardless of
/// insertion order.
pub fn format_for_prompt(map: &ProcessMap) -> String {
    if map.nodes.is_empty() && map.edges.is_empty() {
        return "The process map is currently empty.".to_string();
    }

    let mut out = String::from("Process Nodes:\n");
    let mut nodes: Vec<_> = map.nodes.iter().collect();
    nodes.sort_by(|a, b| a.unique_name.cmp(&b.unique_name));
    for node in nodes {
        out.push_str(&format!("- {}: {}\n", node.unique_name, node.description));
    }

    out.push_str("\nProcess Connections:\n");
    if map.edges.is_empty() {
        out.push_str("- No connections defined yet\n");
    } else {
        let mut edges: Vec<_> = map.edges.iter().collect();
        edges.sort_by(|a, b| (&a.source, &a.target).cmp(&(&b.source, &b.target)));
        for edge in edges {
            out.push_str(&format!(
                "- {} -> {}: {}\n",
                edge.source, edge.target, edge.description
            ));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{ProcessEdge, ProcessNode};

    fn sample_map() -> ProcessMap {
        ProcessMap {
            nodes: vec![
                ProcessNode {
                    unique_name: "Review".to_string(),
                    description: "Check the draft".to_string(),
                },
                ProcessNode {
                    unique_name: "Intake".to_string(),
                    description: "Receive the request".to_string(),
                },
            ],
            edges: vec![ProcessEdge {
                source: "Intake".to_string(),
                target: "Review".to_string(),
                description: "hand over".to_string(),
            }],
        }
    }

    /// Deterministic counterpart of `format_for_prompt`, for round-trip
    /// checks. Descriptions must not contain ": " for this simple parser.
    fn parse_listing(listing: &str) -> ProcessMap {
        let mut map = ProcessMap::new();
        let mut in_edges = false;

        for line in listing.lines() {
            if line.starts_with("Process Connections:") {
                in_edges = true;
                continue;
            }
            let Some(item) = line.strip_prefix("- ") else {
                continue;
            };
            if item == "No connections defined yet" {
                continue;
            }
            if in_edges {
                let (pair, description) = item.split_once(": ").unwrap();
                let (source, target) = pair.split_once(" -> ").unwrap();
                map.edges.push(ProcessEdge {
                    source: source.to_string(),
                    target: target.to_string(),
                    description: description.to_string(),
                });
            } else {
                let (name, description) = item.split_once(": ").unwrap();
                map.nodes.push(ProcessNode {
                    unique_name: name.to_string(),
                    description: description.to_string(),
                });
            }
        }

        map
    }

    #[test]
    fn empty_map_has_placeholder_listing() {
        assert_eq!(
            format_for_prompt(&ProcessMap::new()),
            "The process map is currently empty."
        );
    }

    #[test]
    fn listing_is_sorted() {
        let listing = format_for_prompt(&sample_map());
        let intake = listing.find("- Intake:").unwrap();
        let review = listing.find("- Review:").unwrap();
        assert!(intake < review);
    }

    #[test]
    fn listing_round_trips() {
        let map = sample_map();
        let parsed = parse_listing(&format_for_prompt(&map));

        let names = |m: &ProcessMap| {
            let mut v: Vec<String> = m.nodes.iter().map(|n| n.unique_name.clone()).collect();
            v.sort();
            v
        };
        assert_eq!(names(&parsed), names(&map));
        assert_eq!(
            parsed.edge_set().len(),
            map.edge_set().len()
        );
        assert!(parsed.edge_set().contains(&("Intake", "Review")));
    }

    #[test]
    fn mermaid_escapes_quotes() {
        let map = ProcessMap {
            nodes: vec![ProcessNode {
                unique_name: "Check".to_string(),
                description: "verify \"totals\"".to_string(),
            }],
            edges: vec![],
        };
        let mermaid = to_mermaid(&map);
        assert!(mermaid.starts_with("flowchart TD"));
        assert!(mermaid.contains("Check[\"verify \\\"totals\\\"\"]"));
    }

    #[test]
    fn mermaid_renders_edges_with_labels() {
        let mermaid = to_mermaid(&sample_map());
        assert!(mermaid.contains("Intake -->|\"hand over\"| Review"));
    }
}

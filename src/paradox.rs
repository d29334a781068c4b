use std::collections::{BTreeSet, HashMap};

use crate::config::ParadoxConfig;
use crate::graph::Graph;

/// A cycle of sign-bearing edges with an odd number of negative edges:
/// the beliefs along it cannot be consistently labeled for or against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParadoxCycle {
    /// Member edges in traversal order.
    pub edge_ids: Vec<String>,
    /// Member nodes in traversal order, for UI highlighting.
    pub node_ids: Vec<String>,
}

struct SignedEdge<'a> {
    id: &'a str,
    from: &'a str,
    to: &'a str,
    negative: bool,
}

/// Scans the subgraph induced by reinforces/contradicts/undermines edges
/// for simple cycles up to `max_cycle_len` and flags the structurally
/// unbalanced ones (odd negative count).
///
/// Expects an already-validated graph; detection is never run on one that
/// failed load. The caller caches the result and invalidates on mutation.
pub fn detect_paradoxes(graph: &Graph, config: &ParadoxConfig) -> Vec<ParadoxCycle> {
    let signed: Vec<SignedEdge> = graph
        .edges()
        .iter()
        .filter(|edge| edge.kind.is_sign_bearing())
        .map(|edge| SignedEdge {
            id: &edge.id,
            from: &edge.from,
            to: &edge.to,
            negative: edge.kind.is_negative(),
        })
        .collect();
    if signed.is_empty() {
        return Vec::new();
    }

    let mut outgoing: HashMap<&str, Vec<usize>> = HashMap::new();
    for (index, edge) in signed.iter().enumerate() {
        outgoing.entry(edge.from).or_default().push(index);
    }

    let mut cycles = Vec::new();
    let mut seen: BTreeSet<Vec<String>> = BTreeSet::new();

    // DFS from every node in sorted order; a cycle is only accepted when it
    // closes back on the start node, and dedup happens on the canonical
    // rotation of its edge-id sequence.
    for start in graph.sorted_node_ids() {
        let mut edge_path: Vec<usize> = Vec::new();
        let mut node_path: Vec<&str> = vec![start];
        walk(
            start,
            start,
            &signed,
            &outgoing,
            config.max_cycle_len,
            &mut edge_path,
            &mut node_path,
            &mut seen,
            &mut cycles,
        );
    }
    cycles
}

#[allow(clippy::too_many_arguments)]
fn walk<'a>(
    start: &'a str,
    current: &'a str,
    signed: &[SignedEdge<'a>],
    outgoing: &HashMap<&'a str, Vec<usize>>,
    max_len: usize,
    edge_path: &mut Vec<usize>,
    node_path: &mut Vec<&'a str>,
    seen: &mut BTreeSet<Vec<String>>,
    cycles: &mut Vec<ParadoxCycle>,
) {
    if edge_path.len() >= max_len {
        return;
    }
    let Some(candidates) = outgoing.get(current) else {
        return;
    };
    for &index in candidates {
        let edge = &signed[index];
        if edge.to == start {
            if !edge_path.is_empty() {
                record_cycle(signed, edge_path, index, node_path, seen, cycles);
            }
            continue;
        }
        // Simple cycles only: never revisit a node on the current path.
        if node_path.contains(&edge.to) {
            continue;
        }
        edge_path.push(index);
        node_path.push(edge.to);
        walk(
            start, edge.to, signed, outgoing, max_len, edge_path, node_path, seen, cycles,
        );
        edge_path.pop();
        node_path.pop();
    }
}

fn record_cycle<'a>(
    signed: &[SignedEdge<'a>],
    edge_path: &[usize],
    closing: usize,
    node_path: &[&'a str],
    seen: &mut BTreeSet<Vec<String>>,
    cycles: &mut Vec<ParadoxCycle>,
) {
    let mut member_edges: Vec<usize> = edge_path.to_vec();
    member_edges.push(closing);

    let canonical = canonical_rotation(
        &member_edges
            .iter()
            .map(|&i| signed[i].id.to_string())
            .collect::<Vec<_>>(),
    );
    if !seen.insert(canonical) {
        return;
    }

    let negatives = member_edges.iter().filter(|&&i| signed[i].negative).count();
    if negatives % 2 == 1 {
        cycles.push(ParadoxCycle {
            edge_ids: member_edges
                .iter()
                .map(|&i| signed[i].id.to_string())
                .collect(),
            node_ids: node_path.iter().map(|id| id.to_string()).collect(),
        });
    }
}

/// Rotates the sequence so its lexicographically smallest element comes
/// first; the same cycle found from different start nodes compares equal.
fn canonical_rotation(ids: &[String]) -> Vec<String> {
    let pivot = ids
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.cmp(b))
        .map(|(i, _)| i)
        .unwrap_or(0);
    let mut rotated = Vec::with_capacity(ids.len());
    rotated.extend_from_slice(&ids[pivot..]);
    rotated.extend_from_slice(&ids[..pivot]);
    rotated
}

/// Node ids on any flagged cycle, deduplicated, for UI highlighting.
pub fn paradox_node_ids(cycles: &[ParadoxCycle]) -> BTreeSet<String> {
    cycles
        .iter()
        .flat_map(|cycle| cycle.node_ids.iter().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, EdgeKind, Node, NodeKind};

    fn triangle(third: EdgeKind) -> Graph {
        Graph::load(
            vec![
                Node::new("A", "a", NodeKind::Belief),
                Node::new("B", "b", NodeKind::Belief),
                Node::new("C", "c", NodeKind::Belief),
            ],
            vec![
                Edge::new("e1", "A", "B", EdgeKind::Reinforces),
                Edge::new("e2", "B", "C", EdgeKind::Reinforces),
                Edge::new("e3", "C", "A", third),
            ],
        )
        .unwrap()
    }

    #[test]
    fn odd_negative_triangle_is_flagged() {
        let cycles = detect_paradoxes(&triangle(EdgeKind::Contradicts), &ParadoxConfig::default());
        assert_eq!(cycles.len(), 1);
        let mut edges = cycles[0].edge_ids.clone();
        edges.sort();
        assert_eq!(edges, vec!["e1", "e2", "e3"]);
        let nodes = paradox_node_ids(&cycles);
        assert!(nodes.contains("A") && nodes.contains("B") && nodes.contains("C"));
    }

    #[test]
    fn all_positive_triangle_is_balanced() {
        let cycles = detect_paradoxes(&triangle(EdgeKind::Reinforces), &ParadoxConfig::default());
        assert!(cycles.is_empty());
    }

    #[test]
    fn two_negatives_are_balanced() {
        let graph = Graph::load(
            vec![
                Node::new("A", "a", NodeKind::Belief),
                Node::new("B", "b", NodeKind::Belief),
                Node::new("C", "c", NodeKind::Belief),
            ],
            vec![
                Edge::new("e1", "A", "B", EdgeKind::Contradicts),
                Edge::new("e2", "B", "C", EdgeKind::Undermines),
                Edge::new("e3", "C", "A", EdgeKind::Reinforces),
            ],
        )
        .unwrap();
        assert!(detect_paradoxes(&graph, &ParadoxConfig::default()).is_empty());
    }

    #[test]
    fn non_sign_bearing_edges_do_not_form_cycles() {
        let graph = Graph::load(
            vec![
                Node::new("A", "a", NodeKind::Action),
                Node::new("B", "b", NodeKind::Consequence),
            ],
            vec![
                Edge::new("e1", "A", "B", EdgeKind::LeadsTo),
                Edge::new("e2", "B", "A", EdgeKind::Undermines),
            ],
        )
        .unwrap();
        // Only one sign-bearing edge; no cycle exists in the induced subgraph.
        assert!(detect_paradoxes(&graph, &ParadoxConfig::default()).is_empty());
    }

    #[test]
    fn each_cycle_reported_once() {
        // A->B contradicts, B->A reinforces: a 2-cycle with one negative,
        // reachable from both A and B but reported once.
        let graph = Graph::load(
            vec![
                Node::new("A", "a", NodeKind::Belief),
                Node::new("B", "b", NodeKind::Belief),
            ],
            vec![
                Edge::new("e1", "A", "B", EdgeKind::Contradicts),
                Edge::new("e2", "B", "A", EdgeKind::Reinforces),
            ],
        )
        .unwrap();
        let cycles = detect_paradoxes(&graph, &ParadoxConfig::default());
        assert_eq!(cycles.len(), 1);
    }

    #[test]
    fn cycle_length_bound_is_respected() {
        let n = 5;
        let nodes: Vec<Node> = (0..n)
            .map(|i| Node::new(format!("n{i}"), "x", NodeKind::Belief))
            .collect();
        let mut edges: Vec<Edge> = (0..n - 1)
            .map(|i| {
                Edge::new(
                    format!("e{i}"),
                    format!("n{i}"),
                    format!("n{}", i + 1),
                    EdgeKind::Reinforces,
                )
            })
            .collect();
        edges.push(Edge::new(
            "back",
            format!("n{}", n - 1),
            "n0",
            EdgeKind::Contradicts,
        ));
        let graph = Graph::load(nodes, edges).unwrap();
        assert_eq!(
            detect_paradoxes(&graph, &ParadoxConfig { max_cycle_len: 3 }).len(),
            0
        );
        assert_eq!(
            detect_paradoxes(&graph, &ParadoxConfig { max_cycle_len: 8 }).len(),
            1
        );
    }
}

use serde::{Deserialize, Serialize};

use crate::graph::{Edge, EdgeKind, Graph, GraphError, Node, NodeKind, Vec2, DEFAULT_INTENSITY};
use crate::viewport::Viewport;

/// Wire form of a node. `position`/`pinned` are optional layout state a
/// caller may have persisted to resume a stable view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Vec2>,
    #[serde(default)]
    pub pinned: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeSnapshot {
    pub id: String,
    #[serde(rename = "source")]
    pub from: String,
    #[serde(rename = "target")]
    pub to: String,
    #[serde(rename = "edgeType")]
    pub kind: EdgeKind,
    #[serde(default = "default_intensity")]
    pub intensity: f32,
}

fn default_intensity() -> f32 {
    DEFAULT_INTENSITY
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ViewportSnapshot {
    pub zoom: f32,
    pub pan: Vec2,
}

/// Everything a caller needs to persist and later resume a session:
/// the graph, optional per-node layout positions, optional viewport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub nodes: Vec<NodeSnapshot>,
    pub edges: Vec<EdgeSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport: Option<ViewportSnapshot>,
}

impl Snapshot {
    /// Captures the current graph, layout positions and viewport.
    pub fn capture(graph: &Graph, viewport: &Viewport) -> Self {
        Self {
            nodes: graph
                .nodes()
                .map(|node| NodeSnapshot {
                    id: node.id.clone(),
                    label: node.label.clone(),
                    kind: node.kind,
                    position: Some(node.position),
                    pinned: node.pinned,
                })
                .collect(),
            edges: graph
                .edges()
                .iter()
                .map(|edge| EdgeSnapshot {
                    id: edge.id.clone(),
                    from: edge.from.clone(),
                    to: edge.to.clone(),
                    kind: edge.kind,
                    intensity: edge.intensity,
                })
                .collect(),
            viewport: Some(ViewportSnapshot {
                zoom: viewport.zoom(),
                pan: viewport.pan(),
            }),
        }
    }

    /// Validates into a graph; load failures list every violation.
    pub fn into_graph(self) -> Result<Graph, GraphError> {
        let nodes = self
            .nodes
            .into_iter()
            .map(|snapshot| {
                let mut node = Node::new(snapshot.id, snapshot.label, snapshot.kind);
                if let Some(position) = snapshot.position {
                    node.position = position;
                }
                node.pinned = snapshot.pinned;
                node
            })
            .collect();
        let edges = self
            .edges
            .into_iter()
            .map(|snapshot| {
                Edge::new(snapshot.id, snapshot.from, snapshot.to, snapshot.kind)
                    .with_intensity(snapshot.intensity)
            })
            .collect();
        Graph::load(nodes, edges)
    }

    /// True when every node carries a persisted position, meaning the
    /// stored layout can be resumed instead of reseeded.
    pub fn has_full_layout(&self) -> bool {
        !self.nodes.is_empty() && self.nodes.iter().all(|node| node.position.is_some())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Parses a snapshot document, accepting strict JSON first and JSON5 for
/// hand-edited files.
pub fn parse_snapshot(input: &str) -> anyhow::Result<Snapshot> {
    match serde_json::from_str(input) {
        Ok(snapshot) => Ok(snapshot),
        Err(_) => Ok(json5::from_str(input)?),
    }
}

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 2D vector shared by layout positions, velocities and viewport math.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn scale(self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl std::ops::Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Thought,
    Belief,
    Emotion,
    Action,
    Experience,
    Consequence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Reinforces,
    Contradicts,
    Undermines,
    LeadsTo,
    CoOccursWith,
}

impl EdgeKind {
    /// Edges that carry a for/against sign in structural-balance analysis.
    pub fn is_sign_bearing(self) -> bool {
        matches!(
            self,
            EdgeKind::Reinforces | EdgeKind::Contradicts | EdgeKind::Undermines
        )
    }

    pub fn is_negative(self) -> bool {
        matches!(self, EdgeKind::Contradicts | EdgeKind::Undermines)
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
    /// World-space position. Owned by the layout engine for unpinned nodes.
    pub position: Vec2,
    /// Simulation-only; meaningless while pinned.
    pub velocity: Vec2,
    /// Held constant by the layout while true (user-dragged or restored).
    pub pinned: bool,
}

impl Node {
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            pinned: false,
        }
    }
}

pub const DEFAULT_INTENSITY: f32 = 0.5;

#[derive(Debug, Clone)]
pub struct Edge {
    pub id: String,
    pub from: String,
    pub to: String,
    pub kind: EdgeKind,
    /// Relation strength in [0, 1]; clamped on construction.
    pub intensity: f32,
}

impl Edge {
    pub fn new(
        id: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
        kind: EdgeKind,
    ) -> Self {
        Self {
            id: id.into(),
            from: from.into(),
            to: to.into(),
            kind,
            intensity: DEFAULT_INTENSITY,
        }
    }

    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity.clamp(0.0, 1.0);
        self
    }
}

/// A single invariant violation found during load or mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("duplicate node id \"{0}\"")]
    DuplicateNodeId(String),
    #[error("duplicate edge id \"{0}\"")]
    DuplicateEdgeId(String),
    #[error("edge \"{edge_id}\" references missing node \"{node_id}\"")]
    MissingEndpoint { edge_id: String, node_id: String },
    #[error("edge \"{edge_id}\" is a self-loop")]
    SelfLoop { edge_id: String },
    #[error("unknown node \"{0}\"")]
    UnknownNode(String),
}

#[derive(Debug, Clone, Error)]
pub enum GraphError {
    #[error("graph validation failed: {}", format_violations(.0))]
    Validation(Vec<Violation>),
}

fn format_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl GraphError {
    pub fn violations(&self) -> &[Violation] {
        match self {
            GraphError::Validation(list) => list,
        }
    }
}

/// Validated in-memory identity graph.
///
/// Nodes live in an id-indexed map, edges in an ordered list. Every public
/// mutation preserves the invariants: unique node and edge ids, both edge
/// endpoints present, no self-loops.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: BTreeMap<String, Node>,
    edges: Vec<Edge>,
    /// Bumped on every successful mutation; lets pointer input detect that
    /// the model changed underneath it.
    version: u64,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from a snapshot, validating every invariant before
    /// anything is stored. On failure the error lists all offending items.
    pub fn load(nodes: Vec<Node>, edges: Vec<Edge>) -> Result<Self, GraphError> {
        let mut violations = Vec::new();

        let mut node_ids: HashSet<&str> = HashSet::new();
        for node in &nodes {
            if !node_ids.insert(node.id.as_str()) {
                violations.push(Violation::DuplicateNodeId(node.id.clone()));
            }
        }

        let mut edge_ids: HashSet<&str> = HashSet::new();
        for edge in &edges {
            if !edge_ids.insert(edge.id.as_str()) {
                violations.push(Violation::DuplicateEdgeId(edge.id.clone()));
            }
            if edge.from == edge.to {
                violations.push(Violation::SelfLoop {
                    edge_id: edge.id.clone(),
                });
            }
            for endpoint in [&edge.from, &edge.to] {
                if !node_ids.contains(endpoint.as_str()) {
                    violations.push(Violation::MissingEndpoint {
                        edge_id: edge.id.clone(),
                        node_id: endpoint.clone(),
                    });
                }
            }
        }

        if !violations.is_empty() {
            return Err(GraphError::Validation(violations));
        }

        let mut graph = Graph::new();
        for node in nodes {
            graph.nodes.insert(node.id.clone(), node);
        }
        for edge in edges {
            let edge = Edge {
                intensity: edge.intensity.clamp(0.0, 1.0),
                ..edge
            };
            graph.edges.push(edge);
        }
        Ok(graph)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|edge| edge.id == id)
    }

    /// Node ids in stable sorted order. Insertion order carries no meaning,
    /// so everything order-sensitive (layout seeding, cycle scans) goes
    /// through this.
    pub fn sorted_node_ids(&self) -> Vec<&str> {
        self.nodes.keys().map(String::as_str).collect()
    }

    /// Edges incident to a node, in either direction.
    pub fn neighbors<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Edge> {
        self.edges
            .iter()
            .filter(move |edge| edge.from == node_id || edge.to == node_id)
    }

    pub fn add_node(&mut self, node: Node) -> Result<(), GraphError> {
        if self.nodes.contains_key(&node.id) {
            return Err(GraphError::Validation(vec![Violation::DuplicateNodeId(
                node.id,
            )]));
        }
        self.nodes.insert(node.id.clone(), node);
        self.version += 1;
        Ok(())
    }

    pub fn add_edge(&mut self, edge: Edge) -> Result<(), GraphError> {
        let mut violations = Vec::new();
        if self.edges.iter().any(|existing| existing.id == edge.id) {
            violations.push(Violation::DuplicateEdgeId(edge.id.clone()));
        }
        if edge.from == edge.to {
            violations.push(Violation::SelfLoop {
                edge_id: edge.id.clone(),
            });
        }
        for endpoint in [&edge.from, &edge.to] {
            if !self.nodes.contains_key(endpoint) {
                violations.push(Violation::MissingEndpoint {
                    edge_id: edge.id.clone(),
                    node_id: endpoint.clone(),
                });
            }
        }
        if !violations.is_empty() {
            return Err(GraphError::Validation(violations));
        }
        self.edges.push(Edge {
            intensity: edge.intensity.clamp(0.0, 1.0),
            ..edge
        });
        self.version += 1;
        Ok(())
    }

    /// Removes a node and every edge touching it, so no dangling edge can
    /// survive a mutation.
    pub fn remove_node(&mut self, node_id: &str) -> Option<Node> {
        let node = self.nodes.remove(node_id)?;
        self.edges
            .retain(|edge| edge.from != node_id && edge.to != node_id);
        self.version += 1;
        Some(node)
    }

    pub fn remove_edge(&mut self, edge_id: &str) -> Option<Edge> {
        let index = self.edges.iter().position(|edge| edge.id == edge_id)?;
        let edge = self.edges.remove(index);
        self.version += 1;
        Some(edge)
    }
}

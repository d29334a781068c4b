use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::graph::{EdgeKind, NodeKind};

static IDENTITY_NODE_FILLS: Lazy<Vec<(NodeKind, &'static str)>> = Lazy::new(|| {
    vec![
        (NodeKind::Thought, "#AFC8FF"),
        (NodeKind::Belief, "#9370DB"),
        (NodeKind::Emotion, "#FF9AA2"),
        (NodeKind::Action, "#7FD1AE"),
        (NodeKind::Experience, "#FFD97D"),
        (NodeKind::Consequence, "#C9ADA7"),
    ]
});

static IDENTITY_EDGE_STROKES: Lazy<Vec<(EdgeKind, &'static str)>> = Lazy::new(|| {
    vec![
        (EdgeKind::Reinforces, "#4C9F70"),
        (EdgeKind::Contradicts, "#D64550"),
        (EdgeKind::Undermines, "#C8772E"),
        (EdgeKind::LeadsTo, "#4A6FA5"),
        (EdgeKind::CoOccursWith, "#8A8FA3"),
    ]
});

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub background: String,
    pub node_stroke: String,
    pub label_color: String,
    pub selection_ring: String,
    pub node_fills: Vec<(NodeKind, String)>,
    pub edge_strokes: Vec<(EdgeKind, String)>,
}

impl Theme {
    pub fn identity_default() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            background: "#FFFFFF".to_string(),
            node_stroke: "#333333".to_string(),
            label_color: "#1C2430".to_string(),
            selection_ring: "#2B6CB0".to_string(),
            node_fills: IDENTITY_NODE_FILLS
                .iter()
                .map(|(kind, color)| (*kind, color.to_string()))
                .collect(),
            edge_strokes: IDENTITY_EDGE_STROKES
                .iter()
                .map(|(kind, color)| (*kind, color.to_string()))
                .collect(),
        }
    }

    pub fn dark() -> Self {
        Self {
            background: "#14161C".to_string(),
            node_stroke: "#D5D9E2".to_string(),
            label_color: "#E8EAF0".to_string(),
            selection_ring: "#63B3ED".to_string(),
            ..Self::identity_default()
        }
    }

    pub fn node_fill(&self, kind: NodeKind) -> &str {
        self.node_fills
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, color)| color.as_str())
            .unwrap_or("#CCCCCC")
    }

    pub fn edge_stroke(&self, kind: EdgeKind) -> &str {
        self.edge_strokes
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, color)| color.as_str())
            .unwrap_or("#999999")
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::identity_default()
    }
}

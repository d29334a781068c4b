use std::collections::HashSet;
use std::path::Path;

use anyhow::Result;

use crate::config::RenderConfig;
use crate::graph::{Graph, Vec2};
use crate::paradox::ParadoxCycle;
use crate::theme::Theme;
use crate::viewport::Viewport;

/// Backend-agnostic draw primitive, screen space. The SVG adapter below is
/// one consumer; a canvas or GPU backend consumes the same list.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Line {
        from: Vec2,
        to: Vec2,
        color: String,
        width: f32,
        dash: Option<String>,
    },
    Circle {
        center: Vec2,
        radius: f32,
        fill: String,
        stroke: String,
        stroke_width: f32,
    },
    Ring {
        center: Vec2,
        radius: f32,
        color: String,
        width: f32,
    },
    Text {
        at: Vec2,
        content: String,
        color: String,
        size: f32,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub node_id: Option<String>,
    pub edge_id: Option<String>,
}

/// Pure draw pass: full redraw of the current model/viewport, no state
/// carried between frames. Edges come first so nodes are never occluded,
/// then node circles, then selection rings, then labels.
pub fn render(
    graph: &Graph,
    viewport: &Viewport,
    paradoxes: &[ParadoxCycle],
    selection: &Selection,
    theme: &Theme,
    config: &RenderConfig,
) -> Vec<DrawCommand> {
    let mut commands = Vec::new();
    let zoom = viewport.zoom();
    let paradox_edges: HashSet<&str> = paradoxes
        .iter()
        .flat_map(|cycle| cycle.edge_ids.iter().map(String::as_str))
        .collect();

    for edge in graph.edges() {
        let (Some(from), Some(to)) = (graph.node(&edge.from), graph.node(&edge.to)) else {
            continue;
        };
        let mut width =
            (config.edge_base_width + config.edge_intensity_width * edge.intensity) * zoom;
        if selection.edge_id.as_deref() == Some(edge.id.as_str()) {
            width += 1.5 * zoom;
        }
        let dash = if paradox_edges.contains(edge.id.as_str()) {
            Some(config.paradox_dasharray.clone())
        } else {
            None
        };
        commands.push(DrawCommand::Line {
            from: viewport.world_to_screen(from.position),
            to: viewport.world_to_screen(to.position),
            color: theme.edge_stroke(edge.kind).to_string(),
            width,
            dash,
        });
    }

    for node in graph.nodes() {
        commands.push(DrawCommand::Circle {
            center: viewport.world_to_screen(node.position),
            radius: config.node_radius * zoom,
            fill: theme.node_fill(node.kind).to_string(),
            stroke: theme.node_stroke.clone(),
            stroke_width: 1.4 * zoom,
        });
    }

    if let Some(selected) = selection.node_id.as_deref()
        && let Some(node) = graph.node(selected)
    {
        commands.push(DrawCommand::Ring {
            center: viewport.world_to_screen(node.position),
            radius: (config.node_radius + config.selection_ring_offset) * zoom,
            color: theme.selection_ring.clone(),
            width: config.selection_ring_width * zoom,
        });
    }

    for node in graph.nodes() {
        let screen = viewport.world_to_screen(node.position);
        commands.push(DrawCommand::Text {
            at: Vec2::new(
                screen.x,
                screen.y + (config.node_radius + config.label_offset) * zoom,
            ),
            content: truncate_label(&node.label, config.label_char_budget),
            color: theme.label_color.clone(),
            size: theme.font_size * zoom,
        });
    }

    commands
}

fn truncate_label(label: &str, budget: usize) -> String {
    if label.chars().count() <= budget {
        return label.to_string();
    }
    let mut out: String = label.chars().take(budget.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Serializes a frame's draw commands as a standalone SVG document. This is
/// the only place that knows about SVG; the pure pass above stays
/// backend-free.
pub fn render_svg(commands: &[DrawCommand], theme: &Theme, width: f32, height: f32) -> String {
    let mut svg = String::new();
    let width = width.max(1.0);
    let height = height.max(1.0);

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));

    for command in commands {
        match command {
            DrawCommand::Line {
                from,
                to,
                color,
                width,
                dash,
            } => {
                let dash_attr = dash
                    .as_ref()
                    .map(|d| format!(" stroke-dasharray=\"{d}\""))
                    .unwrap_or_default();
                svg.push_str(&format!(
                    "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"{:.2}\"{}/>",
                    from.x, from.y, to.x, to.y, color, width, dash_attr
                ));
            }
            DrawCommand::Circle {
                center,
                radius,
                fill,
                stroke,
                stroke_width,
            } => {
                svg.push_str(&format!(
                    "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{:.2}\"/>",
                    center.x, center.y, radius, fill, stroke, stroke_width
                ));
            }
            DrawCommand::Ring {
                center,
                radius,
                color,
                width,
            } => {
                svg.push_str(&format!(
                    "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{:.2}\"/>",
                    center.x, center.y, radius, color, width
                ));
            }
            DrawCommand::Text {
                at,
                content,
                color,
                size,
            } => {
                svg.push_str(&format!(
                    "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" dominant-baseline=\"hanging\" font-family=\"{}\" font-size=\"{:.2}\" fill=\"{}\">{}</text>",
                    at.x,
                    at.y,
                    theme.font_family,
                    size,
                    color,
                    escape_xml(content)
                ));
            }
        }
    }

    svg.push_str("</svg>");
    svg
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParadoxConfig;
    use crate::graph::{Edge, EdgeKind, Node, NodeKind};
    use crate::paradox::detect_paradoxes;

    fn sample_graph() -> Graph {
        let mut a = Node::new("A", "a very long label that overflows", NodeKind::Belief);
        a.position = Vec2::new(0.0, 0.0);
        let mut b = Node::new("B", "b", NodeKind::Emotion);
        b.position = Vec2::new(100.0, 0.0);
        let mut c = Node::new("C", "c", NodeKind::Action);
        c.position = Vec2::new(50.0, 80.0);
        Graph::load(
            vec![a, b, c],
            vec![
                Edge::new("e1", "A", "B", EdgeKind::Reinforces).with_intensity(1.0),
                Edge::new("e2", "B", "C", EdgeKind::Reinforces),
                Edge::new("e3", "C", "A", EdgeKind::Contradicts),
            ],
        )
        .unwrap()
    }

    #[test]
    fn edges_precede_nodes_in_draw_order() {
        let graph = sample_graph();
        let commands = render(
            &graph,
            &Viewport::default(),
            &[],
            &Selection::default(),
            &Theme::identity_default(),
            &RenderConfig::default(),
        );
        let first_circle = commands
            .iter()
            .position(|c| matches!(c, DrawCommand::Circle { .. }))
            .unwrap();
        let last_line = commands
            .iter()
            .rposition(|c| matches!(c, DrawCommand::Line { .. }))
            .unwrap();
        assert!(last_line < first_circle);
    }

    #[test]
    fn paradox_edges_are_dashed() {
        let graph = sample_graph();
        let paradoxes = detect_paradoxes(&graph, &ParadoxConfig::default());
        assert!(!paradoxes.is_empty());
        let commands = render(
            &graph,
            &Viewport::default(),
            &paradoxes,
            &Selection::default(),
            &Theme::identity_default(),
            &RenderConfig::default(),
        );
        let dashed = commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { dash: Some(_), .. }))
            .count();
        assert_eq!(dashed, 3);
    }

    #[test]
    fn selected_node_gets_a_ring() {
        let graph = sample_graph();
        let selection = Selection {
            node_id: Some("B".into()),
            edge_id: None,
        };
        let commands = render(
            &graph,
            &Viewport::default(),
            &[],
            &selection,
            &Theme::identity_default(),
            &RenderConfig::default(),
        );
        assert!(
            commands
                .iter()
                .any(|c| matches!(c, DrawCommand::Ring { .. }))
        );
    }

    #[test]
    fn labels_are_truncated_to_budget() {
        assert_eq!(truncate_label("short", 18), "short");
        let cut = truncate_label("a very long label that overflows", 18);
        assert_eq!(cut.chars().count(), 18);
        assert!(cut.ends_with('…'));
    }

    #[test]
    fn svg_adapter_emits_document() {
        let graph = sample_graph();
        let theme = Theme::identity_default();
        let commands = render(
            &graph,
            &Viewport::default(),
            &[],
            &Selection::default(),
            &theme,
            &RenderConfig::default(),
        );
        let svg = render_svg(&commands, &theme, 800.0, 600.0);
        assert!(svg.contains("<svg"));
        assert!(svg.contains("</svg>"));
        assert!(svg.contains("<circle"));
    }
}

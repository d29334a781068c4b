use crate::config::InteractionConfig;
use crate::graph::{Graph, Vec2};
use crate::viewport::Viewport;

/// Pointer input, already normalized to screen coordinates by the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// `version` is the graph version the event was produced against; a
    /// stale version downgrades the press to a miss.
    Down { at: Vec2, version: u64 },
    Move { at: Vec2 },
    Up { at: Vec2 },
    /// Pointer left the window or capture was revoked.
    CaptureLost,
}

/// Events surfaced to the embedding UI. Creation intents only delegate;
/// the actual creation flow lives outside the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    SelectNode(String),
    SelectEdge(String),
    Deselect,
    RequestAddNode,
    RequestAddEdge,
}

#[derive(Debug, Clone, PartialEq)]
enum State {
    Idle,
    Panning {
        last: Vec2,
        press: Vec2,
        /// Edge under the press, selected on release if no pan happened.
        pending_edge: Option<String>,
    },
    Dragging {
        node_id: String,
        press: Vec2,
        /// True once travel exceeded the drag threshold.
        engaged: bool,
        was_pinned: bool,
    },
    NodeSelected {
        node_id: String,
    },
}

/// Explicit finite-state machine turning pointer events into selection,
/// pan and drag actions. All state lives here; transitions happen only in
/// `handle`, never through captured closures.
#[derive(Debug, Clone)]
pub struct InteractionHandler {
    state: State,
    config: InteractionConfig,
}

impl InteractionHandler {
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            state: State::Idle,
            config,
        }
    }

    pub fn selected_node(&self) -> Option<&str> {
        match &self.state {
            State::NodeSelected { node_id } | State::Dragging { node_id, .. } => Some(node_id),
            _ => None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, State::Dragging { engaged: true, .. })
    }

    pub fn handle(
        &mut self,
        event: PointerEvent,
        graph: &mut Graph,
        viewport: &mut Viewport,
    ) -> Vec<UiEvent> {
        let mut events = Vec::new();
        match event {
            PointerEvent::Down { at, version } => self.on_down(at, version, graph, viewport, &mut events),
            PointerEvent::Move { at } => self.on_move(at, graph, viewport, &mut events),
            PointerEvent::Up { at } => self.on_up(at, graph, &mut events),
            PointerEvent::CaptureLost => self.on_capture_lost(),
        }
        events
    }

    fn on_down(
        &mut self,
        at: Vec2,
        version: u64,
        graph: &mut Graph,
        viewport: &Viewport,
        events: &mut Vec<UiEvent>,
    ) {
        // A press generated against an older model may point at removed
        // entities; treat it as a miss rather than resolving dangling ids.
        let stale = version != graph.version();
        let hit = if stale {
            None
        } else {
            hit_test_node(graph, viewport, at, &self.config, self.selected_node())
        };

        match hit {
            Some(node_id) => {
                let was_pinned = graph.node(&node_id).map(|n| n.pinned).unwrap_or(false);
                if let Some(node) = graph.node_mut(&node_id) {
                    node.pinned = true;
                    node.velocity = Vec2::ZERO;
                }
                self.state = State::Dragging {
                    node_id,
                    press: at,
                    engaged: false,
                    was_pinned,
                };
            }
            None => {
                if matches!(self.state, State::NodeSelected { .. }) || stale {
                    events.push(UiEvent::Deselect);
                }
                let pending_edge = if stale {
                    None
                } else {
                    hit_test_edge(graph, viewport, at, &self.config)
                };
                self.state = State::Panning {
                    last: at,
                    press: at,
                    pending_edge,
                };
            }
        }
    }

    fn on_move(
        &mut self,
        at: Vec2,
        graph: &mut Graph,
        viewport: &mut Viewport,
        events: &mut Vec<UiEvent>,
    ) {
        match &mut self.state {
            State::Panning { last, .. } => {
                viewport.pan_by(at - *last);
                *last = at;
            }
            State::Dragging {
                node_id,
                press,
                engaged,
                ..
            } => {
                if graph.node(node_id.as_str()).is_none() {
                    // Node removed mid-drag: drop the gesture.
                    events.push(UiEvent::Deselect);
                    self.state = State::Idle;
                    return;
                }
                if !*engaged && (at - *press).length() >= self.config.drag_threshold {
                    *engaged = true;
                }
                if *engaged {
                    let world = viewport.screen_to_world(at);
                    let id = node_id.clone();
                    if let Some(node) = graph.node_mut(&id) {
                        node.position = world;
                        node.velocity = Vec2::ZERO;
                    }
                }
            }
            State::Idle | State::NodeSelected { .. } => {}
        }
    }

    fn on_up(&mut self, at: Vec2, graph: &mut Graph, events: &mut Vec<UiEvent>) {
        match std::mem::replace(&mut self.state, State::Idle) {
            State::Panning {
                press, pending_edge, ..
            } => {
                if let Some(edge_id) = pending_edge
                    && (at - press).length() < self.config.drag_threshold
                    && graph.edge(&edge_id).is_some()
                {
                    events.push(UiEvent::SelectEdge(edge_id));
                }
                self.state = State::Idle;
            }
            State::Dragging {
                node_id,
                engaged,
                was_pinned,
                ..
            } => {
                if graph.node(&node_id).is_none() {
                    events.push(UiEvent::Deselect);
                    self.state = State::Idle;
                    return;
                }
                if !engaged && !was_pinned {
                    // Plain click: the press-time pin was provisional.
                    if let Some(node) = graph.node_mut(&node_id) {
                        node.pinned = false;
                    }
                }
                events.push(UiEvent::SelectNode(node_id.clone()));
                self.state = State::NodeSelected { node_id };
            }
            other => self.state = other,
        }
    }

    fn on_capture_lost(&mut self) {
        self.state = match std::mem::replace(&mut self.state, State::Idle) {
            State::Panning { .. } => State::Idle,
            // A drag in flight settles on the node as selected; the pin it
            // acquired at press time stays until the caller unpins.
            State::Dragging { node_id, .. } => State::NodeSelected { node_id },
            other => other,
        };
    }
}

/// Finds the node under a screen point: closest node whose world distance
/// is within its hit radius. The currently selected node gets the larger
/// radius. Exact ties resolve to the smallest id, which is the iteration
/// order of the node map.
pub fn hit_test_node(
    graph: &Graph,
    viewport: &Viewport,
    screen: Vec2,
    config: &InteractionConfig,
    selected: Option<&str>,
) -> Option<String> {
    let world = viewport.screen_to_world(screen);
    let mut best: Option<(f32, &str)> = None;
    for node in graph.nodes() {
        let radius = if selected == Some(node.id.as_str()) {
            config.selected_hit_radius
        } else {
            config.hit_radius
        };
        let distance = (node.position - world).length();
        if distance <= radius && best.map(|(d, _)| distance < d).unwrap_or(true) {
            best = Some((distance, &node.id));
        }
    }
    best.map(|(_, id)| id.to_string())
}

/// Finds the edge under a screen point: closest segment within the hit
/// tolerance band. Node hits take precedence at the call site.
pub fn hit_test_edge(
    graph: &Graph,
    viewport: &Viewport,
    screen: Vec2,
    config: &InteractionConfig,
) -> Option<String> {
    let world = viewport.screen_to_world(screen);
    let mut best: Option<(f32, &str)> = None;
    for edge in graph.edges() {
        let (Some(from), Some(to)) = (graph.node(&edge.from), graph.node(&edge.to)) else {
            continue;
        };
        let distance = point_segment_distance(world, from.position, to.position);
        if distance <= config.edge_hit_tolerance && best.map(|(d, _)| distance < d).unwrap_or(true)
        {
            best = Some((distance, &edge.id));
        }
    }
    best.map(|(_, id)| id.to_string())
}

fn point_segment_distance(point: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.x * ab.x + ab.y * ab.y;
    if len_sq <= f32::EPSILON {
        return (point - a).length();
    }
    let t = ((point.x - a.x) * ab.x + (point.y - a.y) * ab.y) / len_sq;
    let t = t.clamp(0.0, 1.0);
    (point - (a + ab.scale(t))).length()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, EdgeKind, Node, NodeKind};

    fn graph_with_node_at(id: &str, position: Vec2) -> Graph {
        let mut node = Node::new(id, "label", NodeKind::Thought);
        node.position = position;
        Graph::load(vec![node], vec![]).unwrap()
    }

    fn down(graph: &Graph, at: Vec2) -> PointerEvent {
        PointerEvent::Down {
            at,
            version: graph.version(),
        }
    }

    #[test]
    fn click_on_node_selects_without_pinning() {
        let mut graph = graph_with_node_at("A", Vec2::new(100.0, 100.0));
        let mut viewport = Viewport::default();
        let mut handler = InteractionHandler::new(InteractionConfig::default());

        let at = viewport.world_to_screen(Vec2::new(102.0, 99.0));
        handler.handle(down(&graph, at), &mut graph, &mut viewport);
        let events = handler.handle(PointerEvent::Up { at }, &mut graph, &mut viewport);
        assert_eq!(events, vec![UiEvent::SelectNode("A".into())]);
        assert_eq!(handler.selected_node(), Some("A"));
        assert!(!graph.node("A").unwrap().pinned);
    }

    #[test]
    fn drag_moves_and_leaves_node_pinned() {
        let mut graph = graph_with_node_at("A", Vec2::new(0.0, 0.0));
        let mut viewport = Viewport::default();
        let mut handler = InteractionHandler::new(InteractionConfig::default());

        handler.handle(down(&graph, Vec2::ZERO), &mut graph, &mut viewport);
        handler.handle(
            PointerEvent::Move {
                at: Vec2::new(60.0, 0.0),
            },
            &mut graph,
            &mut viewport,
        );
        assert!(handler.is_dragging());
        let events = handler.handle(
            PointerEvent::Up {
                at: Vec2::new(60.0, 0.0),
            },
            &mut graph,
            &mut viewport,
        );
        assert_eq!(events, vec![UiEvent::SelectNode("A".into())]);
        let node = graph.node("A").unwrap();
        assert!(node.pinned);
        assert!((node.position - viewport.screen_to_world(Vec2::new(60.0, 0.0))).length() < 1e-4);
    }

    #[test]
    fn empty_canvas_drag_pans() {
        let mut graph = graph_with_node_at("A", Vec2::new(500.0, 500.0));
        let mut viewport = Viewport::default();
        let mut handler = InteractionHandler::new(InteractionConfig::default());

        handler.handle(down(&graph, Vec2::ZERO), &mut graph, &mut viewport);
        handler.handle(
            PointerEvent::Move {
                at: Vec2::new(25.0, -10.0),
            },
            &mut graph,
            &mut viewport,
        );
        handler.handle(
            PointerEvent::Up {
                at: Vec2::new(25.0, -10.0),
            },
            &mut graph,
            &mut viewport,
        );
        assert_eq!(viewport.pan(), Vec2::new(25.0, -10.0));
        assert_eq!(handler.selected_node(), None);
    }

    #[test]
    fn down_on_empty_canvas_deselects() {
        let mut graph = graph_with_node_at("A", Vec2::ZERO);
        let mut viewport = Viewport::default();
        let mut handler = InteractionHandler::new(InteractionConfig::default());

        handler.handle(down(&graph, Vec2::ZERO), &mut graph, &mut viewport);
        handler.handle(PointerEvent::Up { at: Vec2::ZERO }, &mut graph, &mut viewport);
        let far = Vec2::new(900.0, 900.0);
        let events = handler.handle(down(&graph, far), &mut graph, &mut viewport);
        assert_eq!(events, vec![UiEvent::Deselect]);
        assert_eq!(handler.selected_node(), None);
    }

    #[test]
    fn capture_lost_mid_drag_settles_on_selection() {
        let mut graph = graph_with_node_at("A", Vec2::ZERO);
        let mut viewport = Viewport::default();
        let mut handler = InteractionHandler::new(InteractionConfig::default());

        handler.handle(down(&graph, Vec2::ZERO), &mut graph, &mut viewport);
        handler.handle(
            PointerEvent::Move {
                at: Vec2::new(30.0, 30.0),
            },
            &mut graph,
            &mut viewport,
        );
        handler.handle(PointerEvent::CaptureLost, &mut graph, &mut viewport);
        assert!(!handler.is_dragging());
        assert_eq!(handler.selected_node(), Some("A"));
        // A later move must not keep dragging the node.
        let before = graph.node("A").unwrap().position;
        handler.handle(
            PointerEvent::Move {
                at: Vec2::new(200.0, 200.0),
            },
            &mut graph,
            &mut viewport,
        );
        assert_eq!(graph.node("A").unwrap().position, before);
    }

    #[test]
    fn stale_version_degrades_to_miss() {
        let mut graph = graph_with_node_at("A", Vec2::ZERO);
        let mut viewport = Viewport::default();
        let mut handler = InteractionHandler::new(InteractionConfig::default());

        let stale = PointerEvent::Down {
            at: Vec2::ZERO,
            version: graph.version() + 1,
        };
        let events = handler.handle(stale, &mut graph, &mut viewport);
        assert_eq!(events, vec![UiEvent::Deselect]);
        assert_eq!(handler.selected_node(), None);
    }

    #[test]
    fn node_removed_mid_drag_is_dropped() {
        let mut graph = graph_with_node_at("A", Vec2::ZERO);
        let mut viewport = Viewport::default();
        let mut handler = InteractionHandler::new(InteractionConfig::default());

        handler.handle(down(&graph, Vec2::ZERO), &mut graph, &mut viewport);
        graph.remove_node("A");
        let events = handler.handle(
            PointerEvent::Move {
                at: Vec2::new(50.0, 50.0),
            },
            &mut graph,
            &mut viewport,
        );
        assert_eq!(events, vec![UiEvent::Deselect]);
        assert_eq!(handler.selected_node(), None);
    }

    #[test]
    fn nearest_node_wins_hit_test() {
        let mut near = Node::new("near", "n", NodeKind::Belief);
        near.position = Vec2::new(10.0, 0.0);
        let mut far = Node::new("far", "f", NodeKind::Belief);
        far.position = Vec2::new(18.0, 0.0);
        let graph = Graph::load(vec![near, far], vec![]).unwrap();
        let viewport = Viewport::default();
        let hit = hit_test_node(
            &graph,
            &viewport,
            Vec2::new(12.0, 0.0),
            &InteractionConfig::default(),
            None,
        );
        assert_eq!(hit.as_deref(), Some("near"));
    }

    #[test]
    fn click_near_edge_selects_it() {
        let mut a = Node::new("A", "a", NodeKind::Thought);
        a.position = Vec2::new(0.0, 0.0);
        let mut b = Node::new("B", "b", NodeKind::Thought);
        b.position = Vec2::new(200.0, 0.0);
        let mut graph = Graph::load(
            vec![a, b],
            vec![Edge::new("e1", "A", "B", EdgeKind::LeadsTo)],
        )
        .unwrap();
        let mut viewport = Viewport::default();
        let mut handler = InteractionHandler::new(InteractionConfig::default());

        // Mid-segment, 3 units off the line: outside both node radii.
        let at = viewport.world_to_screen(Vec2::new(100.0, 3.0));
        handler.handle(down(&graph, at), &mut graph, &mut viewport);
        let events = handler.handle(PointerEvent::Up { at }, &mut graph, &mut viewport);
        assert_eq!(events, vec![UiEvent::SelectEdge("e1".into())]);
    }
}

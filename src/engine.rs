use crate::config::EngineConfig;
use crate::graph::{Edge, Graph, GraphError, Node, Vec2};
use crate::interaction::{InteractionHandler, PointerEvent, UiEvent};
use crate::layout::{LayoutEngine, LayoutWarning};
use crate::paradox::{detect_paradoxes, ParadoxCycle};
use crate::render::{render, DrawCommand, Selection};
use crate::snapshot::Snapshot;
use crate::theme::Theme;
use crate::viewport::Viewport;

/// Single-threaded, frame-driven facade over the whole engine.
///
/// Each `tick` runs at most one budgeted layout step followed by one pure
/// render pass. Pan/zoom and layout stepping are independent; paradox
/// detection runs only on mutation and is cached in between. All I/O is
/// the caller's job.
pub struct Engine {
    graph: Graph,
    layout: LayoutEngine,
    viewport: Viewport,
    handler: InteractionHandler,
    selection: Selection,
    paradoxes: Vec<ParadoxCycle>,
    paused: bool,
    config: EngineConfig,
    theme: Theme,
}

impl Engine {
    pub fn new(graph: Graph, config: EngineConfig, theme: Theme, seed: u64) -> Self {
        let mut engine = Self {
            layout: LayoutEngine::new(config.layout.clone(), seed),
            viewport: Viewport::new(&config.viewport),
            handler: InteractionHandler::new(config.interaction.clone()),
            selection: Selection::default(),
            paradoxes: Vec::new(),
            paused: false,
            config,
            theme,
            graph,
        };
        engine.layout.seed_positions(&mut engine.graph);
        engine.paradoxes = detect_paradoxes(&engine.graph, &engine.config.paradox);
        engine
    }

    /// Restores a persisted session. When the snapshot carries a full set
    /// of node positions the stored layout is resumed as-is instead of
    /// being reseeded and re-simulated.
    pub fn from_snapshot(
        snapshot: Snapshot,
        config: EngineConfig,
        theme: Theme,
        seed: u64,
    ) -> Result<Self, GraphError> {
        let resume_layout = snapshot.has_full_layout();
        let persisted_viewport = snapshot.viewport;
        let graph = snapshot.into_graph()?;

        let mut engine = Self {
            layout: LayoutEngine::new(config.layout.clone(), seed),
            viewport: Viewport::new(&config.viewport),
            handler: InteractionHandler::new(config.interaction.clone()),
            selection: Selection::default(),
            paradoxes: Vec::new(),
            paused: false,
            config,
            theme,
            graph,
        };
        if resume_layout {
            engine.layout.adopt_positions(&engine.graph);
        } else {
            engine.layout.seed_positions(&mut engine.graph);
        }
        engine.paradoxes = detect_paradoxes(&engine.graph, &engine.config.paradox);
        if let Some(persisted) = persisted_viewport {
            engine.viewport =
                Viewport::restore(&engine.config.viewport, persisted.zoom, persisted.pan);
        }
        Ok(engine)
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn paradoxes(&self) -> &[ParadoxCycle] {
        &self.paradoxes
    }

    pub fn is_layout_paused(&self) -> bool {
        self.paused
    }

    pub fn pause_layout(&mut self) {
        self.paused = true;
    }

    pub fn resume_layout(&mut self) {
        self.paused = false;
    }

    /// One animation-frame tick: at most one layout step (skipped while
    /// paused or converged), then a full redraw. A dragged node is pinned,
    /// so the step never fights the pointer.
    pub fn tick(&mut self) -> Vec<DrawCommand> {
        if !self.paused && !self.layout.is_converged() {
            self.layout.step(&mut self.graph);
        }
        render(
            &self.graph,
            &self.viewport,
            &self.paradoxes,
            &self.selection,
            &self.theme,
            &self.config.render,
        )
    }

    /// Feeds one pointer event through the interaction state machine and
    /// folds the resulting selection changes back into engine state. The
    /// returned events are for the embedding UI.
    pub fn pointer(&mut self, event: PointerEvent) -> Vec<UiEvent> {
        let events = self
            .handler
            .handle(event, &mut self.graph, &mut self.viewport);
        for event in &events {
            match event {
                UiEvent::SelectNode(id) => {
                    self.selection.node_id = Some(id.clone());
                    self.selection.edge_id = None;
                }
                UiEvent::SelectEdge(id) => {
                    self.selection.edge_id = Some(id.clone());
                    self.selection.node_id = None;
                }
                UiEvent::Deselect => self.selection = Selection::default(),
                UiEvent::RequestAddNode | UiEvent::RequestAddEdge => {}
            }
        }
        events
    }

    /// Convenience for callers that do not track model versions themselves.
    pub fn pointer_down(&mut self, at: Vec2) -> Vec<UiEvent> {
        let version = self.graph.version();
        self.pointer(PointerEvent::Down { at, version })
    }

    pub fn zoom_at(&mut self, anchor: Vec2, factor: f32) {
        self.viewport.zoom_at(anchor, factor);
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.viewport.pan_by(delta);
    }

    /// Delegated creation intents; the creation UI itself is external.
    pub fn request_add_node(&self) -> UiEvent {
        UiEvent::RequestAddNode
    }

    pub fn request_add_edge(&self) -> UiEvent {
        UiEvent::RequestAddEdge
    }

    pub fn add_node(&mut self, node: Node) -> Result<(), GraphError> {
        let id = node.id.clone();
        self.graph.add_node(node)?;
        self.layout.register_node(&mut self.graph, &id);
        self.invalidate_paradoxes();
        Ok(())
    }

    pub fn add_edge(&mut self, edge: Edge) -> Result<(), GraphError> {
        self.graph.add_edge(edge)?;
        self.layout.reheat();
        self.invalidate_paradoxes();
        Ok(())
    }

    pub fn remove_node(&mut self, node_id: &str) -> Option<Node> {
        let removed = self.graph.remove_node(node_id)?;
        self.layout.forget_node(node_id);
        if self.selection.node_id.as_deref() == Some(node_id) {
            self.selection.node_id = None;
        }
        self.selection.edge_id = self
            .selection
            .edge_id
            .take()
            .filter(|edge_id| self.graph.edge(edge_id).is_some());
        self.invalidate_paradoxes();
        Some(removed)
    }

    pub fn remove_edge(&mut self, edge_id: &str) -> Option<Edge> {
        let removed = self.graph.remove_edge(edge_id)?;
        if self.selection.edge_id.as_deref() == Some(edge_id) {
            self.selection.edge_id = None;
        }
        self.layout.reheat();
        self.invalidate_paradoxes();
        Some(removed)
    }

    /// Replaces the whole graph, e.g. when the external store re-supplies
    /// a fresh snapshot after out-of-band edits.
    pub fn replace_graph(&mut self, graph: Graph) {
        self.graph = graph;
        self.selection = Selection::default();
        self.layout.seed_positions(&mut self.graph);
        self.invalidate_paradoxes();
    }

    /// Releases a node from drag-pinning so the simulation owns it again.
    pub fn unpin(&mut self, node_id: &str) {
        if let Some(node) = self.graph.node_mut(node_id) {
            node.pinned = false;
            node.velocity = Vec2::ZERO;
        }
        self.layout.reheat();
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.graph, &self.viewport)
    }

    pub fn drain_layout_warnings(&mut self) -> Vec<LayoutWarning> {
        self.layout.drain_warnings()
    }

    /// Runs the layout to convergence in one call. Headless path; the
    /// interactive path ticks instead.
    pub fn settle_layout(&mut self) -> u32 {
        self.layout.run_to_convergence(&mut self.graph)
    }

    fn invalidate_paradoxes(&mut self) {
        self.paradoxes = detect_paradoxes(&self.graph, &self.config.paradox);
    }
}

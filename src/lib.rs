#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod engine;
pub mod graph;
pub mod interaction;
pub mod layout;
pub mod paradox;
pub mod render;
pub mod snapshot;
pub mod theme;
pub mod viewport;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, EngineConfig, load_config};
pub use engine::Engine;
pub use graph::{Edge, EdgeKind, Graph, GraphError, Node, NodeKind, Vec2, Violation};
pub use interaction::{PointerEvent, UiEvent};
pub use layout::{LayoutEngine, LayoutWarning, StepOutcome};
pub use paradox::{ParadoxCycle, detect_paradoxes};
pub use render::{DrawCommand, Selection, render, render_svg};
pub use snapshot::{Snapshot, parse_snapshot};
pub use theme::Theme;
pub use viewport::Viewport;

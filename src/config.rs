use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Rest length of an edge spring, world units.
    pub ideal_edge_length: f32,
    /// Scales the pairwise k²/d repulsion term.
    pub repulsion_strength: f32,
    /// Scales the per-edge spring term before intensity is applied.
    pub spring_strength: f32,
    /// Velocity retained between steps.
    pub damping: f32,
    /// Starting displacement cap, world units per step.
    pub initial_temperature: f32,
    /// Multiplied into the temperature each step.
    pub cooling_factor: f32,
    /// Temperature never cools below this, so a resumed layout can still move.
    pub min_temperature: f32,
    /// Converged when the largest displacement in a step drops under this.
    pub convergence_epsilon: f32,
    pub max_iterations: u32,
    /// Radius of the seeding circle for a single node; grows with node count.
    pub seed_radius_per_node: f32,
    /// Maximum seeded perturbation away from the circle, world units.
    pub seed_jitter: f32,
    /// Upper bound on node count processed per tick before the step
    /// early-exits and resumes next frame.
    pub per_tick_node_budget: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            ideal_edge_length: 120.0,
            repulsion_strength: 0.8,
            spring_strength: 0.06,
            damping: 0.85,
            initial_temperature: 40.0,
            cooling_factor: 0.97,
            min_temperature: 0.5,
            convergence_epsilon: 0.05,
            max_iterations: 600,
            seed_radius_per_node: 26.0,
            seed_jitter: 18.0,
            per_tick_node_budget: 2048,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewportConfig {
    pub min_zoom: f32,
    pub max_zoom: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.5,
            max_zoom: 3.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionConfig {
    /// World-space radius inside which a pointer hits a node.
    pub hit_radius: f32,
    /// Hit radius while the node is the current selection.
    pub selected_hit_radius: f32,
    /// World-space half-width of the band around an edge segment that
    /// counts as an edge hit.
    pub edge_hit_tolerance: f32,
    /// Screen-space travel before a press becomes a drag.
    pub drag_threshold: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            hit_radius: 20.0,
            selected_hit_radius: 26.0,
            edge_hit_tolerance: 6.0,
            drag_threshold: 4.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub node_radius: f32,
    pub selection_ring_offset: f32,
    pub selection_ring_width: f32,
    /// Labels longer than this many characters are cut and suffixed with an
    /// ellipsis.
    pub label_char_budget: usize,
    /// Gap between the node circle and the label baseline.
    pub label_offset: f32,
    pub edge_base_width: f32,
    /// Added to the base width at intensity 1.0.
    pub edge_intensity_width: f32,
    pub paradox_dasharray: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            node_radius: 14.0,
            selection_ring_offset: 5.0,
            selection_ring_width: 2.5,
            label_char_budget: 18,
            label_offset: 10.0,
            edge_base_width: 1.0,
            edge_intensity_width: 3.0,
            paradox_dasharray: "6 4".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParadoxConfig {
    /// Simple cycles longer than this are not searched for; keeps the scan
    /// tractable on dense graphs.
    pub max_cycle_len: usize,
}

impl Default for ParadoxConfig {
    fn default() -> Self {
        Self { max_cycle_len: 8 }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    pub layout: LayoutConfig,
    pub viewport: ViewportConfig,
    pub interaction: InteractionConfig,
    pub render: RenderConfig,
    pub paradox: ParadoxConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub engine: EngineConfig,
    pub theme: Theme,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    layout: Option<LayoutConfig>,
    viewport: Option<ViewportConfig>,
    interaction: Option<InteractionConfig>,
    render: Option<RenderConfig>,
    paradox: Option<ParadoxConfig>,
}

/// Reads an optional JSON (or JSON5) config file over the defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = match serde_json::from_str(&contents) {
        Ok(parsed) => parsed,
        Err(_) => json5::from_str(&contents)?,
    };

    if let Some(theme_name) = parsed.theme.as_deref() {
        if theme_name == "dark" {
            config.theme = Theme::dark();
        } else if theme_name == "default" || theme_name == "identity" {
            config.theme = Theme::identity_default();
        }
    }
    if let Some(layout) = parsed.layout {
        config.engine.layout = layout;
    }
    if let Some(viewport) = parsed.viewport {
        config.engine.viewport = viewport;
    }
    if let Some(interaction) = parsed.interaction {
        config.engine.interaction = interaction;
    }
    if let Some(render) = parsed.render {
        config.engine.render = render;
    }
    if let Some(paradox) = parsed.paradox {
        config.engine.paradox = paradox;
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_zoom_bounds() {
        let config = ViewportConfig::default();
        assert_eq!(config.min_zoom, 0.5);
        assert_eq!(config.max_zoom, 3.0);
    }

    #[test]
    fn missing_path_yields_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.engine.paradox.max_cycle_len, 8);
    }
}

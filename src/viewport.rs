use serde::{Deserialize, Serialize};

use crate::config::ViewportConfig;
use crate::graph::Vec2;

/// Zoom/pan state mapping world coordinates to screen coordinates.
///
/// The transform is `screen = world * zoom + pan`; `screen_to_world` is its
/// exact inverse. Viewport state is transient and never touches node
/// positions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Viewport {
    zoom: f32,
    pan: Vec2,
    #[serde(skip, default)]
    bounds: ViewportBounds,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct ViewportBounds {
    min_zoom: f32,
    max_zoom: f32,
}

impl Default for ViewportBounds {
    fn default() -> Self {
        let config = ViewportConfig::default();
        Self {
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(&ViewportConfig::default())
    }
}

impl Viewport {
    pub fn new(config: &ViewportConfig) -> Self {
        Self {
            zoom: 1.0f32.clamp(config.min_zoom, config.max_zoom),
            pan: Vec2::ZERO,
            bounds: ViewportBounds {
                min_zoom: config.min_zoom,
                max_zoom: config.max_zoom,
            },
        }
    }

    /// Restores persisted zoom/pan, re-clamping against current bounds.
    pub fn restore(config: &ViewportConfig, zoom: f32, pan: Vec2) -> Self {
        let mut viewport = Self::new(config);
        viewport.zoom = zoom.clamp(config.min_zoom, config.max_zoom);
        viewport.pan = pan;
        viewport
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        world.scale(self.zoom) + self.pan
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        (screen - self.pan).scale(1.0 / self.zoom)
    }

    /// Scales zoom by `factor`, clamped to bounds, keeping the world point
    /// under `anchor` fixed on screen.
    pub fn zoom_at(&mut self, anchor: Vec2, factor: f32) {
        let world_anchor = self.screen_to_world(anchor);
        self.zoom = (self.zoom * factor).clamp(self.bounds.min_zoom, self.bounds.max_zoom);
        // pan = anchor - world_anchor * zoom puts the anchor back in place
        self.pan = anchor - world_anchor.scale(self.zoom);
    }

    /// Accumulates a screen-space drag delta.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }
}

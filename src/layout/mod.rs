mod force;

use std::collections::BTreeMap;

use crate::config::LayoutConfig;
use crate::graph::{Graph, Vec2};

pub use force::StepStats;

/// Warning recorded when the simulation had to intervene; also emitted
/// through `log::warn!`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutWarning {
    /// Position or velocity went NaN/infinite and the node was put back on
    /// its seed position.
    UnstableNodeReset { node_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A full iteration completed and movement is still above epsilon.
    Moved,
    /// The per-tick node budget ran out; the iteration resumes next tick.
    BudgetExhausted,
    /// Max displacement fell under epsilon, or the iteration cap was hit.
    Converged,
}

/// Iterative force-directed layout (Fruchterman–Reingold style) over the
/// graph's nodes. Owns only transient state: seed positions, temperature,
/// and the resume cursor for budgeted stepping. Node positions themselves
/// live on the graph.
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    config: LayoutConfig,
    seed: u64,
    seeds: BTreeMap<String, Vec2>,
    temperature: f32,
    iterations: u32,
    converged: bool,
    /// Index into the sorted node ids where the next budgeted window starts.
    cursor: usize,
    /// Largest displacement seen so far in the in-progress iteration.
    pending_max_displacement: f32,
    warnings: Vec<LayoutWarning>,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig, seed: u64) -> Self {
        let temperature = config.initial_temperature;
        Self {
            config,
            seed,
            seeds: BTreeMap::new(),
            temperature,
            iterations: 0,
            converged: false,
            cursor: 0,
            pending_max_displacement: 0.0,
            warnings: Vec::new(),
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn is_converged(&self) -> bool {
        self.converged
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Places every node on a circle ordered by sorted node id, with a
    /// deterministic seeded perturbation. Identical graph and seed always
    /// produce identical seed positions.
    pub fn seed_positions(&mut self, graph: &mut Graph) {
        self.seeds.clear();
        let ids: Vec<String> = graph
            .sorted_node_ids()
            .into_iter()
            .map(str::to_string)
            .collect();
        let count = ids.len().max(1) as f32;
        let radius = (count * self.config.seed_radius_per_node) / std::f32::consts::TAU;
        let radius = radius.max(self.config.seed_radius_per_node);

        for (index, id) in ids.iter().enumerate() {
            let angle = std::f32::consts::TAU * index as f32 / count;
            let jitter_x = self.jitter(id, 0);
            let jitter_y = self.jitter(id, 1);
            let position = Vec2::new(
                radius * angle.cos() + jitter_x,
                radius * angle.sin() + jitter_y,
            );
            self.seeds.insert(id.clone(), position);
            if let Some(node) = graph.node_mut(id) {
                if !node.pinned {
                    node.position = position;
                    node.velocity = Vec2::ZERO;
                }
            }
        }
        self.restart();
    }

    /// Adopts the graph's current positions as both seed and settled
    /// state; used when resuming a persisted layout across sessions.
    pub fn adopt_positions(&mut self, graph: &Graph) {
        self.seeds = graph
            .nodes()
            .map(|node| (node.id.clone(), node.position))
            .collect();
        self.cursor = 0;
        self.pending_max_displacement = 0.0;
        self.iterations = 0;
        self.temperature = self.config.min_temperature;
        self.converged = true;
    }

    /// Seeds one newly added node without disturbing the rest.
    pub fn register_node(&mut self, graph: &mut Graph, node_id: &str) {
        let position = Vec2::new(self.jitter(node_id, 0), self.jitter(node_id, 1));
        self.seeds.insert(node_id.to_string(), position);
        if let Some(node) = graph.node_mut(node_id) {
            node.position = position;
            node.velocity = Vec2::ZERO;
        }
        self.reheat();
    }

    pub fn forget_node(&mut self, node_id: &str) {
        self.seeds.remove(node_id);
        self.cursor = 0;
        self.pending_max_displacement = 0.0;
        self.reheat();
    }

    /// Wakes a settled layout after a mutation; seed positions are kept.
    pub fn reheat(&mut self) {
        self.converged = false;
        self.iterations = 0;
        self.temperature = self
            .config
            .initial_temperature
            .max(self.config.min_temperature);
    }

    fn restart(&mut self) {
        self.reheat();
        self.cursor = 0;
        self.pending_max_displacement = 0.0;
        self.temperature = self.config.initial_temperature;
    }

    /// Runs at most one budgeted window of the current iteration. An
    /// iteration completes when the window cursor wraps; only then does the
    /// temperature cool and convergence get evaluated.
    pub fn step(&mut self, graph: &mut Graph) -> StepOutcome {
        if self.converged || graph.node_count() == 0 {
            self.converged = true;
            return StepOutcome::Converged;
        }

        let stats = force::apply_forces(
            graph,
            &self.seeds,
            &self.config,
            self.temperature,
            self.cursor,
            &mut self.warnings,
        );
        self.pending_max_displacement = self.pending_max_displacement.max(stats.max_displacement);

        if !stats.iteration_complete {
            self.cursor = stats.next_cursor;
            return StepOutcome::BudgetExhausted;
        }

        self.cursor = 0;
        self.iterations += 1;
        let max_displacement = self.pending_max_displacement;
        self.pending_max_displacement = 0.0;
        self.temperature =
            (self.temperature * self.config.cooling_factor).max(self.config.min_temperature);

        if max_displacement < self.config.convergence_epsilon
            || self.iterations >= self.config.max_iterations
        {
            self.converged = true;
            return StepOutcome::Converged;
        }
        StepOutcome::Moved
    }

    /// Runs full iterations until convergence. Headless/CLI path; the
    /// interactive path steps once per tick instead.
    pub fn run_to_convergence(&mut self, graph: &mut Graph) -> u32 {
        while !self.converged {
            self.step(graph);
        }
        self.iterations
    }

    pub fn drain_warnings(&mut self) -> Vec<LayoutWarning> {
        std::mem::take(&mut self.warnings)
    }

    /// Deterministic perturbation in [-seed_jitter, seed_jitter], keyed by
    /// engine seed and node id. Splitmix64-style mix so the value is stable
    /// across runs and platforms.
    fn jitter(&self, node_id: &str, lane: u64) -> f32 {
        let mut state = self.seed ^ lane.wrapping_mul(0x9E3779B97F4A7C15);
        for byte in node_id.bytes() {
            state = state.wrapping_add(byte as u64).wrapping_mul(0xBF58476D1CE4E5B9);
            state ^= state >> 27;
        }
        state = state.wrapping_mul(0x94D049BB133111EB);
        state ^= state >> 31;
        let unit = (state >> 11) as f32 / (1u64 << 53) as f32;
        (unit * 2.0 - 1.0) * self.config.seed_jitter
    }
}

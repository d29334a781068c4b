use std::collections::{BTreeMap, HashMap};

use crate::config::LayoutConfig;
use crate::graph::{Graph, Vec2};

use super::LayoutWarning;

/// Nodes closer than this are treated as coincident to keep the repulsion
/// term finite.
const MIN_SEPARATION: f32 = 0.01;

#[derive(Debug, Clone, Copy)]
pub struct StepStats {
    pub max_displacement: f32,
    pub iteration_complete: bool,
    pub next_cursor: usize,
}

/// One budgeted window of a layout iteration.
///
/// Processes up to `per_tick_node_budget` nodes starting at `cursor` (in
/// sorted-id order): pairwise repulsion against every other node, spring
/// attraction along incident edges scaled by intensity, then a damped
/// velocity integration capped by the current temperature. Pinned nodes
/// exert forces but are never moved.
pub(super) fn apply_forces(
    graph: &mut Graph,
    seeds: &BTreeMap<String, Vec2>,
    config: &LayoutConfig,
    temperature: f32,
    cursor: usize,
    warnings: &mut Vec<LayoutWarning>,
) -> StepStats {
    let ids: Vec<String> = graph
        .sorted_node_ids()
        .into_iter()
        .map(str::to_string)
        .collect();
    let positions: Vec<Vec2> = ids
        .iter()
        .map(|id| graph.node(id).map(|n| n.position).unwrap_or(Vec2::ZERO))
        .collect();
    let index_of: HashMap<&str, usize> = ids
        .iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), i))
        .collect();

    // (neighbor index, intensity) per node, both directions.
    let mut adjacency: Vec<Vec<(usize, f32)>> = vec![Vec::new(); ids.len()];
    for edge in graph.edges() {
        let (Some(&from), Some(&to)) = (
            index_of.get(edge.from.as_str()),
            index_of.get(edge.to.as_str()),
        ) else {
            continue;
        };
        adjacency[from].push((to, edge.intensity));
        adjacency[to].push((from, edge.intensity));
    }

    let window_end = (cursor + config.per_tick_node_budget).min(ids.len());
    let ideal = config.ideal_edge_length;
    let mut max_displacement = 0.0f32;

    for i in cursor..window_end {
        let id = &ids[i];
        let (pinned, mut velocity) = match graph.node(id) {
            Some(node) => (node.pinned, node.velocity),
            None => continue,
        };

        if !positions[i].is_finite() || !velocity.is_finite() {
            reset_node(graph, seeds, id, warnings);
            continue;
        }
        if pinned {
            continue;
        }

        let mut force = Vec2::ZERO;
        for (j, other) in positions.iter().enumerate() {
            if j == i {
                continue;
            }
            let delta = positions[i] - *other;
            let distance = delta.length().max(MIN_SEPARATION);
            let magnitude = config.repulsion_strength * ideal * ideal / (distance * distance);
            force += delta.scale(magnitude / distance);
        }
        for &(j, intensity) in &adjacency[i] {
            let delta = positions[j] - positions[i];
            let distance = delta.length().max(MIN_SEPARATION);
            let magnitude = config.spring_strength * intensity * (distance - ideal);
            force += delta.scale(magnitude / distance);
        }

        velocity = (velocity + force).scale(config.damping);
        let mut displacement = velocity;
        let speed = displacement.length();
        if speed > temperature {
            displacement = displacement.scale(temperature / speed);
        }
        let position = positions[i] + displacement;

        if !position.is_finite() || !velocity.is_finite() {
            reset_node(graph, seeds, id, warnings);
            continue;
        }

        max_displacement = max_displacement.max(displacement.length());
        if let Some(node) = graph.node_mut(id) {
            node.position = position;
            node.velocity = velocity;
        }
    }

    StepStats {
        max_displacement,
        iteration_complete: window_end >= ids.len(),
        next_cursor: window_end,
    }
}

fn reset_node(
    graph: &mut Graph,
    seeds: &BTreeMap<String, Vec2>,
    node_id: &str,
    warnings: &mut Vec<LayoutWarning>,
) {
    let seed = seeds.get(node_id).copied().unwrap_or(Vec2::ZERO);
    if let Some(node) = graph.node_mut(node_id) {
        node.position = seed;
        node.velocity = Vec2::ZERO;
    }
    log::warn!("layout: node {node_id} became non-finite, reset to seed position");
    warnings.push(LayoutWarning::UnstableNodeReset {
        node_id: node_id.to_string(),
    });
}

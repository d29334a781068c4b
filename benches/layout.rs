use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use identity_graph_engine::config::{EngineConfig, ParadoxConfig};
use identity_graph_engine::graph::{Edge, EdgeKind, Graph, Node, NodeKind};
use identity_graph_engine::paradox::detect_paradoxes;
use identity_graph_engine::render::{Selection, render};
use identity_graph_engine::theme::Theme;
use identity_graph_engine::viewport::Viewport;
use identity_graph_engine::Engine;
use std::hint::black_box;

const KINDS: [NodeKind; 6] = [
    NodeKind::Thought,
    NodeKind::Belief,
    NodeKind::Emotion,
    NodeKind::Action,
    NodeKind::Experience,
    NodeKind::Consequence,
];

const EDGE_KINDS: [EdgeKind; 5] = [
    EdgeKind::Reinforces,
    EdgeKind::Contradicts,
    EdgeKind::Undermines,
    EdgeKind::LeadsTo,
    EdgeKind::CoOccursWith,
];

/// Ring of `nodes` with `extra_edges` chords, cycling through node and edge
/// kinds so every code path in layout/paradox/render sees traffic.
fn ring_with_chords(nodes: usize, extra_edges: usize) -> Graph {
    let node_list: Vec<Node> = (0..nodes)
        .map(|i| {
            Node::new(
                format!("n{i:04}"),
                format!("node {i}"),
                KINDS[i % KINDS.len()],
            )
        })
        .collect();
    let mut edges: Vec<Edge> = (0..nodes)
        .map(|i| {
            Edge::new(
                format!("ring{i:04}"),
                format!("n{i:04}"),
                format!("n{:04}", (i + 1) % nodes),
                EDGE_KINDS[i % EDGE_KINDS.len()],
            )
        })
        .collect();
    let mut count = 0usize;
    'outer: for i in 0..nodes {
        for j in (i + 2)..nodes {
            if count >= extra_edges {
                break 'outer;
            }
            if (j + 1) % nodes == i {
                continue;
            }
            edges.push(
                Edge::new(
                    format!("chord{count:04}"),
                    format!("n{i:04}"),
                    format!("n{j:04}"),
                    EDGE_KINDS[(i + j) % EDGE_KINDS.len()],
                )
                .with_intensity(0.3 + 0.1 * ((count % 7) as f32)),
            );
            count += 1;
        }
    }
    Graph::load(node_list, edges).unwrap()
}

fn bench_layout_settle(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout_settle");
    for &(nodes, chords) in &[(20usize, 10usize), (80, 60), (200, 150)] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{nodes}n_{chords}c")),
            &(nodes, chords),
            |b, &(nodes, chords)| {
                b.iter(|| {
                    let graph = ring_with_chords(nodes, chords);
                    let mut engine = Engine::new(
                        graph,
                        EngineConfig::default(),
                        Theme::identity_default(),
                        42,
                    );
                    black_box(engine.settle_layout())
                });
            },
        );
    }
    group.finish();
}

fn bench_single_tick(c: &mut Criterion) {
    let graph = ring_with_chords(500, 300);
    let mut engine = Engine::new(graph, EngineConfig::default(), Theme::identity_default(), 42);
    c.bench_function("tick_500_nodes", |b| {
        b.iter(|| black_box(engine.tick()));
    });
}

fn bench_paradox_scan(c: &mut Criterion) {
    let graph = ring_with_chords(120, 200);
    let config = ParadoxConfig::default();
    c.bench_function("paradox_scan_120_nodes", |b| {
        b.iter(|| black_box(detect_paradoxes(&graph, &config)));
    });
}

fn bench_render_pass(c: &mut Criterion) {
    let graph = ring_with_chords(300, 150);
    let viewport = Viewport::default();
    let theme = Theme::identity_default();
    let config = EngineConfig::default();
    let paradoxes = detect_paradoxes(&graph, &config.paradox);
    c.bench_function("render_300_nodes", |b| {
        b.iter(|| {
            black_box(render(
                &graph,
                &viewport,
                &paradoxes,
                &Selection::default(),
                &theme,
                &config.render,
            ))
        });
    });
}

criterion_group!(
    benches,
    bench_layout_settle,
    bench_single_tick,
    bench_paradox_scan,
    bench_render_pass
);
criterion_main!(benches);

use crate::config::load_config;
use crate::engine::Engine;
use crate::graph::Vec2;
use crate::render::{render_svg, write_output_svg};
use crate::snapshot::parse_snapshot;
use anyhow::Result;
use clap::Parser;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "idge",
    version,
    about = "Identity graph engine: lay out a graph snapshot and render it to SVG"
)]
pub struct Args {
    /// Input snapshot (.json/.json5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output SVG file. Defaults to stdout if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Config JSON file (layout/viewport/render overrides)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Canvas width
    #[arg(short = 'w', long = "width", default_value_t = 1200.0)]
    pub width: f32,

    /// Canvas height
    #[arg(short = 'H', long = "height", default_value_t = 800.0)]
    pub height: f32,

    /// Layout seed; same snapshot and seed reproduce the same picture
    #[arg(short = 's', long = "seed", default_value_t = 42)]
    pub seed: u64,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    let input = read_input(args.input.as_deref())?;
    let snapshot = parse_snapshot(&input)?;
    let mut engine = Engine::from_snapshot(snapshot, config.engine, config.theme, args.seed)?;

    engine.settle_layout();
    fit_view(&mut engine, args.width, args.height);

    for cycle in engine.paradoxes() {
        eprintln!(
            "warning: paradoxical cycle through edges [{}]",
            cycle.edge_ids.join(", ")
        );
    }

    let commands = engine.tick();
    let svg = render_svg(&commands, engine.theme(), args.width, args.height);
    write_output_svg(&svg, args.output.as_deref())?;
    Ok(())
}

/// Pans (and zooms out if needed) so the settled layout is centered in the
/// canvas.
fn fit_view(engine: &mut Engine, width: f32, height: f32) {
    let mut min = Vec2::new(f32::MAX, f32::MAX);
    let mut max = Vec2::new(f32::MIN, f32::MIN);
    for node in engine.graph().nodes() {
        min.x = min.x.min(node.position.x);
        min.y = min.y.min(node.position.y);
        max.x = max.x.max(node.position.x);
        max.y = max.y.max(node.position.y);
    }
    if min.x > max.x {
        return;
    }

    let span = (max - min) + Vec2::new(120.0, 120.0);
    let factor = (width / span.x).min(height / span.y);
    let screen_center = Vec2::new(width / 2.0, height / 2.0);
    engine.zoom_at(screen_center, factor / engine.viewport().zoom());

    let world_center = (min + max).scale(0.5);
    let center_on_screen = engine.viewport().world_to_screen(world_center);
    engine.pan_by(screen_center - center_on_screen);
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path == Path::new("-") {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            return Ok(buf);
        }
        return Ok(std::fs::read_to_string(path)?);
    }

    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

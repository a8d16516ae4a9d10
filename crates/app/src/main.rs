mod samples;

use std::fmt::Display;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use graphview_layout::{
    BuchheimWalkerConfiguration, BuchheimWalkerLayout, FruchtermanReingoldConfiguration,
    FruchtermanReingoldLayout, Graph, LayoutEngine, Payload, Size, SugiyamaConfiguration,
    SugiyamaLayout, Vector,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use tracing_subscriber::{prelude::*, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Algorithm {
    Tree,
    Force,
    Layered,
}

#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Layout to run on its sample graph
    #[arg(value_enum, default_value_t = Algorithm::Layered)]
    algorithm: Algorithm,

    /// RON file holding the layout configurations
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Width given to every node
    #[arg(long, default_value_t = 100.0)]
    node_width: f64,

    /// Height given to every node
    #[arg(long, default_value_t = 50.0)]
    node_height: f64,

    /// Move the result by this much along both axes
    #[arg(long, default_value_t = 0.0)]
    shift: f64,

    /// Print the configuration in effect and exit
    #[arg(long)]
    dump_config: bool,
}

/// Configurations of all layouts, each falling back to its defaults
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct DemoConfig {
    tree: BuchheimWalkerConfiguration,
    force: FruchtermanReingoldConfiguration,
    layered: SugiyamaConfiguration,
}

impl DemoConfig {
    fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        ron::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
    }
}

/// Lay the graph out and log where everything ended up
fn run<T, E>(mut engine: E, mut graph: Graph<T>, node_size: Size, shift: Vector) -> Result<()>
where
    T: Payload + Display,
    E: LayoutEngine<T>,
{
    graph.measure(&|_: &T| node_size);
    let size = engine
        .run_shifted(&mut graph, shift)
        .context("Layout failed")?;
    info!("Laid out {} nodes in {:.1} x {:.1}", graph.node_count(), size.width, size.height);

    for &id in graph.nodes() {
        let node = &graph[id];
        info!("{:>4} at ({:.1}, {:.1})", node.payload(), node.x(), node.y());
    }
    for geometry in engine.edge_geometry(&graph) {
        let source = &graph[geometry.edge.source];
        let destination = &graph[geometry.edge.destination];
        debug!(
            "{} -> {}: {} points, arrow {}",
            source.payload(),
            destination.payload(),
            geometry.polyline.len(),
            geometry.arrow_head.is_some()
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match &args.config {
        Some(path) => DemoConfig::load(path)?,
        None => DemoConfig::default(),
    };
    if args.dump_config {
        let text = ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::default())
            .context("Failed to serialize the configuration")?;
        println!("{text}");
        return Ok(());
    }

    let node_size = Size::new(args.node_width, args.node_height);
    let shift = Vector::new(args.shift, args.shift);
    match args.algorithm {
        Algorithm::Tree => run(
            BuchheimWalkerLayout::new(config.tree),
            samples::tree(),
            node_size,
            shift,
        ),
        Algorithm::Force => run(
            FruchtermanReingoldLayout::new(config.force),
            samples::force(),
            node_size,
            shift,
        ),
        Algorithm::Layered => run(
            SugiyamaLayout::new(config.layered),
            samples::layered(),
            node_size,
            shift,
        ),
    }
}

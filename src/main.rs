mod app;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use collab_graph::Configuration;
use collab_graph::cache::{DiskStore, GraphStore};
use collab_graph::collab::Dataset;
use collab_graph::layout::{LayoutEngine, Viewport};
use collab_graph::service::{EgoRequests, GraphService};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,
    #[arg(long)]
    cache_dir: Option<PathBuf>,
    #[arg(long)]
    no_cache: bool,
    #[arg(long, default_value_t = 1280.0)]
    width: f32,
    #[arg(long, default_value_t = 860.0)]
    height: f32,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    View,
    Generate(GraphArgs),
    Ego {
        artist: String,
        #[arg(long, default_value_t = 2)]
        degree: u32,
    },
    Search { query: String },
    Layout {
        #[command(flatten)]
        graph: GraphArgs,
        #[arg(long)]
        artist: Option<String>,
        #[arg(long, default_value_t = 2)]
        degree: u32,
        #[arg(long, default_value_t = 300)]
        ticks: usize,
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Debug, clap::Args)]
struct GraphArgs {
    #[arg(long)]
    config: Option<String>,
    #[arg(long)]
    vertex_limit: Option<i64>,
}

impl GraphArgs {
    fn configuration(&self) -> Result<Configuration> {
        let mut config = match &self.config {
            Some(raw) => Configuration::from_json(raw).context("parsing --config")?,
            None => Configuration::default(),
        };
        if let Some(limit) = self.vertex_limit {
            config.vertex_limit = limit;
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Clone, Debug)]
pub(crate) struct ServiceOptions {
    pub(crate) data_dir: PathBuf,
    pub(crate) cache_dir: Option<PathBuf>,
}

impl ServiceOptions {
    fn from_args(args: &Args) -> Self {
        let cache_dir = if args.no_cache {
            None
        } else {
            Some(
                args.cache_dir
                    .clone()
                    .unwrap_or_else(|| args.data_dir.join("cache")),
            )
        };
        Self {
            data_dir: args.data_dir.clone(),
            cache_dir,
        }
    }

    pub(crate) fn open(&self) -> Result<GraphService> {
        let dataset = Dataset::load(&self.data_dir)
            .with_context(|| format!("loading dataset from {}", self.data_dir.display()))?;
        let store = match &self.cache_dir {
            Some(dir) => {
                let store = DiskStore::open(dir)
                    .with_context(|| format!("opening cache directory {}", dir.display()))?;
                Some(Arc::new(store) as Arc<dyn GraphStore>)
            }
            None => None,
        };
        info!(
            artists = dataset.graph().node_count(),
            collaborations = dataset.graph().edge_count(),
            cached = store.is_some(),
            "dataset loaded"
        );
        Ok(GraphService::new(Arc::new(dataset), store))
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let options = ServiceOptions::from_args(&args);

    match args.command {
        None | Some(Command::View) => run_viewer(options, args.width, args.height),
        Some(Command::Generate(graph)) => {
            let config = graph.configuration()?;
            let generated = options.open()?.generate(&config)?;
            info!(key = %generated.key, outcome = generated.outcome.label(), "cache");
            println!("{}", serde_json::to_string_pretty(&generated.graph)?);
            Ok(())
        }
        Some(Command::Ego { artist, degree }) => {
            let service = options.open()?;
            let graph = ego_network(&service, &artist, degree)?;
            println!("{}", serde_json::to_string_pretty(&graph)?);
            Ok(())
        }
        Some(Command::Search { query }) => {
            let service = options.open()?;
            for name in service.dataset().search(&query) {
                println!("{name}");
            }
            Ok(())
        }
        Some(Command::Layout {
            graph,
            artist,
            degree,
            ticks,
            seed,
        }) => {
            let config = graph.configuration()?;
            let service = options.open()?;
            let subgraph = match artist {
                Some(artist) => ego_network(&service, &artist, degree)?,
                None => service.generate(&config)?.graph,
            };

            let viewport = Viewport::new(args.width, args.height)?;
            let mut engine = match seed {
                Some(seed) => LayoutEngine::with_seed(seed),
                None => LayoutEngine::new(),
            };
            engine.start(&subgraph, &config, viewport)?;
            let ran = engine.step(ticks)?;
            info!(ticks = ran, settled = engine.is_settled(), "layout finished");

            let Some(snapshot) = engine.snapshot() else {
                bail!("layout session ended before producing positions");
            };
            for (id, node) in snapshot.ids.iter().zip(&snapshot.nodes) {
                println!("{id},{:.2},{:.2}", node.position.x, node.position.y);
            }
            engine.stop();
            Ok(())
        }
    }
}

fn ego_network(
    service: &GraphService,
    artist: &str,
    degree: u32,
) -> Result<collab_graph::collab::GraphData> {
    let mut requests = EgoRequests::new(Arc::clone(service.dataset()));
    requests.submit(artist, degree);
    match requests.wait(Duration::from_secs(60)) {
        Some(result) => Ok(result?.graph),
        None => bail!("ego query for {artist:?} timed out"),
    }
}

fn run_viewer(options: ServiceOptions, width: f32, height: f32) -> Result<()> {
    let native = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([width, height]),
        ..Default::default()
    };

    eframe::run_native(
        "collab-graph",
        native,
        Box::new(move |cc| Ok(Box::new(app::CollabGraphApp::new(cc, options)))),
    )
    .map_err(|error| anyhow::anyhow!("viewer failed: {error}"))
}

use anyhow::Context;
use clap::{Parser, Subcommand};
use glam::{DVec2, DVec3};
use tilescape_author::{Stage, StageConfig};
use tilescape_common::{BlockPos, ChunkCoord};
use tilescape_input::Action;
use tilescape_kernel::WorldStore;
use tilescape_render::{DebugTextRenderer, DrawListRenderer, color_variants};
use tilescape_tools::WorldInspector;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tilescape-cli", about = "Headless driver for the tilescape world view")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Stage configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Override the world seed
    #[arg(short, long, global = true)]
    seed: Option<String>,

    /// Chunk to center the window on, as `x,y`
    #[arg(long, global = true, value_parser = parse_chunk, allow_hyphen_values = true)]
    center: Option<ChunkCoord>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and a summary of a freshly initialized stage
    Info,
    /// Pan the camera for a number of frames and report window shifts
    Stream {
        /// Number of frames to simulate
        #[arg(short, long, default_value = "20")]
        frames: u32,
        /// Horizontal pan per frame in pixels
        #[arg(long, default_value = "60", allow_hyphen_values = true)]
        dx: f64,
        /// Vertical pan per frame in pixels
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        dy: f64,
    },
    /// Click the topmost block of the center tile, optionally with a facing held
    Edit {
        /// Facing digit to hold during the click (1-6); omit to remove
        #[arg(short, long)]
        facing: Option<char>,
        /// Block type to place
        #[arg(short, long, default_value = "stone")]
        block: String,
        /// Undo the edit afterwards
        #[arg(long)]
        undo: bool,
    },
    /// Print the current frame
    Render {
        /// Emit the painter-ordered draw list instead of the tile summary
        #[arg(long)]
        draw_list: bool,
    },
    /// Print the three shading variants of a `#rrggbb` color
    Palette { color: String },
    /// Describe one block of the world
    Block {
        #[arg(allow_hyphen_values = true)]
        x: i32,
        #[arg(allow_hyphen_values = true)]
        y: i32,
        z: i32,
    },
}

fn parse_chunk(s: &str) -> Result<ChunkCoord, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got {s:?}"))?;
    let parse = |v: &str| v.trim().parse::<i32>().map_err(|e| format!("{v:?}: {e}"));
    Ok(ChunkCoord::new(parse(x)?, parse(y)?))
}

fn load_config(cli: &Cli) -> anyhow::Result<StageConfig> {
    let mut config = match &cli.config {
        Some(path) => StageConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => StageConfig::default(),
    };
    if let Some(seed) = &cli.seed {
        config.world.seed = seed.clone();
    }
    Ok(config)
}

/// Viewport pixel over the top face of the highest block in the center tile.
fn center_block_point(stage: &Stage) -> Option<DVec2> {
    let grid = stage.grid();
    let tile = grid.tile(grid.locate(grid.center())?)?;
    let node = tile
        .nodes()
        .min_by_key(|n| (tile.render_pos(n).y, -n.draw_key))?;
    let r = tile.render_pos(node);
    let top = grid
        .projection()
        .project_point(DVec3::new(r.x as f64 + 0.5, r.y as f64, r.z as f64 + 0.5));
    Some(grid.to_viewport(top))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = load_config(&cli)?;
    tracing::info!(
        seed = %config.world.seed,
        height = config.world.height,
        zoom = config.viewport.zoom,
        "config loaded"
    );

    match cli.command {
        Commands::Info => {
            let stage = Stage::init(&config, cli.center)?;
            println!("tilescape-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("{}", WorldInspector::summary(&stage));
            println!("palette: {} block types", stage.palette().len());
        }
        Commands::Stream { frames, dx, dy } => {
            let mut stage = Stage::init(&config, cli.center)?;
            println!("Streaming: frames={frames}, pan=({dx}, {dy}) px/frame");
            for frame in 0..frames {
                stage.handle(Action::Pan(DVec2::new(dx, dy)))?;
                let stats = stage.tick()?;
                if stats.shifted() {
                    println!(
                        "  frame {frame}: shifts={:?} built={} evicted={} nodes +{} -{}",
                        stats.shifts,
                        stats.tiles_built_this_frame,
                        stats.tiles_evicted_this_frame,
                        stats.nodes_built_this_frame,
                        stats.nodes_evicted_this_frame,
                    );
                }
            }
            let timer = stage.grid().timer();
            println!(
                "Maintenance: avg={:?} max={:?} over {} frames",
                timer.average(),
                timer.max(),
                timer.count()
            );
            println!("{}", WorldInspector::summary(&stage));
        }
        Commands::Edit {
            facing,
            block,
            undo,
        } => {
            let mut stage = Stage::init(&config, cli.center)?;
            stage.handle(Action::SelectBlockType(block))?;
            if let Some(key) = facing {
                stage.handle(Action::KeyDown(key))?;
                println!("Facing: {:?}", stage.latch().state());
            }
            let point = center_block_point(&stage).context("center tile has no blocks")?;
            match stage.handle(Action::PointerDown(point))? {
                Some(outcome) => {
                    let c = &outcome.command;
                    println!(
                        "{:?} at {}: {} -> {} ({:?})",
                        outcome.kind(),
                        c.pos,
                        c.old,
                        c.new,
                        outcome.delta
                    );
                    if let Some(info) = WorldInspector::inspect_block(stage.store(), c.pos) {
                        println!("  {info}");
                    }
                }
                None => println!("Click at ({:.1}, {:.1}) hit nothing", point.x, point.y),
            }
            if undo {
                if let Some(outcome) = stage.handle(Action::Undo)? {
                    println!(
                        "Undone: {} restored to {}",
                        outcome.command.pos, outcome.command.new
                    );
                }
            }
            println!("{}", WorldInspector::summary(&stage));
        }
        Commands::Render { draw_list } => {
            let stage = Stage::init(&config, cli.center)?;
            if draw_list {
                for cmd in stage.render(&DrawListRenderer::new()) {
                    let top = &cmd.faces[0];
                    println!(
                        "key={} {} top={} at ({:.1}, {:.1})",
                        cmd.draw_key, cmd.kind, top.color, top.points[0].x, top.points[0].y
                    );
                }
            } else {
                print!("{}", stage.render(&DebugTextRenderer::new()));
            }
        }
        Commands::Palette { color } => {
            let variants = color_variants(&color)?;
            println!("{color}: top={} front={} side={}", variants[0], variants[1], variants[2]);
        }
        Commands::Block { x, y, z } => {
            let mut store = WorldStore::from_config(&config.world);
            let pos = BlockPos::new(x, y, z);
            store.get_block(pos)?;
            match WorldInspector::inspect_block(&store, pos) {
                Some(info) => println!("{info}"),
                None => println!("Block {pos} is not loaded"),
            }
        }
    }

    Ok(())
}

// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Plinth CLI.
//!
//! Developer commands over recorded scene snapshots:
//!
//! ```text
//! plinth graph <scene.json> [--format table|dot|json]
//! plinth overlap <scene.json> <object-id> [--max-depth D] [--max-volume V]
//! plinth config show | init [--force]
//! ```
//!
//! Analysis parameters come from the stored config (platform config dir, or
//! `--config-dir`). Logs go to stderr; set `RUST_LOG` or pass `-v`.

// The CLI is expected to print to stdout/stderr.
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod scene;

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::{presets::UTF8_FULL, Table};
use plinth_config::{ConfigService, FsConfigStore};
use plinth_core::{AnalysisConfig, HypothesisManager, SupportGraph, SupportGraphBuilder};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::scene::{GraphReport, SceneFile};

#[derive(Parser, Debug)]
#[command(author, version, about = "Support-graph scene analysis", long_about = None)]
struct Args {
    /// Raise the default log level to debug.
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Read and write config here instead of the platform config directory.
    #[arg(long, global = true, value_name = "DIR")]
    config_dir: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the support graph of a recorded tick.
    Graph {
        /// Scene snapshot (JSON).
        scene: PathBuf,
        /// Output format.
        #[arg(long, value_enum, default_value_t = Format::Table)]
        format: Format,
        /// Overrides the step stored in the scene and in config.
        #[arg(long)]
        time_step: Option<f32>,
    },
    /// Check how far one object intrudes into its recognized neighbours.
    Overlap {
        /// Scene snapshot (JSON).
        scene: PathBuf,
        /// Object to test at its recorded pose.
        object: String,
        /// Penetration-depth threshold; defaults to config.
        #[arg(long)]
        max_depth: Option<f32>,
        /// Intersecting-volume threshold; defaults to config.
        #[arg(long)]
        max_volume: Option<f32>,
    },
    /// Inspect or initialise the stored analysis config.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the effective analysis config as JSON.
    Show,
    /// Write the default analysis config.
    Init {
        /// Overwrite an existing config.
        #[arg(long)]
        force: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Table,
    Dot,
    Json,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);
    let config = config_service(args.config_dir.as_deref())?;

    match args.cmd {
        Command::Graph {
            scene,
            format,
            time_step,
        } => {
            let analysis = config.load_analysis()?;
            let graph = build_graph(&scene, &analysis, time_step)?;
            print_graph(&graph, format)?;
        }
        Command::Overlap {
            scene,
            object,
            max_depth,
            max_volume,
        } => {
            let analysis = config.load_analysis()?;
            run_overlap(&scene, &object, analysis, max_depth, max_volume)?;
        }
        Command::Config { action } => match action {
            ConfigAction::Show => {
                let analysis = config.load_analysis()?;
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            }
            ConfigAction::Init { force } => {
                let path = config.store().path_for(AnalysisConfig::STORE_KEY)?;
                if path.exists() && !force {
                    return Err(anyhow!(
                        "{} already exists; pass --force to overwrite",
                        path.display()
                    ));
                }
                config.save_analysis(&AnalysisConfig::default())?;
                println!("wrote {}", path.display());
            }
        },
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn config_service(dir: Option<&Path>) -> Result<ConfigService<FsConfigStore>> {
    let store = match dir {
        Some(dir) => FsConfigStore::with_root(dir),
        None => FsConfigStore::new(),
    }
    .context("opening config store")?;
    Ok(ConfigService::new(store))
}

fn build_graph(
    path: &Path,
    analysis: &AnalysisConfig,
    time_step: Option<f32>,
) -> Result<SupportGraph> {
    let scene = SceneFile::load(path)?;
    let dt = time_step.or(scene.time_step).unwrap_or(analysis.time_step);
    let world = scene.into_world();
    info!(dt, "building support graph");
    SupportGraphBuilder::new(analysis)
        .build(&world, dt)
        .context("building support graph")
}

fn print_graph(graph: &SupportGraph, format: Format) -> Result<()> {
    match format {
        Format::Dot => print!("{}", graph.to_dot()),
        Format::Json => println!("{}", serde_json::to_string_pretty(&GraphReport::new(graph))?),
        Format::Table => {
            let mut vertices = Table::new();
            vertices.load_preset(UTF8_FULL).set_header(vec![
                "object",
                "ground",
                "penetration",
                "volume",
                "support",
            ]);
            for (_, v) in graph.vertices() {
                vertices.add_row(vec![
                    v.object_id.to_string(),
                    if v.ground_supported { "yes" } else { "no" }.to_owned(),
                    format!("{:.4}", v.penetration_distance),
                    format!("{:.6}", v.colliding_volume),
                    format!("{:.4}", v.support_contribution),
                ]);
            }
            println!("{vertices}");

            let mut edges = Table::new();
            edges
                .load_preset(UTF8_FULL)
                .set_header(vec!["supporter", "supported", "shape pairs"]);
            for e in GraphReport::new(graph).edges {
                let pairs: Vec<String> = e
                    .shape_pairs
                    .iter()
                    .map(|(l, u)| format!("{l}:{u}"))
                    .collect();
                edges.add_row(vec![
                    e.supporter.to_string(),
                    e.supported.to_string(),
                    pairs.join(" "),
                ]);
            }
            println!("{edges}");
        }
    }
    Ok(())
}

fn run_overlap(
    path: &Path,
    object: &str,
    analysis: AnalysisConfig,
    max_depth: Option<f32>,
    max_volume: Option<f32>,
) -> Result<()> {
    let max_depth = max_depth.unwrap_or(analysis.max_penetration_depth);
    let max_volume = max_volume.unwrap_or(analysis.max_intersecting_volume);
    let manager = HypothesisManager::from_world(SceneFile::load(path)?.into_world(), analysis);
    let pose = manager
        .current_poses()?
        .get(object)
        .copied()
        .ok_or_else(|| anyhow!("no active object named {object:?} in the scene"))?;
    let report = manager.check_candidate(object, pose, max_depth, max_volume)?;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["object", "depth", "volume", "accepted"]);
    table.add_row(vec![
        report.object_id.to_string(),
        format!("{:.4}", report.total_penetration_depth),
        format!("{:.6}", report.total_intersecting_volume),
        if report.accepted { "yes" } else { "no" }.to_owned(),
    ]);
    println!("{table}");
    Ok(())
}

// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use gato::config::DelayTableConfig;
use gato::core::CoordinateSystem;
use gato::io;

#[derive(Parser)]
#[command(name = "gato", about = "Geometric delay tables for seismic arrays")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute the delay matrix of a configured table
    Delays {
        /// JSON delay table configuration
        #[arg(short = 'c', long)]
        config: PathBuf,

        /// Output file path (.npy or .mat)
        #[arg(short = 'o', long, default_value = "delays.npy")]
        output: PathBuf,
    },
    /// Export the node coordinates of one grid of a configured table
    Nodes {
        /// JSON delay table configuration
        #[arg(short = 'c', long)]
        config: PathBuf,

        /// Which grid of the table to export
        #[arg(short = 'g', long, value_enum, default_value = "receiver")]
        grid: GridChoice,

        /// Coordinate system: xyz, ned, latlondepth or ecef
        #[arg(short = 's', long, default_value = "ned")]
        system: String,

        /// Output file path (.npy or .mat)
        #[arg(short = 'o', long, default_value = "nodes.npy")]
        output: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum GridChoice {
    Source,
    Receiver,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_delays(config: &Path, output: &Path) -> Result<()> {
    let config = DelayTableConfig::from_path(config)
        .with_context(|| format!("failed to load {}", config.display()))?;
    let table = config.build().context("failed to build delay table")?;
    let (n_sources, n_receivers) = table.shape()?;
    info!(n_sources, n_receivers, method = table.method().name(), "computing delays");

    let delays = table.get_delays().context("delay computation failed")?;
    io::save_array(output, delays, "delays")
        .with_context(|| format!("failed to write {}", output.display()))?;
    info!(path = %output.display(), "wrote delays");
    Ok(())
}

fn run_nodes(config: &Path, grid: GridChoice, system: &str, output: &Path) -> Result<()> {
    let system: CoordinateSystem = system.parse()?;
    let config = DelayTableConfig::from_path(config)
        .with_context(|| format!("failed to load {}", config.display()))?;
    let grid_config = match grid {
        GridChoice::Source => &config.source_grid,
        GridChoice::Receiver => &config.receiver_grid,
    };
    let grid = grid_config.build(config.base_dir())?;
    let grid = grid.borrow();
    if !grid.supported_systems().contains(&system) {
        bail!(
            "{} supports {:?}, not {}",
            grid.name(),
            grid.supported_systems(),
            system
        );
    }
    let nodes = grid.get_nodes(system)?;
    info!(grid = grid.name(), %system, nodes = nodes.nrows(), "exporting nodes");
    io::save_array(output, nodes, "nodes")
        .with_context(|| format!("failed to write {}", output.display()))?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Command::Delays { config, output } => run_delays(config, output)?,
        Command::Nodes {
            config,
            grid,
            system,
            output,
        } => run_nodes(config, *grid, system, output)?,
    }

    Ok(())
}

/*
 * Copyright (C) 2023 Asim Ihsan
 * SPDX-License-Identifier: AGPL-3.0-only
 *
 * This program is free software: you can redistribute it and/or modify it under
 * the terms of the GNU Affero General Public License as published by the Free
 * Software Foundation, version 3.
 *
 * This program is distributed in the hope that it will be useful, but WITHOUT ANY
 * WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A
 * PARTICULAR PURPOSE. See the GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License along
 * with this program. If not, see <https://www.gnu.org/licenses/>
 */

//! Problem set 3: robots cleaning a room.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use robot_cleaning::experiments::{self, ExperimentReport};
use robot_cleaning::{
    FaultyRobot, FurnishedRoom, Robot, RobotKind, RoomKind, Simulation, SimulationConfig,
    StandardRobot,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ps3-robot-simulation")]
#[command(version, about = "Simulate robots cleaning a room", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a batch of trials and report the mean time to clean
    Run(RunArgs),

    /// Run the fixed set of simulations from the problem set
    Baseline,

    /// Compare both strategies for 1 to 10 robots in a 20x20 room
    CompareStrategies(ExperimentArgs),

    /// Compare both strategies across rooms of different shapes but similar area
    RoomShape(ExperimentArgs),

    /// Print the room while a single trial runs in a furnished room
    Trace(TraceArgs),
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum RobotArg {
    Standard,
    Faulty,
}

impl From<RobotArg> for RobotKind {
    fn from(robot: RobotArg) -> Self {
        match robot {
            RobotArg::Standard => RobotKind::Standard,
            RobotArg::Faulty => RobotKind::Faulty,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum RoomArg {
    Empty,
    Furnished,
}

impl From<RoomArg> for RoomKind {
    fn from(room: RoomArg) -> Self {
        match room {
            RoomArg::Empty => RoomKind::Empty,
            RoomArg::Furnished => RoomKind::Furnished,
        }
    }
}

#[derive(Args, Debug)]
struct RunArgs {
    /// JSON config file used as the base; flags override its fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Movement strategy
    #[arg(long, value_enum, default_value_t = RobotArg::Standard)]
    robot: RobotArg,

    /// Robots per trial
    #[arg(long)]
    num_robots: Option<usize>,

    /// Distance per time step
    #[arg(long)]
    speed: Option<f64>,

    /// Dirt removed per time step
    #[arg(long)]
    capacity: Option<i32>,

    /// Room width in tiles
    #[arg(long)]
    width: Option<usize>,

    /// Room height in tiles
    #[arg(long)]
    height: Option<usize>,

    /// Initial dirt per tile
    #[arg(long)]
    dirt_amount: Option<u32>,

    /// Fraction of the room that must be clean
    #[arg(long)]
    min_coverage: Option<f64>,

    /// Number of independent trials
    #[arg(long)]
    num_trials: Option<usize>,

    /// Probability a faulty robot gets faulty per time step
    #[arg(long)]
    faulty_probability: Option<f64>,

    /// Room variant
    #[arg(long, value_enum)]
    room: Option<RoomArg>,

    /// Give up on a trial after this many steps
    #[arg(long)]
    max_steps: Option<u64>,

    /// Seed of the first trial
    #[arg(long)]
    seed: Option<u64>,

    /// Print the full summary as JSON
    #[arg(long)]
    json: bool,
}

impl RunArgs {
    fn to_config(&self) -> Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::from_json_file(path)?,
            None => SimulationConfig::default(),
        };
        if let Some(num_robots) = self.num_robots {
            config.num_robots = num_robots;
        }
        if let Some(speed) = self.speed {
            config.speed = speed;
        }
        if let Some(capacity) = self.capacity {
            config.capacity = capacity;
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(dirt_amount) = self.dirt_amount {
            config.dirt_amount = dirt_amount;
        }
        if let Some(min_coverage) = self.min_coverage {
            config.min_coverage = min_coverage;
        }
        if let Some(num_trials) = self.num_trials {
            config.num_trials = num_trials;
        }
        if let Some(faulty_probability) = self.faulty_probability {
            config.faulty_probability = faulty_probability;
        }
        if let Some(room) = self.room {
            config.room = room.into();
        }
        if self.max_steps.is_some() {
            config.max_steps = self.max_steps;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Args, Debug)]
struct ExperimentArgs {
    /// Trials per point; defaults to the problem set's value
    #[arg(long)]
    num_trials: Option<usize>,

    /// Seed of the first trial of every point
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Write the report as JSON, for plotting
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct TraceArgs {
    /// Movement strategy
    #[arg(long, value_enum, default_value_t = RobotArg::Standard)]
    robot: RobotArg,

    /// Robots in the room
    #[arg(long, default_value_t = 1)]
    num_robots: usize,

    /// Room width in tiles
    #[arg(long, default_value_t = 5)]
    width: usize,

    /// Room height in tiles
    #[arg(long, default_value_t = 5)]
    height: usize,

    /// Initial dirt per tile
    #[arg(long, default_value_t = 1)]
    dirt_amount: u32,

    /// Print the room every this many steps
    #[arg(long, default_value_t = 1)]
    every: u64,

    /// Stop after this many steps
    #[arg(long, default_value_t = 1000)]
    max_steps: u64,

    /// Random seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => run(args),
        Commands::Baseline => baseline(),
        Commands::CompareStrategies(args) => compare_strategies(args),
        Commands::RoomShape(args) => room_shape(args),
        Commands::Trace(args) => match args.robot {
            RobotArg::Standard => trace::<StandardRobot>(&args),
            RobotArg::Faulty => trace::<FaultyRobot>(&args),
        },
    }
}

fn run(args: RunArgs) -> Result<()> {
    let config = args.to_config()?;
    let summary = robot_cleaning::run_simulation_for(args.robot.into(), &config)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("avg time steps: {}", summary.mean_steps);
        if summary.completed_trials() < summary.trials.len() {
            println!(
                "{} of {} trials hit the step limit",
                summary.trials.len() - summary.completed_trials(),
                summary.trials.len()
            );
        }
    }
    Ok(())
}

/// (num_robots, speed, capacity, width, height, dirt_amount, min_coverage, num_trials)
const BASELINE_RUNS: [(usize, f64, i32, usize, usize, u32, f64, usize); 5] = [
    (1, 1.0, 1, 5, 5, 3, 1.0, 50),
    (1, 1.0, 1, 10, 10, 3, 0.8, 50),
    (1, 1.0, 1, 10, 10, 3, 0.9, 50),
    (1, 1.0, 1, 20, 20, 3, 0.5, 50),
    (3, 1.0, 1, 20, 20, 3, 0.5, 50),
];

fn baseline() -> Result<()> {
    for (num_robots, speed, capacity, width, height, dirt_amount, min_coverage, num_trials) in
        BASELINE_RUNS
    {
        let config = SimulationConfig {
            num_robots,
            speed,
            capacity,
            width,
            height,
            dirt_amount,
            min_coverage,
            num_trials,
            ..Default::default()
        };
        let summary = robot_cleaning::run_simulation::<StandardRobot>(&config)?;
        println!("avg time steps: {}", summary.mean_steps);
    }
    Ok(())
}

fn compare_strategies(args: ExperimentArgs) -> Result<()> {
    let base = SimulationConfig {
        num_trials: args.num_trials.unwrap_or(20),
        seed: args.seed,
        ..Default::default()
    };
    let report = experiments::compare_strategies(&base, 1..=10)?;
    emit_report(&report, args.output.as_deref())
}

fn room_shape(args: ExperimentArgs) -> Result<()> {
    let base = SimulationConfig {
        num_robots: 2,
        num_trials: args.num_trials.unwrap_or(200),
        seed: args.seed,
        ..Default::default()
    };
    let report = experiments::room_shape(&base, &[10, 20, 25, 50], 300)?;
    emit_report(&report, args.output.as_deref())
}

fn emit_report(report: &ExperimentReport, output: Option<&Path>) -> Result<()> {
    println!("{}", report);
    if let Some(path) = output {
        let json = serde_json::to_string_pretty(report)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        tracing::info!("wrote {}", path.display());
    }
    Ok(())
}

fn trace<_Robot: Robot>(args: &TraceArgs) -> Result<()> {
    let every = args.every.max(1);
    let mut rng = rand_pcg::Pcg64::seed_from_u64(args.seed);
    let mut room = FurnishedRoom::new(args.width, args.height, args.dirt_amount)?;
    room.add_furniture_to_room(&mut rng)?;
    let params = SimulationConfig::default().robot_params();
    let mut simulation = Simulation::<_, _Robot>::spawn(
        room,
        args.num_robots,
        &params,
        1.0,
        Some(args.max_steps),
        &mut rng,
    )?;

    println!("{}\n", simulation);
    while !simulation.is_done() {
        simulation.step(&mut rng)?;
        if simulation.steps() % every == 0 || simulation.is_done() {
            println!("{}\n", simulation);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "ps3-robot-simulation",
            "run",
            "--robot",
            "faulty",
            "--num-robots",
            "3",
            "--room",
            "furnished",
            "--min-coverage",
            "0.5",
        ])
        .expect("parse failed");
        let Commands::Run(args) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(args.robot, RobotArg::Faulty);
        let config = args.to_config().expect("config");
        assert_eq!(config.num_robots, 3);
        assert_eq!(config.room, RoomKind::Furnished);
        assert_eq!(config.min_coverage, 0.5);
        assert_eq!(config.width, SimulationConfig::default().width);
    }

    #[test]
    fn test_run_rejects_out_of_domain_flags() {
        let cli = Cli::try_parse_from(["ps3-robot-simulation", "run", "--min-coverage", "2"])
            .expect("parse failed");
        let Commands::Run(args) = cli.command else {
            panic!("expected run command");
        };
        assert!(args.to_config().is_err());
    }
}

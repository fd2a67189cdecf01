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

//! The simulation driver: advance every robot until the room is clean enough.

use std::fmt;

use rand::SeedableRng;
use rustc_hash::FxHashSet;
use serde::Serialize;
use tracing::{debug, trace};

use crate::config::{RoomKind, SimulationConfig};
use crate::robot::{FaultyRobot, Robot, RobotKind, RobotParams, StandardRobot};
use crate::room::{write_grid, EmptyRoom, FurnishedRoom, Room};
use crate::{Float, Result, RobotCleaningError, Rng};

/// How a single trial ended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrialOutcome {
    /// Time steps taken.
    pub steps: u64,

    /// Coverage when the trial ended.
    pub coverage: Float,

    /// False if the trial hit its step limit first.
    pub reached_coverage: bool,
}

/// A Simulation runs several robots of one kind in a single room until a minimum coverage is
/// reached. One Simulation is one trial.
///
/// The Simulation owns both the room and the robots, and lends the room to each robot in turn.
pub struct Simulation<_Room, _Robot>
where
    _Room: Room,
    _Robot: Robot,
{
    room: _Room,
    robots: Vec<_Robot>,
    min_coverage: Float,
    max_steps: Option<u64>,
    steps: u64,
}

impl<_Room, _Robot> Simulation<_Room, _Robot>
where
    _Room: Room,
    _Robot: Robot,
{
    /// A trial with explicitly placed robots.
    pub fn new(
        room: _Room,
        robots: Vec<_Robot>,
        min_coverage: Float,
        max_steps: Option<u64>,
    ) -> Result<Self> {
        if robots.is_empty() {
            return Err(RobotCleaningError::InvalidConfig(
                "a simulation needs at least one robot".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&min_coverage) {
            return Err(RobotCleaningError::InvalidConfig(format!(
                "min_coverage must be in [0, 1], got {}",
                min_coverage
            )));
        }
        Ok(Self {
            room,
            robots,
            min_coverage,
            max_steps,
            steps: 0,
        })
    }

    /// Place `num_robots` robots at random positions in `room`.
    pub fn spawn(
        room: _Room,
        num_robots: usize,
        params: &RobotParams,
        min_coverage: Float,
        max_steps: Option<u64>,
        rng: &mut Rng,
    ) -> Result<Self> {
        let robots = (0..num_robots)
            .map(|_| _Robot::spawn(&room, params, rng))
            .collect::<Result<Vec<_Robot>>>()?;
        Self::new(room, robots, min_coverage, max_steps)
    }

    /// The room being cleaned.
    pub fn room(&self) -> &_Room {
        &self.room
    }

    /// The robots, in stepping order.
    pub fn robots(&self) -> &[_Robot] {
        &self.robots
    }

    /// Time steps taken so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Current coverage of the room.
    pub fn coverage(&self) -> Float {
        self.room.coverage()
    }

    /// True once the room is clean enough or the step limit is hit.
    pub fn is_done(&self) -> bool {
        self.coverage() >= self.min_coverage
            || self.max_steps.map_or(false, |max| self.steps >= max)
    }

    /// Let every robot take one step, in order.
    pub fn step(&mut self, rng: &mut Rng) -> Result<()> {
        for (i, robot) in self.robots.iter_mut().enumerate() {
            let step = robot.update_position_and_clean(&mut self.room, rng)?;
            trace!(robot = i, time_step = self.steps, ?step, "robot stepped");
        }
        self.steps += 1;
        Ok(())
    }

    /// Step until done. Coverage is checked before every step, so a room that starts clean
    /// enough takes 0 steps.
    pub fn run(&mut self, rng: &mut Rng) -> Result<TrialOutcome> {
        while !self.is_done() {
            self.step(rng)?;
        }
        let coverage = self.coverage();
        Ok(TrialOutcome {
            steps: self.steps,
            coverage,
            reached_coverage: coverage >= self.min_coverage,
        })
    }
}

impl<_Room, _Robot> fmt::Display for Simulation<_Room, _Robot>
where
    _Room: Room,
    _Robot: Robot,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let robots: FxHashSet<_> = self
            .robots
            .iter()
            .filter_map(|robot| robot.position().tile())
            .collect();
        write_grid(&self.room, &robots, f)?;
        writeln!(f)?;
        write!(
            f,
            "step {}, coverage {:.3}",
            self.steps,
            self.coverage()
        )
    }
}

/// Results of a batch of trials.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationSummary {
    /// Strategy of every robot in every trial.
    pub robot_kind: RobotKind,

    /// One outcome per trial, in trial order.
    pub trials: Vec<TrialOutcome>,

    /// Mean steps over all trials, including any that hit the step limit.
    pub mean_steps: Float,
}

impl SimulationSummary {
    fn new(robot_kind: RobotKind, trials: Vec<TrialOutcome>) -> Self {
        let total: u64 = trials.iter().map(|trial| trial.steps).sum();
        let mean_steps = if trials.is_empty() {
            0.0
        } else {
            total as Float / trials.len() as Float
        };
        Self {
            robot_kind,
            trials,
            mean_steps,
        }
    }

    /// Number of trials that reached the minimum coverage.
    pub fn completed_trials(&self) -> usize {
        self.trials
            .iter()
            .filter(|trial| trial.reached_coverage)
            .count()
    }
}

/// Run one trial of `config` in `room`.
pub fn run_trial<_Room, _Robot>(
    room: _Room,
    config: &SimulationConfig,
    rng: &mut Rng,
) -> Result<TrialOutcome>
where
    _Room: Room,
    _Robot: Robot,
{
    let mut simulation = Simulation::<_Room, _Robot>::spawn(
        room,
        config.num_robots,
        &config.robot_params(),
        config.min_coverage,
        config.max_steps,
        rng,
    )?;
    simulation.run(rng)
}

/// Run `config.num_trials` independent trials with robots of type `_Robot`. Every trial gets a
/// fresh room, fresh robots, and its own random number generator.
pub fn run_simulation<_Robot>(config: &SimulationConfig) -> Result<SimulationSummary>
where
    _Robot: Robot,
{
    config.validate()?;
    let mut trials = Vec::with_capacity(config.num_trials);
    for trial in 0..config.num_trials {
        let mut rng = Rng::seed_from_u64(config.seed.wrapping_add(trial as u64));
        let outcome = match config.room {
            RoomKind::Empty => {
                let room = EmptyRoom::new(config.width, config.height, config.dirt_amount)?;
                run_trial::<_, _Robot>(room, config, &mut rng)?
            }
            RoomKind::Furnished => {
                let mut room =
                    FurnishedRoom::new(config.width, config.height, config.dirt_amount)?;
                room.add_furniture_to_room(&mut rng)?;
                run_trial::<_, _Robot>(room, config, &mut rng)?
            }
        };
        debug!(
            trial,
            steps = outcome.steps,
            coverage = outcome.coverage,
            reached_coverage = outcome.reached_coverage,
            "trial finished"
        );
        trials.push(outcome);
    }
    Ok(SimulationSummary::new(_Robot::KIND, trials))
}

/// [`run_simulation`] with the robot type picked at runtime.
pub fn run_simulation_for(kind: RobotKind, config: &SimulationConfig) -> Result<SimulationSummary> {
    match kind {
        RobotKind::Standard => run_simulation::<StandardRobot>(config),
        RobotKind::Faulty => run_simulation::<FaultyRobot>(config),
    }
}

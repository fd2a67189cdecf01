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

//! Simulation parameters.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::robot::{RobotParams, DEFAULT_FAULTY_PROBABILITY};
use crate::{Float, Result, RobotCleaningError};

/// Step limit of a trial unless configured otherwise.
pub const DEFAULT_MAX_STEPS: u64 = 100_000;

/// Which kind of room each trial runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomKind {
    /// No furniture.
    #[default]
    Empty,

    /// One random rectangle of furniture, placed anew for every trial.
    Furnished,
}

/// Parameters of a batch of trials. Fields missing from a config file take their default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Robots per trial.
    pub num_robots: usize,

    /// Distance each robot travels per time step.
    pub speed: Float,

    /// Dirt each robot removes per time step.
    pub capacity: i32,

    /// Room width in tiles.
    pub width: usize,

    /// Room height in tiles.
    pub height: usize,

    /// Initial dirt on every tile.
    pub dirt_amount: u32,

    /// A trial ends once this fraction of the room is clean.
    pub min_coverage: Float,

    /// Number of independent trials.
    pub num_trials: usize,

    /// Probability that a faulty robot gets faulty on a time step.
    pub faulty_probability: Float,

    /// Room variant.
    pub room: RoomKind,

    /// Give up on a trial after this many steps. `None` never gives up, which hangs on trials
    /// that can't reach coverage, e.g. an always faulty robot.
    pub max_steps: Option<u64>,

    /// Trial `i` is seeded with `seed + i`.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_robots: 1,
            speed: 1.0,
            capacity: 1,
            width: 20,
            height: 20,
            dirt_amount: 3,
            min_coverage: 0.8,
            num_trials: 20,
            faulty_probability: DEFAULT_FAULTY_PROBABILITY,
            room: RoomKind::Empty,
            max_steps: Some(DEFAULT_MAX_STEPS),
            seed: 42,
        }
    }
}

impl SimulationConfig {
    /// Load a config from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|source| RobotCleaningError::ConfigIo {
                path: path.display().to_string(),
                source,
            })?;
        let config: Self =
            serde_json::from_str(&contents).map_err(|source| RobotCleaningError::ConfigParse {
                path: path.display().to_string(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Params every robot of a trial is spawned with.
    pub fn robot_params(&self) -> RobotParams {
        RobotParams::new(self.speed, self.capacity).with_faulty_probability(self.faulty_probability)
    }

    /// Check every parameter is in its domain.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| Err(RobotCleaningError::InvalidConfig(message));
        if self.num_robots == 0 {
            return invalid("num_robots must be positive".to_string());
        }
        if self.width == 0 || self.height == 0 {
            return Err(RobotCleaningError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.room == RoomKind::Furnished && (self.width < 2 || self.height < 2) {
            return Err(RobotCleaningError::RoomTooSmallForFurniture {
                width: self.width,
                height: self.height,
            });
        }
        if !(0.0..=1.0).contains(&self.min_coverage) {
            return invalid(format!(
                "min_coverage must be in [0, 1], got {}",
                self.min_coverage
            ));
        }
        if self.num_trials == 0 {
            return invalid("num_trials must be positive".to_string());
        }
        self.robot_params().validate()?;
        // any move at least the length of the diagonal leaves the room
        let diagonal = (self.width as Float).hypot(self.height as Float);
        if self.speed >= diagonal {
            return invalid(format!(
                "speed {} can never stay inside a {}x{} room",
                self.speed, self.width, self.height
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_is_valid() {
        SimulationConfig::default()
            .validate()
            .expect("default config should be valid");
    }

    #[test]
    fn test_out_of_domain_values_are_rejected() {
        let configs = [
            SimulationConfig {
                num_robots: 0,
                ..Default::default()
            },
            SimulationConfig {
                width: 0,
                ..Default::default()
            },
            SimulationConfig {
                min_coverage: 1.01,
                ..Default::default()
            },
            SimulationConfig {
                min_coverage: Float::NAN,
                ..Default::default()
            },
            SimulationConfig {
                num_trials: 0,
                ..Default::default()
            },
            SimulationConfig {
                speed: -1.0,
                ..Default::default()
            },
            SimulationConfig {
                capacity: 0,
                ..Default::default()
            },
            SimulationConfig {
                faulty_probability: 1.5,
                ..Default::default()
            },
            SimulationConfig {
                room: RoomKind::Furnished,
                width: 1,
                ..Default::default()
            },
            SimulationConfig {
                width: 5,
                height: 5,
                speed: 10.0,
                ..Default::default()
            },
        ];
        for config in configs {
            assert!(config.validate().is_err(), "config: {:?}", config);
        }
    }

    #[test]
    fn test_default_bounds_every_trial() {
        assert_eq!(SimulationConfig::default().max_steps, Some(DEFAULT_MAX_STEPS));
    }

    #[test]
    fn test_speed_just_below_diagonal_is_accepted() {
        let config = SimulationConfig {
            width: 3,
            height: 4,
            speed: 4.99,
            ..Default::default()
        };
        config.validate().expect("speed below the diagonal should be valid");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SimulationConfig =
            serde_json::from_str(r#"{"num_robots": 3, "room": "furnished", "max_steps": 500}"#)
                .expect("parse failed");
        assert_eq!(config.num_robots, 3);
        assert_eq!(config.room, RoomKind::Furnished);
        assert_eq!(config.max_steps, Some(500));
        assert_eq!(config.width, 20);
        assert_eq!(config.seed, 42);
    }

    #[test]
    fn test_from_json_file() {
        let path = std::env::temp_dir().join(format!(
            "robot-cleaning-config-{}.json",
            std::process::id()
        ));
        let mut file = std::fs::File::create(&path).expect("create failed");
        write!(file, r#"{{"width": 7, "height": 3, "min_coverage": 1.0}}"#).expect("write failed");
        drop(file);

        let config = SimulationConfig::from_json_file(&path).expect("load failed");
        let _ = std::fs::remove_file(&path);

        assert_eq!(config.width, 7);
        assert_eq!(config.height, 3);
        assert_eq!(config.min_coverage, 1.0);
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        assert!(matches!(
            SimulationConfig::from_json_file("/nonexistent/robot-cleaning.json"),
            Err(RobotCleaningError::ConfigIo { .. })
        ));
    }
}

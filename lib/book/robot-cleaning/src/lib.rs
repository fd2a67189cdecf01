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

#![warn(missing_docs)]

//! Robot cleaning simulation.
//!
//! A room is a grid of tiles, each holding some amount of dirt. Robots wander the room at a fixed
//! speed, cleaning the tile they land on, and bounce off walls (and furniture) by picking a new
//! random direction. A [`Simulation`] advances every robot one step at a time until a required
//! fraction of the room is clean.
//!
//! Notice that robots don't own the room. The room is handed to a robot for the duration of a
//! single step, which keeps all tile state in one place.

pub mod config;
pub mod experiments;
pub mod position;
pub mod robot;
pub mod room;
pub mod simulation;

pub use config::{RoomKind, SimulationConfig};
pub use position::{Position, Tile};
pub use robot::{FaultyRobot, Robot, RobotKind, RobotParams, RobotState, StandardRobot, Step};
pub use room::{EmptyRoom, FurnishedRoom, RectangularRoom, Room};
pub use simulation::{
    run_simulation, run_simulation_for, run_trial, Simulation, SimulationSummary, TrialOutcome,
};

/// Floating point type used for positions, angles and coverage.
pub type Float = f64;

/// Random number generator used by every stochastic part of the simulation. Seeded explicitly so
/// that trials are reproducible.
pub type Rng = rand_pcg::Pcg64;

/// Result type of this crate.
pub type Result<T> = std::result::Result<T, RobotCleaningError>;

/// Robot cleaning error.
#[derive(Debug, thiserror::Error)]
pub enum RobotCleaningError {
    /// Tried to operate on a position that is not inside the room.
    #[error("position outside the room: ({x}, {y})")]
    PositionOutsideRoom {
        /// x coordinate of the offending position.
        x: Float,
        /// y coordinate of the offending position.
        y: Float,
    },

    /// Tried to look up a tile that is not part of the room.
    #[error("tile outside the room: ({x}, {y})")]
    TileOutsideRoom {
        /// Column of the offending tile.
        x: usize,
        /// Row of the offending tile.
        y: usize,
    },

    /// A room must have at least one tile.
    #[error("invalid room dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
    },

    /// Furniture needs at least a 2x2 room so that it never covers the whole room.
    #[error("room is too small for furniture: {width}x{height}")]
    RoomTooSmallForFurniture {
        /// Room width.
        width: usize,
        /// Room height.
        height: usize,
    },

    /// Every tile of the room is furnished, so there is nowhere to place a robot.
    #[error("room has no valid position")]
    NoValidPosition,

    /// A simulation parameter is out of its domain.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Config file could not be read.
    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        /// Path of the config file.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for a [`SimulationConfig`].
    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        /// Path of the config file.
        path: String,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
}

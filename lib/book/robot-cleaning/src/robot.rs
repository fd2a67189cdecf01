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

//! Robots and their movement strategies.

use rand::Rng as _;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::position::Position;
use crate::room::Room;
use crate::{Float, Result, RobotCleaningError, Rng};

/// Probability that a [`FaultyRobot`] gets faulty on any given time step, unless configured
/// otherwise.
pub const DEFAULT_FAULTY_PROBABILITY: Float = 0.15;

/// Which movement strategy to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RobotKind {
    /// [`StandardRobot`].
    Standard,

    /// [`FaultyRobot`].
    Faulty,
}

impl std::fmt::Display for RobotKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RobotKind::Standard => write!(f, "StandardRobot"),
            RobotKind::Faulty => write!(f, "FaultyRobot"),
        }
    }
}

/// Everything needed to spawn a robot of any kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RobotParams {
    /// Distance travelled per time step.
    pub speed: Float,

    /// Dirt removed from the landing tile per time step.
    pub capacity: i32,

    /// Only used by [`FaultyRobot`].
    pub faulty_probability: Float,
}

impl RobotParams {
    /// Params with the default faulty probability.
    pub fn new(speed: Float, capacity: i32) -> Self {
        Self {
            speed,
            capacity,
            faulty_probability: DEFAULT_FAULTY_PROBABILITY,
        }
    }

    /// Same params with a different faulty probability.
    pub fn with_faulty_probability(self, faulty_probability: Float) -> Self {
        Self {
            faulty_probability,
            ..self
        }
    }

    /// Check every parameter is in its domain.
    pub fn validate(&self) -> Result<()> {
        if !(self.speed.is_finite() && self.speed > 0.0) {
            return Err(RobotCleaningError::InvalidConfig(format!(
                "speed must be positive, got {}",
                self.speed
            )));
        }
        if self.capacity <= 0 {
            return Err(RobotCleaningError::InvalidConfig(format!(
                "capacity must be positive, got {}",
                self.capacity
            )));
        }
        validate_probability(self.faulty_probability)
    }
}

fn validate_probability(p: Float) -> Result<()> {
    if !(0.0..=1.0).contains(&p) {
        return Err(RobotCleaningError::InvalidConfig(format!(
            "faulty probability must be in [0, 1], got {}",
            p
        )));
    }
    Ok(())
}

/// A uniformly random direction in degrees, 0 <= d < 360.
pub fn random_direction(rng: &mut Rng) -> Float {
    rng.gen_range(0.0..360.0)
}

/// What a robot did during one time step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Moved to the position and cleaned the tile there.
    MoveAndClean(Position),

    /// Stayed in place and turned to face the direction.
    TurnOnly(Float),
}

/// Position, direction, speed and capacity of a robot. Strategies differ only in how they update
/// this state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RobotState {
    position: Position,
    direction: Float,
    speed: Float,
    capacity: i32,
}

impl RobotState {
    /// Create a robot state. The direction is normalized to [0, 360).
    pub fn new(position: Position, direction: Float, speed: Float, capacity: i32) -> Self {
        Self {
            position,
            direction: direction.rem_euclid(360.0),
            speed,
            capacity,
        }
    }

    /// A robot at a random valid position of `room`, facing a random direction.
    pub fn spawn<_Room>(room: &_Room, params: &RobotParams, rng: &mut Rng) -> Result<Self>
    where
        _Room: Room + ?Sized,
    {
        params.validate()?;
        let position = room.random_position(rng)?;
        let direction = random_direction(rng);
        Ok(Self::new(position, direction, params.speed, params.capacity))
    }

    /// Current position.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Direction in degrees, 0 <= d < 360.
    pub fn direction(&self) -> Float {
        self.direction
    }

    /// Distance travelled per time step.
    pub fn speed(&self) -> Float {
        self.speed
    }

    /// Dirt removed per time step.
    pub fn capacity(&self) -> i32 {
        self.capacity
    }

    /// Teleport the robot. Doesn't clean anything.
    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    /// Turn the robot to `direction` degrees.
    pub fn set_direction(&mut self, direction: Float) {
        self.direction = direction.rem_euclid(360.0);
    }

    /// The standard rule: move forward and clean if the next position is valid, otherwise turn to
    /// a random direction and stay put.
    pub fn move_or_turn<_Room>(&mut self, room: &mut _Room, rng: &mut Rng) -> Result<Step>
    where
        _Room: Room + ?Sized,
    {
        let next = self.position.new_position(self.direction, self.speed);
        if room.is_position_valid(&next) {
            self.position = next;
            room.clean_tile_at_position(&next, self.capacity)?;
            Ok(Step::MoveAndClean(next))
        } else {
            self.direction = random_direction(rng);
            Ok(Step::TurnOnly(self.direction))
        }
    }
}

/// A Robot cleans a room one time step at a time. Implementations provide the movement strategy.
///
/// Notice that the room is passed in on every step rather than stored, so several robots can
/// share one room.
pub trait Robot: Sized {
    /// Strategy implemented by this type.
    const KIND: RobotKind;

    /// A new robot at a random valid position in `room` facing a random direction.
    fn spawn<_Room>(room: &_Room, params: &RobotParams, rng: &mut Rng) -> Result<Self>
    where
        _Room: Room + ?Sized;

    /// Current state.
    fn state(&self) -> &RobotState;

    /// Mutable state.
    fn state_mut(&mut self) -> &mut RobotState;

    /// Simulate the passage of a single time step.
    fn update_position_and_clean<_Room>(&mut self, room: &mut _Room, rng: &mut Rng) -> Result<Step>
    where
        _Room: Room + ?Sized;

    /// Current position.
    fn position(&self) -> Position {
        self.state().position()
    }

    /// Current direction in degrees.
    fn direction(&self) -> Float {
        self.state().direction()
    }
}

/// At each time step a StandardRobot attempts to move in its current direction. When it would hit
/// a wall or furniture it instead picks a new random direction.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardRobot {
    state: RobotState,
}

impl StandardRobot {
    /// Create a robot from an explicit state.
    pub fn new(state: RobotState) -> Self {
        Self { state }
    }
}

impl Robot for StandardRobot {
    const KIND: RobotKind = RobotKind::Standard;

    fn spawn<_Room>(room: &_Room, params: &RobotParams, rng: &mut Rng) -> Result<Self>
    where
        _Room: Room + ?Sized,
    {
        Ok(Self::new(RobotState::spawn(room, params, rng)?))
    }

    fn state(&self) -> &RobotState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut RobotState {
        &mut self.state
    }

    fn update_position_and_clean<_Room>(&mut self, room: &mut _Room, rng: &mut Rng) -> Result<Step>
    where
        _Room: Room + ?Sized,
    {
        let step = self.state.move_or_turn(room, rng)?;
        trace!(?step, "standard robot step");
        Ok(step)
    }
}

/// A FaultyRobot gets faulty with some probability on each time step. A faulty robot doesn't
/// move or clean; it only picks a new random direction. Otherwise it behaves like a
/// [`StandardRobot`].
#[derive(Debug, Clone, PartialEq)]
pub struct FaultyRobot {
    state: RobotState,
    faulty_probability: Float,
}

impl FaultyRobot {
    /// Create a robot from an explicit state.
    pub fn new(state: RobotState, faulty_probability: Float) -> Result<Self> {
        validate_probability(faulty_probability)?;
        Ok(Self {
            state,
            faulty_probability,
        })
    }

    /// Probability of getting faulty on a time step.
    pub fn faulty_probability(&self) -> Float {
        self.faulty_probability
    }

    /// Set the probability of getting faulty, 0 <= p <= 1.
    pub fn set_faulty_probability(&mut self, faulty_probability: Float) -> Result<()> {
        validate_probability(faulty_probability)?;
        self.faulty_probability = faulty_probability;
        Ok(())
    }

    /// Does this robot get faulty at this time step?
    pub fn gets_faulty(&self, rng: &mut Rng) -> bool {
        rng.gen_bool(self.faulty_probability)
    }
}

impl Robot for FaultyRobot {
    const KIND: RobotKind = RobotKind::Faulty;

    fn spawn<_Room>(room: &_Room, params: &RobotParams, rng: &mut Rng) -> Result<Self>
    where
        _Room: Room + ?Sized,
    {
        Self::new(RobotState::spawn(room, params, rng)?, params.faulty_probability)
    }

    fn state(&self) -> &RobotState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut RobotState {
        &mut self.state
    }

    fn update_position_and_clean<_Room>(&mut self, room: &mut _Room, rng: &mut Rng) -> Result<Step>
    where
        _Room: Room + ?Sized,
    {
        if self.gets_faulty(rng) {
            let direction = random_direction(rng);
            self.state.set_direction(direction);
            trace!(direction, "faulty robot turned");
            return Ok(Step::TurnOnly(direction));
        }
        let step = self.state.move_or_turn(room, rng)?;
        trace!(?step, "faulty robot step");
        Ok(step)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;
    use rand::SeedableRng;

    use super::*;
    use crate::position::Tile;
    use crate::Rng;
    use crate::room::{EmptyRoom, FurnishedRoom};

    fn robot_at(x: Float, y: Float, direction: Float) -> RobotState {
        RobotState::new(Position::new(x, y), direction, 1.0, 1)
    }

    #[test]
    fn test_standard_robot_moves_and_cleans() {
        let mut rng = Rng::seed_from_u64(42);
        let mut room = EmptyRoom::new(5, 5, 2).expect("room");
        let mut robot = StandardRobot::new(robot_at(1.5, 1.5, 90.0));

        let step = robot
            .update_position_and_clean(&mut room, &mut rng)
            .expect("step failed");

        assert!(matches!(step, Step::MoveAndClean(_)));
        assert_abs_diff_eq!(robot.position().x(), 2.5, epsilon = 1e-12);
        assert_abs_diff_eq!(robot.position().y(), 1.5, epsilon = 1e-12);
        assert_eq!(robot.direction(), 90.0);
        assert_eq!(room.grid().dirt_amount(Tile::new(2, 1)).expect("dirt"), 1);
        assert_eq!(room.grid().dirt_amount(Tile::new(1, 1)).expect("dirt"), 2);
    }

    #[test]
    fn test_standard_robot_turns_at_wall() {
        let mut rng = Rng::seed_from_u64(42);
        let mut room = EmptyRoom::new(5, 5, 2).expect("room");
        let mut robot = StandardRobot::new(robot_at(4.5, 1.5, 90.0));

        let step = robot
            .update_position_and_clean(&mut room, &mut rng)
            .expect("step failed");

        match step {
            Step::TurnOnly(direction) => {
                assert!((0.0..360.0).contains(&direction));
                assert_eq!(robot.direction(), direction);
            }
            Step::MoveAndClean(pos) => panic!("should not move, moved to {}", pos),
        }
        assert_eq!(robot.position(), Position::new(4.5, 1.5));
        assert_eq!(room.num_cleaned_tiles(), 0);
        assert_eq!(room.grid().dirt_amount(Tile::new(4, 1)).expect("dirt"), 2);
    }

    #[test]
    fn test_standard_robot_turns_at_furniture() {
        let mut rng = Rng::seed_from_u64(42);
        let mut room = FurnishedRoom::new(5, 5, 2).expect("room");
        room.add_furniture_tiles([Tile::new(2, 1)])
            .expect("furnish failed");
        let mut robot = StandardRobot::new(robot_at(1.5, 1.5, 90.0));

        let step = robot
            .update_position_and_clean(&mut room, &mut rng)
            .expect("step failed");

        assert!(matches!(step, Step::TurnOnly(_)));
        assert_eq!(robot.position(), Position::new(1.5, 1.5));
    }

    #[test]
    fn test_always_faulty_robot_never_moves_or_cleans() {
        let mut rng = Rng::seed_from_u64(42);
        let mut room = EmptyRoom::new(5, 5, 1).expect("room");
        let mut robot = FaultyRobot::new(robot_at(2.5, 2.5, 0.0), 1.0).expect("robot");

        for _ in 0..100 {
            let step = robot
                .update_position_and_clean(&mut room, &mut rng)
                .expect("step failed");
            assert!(matches!(step, Step::TurnOnly(_)));
        }
        assert_eq!(robot.position(), Position::new(2.5, 2.5));
        assert_eq!(room.num_cleaned_tiles(), 0);
    }

    #[test]
    fn test_never_faulty_robot_moves_when_it_can() {
        let mut rng = Rng::seed_from_u64(42);
        let mut room = EmptyRoom::new(5, 5, 1).expect("room");
        let mut robot = FaultyRobot::new(robot_at(0.5, 0.5, 0.0), 0.0).expect("robot");

        for expected_y in [1.5, 2.5, 3.5, 4.5] {
            let step = robot
                .update_position_and_clean(&mut room, &mut rng)
                .expect("step failed");
            assert!(matches!(step, Step::MoveAndClean(_)));
            assert_abs_diff_eq!(robot.position().y(), expected_y, epsilon = 1e-12);
        }
        assert_eq!(room.num_cleaned_tiles(), 4);
    }

    #[test]
    fn test_gets_faulty_rate_matches_probability() {
        let mut rng = Rng::seed_from_u64(42);
        let robot = FaultyRobot::new(robot_at(2.5, 2.5, 0.0), 0.15).expect("robot");

        let draws = 10_000;
        let faulty = (0..draws).filter(|_| robot.gets_faulty(&mut rng)).count();

        assert_abs_diff_eq!(faulty as Float / draws as Float, 0.15, epsilon = 0.02);
    }

    #[test]
    fn test_turn_only_step_leaves_dirt_unchanged() {
        let mut rng = Rng::seed_from_u64(7);
        let mut room = EmptyRoom::new(10, 10, 100).expect("room");
        let mut robot = FaultyRobot::new(robot_at(5.5, 5.5, 0.0), 0.5).expect("robot");

        let mut turns = 0;
        for _ in 0..200 {
            let tile = robot.position().tile().expect("robot in room");
            let before: Vec<(Tile, u32)> = room.grid().tiles().collect();
            let step = robot
                .update_position_and_clean(&mut room, &mut rng)
                .expect("step failed");
            if let Step::TurnOnly(_) = step {
                turns += 1;
                let after: Vec<(Tile, u32)> = room.grid().tiles().collect();
                assert_eq!(before, after);
                assert_eq!(robot.position().tile(), Some(tile));
            }
        }
        assert!(turns > 0);
    }

    #[test]
    fn test_faulty_probability_must_be_a_probability() {
        assert!(FaultyRobot::new(robot_at(0.5, 0.5, 0.0), 1.5).is_err());
        let mut robot = FaultyRobot::new(robot_at(0.5, 0.5, 0.0), 0.5).expect("robot");
        assert!(robot.set_faulty_probability(-0.1).is_err());
        assert_eq!(robot.faulty_probability(), 0.5);
        robot.set_faulty_probability(0.25).expect("set failed");
        assert_eq!(robot.faulty_probability(), 0.25);
    }

    #[test]
    fn test_params_validation() {
        assert!(RobotParams::new(1.0, 1).validate().is_ok());
        assert!(RobotParams::new(0.0, 1).validate().is_err());
        assert!(RobotParams::new(Float::NAN, 1).validate().is_err());
        assert!(RobotParams::new(1.0, 0).validate().is_err());
        assert!(RobotParams::new(1.0, 1)
            .with_faulty_probability(2.0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_direction_is_normalized() {
        let mut state = robot_at(0.5, 0.5, 360.0);
        assert_eq!(state.direction(), 0.0);
        state.set_direction(-90.0);
        assert_eq!(state.direction(), 270.0);
    }

    proptest! {
        #[test]
        fn test_spawned_robot_is_valid(seed in 0..1000u64, width in 2..15usize, height in 2..15usize) {
            let mut rng = Rng::seed_from_u64(seed);
            let mut room = FurnishedRoom::new(width, height, 1).expect("room");
            room.add_furniture_to_room(&mut rng).expect("furnish failed");
            let robot = StandardRobot::spawn(&room, &RobotParams::new(1.0, 1), &mut rng)
                .expect("spawn failed");
            assert!(room.is_position_valid(&robot.position()));
            assert!((0.0..360.0).contains(&robot.direction()));
        }

        #[test]
        fn test_robot_always_stays_valid(seed in 0..200u64, speed in 0.1..3.0f64) {
            let mut rng = Rng::seed_from_u64(seed);
            let mut room = FurnishedRoom::new(6, 4, 3).expect("room");
            room.add_furniture_to_room(&mut rng).expect("furnish failed");
            let params = RobotParams::new(speed, 1).with_faulty_probability(0.3);
            let mut robot = FaultyRobot::spawn(&room, &params, &mut rng).expect("spawn failed");
            for _ in 0..200 {
                robot.update_position_and_clean(&mut room, &mut rng).expect("step failed");
                assert!(room.is_position_valid(&robot.position()));
            }
        }
    }
}

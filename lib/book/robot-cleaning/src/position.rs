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

//! Continuous positions and the integer tiles they fall on.

use serde::{Deserialize, Serialize};

use crate::Float;

/// Integer coordinate of a tile. Tile (x, y) covers the square [x, x + 1) x [y, y + 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tile {
    /// Column, counted from the left wall.
    pub x: usize,

    /// Row, counted from the bottom wall.
    pub y: usize,
}

impl Tile {
    /// Create a new tile coordinate.
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// A location in a two-dimensional room, with continuous coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    x: Float,
    y: Float,
}

impl Position {
    /// Create a new position.
    pub fn new(x: Float, y: Float) -> Self {
        Self { x, y }
    }

    /// x coordinate.
    pub fn x(&self) -> Float {
        self.x
    }

    /// y coordinate.
    pub fn y(&self) -> Float {
        self.y
    }

    /// Position after a single clock tick starting here, heading `angle` degrees at `speed`.
    ///
    /// An angle of 0 points along +y and 90 along +x. Does NOT check whether the returned position
    /// fits inside any room.
    pub fn new_position(&self, angle: Float, speed: Float) -> Self {
        let radians = angle.to_radians();
        let delta_x = speed * radians.sin();
        let delta_y = speed * radians.cos();
        Self::new(self.x + delta_x, self.y + delta_y)
    }

    /// Tile under this position, or `None` if a coordinate is negative or not finite.
    pub fn tile(&self) -> Option<Tile> {
        if !self.x.is_finite() || !self.y.is_finite() || self.x < 0.0 || self.y < 0.0 {
            return None;
        }
        Some(Tile::new(self.x.floor() as usize, self.y.floor() as usize))
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Position: {}, {}", self.x.floor(), self.y.floor())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_zero_degrees_moves_up() {
        let next = Position::new(1.0, 1.0).new_position(0.0, 2.0);
        assert_abs_diff_eq!(next.x(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(next.y(), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_ninety_degrees_moves_right() {
        let next = Position::new(1.0, 1.0).new_position(90.0, 1.5);
        assert_abs_diff_eq!(next.x(), 2.5, epsilon = 1e-12);
        assert_abs_diff_eq!(next.y(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_two_hundred_seventy_degrees_moves_left() {
        let next = Position::new(3.0, 2.0).new_position(270.0, 1.0);
        assert_abs_diff_eq!(next.x(), 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(next.y(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_tile_floors_coordinates() {
        assert_eq!(Position::new(0.0, 0.0).tile(), Some(Tile::new(0, 0)));
        assert_eq!(Position::new(2.99, 4.01).tile(), Some(Tile::new(2, 4)));
    }

    #[test]
    fn test_tile_of_negative_or_nan_position_is_none() {
        assert_eq!(Position::new(-0.1, 1.0).tile(), None);
        assert_eq!(Position::new(1.0, -3.0).tile(), None);
        assert_eq!(Position::new(Float::NAN, 1.0).tile(), None);
        assert_eq!(Position::new(1.0, Float::INFINITY).tile(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Position::new(3.7, 0.2).to_string(), "Position: 3, 0");
    }

    proptest! {
        #[test]
        fn test_new_position_follows_trig_displacement(
            x in 0.0..100.0f64,
            y in 0.0..100.0f64,
            angle in 0.0..360.0f64,
            speed in 0.01..10.0f64,
        ) {
            let start = Position::new(x, y);
            let next = start.new_position(angle, speed);
            let dx = next.x() - x;
            let dy = next.y() - y;
            assert_abs_diff_eq!(dx, speed * angle.to_radians().sin(), epsilon = 1e-9);
            assert_abs_diff_eq!(dy, speed * angle.to_radians().cos(), epsilon = 1e-9);
            assert_abs_diff_eq!((dx * dx + dy * dy).sqrt(), speed, epsilon = 1e-9);
        }
    }
}

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

//! Rooms: a rectangular grid of dirty tiles, optionally with furniture the robots can't enter.

use std::fmt;

use rand::Rng as _;
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::position::{Position, Tile};
use crate::{Float, Result, RobotCleaningError, Rng};

/// A Room is what robots clean. Every room is backed by a [`RectangularRoom`] holding the dirt;
/// variants decide which tiles are accessible.
///
/// Notice that coverage only counts accessible tiles. A furnished tile can never be cleaned, so
/// counting it would make full coverage unreachable.
pub trait Room {
    /// The tile grid backing this room.
    fn grid(&self) -> &RectangularRoom;

    /// Mutable access to the tile grid.
    fn grid_mut(&mut self) -> &mut RectangularRoom;

    /// Whether a robot may stand on `tile`.
    fn is_tile_accessible(&self, tile: Tile) -> bool;

    /// Number of accessible tiles.
    fn num_tiles(&self) -> usize;

    /// True if `pos` is in the room and a robot may stand there.
    fn is_position_valid(&self, pos: &Position) -> bool;

    /// A uniformly random valid position.
    fn random_position(&self, rng: &mut Rng) -> Result<Position>;

    /// Number of accessible tiles without any dirt.
    fn num_cleaned_tiles(&self) -> usize {
        self.grid()
            .tiles()
            .filter(|&(tile, dirt)| dirt == 0 && self.is_tile_accessible(tile))
            .count()
    }

    /// Fraction of accessible tiles that are clean. A room without accessible tiles is fully
    /// covered.
    fn coverage(&self) -> Float {
        let num_tiles = self.num_tiles();
        if num_tiles == 0 {
            return 1.0;
        }
        self.num_cleaned_tiles() as Float / num_tiles as Float
    }

    /// Remove `capacity` dirt from the tile under `pos`, see
    /// [`RectangularRoom::clean_tile_at_position`].
    fn clean_tile_at_position(&mut self, pos: &Position, capacity: i32) -> Result<()> {
        self.grid_mut().clean_tile_at_position(pos, capacity)
    }
}

/// A width x height grid of tiles, each with some amount of dirt. A tile is clean only when its
/// dirt is 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RectangularRoom {
    width: usize,
    height: usize,

    /// Dirt per tile, row major starting from the bottom row.
    dirt: Vec<u32>,
}

impl RectangularRoom {
    /// Create a room where every tile holds `dirt_amount` dirt.
    pub fn new(width: usize, height: usize, dirt_amount: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(RobotCleaningError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            dirt: vec![dirt_amount; width * height],
        })
    }

    /// Width in tiles.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in tiles.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of tiles in the grid, accessible or not.
    pub fn total_tiles(&self) -> usize {
        self.dirt.len()
    }

    fn index(&self, tile: Tile) -> Result<usize> {
        if tile.x >= self.width || tile.y >= self.height {
            return Err(RobotCleaningError::TileOutsideRoom {
                x: tile.x,
                y: tile.y,
            });
        }
        Ok(tile.x + self.width * tile.y)
    }

    /// All tiles with their dirt, bottom row first.
    pub fn tiles(&self) -> impl Iterator<Item = (Tile, u32)> + '_ {
        self.dirt
            .iter()
            .enumerate()
            .map(move |(i, &dirt)| (Tile::new(i % self.width, i / self.width), dirt))
    }

    /// Amount of dirt on `tile`.
    pub fn dirt_amount(&self, tile: Tile) -> Result<u32> {
        Ok(self.dirt[self.index(tile)?])
    }

    /// True if `tile` has no dirt left.
    pub fn is_tile_cleaned(&self, tile: Tile) -> Result<bool> {
        Ok(self.dirt_amount(tile)? == 0)
    }

    /// Number of tiles in the grid without dirt.
    pub fn num_cleaned_tiles(&self) -> usize {
        self.dirt.iter().filter(|&&dirt| dirt == 0).count()
    }

    /// True if `pos` lies inside the walls. The far walls are excluded so that every position in
    /// the room falls on one of its tiles.
    pub fn is_position_in_room(&self, pos: &Position) -> bool {
        (0.0..self.width as Float).contains(&pos.x())
            && (0.0..self.height as Float).contains(&pos.y())
    }

    /// A uniformly random position inside the walls.
    pub fn random_position(&self, rng: &mut Rng) -> Position {
        let x = rng.gen_range(0.0..self.width as Float);
        let y = rng.gen_range(0.0..self.height as Float);
        Position::new(x, y)
    }

    /// Mark the tile under `pos` as cleaned by `capacity` dirt, flooring at zero. A negative
    /// capacity adds dirt instead.
    pub fn clean_tile_at_position(&mut self, pos: &Position, capacity: i32) -> Result<()> {
        let outside = || RobotCleaningError::PositionOutsideRoom {
            x: pos.x(),
            y: pos.y(),
        };
        if !self.is_position_in_room(pos) {
            return Err(outside());
        }
        let tile = pos.tile().ok_or_else(outside)?;
        let i = self.index(tile)?;
        self.dirt[i] = cleaned_dirt(self.dirt[i], capacity);
        Ok(())
    }
}

/// max(0, dirt - capacity), saturating instead of overflowing for huge negative capacities.
fn cleaned_dirt(dirt: u32, capacity: i32) -> u32 {
    let remaining = (i64::from(dirt) - i64::from(capacity)).max(0);
    u32::try_from(remaining).unwrap_or(u32::MAX)
}

/// A room with no furniture. Every tile is accessible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyRoom {
    grid: RectangularRoom,
}

impl EmptyRoom {
    /// Create an empty room where every tile holds `dirt_amount` dirt.
    pub fn new(width: usize, height: usize, dirt_amount: u32) -> Result<Self> {
        Ok(Self {
            grid: RectangularRoom::new(width, height, dirt_amount)?,
        })
    }
}

impl Room for EmptyRoom {
    fn grid(&self) -> &RectangularRoom {
        &self.grid
    }

    fn grid_mut(&mut self) -> &mut RectangularRoom {
        &mut self.grid
    }

    fn is_tile_accessible(&self, tile: Tile) -> bool {
        tile.x < self.grid.width && tile.y < self.grid.height
    }

    fn num_tiles(&self) -> usize {
        self.grid.total_tiles()
    }

    fn is_position_valid(&self, pos: &Position) -> bool {
        self.grid.is_position_in_room(pos)
    }

    fn random_position(&self, rng: &mut Rng) -> Result<Position> {
        Ok(self.grid.random_position(rng))
    }

    fn num_cleaned_tiles(&self) -> usize {
        self.grid.num_cleaned_tiles()
    }
}

/// A room with furniture on some of its tiles. Robots can't land on furnished tiles, and those
/// tiles don't count towards coverage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FurnishedRoom {
    grid: RectangularRoom,
    furniture: FxHashSet<Tile>,
}

impl FurnishedRoom {
    /// Create a room without any furniture yet, see [`FurnishedRoom::add_furniture_to_room`].
    pub fn new(width: usize, height: usize, dirt_amount: u32) -> Result<Self> {
        Ok(Self {
            grid: RectangularRoom::new(width, height, dirt_amount)?,
            furniture: FxHashSet::default(),
        })
    }

    /// Add a randomly sized and placed rectangular piece of furniture.
    ///
    /// Its width and height are chosen so that it fits in the room without occupying all of it,
    /// then its bottom left corner is chosen so that the whole piece lies in the room.
    pub fn add_furniture_to_room(&mut self, rng: &mut Rng) -> Result<()> {
        let (width, height) = (self.grid.width, self.grid.height);
        if width < 2 || height < 2 {
            return Err(RobotCleaningError::RoomTooSmallForFurniture { width, height });
        }
        let furniture_width = rng.gen_range(1..width);
        let furniture_height = rng.gen_range(1..height);
        let bottom_left_x = rng.gen_range(0..=width - furniture_width);
        let bottom_left_y = rng.gen_range(0..=height - furniture_height);

        for x in bottom_left_x..bottom_left_x + furniture_width {
            for y in bottom_left_y..bottom_left_y + furniture_height {
                self.furniture.insert(Tile::new(x, y));
            }
        }
        debug!(
            furniture_width,
            furniture_height, bottom_left_x, bottom_left_y, "added furniture"
        );
        Ok(())
    }

    /// Furnish specific tiles. Fails without furnishing anything if a tile is outside the room.
    pub fn add_furniture_tiles<I>(&mut self, tiles: I) -> Result<()>
    where
        I: IntoIterator<Item = Tile>,
    {
        let tiles = tiles
            .into_iter()
            .map(|tile| self.grid.index(tile).map(|_| tile))
            .collect::<Result<Vec<Tile>>>()?;
        self.furniture.extend(tiles);
        Ok(())
    }

    /// Furnished tiles, in no particular order.
    pub fn furniture_tiles(&self) -> impl Iterator<Item = &Tile> {
        self.furniture.iter()
    }

    /// True if `tile` is furnished.
    pub fn is_tile_furnished(&self, tile: Tile) -> bool {
        self.furniture.contains(&tile)
    }

    /// True if the tile under `pos` is furnished.
    pub fn is_position_furnished(&self, pos: &Position) -> bool {
        pos.tile()
            .map(|tile| self.is_tile_furnished(tile))
            .unwrap_or(false)
    }
}

impl Room for FurnishedRoom {
    fn grid(&self) -> &RectangularRoom {
        &self.grid
    }

    fn grid_mut(&mut self) -> &mut RectangularRoom {
        &mut self.grid
    }

    fn is_tile_accessible(&self, tile: Tile) -> bool {
        tile.x < self.grid.width && tile.y < self.grid.height && !self.is_tile_furnished(tile)
    }

    fn num_tiles(&self) -> usize {
        self.grid.total_tiles() - self.furniture.len()
    }

    fn is_position_valid(&self, pos: &Position) -> bool {
        self.grid.is_position_in_room(pos) && !self.is_position_furnished(pos)
    }

    fn random_position(&self, rng: &mut Rng) -> Result<Position> {
        if self.num_tiles() == 0 {
            return Err(RobotCleaningError::NoValidPosition);
        }
        loop {
            let pos = self.grid.random_position(rng);
            if !self.is_position_furnished(&pos) {
                return Ok(pos);
            }
        }
    }
}

/// Draw the room top row first. Robots are drawn as `R`, furniture as `#`, clean tiles as `.`,
/// and dirty tiles as their dirt amount (`+` above 9).
pub(crate) fn write_grid<_Room>(
    room: &_Room,
    robots: &FxHashSet<Tile>,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result
where
    _Room: Room + ?Sized,
{
    let grid = room.grid();
    let mut s = String::with_capacity((grid.width + 1) * grid.height);
    for y in (0..grid.height).rev() {
        for x in 0..grid.width {
            let tile = Tile::new(x, y);
            let c = if robots.contains(&tile) {
                'R'
            } else if !room.is_tile_accessible(tile) {
                '#'
            } else {
                match grid.dirt[x + grid.width * y] {
                    0 => '.',
                    dirt @ 1..=9 => char::from_digit(dirt, 10).unwrap_or('+'),
                    _ => '+',
                }
            };
            s.push(c);
        }
        if y > 0 {
            s.push('\n');
        }
    }
    write!(f, "{}", s)
}

impl fmt::Display for EmptyRoom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_grid(self, &FxHashSet::default(), f)
    }
}

impl fmt::Display for FurnishedRoom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_grid(self, &FxHashSet::default(), f)
    }
}

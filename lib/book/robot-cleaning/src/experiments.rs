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

//! Experiments comparing the two robot strategies. Each returns a report with one series per
//! strategy, ready to be printed or dumped as JSON for plotting.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::SimulationConfig;
use crate::robot::RobotKind;
use crate::simulation::run_simulation_for;
use crate::{Float, Result, RobotCleaningError};

const STRATEGIES: [RobotKind; 2] = [RobotKind::Standard, RobotKind::Faulty];

/// One point of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Independent variable.
    pub x: Float,

    /// Mean time steps.
    pub y: Float,
}

/// Mean time steps of one strategy against the experiment's independent variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    /// Strategy name.
    pub label: String,

    /// Points in the order they were measured.
    pub points: Vec<Point>,
}

/// Everything needed to plot an experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentReport {
    /// Plot title.
    pub title: String,

    /// Label of the x axis.
    pub x_label: String,

    /// Label of the y axis.
    pub y_label: String,

    /// One series per strategy.
    pub series: Vec<Series>,
}

impl ExperimentReport {
    fn new(title: &str, x_label: &str, y_label: &str) -> Self {
        Self {
            title: title.to_string(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            series: STRATEGIES
                .iter()
                .map(|kind| Series {
                    label: kind.to_string(),
                    points: Vec::new(),
                })
                .collect(),
        }
    }

    fn measure(&mut self, x: Float, config: &SimulationConfig) -> Result<()> {
        for (series, kind) in self.series.iter_mut().zip(STRATEGIES) {
            let summary = run_simulation_for(kind, config)?;
            info!(
                experiment = %self.title,
                robot = %kind,
                x,
                mean_steps = summary.mean_steps,
                "measured point"
            );
            series.points.push(Point {
                x,
                y: summary.mean_steps,
            });
        }
        Ok(())
    }
}

// one row per x value, one column per series.
impl std::fmt::Display for ExperimentReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.title)?;
        write!(f, "{:>12}", self.x_label)?;
        for series in &self.series {
            write!(f, " {:>14}", series.label)?;
        }
        let rows = self
            .series
            .iter()
            .map(|series| series.points.len())
            .max()
            .unwrap_or(0);
        for row in 0..rows {
            writeln!(f)?;
            let x = self
                .series
                .iter()
                .find_map(|series| series.points.get(row))
                .map(|point| point.x)
                .unwrap_or(Float::NAN);
            write!(f, "{:>12.3}", x)?;
            for series in &self.series {
                match series.points.get(row) {
                    Some(point) => write!(f, " {:>14.2}", point.y)?,
                    None => write!(f, " {:>14}", "-")?,
                }
            }
        }
        Ok(())
    }
}

/// Mean time to clean for both strategies as the number of robots grows.
pub fn compare_strategies<I>(base: &SimulationConfig, robot_counts: I) -> Result<ExperimentReport>
where
    I: IntoIterator<Item = usize>,
{
    let mut report = ExperimentReport::new("Robots", "number of robots", "time to clean");
    for num_robots in robot_counts {
        let config = SimulationConfig {
            num_robots,
            ..base.clone()
        };
        report.measure(num_robots as Float, &config)?;
    }
    Ok(report)
}

/// Mean time to clean for both strategies as the room's aspect ratio changes while its area
/// stays roughly fixed. Each room is `width` x `area / width` tiles.
pub fn room_shape(base: &SimulationConfig, widths: &[usize], area: usize) -> Result<ExperimentReport> {
    let mut report = ExperimentReport::new(
        &format!("time to clean {}%", (base.min_coverage * 100.0).round()),
        "aspect ratio",
        "time",
    );
    for &width in widths {
        let height = if width == 0 { 0 } else { area / width };
        if height == 0 {
            return Err(RobotCleaningError::InvalidConfig(format!(
                "width {} leaves no room for an area of {}",
                width, area
            )));
        }
        let config = SimulationConfig {
            width,
            height,
            ..base.clone()
        };
        report.measure(width as Float / height as Float, &config)?;
    }
    Ok(report)
}

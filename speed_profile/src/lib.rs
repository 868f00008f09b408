/*
 * Copyright (c):
 * 2025 zephyrj
 * zephyrj@protonmail.com
 *
 * This file is part of lap-sim.
 *
 * lap-sim is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * lap-sim is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with lap-sim. If not, see <https://www.gnu.org/licenses/>.
 */

//! Quasi-steady-state speed profile of a vehicle along a fixed 3D path.

pub mod channels;
pub mod config;
pub mod context;
pub mod error;
pub mod geometry;
pub mod interpolate;
pub mod powertrain;
pub mod solver;

use tracing::info;
use crate::channels::SimulationChannel;
use crate::config::SimulationConfig;
use crate::context::SimulationContext;
use crate::error::Result;
use crate::geometry::Trajectory;
use crate::solver::diagnostics::DiagnosticCounters;
use crate::solver::SpeedProfileSolver;

pub use crate::error::SimulationError;

#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub channels: Vec<SimulationChannel>,
    pub diagnostics: DiagnosticCounters
}

impl SimulationResult {
    pub fn lap_time(&self) -> f64 {
        self.channels.last().map(|row| row.time).unwrap_or(0.0)
    }

    pub fn has_gear_channels(&self) -> bool {
        self.channels.first().map(|row| row.gear.is_some()).unwrap_or(false)
    }
}

/// Solve the speed profile along `trajectory` and derive the output channels
pub fn simulate(trajectory: &Trajectory, config: &SimulationConfig) -> Result<SimulationResult> {
    let context = SimulationContext::new(trajectory, config)?;
    let profile = SpeedProfileSolver::new(&context).solve()?;
    let channels = channels::assemble(&context, &profile.speeds);
    let result = SimulationResult { channels, diagnostics: profile.diagnostics };

    info!("Solved {} points in {:.3} s with {} corrections", trajectory.len(), result.lap_time(),
          result.diagnostics.total_corrections());
    for (method, count) in result.diagnostics.methods() {
        info!("{}: {}", method, count);
    }
    for (scope, count) in result.diagnostics.scopes() {
        info!("{}: {}", scope, count);
    }
    Ok(result)
}

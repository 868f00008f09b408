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

use std::result;

pub type Result<T> = result::Result<T, SimulationError>;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    #[error("invalid trajectory. `{0}`")]
    InvalidTrajectory(String),
    #[error("invalid vehicle parameters. `{0}`")]
    InvalidVehicle(String),
    #[error("invalid powertrain data. `{0}`")]
    InvalidPowertrain(String),
    #[error("grade of segment {segment} is outside the arcsine domain (dz/ds = {ratio})")]
    GradeOutOfDomain {
        segment: usize,
        ratio: f64
    },
    #[error("speed profile infeasible at index {index}. braking needs {required} m/s at the start but the initial speed is {initial} m/s")]
    Infeasible {
        index: usize,
        required: f64,
        initial: f64
    }
}

impl SimulationError {
    pub(crate) fn vehicle(details: impl Into<String>) -> SimulationError {
        SimulationError::InvalidVehicle(details.into())
    }

    pub(crate) fn powertrain(details: impl Into<String>) -> SimulationError {
        SimulationError::InvalidPowertrain(details.into())
    }
}

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

use std::io;
use config::ConfigError;
use thiserror::Error;
use speed_profile::SimulationError;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("failed to load settings. {0}")]
    Settings(#[from] ConfigError),
    #[error("invalid settings. {0}")]
    InvalidSettings(String),
    #[error("invalid lut. {0}")]
    Lut(String),
    #[error("simulation failed. {0}")]
    Simulation(#[from] SimulationError),
    #[error("csv error. {0}")]
    Csv(#[from] csv::Error),
    #[error("io error. {0}")]
    Io(#[from] io::Error)
}

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

//! Typed vehicle, grip and powertrain parameters for a simulation run.

use std::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};
use crate::error::{Result, SimulationError};
use crate::geometry::GradeClamp;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum DriveAxle {
    #[serde(rename = "FWD")]
    Front,
    #[serde(rename = "RWD")]
    Rear
}

impl DriveAxle {
    pub const FRONT_VALUE: &'static str = "FWD";
    pub const REAR_VALUE: &'static str = "RWD";

    pub fn as_str(&self) -> &'static str {
        match self {
            DriveAxle::Front => { DriveAxle::FRONT_VALUE }
            DriveAxle::Rear => { DriveAxle::REAR_VALUE }
        }
    }
}

impl Display for DriveAxle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleConfig {
    /// kg
    pub mass: f64,
    pub lift_coefficient: f64,
    pub drag_coefficient: f64,
    /// m^2
    pub frontal_area: f64,
    pub rolling_resistance: f64,
    /// Distance from the rear axle to the centre of mass (m)
    pub rear_axle_to_cg: f64,
    /// Distance from the front axle to the centre of mass (m)
    pub front_axle_to_cg: f64,
    pub cg_height: f64,
    pub drive_axle: DriveAxle
}

/// Friction coefficients. `fx`/`mu` act longitudinally, `fy`/`nu` laterally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GripConfig {
    pub fx: f64,
    pub fy: f64,
    pub mu: f64,
    pub nu: f64,
    /// Braking deceleration as a fraction of `g * fx`
    pub braking_factor: f64
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeedLimits {
    pub initial_kmh: f64,
    pub max_kmh: f64
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowertrainConfig {
    pub engine_rpm: Vec<f64>,
    pub engine_power_cv: Vec<f64>,
    pub gear_ratios: Vec<f64>,
    pub final_drive: f64,
    /// m
    pub wheel_radius: f64
}

fn default_use_elevation() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub vehicle: VehicleConfig,
    pub grip: GripConfig,
    pub speeds: SpeedLimits,
    #[serde(default = "default_use_elevation")]
    pub use_elevation: bool,
    /// Constant power ceiling used when no powertrain is configured
    #[serde(default)]
    pub peak_power_cv: Option<f64>,
    #[serde(default)]
    pub powertrain: Option<PowertrainConfig>,
    #[serde(default)]
    pub grade_clamp: GradeClamp
}

fn check_positive(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(SimulationError::vehicle(format!("{} must be positive, got {}", name, value)));
    }
    Ok(())
}

fn check_non_negative(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(SimulationError::vehicle(format!("{} must not be negative, got {}", name, value)));
    }
    Ok(())
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<()> {
        let vehicle = &self.vehicle;
        check_positive("mass", vehicle.mass)?;
        check_non_negative("frontal area", vehicle.frontal_area)?;
        check_non_negative("rolling resistance", vehicle.rolling_resistance)?;
        check_positive("rear axle to cg", vehicle.rear_axle_to_cg)?;
        check_positive("front axle to cg", vehicle.front_axle_to_cg)?;
        check_non_negative("cg height", vehicle.cg_height)?;
        if !vehicle.lift_coefficient.is_finite() || !vehicle.drag_coefficient.is_finite() {
            return Err(SimulationError::vehicle("aero coefficients must be finite"));
        }

        let grip = &self.grip;
        check_positive("fx", grip.fx)?;
        check_positive("fy", grip.fy)?;
        check_positive("mu", grip.mu)?;
        check_positive("nu", grip.nu)?;
        check_positive("braking factor", grip.braking_factor)?;
        if vehicle.drive_axle == DriveAxle::Rear {
            let wheelbase_term = vehicle.front_axle_to_cg + vehicle.rear_axle_to_cg - vehicle.cg_height * grip.mu;
            if wheelbase_term <= 0.0 {
                return Err(SimulationError::vehicle(
                    format!("cg too high for a rear driven car. wheelbase - h*mu = {}", wheelbase_term)
                ));
            }
        }

        check_non_negative("initial speed", self.speeds.initial_kmh)?;
        check_positive("max speed", self.speeds.max_kmh)?;
        if self.speeds.initial_kmh > self.speeds.max_kmh {
            return Err(SimulationError::vehicle(format!(
                "initial speed {} km/h is above the max speed {} km/h", self.speeds.initial_kmh, self.speeds.max_kmh
            )));
        }
        if let Some(power) = self.peak_power_cv {
            check_positive("peak power", power)?;
        }
        if !(self.grade_clamp.limit > 0.0) {
            return Err(SimulationError::vehicle(format!("grade clamp must be positive, got {}", self.grade_clamp.limit)));
        }
        Ok(())
    }
}

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

//! Builds the composite power-versus-speed curve of a geared powertrain and the
//! vehicle speeds at which each gear hands over to the next.

use tracing::{debug, info, warn};
use utils::numeric::{is_strictly_increasing, linspace};
use utils::units::{rpm_to_wheel_speed, wheel_speed_to_rpm};
use crate::error::{Result, SimulationError};
use crate::interpolate::LinearInterpolator;

/// Samples per gear when looking for the shift point
pub const SHIFT_SEARCH_SAMPLES: usize = 1000;
/// Samples per gear in the composite curve
pub const COMPOSITE_SAMPLES_PER_GEAR: usize = 100;
/// Gap between the last sample of one gear and the first of the next
pub const GEAR_JOIN_OFFSET: f64 = 1e-4;
/// Lowest engine speed reported in the rpm channel
pub const IDLE_FLOOR_RPM: f64 = 1000.0;

#[derive(Debug, Clone)]
pub struct Gearing {
    pub gear_ratios: Vec<f64>,
    pub final_drive: f64,
    pub wheel_radius: f64
}

impl Gearing {
    pub fn validate(&self) -> Result<()> {
        if self.gear_ratios.is_empty() {
            return Err(SimulationError::powertrain("at least one gear ratio is needed"));
        }
        if self.gear_ratios.iter().any(|r| !r.is_finite() || *r <= 0.0) {
            return Err(SimulationError::powertrain("gear ratios must be positive"));
        }
        if self.gear_ratios.windows(2).any(|pair| pair[1] >= pair[0]) {
            return Err(SimulationError::powertrain(
                format!("gear ratios must be strictly decreasing. got {:?}", self.gear_ratios)
            ));
        }
        if !self.final_drive.is_finite() || self.final_drive <= 0.0 {
            return Err(SimulationError::powertrain(format!("invalid final drive {}", self.final_drive)));
        }
        if !self.wheel_radius.is_finite() || self.wheel_radius <= 0.0 {
            return Err(SimulationError::powertrain(format!("invalid wheel radius {}", self.wheel_radius)));
        }
        Ok(())
    }

    pub fn num_gears(&self) -> usize {
        self.gear_ratios.len()
    }

    pub fn engine_rpm_to_wheel_speed(&self, engine_rpm: f64, gear_idx: usize) -> f64 {
        rpm_to_wheel_speed(engine_rpm, self.wheel_radius, self.gear_ratios[gear_idx], self.final_drive)
    }

    pub fn wheel_speed_to_engine_rpm(&self, speed: f64, gear_idx: usize) -> f64 {
        wheel_speed_to_rpm(speed, self.wheel_radius, self.gear_ratios[gear_idx], self.final_drive)
    }
}

#[derive(Debug, Clone)]
pub struct PowerCurve {
    curve: LinearInterpolator,
    shift_speeds: Vec<f64>,
    gearing: Gearing
}

impl PowerCurve {
    /// Available power (W) at a vehicle speed, extrapolated outside the curve
    pub fn power_at(&self, speed: f64) -> f64 {
        self.curve.value_at(speed)
    }

    #[cfg(test)]
    pub fn speeds(&self) -> &[f64] {
        self.curve.xs()
    }

    /// Speed floor of gear 1, the shift speeds, then the ceiling of the top gear
    pub fn shift_speeds(&self) -> &[f64] {
        &self.shift_speeds
    }

    /// Gear number (from 1) selected at a vehicle speed: the highest gear whose
    /// shift speed lies below it.
    pub fn gear_for_speed(&self, speed: f64) -> usize {
        let inner = &self.shift_speeds[1..self.shift_speeds.len() - 1];
        for j in (0..inner.len()).rev() {
            if speed > inner[j] {
                return j + 2;
            }
        }
        1
    }

    pub fn gear_ratio(&self, gear: usize) -> f64 {
        self.gearing.gear_ratios[gear - 1]
    }

    pub fn engine_rpm(&self, speed: f64, gear: usize) -> f64 {
        self.gearing.wheel_speed_to_engine_rpm(speed, gear - 1).max(IDLE_FLOOR_RPM)
    }
}

/// Build the composite curve from an engine power table (`rpm` -> W) shared by
/// every gear.
pub fn build_power_curve(engine_rpm: &[f64], engine_power: &[f64], gearing: Gearing) -> Result<PowerCurve> {
    gearing.validate()?;
    let engine = LinearInterpolator::new(engine_rpm.to_vec(), engine_power.to_vec()).map_err(|e| {
        SimulationError::powertrain(format!("bad engine power table. {}", e))
    })?;
    let (min_rpm, max_rpm) = engine.x_range();
    let speed_range = |gear_idx: usize| {
        (gearing.engine_rpm_to_wheel_speed(min_rpm, gear_idx), gearing.engine_rpm_to_wheel_speed(max_rpm, gear_idx))
    };
    let gear_powers = |gear_idx: usize, speeds: &[f64]| -> Vec<f64> {
        speeds.iter().map(|v| engine.value_at(gearing.wheel_speed_to_engine_rpm(*v, gear_idx))).collect()
    };
    let gear_curve = |gear_idx: usize| -> Result<LinearInterpolator> {
        let (start, end) = speed_range(gear_idx);
        let speeds = linspace(start, end, SHIFT_SEARCH_SAMPLES);
        let powers = gear_powers(gear_idx, &speeds);
        LinearInterpolator::new(speeds, powers).map_err(|e| {
            SimulationError::powertrain(format!("gear {} curve. {}", gear_idx + 1, e))
        })
    };

    let mut shift_speeds = vec![speed_range(0).0];
    for gear_idx in 0..gearing.num_gears() - 1 {
        let lower = gear_curve(gear_idx)?;
        let upper = gear_curve(gear_idx + 1)?;
        let shift_speed = match lower.first_crossing(&upper) {
            Some(speed) => speed,
            None => {
                let fallback = (speed_range(gear_idx).1 + speed_range(gear_idx + 1).0) / 2.0;
                warn!("Gear {} and {} power curves don't cross. Shifting at {:.3} m/s",
                      gear_idx + 1, gear_idx + 2, fallback);
                fallback
            }
        };
        debug!("Shift {}->{} at {:.3} m/s", gear_idx + 1, gear_idx + 2, shift_speed);
        shift_speeds.push(shift_speed);
    }
    shift_speeds.push(speed_range(gearing.num_gears() - 1).1);
    if !is_strictly_increasing(&shift_speeds) {
        return Err(SimulationError::powertrain(
            format!("shift speeds are not strictly increasing. {:?}", shift_speeds)
        ));
    }

    let mut speeds = Vec::with_capacity(gearing.num_gears() * COMPOSITE_SAMPLES_PER_GEAR);
    let mut powers = Vec::with_capacity(gearing.num_gears() * COMPOSITE_SAMPLES_PER_GEAR);
    for gear_idx in 0..gearing.num_gears() {
        let gear_speeds = linspace(shift_speeds[gear_idx] + GEAR_JOIN_OFFSET,
                                   shift_speeds[gear_idx + 1],
                                   COMPOSITE_SAMPLES_PER_GEAR);
        powers.extend(gear_powers(gear_idx, &gear_speeds));
        speeds.extend(gear_speeds);
    }
    let curve = LinearInterpolator::new(speeds, powers).map_err(|e| {
        SimulationError::powertrain(format!("composite curve. {}", e))
    })?;
    info!("Built power curve over {} gears. Shift speeds {:?}", gearing.num_gears(), shift_speeds);
    Ok(PowerCurve { curve, shift_speeds, gearing })
}

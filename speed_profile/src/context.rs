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

//! Immutable per-run context: trajectory geometry plus every derived vehicle
//! coefficient the solver looks up by segment index.

use tracing::debug;
use utils::units::{cv_to_watts, kmh_to_ms};
use crate::config::{DriveAxle, GripConfig, SimulationConfig, VehicleConfig};
use crate::error::{Result, SimulationError};
use crate::geometry::{Trajectory, TrajectoryGeometry};
use crate::powertrain::{build_power_curve, Gearing, PowerCurve};

pub const GRAVITY: f64 = 9.81; // m/s^2
pub const AIR_DENSITY: f64 = 1.25; // kg/m^3
/// Equivalent mass over real mass, accounts for rotating drivetrain inertia
pub const EQUIVALENT_MASS_FACTOR: f64 = 1.05;
/// Added to the initial speed so power-limited acceleration is finite at standstill
pub const STANDSTILL_OFFSET: f64 = 1e-4;

#[derive(Debug, Clone)]
pub enum PowerSource {
    Unlimited,
    /// Constant power (W) at every speed
    Constant(f64),
    Geared(PowerCurve)
}

impl PowerSource {
    fn from_config(config: &SimulationConfig) -> Result<PowerSource> {
        if let Some(powertrain) = &config.powertrain {
            if powertrain.engine_rpm.len() != powertrain.engine_power_cv.len() {
                return Err(SimulationError::powertrain(
                    format!("{} rpm samples but {} power samples",
                            powertrain.engine_rpm.len(), powertrain.engine_power_cv.len())
                ));
            }
            let engine_power: Vec<f64> = powertrain.engine_power_cv.iter().map(|cv| cv_to_watts(*cv)).collect();
            let gearing = Gearing {
                gear_ratios: powertrain.gear_ratios.clone(),
                final_drive: powertrain.final_drive,
                wheel_radius: powertrain.wheel_radius
            };
            return Ok(PowerSource::Geared(build_power_curve(&powertrain.engine_rpm, &engine_power, gearing)?));
        }
        Ok(match config.peak_power_cv {
            Some(power_cv) => PowerSource::Constant(cv_to_watts(power_cv)),
            None => PowerSource::Unlimited
        })
    }

    /// Power (W) available at a vehicle speed, `None` when unlimited
    pub fn power_at(&self, speed: f64) -> Option<f64> {
        match self {
            PowerSource::Unlimited => None,
            PowerSource::Constant(power) => Some(*power),
            PowerSource::Geared(curve) => Some(curve.power_at(speed))
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimulationContext {
    pub geometry: TrajectoryGeometry,
    /// Grade plus rolling resistance per segment, scaled to the equivalent mass
    pub slopes: Vec<f64>,
    pub gravity: f64,
    pub mass: f64,
    pub equivalent_mass: f64,
    /// Lift force per speed squared (N s^2/m^2)
    pub lift_factor: f64,
    /// Net aero deceleration per speed squared (1/m)
    pub aero_deceleration: f64,
    pub initial_speed: f64,
    pub max_speed: f64,
    /// Braking deceleration magnitude (m/s^2)
    pub braking_limit: f64,
    pub power: PowerSource,
    vehicle: VehicleConfig,
    grip: GripConfig
}

impl SimulationContext {
    pub fn new(trajectory: &Trajectory, config: &SimulationConfig) -> Result<SimulationContext> {
        config.validate()?;
        let geometry = TrajectoryGeometry::extract(trajectory, config.use_elevation, config.grade_clamp)?;
        let power = PowerSource::from_config(config)?;

        let vehicle = config.vehicle.clone();
        let mass = vehicle.mass;
        let equivalent_mass = mass * EQUIVALENT_MASS_FACTOR;
        let lift_factor = vehicle.lift_coefficient * vehicle.frontal_area * AIR_DENSITY / 2.0;
        let drag_factor = vehicle.drag_coefficient * vehicle.frontal_area * AIR_DENSITY / 2.0;
        let aero_deceleration = (drag_factor - lift_factor * vehicle.rolling_resistance) / equivalent_mass;
        let longest = geometry.segment_lengths.iter().copied().fold(0.0, f64::max);
        if 1.0 + aero_deceleration * longest <= 0.0 {
            return Err(SimulationError::vehicle(
                format!("lift and rolling resistance outweigh drag over a {:.3} m segment", longest)
            ));
        }
        let slopes = geometry.grade_angles.iter().map(|angle| {
            (angle + vehicle.rolling_resistance * angle.cos()) * mass / equivalent_mass
        }).collect();

        let context = SimulationContext {
            slopes,
            gravity: GRAVITY,
            mass,
            equivalent_mass,
            lift_factor,
            aero_deceleration,
            initial_speed: kmh_to_ms(config.speeds.initial_kmh) + STANDSTILL_OFFSET,
            max_speed: kmh_to_ms(config.speeds.max_kmh),
            braking_limit: config.grip.braking_factor * GRAVITY * config.grip.fx,
            power,
            grip: config.grip.clone(),
            vehicle,
            geometry
        };
        debug!("Simulation context: {} points, k={:.6}, braking limit {:.3} m/s^2",
               context.num_points(), context.aero_deceleration, context.braking_limit);
        Ok(context)
    }

    pub fn num_points(&self) -> usize {
        self.geometry.num_points()
    }

    pub fn num_segments(&self) -> usize {
        self.geometry.segment_lengths.len()
    }

    pub fn power_curve(&self) -> Option<&PowerCurve> {
        match &self.power {
            PowerSource::Geared(curve) => Some(curve),
            _ => None
        }
    }

    fn grade_cos(&self, segment: usize) -> f64 {
        self.geometry.grade_angles[segment].cos()
    }

    /// Lateral acceleration the tyres can hold on `segment` at `speed`
    pub fn lateral_capacity(&self, segment: usize, speed: f64) -> f64 {
        self.grip.fy * (self.grip.nu * self.gravity * self.grade_cos(segment)
            - self.lift_factor * speed * speed / self.mass)
    }

    /// Longitudinal acceleration the driven axle can transmit on `segment` at
    /// `speed`, including static load transfer.
    pub fn longitudinal_capacity(&self, segment: usize, speed: f64) -> f64 {
        let mu = self.grip.mu;
        let normal = mu * self.gravity * self.grade_cos(segment) - mu * self.lift_factor * speed * speed / self.mass;
        let lt = self.vehicle.rear_axle_to_cg;
        let ld = self.vehicle.front_axle_to_cg;
        let h = self.vehicle.cg_height;
        match self.vehicle.drive_axle {
            DriveAxle::Front => lt * self.grip.fx * (normal / (ld + h * mu + lt)),
            DriveAxle::Rear => ld * self.grip.fx * (normal / (ld - h * mu + lt))
        }
    }

    /// Acceleration the power source allows at `speed`, infinite when unlimited
    pub fn power_limited_acceleration(&self, speed: f64) -> f64 {
        match self.power.power_at(speed) {
            None => f64::INFINITY,
            Some(power) => power.max(0.0) / (self.equivalent_mass * speed.max(STANDSTILL_OFFSET))
        }
    }
}

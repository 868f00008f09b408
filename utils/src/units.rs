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

/// Metric horsepower (cv/PS) in watts
pub const WATTS_PER_CV: f64 = 735.499;

pub fn cv_to_watts(power_cv: f64) -> f64 {
    power_cv * WATTS_PER_CV
}

pub fn kmh_to_ms(speed_kmh: f64) -> f64 {
    speed_kmh / 3.6
}

pub fn ms_to_kmh(speed_ms: f64) -> f64 {
    speed_ms * 3.6
}

/// Vehicle speed (m/s) for an engine speed through the given overall reduction
pub fn rpm_to_wheel_speed(engine_rpm: f64, wheel_radius: f64, gear_ratio: f64, final_drive: f64) -> f64 {
    (engine_rpm * std::f64::consts::PI * wheel_radius) / (30.0 * gear_ratio * final_drive)
}

/// Engine speed (rpm) needed to drive the wheels at `speed` (m/s)
pub fn wheel_speed_to_rpm(speed: f64, wheel_radius: f64, gear_ratio: f64, final_drive: f64) -> f64 {
    (speed * gear_ratio * final_drive * 30.0) / (wheel_radius * std::f64::consts::PI)
}

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

//! Segment kinematics. Speed-squared aero losses are averaged over the
//! segment, giving `v1^2 (1 + kD) = v0^2 (1 - kD) + 2 D a`.

use crate::context::STANDSTILL_OFFSET;
use crate::solver::diagnostics::CorrectionMethod;

/// Exit speed after `length` metres under a constant acceleration `accel`
/// plus aero deceleration `k * v^2`. Of the two roots of the relation the
/// non-negative one is returned, zero when the vehicle would stop.
pub fn exit_speed(entry_speed: f64, length: f64, k: f64, accel: f64) -> f64 {
    let squared = (entry_speed * entry_speed * (1.0 - k * length) + 2.0 * length * accel) / (1.0 + k * length);
    match squared > 0.0 {
        true => squared.sqrt(),
        false => 0.0
    }
}

/// Bounds on the speed reachable at the end of a segment
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ReachableSpeeds {
    /// Exit speed under full braking
    pub braking: f64,
    /// Exit speed under full drive
    pub driving: f64
}

impl ReachableSpeeds {
    pub fn new(entry_speed: f64, length: f64, k: f64, drive_accel: f64, brake_accel: f64) -> ReachableSpeeds {
        ReachableSpeeds {
            braking: exit_speed(entry_speed, length, k, brake_accel),
            driving: exit_speed(entry_speed, length, k, drive_accel)
        }
    }

    /// Speed to accept for the end of the segment given the highest speed
    /// allowed there. `None` when even full braking overshoots it.
    pub fn select(&self, target: f64) -> Option<f64> {
        if self.driving <= target {
            Some(self.driving)
        } else if self.braking <= target {
            Some(target)
        } else {
            None
        }
    }
}

/// Highest entry speed from which braking at `deceleration` (brake plus grade
/// and rolling terms, positive when slowing) still reaches `exit_speed` over
/// `length`, and the formula that produced it.
pub fn max_entry_speed(exit_speed: f64, length: f64, k: f64, deceleration: f64) -> (f64, CorrectionMethod) {
    let aero_term = k * length;
    let numerator = exit_speed * exit_speed * (1.0 + aero_term) + 2.0 * length * deceleration;
    match CorrectionMethod::select(aero_term, numerator) {
        CorrectionMethod::ModifiedTorricelli => {
            ((numerator / (1.0 - aero_term)).sqrt(), CorrectionMethod::ModifiedTorricelli)
        }
        CorrectionMethod::SpeedDifference => {
            let travel_speed = exit_speed.max(STANDSTILL_OFFSET);
            let entry = exit_speed + length * (deceleration + k * exit_speed * exit_speed) / travel_speed;
            (entry.max(0.0), CorrectionMethod::SpeedDifference)
        }
    }
}

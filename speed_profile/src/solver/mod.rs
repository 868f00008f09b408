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

//! Forward integration of the speed profile with backward braking
//! corrections whenever a segment can't be slowed enough to meet the speed
//! allowed at its end.

pub mod diagnostics;
pub mod kinematics;

use tracing::{debug, trace};
use crate::context::SimulationContext;
use crate::error::{Result, SimulationError};
use crate::solver::diagnostics::{CorrectionScope, DiagnosticCounters};
use crate::solver::kinematics::{max_entry_speed, ReachableSpeeds};

/// Slack allowed when checking an entry speed against the braking limit
const CORRECTION_TOLERANCE: f64 = 1e-9;

/// Solved speeds, one per trajectory point, and the correction counters
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedProfile {
    pub speeds: Vec<f64>,
    pub diagnostics: DiagnosticCounters
}

pub struct SpeedProfileSolver<'a> {
    context: &'a SimulationContext,
    speeds: Vec<f64>,
    diagnostics: DiagnosticCounters
}

impl<'a> SpeedProfileSolver<'a> {
    pub fn new(context: &'a SimulationContext) -> SpeedProfileSolver<'a> {
        let mut speeds = vec![0.0; context.num_points()];
        speeds[0] = context.initial_speed;
        SpeedProfileSolver {
            context,
            speeds,
            diagnostics: DiagnosticCounters::default()
        }
    }

    pub fn solve(mut self) -> Result<SpeedProfile> {
        for segment in 0..self.context.num_segments() {
            self.step(segment)?;
        }
        Ok(SpeedProfile {
            speeds: self.speeds,
            diagnostics: self.diagnostics
        })
    }

    /// Highest speed allowed at the end of `segment` given the lateral
    /// capacity at `speed`.
    fn target_speed(&self, segment: usize, lateral_capacity: f64) -> f64 {
        let radius = self.context.geometry.radius_ahead_of(segment);
        let cornering = match lateral_capacity > 0.0 {
            true => (lateral_capacity * radius).sqrt(),
            false => 0.0
        };
        cornering.min(self.context.max_speed)
    }

    /// Share of the longitudinal grip left over once cornering takes its share
    fn ellipse_factor(&self, segment: usize, speed: f64, lateral_capacity: f64) -> f64 {
        if lateral_capacity <= 0.0 {
            return 0.0;
        }
        let radius = self.context.geometry.radius_ahead_of(segment);
        let usage = (speed * speed / radius) / lateral_capacity;
        (1.0 - usage * usage).max(0.0).sqrt()
    }

    fn reachable_speeds(&self, segment: usize, speed: f64, lateral_capacity: f64) -> ReachableSpeeds {
        let context = self.context;
        let length = context.geometry.segment_lengths[segment];
        let grade = context.gravity * context.slopes[segment];
        let traction = context.longitudinal_capacity(segment, speed).max(0.0)
            * self.ellipse_factor(segment, speed, lateral_capacity);
        let drive = traction.min(context.power_limited_acceleration(speed)) - grade;
        let brake = -context.braking_limit - grade;
        ReachableSpeeds::new(speed, length, context.aero_deceleration, drive, brake)
    }

    fn step(&mut self, segment: usize) -> Result<()> {
        let speed = self.speeds[segment];
        let lateral_capacity = self.context.lateral_capacity(segment, speed);
        let target = self.target_speed(segment, lateral_capacity);
        let reachable = self.reachable_speeds(segment, speed, lateral_capacity);
        trace!("Segment {}: v={:.4} target={:.4} reachable={:?}", segment, speed, target, reachable);

        match reachable.select(target) {
            Some(next) => {
                self.speeds[segment + 1] = next;
                Ok(())
            }
            None => {
                self.correct_backwards(segment, target)?;
                self.speeds[segment + 1] = target;
                Ok(())
            }
        }
    }

    /// Lower the entry speeds from `failing` backwards until braking can meet
    /// `target` at the end of the failing segment. Entries are only ever
    /// lowered. Fails when the initial speed itself would need lowering.
    fn correct_backwards(&mut self, failing: usize, target: f64) -> Result<()> {
        let context = self.context;
        let mut downstream = target;
        let mut index = failing;
        let mut revised: usize = 0;
        loop {
            let length = context.geometry.segment_lengths[index];
            let deceleration = context.braking_limit + context.gravity * context.slopes[index];
            let (entry, method) = max_entry_speed(downstream, length, context.aero_deceleration, deceleration);
            self.diagnostics.record_method(method);
            if self.speeds[index] <= entry + CORRECTION_TOLERANCE {
                break;
            }
            if index == 0 {
                return Err(SimulationError::Infeasible {
                    index: failing,
                    required: entry,
                    initial: self.speeds[0]
                });
            }
            trace!("Lowering v[{}] from {:.4} to {:.4} ({})", index, self.speeds[index], entry, method);
            self.speeds[index] = entry;
            revised += 1;
            downstream = entry;
            index -= 1;
        }

        let scope = CorrectionScope::from_revised_before(revised.saturating_sub(1));
        self.diagnostics.record_scope(scope);
        debug!("{} at segment {}: {} entries lowered for target {:.3} m/s", scope, failing, revised, target);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::tests::test_config;
    use crate::context::SimulationContext;
    use crate::error::SimulationError;
    use crate::geometry::{Point, Trajectory};
    use crate::solver::diagnostics::{CorrectionMethod, CorrectionScope};
    use crate::solver::SpeedProfileSolver;

    const BRAKE: f64 = 0.8 * 9.81 * 1.5;

    fn straight(points: usize, spacing: f64) -> Trajectory {
        Trajectory::new((0..points).map(|i| Point::new(i as f64 * spacing, 0.0, 0.0)).collect()).unwrap()
    }

    /// Long straight running into a 10 m radius arc
    fn straight_into_hairpin() -> Trajectory {
        let mut points: Vec<Point> = (0..41).map(|i| Point::new(-200.0 + 5.0 * i as f64, 0.0, 0.0)).collect();
        let step = 2.0 * 0.25f64.asin();
        for k in 1..=8 {
            let theta = step * k as f64;
            points.push(Point::new(10.0 * theta.sin(), -10.0 + 10.0 * theta.cos(), 0.0));
        }
        Trajectory::new(points).unwrap()
    }

    /// Cornering at the end of each segment stays within the lateral grip
    /// available at its entry speed
    fn assert_corners_within_grip(context: &SimulationContext, speeds: &[f64]) {
        for (segment, radius) in context.geometry.curvature_radii.iter().enumerate() {
            let exit = speeds[segment + 1];
            let capacity = context.lateral_capacity(segment, speeds[segment]);
            assert!(exit * exit / radius <= capacity + 1e-9,
                    "segment {}: {} > {}", segment, exit * exit / radius, capacity);
        }
    }

    #[test]
    fn local_correction_lowers_only_the_failing_entry() {
        let context = SimulationContext::new(&straight(4, 5.0), &test_config(0.0, 180.0)).unwrap();
        let mut solver = SpeedProfileSolver::new(&context);
        solver.speeds = vec![5.0, 20.0, 0.0, 0.0];
        solver.correct_backwards(1, 9.9).unwrap();
        let expected = (9.9f64 * 9.9 + 2.0 * 5.0 * BRAKE).sqrt();
        assert!((solver.speeds[1] - expected).abs() < 1e-9);
        assert_eq!(solver.speeds[0], 5.0);
        assert_eq!(solver.diagnostics.scope_count(CorrectionScope::Local), 1);
        assert_eq!(solver.diagnostics.scope_count(CorrectionScope::Retroactive), 0);
        assert_eq!(solver.diagnostics.method_count(CorrectionMethod::ModifiedTorricelli), 2);
    }

    #[test]
    fn retroactive_correction_walks_back() {
        let context = SimulationContext::new(&straight(5, 5.0), &test_config(0.0, 180.0)).unwrap();
        let mut solver = SpeedProfileSolver::new(&context);
        let before = vec![5.0, 30.0, 30.0, 30.0, 0.0];
        solver.speeds = before.clone();
        solver.correct_backwards(3, 10.0).unwrap();
        let mut squared = 100.0;
        for index in (1..=3).rev() {
            squared += 2.0 * 5.0 * BRAKE;
            assert!((solver.speeds[index] - squared.sqrt()).abs() < 1e-9);
        }
        assert_eq!(solver.speeds[0], 5.0);
        for (after, before) in solver.speeds.iter().zip(before.iter()) {
            assert!(after <= before);
        }
        assert_eq!(solver.diagnostics.scope_count(CorrectionScope::Retroactive), 1);
        assert_eq!(solver.diagnostics.total_corrections(), 1);
    }

    #[test]
    fn correction_reaching_the_start_is_infeasible() {
        let context = SimulationContext::new(&straight(3, 5.0), &test_config(0.0, 180.0)).unwrap();
        let mut solver = SpeedProfileSolver::new(&context);
        solver.speeds = vec![30.0, 30.0, 0.0];
        match solver.correct_backwards(1, 0.0) {
            Err(SimulationError::Infeasible { index, required, initial }) => {
                assert_eq!(index, 1);
                assert_eq!(initial, 30.0);
                assert!((required - (4.0 * 5.0 * BRAKE).sqrt()).abs() < 1e-9);
            }
            other => panic!("expected infeasible, got {:?}", other)
        }
    }

    #[test]
    fn straight_run_reaches_and_holds_max_speed() {
        let context = SimulationContext::new(&straight(3, 100.0), &test_config(36.0, 180.0)).unwrap();
        let profile = SpeedProfileSolver::new(&context).solve().unwrap();
        assert_eq!(profile.speeds.len(), 3);
        assert!((profile.speeds[0] - 10.0001).abs() < 1e-9);
        assert!((profile.speeds[1] - 50.0).abs() < 1e-9);
        assert!((profile.speeds[2] - 50.0).abs() < 1e-9);
        assert_eq!(profile.diagnostics.total_corrections(), 0);
    }

    #[test]
    fn long_straight_is_non_decreasing_up_to_the_cap() {
        let mut config = test_config(0.0, 120.0);
        config.peak_power_cv = Some(80.0);
        config.vehicle.drag_coefficient = 0.3;
        let context = SimulationContext::new(&straight(200, 10.0), &config).unwrap();
        let profile = SpeedProfileSolver::new(&context).solve().unwrap();
        assert_eq!(profile.speeds.len(), 200);
        for pair in profile.speeds.windows(2) {
            assert!(pair[1] >= pair[0]);
        }
        assert!(*profile.speeds.last().unwrap() <= context.max_speed + 1e-9);
    }

    #[test]
    fn hairpin_forces_braking_ahead_of_the_corner() {
        let trajectory = straight_into_hairpin();
        let context = SimulationContext::new(&trajectory, &test_config(108.0, 180.0)).unwrap();
        let profile = SpeedProfileSolver::new(&context).solve().unwrap();
        assert_eq!(profile.speeds.len(), trajectory.len());
        assert!(profile.diagnostics.scope_count(CorrectionScope::Retroactive) > 0);
        assert_corners_within_grip(&context, &profile.speeds);
        // slower entering the arc than on the straight
        assert!(profile.speeds[41] < profile.speeds[20]);
    }

    #[test]
    fn hairpin_with_lift_stays_within_entry_grip() {
        let trajectory = straight_into_hairpin();
        let mut config = test_config(108.0, 180.0);
        config.vehicle.lift_coefficient = 3.0;
        let context = SimulationContext::new(&trajectory, &config).unwrap();
        let profile = SpeedProfileSolver::new(&context).solve().unwrap();
        assert_eq!(profile.speeds.len(), trajectory.len());
        assert!(profile.diagnostics.total_corrections() > 0);
        assert_corners_within_grip(&context, &profile.speeds);
    }

    #[test]
    fn tight_turn_straight_after_the_start_is_infeasible() {
        let trajectory = Trajectory::new(vec![
            Point::new(0.0, 0.0, 0.0), Point::new(1.0, 0.0, 0.0), Point::new(1.0, 1.0, 0.0)
        ]).unwrap();
        let context = SimulationContext::new(&trajectory, &test_config(144.0, 180.0)).unwrap();
        let result = SpeedProfileSolver::new(&context).solve();
        assert!(matches!(result, Err(SimulationError::Infeasible { index: 0, .. })));
    }
}

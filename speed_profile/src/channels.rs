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

//! Turns a solved speed profile into per-point output rows.

use serde::Serialize;
use utils::numeric::cumulative_sum;
use crate::context::{SimulationContext, STANDSTILL_OFFSET};

/// Row of the first point of segment sample `s` is `s + SEGMENT_ROW_OFFSET`
pub const SEGMENT_ROW_OFFSET: usize = 1;
/// Lateral acceleration of triplet `i` lands on row `i + LATERAL_ROW_OFFSET`
pub const LATERAL_ROW_OFFSET: usize = 1;
/// Curvature radius of triplet `i` lands on row `i + RADIUS_ROW_OFFSET`
pub const RADIUS_ROW_OFFSET: usize = 2;

/// Below this longitudinal acceleration a segment is timed at constant speed
const STEADY_ACCELERATION: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationChannel {
    pub distance: f64,
    pub speed: f64,
    pub lateral_acceleration: Option<f64>,
    pub longitudinal_acceleration: Option<f64>,
    pub curvature_radius: Option<f64>,
    pub time: f64,
    pub force: Option<f64>,
    pub gear: Option<usize>,
    pub gear_ratio: Option<f64>,
    pub rpm: Option<f64>
}

/// Place `samples` onto a table of `rows` rows starting at row `offset`.
/// Rows with no sample, and samples falling past the end, are dropped to `None`.
pub fn align(samples: &[f64], offset: usize, rows: usize) -> Vec<Option<f64>> {
    let mut aligned = vec![None; rows];
    for (i, sample) in samples.iter().enumerate() {
        if let Some(row) = aligned.get_mut(i + offset) {
            *row = Some(*sample);
        }
    }
    aligned
}

pub fn longitudinal_accelerations(speeds: &[f64], segment_lengths: &[f64]) -> Vec<f64> {
    segment_lengths.iter().enumerate().map(|(s, length)| {
        match *length > 0.0 {
            true => (speeds[s + 1] * speeds[s + 1] - speeds[s] * speeds[s]) / (2.0 * length),
            false => 0.0
        }
    }).collect()
}

/// Signed lateral acceleration at the middle point of each triplet
pub fn lateral_accelerations(speeds: &[f64], radii: &[f64], turn_signs: &[i8]) -> Vec<f64> {
    radii.iter().zip(turn_signs.iter()).enumerate().map(|(i, (radius, sign))| {
        speeds[i + 1] * speeds[i + 1] / radius * f64::from(*sign)
    }).collect()
}

/// Time taken over each segment
pub fn segment_times(speeds: &[f64], segment_lengths: &[f64], accelerations: &[f64]) -> Vec<f64> {
    segment_lengths.iter().zip(accelerations.iter()).enumerate().map(|(s, (length, accel))| {
        match accel.abs() < STEADY_ACCELERATION {
            true => length / speeds[s].max(STANDSTILL_OFFSET),
            false => (speeds[s + 1] - speeds[s]) / accel
        }
    }).collect()
}

/// Running total of `steps` with a leading zero, one entry per point
fn arrival_totals(steps: &[f64]) -> Vec<f64> {
    let mut totals = Vec::with_capacity(steps.len() + 1);
    totals.push(0.0);
    totals.extend(cumulative_sum(steps));
    totals
}

pub fn assemble(context: &SimulationContext, speeds: &[f64]) -> Vec<SimulationChannel> {
    let geometry = &context.geometry;
    let rows = speeds.len();
    let longitudinal = longitudinal_accelerations(speeds, &geometry.segment_lengths);
    let lateral = lateral_accelerations(speeds, &geometry.curvature_radii, &geometry.turn_signs);
    let times = segment_times(speeds, &geometry.segment_lengths, &longitudinal);

    let distance = arrival_totals(&geometry.segment_lengths);
    let time = arrival_totals(&times);
    let longitudinal = align(&longitudinal, SEGMENT_ROW_OFFSET, rows);
    let lateral = align(&lateral, LATERAL_ROW_OFFSET, rows);
    let radius = align(&geometry.curvature_radii, RADIUS_ROW_OFFSET, rows);
    let power_curve = context.power_curve();

    (0..rows).map(|row| {
        let speed = speeds[row];
        let gear = power_curve.map(|curve| curve.gear_for_speed(speed));
        SimulationChannel {
            distance: distance[row],
            speed,
            lateral_acceleration: lateral[row],
            longitudinal_acceleration: longitudinal[row],
            curvature_radius: radius[row],
            time: time[row],
            force: longitudinal[row].map(|accel| context.mass * accel),
            gear,
            gear_ratio: power_curve.zip(gear).map(|(curve, gear)| curve.gear_ratio(gear)),
            rpm: power_curve.zip(gear).map(|(curve, gear)| curve.engine_rpm(speed, gear))
        }
    }).collect()
}

#[cfg(test)]
mod tests {
    use crate::channels::{align, assemble, lateral_accelerations, longitudinal_accelerations, segment_times, LATERAL_ROW_OFFSET, RADIUS_ROW_OFFSET, SEGMENT_ROW_OFFSET};
    use crate::config::tests::test_config;
    use crate::context::SimulationContext;
    use crate::geometry::{Point, Trajectory};

    #[test]
    fn row_mapping() {
        assert_eq!(align(&[1.0, 2.0], SEGMENT_ROW_OFFSET, 3), vec![None, Some(1.0), Some(2.0)]);
        assert_eq!(align(&[1.0], LATERAL_ROW_OFFSET, 3), vec![None, Some(1.0), None]);
        assert_eq!(align(&[1.0], RADIUS_ROW_OFFSET, 3), vec![None, None, Some(1.0)]);
        assert_eq!(align(&[1.0, 2.0, 3.0], 2, 3), vec![None, None, Some(1.0)]);
        assert!(align(&[], 0, 0).is_empty());
    }

    #[test]
    fn longitudinal_acceleration_per_segment() {
        let accel = longitudinal_accelerations(&[10.0, 20.0, 20.0, 10.0], &[50.0, 0.0, 30.0]);
        assert!((accel[0] - 3.0).abs() < 1e-12);
        assert_eq!(accel[1], 0.0);
        assert!((accel[2] + 5.0).abs() < 1e-12);
    }

    #[test]
    fn lateral_acceleration_is_signed() {
        let lateral = lateral_accelerations(&[0.0, 10.0, 20.0, 0.0], &[50.0, 100.0], &[1, -1]);
        assert!((lateral[0] - 2.0).abs() < 1e-12);
        assert!((lateral[1] + 4.0).abs() < 1e-12);
        assert_eq!(lateral_accelerations(&[0.0, 10.0, 0.0], &[50.0], &[0]), vec![0.0]);
    }

    #[test]
    fn segment_times_steady_and_accelerating() {
        let speeds = [10.0, 10.0, 20.0];
        let lengths = [100.0, 150.0];
        let accel = longitudinal_accelerations(&speeds, &lengths);
        let times = segment_times(&speeds, &lengths, &accel);
        assert!((times[0] - 10.0).abs() < 1e-12);
        assert!((times[1] - 10.0).abs() < 1e-12);
    }

    #[test]
    fn assembled_rows() {
        let trajectory = Trajectory::new(vec![
            Point::new(0.0, 0.0, 0.0), Point::new(100.0, 0.0, 0.0),
            Point::new(200.0, 0.0, 0.0), Point::new(300.0, 0.0, 0.0)
        ]).unwrap();
        let context = SimulationContext::new(&trajectory, &test_config(36.0, 180.0)).unwrap();
        let channels = assemble(&context, &[10.0, 20.0, 20.0, 10.0]);
        assert_eq!(channels.len(), 4);

        assert_eq!(channels[0].distance, 0.0);
        assert_eq!(channels[0].time, 0.0);
        assert_eq!(channels[0].longitudinal_acceleration, None);
        assert_eq!(channels[0].lateral_acceleration, None);
        assert_eq!(channels[0].curvature_radius, None);
        assert_eq!(channels[0].force, None);
        assert_eq!(channels[0].gear, None);

        assert_eq!(channels[3].distance, 300.0);
        assert!((channels[1].longitudinal_acceleration.unwrap() - 1.5).abs() < 1e-12);
        assert!((channels[1].force.unwrap() - 1500.0).abs() < 1e-9);
        assert!((channels[1].time - 100.0 / 15.0).abs() < 1e-9);
        assert!((channels[2].time - (100.0 / 15.0 + 5.0)).abs() < 1e-9);
        assert_eq!(channels[1].lateral_acceleration, Some(0.0));
        assert_eq!(channels[3].lateral_acceleration, None);
        assert!(channels[1].curvature_radius.is_none());
        assert!(channels[2].curvature_radius.is_some());
        assert!(channels[3].curvature_radius.is_some());
    }
}

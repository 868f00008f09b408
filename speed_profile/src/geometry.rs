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

//! Geometry extraction over an ordered trajectory: segment lengths, curvature
//! radii from consecutive point triplets, road grade and turn direction.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use crate::error::{Result, SimulationError};

/// Radius reported for collinear or duplicated point triplets
pub const STRAIGHT_RADIUS: f64 = 1e10;

/// Largest representable road grade (radians)
pub const MAX_GRADE_ANGLE: f64 = 0.2;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64
}

impl Point {
    pub fn new(x: f64, y: f64, z: f64) -> Point {
        Point { x, y, z }
    }

    pub fn distance_to(&self, other: &Point, use_3d: bool) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let dz = if use_3d { other.z - self.z } else { 0.0 };
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

#[derive(Debug, Clone)]
pub struct Trajectory {
    points: Vec<Point>
}

impl Trajectory {
    pub const MIN_POINTS: usize = 3;

    pub fn new(points: Vec<Point>) -> Result<Trajectory> {
        if points.len() < Trajectory::MIN_POINTS {
            return Err(SimulationError::InvalidTrajectory(
                format!("at least {} points are needed, got {}", Trajectory::MIN_POINTS, points.len())
            ));
        }
        if let Some(idx) = points.iter().position(|p| !p.is_finite()) {
            return Err(SimulationError::InvalidTrajectory(format!("point {} is not finite", idx)));
        }
        Ok(Trajectory { points })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn altitudes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.z).collect()
    }
}

/// Grade clamp bound. The last `skip_tail` angles are left unclamped.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradeClamp {
    pub limit: f64,
    pub skip_tail: usize
}

impl Default for GradeClamp {
    fn default() -> Self {
        GradeClamp { limit: MAX_GRADE_ANGLE, skip_tail: 1 }
    }
}

pub fn segment_lengths(points: &[Point], use_3d: bool) -> Vec<f64> {
    points.iter().tuple_windows().map(|(a, b)| a.distance_to(b, use_3d)).collect()
}

/// Circumradius of the triangle through three points (Heron's formula).
pub fn circumradius(p0: &Point, p1: &Point, p2: &Point) -> f64 {
    let a = p0.distance_to(p1, true);
    let b = p1.distance_to(p2, true);
    let c = p0.distance_to(p2, true);
    let s = (a + b + c) / 2.0;
    let area_sq = s * (s - a) * (s - b) * (s - c);
    if area_sq <= 0.0 {
        return STRAIGHT_RADIUS;
    }
    (a * b * c / (4.0 * area_sq.sqrt())).min(STRAIGHT_RADIUS)
}

pub fn curvature_radii(points: &[Point]) -> Vec<f64> {
    points.iter().tuple_windows().map(|(p0, p1, p2)| circumradius(p0, p1, p2)).collect()
}

/// Grade angle of every segment, `asin(dz / length)`.
pub fn grade_angles(altitudes: &[f64], segment_lengths: &[f64], clamp: GradeClamp) -> Result<Vec<f64>> {
    if altitudes.len() != segment_lengths.len() + 1 {
        return Err(SimulationError::InvalidTrajectory(
            format!("{} altitudes don't match {} segments", altitudes.len(), segment_lengths.len())
        ));
    }
    let mut angles = Vec::with_capacity(segment_lengths.len());
    for (segment, (length, (z0, z1))) in segment_lengths.iter().zip(altitudes.iter().tuple_windows()).enumerate() {
        let dz = z1 - z0;
        if *length == 0.0 && dz == 0.0 {
            angles.push(0.0);
            continue;
        }
        let ratio = dz / length;
        // allow for rounding when the length already includes dz
        if !ratio.is_finite() || ratio.abs() > 1.0 + 1e-12 {
            return Err(SimulationError::GradeOutOfDomain { segment, ratio });
        }
        angles.push(ratio.clamp(-1.0, 1.0).asin());
    }
    let clamp_end = angles.len().saturating_sub(clamp.skip_tail);
    for angle in angles[..clamp_end].iter_mut() {
        *angle = angle.clamp(-clamp.limit, clamp.limit);
    }
    Ok(angles)
}

/// Sign of the homogeneous 3x3 determinant of a triplet in (y, x) order.
/// Positive for right-hand turns, negative for left-hand turns.
pub fn turn_sign(p0: &Point, p1: &Point, p2: &Point) -> i8 {
    let (a, b, c) = ((p0.y, p0.x), (p1.y, p1.x), (p2.y, p2.x));
    let det = a.0 * (b.1 - c.1) - a.1 * (b.0 - c.0) + (b.0 * c.1 - b.1 * c.0);
    if det > 0.0 {
        1
    } else if det < 0.0 {
        -1
    } else {
        0
    }
}

pub fn turn_signs(points: &[Point]) -> Vec<i8> {
    points.iter().tuple_windows().map(|(p0, p1, p2)| turn_sign(p0, p1, p2)).collect()
}

/// Everything the solver and the channel assembler need from the trajectory.
#[derive(Debug, Clone)]
pub struct TrajectoryGeometry {
    pub segment_lengths: Vec<f64>,
    pub curvature_radii: Vec<f64>,
    pub grade_angles: Vec<f64>,
    pub turn_signs: Vec<i8>
}

impl TrajectoryGeometry {
    pub fn extract(trajectory: &Trajectory, use_elevation: bool, clamp: GradeClamp) -> Result<TrajectoryGeometry> {
        let points = trajectory.points();
        let segment_lengths = segment_lengths(points, use_elevation);
        let grade_angles = match use_elevation {
            true => grade_angles(&trajectory.altitudes(), &segment_lengths, clamp)?,
            false => vec![0.0; segment_lengths.len()]
        };
        Ok(TrajectoryGeometry {
            curvature_radii: curvature_radii(points),
            turn_signs: turn_signs(points),
            segment_lengths,
            grade_angles
        })
    }

    pub fn num_points(&self) -> usize {
        self.segment_lengths.len() + 1
    }

    /// Radius constraining the speed at the end of `segment`. The final
    /// segment has no downstream triplet and counts as straight.
    pub fn radius_ahead_of(&self, segment: usize) -> f64 {
        self.curvature_radii.get(segment).copied().unwrap_or(STRAIGHT_RADIUS)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::SimulationError;
    use crate::geometry::{circumradius, curvature_radii, grade_angles, segment_lengths, turn_sign, turn_signs, GradeClamp, Point, Trajectory, TrajectoryGeometry, STRAIGHT_RADIUS};

    fn p(x: f64, y: f64, z: f64) -> Point {
        Point::new(x, y, z)
    }

    #[test]
    fn trajectory_needs_three_points() {
        let err = Trajectory::new(vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0)]).unwrap_err();
        assert!(matches!(err, SimulationError::InvalidTrajectory(_)));
        assert!(Trajectory::new(vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(2.0, 0.0, 0.0)]).is_ok());
    }

    #[test]
    fn trajectory_rejects_non_finite_points() {
        let err = Trajectory::new(vec![p(0.0, 0.0, 0.0), p(f64::NAN, 0.0, 0.0), p(2.0, 0.0, 0.0)]).unwrap_err();
        assert_eq!(err, SimulationError::InvalidTrajectory("point 1 is not finite".to_string()));
    }

    #[test]
    fn segment_lengths_with_and_without_elevation() {
        let points = [p(0.0, 0.0, 0.0), p(3.0, 4.0, 12.0), p(3.0, 4.0, 12.0)];
        assert_eq!(segment_lengths(&points, false), vec![5.0, 0.0]);
        assert_eq!(segment_lengths(&points, true), vec![13.0, 0.0]);
    }

    #[test]
    fn straight_triplet_is_sentinel_radius() {
        let radius = circumradius(&p(0.0, 0.0, 0.0), &p(100.0, 0.0, 0.0), &p(200.0, 0.0, 0.0));
        assert_eq!(radius, STRAIGHT_RADIUS);
        // duplicated points are degenerate too
        let radius = circumradius(&p(5.0, 5.0, 0.0), &p(5.0, 5.0, 0.0), &p(9.0, 1.0, 0.0));
        assert_eq!(radius, STRAIGHT_RADIUS);
    }

    #[test]
    fn equilateral_triangle_radius() {
        let side = 2.0;
        let radius = circumradius(&p(0.0, 0.0, 0.0), &p(side, 0.0, 0.0), &p(side / 2.0, side * 3f64.sqrt() / 2.0, 0.0));
        assert!((radius - side / 3f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn points_on_a_circle_give_its_radius() {
        let points: Vec<Point> = (0..6).map(|i| {
            let theta = i as f64 * 0.3;
            p(25.0 * theta.cos(), 25.0 * theta.sin(), 0.0)
        }).collect();
        let radii = curvature_radii(&points);
        assert_eq!(radii.len(), 4);
        for radius in radii {
            assert!((radius - 25.0).abs() < 1e-6);
        }
    }

    #[test]
    fn grade_angles_per_segment() {
        let lengths = [10.0, 10.0, 10.0];
        let angles = grade_angles(&[0.0, 1.0, 1.0, 0.0], &lengths, GradeClamp::default()).unwrap();
        assert_eq!(angles.len(), 3);
        assert!((angles[0] - 0.1f64.asin()).abs() < 1e-12);
        assert_eq!(angles[1], 0.0);
        assert!((angles[2] + 0.1f64.asin()).abs() < 1e-12);
    }

    #[test]
    fn grade_clamp_skips_the_tail() {
        let lengths = [10.0, 10.0, 10.0];
        let altitudes = [0.0, 5.0, 0.0, 5.0];
        let steep = 0.5f64.asin();

        let angles = grade_angles(&altitudes, &lengths, GradeClamp::default()).unwrap();
        assert_eq!(angles[0], 0.2);
        assert_eq!(angles[1], -0.2);
        assert!((angles[2] - steep).abs() < 1e-12);

        let clamp_all = GradeClamp { skip_tail: 0, ..GradeClamp::default() };
        let angles = grade_angles(&altitudes, &lengths, clamp_all).unwrap();
        assert_eq!(angles, vec![0.2, -0.2, 0.2]);

        let clamp_none = GradeClamp { skip_tail: 10, ..GradeClamp::default() };
        let angles = grade_angles(&altitudes, &lengths, clamp_none).unwrap();
        assert!((angles[1] + steep).abs() < 1e-12);
    }

    #[test]
    fn grade_outside_arcsine_domain_fails() {
        let err = grade_angles(&[0.0, 0.0, 20.0], &[10.0, 10.0], GradeClamp::default()).unwrap_err();
        assert_eq!(err, SimulationError::GradeOutOfDomain { segment: 1, ratio: 2.0 });
        let err = grade_angles(&[0.0, 1.0], &[0.0], GradeClamp::default()).unwrap_err();
        assert!(matches!(err, SimulationError::GradeOutOfDomain { segment: 0, .. }));
        assert_eq!(grade_angles(&[3.0, 3.0], &[0.0], GradeClamp::default()).unwrap(), vec![0.0]);
    }

    #[test]
    fn turn_sign_direction() {
        let straight = [p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(2.0, 0.0, 0.0)];
        let right = [p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(2.0, -1.0, 0.0)];
        let left = [p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(2.0, 1.0, 0.0)];
        assert_eq!(turn_signs(&straight), vec![0]);
        assert_eq!(turn_signs(&right), vec![1]);
        assert_eq!(turn_signs(&left), vec![-1]);
    }

    #[test]
    fn turn_sign_invariant_under_scale_and_translation() {
        let triplets = [
            [p(0.0, 0.0, 0.0), p(4.0, 1.0, 0.0), p(7.0, 5.0, 0.0)],
            [p(-3.0, 2.0, 0.0), p(1.0, -2.0, 0.0), p(2.0, 6.0, 0.0)],
        ];
        for [a, b, c] in triplets {
            let sign = turn_sign(&a, &b, &c);
            assert_ne!(sign, 0);
            let moved = |q: &Point| p(q.x * 3.5 + 120.0, q.y * 3.5 - 40.0, q.z);
            assert_eq!(turn_sign(&moved(&a), &moved(&b), &moved(&c)), sign);
            let mirrored = |q: &Point| p(-q.x, q.y, q.z);
            assert_eq!(turn_sign(&mirrored(&a), &mirrored(&b), &mirrored(&c)), -sign);
        }
    }

    #[test]
    fn geometry_extraction_lengths() {
        let trajectory = Trajectory::new(vec![p(0.0, 0.0, 0.0), p(10.0, 0.0, 1.0), p(20.0, 5.0, 1.0), p(30.0, 5.0, 0.5)]).unwrap();
        let geometry = TrajectoryGeometry::extract(&trajectory, true, GradeClamp::default()).unwrap();
        assert_eq!(geometry.num_points(), 4);
        assert_eq!(geometry.segment_lengths.len(), 3);
        assert_eq!(geometry.grade_angles.len(), 3);
        assert_eq!(geometry.curvature_radii.len(), 2);
        assert_eq!(geometry.turn_signs.len(), 2);
        assert_eq!(geometry.radius_ahead_of(2), STRAIGHT_RADIUS);

        let flat = TrajectoryGeometry::extract(&trajectory, false, GradeClamp::default()).unwrap();
        assert_eq!(flat.grade_angles, vec![0.0; 3]);
        assert_eq!(flat.segment_lengths[0], 10.0);
    }
}

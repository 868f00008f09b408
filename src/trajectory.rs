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

use std::fs::File;
use std::path::Path;
use serde::Deserialize;
use speed_profile::geometry::{Point, Trajectory};
use crate::error::Result;

#[derive(Debug, Deserialize)]
struct TrajectoryRecord {
    x: f64,
    y: f64,
    z: f64
}

/// Read a trajectory from a CSV file with an `x,y,z` header, metres
pub fn load_trajectory_from_path(path: &Path) -> Result<Trajectory> {
    let file = File::open(path)?;
    load_trajectory_from_reader(file)
}

pub fn load_trajectory_from_reader<R: std::io::Read>(reader: R) -> Result<Trajectory> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut points = Vec::new();
    for result in rdr.deserialize() {
        let record: TrajectoryRecord = result?;
        points.push(Point::new(record.x, record.y, record.z));
    }
    Ok(Trajectory::new(points)?)
}

#[cfg(test)]
mod tests {
    use crate::error::AppError;
    use crate::trajectory::load_trajectory_from_reader;

    #[test]
    fn load_points() {
        let data = "x,y,z\n0.0,0.0,1.0\n10.0, 0.0, 1.5\n20.0,5.0,2.0\n";
        let trajectory = load_trajectory_from_reader(data.as_bytes()).unwrap();
        assert_eq!(trajectory.len(), 3);
        assert_eq!(trajectory.points()[1].x, 10.0);
        assert_eq!(trajectory.altitudes(), vec![1.0, 1.5, 2.0]);
    }

    #[test]
    fn too_few_points() {
        let data = "x,y,z\n0.0,0.0,1.0\n10.0,0.0,1.5\n";
        assert!(matches!(load_trajectory_from_reader(data.as_bytes()), Err(AppError::Simulation(_))));
    }

    #[test]
    fn bad_number() {
        let data = "x,y,z\n0.0,0.0,1.0\nten,0.0,1.5\n20.0,5.0,2.0\n";
        assert!(matches!(load_trajectory_from_reader(data.as_bytes()), Err(AppError::Csv(_))));
    }
}

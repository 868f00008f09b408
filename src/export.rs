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
use std::io;
use std::path::Path;
use speed_profile::channels::SimulationChannel;
use crate::error::Result;

const BASE_COLUMNS: [&str; 7] = ["Distance", "Speed", "Ay", "Ax", "CurvatureRadius", "Time", "Force"];
const GEAR_COLUMNS: [&str; 3] = ["Gear", "GRatio", "RPM"];

fn cell<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn row_cells(row: &SimulationChannel, with_gears: bool) -> Vec<String> {
    let mut cells = vec![
        row.distance.to_string(),
        row.speed.to_string(),
        cell(row.lateral_acceleration),
        cell(row.longitudinal_acceleration),
        cell(row.curvature_radius),
        row.time.to_string(),
        cell(row.force)
    ];
    if with_gears {
        cells.extend([cell(row.gear), cell(row.gear_ratio), cell(row.rpm)]);
    }
    cells
}

/// Write the channel table as CSV. Gear columns are only written when
/// `with_gears` is set. Missing values are left as empty cells.
pub fn write_channels<W: io::Write>(writer: W, channels: &[SimulationChannel], with_gears: bool) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut header: Vec<&str> = BASE_COLUMNS.to_vec();
    if with_gears {
        header.extend(GEAR_COLUMNS);
    }
    wtr.write_record(&header)?;
    for row in channels {
        wtr.write_record(row_cells(row, with_gears))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_channels_to_path(path: &Path, channels: &[SimulationChannel], with_gears: bool) -> Result<()> {
    write_channels(File::create(path)?, channels, with_gears)
}

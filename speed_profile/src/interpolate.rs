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

use utils::numeric::is_strictly_increasing;

/// Piecewise linear function over strictly increasing sample points.
/// Values outside the sampled range are extrapolated from the end segments.
#[derive(Debug, Clone)]
pub struct LinearInterpolator {
    xs: Vec<f64>,
    ys: Vec<f64>
}

impl LinearInterpolator {
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> Result<LinearInterpolator, String> {
        if xs.len() != ys.len() {
            return Err(format!("sample lengths differ ({} vs {})", xs.len(), ys.len()));
        }
        if xs.len() < 2 {
            return Err(format!("at least 2 samples are needed, got {}", xs.len()));
        }
        if xs.iter().chain(ys.iter()).any(|v| !v.is_finite()) {
            return Err("samples must be finite".to_string());
        }
        if !is_strictly_increasing(&xs) {
            return Err("sample points must be strictly increasing".to_string());
        }
        Ok(LinearInterpolator { xs, ys })
    }

    #[cfg(test)]
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Result<LinearInterpolator, String> {
        let (xs, ys) = pairs.iter().cloned().unzip();
        LinearInterpolator::new(xs, ys)
    }

    pub fn value_at(&self, x: f64) -> f64 {
        // index of the segment whose end lies at or beyond x, kept inside the table
        let upper = self.xs.partition_point(|sample| *sample < x).clamp(1, self.xs.len() - 1);
        let (x0, x1) = (self.xs[upper - 1], self.xs[upper]);
        let (y0, y1) = (self.ys[upper - 1], self.ys[upper]);
        let slope = (y1 - y0) / (x1 - x0);
        y0 + slope * (x - x0)
    }

    pub fn x_range(&self) -> (f64, f64) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }

    #[cfg(test)]
    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    /// Lowest x inside both tables where the two functions cross.
    pub fn first_crossing(&self, other: &LinearInterpolator) -> Option<f64> {
        let (self_start, self_end) = self.x_range();
        let (other_start, other_end) = other.x_range();
        let start = self_start.max(other_start);
        let end = self_end.min(other_end);
        if start > end {
            return None;
        }
        let mut grid: Vec<f64> = self.xs.iter().chain(other.xs.iter())
            .cloned()
            .filter(|x| *x > start && *x < end)
            .collect();
        grid.push(start);
        grid.push(end);
        grid.sort_by(|a, b| a.total_cmp(b));
        grid.dedup();

        let difference = |x: f64| self.value_at(x) - other.value_at(x);
        let mut prev_x = grid[0];
        let mut prev_diff = difference(prev_x);
        if prev_diff == 0.0 {
            return Some(prev_x);
        }
        for x in grid.into_iter().skip(1) {
            let diff = difference(x);
            if diff == 0.0 {
                return Some(x);
            }
            if diff.signum() != prev_diff.signum() {
                return Some(prev_x + (x - prev_x) * prev_diff / (prev_diff - diff));
            }
            prev_x = x;
            prev_diff = diff;
        }
        None
    }
}

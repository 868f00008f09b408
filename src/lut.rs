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

//! Pipe separated lookup tables (`key|value`, `;` comments), as used for
//! engine power curves.

use std::fmt;
use std::fs::File;
use std::io;
use std::path::Path;
use std::str::FromStr;
use crate::error::{AppError, Result};

pub fn load_lut_from_path<K, V>(lut_path: &Path) -> Result<Vec<(K, V)>>
    where
        K: FromStr, <K as FromStr>::Err: fmt::Debug,
        V: FromStr, <V as FromStr>::Err: fmt::Debug
{
    let file = File::open(lut_path).map_err(|e| {
        AppError::Lut(format!("Failed to open {}: {}", lut_path.display(), e))
    })?;
    load_lut_from_reader(file)
}

pub fn load_lut_from_reader<K, V, R>(lut_reader: R) -> Result<Vec<(K, V)>>
    where
        K: FromStr, <K as FromStr>::Err: fmt::Debug,
        V: FromStr, <V as FromStr>::Err: fmt::Debug,
        R: io::Read
{
    let mut lut_data: Vec<(K, V)> = Vec::new();
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b'|')
        .comment(Some(b';'))
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(lut_reader);
    for result in rdr.records() {
        let record = result?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        lut_data.push((parse_lut_element(&record, 0)?,
                       parse_lut_element(&record, 1)?));
    }
    Ok(lut_data)
}

pub fn parse_lut_element<T>(record: &csv::StringRecord, index: usize) -> Result<T>
    where
        T: FromStr, <T as FromStr>::Err: fmt::Debug
{
    let line = record.position().map(|pos| format!(" at line {}", pos.line())).unwrap_or_default();
    let field = record.get(index).ok_or_else(|| {
        AppError::Lut(format!("Missing column {}{}", index + 1, line))
    })?;
    field.parse::<T>().map_err(|_| {
        AppError::Lut(format!("Cannot convert '{}'{} to {}", field, line, std::any::type_name::<T>()))
    })
}

/// Engine power table from an `rpm|power_cv` lut, split into columns
pub fn load_engine_power_curve(lut_path: &Path) -> Result<(Vec<f64>, Vec<f64>)> {
    let lut: Vec<(f64, f64)> = load_lut_from_path(lut_path)?;
    if lut.len() < 2 {
        return Err(AppError::Lut(format!("{} needs at least 2 rows, found {}", lut_path.display(), lut.len())));
    }
    Ok(lut.into_iter().unzip())
}

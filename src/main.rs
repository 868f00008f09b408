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

mod error;
mod export;
mod lut;
mod settings;
mod trajectory;

use std::env;
use std::process::ExitCode;
use tracing::{error, info};

use utils::units::ms_to_kmh;
use crate::error::Result;
use crate::settings::AppSettings;

fn init_logging() {
    match env::current_dir() {
        Ok(current_dir) => {
            let file_appender = tracing_appender::rolling::never(current_dir, "lap_sim.log");
            let subscriber = tracing_subscriber::fmt()
                .with_writer(file_appender)
                .with_ansi(false)
                .compact()
                .finish();
            match tracing::subscriber::set_global_default(subscriber) {
                Ok(_) => {
                    info!("Logging initialised");
                }
                Err(e) => {
                    eprintln!("Failed to init logging. {}", e.to_string());
                }
            }
        }
        Err(e) => {
            eprintln!("Failed to init logging. Couldn't determine current dir {}", e.to_string());
        }
    }
}

fn run(config_path: Option<&str>) -> Result<()> {
    let settings = AppSettings::load(config_path)?;
    let trajectory_path = settings.trajectory_path();
    info!("Loading trajectory from {}", trajectory_path.display());
    let trajectory = trajectory::load_trajectory_from_path(&trajectory_path)?;
    let simulation_config = settings.simulation_config()?;

    let result = speed_profile::simulate(&trajectory, &simulation_config)?;
    let output_path = settings.output_path();
    export::write_channels_to_path(&output_path, &result.channels, result.has_gear_channels())?;
    info!("Wrote {} rows to {}", result.channels.len(), output_path.display());

    let top_speed = result.channels.iter().map(|row| row.speed).fold(0.0, f64::max);
    println!("{} points, lap time {:.3} s, top speed {:.1} km/h",
             result.channels.len(), result.lap_time(), ms_to_kmh(top_speed));
    for (method, count) in result.diagnostics.methods() {
        println!("  {}: {}", method, count);
    }
    for (scope, count) in result.diagnostics.scopes() {
        println!("  {}: {}", scope, count);
    }
    println!("Channels written to {}", output_path.display());
    Ok(())
}

fn main() -> ExitCode {
    init_logging();
    let config_path = env::args().nth(1);
    match run(config_path.as_deref()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e.to_string());
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

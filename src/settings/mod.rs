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

use std::fs;
use std::path::PathBuf;
use config::{Config, ConfigError};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use speed_profile::config::{DriveAxle, GripConfig, PowertrainConfig, SimulationConfig, SpeedLimits, VehicleConfig};
use speed_profile::geometry::GradeClamp;
use crate::error::{AppError, Result};
use crate::lut::load_engine_power_curve;

/// Gearbox used together with an engine power lut
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GearboxSettings {
    pub gear_ratios: Vec<f64>,
    pub final_drive: f64,
    pub wheel_radius: f64
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppSettings {
    trajectory_path: String,
    output_path: String,
    #[serde(default)]
    engine_lut_path: Option<String>,
    #[serde(default)]
    gearbox: Option<GearboxSettings>,
    simulation: SimulationConfig
}

impl AppSettings {
    pub const CONFIG_FILENAME: &'static str = "lap-sim-conf";
    const ENV_PREFIX: &'static str = "LAPSIM";

    pub fn default() -> Self {
        AppSettings {
            trajectory_path: String::from("trajectory.csv"),
            output_path: String::from("speed_profile.csv"),
            engine_lut_path: None,
            gearbox: None,
            simulation: SimulationConfig {
                vehicle: VehicleConfig {
                    mass: 1200.0,
                    lift_coefficient: 0.1,
                    drag_coefficient: 0.35,
                    frontal_area: 2.1,
                    rolling_resistance: 0.015,
                    rear_axle_to_cg: 1.4,
                    front_axle_to_cg: 1.2,
                    cg_height: 0.5,
                    drive_axle: DriveAxle::Front
                },
                grip: GripConfig { fx: 1.0, fy: 1.0, mu: 1.0, nu: 1.0, braking_factor: 0.8 },
                speeds: SpeedLimits { initial_kmh: 0.0, max_kmh: 180.0 },
                use_elevation: true,
                peak_power_cv: Some(150.0),
                powertrain: None,
                grade_clamp: GradeClamp::default()
            }
        }
    }

    fn build(config_name: &str) -> std::result::Result<Self, ConfigError> {
        Config::builder()
            .add_source(config::File::with_name(config_name))
            .add_source(config::Environment::with_prefix(AppSettings::ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Load from `config_path` when given. Otherwise from `lap-sim-conf.toml`
    /// in the current directory, writing a default file when it can't be read.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        if let Some(path) = config_path {
            info!("Loading settings from {}", path);
            return Ok(AppSettings::build(path)?);
        }
        match AppSettings::build(AppSettings::CONFIG_FILENAME) {
            Ok(settings) => Ok(settings),
            Err(e) => {
                warn!("Failed to load settings. {}", e.to_string());
                let ret = AppSettings::default();
                ret.write().unwrap_or_else(|e| { error!("Failed to write settings. {}", e.to_string()) });
                Ok(ret)
            }
        }
    }

    pub fn trajectory_path(&self) -> PathBuf {
        PathBuf::from(&self.trajectory_path)
    }

    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(&self.output_path)
    }

    /// Simulation parameters with the engine lut, if any, merged in as the powertrain
    pub fn simulation_config(&self) -> Result<SimulationConfig> {
        let mut simulation = self.simulation.clone();
        match (&self.engine_lut_path, &self.gearbox) {
            (Some(lut_path), Some(gearbox)) => {
                let (engine_rpm, engine_power_cv) = load_engine_power_curve(&PathBuf::from(lut_path))?;
                info!("Loaded {} engine power samples from {}", engine_rpm.len(), lut_path);
                simulation.powertrain = Some(PowertrainConfig {
                    engine_rpm,
                    engine_power_cv,
                    gear_ratios: gearbox.gear_ratios.clone(),
                    final_drive: gearbox.final_drive,
                    wheel_radius: gearbox.wheel_radius
                });
            }
            (Some(_), None) => {
                return Err(AppError::InvalidSettings(String::from("engine_lut_path is set but there is no [gearbox] section")));
            }
            (None, Some(_)) => {
                warn!("[gearbox] section ignored without an engine_lut_path");
            }
            (None, None) => {}
        }
        Ok(simulation)
    }

    pub fn write(&self) -> std::io::Result<()> {
        fs::write(format!("{}.toml", AppSettings::CONFIG_FILENAME), toml::to_string(&self).map_err(|_e|{
            std::io::Error::new(std::io::ErrorKind::Other, "Failed to encode settings to toml")
        })?)
    }
}

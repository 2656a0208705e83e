//! Configuration types for the simulation.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// World configuration parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Width of the world grid
    pub width: i32,
    /// Height of the world grid
    pub height: i32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 20,
            height: 20,
        }
    }
}

impl WorldConfig {
    pub fn validate(&self) -> Result<()> {
        if self.width <= 0 || self.height <= 0 {
            return Err(Error::Validation(format!(
                "grid must have positive dimensions, got {}x{}",
                self.width, self.height
            )));
        }
        if self.cell_count() > i32::MAX as usize {
            return Err(Error::Validation(format!(
                "grid of {}x{} has more cells than can be indexed",
                self.width, self.height
            )));
        }
        Ok(())
    }

    pub fn cell_count(&self) -> usize {
        (self.width.max(0) as usize) * (self.height.max(0) as usize)
    }
}

/// Food spawning parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FoodConfig {
    /// Cumulative probability table of `(level, threshold)` pairs. A uniform
    /// draw in `[0, 1)` picks the first level whose threshold it does not exceed.
    pub spawn_table: Vec<(u32, f64)>,
    /// Food spawn attempts per tick
    pub spawns_per_tick: u32,
}

impl Default for FoodConfig {
    fn default() -> Self {
        Self {
            spawn_table: vec![(1, 0.4), (2, 0.7), (3, 0.85), (4, 0.95), (5, 1.0)],
            spawns_per_tick: 1,
        }
    }
}

impl FoodConfig {
    pub fn validate(&self) -> Result<()> {
        let Some(&(_, last)) = self.spawn_table.last() else {
            return Err(Error::Validation("food spawn table is empty".to_string()));
        };
        if last < 1.0 {
            return Err(Error::Validation(format!(
                "last food spawn threshold must be at least 1.0, got {}",
                last
            )));
        }
        if self.spawn_table.windows(2).any(|w| w[0].1 > w[1].1) {
            return Err(Error::Validation(
                "food spawn thresholds must be non-decreasing".to_string(),
            ));
        }
        if self.spawn_table.iter().any(|&(level, _)| level == 0) {
            return Err(Error::Validation("food level must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Process driver parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Agents spawned before the first tick
    pub initial_agents: usize,
    /// Food units spawned before the first tick
    pub initial_food: usize,
    /// Delay between frames (milliseconds)
    pub frame_delay_ms: u64,
    /// Stop after this many ticks; run until interrupted when unset
    pub max_ticks: Option<u64>,
    /// CSV file receiving one metrics row per tick
    pub metrics_path: Option<String>,
    /// Draw the grid to the terminal every frame
    pub render: bool,
    /// Ticks between population log lines
    pub log_interval: u64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            initial_agents: 10,
            initial_food: 16,
            frame_delay_ms: 800,
            max_ticks: None,
            metrics_path: Some("stat.csv".to_string()),
            render: true,
            log_interval: 100,
        }
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Random seed for reproducibility
    pub seed: u64,
    pub world: WorldConfig,
    pub food: FoodConfig,
    pub driver: DriverConfig,
}

impl SimulationConfig {
    /// Parse a JSON document; omitted fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<()> {
        self.world.validate()?;
        self.food.validate()?;

        let capacity = self.world.cell_count();
        if self.driver.initial_agents + self.driver.initial_food > capacity {
            tracing::warn!(
                initial_agents = self.driver.initial_agents,
                initial_food = self.driver.initial_food,
                capacity,
                "Initial population exceeds grid capacity, extra spawns will be skipped"
            );
        }
        Ok(())
    }
}

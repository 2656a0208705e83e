//! Food units that deplete over time.

use crate::world::World;
use forage_core::{EntityId, Position};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Capacity drained per tick when an agent stands next to the food
pub const GRAZING_COST: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Food {
    pub coords: Position,
    pub level: u32,
    pub capacity: f64,
}

impl Food {
    pub fn new(coords: Position, level: u32) -> Self {
        let level = level.max(1);
        Self {
            coords,
            level,
            capacity: Self::capacity_for(level),
        }
    }

    pub fn capacity_for(level: u32) -> f64 {
        5.0 * level as f64
    }

    pub fn max_capacity(&self) -> f64 {
        Self::capacity_for(self.level)
    }

    /// Capacity lost every tick
    pub fn exhaustion(&self) -> f64 {
        0.1 * self.level as f64
    }

    /// Spoil, then get grazed if an agent is adjacent. Food that runs out is
    /// removed on the tick its capacity is found empty.
    pub(crate) fn update(&mut self, id: EntityId, world: &mut World) {
        self.capacity -= self.exhaustion();

        if self.capacity <= 0.0 {
            debug!(food_id = %id, level = self.level, tick = world.ticks(), "Food depleted");
            world.remove_entity(id);
            return;
        }

        if world.is_agent_near(self.coords) {
            self.capacity -= GRAZING_COST;
        }
    }
}

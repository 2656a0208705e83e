//! Spawners for agents and food.
//!
//! Factories are registered with the world and updated once per tick after
//! every entity has acted. They never own entities; each call receives the
//! world it spawns into.

use crate::agent::Agent;
use crate::food::Food;
use crate::grid::square_coords_at_radius;
use crate::world::World;
use forage_core::{EntityId, Error, FoodConfig, Position, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::trace;

/// Something the world advances once per tick
pub trait Updatable {
    fn update(&mut self, world: &mut World) -> Result<()>;
}

/// Creates agents at random cells and next to reproducing parents
#[derive(Debug, Clone, Copy, Default)]
pub struct AgentFactory;

impl AgentFactory {
    /// Place up to `amount` level-1 agents on random empty cells. Stops
    /// quietly once the grid is full.
    pub fn spawn_random(world: &mut World, amount: usize) -> Result<Vec<EntityId>> {
        let mut spawned = Vec::with_capacity(amount);
        for _ in 0..amount {
            let Some(coords) = world.random_empty_cell() else {
                trace!(
                    requested = amount,
                    placed = spawned.len(),
                    "Grid full, skipping agent spawn"
                );
                break;
            };
            spawned.push(Self::spawn(world, coords, 1)?);
        }
        Ok(spawned)
    }

    pub fn spawn(world: &mut World, coords: Position, level: u32) -> Result<EntityId> {
        world.add_entity(Agent::new(coords, level))
    }

    /// Place a child next to `parent`.
    ///
    /// Every call counts toward the spawned-from statistic, including calls
    /// that fail with [`Error::UnableToSpawn`] because all eight surrounding
    /// cells are taken. The child inherits level and experience and starts
    /// with half the parent's saturation; the parent is not charged here.
    pub fn spawn_from(world: &mut World, parent: &Agent) -> Result<EntityId> {
        world.record_spawned_from();

        let free: Vec<Position> = square_coords_at_radius(parent.coords, 1)
            .into_iter()
            .filter(|&pos| world.is_cell_empty(pos))
            .collect();

        let coords = *free
            .choose(world.rng())
            .ok_or(Error::UnableToSpawn(parent.coords))?;

        let child = Agent::new(coords, parent.level)
            .with_saturation((parent.saturation / 2.0).floor())
            .with_experience(parent.experience);

        world.add_entity(child)
    }
}

impl Updatable for AgentFactory {
    // Reproduction is driven by the agents themselves.
    fn update(&mut self, _world: &mut World) -> Result<()> {
        Ok(())
    }
}

/// Drops food of random level on random empty cells
#[derive(Debug, Clone)]
pub struct FoodFactory {
    config: FoodConfig,
}

impl FoodFactory {
    pub fn new(config: FoodConfig) -> Self {
        Self { config }
    }

    /// Map a uniform draw in `[0, 1)` through the cumulative spawn table
    pub fn pick_level(&self, roll: f64) -> Option<u32> {
        self.config
            .spawn_table
            .iter()
            .find(|&&(_, threshold)| roll <= threshold)
            .map(|&(level, _)| level)
    }

    /// Spawn one food unit; `None` when the grid has no empty cell.
    pub fn spawn_random_food(&self, world: &mut World) -> Result<Option<EntityId>> {
        let roll: f64 = world.rng().gen();
        let Some(level) = self.pick_level(roll) else {
            return Ok(None);
        };

        let Some(coords) = world.random_empty_cell() else {
            trace!(level, "Grid full, skipping food spawn");
            return Ok(None);
        };

        world.add_entity(Food::new(coords, level)).map(Some)
    }

    pub fn spawn_bunch(&self, world: &mut World, amount: usize) -> Result<Vec<EntityId>> {
        let mut spawned = Vec::with_capacity(amount);
        for _ in 0..amount {
            if let Some(id) = self.spawn_random_food(world)? {
                spawned.push(id);
            }
        }
        Ok(spawned)
    }
}

impl Default for FoodFactory {
    fn default() -> Self {
        Self::new(FoodConfig::default())
    }
}

impl Updatable for FoodFactory {
    fn update(&mut self, world: &mut World) -> Result<()> {
        self.spawn_bunch(world, self.config.spawns_per_tick as usize)?;
        Ok(())
    }
}

/// A factory registered with the world
#[derive(Debug, Clone)]
pub enum Factory {
    Agent(AgentFactory),
    Food(FoodFactory),
}

impl Updatable for Factory {
    fn update(&mut self, world: &mut World) -> Result<()> {
        match self {
            Factory::Agent(factory) => factory.update(world),
            Factory::Food(factory) => factory.update(world),
        }
    }
}

impl From<AgentFactory> for Factory {
    fn from(factory: AgentFactory) -> Self {
        Factory::Agent(factory)
    }
}

impl From<FoodFactory> for Factory {
    fn from(factory: FoodFactory) -> Self {
        Factory::Food(factory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use forage_core::{SimulationConfig, WorldConfig};

    fn world(width: i32, height: i32) -> World {
        let config = SimulationConfig {
            seed: 7,
            world: WorldConfig { width, height },
            ..Default::default()
        };
        World::new(&config).unwrap()
    }

    #[test]
    fn test_spawn_random_agents() {
        let mut world = world(10, 10);
        let ids = AgentFactory::spawn_random(&mut world, 5).unwrap();

        assert_eq!(ids.len(), 5);
        assert_eq!(world.agents_count(), 5);
        for id in ids {
            let agent = world.entity(id).and_then(Entity::as_agent).unwrap();
            assert_eq!(agent.level, 1);
            assert!((agent.saturation - 8.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_spawn_random_skips_when_full() {
        let mut world = world(2, 2);
        let ids = AgentFactory::spawn_random(&mut world, 10).unwrap();
        assert_eq!(ids.len(), 4);
        assert_eq!(world.agents_count(), 4);
    }

    #[test]
    fn test_spawn_from_inherits_from_parent() {
        let mut world = world(10, 10);
        let parent = Agent::new(Position::new(5, 5), 3)
            .with_saturation(27.0)
            .with_experience(12);
        world.add_entity(parent.clone()).unwrap();

        let child_id = AgentFactory::spawn_from(&mut world, &parent).unwrap();
        let child = world.entity(child_id).and_then(Entity::as_agent).unwrap();

        assert_eq!(child.level, 3);
        assert_eq!(child.saturation, 13.0);
        assert_eq!(child.experience, 12);
        assert_eq!(child.coords.chebyshev_distance(&parent.coords), 1);
        assert_eq!(world.spawned_from_count(), 1);
    }

    #[test]
    fn test_spawn_from_fails_when_surrounded() {
        let mut world = world(3, 3);
        let parent = Agent::new(Position::new(1, 1), 1);
        world.add_entity(parent.clone()).unwrap();
        for pos in square_coords_at_radius(Position::new(1, 1), 1) {
            world.add_entity(Food::new(pos, 1)).unwrap();
        }

        let result = AgentFactory::spawn_from(&mut world, &parent);
        assert!(matches!(result, Err(Error::UnableToSpawn(p)) if p == Position::new(1, 1)));
        // The attempt still counts
        assert_eq!(world.spawned_from_count(), 1);
        assert_eq!(world.agents_count(), 1);
    }

    #[test]
    fn test_spawn_from_at_corner_stays_in_bounds() {
        let mut world = world(5, 5);
        let parent = Agent::new(Position::new(0, 0), 1);
        world.add_entity(parent.clone()).unwrap();

        let child_id = AgentFactory::spawn_from(&mut world, &parent).unwrap();
        let coords = world.entity(child_id).unwrap().coords();
        assert!(coords.in_bounds(5, 5));
    }

    #[test]
    fn test_pick_level() {
        let factory = FoodFactory::default();
        assert_eq!(factory.pick_level(0.0), Some(1));
        assert_eq!(factory.pick_level(0.4), Some(1));
        assert_eq!(factory.pick_level(0.41), Some(2));
        assert_eq!(factory.pick_level(0.7), Some(2));
        assert_eq!(factory.pick_level(0.8), Some(3));
        assert_eq!(factory.pick_level(0.9), Some(4));
        assert_eq!(factory.pick_level(0.96), Some(5));
        assert_eq!(factory.pick_level(0.999), Some(5));
    }

    #[test]
    fn test_spawn_bunch() {
        let mut world = world(10, 10);
        let factory = FoodFactory::default();
        let ids = factory.spawn_bunch(&mut world, 16).unwrap();

        assert_eq!(ids.len(), 16);
        assert_eq!(world.food_count(), 16);
        for id in ids {
            let food = world.entity(id).and_then(Entity::as_food).unwrap();
            assert!((1..=5).contains(&food.level));
            assert_eq!(food.capacity, 5.0 * food.level as f64);
        }
    }

    #[test]
    fn test_food_spawn_is_noop_on_full_grid() {
        let mut world = world(1, 1);
        let factory = FoodFactory::default();
        assert!(factory.spawn_random_food(&mut world).unwrap().is_some());
        assert!(factory.spawn_random_food(&mut world).unwrap().is_none());
        assert_eq!(world.food_count(), 1);
    }

    #[test]
    fn test_food_factory_update_spawns_once() {
        let mut world = world(10, 10);
        let mut factory = Factory::from(FoodFactory::default());
        factory.update(&mut world).unwrap();
        assert_eq!(world.food_count(), 1);

        let mut agents = Factory::from(AgentFactory);
        agents.update(&mut world).unwrap();
        assert_eq!(world.agents_count(), 0);
    }
}

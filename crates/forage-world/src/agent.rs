//! Agent state and per-tick behavior.

use crate::factory::AgentFactory;
use crate::world::World;
use forage_core::{Direction, EntityId, Error, Position, Result};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Fraction of max saturation a freshly spawned agent starts with
pub const INITIAL_SATURATION_RATIO: f64 = 0.8;
/// Lower bound of the Saturated band
pub const SATURATED_RATIO: f64 = 0.8;
/// Saturation ratio at which a Saturated agent tries to reproduce
pub const REPRODUCE_RATIO: f64 = 0.85;
/// Lower bound of the Hungry band
pub const HUNGRY_RATIO: f64 = 0.3;

/// Behavioral state, derived from saturation every tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentState {
    Saturated,
    Hungry,
    Exhausted,
    Dead,
}

impl AgentState {
    /// Classify a saturation level. Anything positive that falls outside the
    /// Saturated and Hungry bands, including saturation above the maximum after
    /// a meal of another agent, counts as Exhausted.
    pub fn from_saturation(saturation: f64, max_saturation: f64) -> Self {
        if max_saturation * SATURATED_RATIO <= saturation && saturation <= max_saturation {
            AgentState::Saturated
        } else if max_saturation * HUNGRY_RATIO <= saturation
            && saturation <= max_saturation * SATURATED_RATIO
        {
            AgentState::Hungry
        } else if saturation > 0.0 {
            AgentState::Exhausted
        } else {
            AgentState::Dead
        }
    }
}

/// An agent in the simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub coords: Position,
    pub level: u32,
    pub saturation: f64,
    pub experience: u32,
    /// Direction reused by random walks until it gets blocked
    pub walk_direction: Option<Direction>,
}

impl Agent {
    pub fn new(coords: Position, level: u32) -> Self {
        let level = level.max(1);
        let mut agent = Self {
            coords,
            level,
            saturation: 0.0,
            experience: 0,
            walk_direction: None,
        };
        agent.saturation = agent.max_saturation() * INITIAL_SATURATION_RATIO;
        agent
    }

    pub fn with_saturation(mut self, saturation: f64) -> Self {
        self.saturation = saturation;
        self
    }

    pub fn with_experience(mut self, experience: u32) -> Self {
        self.experience = experience;
        self
    }

    /// Experience needed for the next level
    pub fn exp_requirement(&self) -> u32 {
        self.level * 10
    }

    pub fn max_saturation(&self) -> f64 {
        self.exp_requirement() as f64
    }

    /// Search radius for food
    pub fn fov(&self) -> i32 {
        3 + self.level as i32
    }

    /// Saturation spent on a tick the agent moved
    pub fn exhaustion(&self) -> f64 {
        (0.12 * self.level as f64) / 4.0
    }

    /// Saturation spent on a tick the agent stayed put
    pub fn idle_hunger(&self) -> f64 {
        self.exhaustion() / 4.0
    }

    pub fn state(&self) -> AgentState {
        AgentState::from_saturation(self.saturation, self.max_saturation())
    }

    pub fn is_alive(&self) -> bool {
        self.saturation > 0.0
    }

    /// Run one tick for the agent registered under `id`.
    ///
    /// Works on a detached copy: `coords` may run ahead of the grid until the
    /// move is committed at the end of the tick.
    pub(crate) fn update(&mut self, id: EntityId, world: &mut World) -> Result<()> {
        let last_coords = self.coords;

        if self.try_eat_agent(id, world)? {
            return Ok(());
        }

        match self.state() {
            AgentState::Saturated => self.on_saturated(id, world)?,
            AgentState::Hungry => self.seek_food(world, true),
            AgentState::Exhausted => self.seek_food(world, false),
            AgentState::Dead => {
                debug!(agent_id = %id, tick = world.ticks(), level = self.level, "Agent starved");
                world.remove_entity(id);
                return Ok(());
            }
        }

        if world.is_food_near(self.coords) {
            self.experience += 1;
            self.saturation = (self.saturation + 1.0).min(self.max_saturation());
        }

        if self.experience >= self.exp_requirement() {
            self.level += 1;
            debug!(
                agent_id = %id,
                level = self.level,
                experience = self.experience,
                "Agent levelled up"
            );
        }

        if last_coords == self.coords {
            self.saturation -= self.idle_hunger();
        } else {
            self.saturation -= self.exhaustion();
            world.move_entity(last_coords, self.coords)?;
        }

        if !self.is_alive() {
            debug!(agent_id = %id, tick = world.ticks(), level = self.level, "Agent starved");
            world.remove_entity(id);
        }

        Ok(())
    }

    /// Eat a strictly weaker agent on a cardinal neighbour, if any.
    /// Diagonal neighbours are never eaten.
    fn try_eat_agent(&mut self, id: EntityId, world: &mut World) -> Result<bool> {
        if !world.is_agent_near(self.coords) {
            return Ok(false);
        }

        let last_coords = self.coords;
        for direction in Direction::CARDINALS {
            let target = last_coords.step(direction);
            let Some((victim_id, victim)) = world.agent_at(target) else {
                continue;
            };
            if victim.level >= self.level {
                continue;
            }

            let (victim_saturation, victim_experience, victim_level) =
                (victim.saturation, victim.experience, victim.level);

            self.saturation += victim_saturation;
            self.coords = target;
            world.remove_entity(victim_id);
            world.move_entity(last_coords, target)?;
            world.record_eaten();
            self.experience = victim_experience;

            debug!(
                agent_id = %id,
                victim_id = %victim_id,
                level = self.level,
                victim_level,
                tick = world.ticks(),
                "Agent ate a weaker agent"
            );
            return Ok(true);
        }

        Ok(false)
    }

    fn on_saturated(&mut self, id: EntityId, world: &mut World) -> Result<()> {
        if self.saturation < self.max_saturation() * REPRODUCE_RATIO {
            self.seek_food(world, true);
            return Ok(());
        }

        match AgentFactory::spawn_from(world, self) {
            Ok(child_id) => {
                debug!(
                    agent_id = %id,
                    child_id = %child_id,
                    level = self.level,
                    "Agent reproduced"
                );
            }
            Err(Error::UnableToSpawn(pos)) => {
                debug!(
                    agent_id = %id,
                    position = %pos,
                    "Reproduction failed: no empty adjacent cell"
                );
            }
            Err(e) => return Err(e),
        }

        // The attempt costs half the saturation whether or not a child was placed
        self.saturation = (self.saturation / 2.0).floor();
        Ok(())
    }

    /// Step toward the nearest visible food. Without food in sight a hungry
    /// agent wanders and an exhausted one waits.
    fn seek_food(&mut self, world: &mut World, wander: bool) {
        match world.nearest_food_within_radius(self.coords, self.fov()) {
            Some(food) => self.walk_to(world, food),
            None if wander => self.walk_random(world),
            None => {}
        }
    }

    /// One step along the axis with the larger distance, the y axis on ties.
    /// Falls back to a random step when that cell is taken. An agent already
    /// next to its target stays where it can feed.
    fn walk_to(&mut self, world: &mut World, target: Position) {
        if self.coords.chebyshev_distance(&target) <= 1 {
            return;
        }

        let dx = target.x - self.coords.x;
        let dy = target.y - self.coords.y;

        let direction = if dx.abs() > dy.abs() {
            if dx >= 0 {
                Direction::East
            } else {
                Direction::West
            }
        } else if dy >= 0 {
            Direction::South
        } else {
            Direction::North
        };

        let next = self.coords.step(direction);
        if world.is_cell_empty(next) {
            self.coords = next;
        } else {
            self.walk_random(world);
        }
    }

    fn walk_random(&mut self, world: &mut World) {
        loop {
            let direction = match self.walk_direction {
                Some(direction) => direction,
                None => match self.choose_walk_direction(world) {
                    Some(direction) => direction,
                    // boxed in
                    None => return,
                },
            };

            let next = self.coords.step(direction);
            if world.is_cell_empty(next) {
                self.walk_direction = Some(direction);
                self.coords = next;
                return;
            }

            self.walk_direction = None;
        }
    }

    /// Random untried cardinal direction leading to an empty cell
    fn choose_walk_direction(&self, world: &mut World) -> Option<Direction> {
        let mut candidates = Direction::CARDINALS.to_vec();

        while let Some(&direction) = candidates.choose(world.rng()) {
            if world.is_cell_empty(self.coords.step(direction)) {
                return Some(direction);
            }
            candidates.retain(|&d| d != direction);
        }

        None
    }
}

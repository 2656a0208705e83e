//! The world: occupancy, spatial queries and the tick driver.

use crate::agent::Agent;
use crate::entity::Entity;
use crate::factory::{Factory, Updatable};
use crate::grid::{square_coords_at_radius, Grid};
use forage_core::{EntityId, Error, Position, Result, SimulationConfig, TickRecord};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::{HashMap, HashSet};
use tracing::trace;

pub struct World {
    grid: Grid,
    entities: HashMap<EntityId, Entity>,
    factories: Vec<Factory>,
    // Entities removed during the current entity pass
    removed: HashSet<EntityId>,
    rng: ChaCha8Rng,
    next_id: u64,
    ticks: u64,
    ate_count: u64,
    spawned_from_count: u64,
}

impl World {
    pub fn new(config: &SimulationConfig) -> Result<Self> {
        let grid = Grid::from_config(&config.world)?;

        Ok(Self {
            grid,
            entities: HashMap::new(),
            factories: Vec::new(),
            removed: HashSet::new(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            next_id: 0,
            ticks: 1,
            ate_count: 0,
            spawned_from_count: 0,
        })
    }

    pub fn width(&self) -> i32 {
        self.grid.width
    }

    pub fn height(&self) -> i32 {
        self.grid.height
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Current tick; starts at 1 and grows by one per [`World::update`]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Agents eaten by other agents so far
    pub fn ate_count(&self) -> u64 {
        self.ate_count
    }

    /// Reproduction attempts so far, successful or not
    pub fn spawned_from_count(&self) -> u64 {
        self.spawned_from_count
    }

    pub(crate) fn record_eaten(&mut self) {
        self.ate_count += 1;
    }

    pub(crate) fn record_spawned_from(&mut self) {
        self.spawned_from_count += 1;
    }

    pub(crate) fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    /// Factories run after the entity pass, in registration order
    pub fn register_factory(&mut self, factory: impl Into<Factory>) {
        self.factories.push(factory.into());
    }

    pub fn factories(&self) -> &[Factory] {
        &self.factories
    }

    /// Place an entity at its own coordinates.
    ///
    /// Fails without touching the world when the cell is taken or outside
    /// the grid.
    pub fn add_entity(&mut self, entity: impl Into<Entity>) -> Result<EntityId> {
        let entity = entity.into();
        let id = EntityId(self.next_id);

        self.grid.place(entity.coords(), id)?;
        self.next_id += 1;
        self.entities.insert(id, entity);
        Ok(id)
    }

    /// Take an entity off the grid. It will not act again this tick.
    /// Removing an entity twice is a no-op.
    pub fn remove_entity(&mut self, id: EntityId) -> Option<Entity> {
        let entity = self.entities.remove(&id)?;

        let coords = entity.coords();
        if self.grid.get(coords) == Some(id) {
            self.grid.clear(coords);
        }
        self.removed.insert(id);
        Some(entity)
    }

    /// Move whatever occupies `from` onto the empty cell `to`
    pub fn move_entity(&mut self, from: Position, to: Position) -> Result<()> {
        let id = self.grid.relocate(from, to)?;
        match self.entities.get_mut(&id) {
            Some(entity) => {
                entity.set_coords(to);
                Ok(())
            }
            None => Err(Error::InvalidState(format!(
                "cell {} held unknown entity {}",
                from, id
            ))),
        }
    }

    /// False for occupied and out-of-bounds cells
    pub fn is_cell_empty(&self, coords: Position) -> bool {
        self.grid.is_empty(coords)
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn entity_at(&self, coords: Position) -> Option<&Entity> {
        self.grid.get(coords).and_then(|id| self.entities.get(&id))
    }

    pub fn agent_at(&self, coords: Position) -> Option<(EntityId, &Agent)> {
        let id = self.grid.get(coords)?;
        self.entities
            .get(&id)
            .and_then(Entity::as_agent)
            .map(|agent| (id, agent))
    }

    /// Whether an agent occupies the 3x3 block centred on `coords`
    pub fn is_agent_near(&self, coords: Position) -> bool {
        (-1..=1).any(|dx| (-1..=1).any(|dy| self.agent_at(coords.add(dx, dy)).is_some()))
    }

    /// Coordinates of the first food found scanning rings of radius
    /// 1, 2, ..., `max_radius` around `from`. Within a ring the first cell in
    /// [`square_coords_at_radius`] order wins.
    pub fn nearest_food_within_radius(&self, from: Position, max_radius: i32) -> Option<Position> {
        (1..=max_radius).find_map(|radius| {
            square_coords_at_radius(from, radius)
                .into_iter()
                .filter(|&pos| self.grid.in_bounds(pos))
                .find(|&pos| self.entity_at(pos).is_some_and(Entity::is_food))
        })
    }

    pub fn is_food_near(&self, coords: Position) -> bool {
        self.nearest_food_within_radius(coords, 1).is_some()
    }

    /// Uniformly chosen empty cell, `None` when the grid is full
    pub fn random_empty_cell(&mut self) -> Option<Position> {
        let empty = self.grid.empty_positions();
        empty.choose(&mut self.rng).copied()
    }

    /// Every cell with its occupant, row by row
    pub fn cells(&self) -> impl Iterator<Item = (Position, Option<&Entity>)> + '_ {
        self.grid
            .iter()
            .map(move |(pos, id)| (pos, id.and_then(|id| self.entities.get(&id))))
    }

    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &Entity)> + '_ {
        self.entities.iter().map(|(id, entity)| (*id, entity))
    }

    pub fn agents(&self) -> impl Iterator<Item = &Agent> + '_ {
        self.entities.values().filter_map(Entity::as_agent)
    }

    pub fn agents_count(&self) -> usize {
        self.agents().count()
    }

    pub fn food_count(&self) -> usize {
        self.entities.values().filter(|e| e.is_food()).count()
    }

    /// Highest level among living agents, 0 when none are alive
    pub fn max_agents_level(&self) -> u32 {
        self.agents().map(|agent| agent.level).max().unwrap_or(0)
    }

    pub fn tick_record(&self) -> TickRecord {
        TickRecord {
            agents_left: self.agents_count(),
            eaten_agents: self.ate_count,
            spawned_agents: self.spawned_from_count,
            max_agents_level: self.max_agents_level(),
        }
    }

    /// Advance one tick.
    ///
    /// Entities present at the start of the tick act once each, in row-major
    /// order of their cells, unless something removed them earlier in the
    /// pass. Entities born during the pass wait for the next tick. Factories
    /// run afterwards in registration order.
    pub fn update(&mut self) -> Result<()> {
        self.ticks += 1;

        let snapshot: Vec<EntityId> = self.grid.occupants().collect();
        trace!(tick = self.ticks, entities = snapshot.len(), "Updating world");

        let mut pass = Ok(());
        for id in snapshot {
            if self.removed.contains(&id) {
                continue;
            }
            pass = self.update_entity(id);
            if pass.is_err() {
                break;
            }
        }

        self.removed.clear();
        pass?;

        let mut factories = std::mem::take(&mut self.factories);
        let result = factories
            .iter_mut()
            .try_for_each(|factory| factory.update(self));
        factories.append(&mut self.factories);
        self.factories = factories;

        result
    }

    fn update_entity(&mut self, id: EntityId) -> Result<()> {
        let Some(entity) = self.entities.get(&id).cloned() else {
            return Ok(());
        };

        // Entities act on a detached copy, written back unless they were
        // removed while acting.
        let updated = match entity {
            Entity::Agent(mut agent) => {
                agent.update(id, self)?;
                Entity::Agent(agent)
            }
            Entity::Food(mut food) => {
                food.update(id, self);
                Entity::Food(food)
            }
        };

        if let Some(slot) = self.entities.get_mut(&id) {
            *slot = updated;
        }
        Ok(())
    }
}

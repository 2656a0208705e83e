//! Everything that can occupy a cell.

use crate::agent::Agent;
use crate::food::Food;
use forage_core::Position;
use serde::{Deserialize, Serialize};

/// A placeable entity. The set is closed and matched exhaustively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Entity {
    Agent(Agent),
    Food(Food),
}

impl Entity {
    pub fn coords(&self) -> Position {
        match self {
            Entity::Agent(agent) => agent.coords,
            Entity::Food(food) => food.coords,
        }
    }

    pub(crate) fn set_coords(&mut self, coords: Position) {
        match self {
            Entity::Agent(agent) => agent.coords = coords,
            Entity::Food(food) => food.coords = coords,
        }
    }

    pub fn level(&self) -> u32 {
        match self {
            Entity::Agent(agent) => agent.level,
            Entity::Food(food) => food.level,
        }
    }

    pub fn as_agent(&self) -> Option<&Agent> {
        match self {
            Entity::Agent(agent) => Some(agent),
            Entity::Food(_) => None,
        }
    }

    pub fn as_food(&self) -> Option<&Food> {
        match self {
            Entity::Food(food) => Some(food),
            Entity::Agent(_) => None,
        }
    }

    pub fn is_agent(&self) -> bool {
        matches!(self, Entity::Agent(_))
    }

    pub fn is_food(&self) -> bool {
        matches!(self, Entity::Food(_))
    }
}

impl From<Agent> for Entity {
    fn from(agent: Agent) -> Self {
        Entity::Agent(agent)
    }
}

impl From<Food> for Entity {
    fn from(food: Food) -> Self {
        Entity::Food(food)
    }
}

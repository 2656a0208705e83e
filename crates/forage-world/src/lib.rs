//! Grid world simulation engine.
//!
//! Agents forage for food, grow, reproduce and eat weaker agents on a bounded
//! 2D grid. The [`World`] owns every entity and advances them one tick at a
//! time; [`factory`] spawners add new entities under capacity constraints.

pub mod agent;
pub mod entity;
pub mod factory;
pub mod food;
pub mod grid;
pub mod world;

pub use agent::{Agent, AgentState};
pub use entity::Entity;
pub use factory::{AgentFactory, Factory, FoodFactory, Updatable};
pub use food::Food;
pub use grid::{square_coords_at_radius, Grid};
pub use world::World;

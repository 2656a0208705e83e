//! Frame renderers.

use forage_core::Result;
use forage_world::{Entity, World};
use std::fmt::Write as _;
use std::io::Write;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Draws the world once per frame. Renderers only read the world.
pub trait Renderer {
    fn render(&mut self, world: &World) -> Result<()>;
}

/// Text renderer: `A<level>` for agents, `f<level>` for food
pub struct TerminalRenderer<W: Write> {
    out: W,
    clear: bool,
}

impl TerminalRenderer<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout(), true)
    }
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W, clear: bool) -> Self {
        Self { out, clear }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn render(&mut self, world: &World) -> Result<()> {
        if self.clear {
            self.out.write_all(CLEAR_SCREEN.as_bytes())?;
        }
        self.out.write_all(frame(world).as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

/// Renderer used when drawing is disabled
#[derive(Debug, Default)]
pub struct HeadlessRenderer;

impl Renderer for HeadlessRenderer {
    fn render(&mut self, _world: &World) -> Result<()> {
        Ok(())
    }
}

/// Grid rows followed by the running counters
pub fn frame(world: &World) -> String {
    let mut out = String::new();
    let width = world.width() as usize;

    for (i, (_, entity)) in world.cells().enumerate() {
        if i % width == 0 {
            out.push('[');
        }
        match entity {
            Some(Entity::Food(food)) => {
                let _ = write!(out, "f{}", food.level);
            }
            Some(Entity::Agent(agent)) => {
                let _ = write!(out, "A{}", agent.level);
            }
            None => out.push_str("  "),
        }
        if i % width == width - 1 {
            out.push_str("]\n");
        }
    }

    let max_level = match world.max_agents_level() {
        0 => "NO ALIVE".to_string(),
        level => level.to_string(),
    };

    let _ = writeln!(out, "Ticks past: {}", world.ticks());
    let _ = writeln!(out, "Agents left: {}", world.agents_count());
    let _ = writeln!(out, "Agents ate count: {}", world.ate_count());
    let _ = writeln!(out, "Agents spawned from other: {}", world.spawned_from_count());
    let _ = writeln!(out, "Max agent's level: {}", max_level);
    out
}

//! Game driver: owns the world, renders it and feeds the metrics sink.

use crate::metrics::MetricsSink;
use crate::render::Renderer;
use forage_core::{Error, Result, RunStats, SimulationConfig};
use forage_world::{AgentFactory, FoodFactory, World};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, event, info, instrument, Level};

pub struct Game {
    config: SimulationConfig,
    renderer: Box<dyn Renderer>,
    metrics: Box<dyn MetricsSink>,
    world: Option<World>,
    stats: RunStats,
}

impl Game {
    pub fn new(
        config: SimulationConfig,
        renderer: Box<dyn Renderer>,
        metrics: Box<dyn MetricsSink>,
    ) -> Self {
        Self {
            config,
            renderer,
            metrics,
            world: None,
            stats: RunStats::new(),
        }
    }

    /// Validate the configuration, build the world, register the factories
    /// and place the initial population.
    #[instrument(skip(self), fields(seed = self.config.seed))]
    pub fn start(&mut self) -> Result<()> {
        self.config.validate()?;

        let mut world = World::new(&self.config)?;
        let food_factory = FoodFactory::new(self.config.food.clone());

        world.register_factory(AgentFactory);
        world.register_factory(food_factory.clone());

        let agents = AgentFactory::spawn_random(&mut world, self.config.driver.initial_agents)?;
        let food = food_factory.spawn_bunch(&mut world, self.config.driver.initial_food)?;

        info!(
            width = world.width(),
            height = world.height(),
            agents = agents.len(),
            food = food.len(),
            "World created"
        );

        self.world = Some(world);
        Ok(())
    }

    pub fn world(&self) -> Result<&World> {
        self.world.as_ref().ok_or(Error::MissingWorld)
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Render the current state, record it, then advance one tick.
    pub fn step(&mut self) -> Result<()> {
        let world = self.world.as_mut().ok_or(Error::MissingWorld)?;

        self.renderer.render(world)?;

        let record = world.tick_record();
        self.metrics.record(&record)?;
        self.stats.update(&record);

        let tick = world.ticks();
        let log_interval = self.config.driver.log_interval;
        if log_interval > 0 && tick % log_interval == 0 {
            event!(
                Level::INFO,
                tick,
                agents = record.agents_left,
                food = world.food_count(),
                max_level = record.max_agents_level,
                "Population"
            );
        }

        world.update()
    }

    /// Step on a fixed frame delay until `max_ticks` is reached. Without a
    /// limit this only returns on error.
    #[instrument(skip(self), fields(max_ticks = ?self.config.driver.max_ticks))]
    pub async fn run(&mut self) -> Result<()> {
        let delay = Duration::from_millis(self.config.driver.frame_delay_ms.max(1));
        let mut frames = interval(delay);
        frames.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut steps = 0u64;
        loop {
            if let Some(max) = self.config.driver.max_ticks {
                if steps >= max {
                    debug!(steps, "Tick limit reached");
                    return Ok(());
                }
            }

            frames.tick().await;
            self.step()?;
            steps += 1;
        }
    }

    /// Flush the metrics sink and report the run summary.
    pub fn finish(mut self) -> Result<RunStats> {
        self.metrics.close()?;

        let stats = self.stats;
        info!(
            ticks = stats.ticks_observed,
            peak_agents = stats.peak_agents,
            peak_level = stats.peak_level,
            avg_agents = stats.avg_agents,
            extinct = stats.extinct(),
            "Run finished"
        );
        Ok(stats)
    }
}

//! Per-tick metrics and run-level statistics.

use serde::{Deserialize, Serialize};

/// Population snapshot read after each tick. Field order is the column
/// order of the metrics CSV.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickRecord {
    /// Agents currently alive
    pub agents_left: usize,
    /// Agents eaten by other agents since the start
    pub eaten_agents: u64,
    /// Reproduction attempts since the start
    pub spawned_agents: u64,
    /// Highest level among living agents (0 when none)
    pub max_agents_level: u32,
}

impl TickRecord {
    pub const FIELDS: [&'static str; 4] = [
        "agents_left",
        "eaten_agents",
        "spawned_agents",
        "max_agents_level",
    ];
}

/// Statistics aggregated over a whole run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    pub ticks_observed: u64,
    pub peak_agents: usize,
    pub peak_level: u32,
    /// Running mean of the living population
    pub avg_agents: f64,
    pub last: Option<TickRecord>,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one tick's record into the statistics
    pub fn update(&mut self, record: &TickRecord) {
        let n = self.ticks_observed as f64;
        self.avg_agents = (self.avg_agents * n + record.agents_left as f64) / (n + 1.0);

        self.peak_agents = self.peak_agents.max(record.agents_left);
        self.peak_level = self.peak_level.max(record.max_agents_level);
        self.last = Some(*record);
        self.ticks_observed += 1;
    }

    pub fn extinct(&self) -> bool {
        matches!(self.last, Some(record) if record.agents_left == 0)
    }
}

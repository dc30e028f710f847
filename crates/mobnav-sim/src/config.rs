use mobnav_game::ai::navigator::NavigatorConfig;
use mobnav_game::ai::pathfinding::PathfindingConfig;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct SimConfig {
    #[serde(default)]
    pub simulation: SimulationSection,
    #[serde(default)]
    pub world: WorldSection,
    #[serde(default)]
    pub mobs: Vec<MobEntry>,
    #[serde(default)]
    pub players: Vec<PlayerEntry>,
    #[serde(default)]
    pub navigation: NavigatorConfig,
    #[serde(default)]
    pub pathfinding: PathfindingConfig,
    pub logging: LoggingSection,
}

#[derive(Debug, Deserialize)]
pub struct SimulationSection {
    /// Ticks to run. 0 = until Ctrl+C.
    #[serde(default)]
    pub ticks: u64,
    #[serde(default = "default_tick_millis")]
    pub tick_millis: u64,
    /// Ticks between status log lines.
    #[serde(default = "default_report_interval")]
    pub report_interval: u64,
}

fn default_tick_millis() -> u64 {
    50
}

fn default_report_interval() -> u64 {
    20
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            ticks: 0,
            tick_millis: default_tick_millis(),
            report_interval: default_report_interval(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WorldSection {
    #[serde(default = "default_radius_chunks")]
    pub radius_chunks: i32,
    #[serde(default)]
    pub structures: Vec<StructureEntry>,
}

fn default_radius_chunks() -> i32 {
    2
}

impl Default for WorldSection {
    fn default() -> Self {
        Self {
            radius_chunks: default_radius_chunks(),
            structures: Vec::new(),
        }
    }
}

/// An inclusive box of one block type, placed after terrain generation.
#[derive(Debug, Deserialize)]
pub struct StructureEntry {
    pub min: [i32; 3],
    pub max: [i32; 3],
    pub block: String,
}

#[derive(Debug, Deserialize)]
pub struct MobEntry {
    pub type_id: String,
    pub position: [f32; 3],
}

#[derive(Debug, Deserialize)]
pub struct PlayerEntry {
    pub position: [f32; 3],
}

#[derive(Debug, Deserialize)]
pub struct LoggingSection {
    pub level: String,
}

impl SimConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }
}

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub pipeline: PipelineConfig,
    pub storage: StorageConfig,
    pub simulation: SimulationDefaults,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Sizing of the in-memory pipeline and its channels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Rounds kept in the in-memory history buffer.
    pub history_capacity: usize,
    /// Pending commands the actor queue holds before producers wait.
    pub queue_capacity: usize,
    /// Buffered events per broadcast subscriber.
    pub broadcast_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            history_capacity: 500,
            queue_capacity: 256,
            broadcast_capacity: 1000,
        }
    }
}

/// File-backed round store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub path: String,
    /// Rounds retained by the store.
    pub retention: usize,
    /// Rounds loaded into the buffer at startup.
    pub warm_start: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: "data/rounds.csv".to_string(),
            retention: 10_000,
            warm_start: 500,
        }
    }
}

/// Policy used when a simulation is started without explicit parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationDefaults {
    pub stake: Decimal,
    pub target: Decimal,
    pub stop_loss: Decimal,
    pub take_profit: Decimal,
}

impl Default for SimulationDefaults {
    fn default() -> Self {
        Self {
            stake: dec!(0.01),
            target: dec!(2.0),
            stop_loss: dec!(0.1),
            take_profit: dec!(0.5),
        }
    }
}

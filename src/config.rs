// Configuration module for reading Snake.toml
// Every tunable knob of the engine lives here; the decision logic reads
// nothing from the environment.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::types::Direction;

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    pub timing: TimingConfig,
    pub search: SearchConfig,
    pub weights: WeightsConfig,
    pub policy: PolicyConfig,
    pub debug: DebugConfig,
}

/// Timing and performance constants
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TimingConfig {
    pub response_time_budget_ms: u64,
    pub network_overhead_ms: u64,
    pub min_time_remaining_ms: u64,
}

impl TimingConfig {
    /// Computes the effective computation budget for a game with the given timeout
    pub fn effective_budget_ms(&self, game_timeout_ms: u32) -> u64 {
        self.response_time_budget_ms
            .min(u64::from(game_timeout_ms))
            .saturating_sub(self.network_overhead_ms)
    }
}

/// Game tree search parameters
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SearchConfig {
    /// Plies searched from the root; each ply is one snake's move
    pub depth: u8,
    /// Alpha-beta when true, plain minimax when false
    pub pruning: bool,
    /// Search depths 1..=depth in turn so a deadline never leaves us empty-handed
    pub iterative_deepening: bool,
}

/// Evaluation weights: size dominates, then health, food proximity, mobility
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct WeightsConfig {
    pub health: f64,
    pub length: f64,
    pub food: f64,
    pub safety: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        WeightsConfig {
            health: 0.3,
            length: 0.4,
            food: 0.2,
            safety: 0.1,
        }
    }
}

/// Decision policy parameters
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PolicyConfig {
    /// Below this health the nearest-food override takes over
    pub low_health_threshold: i32,
    /// Move sent when no safe move exists at all
    pub fallback_direction: Direction,
    /// Drop safe moves whose next cell has no safe exit
    pub trap_lookahead: bool,
    /// Fixed seed for the random-among-safe fallback (entropy when absent)
    #[serde(default)]
    pub random_seed: Option<u64>,
}

/// Debug configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Snake.toml configuration file
    ///
    /// # Returns
    /// * `Result<Config, String>` - Parsed configuration or error message
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        Self::from_toml_str(&contents)
    }

    /// Parses configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, String> {
        toml::from_str(contents).map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// Loads default configuration from Snake.toml in the project root
    pub fn load_default() -> Result<Self, String> {
        Self::from_file("Snake.toml")
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Snake.toml
    pub fn default_hardcoded() -> Self {
        Config {
            timing: TimingConfig {
                response_time_budget_ms: 500,
                network_overhead_ms: 100,
                min_time_remaining_ms: 10,
            },
            search: SearchConfig {
                depth: 3,
                pruning: true,
                iterative_deepening: true,
            },
            weights: WeightsConfig::default(),
            policy: PolicyConfig {
                low_health_threshold: 50,
                fallback_direction: Direction::Down,
                trap_lookahead: true,
                random_seed: None,
            },
            debug: DebugConfig {
                enabled: false,
                log_file_path: "battlesnake_debug.jsonl".to_string(),
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            log::warn!("Could not load Snake.toml ({}), using hardcoded defaults", e);
            Self::default_hardcoded()
        })
    }
}

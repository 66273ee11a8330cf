// Configuration module for reading Pursuit.toml
// This module provides OOP-style configuration management for the search engine

use log::warn;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::types::Ticket;

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub timing: TimingConfig,
    pub edge_costs: EdgeCostConfig,
    pub evaluation: EvaluationConfig,
    pub filtering: FilteringConfig,
    pub move_ordering: MoveOrderingConfig,
    pub seeker: SeekerConfig,
    pub debug: DebugConfig,
}

/// Timing constants for the time-boxed search
#[derive(Debug, Deserialize, Clone)]
pub struct TimingConfig {
    pub move_time_budget_ms: u64,
    pub termination_margin_ms: u64,
    pub polling_interval_ms: u64,
    pub max_search_depth: usize,
}

impl TimingConfig {
    /// Computes the time the search may actually run for
    pub fn effective_budget_ms(&self) -> u64 {
        self.move_time_budget_ms
            .saturating_sub(self.termination_margin_ms)
    }
}

/// Per-ticket edge costs for the ticket-weighted distance policy
#[derive(Debug, Deserialize, Clone)]
pub struct EdgeCostConfig {
    pub taxi: u32,
    pub bus: u32,
    pub underground: u32,
    pub secret: u32,
    pub double: u32,
}

impl EdgeCostConfig {
    pub fn cost_of(&self, ticket: Ticket) -> u32 {
        match ticket {
            Ticket::Taxi => self.taxi,
            Ticket::Bus => self.bus,
            Ticket::Underground => self.underground,
            Ticket::Secret => self.secret,
            Ticket::Double => self.double,
        }
    }
}

/// Weights of the closest-seeker composite evaluation
#[derive(Debug, Deserialize, Clone)]
pub struct EvaluationConfig {
    pub nearest_seeker_weight: f32,
    pub mean_distance_weight: f32,
    pub candidate_locations_weight: f32,
    pub secret_tickets_weight: f32,
}

/// Domain move filtering constants
#[derive(Debug, Deserialize, Clone)]
pub struct FilteringConfig {
    pub enabled: bool,
    pub opening_rounds: usize,
}

/// Move ordering constants
#[derive(Debug, Deserialize, Clone)]
pub struct MoveOrderingConfig {
    pub killer_moves_per_ply: usize,
    pub use_history: bool,
}

/// One-move-lookahead seeker constants
#[derive(Debug, Deserialize, Clone)]
pub struct SeekerConfig {
    pub best_move_probability: f64,
}

/// Debug configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Pursuit.toml configuration file
    ///
    /// # Returns
    /// * `Result<Config, String>` - Parsed configuration or error message
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        toml::from_str(&contents).map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// Loads default configuration from Pursuit.toml in the project root
    pub fn load_default() -> Result<Self, String> {
        Self::from_file("Pursuit.toml")
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Pursuit.toml
    pub fn default_hardcoded() -> Self {
        Config {
            timing: TimingConfig {
                move_time_budget_ms: 15_000,
                termination_margin_ms: 200,
                polling_interval_ms: 10,
                max_search_depth: 64,
            },
            edge_costs: EdgeCostConfig {
                taxi: 1,
                bus: 2,
                underground: 4,
                secret: 4,
                double: 8,
            },
            evaluation: EvaluationConfig {
                nearest_seeker_weight: 90.0,
                mean_distance_weight: 10.0,
                candidate_locations_weight: 2.0,
                secret_tickets_weight: 1.0,
            },
            filtering: FilteringConfig {
                enabled: true,
                opening_rounds: 3,
            },
            move_ordering: MoveOrderingConfig {
                killer_moves_per_ply: 3,
                use_history: true,
            },
            seeker: SeekerConfig {
                best_move_probability: 1.0,
            },
            debug: DebugConfig {
                enabled: false,
                log_file_path: "pursuit_debug.jsonl".to_string(),
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            warn!(
                "Could not load Pursuit.toml ({}), using hardcoded defaults",
                e
            );
            Self::default_hardcoded()
        })
    }
}

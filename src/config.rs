// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration management for the distributed execution layer.
//!
//! Configuration is loaded from multiple sources with the following priority
//! (later sources override earlier ones):
//!
//! 1. Built-in defaults
//! 2. dqc.yaml file
//! 3. Environment variables (QUBITOS_DQC_*)
//! 4. CLI arguments

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::error::{Error, Result};
use crate::partition::SchemeKind;

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Network topology
    #[serde(default)]
    pub network: NetworkConfig,

    /// Simulated durations
    #[serde(default)]
    pub timing: TimingConfig,

    /// Execution settings
    #[serde(default)]
    pub execution: ExecutionConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file and environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut config = Config::default();

        // Load from file if specified
        if let Some(path) = config_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                config = serde_yaml::from_str(&content)?;
            }
        } else {
            // Try default locations
            for path in &["dqc.yaml", "dqc.yml", "/etc/qubitos/dqc.yaml"] {
                let path = Path::new(path);
                if path.exists() {
                    let content = std::fs::read_to_string(path)?;
                    config = serde_yaml::from_str(&content)?;
                    break;
                }
            }
        }

        // Override with environment variables
        config.apply_env_overrides();

        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("QUBITOS_DQC_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = env::var("QUBITOS_DQC_SCHEME") {
            self.execution.default_scheme = val;
        }
        if let Ok(val) = env::var("QUBITOS_DQC_SEED") {
            if let Ok(seed) = val.parse() {
                self.execution.seed = seed;
            }
        }
        if let Ok(val) = env::var("QUBITOS_DQC_CLASSICAL_LATENCY") {
            if let Ok(ticks) = val.parse() {
                self.timing.classical_latency = ticks;
            }
        }
        if let Ok(val) = env::var("QUBITOS_DQC_ENTANGLEMENT_TICKS") {
            if let Ok(ticks) = val.parse() {
                self.timing.entanglement_generation = ticks;
            }
        }
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if self.network.nodes.is_empty() {
            return Err(Error::Config("network must declare at least one node".into()));
        }
        let mut seen = std::collections::HashSet::new();
        for node in &self.network.nodes {
            if node.name.is_empty() {
                return Err(Error::Config("node name cannot be empty".into()));
            }
            if !seen.insert(node.name.as_str()) {
                return Err(Error::Config(format!(
                    "duplicate node name '{}'",
                    node.name
                )));
            }
            if node.processing_slots == 0 {
                return Err(Error::Config(format!(
                    "node '{}' declares no processing slots",
                    node.name
                )));
            }
        }
        if SchemeKind::from_tag(&self.execution.default_scheme).is_none() {
            return Err(Error::Config(format!(
                "unknown default scheme '{}'",
                self.execution.default_scheme
            )));
        }
        let comm_total: usize = self.network.nodes.iter().map(|n| n.comm_slots).sum();
        if comm_total == 0 && self.network.nodes.len() > 1 {
            tracing::warn!(
                "No node declares communication slots; every cross-node gate will stall. \
                 Declare comm_slots on at least two nodes."
            );
        }
        Ok(())
    }
}

/// Network topology: an ordered list of nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Nodes in allocation order
    #[serde(default)]
    pub nodes: Vec<NodeConfig>,
}

/// One node's declared capacities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Node name, unique within the network
    pub name: String,

    /// Processing slots (one per logical circuit qubit assigned here)
    #[serde(default = "default_processing_slots")]
    pub processing_slots: usize,

    /// Communication slots (bounded transient ebit storage)
    #[serde(default = "default_comm_slots")]
    pub comm_slots: usize,
}

/// Simulated durations, in scheduler ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Duration of a single-qubit gate (also used for init/reset)
    #[serde(default = "default_single_qubit_ticks")]
    pub single_qubit_gate: u64,

    /// Duration of a two-qubit gate
    #[serde(default = "default_two_qubit_ticks")]
    pub two_qubit_gate: u64,

    /// Duration of a measurement
    #[serde(default = "default_measurement_ticks")]
    pub measurement: u64,

    /// Classical message latency between any node pair
    #[serde(default = "default_classical_latency")]
    pub classical_latency: u64,

    /// Entanglement-source generation time per ebit
    #[serde(default = "default_entanglement_ticks")]
    pub entanglement_generation: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            single_qubit_gate: default_single_qubit_ticks(),
            two_qubit_gate: default_two_qubit_ticks(),
            measurement: default_measurement_ticks(),
            classical_latency: default_classical_latency(),
            entanglement_generation: default_entanglement_ticks(),
        }
    }
}

/// Execution settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Scheme used for remote gates without a per-operation tag
    #[serde(default = "default_scheme")]
    pub default_scheme: String,

    /// Seed for the reference backend's measurement sampling
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            default_scheme: default_scheme(),
            seed: default_seed(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_processing_slots() -> usize {
    1
}

fn default_comm_slots() -> usize {
    1
}

fn default_single_qubit_ticks() -> u64 {
    1
}

fn default_two_qubit_ticks() -> u64 {
    2
}

fn default_measurement_ticks() -> u64 {
    3
}

fn default_classical_latency() -> u64 {
    5
}

fn default_entanglement_ticks() -> u64 {
    10
}

fn default_scheme() -> String {
    "cat".to_string()
}

fn default_seed() -> u64 {
    0
}

fn default_log_level() -> String {
    "info".to_string()
}

// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! QubitOS DQC command-line driver
//!
//! Partitions and executes distributed quantum circuits on the reference
//! state-vector backend.
//!
//! # Usage
//!
//! ```bash
//! # Execute a circuit file on the configured network
//! qubit-os-dqc run circuit.json
//!
//! # Force one scheme for every remote gate
//! qubit-os-dqc run circuit.json --scheme tp_safe
//!
//! # Show the per-node operation streams without executing
//! qubit-os-dqc partition circuit.json
//!
//! # Show / validate the effective configuration
//! qubit-os-dqc config
//! qubit-os-dqc validate --circuit circuit.json
//! ```

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use qubit_os_dqc::backend::StateVectorBackend;
use qubit_os_dqc::circuit::{Circuit, CircuitFile};
use qubit_os_dqc::config::Config;
use qubit_os_dqc::network::NetworkSpec;
use qubit_os_dqc::partition::{
    allocate_circuit, allocation_from_records, partition, Allocation, FirstComeFirstServed,
    SchemeKind, SchemeSelector,
};
use qubit_os_dqc::runtime::Orchestrator;
use qubit_os_dqc::validation::validate_circuit;
use qubit_os_dqc::{Error, Result, VERSION};

/// QubitOS Distributed Quantum Circuit simulator
#[derive(Parser)]
#[command(name = "qubit-os-dqc")]
#[command(author = "QubitOS Contributors")]
#[command(version = VERSION)]
#[command(about = "Distributed quantum circuit partitioning and execution")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Partition and execute a circuit file
    Run {
        /// Circuit file (JSON or YAML)
        circuit: PathBuf,

        /// Scheme for remote gates without a per-operation tag
        #[arg(long, env = "QUBITOS_DQC_SCHEME")]
        scheme: Option<String>,

        /// Measurement-sampling seed
        #[arg(long, env = "QUBITOS_DQC_SEED")]
        seed: Option<u64>,
    },

    /// Show the per-node operation streams without executing
    Partition {
        /// Circuit file (JSON or YAML)
        circuit: PathBuf,

        /// Scheme for remote gates without a per-operation tag
        #[arg(long)]
        scheme: Option<String>,
    },

    /// Show effective configuration
    Config,

    /// Validate configuration (and optionally a circuit file)
    Validate {
        /// Circuit file to validate
        #[arg(long)]
        circuit: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level);

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            circuit,
            scheme,
            seed,
        } => {
            config.validate()?;
            let network = NetworkSpec::from_config(&config.network)?;
            let (parsed, allocation) = load_circuit(&circuit, &network)?;
            let selector = selector_for(&config, scheme.as_deref())?;
            let seed = seed.unwrap_or(config.execution.seed);

            let partitioned = partition(&parsed, &allocation, &selector, &network)?;
            info!(
                ops = parsed.len(),
                protocols = partitioned.protocols().len(),
                seed,
                "executing partitioned circuit"
            );

            let mut orchestrator = Orchestrator::new(
                network,
                config.timing.clone(),
                StateVectorBackend::new(seed),
            );
            let report = orchestrator.run(&partitioned)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Partition { circuit, scheme } => {
            config.validate()?;
            let network = NetworkSpec::from_config(&config.network)?;
            let (parsed, allocation) = load_circuit(&circuit, &network)?;
            let selector = selector_for(&config, scheme.as_deref())?;

            let partitioned = partition(&parsed, &allocation, &selector, &network)?;
            for node in network.node_ids() {
                println!("{}:", network.name(node));
                for op in partitioned.stream(node) {
                    println!("  {op:?}");
                }
            }
            println!(
                "{} protocol(s), {} total ebit(s)",
                partitioned.protocols().len(),
                partitioned
                    .protocols()
                    .iter()
                    .map(|p| p.ebits as u64)
                    .sum::<u64>()
            );
        }

        Commands::Config => {
            println!("{}", serde_yaml::to_string(&config)?);
        }

        Commands::Validate { circuit } => {
            config.validate()?;
            if let Some(path) = circuit {
                let network = NetworkSpec::from_config(&config.network)?;
                load_circuit(&path, &network)?;
                println!("Circuit is valid");
            }
            println!("Configuration is valid");
        }
    }

    Ok(())
}

/// Initialize logging with tracing.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();
}

/// Parse a circuit file and derive its allocation (manual records if the
/// file carries them, first-come-first-served otherwise).
fn load_circuit(path: &Path, network: &NetworkSpec) -> Result<(Circuit, Allocation)> {
    let text = std::fs::read_to_string(path)?;
    let file = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => CircuitFile::from_yaml(&text)?,
        _ => CircuitFile::from_json(&text)?,
    };
    let circuit = file.decode()?;
    validate_circuit(&circuit)?;

    let allocation = if file.allocation.is_empty() {
        allocate_circuit(&circuit, network, &FirstComeFirstServed)?
    } else {
        allocation_from_records(&file.allocation, network)?
    };
    Ok((circuit, allocation))
}

/// Resolve the scheme selector from a CLI override or the configuration.
fn selector_for(config: &Config, cli_scheme: Option<&str>) -> Result<SchemeSelector> {
    let tag = cli_scheme.unwrap_or(&config.execution.default_scheme);
    let kind = SchemeKind::from_tag(tag)
        .ok_or_else(|| Error::Config(format!("unknown scheme '{tag}'")))?;
    Ok(SchemeSelector::Uniform(kind))
}
